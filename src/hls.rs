//! Types produced by the HLS scanner.
//!
//! The main type here is the [`HlsPlaylist`] enum, which is either a
//! [`MasterPlaylist`] or a [`MediaPlaylist`].

use crate::attributes::AttributeMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// [Playlist](https://tools.ietf.org/html/draft-pantos-http-live-streaming-19#section-4.1),
/// can either be a `MasterPlaylist` or a `MediaPlaylist`.
///
/// A Playlist is a Media Playlist if all URI lines in the Playlist
/// identify Media Segments.  A Playlist is a Master Playlist if all URI
/// lines in the Playlist identify Media Playlists.
///
/// Serialized with a `type` field of `"media"` or `"master"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HlsPlaylist {
    Master(MasterPlaylist),
    Media(MediaPlaylist),
}

impl HlsPlaylist {
    pub fn warnings(&self) -> &[String] {
        match self {
            HlsPlaylist::Master(pl) => &pl.warnings,
            HlsPlaylist::Media(pl) => &pl.warnings,
        }
    }

    pub fn is_master(&self) -> bool {
        matches!(self, HlsPlaylist::Master(_))
    }
}

// -----------------------------------------------------------------------------------------------
// Master Playlist
// -----------------------------------------------------------------------------------------------

/// A [Master Playlist](https://tools.ietf.org/html/draft-pantos-http-live-streaming-19#section-4.3.4)
/// provides a set of Variant Streams, each of which
/// describes a different version of the same content.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterPlaylist {
    pub version: Option<u32>,
    pub variants: Vec<VariantStream>,
    pub i_frame_streams: Vec<IFrameStream>,
    /// `#EXT-X-MEDIA` renditions, in declaration order.
    pub renditions: Vec<Rendition>,
    pub session_data: Vec<SessionData>,
    pub session_keys: Vec<SessionKey>,
    pub start: Option<Start>,
    pub independent_segments: bool,
    pub warnings: Vec<String>,
}

/// [`#EXT-X-STREAM-INF:<attribute-list>`](https://tools.ietf.org/html/draft-pantos-http-live-streaming-19#section-4.3.4.2)
/// followed by the URI of its Media Playlist.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantStream {
    pub uri: String,

    // <attribute-list>
    pub bandwidth: u64,
    pub average_bandwidth: Option<u64>,
    pub codecs: Option<String>,
    pub resolution: Option<Resolution>,
    pub frame_rate: Option<f64>,
    pub hdcp_level: Option<HdcpLevel>,
    pub video_range: Option<String>,
    pub audio: Option<String>,
    pub video: Option<String>,
    pub subtitles: Option<String>,
    pub closed_captions: Option<ClosedCaptions>,
    pub program_id: Option<u64>,
    pub other_attributes: AttributeMap,
}

impl VariantStream {
    /// Builds a variant from its attribute list. `BANDWIDTH` is required; the
    /// URI is attached by the caller once the following line has been read.
    pub fn from_attributes(mut attrs: AttributeMap) -> Option<VariantStream> {
        let bandwidth = attrs.get_u64("BANDWIDTH")?;
        attrs.remove("BANDWIDTH");

        Some(VariantStream {
            uri: String::new(),
            bandwidth,
            average_bandwidth: take_u64(&mut attrs, "AVERAGE-BANDWIDTH"),
            codecs: attrs.remove("CODECS"),
            resolution: attrs.remove("RESOLUTION").and_then(|r| r.parse().ok()),
            frame_rate: take_f64(&mut attrs, "FRAME-RATE"),
            hdcp_level: attrs.remove("HDCP-LEVEL").map(|s| HdcpLevel::from(s.as_str())),
            video_range: attrs.remove("VIDEO-RANGE"),
            audio: attrs.remove("AUDIO"),
            video: attrs.remove("VIDEO"),
            subtitles: attrs.remove("SUBTITLES"),
            closed_captions: attrs
                .remove("CLOSED-CAPTIONS")
                .map(|s| ClosedCaptions::from(s.as_str())),
            program_id: take_u64(&mut attrs, "PROGRAM-ID"),
            other_attributes: attrs,
        })
    }
}

/// [`#EXT-X-I-FRAME-STREAM-INF:<attribute-list>`](https://tools.ietf.org/html/draft-pantos-http-live-streaming-19#section-4.3.4.3)
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct IFrameStream {
    pub uri: String,
    pub bandwidth: u64,
    pub average_bandwidth: Option<u64>,
    pub codecs: Option<String>,
    pub resolution: Option<Resolution>,
    pub hdcp_level: Option<HdcpLevel>,
    pub video: Option<String>,
    pub other_attributes: AttributeMap,
}

impl IFrameStream {
    /// Requires both `URI` and `BANDWIDTH`.
    pub fn from_attributes(mut attrs: AttributeMap) -> Option<IFrameStream> {
        let bandwidth = attrs.get_u64("BANDWIDTH")?;
        let uri = attrs.remove("URI")?;
        attrs.remove("BANDWIDTH");

        Some(IFrameStream {
            uri,
            bandwidth,
            average_bandwidth: take_u64(&mut attrs, "AVERAGE-BANDWIDTH"),
            codecs: attrs.remove("CODECS"),
            resolution: attrs.remove("RESOLUTION").and_then(|r| r.parse().ok()),
            hdcp_level: attrs.remove("HDCP-LEVEL").map(|s| HdcpLevel::from(s.as_str())),
            video: attrs.remove("VIDEO"),
            other_attributes: attrs,
        })
    }
}

/// `RESOLUTION=<width>x<height>`
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u64,
    pub height: u64,
}

impl FromStr for Resolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Resolution, String> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("Unable to create Resolution from {:?}", s))?;
        match (w.trim().parse(), h.trim().parse()) {
            (Ok(width), Ok(height)) => Ok(Resolution { width, height }),
            _ => Err(format!("Unable to create Resolution from {:?}", s)),
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

// HDCP-LEVEL
// The value is an enumerated-string; valid strings are TYPE-0, TYPE-1 and NONE
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HdcpLevel {
    Type0,
    Type1,
    None,
    Other(String),
}

impl From<&str> for HdcpLevel {
    fn from(s: &str) -> Self {
        match s {
            "NONE" => HdcpLevel::None,
            "TYPE-0" => HdcpLevel::Type0,
            "TYPE-1" => HdcpLevel::Type1,
            _ => HdcpLevel::Other(s.to_string()),
        }
    }
}

impl fmt::Display for HdcpLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HdcpLevel::None => write!(f, "NONE"),
            HdcpLevel::Type0 => write!(f, "TYPE-0"),
            HdcpLevel::Type1 => write!(f, "TYPE-1"),
            HdcpLevel::Other(s) => write!(f, "{}", s),
        }
    }
}

// CLOSED-CAPTIONS
// The value can be either a quoted-string naming a group or the
// enumerated-string NONE.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClosedCaptions {
    None,
    GroupId(String),
}

impl From<&str> for ClosedCaptions {
    fn from(s: &str) -> Self {
        match s {
            "NONE" => ClosedCaptions::None,
            gid => ClosedCaptions::GroupId(gid.to_string()),
        }
    }
}

impl fmt::Display for ClosedCaptions {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ClosedCaptions::None => write!(f, "NONE"),
            ClosedCaptions::GroupId(gid) => write!(f, "{}", gid),
        }
    }
}

/// [`#EXT-X-MEDIA:<attribute-list>`](https://tools.ietf.org/html/draft-pantos-http-live-streaming-19#section-4.3.4.1)
///
/// Relates Media Playlists that contain alternative Renditions of the same
/// content, e.g. audio in several languages or several camera angles.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rendition {
    // <attribute-list>
    pub media_type: MediaType,
    pub uri: Option<String>,
    pub group_id: String,
    pub language: Option<String>,
    pub assoc_language: Option<String>,
    pub name: String,
    pub default: bool,    // Its absence indicates an implicit value of NO
    pub autoselect: bool, // Its absence indicates an implicit value of NO
    pub forced: bool,     // Its absence indicates an implicit value of NO
    pub instream_id: Option<String>,
    pub characteristics: Option<String>,
    pub channels: Option<String>,
    pub other_attributes: AttributeMap,
}

impl Rendition {
    /// Requires `TYPE`, `GROUP-ID` and `NAME`.
    pub fn from_attributes(mut attrs: AttributeMap) -> Option<Rendition> {
        let media_type = attrs.get("TYPE")?.parse().ok()?;
        let group_id = attrs.remove("GROUP-ID")?;
        let name = attrs.remove("NAME")?;
        attrs.remove("TYPE");

        let default = attrs.get_yes_no("DEFAULT");
        let autoselect = attrs.get_yes_no("AUTOSELECT");
        let forced = attrs.get_yes_no("FORCED");
        for k in ["DEFAULT", "AUTOSELECT", "FORCED"] {
            attrs.remove(k);
        }

        Some(Rendition {
            media_type,
            uri: attrs.remove("URI"),
            group_id,
            language: attrs.remove("LANGUAGE"),
            assoc_language: attrs.remove("ASSOC-LANGUAGE"),
            name,
            default,
            autoselect,
            forced,
            instream_id: attrs.remove("INSTREAM-ID"),
            characteristics: attrs.remove("CHARACTERISTICS"),
            channels: attrs.remove("CHANNELS"),
            other_attributes: attrs,
        })
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MediaType {
    Audio,
    #[default]
    Video,
    Subtitles,
    ClosedCaptions,
}

impl FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<MediaType, String> {
        match s.to_ascii_uppercase().as_str() {
            "AUDIO" => Ok(MediaType::Audio),
            "VIDEO" => Ok(MediaType::Video),
            "SUBTITLES" => Ok(MediaType::Subtitles),
            "CLOSED-CAPTIONS" | "CLOSEDCAPTIONS" => Ok(MediaType::ClosedCaptions),
            _ => Err(format!("Unable to create MediaType from {:?}", s)),
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MediaType::Audio => write!(f, "AUDIO"),
            MediaType::Video => write!(f, "VIDEO"),
            MediaType::Subtitles => write!(f, "SUBTITLES"),
            MediaType::ClosedCaptions => write!(f, "CLOSED-CAPTIONS"),
        }
    }
}

/// [`#EXT-X-SESSION-KEY:<attribute-list>`](https://tools.ietf.org/html/draft-pantos-http-live-streaming-19#section-4.3.4.5)
/// The EXT-X-SESSION-KEY tag allows encryption keys from Media Playlists
/// to be specified in a Master Playlist.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionKey(pub Key);

/// [`#EXT-X-SESSION-DATA:<attribute-list>`](https://tools.ietf.org/html/draft-pantos-http-live-streaming-19#section-4.3.4.4)
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    pub data_id: String,
    pub value: Option<String>,
    pub uri: Option<String>,
    pub language: Option<String>,
}

impl SessionData {
    /// Requires `DATA-ID`.
    pub fn from_attributes(mut attrs: AttributeMap) -> Option<SessionData> {
        Some(SessionData {
            data_id: attrs.remove("DATA-ID")?,
            value: attrs.remove("VALUE"),
            uri: attrs.remove("URI"),
            language: attrs.remove("LANGUAGE"),
        })
    }
}

// -----------------------------------------------------------------------------------------------
// Media Playlist
// -----------------------------------------------------------------------------------------------

/// A [Media Playlist](https://tools.ietf.org/html/draft-pantos-http-live-streaming-19#section-4.3.3)
/// contains a list of Media Segments, which when played
/// sequentially will play the multimedia presentation.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaPlaylist {
    pub version: Option<u32>,
    /// `#EXT-X-TARGETDURATION:<s>`, zero when absent
    pub target_duration: f64,
    /// `#EXT-X-MEDIA-SEQUENCE:<number>`
    pub media_sequence: Option<u64>,
    /// `#EXT-X-DISCONTINUITY-SEQUENCE:<number>`
    pub discontinuity_sequence: Option<u64>,
    /// `#EXT-X-PLAYLIST-TYPE`, `None` for a live playlist
    pub playlist_type: Option<MediaPlaylistType>,
    /// `#EXT-X-ENDLIST`
    pub end_list: bool,
    /// `#EXT-X-I-FRAMES-ONLY`
    pub i_frames_only: bool,
    /// `#EXT-X-INDEPENDENT-SEGMENTS`
    pub independent_segments: bool,
    pub segments: Vec<MediaSegment>,
    /// `#EXT-X-START`
    pub start: Option<Start>,
    pub server_control: Option<ServerControl>,
    pub part_inf: Option<PartInf>,
    pub skip: Option<Skip>,
    pub preload_hints: Vec<PreloadHint>,
    pub rendition_reports: Vec<RenditionReport>,
    /// `X-*` attributes found on tags this crate does not model.
    pub custom_attributes: AttributeMap,
    pub warnings: Vec<String>,
}

impl MediaPlaylist {
    /// Sum of all segment durations, in seconds.
    pub fn duration(&self) -> f64 {
        self.segments.iter().map(|s| s.duration).sum()
    }
}

/// [`#EXT-X-PLAYLIST-TYPE:<EVENT|VOD>`](https://tools.ietf.org/html/draft-pantos-http-live-streaming-19#section-4.3.3.5)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaPlaylistType {
    Event,
    Vod,
}

impl FromStr for MediaPlaylistType {
    type Err = String;

    fn from_str(s: &str) -> Result<MediaPlaylistType, String> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EVENT" => Ok(MediaPlaylistType::Event),
            "VOD" => Ok(MediaPlaylistType::Vod),
            _ => Err(format!("Unable to create MediaPlaylistType from {:?}", s)),
        }
    }
}

impl fmt::Display for MediaPlaylistType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MediaPlaylistType::Event => write!(f, "EVENT"),
            MediaPlaylistType::Vod => write!(f, "VOD"),
        }
    }
}

// -----------------------------------------------------------------------------------------------
// Media Segment
// -----------------------------------------------------------------------------------------------

/// A [Media Segment](https://tools.ietf.org/html/draft-pantos-http-live-streaming-19#section-3)
/// is specified by a URI and optionally a byte range.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaSegment {
    pub uri: String,
    /// `#EXTINF:<duration>,[<title>]`
    pub duration: f64,
    /// `#EXTINF:<duration>,[<title>]`
    pub title: Option<String>,
    /// `#EXT-X-BYTERANGE:<n>[@<o>]`
    pub byte_range: Option<ByteRange>,
    /// `#EXT-X-DISCONTINUITY`
    pub discontinuity: bool,
    /// `#EXT-X-GAP`
    pub gap: bool,
    /// `#EXT-X-KEY:<attribute-list>`, inherited from earlier segments
    pub key: Option<Key>,
    /// `#EXT-X-MAP:<attribute-list>`, inherited from earlier segments
    pub map: Option<Map>,
    /// `#EXT-X-PROGRAM-DATE-TIME:<YYYY-MM-DDThh:mm:ssZ>`
    pub program_date_time: Option<String>,
    /// `#EXT-X-DATERANGE:<attribute-list>` tags seen since the previous segment
    pub date_ranges: Vec<DateRange>,
    /// `#EXT-X-BITRATE:<kbps>`
    pub bitrate: Option<u64>,
}

impl MediaSegment {
    pub fn empty() -> MediaSegment {
        Default::default()
    }

    pub fn parsed_program_date_time(&self) -> Option<chrono::DateTime<chrono::FixedOffset>> {
        self.program_date_time
            .as_deref()
            .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
    }
}

// EXT-X-KEY
//
// METHOD
// The value is an enumerated-string that specifies the encryption
// method. The methods defined are: NONE, AES-128, and SAMPLE-AES.
#[allow(non_camel_case_types)]
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyMethod {
    #[default]
    None,
    AES_128,
    SAMPLE_AES,
    Other(String),
}

impl From<&str> for KeyMethod {
    fn from(s: &str) -> Self {
        match s {
            "NONE" => KeyMethod::None,
            "AES-128" => KeyMethod::AES_128,
            "SAMPLE-AES" => KeyMethod::SAMPLE_AES,
            _ => KeyMethod::Other(s.to_string()),
        }
    }
}

impl fmt::Display for KeyMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            KeyMethod::None => write!(f, "NONE"),
            KeyMethod::AES_128 => write!(f, "AES-128"),
            KeyMethod::SAMPLE_AES => write!(f, "SAMPLE-AES"),
            KeyMethod::Other(s) => write!(f, "{}", s),
        }
    }
}

/// [`#EXT-X-KEY:<attribute-list>`](https://tools.ietf.org/html/draft-pantos-http-live-streaming-19#section-4.3.2.4)
///
/// Media Segments MAY be encrypted.  The EXT-X-KEY tag specifies how to
/// decrypt them.  It applies to every Media Segment that appears between
/// it and the next EXT-X-KEY tag in the Playlist file.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Key {
    pub method: KeyMethod,
    pub uri: Option<String>,
    pub iv: Option<String>,
    pub keyformat: Option<String>,
    pub keyformatversions: Option<String>,
}

impl Key {
    /// Requires `METHOD`.
    pub fn from_attributes(mut attrs: AttributeMap) -> Option<Key> {
        Some(Key {
            method: KeyMethod::from(attrs.remove("METHOD")?.as_str()),
            uri: attrs.remove("URI"),
            iv: attrs.remove("IV"),
            keyformat: attrs.remove("KEYFORMAT"),
            keyformatversions: attrs.remove("KEYFORMATVERSIONS"),
        })
    }
}

/// [`#EXT-X-MAP:<attribute-list>`](https://tools.ietf.org/html/draft-pantos-http-live-streaming-19#section-4.3.2.5)
///
/// The EXT-X-MAP tag specifies how to obtain the Media Initialization Section
/// required to parse the applicable Media Segments.
/// It applies to every Media Segment that appears after it in the
/// Playlist until the next EXT-X-MAP tag or until the end of the
/// playlist.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Map {
    pub uri: String,
    pub byte_range: Option<ByteRange>,
}

/// [`#EXT-X-BYTERANGE:<n>[@<o>]`](https://tools.ietf.org/html/draft-pantos-http-live-streaming-19#section-4.3.2.2)
///
/// The EXT-X-BYTERANGE tag indicates that a Media Segment is a sub-range
/// of the resource identified by its URI.  It applies only to the next
/// URI line that follows it in the Playlist.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteRange {
    pub length: u64,
    pub offset: Option<u64>,
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.length)?;
        if let Some(offset) = self.offset {
            write!(f, "@{}", offset)?;
        }
        Ok(())
    }
}

/// [`#EXT-X-DATERANGE:<attribute-list>`](https://tools.ietf.org/html/draft-pantos-http-live-streaming-19#section-4.3.2.7)
///
/// The EXT-X-DATERANGE tag associates a Date Range (i.e. a range of time
/// defined by a starting and ending date) with a set of attribute /
/// value pairs.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub id: String,
    pub class: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub duration: Option<f64>,
    pub planned_duration: Option<f64>,
    pub scte35_cmd: Option<String>,
    pub scte35_out: Option<String>,
    pub scte35_in: Option<String>,
    pub end_on_next: bool,
    /// `X-<client-attribute>` pairs, keys lower-cased
    pub client_attributes: AttributeMap,
}

impl DateRange {
    /// Requires `ID`.
    pub fn from_attributes(mut attrs: AttributeMap) -> Option<DateRange> {
        let id = attrs.remove("ID")?;
        let end_on_next = attrs.get_yes_no("END-ON-NEXT");
        let client_attributes = attrs
            .iter()
            .filter(|(k, _)| k.starts_with("x-"))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Some(DateRange {
            id,
            class: attrs.remove("CLASS"),
            start_date: attrs.remove("START-DATE"),
            end_date: attrs.remove("END-DATE"),
            duration: attrs.get_f64("DURATION"),
            planned_duration: attrs.get_f64("PLANNED-DURATION"),
            scte35_cmd: attrs.remove("SCTE35-CMD"),
            scte35_out: attrs.remove("SCTE35-OUT"),
            scte35_in: attrs.remove("SCTE35-IN"),
            end_on_next,
            client_attributes,
        })
    }

    pub fn parsed_start_date(&self) -> Option<chrono::DateTime<chrono::FixedOffset>> {
        parse_date(self.start_date.as_deref())
    }

    pub fn parsed_end_date(&self) -> Option<chrono::DateTime<chrono::FixedOffset>> {
        parse_date(self.end_date.as_deref())
    }
}

fn parse_date(s: Option<&str>) -> Option<chrono::DateTime<chrono::FixedOffset>> {
    s.and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
}

// -----------------------------------------------------------------------------------------------
// Low latency
// -----------------------------------------------------------------------------------------------

/// `#EXT-X-SERVER-CONTROL:<attribute-list>`
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerControl {
    pub can_skip_until: Option<f64>,
    pub can_skip_dateranges: bool,
    pub hold_back: Option<f64>,
    pub part_hold_back: Option<f64>,
    pub can_block_reload: bool,
}

impl ServerControl {
    pub fn from_attributes(attrs: AttributeMap) -> ServerControl {
        ServerControl {
            can_skip_until: attrs.get_f64("CAN-SKIP-UNTIL"),
            can_skip_dateranges: attrs.get_yes_no("CAN-SKIP-DATERANGES"),
            hold_back: attrs.get_f64("HOLD-BACK"),
            part_hold_back: attrs.get_f64("PART-HOLD-BACK"),
            can_block_reload: attrs.get_yes_no("CAN-BLOCK-RELOAD"),
        }
    }
}

/// `#EXT-X-PART-INF:PART-TARGET=<s>`
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PartInf {
    pub part_target: f64,
}

impl PartInf {
    pub fn from_attributes(attrs: AttributeMap) -> Option<PartInf> {
        Some(PartInf {
            part_target: attrs.get_f64("PART-TARGET")?,
        })
    }
}

/// `#EXT-X-SKIP:<attribute-list>`
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skip {
    pub skipped_segments: u64,
    pub recently_removed_dateranges: Vec<String>,
}

impl Skip {
    pub fn from_attributes(attrs: AttributeMap) -> Option<Skip> {
        Some(Skip {
            skipped_segments: attrs.get_u64("SKIPPED-SEGMENTS")?,
            recently_removed_dateranges: attrs
                .get("RECENTLY-REMOVED-DATERANGES")
                .map(|ids| {
                    ids.split('\t')
                        .filter(|id| !id.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PreloadHintType {
    Part,
    Map,
    Other(String),
}

impl From<&str> for PreloadHintType {
    fn from(s: &str) -> Self {
        match s {
            "PART" => PreloadHintType::Part,
            "MAP" => PreloadHintType::Map,
            _ => PreloadHintType::Other(s.to_string()),
        }
    }
}

/// `#EXT-X-PRELOAD-HINT:<attribute-list>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreloadHint {
    pub hint_type: PreloadHintType,
    pub uri: String,
    pub byterange_start: Option<u64>,
    pub byterange_length: Option<u64>,
}

impl PreloadHint {
    /// Requires `TYPE` and `URI`.
    pub fn from_attributes(mut attrs: AttributeMap) -> Option<PreloadHint> {
        let hint_type = PreloadHintType::from(attrs.remove("TYPE")?.as_str());
        Some(PreloadHint {
            hint_type,
            uri: attrs.remove("URI")?,
            byterange_start: attrs.get_u64("BYTERANGE-START"),
            byterange_length: attrs.get_u64("BYTERANGE-LENGTH"),
        })
    }
}

/// `#EXT-X-RENDITION-REPORT:<attribute-list>`
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenditionReport {
    pub uri: String,
    pub last_msn: Option<u64>,
    pub last_part: Option<u64>,
}

impl RenditionReport {
    /// Requires `URI`.
    pub fn from_attributes(mut attrs: AttributeMap) -> Option<RenditionReport> {
        Some(RenditionReport {
            uri: attrs.remove("URI")?,
            last_msn: attrs.get_u64("LAST-MSN"),
            last_part: attrs.get_u64("LAST-PART"),
        })
    }
}

// -----------------------------------------------------------------------------------------------
// Rest
// -----------------------------------------------------------------------------------------------

/// [`#EXT-X-START:<attribute-list>`](https://tools.ietf.org/html/draft-pantos-http-live-streaming-19#section-4.3.5.2)
///
/// The EXT-X-START tag indicates a preferred point at which to start
/// playing a Playlist.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Start {
    pub time_offset: f64,
    pub precise: bool,
}

impl Start {
    /// Requires `TIME-OFFSET`.
    pub fn from_attributes(attrs: AttributeMap) -> Option<Start> {
        Some(Start {
            time_offset: attrs.get_f64("TIME-OFFSET")?,
            precise: attrs.get_yes_no("PRECISE"),
        })
    }
}

fn take_u64(attrs: &mut AttributeMap, key: &str) -> Option<u64> {
    let n = attrs.get_u64(key);
    if n.is_some() {
        attrs.remove(key);
    }
    n
}

fn take_f64(attrs: &mut AttributeMap, key: &str) -> Option<f64> {
    let n = attrs.get_f64(key);
    if n.is_some() {
        attrs.remove(key);
    }
    n
}
