//! Line scanners for HLS media and master playlists.
//!
//! Both scanners make a single forward pass. Every line first has its
//! `{$name}` references substituted, then its tag name is split off at the
//! first `:` and looked up in one `match`, so overlapping prefixes such as
//! `#EXT-X-DISCONTINUITY` and `#EXT-X-DISCONTINUITY-SEQUENCE` never shadow
//! each other.

use crate::attributes::{float, number, parse_attribute_list, parse_decimal, AttributeMap};
use crate::hls::*;
use crate::lines::{normalize_lines, Variables};
use nom::bytes::complete::take_till;
use nom::character::complete::{char, space0};
use nom::combinator::{map, opt, rest};
use nom::sequence::{pair, preceded, tuple};
use nom::IResult;
use std::mem;
use tracing::{debug, trace};

/// Parses HLS text, picking the master or media scanner with
/// [`is_master_playlist`].
///
/// ```
/// use m3u_rs::{parse_hls, HlsPlaylist};
///
/// let input = "#EXTM3U\n#EXT-X-STREAM-INF:BANDWIDTH=1280000\nlow/index.m3u8\n";
/// match parse_hls(input) {
///     HlsPlaylist::Master(pl) => assert_eq!(pl.variants[0].uri, "low/index.m3u8"),
///     HlsPlaylist::Media(_) => unreachable!(),
/// }
/// ```
pub fn parse_hls(input: &str) -> HlsPlaylist {
    let lines = normalize_lines(input);
    if contains_master_tag(&lines).unwrap_or(false) {
        HlsPlaylist::Master(master_playlist_from_lines(&lines))
    } else {
        HlsPlaylist::Media(media_playlist_from_lines(&lines))
    }
}

/// Parse input as a media playlist
pub fn parse_media_playlist(input: &str) -> MediaPlaylist {
    media_playlist_from_lines(&normalize_lines(input))
}

/// Parse input as a master playlist
pub fn parse_master_playlist(input: &str) -> MasterPlaylist {
    master_playlist_from_lines(&normalize_lines(input))
}

/// When a media tag or no master tag is found, this returns false.
pub fn is_master_playlist(input: &str) -> bool {
    // Assume it's not a master playlist
    contains_master_tag(&normalize_lines(input)).unwrap_or(false)
}

/// Scans lines looking for either a master or media `#EXT` tag.
///
/// Returns `Some(true/false)` for the first master/media tag found, `None`
/// when neither appears.
fn contains_master_tag(lines: &[&str]) -> Option<bool> {
    lines.iter().find_map(|line| match split_tag(line.trim()) {
        Some((name, _)) => match name.as_str() {
            "EXT-X-STREAM-INF"
            | "EXT-X-I-FRAME-STREAM-INF"
            | "EXT-X-MEDIA"
            | "EXT-X-SESSION-KEY"
            | "EXT-X-SESSION-DATA" => Some(true),
            "EXT-X-TARGETDURATION"
            | "EXT-X-MEDIA-SEQUENCE"
            | "EXT-X-DISCONTINUITY-SEQUENCE"
            | "EXT-X-ENDLIST"
            | "EXT-X-PLAYLIST-TYPE"
            | "EXT-X-I-FRAMES-ONLY"
            | "EXTINF"
            | "EXT-X-BYTERANGE"
            | "EXT-X-DISCONTINUITY"
            | "EXT-X-KEY"
            | "EXT-X-MAP"
            | "EXT-X-PROGRAM-DATE-TIME"
            | "EXT-X-DATERANGE" => Some(false),
            _ => None,
        },
        None => None,
    })
}

// -----------------------------------------------------------------------------------------------
// Media Playlist
// -----------------------------------------------------------------------------------------------

/// Forward-carried state of the media scanner.
///
/// `key`, `map` and `bitrate` are sticky: every segment takes whatever was
/// declared last. The `pending_*` fields are consumed by exactly one segment,
/// the next one opened by `#EXTINF`.
#[derive(Default)]
struct MediaScanner {
    playlist: MediaPlaylist,
    vars: Variables,

    key: Option<Key>,
    map: Option<Map>,
    bitrate: Option<u64>,

    pending_date_ranges: Vec<DateRange>,
    pending_discontinuity: bool,
    pending_gap: bool,
    pending_program_date_time: Option<String>,

    segment: Option<MediaSegment>,
}

impl MediaScanner {
    fn scan_line(&mut self, raw: &str, line_no: usize) {
        let line = self.vars.substitute(raw);
        let line = line.trim();

        if line.is_empty() {
            return;
        }
        if !line.starts_with('#') {
            self.close_segment(line, line_no);
            return;
        }

        let (name, value) = match split_tag(line) {
            Some(tag) => tag,
            None => return, // plain comment
        };

        match name.as_str() {
            "EXTM3U" => {}
            "EXT-X-VERSION" => self.playlist.version = value.trim().parse().ok(),
            "EXT-X-TARGETDURATION" => {
                if let Some(d) = parse_decimal(value) {
                    self.playlist.target_duration = d;
                }
            }
            "EXT-X-MEDIA-SEQUENCE" => self.playlist.media_sequence = value.trim().parse().ok(),
            "EXT-X-DISCONTINUITY-SEQUENCE" => {
                self.playlist.discontinuity_sequence = value.trim().parse().ok()
            }
            "EXT-X-PLAYLIST-TYPE" => self.playlist.playlist_type = value.parse().ok(),
            "EXT-X-ENDLIST" => self.playlist.end_list = true,
            "EXT-X-I-FRAMES-ONLY" => self.playlist.i_frames_only = true,
            "EXT-X-INDEPENDENT-SEGMENTS" => self.playlist.independent_segments = true,
            "EXT-X-DISCONTINUITY" => self.pending_discontinuity = true,
            "EXT-X-GAP" => self.pending_gap = true,
            "EXT-X-PROGRAM-DATE-TIME" => {
                self.pending_program_date_time = Some(value.trim().to_string())
            }
            "EXT-X-KEY" => match Key::from_attributes(attributes(value)) {
                Some(key) => self.key = Some(key),
                None => trace!(line_no, "dropping #EXT-X-KEY without METHOD"),
            },
            "EXT-X-MAP" => match map_from_attributes(attributes(value)) {
                Some(map) => self.map = Some(map),
                None => trace!(line_no, "dropping #EXT-X-MAP without URI"),
            },
            "EXT-X-DATERANGE" => match DateRange::from_attributes(attributes(value)) {
                Some(range) => self.pending_date_ranges.push(range),
                None => trace!(line_no, "dropping #EXT-X-DATERANGE without ID"),
            },
            "EXT-X-BITRATE" => self.bitrate = value.trim().parse().ok(),
            "EXTINF" => self.open_segment(value, line_no),
            "EXT-X-BYTERANGE" => match (self.segment.as_mut(), byte_range(value.trim())) {
                (Some(segment), Some(range)) => segment.byte_range = Some(range),
                _ => trace!(line_no, "ignoring #EXT-X-BYTERANGE outside a segment"),
            },
            "EXT-X-SERVER-CONTROL" => {
                self.playlist.server_control = Some(ServerControl::from_attributes(attributes(value)))
            }
            "EXT-X-PART-INF" => {
                if let Some(part_inf) = PartInf::from_attributes(attributes(value)) {
                    self.playlist.part_inf = Some(part_inf);
                }
            }
            "EXT-X-SKIP" => {
                if let Some(skip) = Skip::from_attributes(attributes(value)) {
                    self.playlist.skip = Some(skip);
                }
            }
            "EXT-X-START" => {
                if let Some(start) = Start::from_attributes(attributes(value)) {
                    self.playlist.start = Some(start);
                }
            }
            "EXT-X-PRELOAD-HINT" => {
                if let Some(hint) = PreloadHint::from_attributes(attributes(value)) {
                    self.playlist.preload_hints.push(hint);
                }
            }
            "EXT-X-RENDITION-REPORT" => {
                if let Some(report) = RenditionReport::from_attributes(attributes(value)) {
                    self.playlist.rendition_reports.push(report);
                }
            }
            "EXT-X-DEFINE" => define(&mut self.vars, value),
            "EXT-X-STREAM-INF"
            | "EXT-X-I-FRAME-STREAM-INF"
            | "EXT-X-MEDIA"
            | "EXT-X-SESSION-DATA"
            | "EXT-X-SESSION-KEY" => {
                trace!(line_no, tag = %name, "master tag in media playlist");
            }
            other if other.starts_with("EXT-X-") => {
                for (k, v) in attributes(value) {
                    if k.starts_with("x-") {
                        self.playlist.custom_attributes.insert(k, v);
                    }
                }
            }
            _ => {}
        }
    }

    fn open_segment(&mut self, value: &str, line_no: usize) {
        if self.segment.is_some() {
            trace!(line_no, "#EXTINF replaces a segment that never got a URI");
        }

        let (duration, title) = duration_title(value);
        self.segment = Some(MediaSegment {
            duration,
            title,
            key: self.key.clone(),
            map: self.map.clone(),
            bitrate: self.bitrate,
            discontinuity: mem::take(&mut self.pending_discontinuity),
            gap: mem::take(&mut self.pending_gap),
            program_date_time: self.pending_program_date_time.take(),
            date_ranges: mem::take(&mut self.pending_date_ranges),
            ..MediaSegment::empty()
        });
    }

    fn close_segment(&mut self, uri: &str, line_no: usize) {
        match self.segment.take() {
            Some(mut segment) => {
                segment.uri = uri.to_string();
                self.playlist.segments.push(segment);
            }
            None => trace!(line_no, uri, "URI line without #EXTINF"),
        }
    }

    fn finish(mut self) -> MediaPlaylist {
        if self.playlist.target_duration == 0.0 && !self.playlist.segments.is_empty() {
            let warning = format!(
                "Media playlist has {} segments but no #EXT-X-TARGETDURATION",
                self.playlist.segments.len()
            );
            debug!("{}", warning);
            self.playlist.warnings.push(warning);
        }
        self.playlist
    }
}

fn media_playlist_from_lines(lines: &[&str]) -> MediaPlaylist {
    let mut scanner = MediaScanner::default();
    for (i, line) in lines.iter().enumerate() {
        scanner.scan_line(line, i + 1);
    }
    let playlist = scanner.finish();

    debug!(
        lines = lines.len(),
        segments = playlist.segments.len(),
        warnings = playlist.warnings.len(),
        "parsed HLS media playlist"
    );
    playlist
}

fn map_from_attributes(mut attrs: AttributeMap) -> Option<Map> {
    Some(Map {
        uri: attrs.remove("URI")?,
        byte_range: attrs.get("BYTERANGE").and_then(byte_range),
    })
}

// -----------------------------------------------------------------------------------------------
// Master Playlist
// -----------------------------------------------------------------------------------------------

fn master_playlist_from_lines(lines: &[&str]) -> MasterPlaylist {
    let mut playlist = MasterPlaylist::default();
    let mut vars = Variables::new();
    let mut i = 0;

    while i < lines.len() {
        let line_no = i + 1;
        let line = vars.substitute(lines[i]);
        let line = line.trim();
        i += 1;

        let (name, value) = match split_tag(line) {
            Some(tag) => tag,
            None => continue,
        };

        match name.as_str() {
            "EXT-X-VERSION" => playlist.version = value.trim().parse().ok(),
            "EXT-X-STREAM-INF" => {
                // The URI is the very next line; a comment or blank line there
                // means the tag has no target and is dropped.
                let next = lines.get(i).map(|l| vars.substitute(l));
                let uri = next.as_deref().map(str::trim).filter(|l| is_uri_line(l));
                match uri {
                    Some(uri) => {
                        if let Some(mut variant) = VariantStream::from_attributes(attributes(value)) {
                            variant.uri = uri.to_string();
                            playlist.variants.push(variant);
                        } else {
                            trace!(line_no, "dropping #EXT-X-STREAM-INF without BANDWIDTH");
                        }
                        i += 1;
                    }
                    None => trace!(line_no, "dropping #EXT-X-STREAM-INF without URI line"),
                }
            }
            "EXT-X-I-FRAME-STREAM-INF" => match IFrameStream::from_attributes(attributes(value)) {
                Some(stream) => playlist.i_frame_streams.push(stream),
                None => trace!(line_no, "dropping #EXT-X-I-FRAME-STREAM-INF"),
            },
            "EXT-X-MEDIA" => match Rendition::from_attributes(attributes(value)) {
                Some(rendition) => playlist.renditions.push(rendition),
                None => trace!(line_no, "dropping #EXT-X-MEDIA"),
            },
            "EXT-X-SESSION-DATA" => match SessionData::from_attributes(attributes(value)) {
                Some(data) => playlist.session_data.push(data),
                None => trace!(line_no, "dropping #EXT-X-SESSION-DATA without DATA-ID"),
            },
            "EXT-X-SESSION-KEY" => match Key::from_attributes(attributes(value)) {
                Some(key) => playlist.session_keys.push(SessionKey(key)),
                None => trace!(line_no, "dropping #EXT-X-SESSION-KEY without METHOD"),
            },
            "EXT-X-START" => {
                if let Some(start) = Start::from_attributes(attributes(value)) {
                    playlist.start = Some(start);
                }
            }
            "EXT-X-INDEPENDENT-SEGMENTS" => playlist.independent_segments = true,
            "EXT-X-DEFINE" => define(&mut vars, value),
            _ => {}
        }
    }

    if playlist.variants.is_empty() {
        let warning = "Master playlist has no variant streams".to_string();
        debug!("{}", warning);
        playlist.warnings.push(warning);
    }

    debug!(
        lines = lines.len(),
        variants = playlist.variants.len(),
        renditions = playlist.renditions.len(),
        "parsed HLS master playlist"
    );
    playlist
}

fn is_uri_line(line: &str) -> bool {
    !line.is_empty() && !line.starts_with('#')
}

// -----------------------------------------------------------------------------------------------
// Util
// -----------------------------------------------------------------------------------------------

/// Splits `#EXT...[:value]` into an upper-cased tag name and the value.
/// Returns `None` for plain comments and non-tag lines.
fn split_tag(line: &str) -> Option<(String, &str)> {
    let (_, (name, value)) = ext_tag(line).ok()?;
    if !name.get(..3).map_or(false, |p| p.eq_ignore_ascii_case("EXT")) {
        return None;
    }
    Some((name.to_ascii_uppercase(), value))
}

fn ext_tag(i: &str) -> IResult<&str, (&str, &str)> {
    map(
        tuple((
            char('#'),
            take_till(|c: char| c == ':' || c.is_whitespace()),
            opt(char(':')),
            rest,
        )),
        |(_, name, _, value)| (name, value),
    )(i)
}

fn attributes(value: &str) -> AttributeMap {
    let mut attrs = parse_attribute_list(value);
    attrs.unescape_values();
    attrs
}

fn define(vars: &mut Variables, value: &str) {
    let attrs = attributes(value);
    if let (Some(name), Some(value)) = (attrs.get("NAME"), attrs.get("VALUE")) {
        vars.define(name, value);
    }
}

/// `<duration>,[<title>]`; a missing or unreadable duration counts as zero.
fn duration_title(value: &str) -> (f64, Option<String>) {
    let parsed: IResult<&str, (Option<f64>, Option<&str>)> = map(
        tuple((
            space0,
            opt(float),
            take_till(|c: char| c == ','),
            opt(preceded(char(','), rest)),
        )),
        |(_, duration, _, title)| (duration, title),
    )(value);

    match parsed {
        Ok((_, (duration, title))) => (
            duration.unwrap_or(0.0),
            title.map(str::trim).filter(|t| !t.is_empty()).map(String::from),
        ),
        Err(_) => (0.0, None),
    }
}

fn byte_range_val(i: &str) -> IResult<&str, ByteRange> {
    map(pair(number, opt(preceded(char('@'), number))), |(n, o)| {
        ByteRange {
            length: n,
            offset: o,
        }
    })(i)
}

fn byte_range(s: &str) -> Option<ByteRange> {
    byte_range_val(s).ok().map(|(_, range)| range)
}
