//! A library to parse the two playlist dialects that share the `.m3u` family
//! of file extensions:
//!
//! * extended IPTV M3U, the channel lists served by IPTV providers, with
//!   `tvg-*` attributes, groups and per-entry HTTP hints;
//! * HLS m3u8 ([RFC 8216](https://tools.ietf.org/html/rfc8216)), both master
//!   and media playlists, including the low-latency extensions.
//!
//! Parsing never fails on malformed playlist text. Each scanner recovers at the
//! line it could not use and reports it in the `warnings` list of the playlist
//! it returns. Only the checks made by [`Parser`] before scanning starts
//! produce an [`Error`].
//!
//! # Examples
//!
//! Parsing a playlist and letting the parser figure out which dialect it is.
//!
//! ```
//! use m3u_rs::ParsedPlaylist;
//!
//! let input = "#EXTM3U\n#EXTINF:-1 tvg-id=\"news.uk\" group-title=\"News\",News 24\nhttp://x/news";
//!
//! match m3u_rs::parse(input).unwrap() {
//!     ParsedPlaylist::Iptv(pl) => println!("IPTV playlist:\n{}", pl),
//!     ParsedPlaylist::Hls(pl) => println!("HLS playlist:\n{:?}", pl),
//! }
//! ```
//!
//! Parsing a media playlist directly.
//!
//! ```
//! let input = "#EXTM3U\n#EXT-X-TARGETDURATION:10\n#EXTINF:9.009,\nfirst.ts\n#EXT-X-ENDLIST\n";
//!
//! let pl = m3u_rs::parse_media_playlist(input);
//! assert_eq!(pl.target_duration, 10.0);
//! assert_eq!(pl.segments[0].uri, "first.ts");
//! assert!(pl.end_list);
//! ```
//!
//! Using a configured parser.
//!
//! ```
//! use m3u_rs::{Error, Parser, ParserConfig, PlaylistFormat};
//!
//! let parser = Parser::new(
//!     ParserConfig::default()
//!         .with_format(PlaylistFormat::Hls)
//!         .with_max_input_bytes(16),
//! );
//!
//! let result = parser.parse("#EXTM3U\n#EXT-X-TARGETDURATION:10\n");
//! assert!(matches!(result, Err(Error::InputTooLarge { limit: 16, .. })));
//! ```

pub mod attributes;
pub mod config;
pub mod detect;
pub mod error;
pub mod hls;
pub mod hls_parser;
pub mod iptv;
pub mod iptv_parser;
pub mod lines;

pub use attributes::AttributeMap;
pub use config::ParserConfig;
pub use detect::{detect_format, score_format, FormatScore, PlaylistFormat};
pub use error::{Error, Result};
pub use hls::{HlsPlaylist, MasterPlaylist, MediaPlaylist, MediaSegment};
pub use hls_parser::{is_master_playlist, parse_hls, parse_master_playlist, parse_media_playlist};
pub use iptv::{Entry, Playlist, PlaylistHeader};
pub use iptv_parser::parse_iptv;

use crate::lines::normalize_lines;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The result of [`Parser::parse`]: one of the two dialects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", content = "playlist", rename_all = "lowercase")]
pub enum ParsedPlaylist {
    Iptv(Playlist),
    Hls(HlsPlaylist),
}

impl ParsedPlaylist {
    pub fn format(&self) -> PlaylistFormat {
        match self {
            ParsedPlaylist::Iptv(_) => PlaylistFormat::Iptv,
            ParsedPlaylist::Hls(_) => PlaylistFormat::Hls,
        }
    }

    pub fn warnings(&self) -> &[String] {
        match self {
            ParsedPlaylist::Iptv(pl) => &pl.warnings,
            ParsedPlaylist::Hls(pl) => pl.warnings(),
        }
    }

    pub fn as_iptv(&self) -> Option<&Playlist> {
        match self {
            ParsedPlaylist::Iptv(pl) => Some(pl),
            ParsedPlaylist::Hls(_) => None,
        }
    }

    pub fn as_hls(&self) -> Option<&HlsPlaylist> {
        match self {
            ParsedPlaylist::Hls(pl) => Some(pl),
            ParsedPlaylist::Iptv(_) => None,
        }
    }
}

/// Front door that applies a [`ParserConfig`] before dispatching to the
/// dialect scanners.
#[derive(Debug, Default, Clone)]
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    pub fn new(config: ParserConfig) -> Parser {
        Parser { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parses `input`, detecting the format unless the config fixes one.
    pub fn parse(&self, input: &str) -> Result<ParsedPlaylist> {
        if let Some(limit) = self.config.max_input_bytes {
            if input.len() > limit {
                return Err(Error::InputTooLarge {
                    size: input.len(),
                    limit,
                });
            }
        }

        let format = match self.config.format {
            Some(format) => format,
            None => {
                let lines = normalize_lines(input);
                let score = detect::score_lines(&lines, self.config.detection_window);
                debug!(hls = score.hls, iptv = score.iptv, "detected playlist format");
                score.format()
            }
        };

        debug!(%format, bytes = input.len(), "parsing playlist");
        Ok(match format {
            PlaylistFormat::Iptv => ParsedPlaylist::Iptv(parse_iptv(input)),
            PlaylistFormat::Hls => ParsedPlaylist::Hls(parse_hls(input)),
        })
    }

    /// Like [`Parser::parse`], for raw bytes that must be UTF-8.
    pub fn parse_bytes(&self, input: &[u8]) -> Result<ParsedPlaylist> {
        if let Some(limit) = self.config.max_input_bytes {
            if input.len() > limit {
                return Err(Error::InputTooLarge {
                    size: input.len(),
                    limit,
                });
            }
        }
        self.parse(std::str::from_utf8(input)?)
    }
}

/// Parses `input` with the default [`ParserConfig`].
pub fn parse(input: &str) -> Result<ParsedPlaylist> {
    Parser::default().parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatches_on_detected_format() {
        let iptv = parse("#EXTM3U\n#EXTINF:-1 tvg-id=\"a\",A\nhttp://a\n").unwrap();
        assert_eq!(iptv.format(), PlaylistFormat::Iptv);
        assert_eq!(iptv.as_iptv().map(|pl| pl.items.len()), Some(1));

        let hls = parse("#EXTM3U\n#EXT-X-TARGETDURATION:4\n#EXTINF:4,\na.ts\n").unwrap();
        assert_eq!(hls.format(), PlaylistFormat::Hls);
        assert!(hls.as_iptv().is_none());
    }

    #[test]
    fn format_override_skips_detection() {
        let parser = Parser::new(ParserConfig::default().with_format(PlaylistFormat::Iptv));
        let parsed = parser
            .parse("#EXTM3U\n#EXT-X-TARGETDURATION:4\n#EXTINF:4,\na.ts\n")
            .unwrap();
        let pl = parsed.as_iptv().unwrap();
        assert_eq!(pl.items[0].url, "a.ts");
        assert_eq!(pl.items[0].duration, Some(4));
    }

    #[test]
    fn input_limit() {
        let parser = Parser::new(ParserConfig::default().with_max_input_bytes(8));
        assert!(parser.parse("#EXTM3U\n").is_ok());
        assert!(matches!(
            parser.parse("#EXTM3U\n\n"),
            Err(Error::InputTooLarge { size: 9, limit: 8 })
        ));
        assert!(matches!(
            parser.parse_bytes(b"#EXTM3U\n\n"),
            Err(Error::InputTooLarge { size: 9, limit: 8 })
        ));
    }

    #[test]
    fn invalid_utf8() {
        let result = Parser::default().parse_bytes(b"#EXTM3U\n#EXTINF:-1,\xff\nhttp://a\n");
        assert!(matches!(result, Err(Error::InvalidUtf8(_))));
    }

    #[test]
    fn detection_window_is_configurable() {
        let mut input = String::from("#EXTM3U\n");
        for i in 0..10 {
            input.push_str(&format!("#EXTINF:-1,Channel {}\nhttp://x/{}\n", i, i));
        }
        input.push_str("#EXT-X-TARGETDURATION:10\n");

        let narrow = Parser::new(ParserConfig::default().with_detection_window(5));
        assert_eq!(narrow.parse(&input).unwrap().format(), PlaylistFormat::Iptv);

        let wide = Parser::new(ParserConfig::default().with_detection_window(100));
        assert_eq!(wide.parse(&input).unwrap().format(), PlaylistFormat::Hls);
    }

    #[test]
    fn warnings_pass_through() {
        let parsed = parse("#EXTINF:-1,A\nhttp://a\n").unwrap();
        assert_eq!(parsed.warnings(), ["Missing #EXTM3U header".to_string()]);
    }
}
