//! Guessing whether a playlist is IPTV M3U or HLS.
//!
//! Neither dialect carries a format marker, so the head of the file is scored
//! against tags only HLS uses and attributes only IPTV uses. This is a best
//! effort classifier; callers that know the format should pass it to
//! [`ParserConfig`](crate::ParserConfig) instead.

use crate::error::Error;
use crate::lines::normalize_lines;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of leading lines the detector looks at by default.
pub const DEFAULT_DETECTION_WINDOW: usize = 50;

const HLS_TAGS: &[&str] = &[
    "#EXT-X-VERSION",
    "#EXT-X-TARGETDURATION",
    "#EXT-X-MEDIA-SEQUENCE",
    "#EXT-X-DISCONTINUITY-SEQUENCE",
    "#EXT-X-PLAYLIST-TYPE",
    "#EXT-X-ENDLIST",
    "#EXT-X-I-FRAMES-ONLY",
    "#EXT-X-INDEPENDENT-SEGMENTS",
    "#EXT-X-KEY",
    "#EXT-X-MAP",
    "#EXT-X-BYTERANGE",
    "#EXT-X-DISCONTINUITY",
    "#EXT-X-GAP",
    "#EXT-X-PROGRAM-DATE-TIME",
    "#EXT-X-DATERANGE",
    "#EXT-X-STREAM-INF",
    "#EXT-X-I-FRAME-STREAM-INF",
    "#EXT-X-MEDIA:",
    "#EXT-X-SESSION-DATA",
    "#EXT-X-SESSION-KEY",
    "#EXT-X-START",
    "#EXT-X-SERVER-CONTROL",
    "#EXT-X-PART-INF",
    "#EXT-X-PART:",
    "#EXT-X-SKIP",
    "#EXT-X-PRELOAD-HINT",
    "#EXT-X-RENDITION-REPORT",
    "#EXT-X-DEFINE",
];

// Matched case-insensitively anywhere in the line.
const IPTV_MARKERS: &[&str] = &[
    "tvg-id=",
    "tvg-name=",
    "tvg-logo=",
    "tvg-chno=",
    "tvg-shift=",
    "tvg-type=",
    "tvg-rec=",
    "tvg_id=",
    "group-title=",
    "group_title=",
    "url-tvg=",
    "x-tvg-url=",
    "catchup=",
    "catchup-source=",
    "catchup-days=",
    "#extgrp",
    "#extvlcopt",
    "#kodiprop",
];

const HLS_STRONG: &[&str] = &["#EXT-X-VERSION", "#EXT-X-TARGETDURATION", "#EXT-X-STREAM-INF"];
const IPTV_STRONG: &[&str] = &["group-title=", "tvg-id=", "tvg-name=", "tvg-logo="];

const HLS_LINE_SCORE: u32 = 10;
const IPTV_LINE_SCORE: u32 = 5;
const HLS_BONUS: u32 = 20;
const IPTV_BONUS: u32 = 15;

/// The two playlist dialects this crate understands.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaylistFormat {
    #[default]
    Iptv,
    Hls,
}

impl FromStr for PlaylistFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<PlaylistFormat, Error> {
        match s.trim().to_ascii_lowercase().as_str() {
            "iptv" | "m3u" => Ok(PlaylistFormat::Iptv),
            "hls" | "m3u8" => Ok(PlaylistFormat::Hls),
            _ => Err(Error::UnknownFormat(s.to_string())),
        }
    }
}

impl fmt::Display for PlaylistFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PlaylistFormat::Iptv => write!(f, "iptv"),
            PlaylistFormat::Hls => write!(f, "hls"),
        }
    }
}

/// Scores accumulated by [`score_format`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FormatScore {
    pub hls: u32,
    pub iptv: u32,
}

impl FormatScore {
    /// The higher scoring format. Ties go to IPTV.
    pub fn format(&self) -> PlaylistFormat {
        if self.hls > self.iptv {
            PlaylistFormat::Hls
        } else {
            PlaylistFormat::Iptv
        }
    }
}

/// Classifies `input` by looking at its first [`DEFAULT_DETECTION_WINDOW`] lines.
///
/// ```
/// use m3u_rs::{detect_format, PlaylistFormat};
///
/// assert_eq!(detect_format("#EXTM3U\n#EXT-X-TARGETDURATION:10\n"), PlaylistFormat::Hls);
/// assert_eq!(detect_format("#EXTM3U\n#EXTINF:10,Sample\nhttp://x\n"), PlaylistFormat::Iptv);
/// ```
pub fn detect_format(input: &str) -> PlaylistFormat {
    score_format(input, DEFAULT_DETECTION_WINDOW).format()
}

/// Scores the first `window` lines of `input` for both formats.
pub fn score_format(input: &str, window: usize) -> FormatScore {
    let lines = normalize_lines(input);
    score_lines(&lines, window)
}

pub(crate) fn score_lines(lines: &[&str], window: usize) -> FormatScore {
    let mut score = FormatScore::default();
    let mut saw_hls_strong = false;
    let mut saw_iptv_strong = false;

    for line in lines.iter().take(window) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let upper = trimmed.to_ascii_uppercase();
        let lower = trimmed.to_ascii_lowercase();

        if HLS_TAGS.iter().any(|tag| upper.starts_with(tag)) {
            score.hls += HLS_LINE_SCORE;
        }
        if IPTV_MARKERS.iter().any(|m| lower.contains(m)) {
            score.iptv += IPTV_LINE_SCORE;
        }

        saw_hls_strong |= HLS_STRONG.iter().any(|tag| upper.contains(tag));
        saw_iptv_strong |= IPTV_STRONG.iter().any(|m| lower.contains(m));
    }

    if saw_hls_strong {
        score.hls += HLS_BONUS;
    }
    if saw_iptv_strong {
        score.iptv += IPTV_BONUS;
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn plain_extinf_defaults_to_iptv() {
        let input = "#EXTM3U\n#EXTINF:10,Sample\nhttp://x";
        assert_eq!(score_format(input, 50), FormatScore { hls: 0, iptv: 0 });
        assert_eq!(detect_format(input), PlaylistFormat::Iptv);
    }

    #[test]
    fn empty_input_is_iptv() {
        assert_eq!(detect_format(""), PlaylistFormat::Iptv);
    }

    #[test]
    fn media_playlist_scores() {
        let input = "#EXTM3U\n#EXT-X-VERSION:3\n#EXT-X-TARGETDURATION:10\n#EXTINF:9.9,\nseg1.ts\n";
        assert_eq!(score_format(input, 50), FormatScore { hls: 40, iptv: 0 });
    }

    #[test]
    fn iptv_scores() {
        let input = "#EXTM3U\n#EXTINF:-1 tvg-id=\"a\" group-title=\"News\",A\nhttp://a\n#EXTVLCOPT:http-user-agent=x\nhttp://b";
        assert_eq!(score_format(input, 50), FormatScore { hls: 0, iptv: 25 });
    }

    #[test]
    fn window_limits_scanned_lines() {
        let mut input = String::from("#EXTM3U\n");
        for i in 0..60 {
            input.push_str(&format!("#EXTINF:-1,Channel {}\nhttp://x/{}\n", i, i));
        }
        input.push_str("#EXT-X-TARGETDURATION:10\n");
        assert_eq!(detect_format(&input), PlaylistFormat::Iptv);
        assert_eq!(score_format(&input, 1000).format(), PlaylistFormat::Hls);
    }

    #[test]
    fn tie_goes_to_iptv() {
        let score = FormatScore { hls: 15, iptv: 15 };
        assert_eq!(score.format(), PlaylistFormat::Iptv);
    }

    #[rstest]
    #[case("#EXTM3U\n#EXT-X-STREAM-INF:BANDWIDTH=1\nlow.m3u8", PlaylistFormat::Hls)]
    #[case("#extm3u\n#ext-x-targetduration:4\n#extinf:4,\na.ts", PlaylistFormat::Hls)]
    #[case("#EXTM3U url-tvg=\"http://epg\"\n#EXTINF:-1 tvg-logo=\"l\",X\nhttp://x", PlaylistFormat::Iptv)]
    #[case("#EXTM3U\n#EXTINF:-1,X\n#KODIPROP:inputstream=adaptive\nhttp://x", PlaylistFormat::Iptv)]
    fn classifies(#[case] input: &str, #[case] expected: PlaylistFormat) {
        assert_eq!(detect_format(input), expected);
    }

    #[rstest]
    #[case("IPTV", PlaylistFormat::Iptv)]
    #[case("m3u", PlaylistFormat::Iptv)]
    #[case(" hls ", PlaylistFormat::Hls)]
    #[case("M3U8", PlaylistFormat::Hls)]
    fn format_from_str(#[case] input: &str, #[case] expected: PlaylistFormat) {
        assert_eq!(input.parse::<PlaylistFormat>().ok(), Some(expected));
    }

    #[test]
    fn unknown_format_name() {
        assert!(matches!(
            "dash".parse::<PlaylistFormat>(),
            Err(Error::UnknownFormat(name)) if name == "dash"
        ));
    }
}
