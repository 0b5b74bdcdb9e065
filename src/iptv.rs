//! Types produced by the IPTV M3U scanner.

use crate::attributes::AttributeMap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An extended IPTV M3U playlist.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub header: PlaylistHeader,
    pub items: Vec<Entry>,
    /// Problems found while scanning, in the order they were met.
    pub warnings: Vec<String>,
}

/// Attributes of the `#EXTM3U` line.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistHeader {
    /// `url-tvg` / `tvg-url` / `x-tvg-url`, split on `,` and `;`
    pub epg_urls: Vec<String>,
    /// `tvg-shift` converted from hours to whole minutes
    pub tvg_shift_minutes: Option<i64>,
    /// `user-agent` / `http-user-agent`, applied to every entry
    pub user_agent: Option<String>,
    pub catchup: Option<String>,
    pub catchup_source: Option<String>,
    pub catchup_hours: Option<f64>,
    pub catchup_days: Option<f64>,
    pub timeshift: Option<f64>,
    /// Every other attribute of the header line.
    pub raw: AttributeMap,
}

/// One `#EXTINF` record and the URL it points at.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub name: String,
    pub url: String,
    /// Seconds, rounded; `-1` marks a live stream.
    pub duration: Option<i64>,
    /// `group-title` values and `#EXTGRP` lines, deduplicated, in order of appearance.
    pub groups: Vec<String>,
    pub tvg: Option<TvgInfo>,
    pub http: Option<HttpHints>,
    /// `#KODIPROP` lines.
    pub kodi_props: IndexMap<String, String>,
    pub kind: Option<StreamKind>,
    pub audio_track: Option<String>,
    pub aspect_ratio: Option<String>,
    /// Set only when `adult` is `1` or `true`.
    pub adult: Option<bool>,
    /// Set only when `tvg-rec` is `1` or `true`.
    pub recording: Option<bool>,
    /// All attributes of the `#EXTINF` line with lower-cased keys, plus
    /// unrecognised `#EXTVLCOPT` options as `vlcopt-<key>`.
    pub attributes: AttributeMap,
}

impl Entry {
    pub fn group(&self) -> Option<&str> {
        self.groups.first().map(String::as_str)
    }

    pub fn tvg_id(&self) -> Option<&str> {
        self.tvg.as_ref().and_then(|t| t.id.as_deref())
    }
}

/// The `tvg-*` attributes of an entry.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TvgInfo {
    pub id: Option<String>,
    pub name: Option<String>,
    pub logo: Option<String>,
    pub chno: Option<String>,
}

impl TvgInfo {
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.name.is_none() && self.logo.is_none() && self.chno.is_none()
    }
}

/// HTTP request hints for fetching an entry's stream.
///
/// `headers` holds `http-header` options and pipe-suffixed URL parameters as
/// given. It is not reconciled with the dedicated fields: a `User-Agent`
/// passed after `|` shows up in `headers` even when `user_agent` was already
/// set from elsewhere.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpHints {
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub cookie: Option<String>,
    pub headers: IndexMap<String, String>,
}

impl HttpHints {
    pub fn is_empty(&self) -> bool {
        self.user_agent.is_none()
            && self.referrer.is_none()
            && self.cookie.is_none()
            && self.headers.is_empty()
    }
}

/// `tvg-type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Live,
    Vod,
    Series,
    Radio,
}

impl FromStr for StreamKind {
    type Err = String;

    fn from_str(s: &str) -> Result<StreamKind, String> {
        match s.trim().to_ascii_lowercase().as_str() {
            "live" => Ok(StreamKind::Live),
            "vod" | "movie" | "video" => Ok(StreamKind::Vod),
            "series" => Ok(StreamKind::Series),
            "radio" => Ok(StreamKind::Radio),
            _ => Err(format!("Unable to create StreamKind from {:?}", s)),
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StreamKind::Live => write!(f, "live"),
            StreamKind::Vod => write!(f, "vod"),
            StreamKind::Series => write!(f, "series"),
            StreamKind::Radio => write!(f, "radio"),
        }
    }
}

// -----------------------------------------------------------------------------------------------
// Display
// -----------------------------------------------------------------------------------------------

impl fmt::Display for Playlist {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "[IPTV Playlist | {} entries ~ {} epg urls ~ {} warnings]",
            self.items.len(),
            self.header.epg_urls.len(),
            self.warnings.len()
        )?;

        for (i, entry) in self.items.iter().enumerate() {
            write!(f, " {} -> {}", i + 1, entry)?;
        }

        Ok(())
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[Entry | name: {:?}", self.name)?;

        if let Some(d) = self.duration {
            write!(f, " ~ duration: {}", d)?;
        }
        if let Some(id) = self.tvg_id() {
            write!(f, " ~ tvg-id: {}", id)?;
        }
        if !self.groups.is_empty() {
            write!(f, " ~ groups: {}", self.groups.join(";"))?;
        }
        if let Some(kind) = self.kind {
            write!(f, " ~ kind: {}", kind)?;
        }

        writeln!(f, " ~ url: {:?}]", self.url)
    }
}
