//! Scanner for extended IPTV M3U playlists.
//!
//! An entry starts at an `#EXTINF` line. Every comment line after it up to the
//! first URL line may carry auxiliary directives for that entry (`#EXTGRP`,
//! `#EXTVLCOPT`, `#KODIPROP`). Nothing carries over from one entry to the next
//! except the playlist-level user agent from the header.

use crate::attributes::{parse_attributes, parse_decimal, AttributeMap};
use crate::iptv::*;
use crate::lines::normalize_lines;
use indexmap::IndexMap;
use tracing::{debug, trace};

const EXTM3U: &str = "#EXTM3U";
const EXTINF: &str = "#EXTINF";
const EXTGRP: &str = "#EXTGRP";
const EXTVLCOPT: &str = "#EXTVLCOPT";
const KODIPROP: &str = "#KODIPROP";

/// Legacy underscore spellings and the canonical key they stand in for.
const ALIASES: &[(&str, &str)] = &[
    ("tvg_id", "tvg-id"),
    ("tvg_name", "tvg-name"),
    ("tvg_logo", "tvg-logo"),
    ("group_title", "group-title"),
];

/// Parses extended IPTV M3U text.
///
/// Never fails: problems are reported in [`Playlist::warnings`] and entries
/// without a URL are left out.
///
/// ```
/// let input = "#EXTM3U\n#EXTINF:-1 tvg-id=\"a,b\" group-title=\"X\",Channel Name\nhttp://x/stream";
/// let playlist = m3u_rs::parse_iptv(input);
///
/// let entry = &playlist.items[0];
/// assert_eq!(entry.name, "Channel Name");
/// assert_eq!(entry.duration, Some(-1));
/// assert_eq!(entry.tvg_id(), Some("a,b"));
/// assert_eq!(entry.group(), Some("X"));
/// ```
pub fn parse_iptv(input: &str) -> Playlist {
    let lines = normalize_lines(input);
    let mut playlist = Playlist::default();

    let mut i = match lines.iter().position(|l| !l.trim().is_empty()) {
        Some(first) if has_tag(lines[first].trim(), EXTM3U) => {
            playlist.header = parse_header(&lines[first].trim()[EXTM3U.len()..]);
            first + 1
        }
        _ => {
            push_warning(&mut playlist.warnings, "Missing #EXTM3U header".to_string());
            0
        }
    };

    while i < lines.len() {
        let line = lines[i].trim();
        if has_tag(line, EXTINF) {
            i = scan_entry(&lines, i, &mut playlist);
        } else {
            if !line.is_empty() && !line.starts_with('#') {
                trace!(line_no = i + 1, "URL line without #EXTINF");
            }
            i += 1;
        }
    }

    debug!(
        lines = lines.len(),
        entries = playlist.items.len(),
        warnings = playlist.warnings.len(),
        "parsed IPTV playlist"
    );
    playlist
}

// -----------------------------------------------------------------------------------------------
// Header
// -----------------------------------------------------------------------------------------------

/// Reads the attributes following `#EXTM3U`.
pub fn parse_header(attr_text: &str) -> PlaylistHeader {
    let mut attrs = parse_attributes(attr_text);
    attrs.unescape_values();

    let mut epg_urls = Vec::new();
    for key in ["url-tvg", "tvg-url", "x-tvg-url"] {
        if let Some(urls) = attrs.remove(key) {
            epg_urls.extend(
                urls.split([',', ';'])
                    .map(str::trim)
                    .filter(|u| !u.is_empty())
                    .map(String::from),
            );
        }
    }

    let user_agent = attrs.remove("user-agent");
    let http_user_agent = attrs.remove("http-user-agent");

    PlaylistHeader {
        epg_urls,
        tvg_shift_minutes: take_decimal(&mut attrs, "tvg-shift").map(|h| (h * 60.0).round() as i64),
        user_agent: user_agent.or(http_user_agent),
        catchup: attrs.remove("catchup"),
        catchup_source: attrs.remove("catchup-source"),
        catchup_hours: take_decimal(&mut attrs, "catchup-hours"),
        catchup_days: take_decimal(&mut attrs, "catchup-days"),
        timeshift: take_decimal(&mut attrs, "timeshift"),
        raw: attrs,
    }
}

/// Removes and returns `key` if it holds a number; otherwise leaves it in place.
fn take_decimal(attrs: &mut AttributeMap, key: &str) -> Option<f64> {
    let n = attrs.get(key).and_then(parse_decimal)?;
    attrs.remove(key);
    Some(n)
}

// -----------------------------------------------------------------------------------------------
// Entries
// -----------------------------------------------------------------------------------------------

/// Scans the entry whose `#EXTINF` is at `start` and returns the index of the
/// first line after it.
fn scan_entry(lines: &[&str], start: usize, playlist: &mut Playlist) -> usize {
    let extinf = lines[start].trim();
    let body = &extinf[EXTINF.len()..];
    let body = body.strip_prefix(':').unwrap_or(body);

    let (meta, display_name) = split_at_unquoted_comma(body);
    let (duration, attr_text) = split_duration(meta);

    let mut attrs = parse_attributes(attr_text);
    attrs.unescape_values();
    normalize_aliases(&mut attrs);

    let mut groups = Vec::new();
    if let Some(titles) = attrs.get("group-title") {
        for g in titles.split(';') {
            add_group(&mut groups, g);
        }
    }

    let mut http = HttpHints {
        user_agent: attrs
            .get_any(&["user-agent", "http-user-agent"])
            .map(String::from)
            .or_else(|| playlist.header.user_agent.clone()),
        referrer: attrs.get_any(&["referer", "http-referrer"]).map(String::from),
        ..Default::default()
    };
    let mut kodi_props = IndexMap::new();

    let mut next = start + 1;
    let mut url = None;
    while next < lines.len() {
        let line = lines[next].trim();
        if line.is_empty() {
            next += 1;
            continue;
        }
        if has_tag(line, EXTINF) {
            break;
        }
        next += 1;
        if line.starts_with('#') {
            apply_directive(line, &mut groups, &mut http, &mut kodi_props, &mut attrs);
        } else {
            url = Some(line);
            break;
        }
    }

    // A pipe suffix with nothing before it leaves no URL either.
    let (url, pipe_params) = match url {
        Some(line) => match line.split_once('|') {
            Some((url, params)) => (url.trim(), Some(params)),
            None => (line, None),
        },
        None => ("", None),
    };

    if url.is_empty() {
        push_warning(
            &mut playlist.warnings,
            format!(
                "No URL for entry at line {} before the next #EXTINF or end of input: {}",
                start + 1,
                extinf
            ),
        );
        return next;
    }

    if let Some(params) = pipe_params {
        apply_pipe_headers(params, &mut http);
    }

    let tvg = TvgInfo {
        id: attrs.get("tvg-id").map(String::from),
        name: attrs.get("tvg-name").map(String::from),
        logo: attrs.get("tvg-logo").map(String::from),
        chno: attrs.get("tvg-chno").map(String::from),
    };

    let display_name = display_name.trim();
    let name = if !display_name.is_empty() {
        display_name
    } else {
        attrs
            .get_any(&["tvg-name", "tvg-id"])
            .filter(|n| !n.is_empty())
            .unwrap_or(url)
    }
    .to_string();

    playlist.items.push(Entry {
        name,
        url: url.to_string(),
        duration,
        groups,
        tvg: if tvg.is_empty() { None } else { Some(tvg) },
        http: if http.is_empty() { None } else { Some(http) },
        kodi_props,
        kind: attrs.get("tvg-type").and_then(|t| t.parse().ok()),
        audio_track: attrs.get("audio-track").map(String::from),
        aspect_ratio: attrs.get("aspect-ratio").map(String::from),
        adult: flag(&attrs, "adult"),
        recording: flag(&attrs, "tvg-rec"),
        attributes: attrs,
    });

    next
}

/// Splits at the first comma that is outside single or double quotes. Escaped
/// quotes inside a quoted run do not close it. The right-hand side is empty
/// when there is no such comma.
fn split_at_unquoted_comma(s: &str) -> (&str, &str) {
    let mut in_double = false;
    let mut in_single = false;
    let mut escaped = false;

    for (pos, c) in s.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_double || in_single => escaped = true,
            '"' if !in_single => in_double = !in_double,
            '\'' if !in_double => in_single = !in_single,
            ',' if !in_double && !in_single => return (&s[..pos], &s[pos + 1..]),
            _ => {}
        }
    }

    (s, "")
}

/// Takes a leading numeric duration off `meta`. When the first token is not a
/// number the whole segment is attributes.
fn split_duration(meta: &str) -> (Option<i64>, &str) {
    let meta = meta.trim_start();
    let token_end = meta.find(char::is_whitespace).unwrap_or(meta.len());

    match parse_decimal(&meta[..token_end]) {
        Some(d) => (Some(d.round() as i64), &meta[token_end..]),
        None => (None, meta),
    }
}

/// Fills canonical keys from their underscore aliases, never overwriting a
/// canonical key that is already present.
fn normalize_aliases(attrs: &mut AttributeMap) {
    for (legacy, canonical) in ALIASES {
        if attrs.contains_key(canonical) {
            continue;
        }
        if let Some(value) = attrs.get(legacy).map(String::from) {
            attrs.insert(canonical, value);
        }
    }
}

fn flag(attrs: &AttributeMap, key: &str) -> Option<bool> {
    match attrs.get(key) {
        Some("1") | Some("true") => Some(true),
        _ => None,
    }
}

fn add_group(groups: &mut Vec<String>, group: &str) {
    let group = group.trim();
    if !group.is_empty() && !groups.iter().any(|g| g == group) {
        groups.push(group.to_string());
    }
}

fn apply_directive(
    line: &str,
    groups: &mut Vec<String>,
    http: &mut HttpHints,
    kodi_props: &mut IndexMap<String, String>,
    attrs: &mut AttributeMap,
) {
    if let Some(group) = tag_value(line, EXTGRP) {
        add_group(groups, group);
    } else if let Some(option) = tag_value(line, EXTVLCOPT) {
        let Some((key, value)) = option.split_once('=') else {
            return;
        };
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim();
        match key.as_str() {
            "http-user-agent" => http.user_agent = Some(value.to_string()),
            "http-referrer" | "http-referer" => http.referrer = Some(value.to_string()),
            "http-cookie" => http.cookie = Some(value.to_string()),
            "http-header" => {
                if let Some((name, header_value)) = value.split_once(':') {
                    http.headers
                        .insert(name.trim().to_string(), header_value.trim().to_string());
                }
            }
            _ => {
                attrs.insert(format!("vlcopt-{}", key), value);
            }
        }
    } else if let Some(prop) = tag_value(line, KODIPROP) {
        if let Some((key, value)) = prop.split_once('=') {
            kodi_props.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
}

/// Merges `Key=Value&Key=Value` parameters found after `|` in a URL.
///
/// Every pair lands in `headers`. The dedicated fields are only filled when
/// nothing set them before.
fn apply_pipe_headers(params: &str, http: &mut HttpHints) {
    for pair in params.split('&') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();
        if key.is_empty() {
            continue;
        }

        let dedicated = match key.to_ascii_lowercase().as_str() {
            "user-agent" => Some(&mut http.user_agent),
            "referer" | "referrer" => Some(&mut http.referrer),
            "cookie" => Some(&mut http.cookie),
            _ => None,
        };
        if let Some(field) = dedicated {
            if field.is_none() {
                *field = Some(value.to_string());
            }
        }

        http.headers.insert(key.to_string(), value.to_string());
    }
}

/// Case-insensitive `starts_with` for ASCII tags.
fn has_tag(line: &str, tag: &str) -> bool {
    line.get(..tag.len())
        .map_or(false, |head| head.eq_ignore_ascii_case(tag))
}

/// The text after `tag:` when `line` starts with `tag`.
fn tag_value<'a>(line: &'a str, tag: &str) -> Option<&'a str> {
    if !has_tag(line, tag) {
        return None;
    }
    let rest = &line[tag.len()..];
    Some(rest.strip_prefix(':').unwrap_or(rest).trim())
}

fn push_warning(warnings: &mut Vec<String>, warning: String) {
    debug!("{}", warning);
    warnings.push(warning);
}
