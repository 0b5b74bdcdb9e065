use m3u_rs::hls::*;
use m3u_rs::iptv::*;
use m3u_rs::*;
use std::fs;
use std::path;

fn all_sample_playlists() -> Vec<path::PathBuf> {
    let path: path::PathBuf = ["sample-playlists"].iter().collect();
    fs::read_dir(path)
        .expect("Can't list sample-playlists")
        .filter_map(std::result::Result::ok)
        .map(|dir| dir.path())
        .filter(|path| {
            path.extension()
                .map_or(false, |ext| ext == "m3u" || ext == "m3u8")
        })
        .collect()
}

fn get_sample_playlist(name: &str) -> String {
    let path: path::PathBuf = ["sample-playlists", name].iter().collect();
    fs::read_to_string(&path).unwrap_or_else(|_| panic!("Can't read playlist: {:?}", path))
}

fn get_media(name: &str) -> MediaPlaylist {
    match parse_hls(&get_sample_playlist(name)) {
        HlsPlaylist::Media(pl) => pl,
        HlsPlaylist::Master(_) => panic!("{} parsed as a master playlist", name),
    }
}

fn get_master(name: &str) -> MasterPlaylist {
    match parse_hls(&get_sample_playlist(name)) {
        HlsPlaylist::Master(pl) => pl,
        HlsPlaylist::Media(_) => panic!("{} parsed as a media playlist", name),
    }
}

// -----------------------------------------------------------------------------------------------
// All samples

#[test]
fn every_sample_is_detected_by_extension() {
    let samples = all_sample_playlists();
    assert!(!samples.is_empty());

    for path in samples {
        let input = fs::read_to_string(&path).unwrap();
        let expected = match path.extension().and_then(|e| e.to_str()) {
            Some("m3u8") => PlaylistFormat::Hls,
            _ => PlaylistFormat::Iptv,
        };
        println!("Parsing playlist file: {:?}", path);
        let parsed = parse(&input).unwrap();
        assert_eq!(parsed.format(), expected, "{:?}", path);
    }
}

#[test]
fn every_sample_serializes() {
    for path in all_sample_playlists() {
        let parsed = parse(&fs::read_to_string(&path).unwrap()).unwrap();
        let json = serde_json::to_value(&parsed).unwrap();
        let back: ParsedPlaylist = serde_json::from_value(json).unwrap();
        assert_eq!(back, parsed, "{:?}", path);
    }
}

// -----------------------------------------------------------------------------------------------
// IPTV

#[test]
fn iptv_header() {
    let pl = parse_iptv(&get_sample_playlist("iptv-channels.m3u"));
    assert!(pl.warnings.is_empty(), "{:?}", pl.warnings);

    let header = &pl.header;
    assert_eq!(
        header.epg_urls,
        vec![
            "http://epg.example.com/guide.xml.gz",
            "http://epg.example.com/backup.xml"
        ]
    );
    assert_eq!(header.tvg_shift_minutes, Some(-60));
    assert_eq!(header.catchup.as_deref(), Some("append"));
    assert_eq!(header.catchup_days, Some(3.0));
    assert_eq!(header.raw.get("refresh"), Some("3600"));
}

#[test]
fn iptv_entries() {
    let pl = parse_iptv(&get_sample_playlist("iptv-channels.m3u"));
    let names: Vec<_> = pl.items.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "BBC One HD",
            "CNN International",
            "Sky Sports",
            "The Film (2020)",
            "Radio One"
        ]
    );

    let bbc = &pl.items[0];
    assert_eq!(bbc.url, "http://iptv.example.com/live/bbc1.m3u8");
    assert_eq!(bbc.duration, Some(-1));
    assert_eq!(bbc.groups, vec!["UK", "News"]);
    assert_eq!(
        bbc.tvg,
        Some(TvgInfo {
            id: Some("bbc1.uk".into()),
            name: Some("BBC One".into()),
            logo: Some("http://logos.example.com/bbc1.png".into()),
            chno: Some("101".into()),
        })
    );
    assert!(bbc.http.is_none());

    let cnn = &pl.items[1];
    assert_eq!(cnn.tvg.as_ref().and_then(|t| t.name.as_deref()), Some("CNN, International"));
    assert_eq!(cnn.groups, vec!["News", "World"]);
    let http = cnn.http.as_ref().unwrap();
    assert_eq!(http.user_agent.as_deref(), Some("Mozilla/5.0 (SmartTV)"));
    assert_eq!(http.referrer.as_deref(), Some("http://portal.example.com/"));

    let sky = &pl.items[2];
    assert_eq!(sky.url, "http://iptv.example.com/live/sky.mpd");
    assert_eq!(sky.tvg_id(), Some("sky.sports"));
    assert_eq!(sky.group(), Some("Sports"));
    assert_eq!(sky.kodi_props.len(), 2);
    let http = sky.http.as_ref().unwrap();
    assert_eq!(http.user_agent.as_deref(), Some("Kodi/20"));
    assert_eq!(http.headers.get("X-Token").map(String::as_str), Some("abc123"));

    let film = &pl.items[3];
    assert_eq!(film.duration, Some(7200));
    assert_eq!(film.kind, Some(StreamKind::Vod));
    assert_eq!(film.adult, None);
    assert_eq!(film.aspect_ratio.as_deref(), Some("16:9"));
    assert_eq!(film.audio_track.as_deref(), Some("eng"));

    let radio = &pl.items[4];
    assert_eq!(radio.kind, Some(StreamKind::Radio));
    assert_eq!(radio.recording, Some(true));
}

#[test]
fn iptv_malformed_recovers() {
    let pl = parse_iptv(&get_sample_playlist("iptv-malformed.m3u"));

    let urls: Vec<_> = pl.items.iter().map(|e| e.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "http://example.com/first",
            "http://example.com/third",
            "http://example.com/nodur"
        ]
    );

    // The unterminated quote swallows the comma, so the name comes from the
    // attributes.
    assert_eq!(pl.items[1].tvg_id(), Some("third"));

    let nodur = &pl.items[2];
    assert_eq!(nodur.duration, None);
    assert_eq!(nodur.name, "No Duration");

    assert_eq!(pl.warnings.len(), 3, "{:?}", pl.warnings);
    assert_eq!(pl.warnings[0], "Missing #EXTM3U header");
    assert!(pl.warnings[1].contains("line 4"));
    assert!(pl.warnings[2].contains("line 11"));
}

fn write_entries(pl: &Playlist) -> String {
    let mut out = String::from("#EXTM3U\n");
    for entry in &pl.items {
        out.push_str("#EXTINF:-1");
        if let Some(id) = entry.tvg_id() {
            out.push_str(&format!(" tvg-id=\"{}\"", id));
        }
        if let Some(group) = entry.group() {
            out.push_str(&format!(" group-title=\"{}\"", group));
        }
        out.push_str(&format!(",{}\n{}\n", entry.name, entry.url));
    }
    out
}

#[test]
fn iptv_reparse_is_stable() {
    let original = parse_iptv(&get_sample_playlist("iptv-channels.m3u"));
    let reparsed = parse_iptv(&write_entries(&original));

    assert_eq!(reparsed.items.len(), original.items.len());
    for (a, b) in original.items.iter().zip(&reparsed.items) {
        assert_eq!(a.name, b.name);
        assert_eq!(a.url, b.url);
        assert_eq!(a.tvg_id(), b.tvg_id());
        assert_eq!(a.group(), b.group());
    }
}

#[test]
fn iptv_quoted_comma() {
    let pl = parse_iptv("#EXTINF:-1 tvg-id=\"a,b\" group-title=\"X\",Channel Name\nhttp://x/stream");
    let entry = &pl.items[0];
    assert_eq!(entry.duration, Some(-1));
    assert_eq!(entry.tvg_id(), Some("a,b"));
    assert_eq!(entry.name, "Channel Name");
}

#[test]
fn iptv_crlf_and_bom() {
    let input = "\u{feff}#EXTM3U\r\n#EXTINF:-1 tvg-id=\"a\",A\r\nhttp://a\r\n#EXTINF:-1,B\rhttp://b\r";
    let pl = parse_iptv(input);
    assert!(pl.warnings.is_empty());
    assert_eq!(pl.items.len(), 2);
    assert_eq!(pl.items[0].url, "http://a");
    assert_eq!(pl.items[1].url, "http://b");
}

// -----------------------------------------------------------------------------------------------
// HLS media

#[test]
fn media_vod() {
    let pl = get_media("media-vod.m3u8");
    assert!(pl.warnings.is_empty(), "{:?}", pl.warnings);
    assert_eq!(pl.version, Some(7));
    assert_eq!(pl.target_duration, 10.0);
    assert_eq!(pl.media_sequence, Some(100));
    assert_eq!(pl.discontinuity_sequence, Some(2));
    assert_eq!(pl.playlist_type, Some(MediaPlaylistType::Vod));
    assert!(pl.independent_segments);
    assert!(pl.end_list);
    assert_eq!(pl.start, Some(Start { time_offset: -12.5, precise: true }));
    assert_eq!(pl.segments.len(), 5);
}

#[test]
fn media_vod_segments() {
    let pl = get_media("media-vod.m3u8");
    let segments = &pl.segments;

    let first = &segments[0];
    assert_eq!(first.uri, "segment100.m4s");
    assert_eq!(first.title.as_deref(), Some("Intro"));
    assert_eq!(first.duration, 9.009);
    assert_eq!(first.bitrate, None);
    assert_eq!(first.key.as_ref().map(|k| &k.method), Some(&KeyMethod::AES_128));
    assert_eq!(first.map.as_ref().map(|m| m.uri.as_str()), Some("init.mp4"));
    assert!(first.parsed_program_date_time().is_some());

    let range = &first.date_ranges[0];
    assert_eq!(range.id, "ad-1");
    assert_eq!(range.class.as_deref(), Some("com.example.ad"));
    assert_eq!(range.duration, Some(30.0));
    assert_eq!(range.scte35_out.as_deref(), Some("0xFC002F"));
    assert_eq!(range.client_attributes.get("X-AD-ID"), Some("1234"));
    assert!(range.parsed_start_date().is_some());

    let second = &segments[1];
    assert_eq!(second.bitrate, Some(1500));
    assert_eq!(second.byte_range, Some(ByteRange { length: 50000, offset: Some(0) }));
    assert_eq!(second.program_date_time, None);
    assert!(second.date_ranges.is_empty());

    // A BYTERANGE before #EXTINF has no segment to attach to.
    let third = &segments[2];
    assert_eq!(third.byte_range, None);
    assert_eq!(third.bitrate, Some(1500));

    let fourth = &segments[3];
    assert!(fourth.discontinuity);
    assert_eq!(fourth.key.as_ref().map(|k| &k.method), Some(&KeyMethod::None));
    assert_eq!(fourth.duration, 5.0);

    let fifth = &segments[4];
    assert!(fifth.gap);
    assert!(!fifth.discontinuity);
    assert_eq!(fifth.map, first.map);

    assert!((pl.duration() - 42.027).abs() < 1e-9);
}

#[test]
fn media_low_latency() {
    let pl = get_media("media-low-latency.m3u8");
    assert_eq!(pl.version, Some(9));
    assert_eq!(pl.segments.len(), 2);

    let control = pl.server_control.as_ref().unwrap();
    assert!(control.can_block_reload);
    assert_eq!(control.can_skip_until, Some(24.0));
    assert_eq!(control.part_hold_back, Some(3.012));
    assert_eq!(pl.part_inf.as_ref().map(|p| p.part_target), Some(1.004));
    assert_eq!(pl.skip.as_ref().map(|s| s.skipped_segments), Some(3));

    assert_eq!(pl.preload_hints.len(), 2);
    assert_eq!(pl.preload_hints[0].hint_type, PreloadHintType::Part);
    assert_eq!(pl.preload_hints[1].hint_type, PreloadHintType::Map);
    assert_eq!(pl.preload_hints[1].byterange_length, Some(720));

    let reports: Vec<_> = pl
        .rendition_reports
        .iter()
        .map(|r| (r.uri.as_str(), r.last_msn, r.last_part))
        .collect();
    assert_eq!(
        reports,
        vec![
            ("../1M/waitForMSN.php", Some(267), Some(2)),
            ("../4M/waitForMSN.php", Some(267), Some(1))
        ]
    );

    assert_eq!(pl.custom_attributes.get("x-foo"), Some("bar"));
    assert_eq!(pl.custom_attributes.len(), 1);
}

// -----------------------------------------------------------------------------------------------
// HLS master

#[test]
fn master_variants() {
    let pl = get_master("master-with-alternatives.m3u8");
    assert!(pl.warnings.is_empty(), "{:?}", pl.warnings);
    assert_eq!(pl.version, Some(6));
    assert!(pl.independent_segments);

    let uris: Vec<_> = pl.variants.iter().map(|v| v.uri.as_str()).collect();
    assert_eq!(
        uris,
        vec![
            "https://cdn.example.com/low/index.m3u8",
            "mid/index.m3u8",
            "hi/index.m3u8"
        ]
    );

    let low = &pl.variants[0];
    assert_eq!(low.bandwidth, 1280000);
    assert_eq!(low.average_bandwidth, Some(1000000));
    assert_eq!(low.codecs.as_deref(), Some("avc1.4d401f,mp4a.40.2"));
    assert_eq!(low.resolution, Some(Resolution { width: 640, height: 360 }));
    assert_eq!(low.frame_rate, Some(29.97));
    assert_eq!(low.audio.as_deref(), Some("aac"));
    assert_eq!(low.subtitles.as_deref(), Some("subs"));
    assert_eq!(low.closed_captions, Some(ClosedCaptions::GroupId("cc".into())));

    let mid = &pl.variants[1];
    assert_eq!(mid.hdcp_level, Some(HdcpLevel::Type0));
    assert_eq!(mid.closed_captions, Some(ClosedCaptions::None));

    assert_eq!(pl.variants[2].bandwidth, 5000000);
}

#[test]
fn master_renditions_and_session() {
    let pl = get_master("master-with-alternatives.m3u8");

    let renditions: Vec<_> = pl
        .renditions
        .iter()
        .map(|r| (r.media_type, r.name.as_str()))
        .collect();
    assert_eq!(
        renditions,
        vec![
            (MediaType::Audio, "English"),
            (MediaType::Audio, "Deutsch"),
            (MediaType::Subtitles, "English"),
            (MediaType::ClosedCaptions, "CC1")
        ]
    );

    let en = &pl.renditions[0];
    assert_eq!(en.uri.as_deref(), Some("https://cdn.example.com/audio/en.m3u8"));
    assert!(en.default);
    assert!(en.autoselect);
    assert!(!pl.renditions[1].default);
    assert_eq!(pl.renditions[3].instream_id.as_deref(), Some("CC1"));

    assert_eq!(pl.session_data.len(), 1);
    assert_eq!(pl.session_data[0].data_id, "com.example.title");
    assert_eq!(pl.session_data[0].value.as_deref(), Some("Example"));

    assert_eq!(pl.session_keys.len(), 1);
    assert_eq!(pl.session_keys[0].0.method, KeyMethod::SAMPLE_AES);

    assert_eq!(pl.i_frame_streams.len(), 1);
    assert_eq!(pl.i_frame_streams[0].uri, "low/iframe.m3u8");
}

#[test]
fn master_detection() {
    assert!(is_master_playlist(&get_sample_playlist("master-with-alternatives.m3u8")));
    assert!(!is_master_playlist(&get_sample_playlist("media-vod.m3u8")));
    assert!(!is_master_playlist(&get_sample_playlist("media-low-latency.m3u8")));
}

// -----------------------------------------------------------------------------------------------
// Front door

#[test]
fn parser_front_door() {
    let input = get_sample_playlist("media-vod.m3u8");

    let parsed = Parser::default().parse_bytes(input.as_bytes()).unwrap();
    assert!(matches!(parsed.as_hls(), Some(HlsPlaylist::Media(_))));

    let limited = Parser::new(ParserConfig::default().with_max_input_bytes(64));
    assert!(matches!(
        limited.parse(&input),
        Err(Error::InputTooLarge { limit: 64, .. })
    ));
}

#[test]
fn json_output_is_tagged() {
    let parsed = parse(&get_sample_playlist("media-low-latency.m3u8")).unwrap();
    let json = serde_json::to_value(&parsed).unwrap();
    assert_eq!(json["format"], "hls");
    assert_eq!(json["playlist"]["type"], "media");
    assert_eq!(json["playlist"]["segments"][0]["uri"], "fileSequence266.mp4");
}
