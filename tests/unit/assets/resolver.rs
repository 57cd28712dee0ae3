use super::*;

#[test]
fn normalize_rel_path_rules() {
    assert_eq!(normalize_rel_path("a/./b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("a\\b\\c.png").unwrap(), "a/b/c.png");
    assert!(normalize_rel_path("/abs.png").is_err());
    assert!(normalize_rel_path("../up.png").is_err());
    assert!(normalize_rel_path("").is_err());
    assert!(normalize_rel_path("./").is_err());
}

#[test]
fn fs_resolver_reads_and_reports_missing() {
    let dir = std::env::temp_dir().join(format!("scenereel-fs-{}", std::process::id()));
    std::fs::create_dir_all(dir.join("img")).unwrap();
    std::fs::write(dir.join("img/a.bin"), b"abc").unwrap();

    let r = FsResolver::new(dir.clone());
    assert_eq!(r.fetch("img/a.bin").unwrap(), b"abc");
    assert_eq!(
        r.fetch("img/missing.bin").unwrap_err(),
        ResourceLoadError::NotFound {
            source_id: "img/missing.bin".to_string()
        }
    );
    assert!(matches!(
        r.fetch("../escape.bin").unwrap_err(),
        ResourceLoadError::Fetch { .. }
    ));
    assert!(matches!(
        r.open_stream("clip.mp4", StreamKind::Video),
        Err(ResourceLoadError::Unsupported { .. })
    ));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn memory_resolver_counts_fetches() {
    let r = MemoryResolver::new();
    r.insert("a", vec![1, 2, 3]);
    let view = r.clone();
    assert_eq!(r.fetch("a").unwrap(), vec![1, 2, 3]);
    assert!(r.fetch("b").is_err());
    assert_eq!(view.fetch_count("a"), 1);
    assert_eq!(view.fetch_count("b"), 1);
}

#[test]
fn memory_streams_track_lifecycle() {
    let r = MemoryResolver::new();
    r.insert_stream("voice.mp3", None);
    let mut s = r.open_stream("voice.mp3", StreamKind::Narration).unwrap();
    s.play();
    s.set_volume(0.4);
    assert!(s.is_playing());
    s.stop();
    s.play();
    let st = r.stream_status("voice.mp3", StreamKind::Narration).unwrap();
    assert!(st.stopped);
    assert!(!st.playing);
    assert_eq!(st.gain, 0.4);
    assert!(s.frame_at(1.0).is_none());
}
