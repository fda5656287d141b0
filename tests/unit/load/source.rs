use super::*;

#[test]
fn normalize_rel_locator_cleans_and_rejects() {
    assert_eq!(
        normalize_rel_locator("./web1//frame_000.webp").unwrap(),
        "web1/frame_000.webp"
    );
    assert_eq!(
        normalize_rel_locator("web1\\frame_001.webp").unwrap(),
        "web1/frame_001.webp"
    );
    assert!(normalize_rel_locator("/etc/passwd").is_err());
    assert!(normalize_rel_locator("web1/../../x").is_err());
    assert!(normalize_rel_locator("./").is_err());
}

#[test]
fn memory_source_misses_are_fetch_errors() {
    let mut src = MemorySource::new();
    src.insert("a/frame_000.png", vec![1, 2, 3]);
    assert_eq!(src.fetch("a/frame_000.png").unwrap(), vec![1, 2, 3]);
    assert!(matches!(
        src.fetch("a/frame_001.png"),
        Err(ReelError::Fetch(_))
    ));
    assert_eq!(src.len(), 1);
}

#[test]
fn dir_source_reads_below_root() {
    let root = PathBuf::from("target").join("dir_source_unit");
    std::fs::create_dir_all(root.join("seq")).unwrap();
    std::fs::write(root.join("seq").join("frame_000.bin"), b"abc").unwrap();

    let src = DirSource::new(root.clone());
    assert_eq!(src.fetch("seq/frame_000.bin").unwrap(), b"abc");
    let err = src.fetch("seq/frame_001.bin").unwrap_err();
    assert!(matches!(err, ReelError::Fetch(_)));
    assert!(err.to_string().contains("frame_001.bin"));
    assert!(src.fetch("../outside").is_err());
}
