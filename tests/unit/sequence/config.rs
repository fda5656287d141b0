use super::*;

const DOC: &str = r#"{
    "player": { "scroll_factor": 3.0, "frame_timeout_ms": null },
    "sequences": [
        { "id": "web1", "frames": { "base_url": "web1", "suffix": "_delay-0.037s" }, "total_frames": 273, "label": "Intro" },
        { "id": "web2", "frames": { "base_url": "web2" }, "total_frames": 280, "label": "Experience",
          "description": "Web Developer", "cta_text": "See the Work", "cta_link": "/work" }
    ]
}"#;

#[test]
fn parses_document_with_partial_player_settings() {
    let file = TimelineFile::from_json_str(DOC).unwrap();
    assert_eq!(file.player.scroll_factor, 3.0);
    assert_eq!(file.player.lookahead, 2);
    assert_eq!(file.player.frame_timeout(), None);
    assert_eq!(file.sequences.len(), 2);
    assert_eq!(
        file.sequences.get(1).unwrap().cta_link.as_deref(),
        Some("/work")
    );
}

#[test]
fn player_defaults_when_omitted() {
    let doc = r#"{"sequences":[{"id":"a","frames":{"base_url":"a"},"total_frames":1,"label":"A"}]}"#;
    let file = TimelineFile::from_json_str(doc).unwrap();
    assert_eq!(file.player, PlayerConfig::default());
    assert_eq!(file.player.frame_timeout(), Some(Duration::from_secs(30)));
}

#[test]
fn invalid_player_settings_are_config_errors() {
    let doc = r#"{"player":{"scroll_factor":0.0},"sequences":[{"id":"a","frames":{"base_url":"a"},"total_frames":1,"label":"A"}]}"#;
    assert!(matches!(
        TimelineFile::from_json_str(doc),
        Err(ReelError::Validation(_))
    ));

    let unknown = r#"{"player":{"speed":2},"sequences":[]}"#;
    assert!(matches!(
        TimelineFile::from_json_str(unknown),
        Err(ReelError::Config(_))
    ));
}

#[test]
fn missing_file_is_reported_with_path() {
    let err = TimelineFile::from_path(Path::new("does/not/exist.json")).unwrap_err();
    assert!(err.to_string().contains("does/not/exist.json"));
}
