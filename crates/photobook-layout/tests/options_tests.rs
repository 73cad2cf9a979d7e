use photobook_layout::*;

#[test]
fn test_defaults_are_valid() {
    let options = EditorOptions::default();
    assert!(options.validate().is_ok());
    assert_eq!(options.total_pages, 30);
    assert_eq!(options.history_capacity, 50);
    assert_eq!(options.autosave_delay().as_millis(), 2000);
    assert!(options.settle_delay().is_zero());
}

#[test]
fn test_validation_page_count() {
    let mut options = EditorOptions::default();

    options.total_pages = 31;
    match options.validate() {
        Err(LayoutError::Config(msg)) => assert!(msg.contains("even")),
        other => panic!("Expected Config error, got {other:?}"),
    }

    options.total_pages = 72;
    assert!(options.validate().is_err());

    options.total_pages = 0;
    assert!(options.validate().is_err());

    options.total_pages = 2;
    assert!(options.validate().is_ok());

    options.total_pages = 70;
    assert!(options.validate().is_ok());
}

#[test]
fn test_validation_history_and_zoom() {
    let mut options = EditorOptions::default();
    options.history_capacity = 0;
    assert!(options.validate().is_err());

    let mut options = EditorOptions::default();
    options.zoom = 0.4;
    assert!(options.validate().is_err());
    options.zoom = 2.0;
    assert!(options.validate().is_ok());

    let mut options = EditorOptions::default();
    options.thumbnail_strip_height = Some(-1.0);
    assert!(options.validate().is_err());
}

#[tokio::test]
async fn test_save_and_load_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("editor.json");

    let options = EditorOptions {
        total_pages: 40,
        settle_delay_ms: 50,
        thumbnail_strip_height: Some(120.0),
        theme: Theme::Dark,
        ..EditorOptions::default()
    };
    options.save(&path).await.unwrap();

    let loaded = EditorOptions::load(&path).await.unwrap();
    assert_eq!(loaded, options);
}

#[tokio::test]
async fn test_partial_config_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("editor.json");
    tokio::fs::write(&path, r#"{ "total_pages": 12, "theme": "dark" }"#)
        .await
        .unwrap();

    let loaded = EditorOptions::load(&path).await.unwrap();
    assert_eq!(loaded.total_pages, 12);
    assert_eq!(loaded.theme, Theme::Dark);
    assert_eq!(loaded.zoom, 1.0);
    assert_eq!(loaded.history_capacity, 50);
}

#[tokio::test]
async fn test_malformed_config_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("editor.json");
    tokio::fs::write(&path, "{ nope").await.unwrap();

    assert!(matches!(
        EditorOptions::load(&path).await,
        Err(LayoutError::Config(_))
    ));
}

#[test]
fn test_apply_preferences_ignores_invalid_page_count() {
    let mut options = EditorOptions::default();
    options.apply_preferences(&Preferences {
        total_pages: 33,
        zoom: 9.0,
        theme: Theme::Dark,
    });
    assert_eq!(options.total_pages, 30);
    assert_eq!(options.zoom, 2.0);
    assert_eq!(options.theme, Theme::Dark);
    assert_eq!(options.preferences().total_pages, 30);
}
