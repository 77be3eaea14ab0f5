use super::*;

#[test]
fn empty_object_yields_defaults() {
    let settings: Settings = serde_json::from_str("{}").unwrap();
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.explorer.row_height, 22);
    assert!(settings.workspace.is_none());
}

#[test]
fn nested_explorer_overrides_keep_other_defaults() {
    let data = r#"{
      "workspace": "/srv/project",
      "explorer": {
        "large_dir_names": ["node_modules", "target"],
        "sort": { "folders_first": false }
      }
    }"#;
    let settings: Settings = serde_json::from_str(data).unwrap();

    assert_eq!(settings.workspace.as_deref(), Some("/srv/project"));
    assert!(settings.explorer.is_large_dir("target"));
    assert!(!settings.explorer.sort.folders_first);
    assert_eq!(settings.explorer.remote_retries, 1);
}

#[test]
fn serialization_roundtrips() {
    let mut settings = Settings::default();
    settings.explorer.overscan = 3;
    let json = serde_json::to_string_pretty(&settings).unwrap();
    assert!(!json.contains("workspace"));
    let decoded: Settings = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, settings);
}
