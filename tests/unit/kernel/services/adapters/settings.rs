use super::*;

#[test]
fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().expect("create tempdir");
    let settings = load_settings_from(&dir.path().join("settings.json"));
    assert_eq!(settings, Settings::default());
}

#[test]
fn malformed_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().expect("create tempdir");
    let path = dir.path().join("settings.json");
    std::fs::write(&path, "{ not json").expect("write settings");
    assert_eq!(load_settings_from(&path), Settings::default());
}

#[test]
fn explorer_overrides_are_read() {
    let dir = tempfile::tempdir().expect("create tempdir");
    let path = dir.path().join("settings.json");
    std::fs::write(
        &path,
        r#"{ "explorer": { "overscan": 3, "remote_retries": 0 }, "workspace": "/tmp/w" }"#,
    )
    .expect("write settings");

    let settings = load_settings_from(&path);
    assert_eq!(settings.explorer.overscan, 3);
    assert_eq!(settings.explorer.remote_retries, 0);
    assert_eq!(settings.workspace.as_deref(), Some("/tmp/w"));
}

#[test]
fn settings_path_lives_under_the_app_dir() {
    if let Some(path) = get_settings_path() {
        assert!(path.ends_with(".vexplorer/settings.json"));
    }
    if let Some(dir) = get_log_dir() {
        assert!(dir.ends_with("vexplorer/logs"));
    }
}
