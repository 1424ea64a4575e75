use classdiff_config::{ClassDiffConfig, ConfigError, LoggingConfig, MatchingConfig};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

#[test]
fn empty_file_yields_defaults() {
    let config = ClassDiffConfig::load_from_str("").expect("empty config should parse");
    assert_eq!(config, ClassDiffConfig::default());
    assert_eq!(config.matching.max_operation_name_distance, 0.4);
    assert_eq!(config.matching.getter_prefixes, vec!["get".to_string()]);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn loads_partial_tables_from_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("classdiff.toml");
    std::fs::write(
        &path,
        r#"
[matching]
getter_prefixes = ["get", "is"]
test_annotations = ["Test", "ParameterizedTest"]

[logging]
level = "debug"
json = true
"#,
    )
    .unwrap();

    let config = ClassDiffConfig::load_from_path(&path).expect("config should load");
    assert_eq!(
        config.matching,
        MatchingConfig {
            getter_prefixes: vec!["get".into(), "is".into()],
            test_annotations: vec!["Test".into(), "ParameterizedTest".into()],
            ..Default::default()
        }
    );
    assert_eq!(
        config.logging,
        LoggingConfig {
            level: "debug".into(),
            json: true,
            ..Default::default()
        }
    );
}

#[test]
fn missing_file_reports_its_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    let err = ClassDiffConfig::load_from_path(&path).unwrap_err();
    match err {
        ConfigError::Io { path: reported, .. } => {
            assert_eq!(reported, path.display().to_string())
        }
        other => panic!("expected Io error, got {other:?}"),
    }
}

#[test]
fn unknown_keys_are_rejected() {
    let err = ClassDiffConfig::load_from_str("[matching]\nmax_distance = 0.3\n").unwrap_err();
    assert!(matches!(err, ConfigError::Toml(_)), "{err:?}");
}

#[test]
fn out_of_range_distance_is_rejected() {
    let err = ClassDiffConfig::load_from_str("[matching]\nmax_operation_name_distance = 1.5\n")
        .unwrap_err();
    assert!(
        err.to_string()
            .contains("matching.max_operation_name_distance"),
        "{err}"
    );
}
