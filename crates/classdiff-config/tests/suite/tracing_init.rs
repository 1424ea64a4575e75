use std::sync::Arc;

use classdiff_config::{init_tracing, installed_log_buffer, LoggingConfig};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

// The global subscriber can be installed once per process, so every step of
// the installation lives in this one test.
#[test]
fn init_tracing_installs_the_buffer_and_file_sinks_once() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("classdiff.log");
    let config = LoggingConfig {
        level: "info".to_owned(),
        file: Some(path.clone()),
        buffer_lines: 16,
        ..Default::default()
    };

    assert!(installed_log_buffer().is_none());
    let buffer = init_tracing(&config).expect("subscriber should install");

    tracing::info!(target: "classdiff_engine::differ", "class diff done");

    let buffered = buffer.last_lines(16).join("\n");
    assert!(buffered.contains("class diff done"), "{buffered}");

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("class diff done"), "{written}");
    assert_eq!(
        written.lines().count(),
        buffer.len(),
        "file and buffer should hold the same events"
    );

    let again = init_tracing(&LoggingConfig::default()).expect("second call is a no-op");
    assert!(Arc::ptr_eq(&buffer, &again));
    assert!(installed_log_buffer().is_some_and(|installed| Arc::ptr_eq(&installed, &buffer)));
}
