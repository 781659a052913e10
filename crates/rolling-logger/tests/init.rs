//! Global initialization, kept in its own test binary

use rolling_logger::{init_with, recent_lines, LoggerError, LoggerOptions};

#[test]
fn test_init_writes_file_and_buffer() {
    let dir = tempfile::tempdir().unwrap();
    let options = LoggerOptions {
        filter: "info".to_string(),
        ..LoggerOptions::default()
    };
    init_with(dir.path(), "init-test", &options).unwrap();

    tracing::info!(scope = 7, "column reindexed");
    rolling_logger::info("plain message").unwrap();

    let lines = recent_lines();
    assert!(lines.iter().any(|line| line.contains("column reindexed") && line.contains("scope=7")));
    assert!(lines.iter().any(|line| line.contains("plain message")));

    let content = std::fs::read_to_string(dir.path().join("init-test.log")).unwrap();
    assert!(content.contains("column reindexed"));

    let again = init_with(dir.path(), "init-test", &options);
    assert!(matches!(again, Err(LoggerError::AlreadyInitialized)));
}
