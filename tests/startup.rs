//! Startup from a config file: logging plus a file-backed database

use board_order::domain::{ColumnDraft, Role};
use board_order::{init_logging, AppState, Config};

#[tokio::test]
async fn test_open_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("boards.db");
    let logs = dir.path().join("logs");
    let config_path = dir.path().join("board-order.toml");
    std::fs::write(
        &config_path,
        format!(
            "[database]\npath = {:?}\n\n[log]\ndir = {:?}\nfilter = \"info\"\n",
            db.display().to_string(),
            logs.display().to_string(),
        ),
    )
    .unwrap();

    let config = Config::load(&config_path).unwrap();
    assert_eq!(config.database.path, db);
    init_logging(&config).unwrap();

    let state = AppState::open(&config).unwrap();
    let board = state.boards.create(1, "Roadmap".to_string()).await.unwrap();
    let column = state
        .columns
        .append(board.id, ColumnDraft::new("Todo"))
        .await
        .unwrap();
    assert_eq!(column.position, 0);
    drop(state);

    let reopened = AppState::open(&config).unwrap();
    let view = reopened.boards.load_view(board.id, Role::Owner).await.unwrap();
    assert_eq!(view.columns.len(), 1);
    assert_eq!(view.columns[0].column.name, "Todo");

    let lines = rolling_logger::recent_lines();
    assert!(lines.iter().any(|line| line.contains("database ready")));
    assert!(logs.join("board-order.log").exists());
}
