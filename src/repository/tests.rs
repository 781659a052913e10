//! Repository Integration Tests
//!
//! Board, column and task repositories against in-memory SQLite.

use crate::domain::{Column, ColumnDraft, OrderError, Role, Task, TaskDraft, TaskPatch};
use crate::ordering::{EngineOptions, OrderingEngine};
use crate::repository::{
    BoardRepository, ColumnRepository, Repository, ScopedRepository, SqliteStore, TaskRepository,
};

struct Fixture {
    boards: BoardRepository,
    column_repo: ColumnRepository,
    task_repo: TaskRepository,
    columns: OrderingEngine<Column, SqliteStore>,
    tasks: OrderingEngine<Task, SqliteStore>,
}

fn setup() -> Fixture {
    let store = SqliteStore::in_memory().expect("Failed to open test DB");
    Fixture {
        boards: BoardRepository::new(store.clone()),
        column_repo: ColumnRepository::new(store.clone()),
        task_repo: TaskRepository::new(store.clone()),
        columns: OrderingEngine::new(store.clone(), EngineOptions::default()),
        tasks: OrderingEngine::new(store, EngineOptions::default()),
    }
}

#[tokio::test]
async fn test_create_board_records_owner() {
    let fx = setup();
    let board = fx.boards.create(7, "Roadmap".to_string()).await.unwrap();
    assert!(board.id > 0);
    assert_eq!(board.owner_id, 7);

    let found = fx.boards.find_by_id(board.id).await.unwrap();
    assert_eq!(found, Some(board.clone()));

    let view = fx.boards.load_view(board.id, Role::Owner).await.unwrap();
    assert!(view.columns.is_empty());
    assert_eq!(view.role, Role::Owner);
}

#[tokio::test]
async fn test_list_for_user_includes_memberships() {
    let fx = setup();
    let mine = fx.boards.create(1, "Mine".to_string()).await.unwrap();
    let shared = fx.boards.create(2, "Shared".to_string()).await.unwrap();
    fx.boards.create(3, "Private".to_string()).await.unwrap();
    fx.boards.add_member(shared.id, 1, Role::Member).await.unwrap();

    let ids: Vec<_> = fx
        .boards
        .list_for_user(1)
        .await
        .unwrap()
        .into_iter()
        .map(|board| board.id)
        .collect();
    assert_eq!(ids, vec![mine.id, shared.id]);
}

#[tokio::test]
async fn test_add_member_to_missing_board() {
    let fx = setup();
    let err = fx.boards.add_member(99, 1, Role::Member).await.unwrap_err();
    assert_eq!(err, OrderError::not_found("board", 99));
}

#[tokio::test]
async fn test_delete_board_cascades() {
    let fx = setup();
    let board = fx.boards.create(1, "Doomed".to_string()).await.unwrap();
    let column = fx.columns.append(board.id, ColumnDraft::new("Todo")).await.unwrap();
    let task = fx
        .tasks
        .append(column.id, TaskDraft::new("Write", 1))
        .await
        .unwrap();

    fx.boards.delete(board.id).await.unwrap();

    assert_eq!(fx.boards.find_by_id(board.id).await.unwrap(), None);
    assert_eq!(fx.column_repo.find_by_id(column.id).await.unwrap(), None);
    assert_eq!(fx.task_repo.find_by_id(task.id).await.unwrap(), None);
    assert!(fx.boards.list_for_user(1).await.unwrap().is_empty());

    let err = fx.boards.delete(board.id).await.unwrap_err();
    assert!(matches!(err, OrderError::NotFound { .. }));
}

#[tokio::test]
async fn test_load_view_orders_columns_and_tasks() {
    let fx = setup();
    let board = fx.boards.create(1, "Board".to_string()).await.unwrap();
    let todo = fx.columns.append(board.id, ColumnDraft::new("Todo")).await.unwrap();
    let done = fx.columns.append(board.id, ColumnDraft::new("Done")).await.unwrap();
    let a = fx.tasks.append(todo.id, TaskDraft::new("a", 1)).await.unwrap();
    let b = fx.tasks.append(todo.id, TaskDraft::new("b", 1)).await.unwrap();
    fx.tasks.move_within(b.id, 1, 0, todo.id).await.unwrap();
    fx.columns.move_within(done.id, 1, 0, board.id).await.unwrap();

    let view = fx.boards.load_view(board.id, Role::Member).await.unwrap();
    let names: Vec<_> = view.columns.iter().map(|c| c.column.name.as_str()).collect();
    assert_eq!(names, vec!["Done", "Todo"]);

    let titles: Vec<_> = view.columns[1].tasks.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["b", "a"]);
    assert_eq!(view.columns[1].tasks[1].id, a.id);
    assert!(view.columns[0].tasks.is_empty());
}

#[tokio::test]
async fn test_rename_column_keeps_position() {
    let fx = setup();
    let board = fx.boards.create(1, "Board".to_string()).await.unwrap();
    fx.columns.append(board.id, ColumnDraft::new("First")).await.unwrap();
    let second = fx.columns.append(board.id, ColumnDraft::new("Second")).await.unwrap();

    let renamed = fx
        .column_repo
        .rename(second.id, "Later".to_string())
        .await
        .unwrap();
    assert_eq!(renamed.name, "Later");
    assert_eq!(renamed.position, 1);

    let listed = fx.column_repo.list_in(board.id).await.unwrap();
    assert_eq!(listed[1].name, "Later");

    let err = fx.column_repo.rename(999, "x".to_string()).await.unwrap_err();
    assert_eq!(err, OrderError::not_found("column", 999));
}

#[tokio::test]
async fn test_update_task_fields() {
    let fx = setup();
    let board = fx.boards.create(1, "Board".to_string()).await.unwrap();
    let column = fx.columns.append(board.id, ColumnDraft::new("Todo")).await.unwrap();
    let task = fx
        .tasks
        .append(column.id, TaskDraft::new("Draft", 1).with_description("notes"))
        .await
        .unwrap();
    assert_eq!(task.board_id, board.id);

    let patch = TaskPatch {
        title: Some("Final".to_string()),
        description: Some(None),
        priority: Some(3),
        assignee_id: Some(Some(4)),
        due_date: Some(Some(1_700_000_000_000)),
    };
    let updated = fx.task_repo.update(task.id, patch).await.unwrap();
    assert_eq!(updated.title, "Final");
    assert_eq!(updated.description, None);
    assert_eq!(updated.priority, 3);
    assert_eq!(updated.assignee_id, Some(4));
    assert_eq!(updated.position, task.position);
    assert_eq!(updated.column_id, column.id);

    let stored = fx.task_repo.find_by_id(task.id).await.unwrap().unwrap();
    assert_eq!(stored, updated);
}

#[tokio::test]
async fn test_update_missing_task() {
    let fx = setup();
    let err = fx
        .task_repo
        .update(42, TaskPatch::default())
        .await
        .unwrap_err();
    assert_eq!(err, OrderError::not_found("task", 42));
}
