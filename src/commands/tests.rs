//! Command handler tests over in-memory SQLite

use crate::domain::{Membership, OrderError, Role, TaskPatch};
use crate::ordering::EngineOptions;
use crate::repository::SqliteStore;
use crate::AppState;

use super::*;

const OWNER: i64 = 1;
const MEMBER: i64 = 2;
const STRANGER: i64 = 3;

fn state() -> AppState {
    AppState::with_store(SqliteStore::in_memory().unwrap(), EngineOptions::default())
}

#[tokio::test]
async fn test_board_lifecycle() {
    let state = state();
    let board = create_board(&state, OWNER, "  Launch  ".to_string()).await.unwrap();
    assert_eq!(board.name, "Launch");

    add_member(&state, OWNER, board.id, MEMBER).await.unwrap();
    assert_eq!(list_boards(&state, MEMBER).await.unwrap().len(), 1);

    let view = get_board(&state, MEMBER, board.id).await.unwrap();
    assert_eq!(view.role, Role::Member);
    assert_eq!(
        view.members,
        vec![
            Membership { user_id: OWNER, role: Role::Owner },
            Membership { user_id: MEMBER, role: Role::Member },
        ]
    );

    let err = delete_board(&state, MEMBER, board.id).await.unwrap_err();
    assert_eq!(err.status_code(), 403);
    let err = add_member(&state, MEMBER, board.id, STRANGER).await.unwrap_err();
    assert_eq!(err.status_code(), 403);

    delete_board(&state, OWNER, board.id).await.unwrap();
    let err = get_board(&state, OWNER, board.id).await.unwrap_err();
    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn test_stranger_is_forbidden() {
    let state = state();
    let board = create_board(&state, OWNER, "Private".to_string()).await.unwrap();
    let column = create_column(&state, OWNER, board.id, "Todo".to_string())
        .await
        .unwrap();

    let err = create_task(&state, STRANGER, column.id, "Sneak".to_string(), None)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        CommandError::Forbidden {
            user: STRANGER,
            board_id: board.id
        }
    );
    assert!(get_board(&state, OWNER, board.id).await.unwrap().columns[0]
        .tasks
        .is_empty());
}

#[tokio::test]
async fn test_validation() {
    let state = state();
    let err = create_board(&state, OWNER, "   ".to_string()).await.unwrap_err();
    assert_eq!(err, CommandError::invalid("name", "must not be empty"));

    let board = create_board(&state, OWNER, "Board".to_string()).await.unwrap();
    let long = "x".repeat(MAX_NAME_LEN + 1);
    let err = create_column(&state, OWNER, board.id, long).await.unwrap_err();
    assert_eq!(err.status_code(), 400);

    let column = create_column(&state, OWNER, board.id, "Todo".to_string())
        .await
        .unwrap();
    let task = create_task(&state, OWNER, column.id, "Task".to_string(), Some(" ".to_string()))
        .await
        .unwrap();
    assert_eq!(task.description, None);

    let patch = TaskPatch {
        priority: Some(9),
        ..TaskPatch::default()
    };
    let err = update_task(&state, OWNER, task.id, patch).await.unwrap_err();
    assert!(matches!(err, CommandError::Invalid { field: "priority", .. }));
}

#[tokio::test]
async fn test_columns_flow() {
    let state = state();
    let board = create_board(&state, OWNER, "Board".to_string()).await.unwrap();
    let todo = create_column(&state, OWNER, board.id, "Todo".to_string()).await.unwrap();
    let doing = create_column(&state, OWNER, board.id, "Doing".to_string()).await.unwrap();
    let done = create_column(&state, OWNER, board.id, "Done".to_string()).await.unwrap();

    move_column(&state, OWNER, done.id, 2, 0).await.unwrap();
    reorder_columns(&state, OWNER, board.id, vec![todo.id, done.id, doing.id])
        .await
        .unwrap();
    rename_column(&state, OWNER, doing.id, " In progress ".to_string())
        .await
        .unwrap();

    let names: Vec<_> = get_board(&state, OWNER, board.id)
        .await
        .unwrap()
        .columns
        .into_iter()
        .map(|c| c.column.name)
        .collect();
    assert_eq!(names, vec!["Todo", "Done", "In progress"]);

    let outcome = delete_column(&state, OWNER, todo.id).await.unwrap();
    assert_eq!(outcome.scope(board.id).unwrap().ids(), vec![done.id, doing.id]);

    let err = reorder_columns(&state, OWNER, board.id, vec![done.id])
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 400);
}

#[tokio::test]
async fn test_tasks_flow() {
    let state = state();
    let board = create_board(&state, OWNER, "Board".to_string()).await.unwrap();
    add_member(&state, OWNER, board.id, MEMBER).await.unwrap();
    let todo = create_column(&state, OWNER, board.id, "Todo".to_string()).await.unwrap();
    let done = create_column(&state, OWNER, board.id, "Done".to_string()).await.unwrap();

    let a = create_task(&state, MEMBER, todo.id, "A".to_string(), None).await.unwrap();
    let b = create_task(&state, MEMBER, todo.id, "B".to_string(), None).await.unwrap();
    let c = create_task(&state, MEMBER, todo.id, "C".to_string(), None).await.unwrap();
    assert_eq!(c.position, 2);
    assert_eq!(a.created_by, MEMBER);

    let outcome = move_task(&state, MEMBER, b.id, done.id, 0).await.unwrap();
    assert_eq!(outcome.scope(todo.id).unwrap().ids(), vec![a.id, c.id]);
    assert_eq!(outcome.scope(done.id).unwrap().ids(), vec![b.id]);

    reorder_tasks(&state, MEMBER, todo.id, vec![c.id, a.id]).await.unwrap();

    let patch = TaskPatch {
        title: Some("  Renamed ".to_string()),
        assignee_id: Some(Some(MEMBER)),
        ..TaskPatch::default()
    };
    let updated = update_task(&state, OWNER, c.id, patch).await.unwrap();
    assert_eq!(updated.title, "Renamed");
    assert_eq!(updated.position, 0);

    delete_task(&state, OWNER, c.id).await.unwrap();
    let view = get_board(&state, OWNER, board.id).await.unwrap();
    let todo_tasks: Vec<_> = view.columns[0].tasks.iter().map(|t| (t.id, t.position)).collect();
    assert_eq!(todo_tasks, vec![(a.id, 0)]);

    let err = move_task(&state, OWNER, a.id, todo.id, 4).await.unwrap_err();
    assert!(matches!(
        err,
        CommandError::Order(OrderError::InvalidPosition { .. })
    ));
}

#[tokio::test]
async fn test_move_task_to_foreign_board() {
    let state = state();
    let mine = create_board(&state, OWNER, "Mine".to_string()).await.unwrap();
    let theirs = create_board(&state, MEMBER, "Theirs".to_string()).await.unwrap();
    add_member(&state, MEMBER, theirs.id, OWNER).await.unwrap();

    let here = create_column(&state, OWNER, mine.id, "Here".to_string()).await.unwrap();
    let there = create_column(&state, MEMBER, theirs.id, "There".to_string()).await.unwrap();
    let task = create_task(&state, OWNER, here.id, "Stay".to_string(), None).await.unwrap();

    let err = move_task(&state, OWNER, task.id, there.id, 0).await.unwrap_err();
    assert!(matches!(
        err,
        CommandError::Order(OrderError::InvalidTarget { .. })
    ));

    let err = move_task(&state, MEMBER, task.id, there.id, 0).await.unwrap_err();
    assert_eq!(err.status_code(), 403);
}

#[tokio::test]
async fn test_board_view_json_shape() {
    let state = state();
    let board = create_board(&state, OWNER, "Board".to_string()).await.unwrap();
    let column = create_column(&state, OWNER, board.id, "Todo".to_string()).await.unwrap();
    create_task(&state, OWNER, column.id, "A".to_string(), None).await.unwrap();

    let view = get_board(&state, OWNER, board.id).await.unwrap();
    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["role"], "owner");
    assert_eq!(json["members"][0]["user_id"], OWNER);
    assert_eq!(json["members"][0]["role"], "owner");
    assert_eq!(json["columns"][0]["name"], "Todo");
    assert_eq!(json["columns"][0]["tasks"][0]["title"], "A");
    assert_eq!(json["columns"][0]["tasks"][0]["position"], 0);
}
