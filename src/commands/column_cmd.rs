//! Commands for Column operations
//!
//! Positions are owned by the column engine; renames go straight to the
//! repository.

use crate::access::Target;
use crate::domain::{BoardId, Column, ColumnDraft, ColumnId, Position, UserId};
use crate::ordering::Outcome;
use crate::AppState;

use super::{validate_name, CommandResult};

/// Append a column to the end of a board
pub async fn create_column(
    state: &AppState,
    caller: UserId,
    board_id: BoardId,
    name: String,
) -> CommandResult<Column> {
    let name = validate_name("name", &name)?;
    state.gate.authorize(caller, Target::Board(board_id)).await?;
    Ok(state.columns.append(board_id, ColumnDraft::new(name)).await?)
}

pub async fn rename_column(
    state: &AppState,
    caller: UserId,
    column_id: ColumnId,
    name: String,
) -> CommandResult<Column> {
    let name = validate_name("name", &name)?;
    state.gate.authorize(caller, Target::Column(column_id)).await?;
    Ok(state.column_repo.rename(column_id, name).await?)
}

/// Put the board's columns in exactly the given order
pub async fn reorder_columns(
    state: &AppState,
    caller: UserId,
    board_id: BoardId,
    ordered: Vec<ColumnId>,
) -> CommandResult<Outcome> {
    state.gate.authorize(caller, Target::Board(board_id)).await?;
    Ok(state.columns.reorder(board_id, &ordered).await?)
}

/// Move a column from `from` to `to` on its board
pub async fn move_column(
    state: &AppState,
    caller: UserId,
    column_id: ColumnId,
    from: Position,
    to: Position,
) -> CommandResult<Outcome> {
    let access = state.gate.authorize(caller, Target::Column(column_id)).await?;
    Ok(state
        .columns
        .move_within(column_id, from, to, access.board_id)
        .await?)
}

/// Delete a column and its tasks, closing the gap on the board
pub async fn delete_column(
    state: &AppState,
    caller: UserId,
    column_id: ColumnId,
) -> CommandResult<Outcome> {
    let access = state.gate.authorize(caller, Target::Column(column_id)).await?;
    Ok(state.columns.delete(column_id, access.board_id).await?)
}
