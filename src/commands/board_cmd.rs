//! Commands for Board operations

use tracing::{info, warn};

use crate::access::{Access, Target};
use crate::domain::{Board, BoardId, BoardView, Role, UserId};
use crate::AppState;

use super::{validate_name, CommandError, CommandResult};

fn require_owner(caller: UserId, access: Access) -> CommandResult<()> {
    if access.is_owner() {
        return Ok(());
    }
    warn!(user = caller, board_id = access.board_id, "owner-only action refused");
    Err(CommandError::Forbidden {
        user: caller,
        board_id: access.board_id,
    })
}

/// Create a board owned by the caller
pub async fn create_board(state: &AppState, caller: UserId, name: String) -> CommandResult<Board> {
    let name = validate_name("name", &name)?;
    let board = state.boards.create(caller, name).await?;
    info!(board_id = board.id, owner = caller, "board created");
    Ok(board)
}

/// Boards the caller owns or belongs to
pub async fn list_boards(state: &AppState, caller: UserId) -> CommandResult<Vec<Board>> {
    Ok(state.boards.list_for_user(caller).await?)
}

/// Board with its columns and tasks in display order
pub async fn get_board(state: &AppState, caller: UserId, board_id: BoardId) -> CommandResult<BoardView> {
    let access = state.gate.authorize(caller, Target::Board(board_id)).await?;
    Ok(state.boards.load_view(board_id, access.role).await?)
}

/// Delete a board with everything on it; owner only
pub async fn delete_board(state: &AppState, caller: UserId, board_id: BoardId) -> CommandResult<()> {
    let access = state.gate.authorize(caller, Target::Board(board_id)).await?;
    require_owner(caller, access)?;
    state.boards.delete(board_id).await?;
    info!(board_id, "board deleted");
    Ok(())
}

/// Add `user` to the board as a member; owner only
pub async fn add_member(
    state: &AppState,
    caller: UserId,
    board_id: BoardId,
    user: UserId,
) -> CommandResult<()> {
    let access = state.gate.authorize(caller, Target::Board(board_id)).await?;
    require_owner(caller, access)?;
    if user == caller {
        return Err(CommandError::invalid("user", "owner is already on the board"));
    }
    state.boards.add_member(board_id, user, Role::Member).await?;
    info!(board_id, user, "member added");
    Ok(())
}
