//! The move authority: the remote owner of canonical board state.
//!
//! The authority creates boards and validates individual placements. Mini
//! boards and the meta-board use the same two operations; the meta-board
//! additionally places the reserved `-` symbol for drawn mini-boards.

mod memory;
mod rest;
mod wire;

pub use memory::InMemoryAuthority;
pub use rest::RestAuthority;
pub use wire::{BoardSnapshot, ErrorDetail, MoveRequest, WireCell, WireMark};

use derive_more::{Display, Error};
use std::sync::Arc;

/// Identifier the authority issues for a board.
pub type BoardId = String;

/// Errors reported across the authority boundary.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum AuthorityError {
    /// A board could not be created.
    #[display("{}", _0)]
    CreateFailed(#[error(not(source))] String),
    /// The authority refused a move; carries its message.
    #[display("{}", _0)]
    MoveRejected(#[error(not(source))] String),
    /// The authority could not be reached or answered garbage.
    #[display("Authority unreachable: {}", _0)]
    Unreachable(#[error(not(source))] String),
}

/// Capability to create boards and submit moves.
///
/// Implementations own retry policy, if any; callers treat every error as
/// final for that attempt.
#[async_trait::async_trait]
pub trait MoveAuthority: Send + Sync {
    /// Creates a fresh empty board.
    async fn create_board(&self) -> Result<BoardSnapshot, AuthorityError>;

    /// Places `player` at `index` on board `id`, returning the new state.
    async fn submit_move(
        &self,
        id: &str,
        index: usize,
        player: WireMark,
    ) -> Result<BoardSnapshot, AuthorityError>;
}

#[async_trait::async_trait]
impl<A: MoveAuthority + ?Sized> MoveAuthority for Arc<A> {
    async fn create_board(&self) -> Result<BoardSnapshot, AuthorityError> {
        (**self).create_board().await
    }

    async fn submit_move(
        &self,
        id: &str,
        index: usize,
        player: WireMark,
    ) -> Result<BoardSnapshot, AuthorityError> {
        (**self).submit_move(id, index, player).await
    }
}
