//! Invariants over the match state.

use super::Invariant;
use crate::{ActiveBoard, MatchState, Outcome};

/// Invariant: the active board is never a finished board.
pub struct ActiveBoardOpen;

impl Invariant<MatchState> for ActiveBoardOpen {
    fn holds(state: &MatchState) -> bool {
        match state.active_board() {
            ActiveBoard::Any => true,
            ActiveBoard::Board(board) => !state.is_finished(board),
        }
    }

    fn description() -> &'static str {
        "Active board is never a finished board"
    }
}

/// Invariant: a decided match leaves no board to route to.
pub struct TerminalIsFinal;

impl Invariant<MatchState> for TerminalIsFinal {
    fn holds(state: &MatchState) -> bool {
        state.result() == Outcome::Undecided
            || crate::Position::ALL.iter().all(|&b| !state.is_playable(b))
    }

    fn description() -> &'static str {
        "No board is playable once the match is over"
    }
}
