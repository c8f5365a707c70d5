//! Match-level state machine: turns, active-board routing, termination.
//!
//! The state is a single value updated only through [`MatchState::apply_move`]
//! and [`MatchState::record_meta_outcome`]. Board contents live elsewhere; this
//! type only sees the move events that board engines report.

use crate::invariants::{InvariantSet, MatchInvariants};
use crate::{Mark, Outcome, Position};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info, instrument, warn};

/// Which mini-board the next move must target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum ActiveBoard {
    /// The next move must be played on this board.
    #[display("board {}", _0)]
    Board(Position),
    /// Free choice among unfinished boards.
    #[display("any board")]
    Any,
}

/// A move a mini-board engine reports after the authority accepted it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveEvent {
    /// Mini-board the move was played on.
    pub board: Position,
    /// Cell inside that board; also the routing target.
    pub cell: Position,
    /// Mark that was placed.
    pub mark: Mark,
    /// Whether the mini-board is still undecided after the move.
    pub still_playing: bool,
}

impl MoveEvent {
    /// Creates a move event.
    pub fn new(board: Position, cell: Position, mark: Mark, still_playing: bool) -> Self {
        Self {
            board,
            cell,
            mark,
            still_playing,
        }
    }
}

/// State change produced by an accepted move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Routing {
    /// Whose move is next.
    pub turn: Mark,
    /// Where the next move must go.
    pub active_board: ActiveBoard,
    /// Whether this move concluded its mini-board.
    pub board_finished: bool,
}

/// Reasons the match refuses a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum MatchError {
    /// The match has already been decided.
    #[display("The match is already over")]
    MatchAlreadyOver,
    /// The move targets a board other than the active one.
    #[display("Must play on {}, not {}", required, attempted)]
    RoutingViolation {
        /// Board the move targeted.
        attempted: Position,
        /// Board the move had to target.
        required: Position,
    },
    /// The targeted mini-board has already concluded.
    #[display("Board {} is already finished", _0)]
    BoardFinished(#[error(not(source))] Position),
    /// The move carries the wrong mark.
    #[display("It's {}'s turn, not {}'s", expected, got)]
    WrongTurn {
        /// Mark whose turn it is.
        expected: Mark,
        /// Mark that tried to move.
        got: Mark,
    },
}

/// Turn, routing, and termination state of one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchState {
    turn: Mark,
    active_board: ActiveBoard,
    finished: BTreeSet<Position>,
    result: Outcome,
}

impl MatchState {
    /// Starts a match: X to move, free choice of board.
    #[instrument]
    pub fn new() -> Self {
        Self {
            turn: Mark::X,
            active_board: ActiveBoard::Any,
            finished: BTreeSet::new(),
            result: Outcome::Undecided,
        }
    }

    /// Whose move is next.
    pub fn turn(&self) -> Mark {
        self.turn
    }

    /// Where the next move must go.
    pub fn active_board(&self) -> ActiveBoard {
        self.active_board
    }

    /// Whether a mini-board has concluded.
    pub fn is_finished(&self, board: Position) -> bool {
        self.finished.contains(&board)
    }

    /// Overall match result.
    pub fn result(&self) -> Outcome {
        self.result
    }

    /// Whether the match has been decided.
    pub fn is_over(&self) -> bool {
        self.result.is_decided()
    }

    /// Whether a move on this board would currently be accepted.
    pub fn is_playable(&self, board: Position) -> bool {
        self.check_play(board).is_ok()
    }

    /// Validates a prospective move before it is sent anywhere.
    #[instrument(skip(self), fields(turn = %self.turn, active = %self.active_board))]
    pub fn check_play(&self, board: Position) -> Result<(), MatchError> {
        if self.is_over() {
            return Err(MatchError::MatchAlreadyOver);
        }
        if self.is_finished(board) {
            return Err(MatchError::BoardFinished(board));
        }
        if let ActiveBoard::Board(required) = self.active_board
            && required != board
        {
            return Err(MatchError::RoutingViolation {
                attempted: board,
                required,
            });
        }
        Ok(())
    }

    /// Applies an accepted mini-board move.
    ///
    /// Flips the turn, records the board as finished if it concluded, and
    /// routes the opponent to the board matching the played cell, or to any
    /// board if that one is finished (including the board just concluded).
    /// A rejected event leaves the state untouched.
    #[instrument(skip(self), fields(board = %event.board, cell = %event.cell, mark = %event.mark))]
    pub fn apply_move(&mut self, event: MoveEvent) -> Result<Routing, MatchError> {
        self.check_play(event.board).inspect_err(|e| {
            warn!(error = %e, "Rejected move event");
        })?;
        if event.mark != self.turn {
            warn!(expected = %self.turn, "Move event carries the wrong mark");
            return Err(MatchError::WrongTurn {
                expected: self.turn,
                got: event.mark,
            });
        }

        self.turn = self.turn.opponent();

        if !event.still_playing {
            self.finished.insert(event.board);
            info!(finished = self.finished.len(), "Mini-board concluded");
        }

        self.active_board = if self.is_finished(event.cell) {
            ActiveBoard::Any
        } else {
            ActiveBoard::Board(event.cell)
        };

        debug!(turn = %self.turn, active = %self.active_board, "Move applied");
        self.debug_check_invariants();

        Ok(Routing {
            turn: self.turn,
            active_board: self.active_board,
            board_finished: !event.still_playing,
        })
    }

    /// Records the meta-board's outcome after a concluded mini-board was
    /// forwarded to it. A decided outcome ends the match.
    #[instrument(skip(self))]
    pub fn record_meta_outcome(&mut self, outcome: Outcome) -> Result<(), MatchError> {
        if self.is_over() {
            warn!(result = %self.result, "Meta outcome after match end");
            return Err(MatchError::MatchAlreadyOver);
        }
        if outcome.is_decided() {
            info!(result = %outcome, "Match over");
            self.result = outcome;
        }
        self.debug_check_invariants();
        Ok(())
    }

    fn debug_check_invariants(&self) {
        if cfg!(debug_assertions)
            && let Err(violations) = MatchInvariants::check_all(self)
        {
            panic!("Match invariants violated: {:?}", violations);
        }
    }
}

impl Default for MatchState {
    fn default() -> Self {
        Self::new()
    }
}
