//! Pure ultimate tic-tac-toe rules.
//!
//! Nine mini-boards sit in a 3x3 meta-board. Winning a mini-board claims the
//! matching meta cell, drawing it blocks that cell, and the meta-board decides
//! the match.
//!
//! # Architecture
//!
//! - **Types**: marks, cell values, and the generic [`Grid`]
//! - **Rules**: one line detector shared by mini and meta boards
//! - **Invariants**: write-once cells and monotonic outcomes, checked on every
//!   authoritative snapshot
//! - **Match state**: turn order, active-board routing, and termination
//!
//! Nothing here performs I/O. The boards themselves are owned by a remote
//! move authority; see the `strictly_ultimate_server` crate for the engines
//! that mirror them.
//!
//! # Example
//!
//! ```
//! use strictly_ultimate::{ActiveBoard, Mark, MatchState, MoveEvent, Position};
//!
//! let mut state = MatchState::new();
//! let event = MoveEvent::new(Position::TopLeft, Position::Center, Mark::X, true);
//! let routing = state.apply_move(event).unwrap();
//!
//! assert_eq!(routing.turn, Mark::O);
//! assert_eq!(routing.active_board, ActiveBoard::Board(Position::Center));
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod match_state;
mod position;
mod types;

pub mod invariants;
pub mod rules;

pub use match_state::{ActiveBoard, MatchError, MatchState, MoveEvent, Routing};
pub use position::Position;
pub use rules::{check_winner, evaluate, is_full};
pub use types::{Cell, Grid, GridError, LineCell, Mark, MetaCell, Outcome};
