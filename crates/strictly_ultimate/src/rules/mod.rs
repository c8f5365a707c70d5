//! Board rules shared by mini-boards and the meta-board.
//!
//! Rules are pure functions over [`Grid`](crate::Grid), generic over the cell
//! value, so the meta-board reuses exactly the detection path of a
//! mini-board.

pub mod draw;
pub mod win;

pub use draw::{evaluate, is_full};
pub use win::{LINES, check_winner};
