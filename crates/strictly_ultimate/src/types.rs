//! Core domain types for ultimate tic-tac-toe.

use super::position::Position;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Player mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Mark {
    /// Player X (moves first).
    #[display("X")]
    X,
    /// Player O.
    #[display("O")]
    O,
}

impl Mark {
    /// Returns the other player's mark.
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

/// A cell on a mini-board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    /// Not yet played.
    #[default]
    Empty,
    /// Marked by a player.
    Occupied(Mark),
}

/// A cell on the meta-board: the outcome of the mini-board beneath it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MetaCell {
    /// Mini-board still undecided.
    #[default]
    Empty,
    /// Mini-board won by a player.
    Claimed(Mark),
    /// Mini-board drew; occupied but owned by nobody.
    Blocked,
}

impl MetaCell {
    /// Meta cell value for a concluded mini-board, `None` while undecided.
    pub fn from_outcome(outcome: Outcome) -> Option<Self> {
        match outcome {
            Outcome::Undecided => None,
            Outcome::Won(mark) => Some(MetaCell::Claimed(mark)),
            Outcome::Drawn => Some(MetaCell::Blocked),
        }
    }
}

/// Cell values the line detector can evaluate.
///
/// A cell contributes at most one mark to a line. Filled cells that own no
/// mark (a blocked meta cell) count towards a full grid but never win.
pub trait LineCell: Copy + Eq + Debug {
    /// The unplayed value.
    const EMPTY: Self;

    /// Mark this cell contributes to a line, if any.
    fn owner(self) -> Option<Mark>;

    /// Single-character rendering, `None` for empty.
    fn symbol(self) -> Option<char>;

    /// Whether the cell has been played.
    fn is_filled(self) -> bool {
        self != Self::EMPTY
    }
}

impl LineCell for Cell {
    const EMPTY: Self = Cell::Empty;

    fn owner(self) -> Option<Mark> {
        match self {
            Cell::Empty => None,
            Cell::Occupied(mark) => Some(mark),
        }
    }

    fn symbol(self) -> Option<char> {
        match self {
            Cell::Empty => None,
            Cell::Occupied(Mark::X) => Some('X'),
            Cell::Occupied(Mark::O) => Some('O'),
        }
    }
}

impl LineCell for MetaCell {
    const EMPTY: Self = MetaCell::Empty;

    fn owner(self) -> Option<Mark> {
        match self {
            MetaCell::Claimed(mark) => Some(mark),
            MetaCell::Empty | MetaCell::Blocked => None,
        }
    }

    fn symbol(self) -> Option<char> {
        match self {
            MetaCell::Empty => None,
            MetaCell::Claimed(Mark::X) => Some('X'),
            MetaCell::Claimed(Mark::O) => Some('O'),
            MetaCell::Blocked => Some('-'),
        }
    }
}

/// Result of a board or of the whole match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display)]
pub enum Outcome {
    /// Still being played.
    #[default]
    #[display("In progress")]
    Undecided,
    /// Three in a row for a player.
    #[display("{_0} wins")]
    Won(Mark),
    /// Full with no line.
    #[display("Draw")]
    Drawn,
}

impl Outcome {
    /// Whether the board has concluded.
    pub fn is_decided(self) -> bool {
        self != Outcome::Undecided
    }
}

/// Error placing a value on a [`Grid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum GridError {
    /// The cell already holds a value.
    #[display("Cell {} is already occupied", _0)]
    Occupied(#[error(not(source))] Position),
    /// Placing the empty value is not a move.
    #[display("Cannot place an empty value at {}", _0)]
    EmptyValue(#[error(not(source))] Position),
}

/// 3x3 grid in row-major order, generic over its cell value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grid<C> {
    cells: [C; 9],
}

impl<C: LineCell> Grid<C> {
    /// Creates an empty grid.
    pub fn new() -> Self {
        Self {
            cells: [C::EMPTY; 9],
        }
    }

    /// Builds a grid from raw cells (e.g. an authoritative snapshot).
    pub fn from_cells(cells: [C; 9]) -> Self {
        Self { cells }
    }

    /// Value at a position.
    pub fn get(&self, pos: Position) -> C {
        self.cells[pos.to_index()]
    }

    /// Whether the position is unplayed.
    pub fn is_empty(&self, pos: Position) -> bool {
        !self.get(pos).is_filled()
    }

    /// Writes a value into an empty cell. Cells are write-once.
    pub fn place(&mut self, pos: Position, value: C) -> Result<(), GridError> {
        if !value.is_filled() {
            return Err(GridError::EmptyValue(pos));
        }
        if !self.is_empty(pos) {
            return Err(GridError::Occupied(pos));
        }
        self.cells[pos.to_index()] = value;
        Ok(())
    }

    /// All cells in index order.
    pub fn cells(&self) -> &[C; 9] {
        &self.cells
    }

    /// Number of filled cells.
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_filled()).count()
    }

    /// Formats the grid as text, numbering empty cells 1-9.
    pub fn display(&self) -> String {
        let mut result = String::new();
        for row in 0..3 {
            for col in 0..3 {
                let idx = row * 3 + col;
                match self.cells[idx].symbol() {
                    Some(symbol) => result.push(symbol),
                    None => result.push_str(&(idx + 1).to_string()),
                }
                if col < 2 {
                    result.push('|');
                }
            }
            if row < 2 {
                result.push_str("\n-+-+-\n");
            }
        }
        result
    }
}

impl<C: LineCell> Default for Grid<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_is_write_once() {
        let mut grid = Grid::<Cell>::new();
        grid.place(Position::Center, Cell::Occupied(Mark::X)).unwrap();
        assert_eq!(
            grid.place(Position::Center, Cell::Occupied(Mark::O)),
            Err(GridError::Occupied(Position::Center))
        );
        assert_eq!(grid.get(Position::Center), Cell::Occupied(Mark::X));
    }

    #[test]
    fn test_place_rejects_empty_value() {
        let mut grid = Grid::<MetaCell>::new();
        assert_eq!(
            grid.place(Position::TopLeft, MetaCell::Empty),
            Err(GridError::EmptyValue(Position::TopLeft))
        );
    }

    #[test]
    fn test_blocked_fills_but_owns_nothing() {
        assert!(MetaCell::Blocked.is_filled());
        assert_eq!(MetaCell::Blocked.owner(), None);
        assert_eq!(MetaCell::Claimed(Mark::O).owner(), Some(Mark::O));
    }

    #[test]
    fn test_filled_count_grows() {
        let mut grid = Grid::<Cell>::new();
        assert_eq!(grid.filled_count(), 0);
        grid.place(Position::Center, Cell::Occupied(Mark::X)).unwrap();
        assert!(!grid.is_empty(Position::Center));
        assert_eq!(grid.filled_count(), 1);
    }

    #[test]
    fn test_display() {
        let mut grid = Grid::<MetaCell>::new();
        grid.place(Position::TopLeft, MetaCell::Claimed(Mark::X)).unwrap();
        grid.place(Position::Center, MetaCell::Blocked).unwrap();
        assert_eq!(grid.display(), "X|2|3\n-+-+-\n4|-|6\n-+-+-\n7|8|9");
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(Outcome::Won(Mark::X).to_string(), "X wins");
        assert_eq!(Outcome::Drawn.to_string(), "Draw");
        assert_eq!(Outcome::Undecided.to_string(), "In progress");
    }

    #[test]
    fn test_meta_cell_from_outcome() {
        assert_eq!(MetaCell::from_outcome(Outcome::Undecided), None);
        assert_eq!(
            MetaCell::from_outcome(Outcome::Won(Mark::O)),
            Some(MetaCell::Claimed(Mark::O))
        );
        assert_eq!(MetaCell::from_outcome(Outcome::Drawn), Some(MetaCell::Blocked));
    }
}
