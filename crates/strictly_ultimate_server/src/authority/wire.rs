//! JSON shapes exchanged with the move authority.

use super::BoardId;
use derive_more::Display;
use derive_new::new;
use serde::{Deserialize, Serialize};
use strictly_ultimate::{Cell, Grid, LineCell, Mark, MetaCell, Outcome, evaluate};

/// Symbol the authority stores in a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum WireMark {
    /// Player X.
    #[serde(rename = "X")]
    #[display("X")]
    X,
    /// Player O.
    #[serde(rename = "O")]
    #[display("O")]
    O,
    /// Drawn mini-board on the meta-board. Not a player.
    #[serde(rename = "-")]
    #[display("-")]
    Blocked,
}

impl From<Mark> for WireMark {
    fn from(mark: Mark) -> Self {
        match mark {
            Mark::X => WireMark::X,
            Mark::O => WireMark::O,
        }
    }
}

impl WireMark {
    /// Player mark, `None` for the blocked symbol.
    pub fn mark(self) -> Option<Mark> {
        match self {
            WireMark::X => Some(Mark::X),
            WireMark::O => Some(Mark::O),
            WireMark::Blocked => None,
        }
    }
}

/// Board state as the authority reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    /// Board identifier.
    pub id: BoardId,
    /// The 9 cells, row-major; `null` is empty.
    pub board: [Option<WireMark>; 9],
    /// Winning symbol, if any.
    pub winner: Option<WireMark>,
    /// Whether the board filled without a winner.
    pub is_draw: bool,
    /// Human-readable status line.
    pub status: String,
}

impl BoardSnapshot {
    /// Snapshot of a grid held by an authority.
    pub fn from_grid(id: BoardId, grid: &Grid<MetaCell>) -> Self {
        let outcome = evaluate(grid);
        Self {
            id,
            board: (*grid.cells()).map(|c| c.to_wire()),
            winner: match outcome {
                Outcome::Won(mark) => Some(mark.into()),
                _ => None,
            },
            is_draw: outcome == Outcome::Drawn,
            status: outcome.to_string(),
        }
    }

    /// Outcome the authority claims for this board.
    pub fn reported_outcome(&self) -> Outcome {
        match self.winner.and_then(WireMark::mark) {
            Some(mark) => Outcome::Won(mark),
            None if self.is_draw => Outcome::Drawn,
            None => Outcome::Undecided,
        }
    }

    /// Decodes the cells into a typed grid, `None` if a symbol is not valid
    /// for that cell type.
    pub fn grid<C: WireCell>(&self) -> Option<Grid<C>> {
        let mut cells = [C::EMPTY; 9];
        for (slot, wire) in cells.iter_mut().zip(self.board) {
            *slot = C::from_wire(wire)?;
        }
        Some(Grid::from_cells(cells))
    }
}

/// Request body for a move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct MoveRequest {
    /// Cell index (0-8). Signed so out-of-range input reaches validation.
    pub index: i64,
    /// Symbol to place.
    pub player: WireMark,
}

/// Error body returned with non-success statuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct ErrorDetail {
    /// Human-readable reason.
    pub detail: String,
}

/// Cell types that travel over the wire.
pub trait WireCell: LineCell + Send + Sync {
    /// Encodes the cell, `None` when empty.
    fn to_wire(self) -> Option<WireMark>;

    /// Decodes a cell; outer `None` if the symbol is not allowed here.
    fn from_wire(wire: Option<WireMark>) -> Option<Self>;
}

impl WireCell for Cell {
    fn to_wire(self) -> Option<WireMark> {
        match self {
            Cell::Empty => None,
            Cell::Occupied(mark) => Some(mark.into()),
        }
    }

    fn from_wire(wire: Option<WireMark>) -> Option<Self> {
        match wire {
            None => Some(Cell::Empty),
            Some(WireMark::Blocked) => None,
            Some(w) => w.mark().map(Cell::Occupied),
        }
    }
}

impl WireCell for MetaCell {
    fn to_wire(self) -> Option<WireMark> {
        match self {
            MetaCell::Empty => None,
            MetaCell::Claimed(mark) => Some(mark.into()),
            MetaCell::Blocked => Some(WireMark::Blocked),
        }
    }

    fn from_wire(wire: Option<WireMark>) -> Option<Self> {
        Some(match wire {
            None => MetaCell::Empty,
            Some(WireMark::Blocked) => MetaCell::Blocked,
            Some(WireMark::X) => MetaCell::Claimed(Mark::X),
            Some(WireMark::O) => MetaCell::Claimed(Mark::O),
        })
    }
}
