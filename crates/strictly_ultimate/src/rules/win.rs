//! Win detection.

use crate::{Grid, LineCell, Mark, Position};
use tracing::instrument;

/// The eight winning lines: three rows, three columns, two diagonals.
pub const LINES: [[Position; 3]; 8] = [
    // Rows
    [Position::TopLeft, Position::TopCenter, Position::TopRight],
    [Position::MiddleLeft, Position::Center, Position::MiddleRight],
    [Position::BottomLeft, Position::BottomCenter, Position::BottomRight],
    // Columns
    [Position::TopLeft, Position::MiddleLeft, Position::BottomLeft],
    [Position::TopCenter, Position::Center, Position::BottomCenter],
    [Position::TopRight, Position::MiddleRight, Position::BottomRight],
    // Diagonals
    [Position::TopLeft, Position::Center, Position::BottomRight],
    [Position::TopRight, Position::Center, Position::BottomLeft],
];

/// Returns the mark holding three in a row, if any.
///
/// Cells that own no mark (empty, blocked) never complete a line.
#[instrument(skip(grid))]
pub fn check_winner<C: LineCell>(grid: &Grid<C>) -> Option<Mark> {
    LINES.iter().find_map(|&[a, b, c]| {
        let owner = grid.get(a).owner()?;
        (grid.get(b).owner() == Some(owner) && grid.get(c).owner() == Some(owner)).then_some(owner)
    })
}
