//! Draw detection and overall board evaluation.

use super::win::check_winner;
use crate::{Grid, LineCell, Outcome};
use tracing::instrument;

/// Checks if every cell is filled.
///
/// Blocked meta cells count as filled.
#[instrument(skip(grid))]
pub fn is_full<C: LineCell>(grid: &Grid<C>) -> bool {
    grid.cells().iter().all(|c| c.is_filled())
}

/// Evaluates a grid: a line wins, otherwise a full grid draws.
#[instrument(skip(grid))]
pub fn evaluate<C: LineCell>(grid: &Grid<C>) -> Outcome {
    if let Some(mark) = check_winner(grid) {
        Outcome::Won(mark)
    } else if is_full(grid) {
        Outcome::Drawn
    } else {
        Outcome::Undecided
    }
}
