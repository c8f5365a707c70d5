//! Invariants over a single accepted placement.

use super::Invariant;
use crate::{Grid, LineCell, Position, evaluate};

/// A mirror grid, the authoritative grid that should replace it, and the
/// placement that was submitted in between.
#[derive(Debug, Clone, Copy)]
pub struct GridTransition<'a, C> {
    /// Mirror before the move.
    pub before: &'a Grid<C>,
    /// Authoritative grid after the move.
    pub after: &'a Grid<C>,
    /// Position that was submitted.
    pub position: Position,
    /// Value that was submitted.
    pub value: C,
}

impl<'a, C> GridTransition<'a, C> {
    /// Creates a transition.
    pub fn new(before: &'a Grid<C>, after: &'a Grid<C>, position: Position, value: C) -> Self {
        Self {
            before,
            after,
            position,
            value,
        }
    }
}

/// Invariant: a filled cell is never changed or cleared.
pub struct WriteOnceCells;

impl<C: LineCell> Invariant<GridTransition<'_, C>> for WriteOnceCells {
    fn holds(t: &GridTransition<'_, C>) -> bool {
        Position::ALL.iter().all(|&pos| {
            let before = t.before.get(pos);
            !before.is_filled() || t.after.get(pos) == before
        })
    }

    fn description() -> &'static str {
        "Filled cells are never overwritten"
    }
}

/// Invariant: the submitted placement is present and the grid gained exactly
/// that one cell.
pub struct MoveRecorded;

impl<C: LineCell> Invariant<GridTransition<'_, C>> for MoveRecorded {
    fn holds(t: &GridTransition<'_, C>) -> bool {
        t.before.is_empty(t.position)
            && t.after.get(t.position) == t.value
            && t.after.filled_count() == t.before.filled_count() + 1
    }

    fn description() -> &'static str {
        "Accepted snapshot contains exactly the submitted move"
    }
}

/// Invariant: a decided board stays decided with the same result.
pub struct OutcomeMonotonic;

impl<C: LineCell> Invariant<GridTransition<'_, C>> for OutcomeMonotonic {
    fn holds(t: &GridTransition<'_, C>) -> bool {
        let before = evaluate(t.before);
        !before.is_decided() || evaluate(t.after) == before
    }

    fn description() -> &'static str {
        "Board outcome never changes once decided"
    }
}
