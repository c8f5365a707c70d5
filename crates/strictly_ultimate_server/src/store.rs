//! Canonical board storage behind a move authority.
//!
//! Boards accept `X`, `O`, and the blocked symbol `-`, so the same store
//! backs mini-boards and meta-boards. Turn order is not enforced here: the
//! match orchestrator owns it.

use crate::authority::{BoardId, BoardSnapshot, WireMark};
use derive_more::{Display, Error};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use strictly_ultimate::{Grid, MetaCell, Mark, Position, evaluate};
use tracing::{debug, info, instrument, warn};

/// Reasons the store refuses an operation.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum StoreError {
    /// No board with that id.
    #[display("Game not found")]
    NotFound,
    /// Index outside 0-8.
    #[display("Index out of range (0-8)")]
    IndexOutOfRange,
    /// Board already won or drawn.
    #[display("Game is over")]
    GameOver,
    /// Cell already holds a symbol.
    #[display("Cell occupied")]
    CellOccupied,
}

/// Thread-safe store of authoritative boards.
#[derive(Debug, Clone, Default)]
pub struct BoardStore {
    boards: Arc<Mutex<HashMap<BoardId, Grid<MetaCell>>>>,
    next_id: Arc<AtomicU64>,
}

impl BoardStore {
    /// Creates an empty store.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating board store");
        Self::default()
    }

    fn boards(&self) -> MutexGuard<'_, HashMap<BoardId, Grid<MetaCell>>> {
        self.boards.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Creates a fresh empty board.
    #[instrument(skip(self))]
    pub fn create(&self) -> BoardSnapshot {
        let id = format!("board-{}", self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let grid = Grid::new();
        self.boards().insert(id.clone(), grid);
        info!(board_id = %id, "Created board");
        BoardSnapshot::from_grid(id, &grid)
    }

    /// Current state of a board.
    #[instrument(skip(self))]
    pub fn get(&self, id: &str) -> Result<BoardSnapshot, StoreError> {
        let boards = self.boards();
        let grid = boards.get(id).ok_or_else(|| {
            debug!(board_id = id, "Board not found");
            StoreError::NotFound
        })?;
        Ok(BoardSnapshot::from_grid(id.to_string(), grid))
    }

    /// Places a symbol on a board.
    #[instrument(skip(self))]
    pub fn apply_move(
        &self,
        id: &str,
        index: i64,
        player: WireMark,
    ) -> Result<BoardSnapshot, StoreError> {
        let mut boards = self.boards();
        let grid = boards.get_mut(id).ok_or(StoreError::NotFound)?;

        let pos = usize::try_from(index)
            .ok()
            .and_then(Position::from_index)
            .ok_or_else(|| {
                warn!(board_id = id, index, "Index out of range");
                StoreError::IndexOutOfRange
            })?;

        if evaluate(grid).is_decided() {
            warn!(board_id = id, "Move on finished board");
            return Err(StoreError::GameOver);
        }

        let cell = match player {
            WireMark::X => MetaCell::Claimed(Mark::X),
            WireMark::O => MetaCell::Claimed(Mark::O),
            WireMark::Blocked => MetaCell::Blocked,
        };
        grid.place(pos, cell).map_err(|e| {
            warn!(board_id = id, error = %e, "Rejected placement");
            StoreError::CellOccupied
        })?;

        let snapshot = BoardSnapshot::from_grid(id.to_string(), grid);
        info!(board_id = id, index, %player, status = %snapshot.status, "Move applied");
        Ok(snapshot)
    }

    /// Number of boards held.
    pub fn len(&self) -> usize {
        self.boards().len()
    }

    /// Whether the store holds no boards.
    pub fn is_empty(&self) -> bool {
        self.boards().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_issues_distinct_ids() {
        let store = BoardStore::new();
        let a = store.create();
        let b = store.create();
        assert_ne!(a.id, b.id);
        assert_eq!(store.len(), 2);
        assert_eq!(a.board, [None; 9]);
    }

    #[test]
    fn test_win_flow() {
        let store = BoardStore::new();
        let id = store.create().id;
        for (index, player) in [
            (0, WireMark::X),
            (3, WireMark::O),
            (1, WireMark::X),
            (4, WireMark::O),
        ] {
            store.apply_move(&id, index, player).unwrap();
        }
        let snapshot = store.apply_move(&id, 2, WireMark::X).unwrap();
        assert_eq!(snapshot.winner, Some(WireMark::X));
        assert!(snapshot.status.to_lowercase().starts_with("x wins"));

        assert_eq!(
            store.apply_move(&id, 8, WireMark::O),
            Err(StoreError::GameOver)
        );
    }

    #[test]
    fn test_bad_requests() {
        let store = BoardStore::new();
        let id = store.create().id;

        let err = store.apply_move(&id, 99, WireMark::X).unwrap_err();
        assert!(err.to_string().to_lowercase().contains("range"));
        assert_eq!(
            store.apply_move(&id, -1, WireMark::X),
            Err(StoreError::IndexOutOfRange)
        );

        store.apply_move(&id, 0, WireMark::X).unwrap();
        let err = store.apply_move(&id, 0, WireMark::O).unwrap_err();
        assert!(err.to_string().to_lowercase().contains("occupied"));

        // The blocked symbol cannot overwrite either
        assert_eq!(
            store.apply_move(&id, 0, WireMark::Blocked),
            Err(StoreError::CellOccupied)
        );

        assert_eq!(
            store.apply_move("missing", 0, WireMark::X),
            Err(StoreError::NotFound)
        );
    }

    #[test]
    fn test_blocked_row_is_not_a_win() {
        let store = BoardStore::new();
        let id = store.create().id;
        for index in 0..3 {
            store.apply_move(&id, index, WireMark::Blocked).unwrap();
        }
        let snapshot = store.get(&id).unwrap();
        assert_eq!(snapshot.winner, None);
        assert!(!snapshot.is_draw);
    }
}
