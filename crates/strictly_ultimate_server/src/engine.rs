//! Board engines: client-side mirrors of authority-owned boards.
//!
//! One engine type serves both scales. A [`MiniBoard`] holds player marks; a
//! [`MetaBoard`] holds mini-board outcomes. Both submit every placement to
//! the authority and only change after it answers.

use crate::authority::{AuthorityError, BoardId, MoveAuthority, WireCell};
use derive_more::{Display, Error, From};
use strictly_ultimate::invariants::{GridTransition, InvariantSet, SnapshotInvariants};
use strictly_ultimate::{Cell, Grid, MetaCell, Outcome, Position, evaluate};
use tracing::{debug, info, instrument, warn};

/// Engine for one of the nine sub-games.
pub type MiniBoard = BoardEngine<Cell>;

/// Engine for the outer board.
pub type MetaBoard = BoardEngine<MetaCell>;

/// Reasons an engine refuses or fails a move.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error, From)]
pub enum EngineError {
    /// The authority failed the request.
    #[display("{}", _0)]
    Authority(AuthorityError),
    /// The board has already concluded.
    #[display("Board is already finished")]
    #[from(ignore)]
    BoardFinished,
    /// The cell is already filled in the mirror.
    #[display("Cell {} is already occupied", _0)]
    #[from(ignore)]
    CellOccupied(#[error(not(source))] Position),
    /// The submitted value is not a placement.
    #[display("Cannot place an empty value")]
    #[from(ignore)]
    EmptyValue,
    /// The authority's answer contradicts the mirror.
    #[display("Board out of sync with authority: {}", _0)]
    #[from(ignore)]
    Desync(#[error(not(source))] String),
}

/// Client-side mirror of one authority board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardEngine<C> {
    id: BoardId,
    grid: Grid<C>,
    outcome: Outcome,
}

impl<C: WireCell> BoardEngine<C> {
    /// Requests a fresh board from the authority.
    #[instrument(skip(authority))]
    pub async fn create<A: MoveAuthority + ?Sized>(authority: &A) -> Result<Self, EngineError> {
        let snapshot = authority.create_board().await.map_err(|e| match e {
            AuthorityError::CreateFailed(_) => e,
            other => AuthorityError::CreateFailed(other.to_string()),
        })?;

        let grid = snapshot
            .grid::<C>()
            .filter(|grid| grid.filled_count() == 0)
            .ok_or_else(|| {
                warn!(board_id = %snapshot.id, "Authority returned a non-empty new board");
                EngineError::Desync("new board is not empty".to_string())
            })?;

        debug!(board_id = %snapshot.id, "Board engine created");
        Ok(Self {
            id: snapshot.id,
            grid,
            outcome: Outcome::Undecided,
        })
    }

    /// Authority identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Mirrored grid.
    pub fn grid(&self) -> &Grid<C> {
        &self.grid
    }

    /// Mirrored outcome.
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Whether the board has concluded.
    pub fn is_finished(&self) -> bool {
        self.outcome.is_decided()
    }

    /// Submits a placement and adopts the authority's answer.
    ///
    /// Finished boards and filled cells are refused locally, before any
    /// request. An accepted snapshot replaces the mirror wholesale once it
    /// passes the grid invariants; the outcome is recomputed from it. Any
    /// failure leaves the mirror untouched.
    #[instrument(skip(self, authority), fields(board_id = %self.id))]
    pub async fn attempt_move<A: MoveAuthority + ?Sized>(
        &mut self,
        authority: &A,
        position: Position,
        value: C,
    ) -> Result<Outcome, EngineError> {
        if self.is_finished() {
            return Err(EngineError::BoardFinished);
        }
        if !self.grid.is_empty(position) {
            return Err(EngineError::CellOccupied(position));
        }
        let wire = value.to_wire().ok_or(EngineError::EmptyValue)?;

        let snapshot = authority
            .submit_move(&self.id, position.to_index(), wire)
            .await?;

        if snapshot.id != self.id {
            warn!(returned = %snapshot.id, "Authority answered for another board");
            return Err(EngineError::Desync(format!(
                "expected board {}, got {}",
                self.id, snapshot.id
            )));
        }
        let next = snapshot.grid::<C>().ok_or_else(|| {
            EngineError::Desync("snapshot holds symbols this board cannot hold".to_string())
        })?;

        let transition = GridTransition::new(&self.grid, &next, position, value);
        SnapshotInvariants::check_all(&transition).map_err(|violations| {
            let descriptions = violations
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            warn!(violations = %descriptions, "Rejected authority snapshot");
            EngineError::Desync(descriptions)
        })?;

        let outcome = evaluate(&next);
        let reported = snapshot.reported_outcome();
        if reported != outcome {
            warn!(%reported, computed = %outcome, "Authority outcome disagrees with grid");
        }

        self.grid = next;
        self.outcome = outcome;
        if outcome.is_decided() {
            info!(%outcome, "Board concluded");
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authority::{BoardSnapshot, InMemoryAuthority, WireMark};
    use strictly_ultimate::Mark;

    /// Authority that answers every move with a fixed snapshot.
    struct Canned(BoardSnapshot);

    #[async_trait::async_trait]
    impl MoveAuthority for Canned {
        async fn create_board(&self) -> Result<BoardSnapshot, AuthorityError> {
            let mut fresh = self.0.clone();
            fresh.board = [None; 9];
            Ok(fresh)
        }

        async fn submit_move(
            &self,
            _id: &str,
            _index: usize,
            _player: WireMark,
        ) -> Result<BoardSnapshot, AuthorityError> {
            Ok(self.0.clone())
        }
    }

    fn snapshot(cells: [Option<WireMark>; 9]) -> BoardSnapshot {
        BoardSnapshot {
            id: "board-1".to_string(),
            board: cells,
            winner: None,
            is_draw: false,
            status: "In progress".to_string(),
        }
    }

    #[tokio::test]
    async fn test_win_detected_from_authority_grid() {
        let authority = InMemoryAuthority::new();
        let mut board = MiniBoard::create(&authority).await.unwrap();
        let moves = [
            (Position::TopLeft, Mark::X),
            (Position::MiddleLeft, Mark::O),
            (Position::TopCenter, Mark::X),
            (Position::Center, Mark::O),
        ];
        for (pos, mark) in moves {
            let outcome = board
                .attempt_move(&authority, pos, Cell::Occupied(mark))
                .await
                .unwrap();
            assert_eq!(outcome, Outcome::Undecided);
        }
        let outcome = board
            .attempt_move(&authority, Position::TopRight, Cell::Occupied(Mark::X))
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Won(Mark::X));

        let err = board
            .attempt_move(&authority, Position::BottomRight, Cell::Occupied(Mark::O))
            .await
            .unwrap_err();
        assert_eq!(err, EngineError::BoardFinished);
    }

    #[tokio::test]
    async fn test_occupied_cell_refused_locally() {
        let authority = InMemoryAuthority::new();
        let mut board = MiniBoard::create(&authority).await.unwrap();
        board
            .attempt_move(&authority, Position::Center, Cell::Occupied(Mark::X))
            .await
            .unwrap();
        let before = board.clone();

        let err = board
            .attempt_move(&authority, Position::Center, Cell::Occupied(Mark::O))
            .await
            .unwrap_err();
        assert_eq!(err, EngineError::CellOccupied(Position::Center));
        assert_eq!(board, before);
    }

    #[tokio::test]
    async fn test_snapshot_missing_move_is_desync() {
        let authority = Canned(snapshot([None; 9]));
        let mut board = MiniBoard::create(&authority).await.unwrap();
        let before = board.clone();

        let err = board
            .attempt_move(&authority, Position::Center, Cell::Occupied(Mark::X))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Desync(_)));
        assert_eq!(board, before);
    }

    #[tokio::test]
    async fn test_blocked_symbol_on_mini_board_is_desync() {
        let mut cells = [None; 9];
        cells[4] = Some(WireMark::Blocked);
        let authority = Canned(snapshot(cells));
        let mut board = MiniBoard::create(&authority).await.unwrap();

        let err = board
            .attempt_move(&authority, Position::Center, Cell::Occupied(Mark::X))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Desync(_)));
        assert_eq!(board.grid().filled_count(), 0);
    }

    #[tokio::test]
    async fn test_meta_board_accepts_blocked() {
        let authority = InMemoryAuthority::new();
        let mut meta = MetaBoard::create(&authority).await.unwrap();
        let outcome = meta
            .attempt_move(&authority, Position::Center, MetaCell::Blocked)
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Undecided);
        assert_eq!(meta.grid().get(Position::Center), MetaCell::Blocked);

        let err = meta
            .attempt_move(&authority, Position::TopLeft, MetaCell::Empty)
            .await
            .unwrap_err();
        assert_eq!(err, EngineError::EmptyValue);
    }
}
