//! Match orchestration over authority-owned boards.
//!
//! The orchestrator owns the [`MatchState`], nine mini-board engines, and one
//! meta-board engine. Every play is validated locally, submitted to the move
//! authority, and applied only after the authority accepts it. One play is in
//! flight at a time: `submit_cell_play` takes `&mut self`, and a play whose
//! future is dropped mid-request leaves the orchestrator refusing further
//! plays until [`MatchOrchestrator::reset_match`].

use crate::authority::{AuthorityError, MoveAuthority, WireCell};
use crate::engine::{BoardEngine, EngineError, MetaBoard, MiniBoard};
use derive_more::{Display, Error};
use strictly_ultimate::{
    ActiveBoard, Cell, Grid, Mark, MatchError, MatchState, MetaCell, MoveEvent, Outcome, Position,
    Routing,
};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// A board engine, or the reason it could not be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardSlot<C> {
    /// Created and playable.
    Ready(BoardEngine<C>),
    /// Creation failed; holds the reason.
    Unavailable(String),
}

impl<C: WireCell> BoardSlot<C> {
    async fn create<A: MoveAuthority + ?Sized>(authority: &A) -> Self {
        match BoardEngine::create(authority).await {
            Ok(engine) => BoardSlot::Ready(engine),
            Err(e) => {
                warn!(error = %e, "Board unavailable");
                BoardSlot::Unavailable(e.to_string())
            }
        }
    }

    /// The engine, if created.
    pub fn engine(&self) -> Option<&BoardEngine<C>> {
        match self {
            BoardSlot::Ready(engine) => Some(engine),
            BoardSlot::Unavailable(_) => None,
        }
    }

    /// Whether the board was created.
    pub fn is_ready(&self) -> bool {
        matches!(self, BoardSlot::Ready(_))
    }
}

/// Notifications for a presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchEvent {
    /// A play was accepted and applied.
    MoveApplied {
        /// Mini-board played on.
        board: Position,
        /// Cell played.
        cell: Position,
        /// Mark placed.
        mark: Mark,
        /// Turn and routing after the play.
        routing: Routing,
    },
    /// A mini-board concluded.
    BoardConcluded {
        /// The mini-board.
        board: Position,
        /// Its final outcome.
        outcome: Outcome,
    },
    /// The meta-board decided the match.
    MatchOver(Outcome),
    /// A play was refused.
    Rejected {
        /// Mini-board targeted.
        board: Position,
        /// Cell targeted.
        cell: Position,
        /// Reason shown to the players.
        reason: String,
    },
    /// The match was discarded and rebuilt.
    Reset,
}

/// Result of an accepted play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayAccepted {
    /// Mark that was placed.
    pub mark: Mark,
    /// Turn and routing after the play.
    pub routing: Routing,
    /// Outcome of the mini-board played on.
    pub board_outcome: Outcome,
    /// Match result after the play.
    pub match_result: Outcome,
    /// Whether a concluded board's outcome still awaits the meta-board.
    pub meta_pending: bool,
}

/// Reasons a play is refused.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum PlayError {
    /// The match has already been decided.
    #[display("The match is already over")]
    MatchAlreadyOver,
    /// The play targets a board other than the active one.
    #[display("Must play on {}, not {}", required, attempted)]
    RoutingViolation {
        /// Board the play targeted.
        attempted: Position,
        /// Board the play had to target.
        required: Position,
    },
    /// The targeted mini-board has concluded.
    #[display("Board {} is already finished", _0)]
    BoardFinished(#[error(not(source))] Position),
    /// The targeted cell is filled.
    #[display("Cell {} on board {} is occupied", cell, board)]
    CellOccupied {
        /// Mini-board targeted.
        board: Position,
        /// Cell targeted.
        cell: Position,
    },
    /// The targeted mini-board could not be created.
    #[display("Board {} is unavailable: {}", board, reason)]
    BoardUnavailable {
        /// Mini-board targeted.
        board: Position,
        /// Creation failure.
        reason: String,
    },
    /// The meta-board could not be created.
    #[display("Meta-board is unavailable: {}", _0)]
    MetaUnavailable(#[error(not(source))] String),
    /// The authority refused the play.
    #[display("{}", _0)]
    MoveRejected(#[error(not(source))] String),
    /// An earlier play was abandoned mid-request.
    #[display("A move is still in flight; start a new match")]
    MoveInFlight,
    /// A concluded board's outcome has not reached the meta-board.
    #[display("Meta-board update pending; retry it first")]
    MetaSyncPending,
    /// The authority's answer contradicts local state.
    #[display("Out of sync with authority: {}", _0)]
    Desync(#[error(not(source))] String),
}

impl From<MatchError> for PlayError {
    fn from(e: MatchError) -> Self {
        match e {
            MatchError::MatchAlreadyOver => PlayError::MatchAlreadyOver,
            MatchError::RoutingViolation {
                attempted,
                required,
            } => PlayError::RoutingViolation {
                attempted,
                required,
            },
            MatchError::BoardFinished(board) => PlayError::BoardFinished(board),
            MatchError::WrongTurn { .. } => PlayError::Desync(e.to_string()),
        }
    }
}

impl PlayError {
    fn from_engine(e: EngineError, board: Position) -> Self {
        match e {
            EngineError::Authority(AuthorityError::MoveRejected(reason)) => {
                PlayError::MoveRejected(reason)
            }
            EngineError::Authority(other) => PlayError::MoveRejected(other.to_string()),
            EngineError::BoardFinished => PlayError::BoardFinished(board),
            EngineError::CellOccupied(cell) => PlayError::CellOccupied { board, cell },
            EngineError::EmptyValue | EngineError::Desync(_) => PlayError::Desync(e.to_string()),
        }
    }
}

/// Coordinates one match of ultimate tic-tac-toe.
pub struct MatchOrchestrator<A> {
    authority: A,
    state: MatchState,
    boards: [BoardSlot<Cell>; 9],
    meta: BoardSlot<MetaCell>,
    pending_meta: Option<(Position, MetaCell)>,
    in_flight: bool,
    last_rejection: Option<String>,
    events: Option<mpsc::UnboundedSender<MatchEvent>>,
}

impl<A: MoveAuthority> MatchOrchestrator<A> {
    /// Starts a match, creating all ten boards.
    ///
    /// Boards that fail to create are held as [`BoardSlot::Unavailable`]
    /// until [`retry_unavailable`](Self::retry_unavailable).
    #[instrument(skip(authority))]
    pub async fn new(authority: A) -> Self {
        let (boards, meta) = create_boards(&authority).await;
        info!("Match ready");
        Self {
            authority,
            state: MatchState::new(),
            boards,
            meta,
            pending_meta: None,
            in_flight: false,
            last_rejection: None,
            events: None,
        }
    }

    /// Sends notifications to `tx`.
    pub fn with_events(mut self, tx: mpsc::UnboundedSender<MatchEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    /// The move authority.
    pub fn authority(&self) -> &A {
        &self.authority
    }

    /// Whose move is next.
    pub fn current_turn(&self) -> Mark {
        self.state.turn()
    }

    /// Where the next move must go.
    pub fn active_board(&self) -> ActiveBoard {
        self.state.active_board()
    }

    /// Whether a mini-board has concluded.
    pub fn is_finished(&self, board: Position) -> bool {
        self.state.is_finished(board)
    }

    /// Outcome of a mini-board; undecided while unavailable.
    pub fn mini_outcome(&self, board: Position) -> Outcome {
        self.boards[board.to_index()]
            .engine()
            .map(MiniBoard::outcome)
            .unwrap_or_default()
    }

    /// Overall match result.
    pub fn match_result(&self) -> Outcome {
        self.state.result()
    }

    /// Slot for a mini-board.
    pub fn board(&self, board: Position) -> &BoardSlot<Cell> {
        &self.boards[board.to_index()]
    }

    /// Slot for the meta-board.
    pub fn meta(&self) -> &BoardSlot<MetaCell> {
        &self.meta
    }

    /// Mirrored grid of a mini-board, if created.
    pub fn board_grid(&self, board: Position) -> Option<&Grid<Cell>> {
        self.board(board).engine().map(MiniBoard::grid)
    }

    /// Mirrored meta-board grid, if created.
    pub fn meta_grid(&self) -> Option<&Grid<MetaCell>> {
        self.meta.engine().map(MetaBoard::grid)
    }

    /// Whether a play on this board would pass every local check.
    pub fn is_playable(&self, board: Position) -> bool {
        !self.in_flight
            && self.pending_meta.is_none()
            && self.state.is_playable(board)
            && self.board(board).is_ready()
    }

    /// Whether an abandoned play left the match stale.
    pub fn has_stale_move(&self) -> bool {
        self.in_flight
    }

    /// Whether a concluded board still awaits the meta-board.
    pub fn has_pending_meta(&self) -> bool {
        self.pending_meta.is_some()
    }

    /// Reason the most recent play was refused, cleared by the next accepted
    /// play.
    pub fn last_rejection(&self) -> Option<&str> {
        self.last_rejection.as_deref()
    }

    /// Plays the current turn's mark at `cell` on mini-board `board`.
    ///
    /// Local checks run before any request: match over, stale or pending
    /// work, routing, finished or unavailable board, occupied cell. Nothing
    /// changes unless the authority accepts. If the play concludes the board,
    /// its outcome is forwarded to the meta-board; a failed forward still
    /// accepts the play and leaves the outcome pending.
    #[instrument(
        skip(self),
        fields(turn = %self.state.turn(), active = %self.state.active_board())
    )]
    pub async fn submit_cell_play(
        &mut self,
        board: Position,
        cell: Position,
    ) -> Result<PlayAccepted, PlayError> {
        let result = self.try_play(board, cell).await;
        match &result {
            Ok(accepted) => {
                if !accepted.meta_pending {
                    self.last_rejection = None;
                }
                debug!(?accepted, "Play accepted");
            }
            Err(PlayError::MatchAlreadyOver) => {
                info!(result = %self.state.result(), "Play after match end ignored");
            }
            Err(e) => {
                warn!(error = %e, "Play rejected");
                self.last_rejection = Some(e.to_string());
                self.emit(MatchEvent::Rejected {
                    board,
                    cell,
                    reason: e.to_string(),
                });
            }
        }
        result
    }

    async fn try_play(
        &mut self,
        board: Position,
        cell: Position,
    ) -> Result<PlayAccepted, PlayError> {
        if self.state.is_over() {
            return Err(PlayError::MatchAlreadyOver);
        }
        if self.in_flight {
            return Err(PlayError::MoveInFlight);
        }
        if self.pending_meta.is_some() {
            return Err(PlayError::MetaSyncPending);
        }
        self.state.check_play(board)?;

        let mark = self.state.turn();
        let engine = match &mut self.boards[board.to_index()] {
            BoardSlot::Ready(engine) => engine,
            BoardSlot::Unavailable(reason) => {
                return Err(PlayError::BoardUnavailable {
                    board,
                    reason: reason.clone(),
                });
            }
        };
        if !engine.grid().is_empty(cell) {
            return Err(PlayError::CellOccupied { board, cell });
        }

        self.in_flight = true;
        let attempt = engine
            .attempt_move(&self.authority, cell, Cell::Occupied(mark))
            .await;
        self.in_flight = false;
        let board_outcome = attempt.map_err(|e| PlayError::from_engine(e, board))?;

        let event = MoveEvent::new(board, cell, mark, !board_outcome.is_decided());
        let routing = self.state.apply_move(event)?;
        info!(%board, %cell, %mark, active = %routing.active_board, "Move applied");
        self.emit(MatchEvent::MoveApplied {
            board,
            cell,
            mark,
            routing,
        });

        let mut meta_pending = false;
        if let Some(value) = MetaCell::from_outcome(board_outcome) {
            self.emit(MatchEvent::BoardConcluded {
                board,
                outcome: board_outcome,
            });
            self.pending_meta = Some((board, value));
            if let Err(e) = self.flush_meta().await {
                warn!(error = %e, "Meta-board update failed; outcome kept pending");
                self.last_rejection = Some(e.to_string());
                meta_pending = true;
            }
        }

        Ok(PlayAccepted {
            mark,
            routing,
            board_outcome,
            match_result: self.state.result(),
            meta_pending,
        })
    }

    /// Forwards a pending board outcome to the meta-board.
    ///
    /// Returns the match result afterwards. A no-op when nothing is pending.
    #[instrument(skip(self))]
    pub async fn retry_meta_sync(&mut self) -> Result<Outcome, PlayError> {
        if self.in_flight {
            return Err(PlayError::MoveInFlight);
        }
        match self.flush_meta().await {
            Ok(()) => {
                self.last_rejection = None;
                Ok(self.state.result())
            }
            Err(e) => {
                warn!(error = %e, "Meta-board update still failing");
                self.last_rejection = Some(e.to_string());
                Err(e)
            }
        }
    }

    async fn flush_meta(&mut self) -> Result<(), PlayError> {
        let Some((board, value)) = self.pending_meta else {
            return Ok(());
        };
        let meta = match &mut self.meta {
            BoardSlot::Ready(meta) => meta,
            BoardSlot::Unavailable(reason) => {
                return Err(PlayError::MetaUnavailable(reason.clone()));
            }
        };

        self.in_flight = true;
        let attempt = meta.attempt_move(&self.authority, board, value).await;
        self.in_flight = false;
        let outcome = attempt.map_err(|e| PlayError::from_engine(e, board))?;

        self.pending_meta = None;
        self.state.record_meta_outcome(outcome)?;
        debug!(%board, meta = %outcome, "Meta-board updated");
        if outcome.is_decided() {
            info!(result = %outcome, "Match over");
            self.emit(MatchEvent::MatchOver(outcome));
        }
        Ok(())
    }

    /// Retries creating every unavailable board.
    ///
    /// Returns how many boards remain unavailable.
    #[instrument(skip(self))]
    pub async fn retry_unavailable(&mut self) -> usize {
        for slot in self.boards.iter_mut() {
            if !slot.is_ready() {
                *slot = BoardSlot::create(&self.authority).await;
            }
        }
        if !self.meta.is_ready() {
            self.meta = BoardSlot::create(&self.authority).await;
        }

        let remaining = self.boards.iter().filter(|s| !s.is_ready()).count()
            + usize::from(!self.meta.is_ready());
        info!(remaining, "Retried unavailable boards");
        remaining
    }

    /// Discards the match and starts over on fresh boards.
    ///
    /// Responses to abandoned requests are never applied; the old boards are
    /// simply dropped.
    #[instrument(skip(self))]
    pub async fn reset_match(&mut self) {
        let (boards, meta) = create_boards(&self.authority).await;
        self.state = MatchState::new();
        self.boards = boards;
        self.meta = meta;
        self.pending_meta = None;
        self.in_flight = false;
        self.last_rejection = None;
        info!("Match reset");
        self.emit(MatchEvent::Reset);
    }

    fn emit(&self, event: MatchEvent) {
        if let Some(tx) = &self.events
            && tx.send(event).is_err()
        {
            debug!("Event receiver dropped");
        }
    }
}

async fn create_boards<A: MoveAuthority + ?Sized>(
    authority: &A,
) -> ([BoardSlot<Cell>; 9], BoardSlot<MetaCell>) {
    let mut boards: [BoardSlot<Cell>; 9] =
        std::array::from_fn(|_| BoardSlot::Unavailable(String::new()));
    for slot in boards.iter_mut() {
        *slot = BoardSlot::create(authority).await;
    }
    let meta = BoardSlot::create(authority).await;
    (boards, meta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authority::InMemoryAuthority;

    #[tokio::test]
    async fn test_new_match_starts_with_x_anywhere() {
        let orch = MatchOrchestrator::new(InMemoryAuthority::new()).await;
        assert_eq!(orch.current_turn(), Mark::X);
        assert_eq!(orch.active_board(), ActiveBoard::Any);
        assert_eq!(orch.match_result(), Outcome::Undecided);
        assert!(Position::ALL.iter().all(|&b| orch.is_playable(b)));
        assert_eq!(orch.authority().store().len(), 10);
    }

    #[tokio::test]
    async fn test_occupied_cell_rejected_locally() {
        let mut orch = MatchOrchestrator::new(InMemoryAuthority::new()).await;
        orch.submit_cell_play(Position::Center, Position::Center)
            .await
            .unwrap();
        let err = orch
            .submit_cell_play(Position::Center, Position::Center)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            PlayError::CellOccupied {
                board: Position::Center,
                cell: Position::Center,
            }
        );
        assert_eq!(orch.current_turn(), Mark::O);
        assert_eq!(orch.last_rejection(), Some(err.to_string().as_str()));
    }

    #[tokio::test]
    async fn test_reset_discards_state() {
        let mut orch = MatchOrchestrator::new(InMemoryAuthority::new()).await;
        orch.submit_cell_play(Position::TopLeft, Position::Center)
            .await
            .unwrap();
        orch.reset_match().await;

        assert_eq!(orch.current_turn(), Mark::X);
        assert_eq!(orch.active_board(), ActiveBoard::Any);
        assert_eq!(
            orch.board_grid(Position::TopLeft).map(Grid::filled_count),
            Some(0)
        );
        assert_eq!(orch.authority().store().len(), 20);
    }
}
