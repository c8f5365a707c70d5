//! Ultimate tic-tac-toe over a remote move authority.
//!
//! # Architecture
//!
//! - **Authority**: the [`MoveAuthority`] capability with REST and in-process
//!   implementations, plus the axum server that hosts one
//! - **Engines**: [`MiniBoard`] and [`MetaBoard`] mirror authority boards and
//!   recompute their outcomes from every accepted snapshot
//! - **Orchestrator**: [`MatchOrchestrator`] owns turns, routing, and
//!   termination
//! - **Play**: a hot-seat terminal front end
//!
//! # Example
//!
//! ```
//! use strictly_ultimate::{ActiveBoard, Position};
//! use strictly_ultimate_server::{InMemoryAuthority, MatchOrchestrator};
//!
//! # async fn example() -> Result<(), strictly_ultimate_server::PlayError> {
//! let mut orch = MatchOrchestrator::new(InMemoryAuthority::new()).await;
//! let accepted = orch.submit_cell_play(Position::TopLeft, Position::Center).await?;
//! assert_eq!(accepted.routing.active_board, ActiveBoard::Board(Position::Center));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod authority;
mod config;
mod engine;
mod orchestrator;
mod store;

pub mod play;
pub mod server;

pub use authority::{
    AuthorityError, BoardId, BoardSnapshot, ErrorDetail, InMemoryAuthority, MoveAuthority,
    MoveRequest, RestAuthority, WireCell, WireMark,
};
pub use config::{AUTHORITY_URL_ENV, ConfigError, UltimateConfig};
pub use engine::{BoardEngine, EngineError, MetaBoard, MiniBoard};
pub use orchestrator::{BoardSlot, MatchEvent, MatchOrchestrator, PlayAccepted, PlayError};
pub use store::{BoardStore, StoreError};
