//! In-process move authority.

use super::{AuthorityError, BoardSnapshot, MoveAuthority, WireMark};
use crate::store::BoardStore;
use tracing::instrument;

/// Move authority backed by a local [`BoardStore`].
///
/// Validates exactly like the HTTP server, without the network hop. Used for
/// standalone play and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuthority {
    store: BoardStore,
}

impl InMemoryAuthority {
    /// Creates an authority with an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an authority over an existing store.
    pub fn with_store(store: BoardStore) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &BoardStore {
        &self.store
    }
}

#[async_trait::async_trait]
impl MoveAuthority for InMemoryAuthority {
    #[instrument(skip(self))]
    async fn create_board(&self) -> Result<BoardSnapshot, AuthorityError> {
        Ok(self.store.create())
    }

    #[instrument(skip(self))]
    async fn submit_move(
        &self,
        id: &str,
        index: usize,
        player: WireMark,
    ) -> Result<BoardSnapshot, AuthorityError> {
        let index = i64::try_from(index)
            .map_err(|_| AuthorityError::MoveRejected("Index out of range (0-8)".to_string()))?;
        self.store
            .apply_move(id, index, player)
            .map_err(|e| AuthorityError::MoveRejected(e.to_string()))
    }
}
