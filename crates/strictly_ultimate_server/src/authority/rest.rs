//! Move authority reached over HTTP.

use super::{AuthorityError, BoardSnapshot, ErrorDetail, MoveAuthority, MoveRequest, WireMark};
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// REST client for a remote move authority.
#[derive(Debug, Clone)]
pub struct RestAuthority {
    base_url: String,
    client: reqwest::Client,
}

impl RestAuthority {
    /// Creates a client for the authority at `base_url`.
    ///
    /// A trailing `/` on the URL is ignored.
    #[instrument(skip_all, fields(base_url = %base_url.as_ref()))]
    pub fn new(base_url: impl AsRef<str>, timeout: Duration) -> Result<Self, AuthorityError> {
        let base_url = base_url.as_ref().trim_end_matches('/').to_string();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthorityError::Unreachable(format!("HTTP client setup failed: {}", e)))?;

        info!(base_url = %base_url, "Move authority client ready");
        Ok(Self { base_url, client })
    }
}

#[async_trait::async_trait]
impl MoveAuthority for RestAuthority {
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn create_board(&self) -> Result<BoardSnapshot, AuthorityError> {
        debug!("Creating board");

        let response = self
            .client
            .post(format!("{}/tictactoe/new", self.base_url))
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Create request failed");
                AuthorityError::CreateFailed(format!("Create failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Authority refused to create board");
            return Err(AuthorityError::CreateFailed(format!(
                "Create failed: {}",
                status.as_u16()
            )));
        }

        let snapshot: BoardSnapshot = response.json().await.map_err(|e| {
            error!(error = %e, "Invalid create response");
            AuthorityError::CreateFailed(format!("Invalid create response: {}", e))
        })?;

        info!(board_id = %snapshot.id, "Board created");
        Ok(snapshot)
    }

    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn submit_move(
        &self,
        id: &str,
        index: usize,
        player: WireMark,
    ) -> Result<BoardSnapshot, AuthorityError> {
        let request = MoveRequest::new(index as i64, player);
        debug!(?request, "Submitting move");

        let response = self
            .client
            .post(format!("{}/tictactoe/{}/move", self.base_url, id))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Move request failed");
                AuthorityError::Unreachable(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = serde_json::from_str::<ErrorDetail>(&body)
                .map(|d| d.detail)
                .unwrap_or_else(|_| format!("Move failed: {}", status.as_u16()));
            warn!(status = %status, reason = %reason, "Move rejected");
            return Err(AuthorityError::MoveRejected(reason));
        }

        let snapshot: BoardSnapshot = response.json().await.map_err(|e| {
            error!(error = %e, "Invalid move response");
            AuthorityError::Unreachable(format!("Invalid move response: {}", e))
        })?;

        debug!(status = %snapshot.status, "Move accepted");
        Ok(snapshot)
    }
}
