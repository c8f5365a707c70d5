//! HTTP move authority.
//!
//! Routes:
//! - `POST /tictactoe/new` creates a board
//! - `GET /tictactoe/{id}` returns a board
//! - `POST /tictactoe/{id}/move` places a symbol
//!
//! Failures answer with `{"detail": "..."}`.

use crate::authority::{BoardSnapshot, ErrorDetail, MoveRequest};
use crate::store::{BoardStore, StoreError};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::{info, instrument};

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = match self {
            StoreError::NotFound => StatusCode::NOT_FOUND,
            StoreError::IndexOutOfRange | StoreError::GameOver | StoreError::CellOccupied => {
                StatusCode::BAD_REQUEST
            }
        };
        (status, Json(ErrorDetail::new(self.to_string()))).into_response()
    }
}

/// Builds the authority router over a store.
#[instrument(skip(store))]
pub fn router(store: BoardStore) -> Router {
    Router::new()
        .route("/tictactoe/new", post(create_board))
        .route("/tictactoe/{id}", get(get_board))
        .route("/tictactoe/{id}/move", post(make_move))
        .with_state(store)
}

#[instrument(skip(store))]
async fn create_board(State(store): State<BoardStore>) -> Json<BoardSnapshot> {
    Json(store.create())
}

#[instrument(skip(store))]
async fn get_board(
    State(store): State<BoardStore>,
    Path(id): Path<String>,
) -> Result<Json<BoardSnapshot>, StoreError> {
    store.get(&id).map(Json)
}

#[instrument(skip(store, req), fields(index = req.index, player = %req.player))]
async fn make_move(
    State(store): State<BoardStore>,
    Path(id): Path<String>,
    Json(req): Json<MoveRequest>,
) -> Result<Json<BoardSnapshot>, StoreError> {
    store.apply_move(&id, req.index, req.player).map(Json)
}

/// Serves the authority until the process exits.
#[instrument]
pub async fn serve(host: String, port: u16) -> anyhow::Result<()> {
    let app = router(BoardStore::new());
    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    info!("Move authority ready at http://{}:{}/", host, port);
    axum::serve(listener, app).await?;
    Ok(())
}
