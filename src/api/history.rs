//! History API

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};

use super::AppState;
use crate::history::HistoryEntry;

/// Build the history router
pub fn router() -> Router<AppState> {
    Router::new().route("/history", get(list_history).delete(clear_history))
}

/// GET /history
/// Most recent first
async fn list_history(State(state): State<AppState>) -> Json<Vec<HistoryEntry>> {
    Json(state.history.entries())
}

/// DELETE /history
async fn clear_history(State(state): State<AppState>) -> StatusCode {
    state.history.clear();
    StatusCode::NO_CONTENT
}
