//! HTTP API module - REST endpoints for rolls, weapon state and history

mod dice;
mod history;
mod weapon;

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{FromRequest, Request, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::error;

use crate::combat::DiceError;
use crate::db::Database;
use crate::history::RollHistory;
use crate::store::{StoreError, WeaponStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub weapons: Arc<WeaponStore>,
    pub history: Arc<RollHistory>,
}

/// Errors returned by API handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Dice(#[from] DiceError),

    #[error("unknown {kind} mode: {value}")]
    UnknownMode { kind: &'static str, value: String },

    #[error("invalid request body: {0}")]
    InvalidBody(String),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

/// Error response
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            ApiError::Dice(_) | ApiError::UnknownMode { .. } | ApiError::InvalidBody(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Store(e) => {
                error!("Storage failure: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// JSON request body; an empty body reads as `T::default()`
///
/// Malformed bodies are reported through `ApiError` so every failure
/// carries the same `{ "error": ... }` shape.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::InvalidBody(e.body_text()))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(T::default()));
        }

        let Json(value) =
            Json::<T>::from_bytes(&bytes).map_err(|e| ApiError::InvalidBody(e.body_text()))?;
        Ok(Self(value))
    }
}

/// Build the API router
pub fn router(db: Arc<Database>, history_limit: usize) -> Router {
    let weapons = Arc::new(WeaponStore::new(db.pool().clone()));
    let history = Arc::new(RollHistory::new(history_limit));

    let state = AppState {
        db,
        weapons,
        history,
    };

    Router::new()
        .route("/health", get(health_check))
        .route("/", get(root))
        .merge(dice::router())
        .merge(weapon::router())
        .merge(history::router())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

/// Root endpoint
async fn root() -> impl IntoResponse {
    Json(RootResponse {
        name: "dnd-near",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct RootResponse {
    name: &'static str,
    version: &'static str,
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.db.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy",
                database: "ok",
            }),
        ),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "unhealthy",
                database: "error",
            }),
        ),
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    database: &'static str,
}
