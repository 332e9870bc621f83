//! HTTP JSON transport over the service operations.
//!
//! User identity arrives in the `x-user-id` header, installed by the
//! upstream auth proxy. Puzzle reads and leaderboards are public.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::error::EngineError;
use crate::service::{
    CreatePuzzleRequest, PuzzleService, StartAttemptRequest, SubmitRequest, UseHintRequest,
};

/// Header carrying the opaque authenticated user id.
const USER_HEADER: &str = "x-user-id";

/// Builds the API router.
pub fn router(service: Arc<PuzzleService>) -> Router {
    Router::new()
        .route("/puzzles", post(create_puzzle))
        .route("/puzzles/{date}/{slot}/{variant}", get(get_puzzle))
        .route("/leaderboard/{puzzle_id}", get(leaderboard))
        .route("/attempts", post(start_attempt))
        .route("/attempts/{id}/hint", post(use_hint))
        .route("/attempts/{id}/submit", post(submit_attempt))
        .route("/attempts/{id}/give-up", post(give_up))
        .with_state(service)
}

/// JSON error body carrying the engine error's status mapping.
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: format!("missing {USER_HEADER} header"),
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        let status = match &err {
            EngineError::NotFound(_) => StatusCode::NOT_FOUND,
            EngineError::Forbidden => StatusCode::FORBIDDEN,
            EngineError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            EngineError::LimitReached(_) => StatusCode::TOO_MANY_REQUESTS,
            EngineError::AlreadyUsed | EngineError::AlreadyCompleted | EngineError::Conflict(_) => {
                StatusCode::CONFLICT
            }
            EngineError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        debug!(status = %self.status, message = %self.message, "Request failed");
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Extracts the authenticated user id from the request headers.
fn user_id(headers: &HeaderMap) -> Result<String, ApiError> {
    headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
        .ok_or_else(ApiError::unauthorized)
}

async fn create_puzzle(
    State(service): State<Arc<PuzzleService>>,
    Json(req): Json<CreatePuzzleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let view = service.create_puzzle(req)?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn get_puzzle(
    State(service): State<Arc<PuzzleService>>,
    Path((date, slot, variant)): Path<(NaiveDate, i32, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let view = service.get_puzzle(date, slot, &variant)?;
    Ok(Json(view))
}

#[derive(Debug, Deserialize)]
struct LeaderboardParams {
    limit: Option<i64>,
}

async fn leaderboard(
    State(service): State<Arc<PuzzleService>>,
    Path(puzzle_id): Path<i32>,
    Query(params): Query<LeaderboardParams>,
) -> Result<impl IntoResponse, ApiError> {
    let entries = service.leaderboard(puzzle_id, params.limit)?;
    Ok(Json(entries))
}

async fn start_attempt(
    State(service): State<Arc<PuzzleService>>,
    headers: HeaderMap,
    Json(req): Json<StartAttemptRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = user_id(&headers)?;
    let view = service.start_attempt(&user, req)?;
    Ok(Json(view))
}

async fn use_hint(
    State(service): State<Arc<PuzzleService>>,
    headers: HeaderMap,
    Path(attempt_id): Path<i32>,
    Json(req): Json<UseHintRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = user_id(&headers)?;
    let receipt = service.use_hint(&user, attempt_id, req)?;
    Ok(Json(receipt))
}

async fn submit_attempt(
    State(service): State<Arc<PuzzleService>>,
    headers: HeaderMap,
    Path(attempt_id): Path<i32>,
    Json(req): Json<SubmitRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = user_id(&headers)?;
    let response = service.submit_attempt(&user, attempt_id, req)?;
    Ok(Json(response))
}

async fn give_up(
    State(service): State<Arc<PuzzleService>>,
    headers: HeaderMap,
    Path(attempt_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let user = user_id(&headers)?;
    let response = service.give_up(&user, attempt_id)?;
    Ok(Json(response))
}
