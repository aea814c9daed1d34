//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
};

use crate::{
    infrastructure::dto::{
        http::{HealthResponse, JoinQuery, JoinResponse},
        websocket::ErrorResponse,
    },
    ui::state::AppState,
    usecase::{JoinError, WireError},
};

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Join the matchmaking queue
///
/// The access token is read from the `Authorization` header.
pub async fn join_matchmaking(
    State(state): State<Arc<AppState>>,
    Query(query): Query<JoinQuery>,
    headers: HeaderMap,
) -> Response {
    let access_token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    match state
        .join_matchmaking_usecase
        .execute(&query.email, access_token)
        .await
    {
        Ok(_) => (StatusCode::OK, Json(JoinResponse { success: true })).into_response(),
        Err(e) => {
            let status = match e {
                JoinError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
                JoinError::QueueFull | JoinError::MatchmakerStopped => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
            };
            tracing::warn!("Join request from '{}' rejected: {}", query.email, e);
            let body = ErrorResponse::new(e.code(), e.short(), e.to_string());
            (status, Json(body)).into_response()
        }
    }
}
