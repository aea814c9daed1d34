//! HTTP API DTOs.

use serde::{Deserialize, Serialize};

/// Query string of `POST /matchmaking`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JoinQuery {
    pub email: String,
}

/// Response of `POST /matchmaking`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinResponse {
    pub success: bool,
}

/// Response of `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}
