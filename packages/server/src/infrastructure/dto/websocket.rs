//! WebSocket message DTOs.
//!
//! Inbound frames are `{"type": ..., "payload": {...}}`. Game events sent to
//! clients use the same envelope; acknowledgements, board replies and errors
//! are sent as bare objects.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// First frame of every connection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AuthRequest {
    pub email: String,
    pub access_token: String,
}

/// Envelope of an inbound frame. The payload is validated per type.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InboundEnvelope {
    pub r#type: String,
    #[serde(default)]
    pub payload: Value,
}

/// Move notation dialect as written on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum NotationType {
    #[default]
    #[serde(rename = "algebraic")]
    Algebraic,
    #[serde(rename = "uci")]
    Uci,
    #[serde(rename = "long algebraic")]
    LongAlgebraic,
}

/// Payload of a `move` frame.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MovePayload {
    #[serde(default)]
    pub notation: Option<String>,
    #[serde(default)]
    pub notation_type: NotationType,
    pub game_id: u64,
    #[serde(default)]
    pub request_draw: bool,
    #[serde(default)]
    pub resign: bool,
}

/// Envelope of an outbound game event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundEnvelope<T> {
    pub r#type: &'static str,
    pub payload: T,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedPayload {
    pub success: bool,
    pub user_id: String,
    pub rating: i32,
}

/// Session record sent with `game_start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: u64,
    pub player_white: String,
    pub player_black: String,
    pub pgn: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveEvent {
    pub game_id: u64,
    pub notation: String,
    pub request_draw: bool,
    pub resign: bool,
    pub fen: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResultEvent {
    pub result: String,
    pub is_draw: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub winner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub loser: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub method: Option<String>,
    /// The recipient's own rating; absent when the rating update failed.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub new_rating: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveAck {
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameBoard {
    pub success: bool,
    pub r#type: String,
    pub fen: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: u16,
    pub error: String,
    pub message: String,
}

/// Structured error, shared with the HTTP endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

impl ErrorResponse {
    pub fn new(code: u16, error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                code,
                error: error.into(),
                message: message.into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_payload_defaults() {
        // テスト項目: 省略されたフィールドに既定値が入る
        // given (前提条件):
        let json = r#"{"notation":"e4","game_id":1}"#;

        // when (操作):
        let payload: MovePayload = serde_json::from_str(json).unwrap();

        // then (期待する結果):
        assert_eq!(payload.notation.as_deref(), Some("e4"));
        assert_eq!(payload.notation_type, NotationType::Algebraic);
        assert!(!payload.request_draw);
        assert!(!payload.resign);
    }

    #[test]
    fn test_move_payload_long_algebraic() {
        let json = r#"{"notation":"Ng1-f3","notation_type":"long algebraic","game_id":7}"#;
        let payload: MovePayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.notation_type, NotationType::LongAlgebraic);
        assert_eq!(payload.game_id, 7);
    }

    #[test]
    fn test_move_payload_rejects_unknown_dialect_and_missing_game_id() {
        // テスト項目: 未知の記譜法や game_id の欠落はパースエラーになる
        // given (前提条件):
        let unknown_dialect = r#"{"notation":"e4","notation_type":"figurine","game_id":1}"#;
        let missing_game_id = r#"{"notation":"e4"}"#;

        // when (操作) / then (期待する結果):
        assert!(serde_json::from_str::<MovePayload>(unknown_dialect).is_err());
        assert!(serde_json::from_str::<MovePayload>(missing_game_id).is_err());
    }

    #[test]
    fn test_game_result_omits_absent_fields() {
        // テスト項目: 引き分けの結果には winner / loser が含まれない
        // given (前提条件):
        let event = GameResultEvent {
            result: "1/2-1/2".to_string(),
            is_draw: true,
            winner: None,
            loser: None,
            method: Some("Stalemate".to_string()),
            new_rating: Some(1200),
        };

        // when (操作):
        let json = serde_json::to_value(&event).unwrap();

        // then (期待する結果):
        assert_eq!(
            json,
            serde_json::json!({
                "result": "1/2-1/2",
                "is_draw": true,
                "method": "Stalemate",
                "new_rating": 1200
            })
        );
    }

    #[test]
    fn test_error_response_shape() {
        let json = serde_json::to_value(ErrorResponse::new(59, "It is not your turn", "")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "success": false,
                "error": {"code": 59, "error": "It is not your turn", "message": ""}
            })
        );
    }
}
