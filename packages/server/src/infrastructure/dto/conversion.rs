//! Conversion logic between DTOs and domain entities.

use kingside_shared::time::timestamp_to_rfc3339;

use crate::domain::{
    Notation, OutboundMessage, Rating, Session, User, UserId, ValueObjectError,
};
use crate::infrastructure::dto::{user::UserRecord, websocket as dto};

// ========================================
// DTO → Domain Entity
// ========================================

impl From<dto::NotationType> for Notation {
    fn from(dto: dto::NotationType) -> Self {
        match dto {
            dto::NotationType::Algebraic => Notation::Algebraic,
            dto::NotationType::Uci => Notation::Uci,
            dto::NotationType::LongAlgebraic => Notation::LongAlgebraic,
        }
    }
}

impl TryFrom<UserRecord> for User {
    type Error = ValueObjectError;

    fn try_from(dto: UserRecord) -> Result<Self, Self::Error> {
        Ok(Self::new(
            UserId::new(dto.id)?,
            dto.email,
            dto.access_token,
            dto.rating.map(Rating::new).unwrap_or_default(),
        ))
    }
}

// ========================================
// Domain Entity → DTO
// ========================================

impl From<&Session> for dto::SessionRecord {
    fn from(model: &Session) -> Self {
        Self {
            id: model.id.value(),
            player_white: model.white.to_string(),
            player_black: model.black.to_string(),
            pgn: model.pgn(),
            created_at: timestamp_to_rfc3339(model.created_at),
            updated_at: timestamp_to_rfc3339(model.updated_at),
        }
    }
}

/// Serializes an outbound message into the text of one WebSocket frame.
pub fn outbound_to_json(message: OutboundMessage) -> Result<String, serde_json::Error> {
    match message {
        OutboundMessage::Authenticated { user_id, rating } => {
            serde_json::to_string(&dto::OutboundEnvelope {
                r#type: "authenticated",
                payload: dto::AuthenticatedPayload {
                    success: true,
                    user_id: user_id.into_string(),
                    rating: rating.value(),
                },
            })
        }
        OutboundMessage::GameStart(session) => serde_json::to_string(&dto::OutboundEnvelope {
            r#type: "game_start",
            payload: dto::SessionRecord::from(&session),
        }),
        OutboundMessage::Move {
            session_id,
            notation,
            fen,
            request_draw,
            resign,
        } => serde_json::to_string(&dto::OutboundEnvelope {
            r#type: "move",
            payload: dto::MoveEvent {
                game_id: session_id.value(),
                notation,
                request_draw,
                resign,
                fen,
            },
        }),
        OutboundMessage::MoveAck => serde_json::to_string(&dto::MoveAck { success: true }),
        OutboundMessage::GameBoard { fen } => serde_json::to_string(&dto::GameBoard {
            success: true,
            r#type: "game_board".to_string(),
            fen,
        }),
        OutboundMessage::GameResult {
            outcome,
            winner,
            loser,
            new_rating,
        } => serde_json::to_string(&dto::OutboundEnvelope {
            r#type: "game_result",
            payload: dto::GameResultEvent {
                result: outcome.result.to_string(),
                is_draw: outcome.is_draw(),
                winner: winner.map(UserId::into_string),
                loser: loser.map(UserId::into_string),
                method: Some(outcome.method.to_string()),
                new_rating: new_rating.map(|r| r.value()),
            },
        }),
        OutboundMessage::Error {
            code,
            error,
            message,
        } => serde_json::to_string(&dto::ErrorResponse::new(code, error, message)),
    }
}
