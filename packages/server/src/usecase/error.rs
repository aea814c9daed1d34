//! UseCase 層のエラー定義
//!
//! クライアントに返すエラーは `WireError` を実装し、
//! 安定した数値コードと短いメッセージを持つ。

use thiserror::Error;

use crate::domain::{AuthError, OutboundMessage, RepositoryError, SessionId};

/// クライアントに構造化エラーとして返せるエラー
pub trait WireError: std::fmt::Display {
    /// 安定した数値コード
    fn code(&self) -> u16;

    /// 短いメッセージ
    fn short(&self) -> &'static str;

    /// 送信キューに積むメッセージ
    fn to_outbound(&self) -> OutboundMessage {
        OutboundMessage::Error {
            code: self.code(),
            error: self.short().to_string(),
            message: self.to_string(),
        }
    }
}

impl WireError for AuthError {
    fn code(&self) -> u16 {
        match self {
            AuthError::EmailNotFound(_) => 13,
            AuthError::InvalidToken(_) => 14,
        }
    }

    fn short(&self) -> &'static str {
        match self {
            AuthError::EmailNotFound(_) => "Email not found.",
            AuthError::InvalidToken(_) => "Invalid access token",
        }
    }
}

/// 受信フレームの形式エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("{0}")]
    InvalidJson(String),

    #[error("Unknown message type: {0}")]
    UnknownType(String),
}

impl WireError for RequestError {
    fn code(&self) -> u16 {
        1
    }

    fn short(&self) -> &'static str {
        "Invalid JSON request"
    }
}

/// 接続時のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error("{0}")]
    Unauthorized(#[from] AuthError),

    #[error("Authentication request improperly formatted: {0}")]
    MalformedHandshake(String),
}

impl WireError for ConnectError {
    fn code(&self) -> u16 {
        match self {
            ConnectError::Unauthorized(e) => e.code(),
            ConnectError::MalformedHandshake(_) => 1,
        }
    }

    fn short(&self) -> &'static str {
        match self {
            ConnectError::Unauthorized(e) => e.short(),
            ConnectError::MalformedHandshake(_) => "Invalid JSON request",
        }
    }
}

/// マッチメイキング参加時のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinError {
    #[error("{0}")]
    Unauthorized(#[from] AuthError),

    #[error("Matchmaking queue is full")]
    QueueFull,

    #[error("Matchmaker is not running")]
    MatchmakerStopped,
}

impl WireError for JoinError {
    fn code(&self) -> u16 {
        match self {
            JoinError::Unauthorized(e) => e.code(),
            JoinError::QueueFull | JoinError::MatchmakerStopped => 28,
        }
    }

    fn short(&self) -> &'static str {
        match self {
            JoinError::Unauthorized(e) => e.short(),
            JoinError::QueueFull => "Matchmaking is at capacity",
            JoinError::MatchmakerStopped => "Internal server error",
        }
    }
}

/// 指し手送信時のエラー
///
/// 送信者にだけ返され、相手には通知されない。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("{0}")]
    Malformed(String),

    #[error("Game does not exist with given ID: {0}")]
    SessionNotFound(SessionId),

    #[error("Game does not belong to you")]
    NotAParticipant,

    #[error("Game {0} is already over")]
    GameAlreadyOver(SessionId),

    #[error("It is not your turn")]
    OutOfTurn,

    #[error("{0}")]
    IllegalMove(String),

    #[error("Error parsing game data: {0}")]
    CorruptHistory(String),

    #[error("{0}")]
    PersistenceFailure(String),
}

impl WireError for MoveError {
    fn code(&self) -> u16 {
        match self {
            MoveError::Malformed(_) => 62,
            MoveError::SessionNotFound(_) => 61,
            MoveError::NotAParticipant => 60,
            MoveError::OutOfTurn => 59,
            MoveError::IllegalMove(_) => 58,
            MoveError::GameAlreadyOver(_) => 57,
            MoveError::CorruptHistory(_) => 28,
            MoveError::PersistenceFailure(_) => 31,
        }
    }

    fn short(&self) -> &'static str {
        match self {
            MoveError::Malformed(_) => "Move request improperly formatted.",
            MoveError::SessionNotFound(_) => "Game does not exist with given ID.",
            MoveError::NotAParticipant => "Game does not belong to you",
            MoveError::OutOfTurn => "It is not your turn",
            MoveError::IllegalMove(_) => "Illegal move",
            MoveError::GameAlreadyOver(_) => "Game is already over",
            MoveError::CorruptHistory(_) => "Internal server error",
            MoveError::PersistenceFailure(_) => "Error saving to database",
        }
    }
}

/// レーティング更新時のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RatingError {
    #[error("failed to update ratings: {0}")]
    Repository(#[from] RepositoryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_error_codes_are_stable() {
        // テスト項目: エラー種別ごとのコードが固定されている
        // given (前提条件) / when (操作) / then (期待する結果):
        assert_eq!(MoveError::Malformed(String::new()).code(), 62);
        assert_eq!(MoveError::SessionNotFound(SessionId::new(1)).code(), 61);
        assert_eq!(MoveError::NotAParticipant.code(), 60);
        assert_eq!(MoveError::OutOfTurn.code(), 59);
        assert_eq!(MoveError::IllegalMove(String::new()).code(), 58);
        assert_eq!(MoveError::GameAlreadyOver(SessionId::new(1)).code(), 57);
        assert_eq!(MoveError::CorruptHistory(String::new()).code(), 28);
        assert_eq!(MoveError::PersistenceFailure(String::new()).code(), 31);
    }

    #[test]
    fn test_to_outbound_carries_code_short_and_detail() {
        // テスト項目: 構造化エラーにコード・短いメッセージ・詳細が入る
        // given (前提条件):
        let error = MoveError::SessionNotFound(SessionId::new(9));

        // when (操作):
        let message = error.to_outbound();

        // then (期待する結果):
        assert_eq!(
            message,
            OutboundMessage::Error {
                code: 61,
                error: "Game does not exist with given ID.".to_string(),
                message: "Game does not exist with given ID: 9".to_string(),
            }
        );
    }

    #[test]
    fn test_auth_error_codes() {
        let unknown = ConnectError::from(AuthError::EmailNotFound("a@b".to_string()));
        let bad_token = JoinError::from(AuthError::InvalidToken("a@b".to_string()));
        assert_eq!(unknown.code(), 13);
        assert_eq!(unknown.to_string(), "Email not found: a@b");
        assert_eq!(bad_token.code(), 14);
    }
}
