//! ドメイン層のエラー定義

use thiserror::Error;

use super::value_object::SessionId;

/// 値オブジェクト生成時のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("user id must not be empty")]
    UserIdEmpty,

    #[error("user id must be at most {0} characters")]
    UserIdTooLong(usize),
}

/// 永続化ストアのエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Game does not exist with given ID: {0}")]
    SessionNotFound(SessionId),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("storage failure: {0}")]
    Storage(String),
}

/// ルールエンジンのエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RulesError {
    /// 記譜の解釈または指し手の適用に失敗した
    #[error("{0}")]
    IllegalMove(String),

    /// 保存済みの棋譜から局面を再構築できない
    #[error("corrupt game record: {0}")]
    CorruptHistory(String),
}

/// 認証エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Email not found: {0}")]
    EmailNotFound(String),

    #[error("Invalid access token for: {0}")]
    InvalidToken(String),
}

/// 接続レジストリのエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("user '{0}' has no live connection")]
    NotConnected(String),

    #[error("outbound queue for '{0}' is closed")]
    QueueClosed(String),
}
