//! Repository trait 定義
//!
//! ドメイン層が必要とする永続化ストアのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{
    entity::{Session, User},
    error::RepositoryError,
    value_object::{SessionId, UserId},
};

/// 対局の永続化ストア
///
/// UseCase 層はこの trait に依存し、Infrastructure 層の具体的な実装には依存しない。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// 新しい対局を作成し、採番された ID を持つ対局を返す
    async fn create_session(
        &self,
        white: UserId,
        black: UserId,
        created_at: i64,
    ) -> Result<Session, RepositoryError>;

    /// 対局を取得
    async fn get_session(&self, id: SessionId) -> Result<Session, RepositoryError>;

    /// 対局を保存（上書き）
    async fn save_session(&self, session: &Session) -> Result<(), RepositoryError>;

    /// ユーザーが参加している未終局の対局を探す
    async fn find_active_session(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Session>, RepositoryError>;

    /// `since`（Unix ミリ秒）以降に作成された、ユーザーが参加した対局の数
    async fn count_recent_sessions(
        &self,
        user_id: &UserId,
        since: i64,
    ) -> Result<usize, RepositoryError>;
}

/// ユーザーの永続化ストア
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_user(&self, id: &UserId) -> Result<User, RepositoryError>;

    /// 複数のユーザーをまとめて保存（全員分が保存されるか、誰も保存されないか）
    async fn save_users(&self, users: &[User]) -> Result<(), RepositoryError>;
}
