//! 識別サービスのインターフェース

use async_trait::async_trait;

use super::{entity::User, error::AuthError};

/// 資格情報（メールアドレス + アクセストークン）をユーザーに解決する
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn authenticate(&self, email: &str, access_token: &str) -> Result<User, AuthError>;
}
