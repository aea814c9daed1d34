//! InMemory User Repository 実装
//!
//! ユーザーの保存先であると同時に、識別サービス（`IdentityProvider`）としても振る舞います。
//! ユーザーは起動時に JSON のシードファイルから読み込みます（登録機能は持ちません）。

use std::{collections::HashMap, path::Path};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::{
    domain::{
        AuthError, IdentityProvider, RepositoryError, User, UserId, UserRepository,
        ValueObjectError,
    },
    infrastructure::dto::user::UserRecord,
};

/// シードファイル読み込み時のエラー
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read user seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse user seed file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid user record: {0}")]
    InvalidRecord(#[from] ValueObjectError),
}

/// インメモリ User Repository 実装
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// ユーザーの一覧から作成
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let users = users
            .into_iter()
            .map(|user| (user.id.clone(), user))
            .collect();
        Self {
            users: Mutex::new(users),
        }
    }

    /// JSON 文字列（ユーザーレコードの配列）から作成
    pub fn from_json(json: &str) -> Result<Self, SeedError> {
        let records: Vec<UserRecord> = serde_json::from_str(json)?;
        let users = records
            .into_iter()
            .map(User::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::with_users(users))
    }

    /// JSON のシードファイルから作成
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let json = tokio::fs::read_to_string(path).await?;
        Self::from_json(&json)
    }

    pub async fn count(&self) -> usize {
        self.users.lock().await.len()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get_user(&self, id: &UserId) -> Result<User, RepositoryError> {
        self.users
            .lock()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| RepositoryError::UserNotFound(id.to_string()))
    }

    async fn save_users(&self, users: &[User]) -> Result<(), RepositoryError> {
        let mut store = self.users.lock().await;
        for user in users {
            store.insert(user.id.clone(), user.clone());
        }
        Ok(())
    }
}

#[async_trait]
impl IdentityProvider for InMemoryUserRepository {
    async fn authenticate(&self, email: &str, access_token: &str) -> Result<User, AuthError> {
        let users = self.users.lock().await;
        let user = users
            .values()
            .find(|user| user.email == email)
            .ok_or_else(|| AuthError::EmailNotFound(email.to_string()))?;

        if user.access_token != access_token {
            return Err(AuthError::InvalidToken(email.to_string()));
        }
        Ok(user.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Rating;

    const SEED: &str = r#"[
        {"id": "alice", "email": "alice@example.com", "access_token": "a-token", "rating": 1500},
        {"id": "bob", "email": "bob@example.com", "access_token": "b-token"}
    ]"#;

    #[tokio::test]
    async fn test_from_json_loads_users() {
        // テスト項目: シードからユーザーが読み込まれ、レーティング省略時は 1200
        // given (前提条件) / when (操作):
        let repository = InMemoryUserRepository::from_json(SEED).unwrap();

        // then (期待する結果):
        assert_eq!(repository.count().await, 2);
        let bob = repository
            .get_user(&UserId::new("bob".to_string()).unwrap())
            .await
            .unwrap();
        assert_eq!(bob.rating, Rating::new(1200));
    }

    #[test]
    fn test_from_json_rejects_malformed_seed() {
        assert!(matches!(
            InMemoryUserRepository::from_json("{not json"),
            Err(SeedError::Json(_))
        ));
        assert!(matches!(
            InMemoryUserRepository::from_json(r#"[{"id":"","email":"x","access_token":"y"}]"#),
            Err(SeedError::InvalidRecord(ValueObjectError::UserIdEmpty))
        ));
    }

    #[tokio::test]
    async fn test_authenticate() {
        // テスト項目: メールアドレスとアクセストークンでユーザーが解決される
        // given (前提条件):
        let repository = InMemoryUserRepository::from_json(SEED).unwrap();

        // when (操作):
        let ok = repository
            .authenticate("alice@example.com", "a-token")
            .await;
        let bad_token = repository.authenticate("alice@example.com", "nope").await;
        let unknown = repository.authenticate("carol@example.com", "x").await;

        // then (期待する結果):
        assert_eq!(ok.unwrap().id.as_str(), "alice");
        assert_eq!(
            bad_token,
            Err(AuthError::InvalidToken("alice@example.com".to_string()))
        );
        assert_eq!(
            unknown,
            Err(AuthError::EmailNotFound("carol@example.com".to_string()))
        );
    }

    #[tokio::test]
    async fn test_save_users_updates_ratings() {
        let repository = InMemoryUserRepository::from_json(SEED).unwrap();
        let alice_id = UserId::new("alice".to_string()).unwrap();
        let bob_id = UserId::new("bob".to_string()).unwrap();
        let mut alice = repository.get_user(&alice_id).await.unwrap();
        let mut bob = repository.get_user(&bob_id).await.unwrap();

        alice.rating = Rating::new(1523);
        bob.rating = Rating::new(1477);
        repository.save_users(&[alice, bob]).await.unwrap();

        assert_eq!(
            repository.get_user(&alice_id).await.unwrap().rating,
            Rating::new(1523)
        );
        assert_eq!(
            repository.get_user(&bob_id).await.unwrap().rating,
            Rating::new(1477)
        );
    }
}
