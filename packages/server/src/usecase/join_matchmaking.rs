//! UseCase: マッチメイキング参加処理
//!
//! 認証したユーザーを上限付きチャンネル経由でマッチメイカーに渡します。
//! チャンネルが満杯なら待たずに `JoinError::QueueFull` を返します。

use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};

use crate::domain::{IdentityProvider, UserId};

use super::error::JoinError;

/// マッチメイキング参加のユースケース
pub struct JoinMatchmakingUseCase {
    identity: Arc<dyn IdentityProvider>,
    /// マッチメイカーへの参加リクエスト送信側
    requests: mpsc::Sender<UserId>,
}

impl JoinMatchmakingUseCase {
    pub fn new(identity: Arc<dyn IdentityProvider>, requests: mpsc::Sender<UserId>) -> Self {
        Self { identity, requests }
    }

    /// 参加リクエストを実行
    ///
    /// # Returns
    ///
    /// * `Ok(UserId)` - キューに入ったユーザー
    /// * `Err(JoinError)` - 認証失敗、またはキューが満杯
    pub async fn execute(&self, email: &str, access_token: &str) -> Result<UserId, JoinError> {
        let user = self.identity.authenticate(email, access_token).await?;

        match self.requests.try_send(user.id.clone()) {
            Ok(()) => {
                tracing::info!("User '{}' joined matchmaking", user.id);
                Ok(user.id)
            }
            Err(TrySendError::Full(_)) => {
                tracing::warn!("Matchmaking queue is full, rejected '{}'", user.id);
                Err(JoinError::QueueFull)
            }
            Err(TrySendError::Closed(_)) => {
                tracing::error!("Matchmaker is not running, rejected '{}'", user.id);
                Err(JoinError::MatchmakerStopped)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{domain::AuthError, infrastructure::repository::InMemoryUserRepository};

    const SEED: &str = r#"[
        {"id": "alice", "email": "alice@example.com", "access_token": "a-token"},
        {"id": "bob", "email": "bob@example.com", "access_token": "b-token"}
    ]"#;

    fn identity() -> Arc<InMemoryUserRepository> {
        Arc::new(InMemoryUserRepository::from_json(SEED).unwrap())
    }

    #[tokio::test]
    async fn test_join_enqueues_user() {
        // テスト項目: 認証したユーザーがキューに入る
        // given (前提条件):
        let (tx, mut rx) = mpsc::channel(10);
        let usecase = JoinMatchmakingUseCase::new(identity(), tx);

        // when (操作):
        let result = usecase.execute("alice@example.com", "a-token").await;

        // then (期待する結果):
        let alice = UserId::new("alice".to_string()).unwrap();
        assert_eq!(result, Ok(alice.clone()));
        assert_eq!(rx.recv().await, Some(alice));
    }

    #[tokio::test]
    async fn test_join_rejects_bad_credentials() {
        let (tx, mut rx) = mpsc::channel(10);
        let usecase = JoinMatchmakingUseCase::new(identity(), tx);

        let result = usecase.execute("alice@example.com", "nope").await;

        assert_eq!(
            result,
            Err(JoinError::Unauthorized(AuthError::InvalidToken(
                "alice@example.com".to_string()
            )))
        );
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_join_when_queue_full() {
        // テスト項目: キューが満杯のときは待たずにエラーを返す
        // given (前提条件):
        let (tx, _rx) = mpsc::channel(1);
        let usecase = JoinMatchmakingUseCase::new(identity(), tx);
        usecase
            .execute("alice@example.com", "a-token")
            .await
            .unwrap();

        // when (操作):
        let result = usecase.execute("bob@example.com", "b-token").await;

        // then (期待する結果):
        assert_eq!(result, Err(JoinError::QueueFull));
    }

    #[tokio::test]
    async fn test_join_when_matchmaker_stopped() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let usecase = JoinMatchmakingUseCase::new(identity(), tx);

        let result = usecase.execute("alice@example.com", "a-token").await;

        assert_eq!(result, Err(JoinError::MatchmakerStopped));
    }
}
