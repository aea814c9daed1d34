//! UseCase: ユーザー切断処理
//!
//! 接続レジストリから接続状態を削除します。参加中の対局は未解決のまま残り、
//! 相手は指し手を待ち続けます（再接続で復元できる）。

use std::sync::Arc;

use crate::domain::{ConnectionId, ConnectionRegistry, UserId};

/// ユーザー切断のユースケース
pub struct DisconnectUserUseCase {
    registry: Arc<dyn ConnectionRegistry>,
}

impl DisconnectUserUseCase {
    pub fn new(registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// ユーザー切断を実行
    ///
    /// # Returns
    ///
    /// 接続状態を削除した場合は `true`。すでに新しい接続に置き換わっていた場合は `false`。
    pub async fn execute(&self, user_id: &UserId, connection_id: ConnectionId) -> bool {
        let removed = self.registry.unregister(user_id, connection_id).await;
        if removed {
            tracing::info!("User '{}' disconnected", user_id);
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::registry::{InMemoryConnectionRegistry, OutboundQueue};

    #[tokio::test]
    async fn test_disconnect_user_removes_connection() {
        // テスト項目: 切断で接続状態が削除され、送信キューが閉じられる
        // given (前提条件):
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let usecase = DisconnectUserUseCase::new(registry.clone());
        let alice = UserId::new("alice".to_string()).unwrap();
        let connection_id = ConnectionId::generate();
        let queue = Arc::new(OutboundQueue::new("alice", 10));
        registry
            .register(alice.clone(), connection_id, queue.clone())
            .await;

        // when (操作):
        let removed = usecase.execute(&alice, connection_id).await;

        // then (期待する結果):
        assert!(removed);
        assert!(!registry.is_connected(&alice).await);
        assert!(queue.is_closed());
    }

    #[tokio::test]
    async fn test_disconnect_of_replaced_connection_is_ignored() {
        // テスト項目: 置き換え済みの接続の切断は新しい接続に影響しない
        // given (前提条件):
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let usecase = DisconnectUserUseCase::new(registry.clone());
        let alice = UserId::new("alice".to_string()).unwrap();
        let old_connection = ConnectionId::generate();
        registry
            .register(
                alice.clone(),
                old_connection,
                Arc::new(OutboundQueue::new("alice", 10)),
            )
            .await;
        registry
            .register(
                alice.clone(),
                ConnectionId::generate(),
                Arc::new(OutboundQueue::new("alice", 10)),
            )
            .await;

        // when (操作):
        let removed = usecase.execute(&alice, old_connection).await;

        // then (期待する結果):
        assert!(!removed);
        assert!(registry.is_connected(&alice).await);
    }
}
