//! UseCase: 現在局面の問い合わせ
//!
//! 接続ごとに記録している直近の局面（FEN）を送信者に返します。
//! 対局に参加していなければ初期局面を返します。

use std::sync::Arc;

use crate::domain::{Board, ConnectionRegistry, OutboundMessage, UserId};

/// 局面問い合わせのユースケース
pub struct QueryPositionUseCase {
    registry: Arc<dyn ConnectionRegistry>,
}

impl QueryPositionUseCase {
    pub fn new(registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// 局面問い合わせを実行
    ///
    /// 送信者が接続していなければ何もしない。
    pub async fn execute(&self, requester: &UserId) {
        if !self.registry.is_connected(requester).await {
            tracing::debug!("Position query from disconnected user '{}' ignored", requester);
            return;
        }

        let fen = self
            .registry
            .last_position(requester)
            .await
            .unwrap_or_else(Board::starting_fen);
        if let Err(e) = self
            .registry
            .push_to(requester, OutboundMessage::GameBoard { fen })
            .await
        {
            tracing::warn!("Failed to send position to '{}': {}", requester, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::ConnectionId,
        infrastructure::registry::{InMemoryConnectionRegistry, OutboundQueue},
    };

    fn alice() -> UserId {
        UserId::new("alice".to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_query_returns_last_position() {
        // テスト項目: 直近の局面が game_board として返る
        // given (前提条件):
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let queue = Arc::new(OutboundQueue::new("alice", 10));
        registry
            .register(alice(), ConnectionId::generate(), queue.clone())
            .await;
        registry.set_last_position(&alice(), "8/8/8/8/8/8/8/K6k w - - 0 1".to_string()).await;
        let usecase = QueryPositionUseCase::new(registry);

        // when (操作):
        usecase.execute(&alice()).await;

        // then (期待する結果):
        assert_eq!(
            queue.pop().await,
            Some(OutboundMessage::GameBoard {
                fen: "8/8/8/8/8/8/8/K6k w - - 0 1".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_query_without_game_returns_starting_position() {
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let queue = Arc::new(OutboundQueue::new("alice", 10));
        registry
            .register(alice(), ConnectionId::generate(), queue.clone())
            .await;
        let usecase = QueryPositionUseCase::new(registry);

        usecase.execute(&alice()).await;

        assert_eq!(
            queue.pop().await,
            Some(OutboundMessage::GameBoard {
                fen: Board::starting_fen()
            })
        );
    }

    #[tokio::test]
    async fn test_query_from_disconnected_user_is_noop() {
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let usecase = QueryPositionUseCase::new(registry.clone());

        usecase.execute(&alice()).await;

        assert_eq!(registry.count().await, 0);
    }
}
