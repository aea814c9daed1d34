//! インメモリの ConnectionRegistry 実装
//!
//! ## 責務
//!
//! - ユーザーごとの接続状態（接続 ID、送信キュー、参加中の対局、最後の局面）を管理
//! - クライアントへのメッセージ投入（push_to, broadcast）
//!
//! ## 設計ノート
//!
//! 送信キューの生成は UI 層（`src/ui/handler/websocket.rs`）で行われます。
//! この実装は生成されたキューの投入側を受け取り、メッセージ投入に使用します。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    Board, ConnectionId, ConnectionRegistry, Delivery, OutboundMessage, OutboundSender,
    RegistryError, ResumedGame, SessionId, UserId,
};

/// 1 ユーザー分の接続状態
struct ConnectionState {
    connection_id: ConnectionId,
    sender: Arc<dyn OutboundSender>,
    active_session: Option<SessionId>,
    last_position: String,
}

/// インメモリの接続レジストリ
#[derive(Default)]
pub struct InMemoryConnectionRegistry {
    /// Key: ユーザー ID, Value: 接続状態
    connections: Mutex<HashMap<UserId, ConnectionState>>,
}

impl InMemoryConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 接続中のユーザー数
    pub async fn count(&self) -> usize {
        self.connections.lock().await.len()
    }
}

#[async_trait]
impl ConnectionRegistry for InMemoryConnectionRegistry {
    async fn register_resuming(
        &self,
        user_id: UserId,
        connection_id: ConnectionId,
        sender: Arc<dyn OutboundSender>,
        resumed: Option<ResumedGame>,
    ) {
        let (active_session, last_position) = match resumed {
            Some(game) => (Some(game.session_id), game.fen),
            None => (None, Board::starting_fen()),
        };
        let state = ConnectionState {
            connection_id,
            sender,
            active_session,
            last_position,
        };

        let mut connections = self.connections.lock().await;
        if let Some(previous) = connections.insert(user_id.clone(), state) {
            previous.sender.close();
            tracing::info!(
                "User '{}' reconnected, replaced connection {} with {}",
                user_id,
                previous.connection_id,
                connection_id
            );
        } else {
            tracing::debug!(
                "User '{}' registered with connection {}",
                user_id,
                connection_id
            );
        }
    }

    async fn unregister(&self, user_id: &UserId, connection_id: ConnectionId) -> bool {
        let mut connections = self.connections.lock().await;
        match connections.get(user_id) {
            Some(state) if state.connection_id == connection_id => {
                if let Some(state) = connections.remove(user_id) {
                    state.sender.close();
                }
                tracing::debug!(
                    "User '{}' unregistered (connection {})",
                    user_id,
                    connection_id
                );
                true
            }
            Some(_) => {
                tracing::debug!(
                    "Connection {} of user '{}' was already replaced, keeping the newer one",
                    connection_id,
                    user_id
                );
                false
            }
            None => false,
        }
    }

    async fn is_connected(&self, user_id: &UserId) -> bool {
        self.connections.lock().await.contains_key(user_id)
    }

    async fn push_to(
        &self,
        user_id: &UserId,
        message: OutboundMessage,
    ) -> Result<Delivery, RegistryError> {
        let connections = self.connections.lock().await;

        let state = connections
            .get(user_id)
            .ok_or_else(|| RegistryError::NotConnected(user_id.to_string()))?;
        let kind = message.kind();
        let delivery = state.sender.send(message)?;
        tracing::debug!("Pushed '{}' to user '{}'", kind, user_id);
        Ok(delivery)
    }

    async fn broadcast(&self, targets: &[UserId], message: OutboundMessage) {
        let connections = self.connections.lock().await;

        for target in targets {
            if let Some(state) = connections.get(target) {
                // ブロードキャストでは一部の送信失敗を許容
                if let Err(e) = state.sender.send(message.clone()) {
                    tracing::warn!("Failed to push message to user '{}': {}", target, e);
                } else {
                    tracing::debug!("Broadcasted '{}' to user '{}'", message.kind(), target);
                }
            } else {
                tracing::warn!("User '{}' not connected during broadcast, skipping", target);
            }
        }
    }

    async fn active_session(&self, user_id: &UserId) -> Option<SessionId> {
        self.connections
            .lock()
            .await
            .get(user_id)
            .and_then(|state| state.active_session)
    }

    async fn set_active_session(&self, user_id: &UserId, session_id: Option<SessionId>) {
        if let Some(state) = self.connections.lock().await.get_mut(user_id) {
            state.active_session = session_id;
        }
    }

    async fn last_position(&self, user_id: &UserId) -> Option<String> {
        self.connections
            .lock()
            .await
            .get(user_id)
            .map(|state| state.last_position.clone())
    }

    async fn set_last_position(&self, user_id: &UserId, fen: String) {
        if let Some(state) = self.connections.lock().await.get_mut(user_id) {
            state.last_position = fen;
        }
    }
}
