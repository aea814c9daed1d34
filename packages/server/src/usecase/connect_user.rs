//! UseCase: ユーザー接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectUserUseCase::execute() メソッド
//! - 認証、接続レジストリへの登録、参加中の対局の復元
//!
//! ### なぜこのテストが必要か
//! - 認証に失敗した接続が登録されないことを保証
//! - 再接続したユーザーが未終局の対局に戻れることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：認証成功と authenticated の送信
//! - 正常系：未終局の対局がある場合の復元
//! - 異常系：未登録のメールアドレス、誤ったアクセストークン

use std::sync::Arc;

use crate::domain::{
    Board, ConnectionId, ConnectionRegistry, IdentityProvider, OutboundMessage, OutboundSender,
    ResumedGame, SessionRepository, User,
};

use super::error::ConnectError;

/// ユーザー接続のユースケース
pub struct ConnectUserUseCase {
    /// 識別サービス
    identity: Arc<dyn IdentityProvider>,
    /// 対局の永続化ストア
    sessions: Arc<dyn SessionRepository>,
    /// 接続レジストリ
    registry: Arc<dyn ConnectionRegistry>,
}

impl ConnectUserUseCase {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        sessions: Arc<dyn SessionRepository>,
        registry: Arc<dyn ConnectionRegistry>,
    ) -> Self {
        Self {
            identity,
            sessions,
            registry,
        }
    }

    /// ユーザー接続を実行
    ///
    /// # Arguments
    ///
    /// * `email` / `access_token` - ハンドシェイクで受け取った資格情報
    /// * `connection_id` - この接続の識別子
    /// * `sender` - この接続の送信キュー
    ///
    /// # Returns
    ///
    /// * `Ok(User)` - 認証済みのユーザー
    /// * `Err(ConnectError)` - 認証失敗（レジストリには登録されない）
    pub async fn execute(
        &self,
        email: &str,
        access_token: &str,
        connection_id: ConnectionId,
        sender: Arc<dyn OutboundSender>,
    ) -> Result<User, ConnectError> {
        // 1. 認証
        let user = self.identity.authenticate(email, access_token).await?;

        // 2. 未終局の対局を探す（登録前に済ませ、マッチメイカーから空きに見えないようにする）
        let resumed = self.find_resumed_game(&user).await;

        // 3. 接続レジストリに登録（既存の接続は置き換え）
        self.registry
            .register_resuming(user.id.clone(), connection_id, sender, resumed)
            .await;

        // 4. 認証成功を通知
        if let Err(e) = self
            .registry
            .push_to(
                &user.id,
                OutboundMessage::Authenticated {
                    user_id: user.id.clone(),
                    rating: user.rating,
                },
            )
            .await
        {
            tracing::warn!("Failed to acknowledge authentication of '{}': {}", user.id, e);
        }

        Ok(user)
    }

    async fn find_resumed_game(&self, user: &User) -> Option<ResumedGame> {
        let session = match self.sessions.find_active_session(&user.id).await {
            Ok(Some(session)) => session,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Failed to look up active session of '{}': {}", user.id, e);
                return None;
            }
        };

        let fen = match Board::replay(&session.moves) {
            Ok(board) => board.fen(),
            Err(e) => {
                tracing::warn!(
                    "Position of game {} could not be rebuilt for '{}': {}",
                    session.id,
                    user.id,
                    e
                );
                Board::starting_fen()
            }
        };
        tracing::info!("User '{}' rejoined game {}", user.id, session.id);
        Some(ResumedGame {
            session_id: session.id,
            fen,
        })
    }
}
