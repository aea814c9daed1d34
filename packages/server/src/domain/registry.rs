//! 接続レジストリのインターフェース
//!
//! ユーザー ID → 接続状態（送信キュー、参加中の対局、最後に把握している局面）の
//! プロセス全体のマップです。
//!
//! ## 設計ノート
//!
//! 送信キューの生成は UI 層（WebSocket ハンドラ）で行われ、`register` で渡されます。
//! レジストリはキューへの投入（`push_to`, `broadcast`）だけを行い、
//! キューからの取り出しと書き込みは UI 層の送信ループが担当します。

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use uuid::Uuid;

use super::{
    entity::{Outcome, Session},
    error::RegistryError,
    value_object::{Rating, SessionId, UserId},
};

/// 1 本の WebSocket 接続の識別子
///
/// 同じユーザーが再接続したとき、古い接続の後始末が新しい接続を消さないために使う。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 再接続時に引き継ぐ未終局の対局
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumedGame {
    pub session_id: SessionId,
    /// 履歴から再構築した局面（FEN）
    pub fen: String,
}

/// クライアントへ送るメッセージ
///
/// JSON への変換は Infrastructure 層の DTO が行う。
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundMessage {
    /// 認証成功
    Authenticated { user_id: UserId, rating: Rating },
    /// 対局開始
    GameStart(Session),
    /// 適用された指し手（正規化 SAN と適用後の FEN）
    Move {
        session_id: SessionId,
        notation: String,
        fen: String,
        request_draw: bool,
        resign: bool,
    },
    /// 指し手の受理
    MoveAck,
    /// 現在の局面
    GameBoard { fen: String },
    /// 終局（`new_rating` は受信者自身のレーティング）
    GameResult {
        outcome: Outcome,
        winner: Option<UserId>,
        loser: Option<UserId>,
        new_rating: Option<Rating>,
    },
    /// エラー
    Error {
        code: u16,
        error: String,
        message: String,
    },
}

impl OutboundMessage {
    /// 対局の進行に欠かせないメッセージか
    ///
    /// 送信キューが満杯でも、これらは破棄されない。
    pub fn is_game_critical(&self) -> bool {
        matches!(
            self,
            OutboundMessage::GameStart(_)
                | OutboundMessage::Move { .. }
                | OutboundMessage::GameResult { .. }
        )
    }

    /// ログ出力用の種別名
    pub fn kind(&self) -> &'static str {
        match self {
            OutboundMessage::Authenticated { .. } => "authenticated",
            OutboundMessage::GameStart(_) => "game_start",
            OutboundMessage::Move { .. } => "move",
            OutboundMessage::MoveAck => "move_ack",
            OutboundMessage::GameBoard { .. } => "game_board",
            OutboundMessage::GameResult { .. } => "game_result",
            OutboundMessage::Error { .. } => "error",
        }
    }
}

/// 送信キューへの投入結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// 通常どおりキューに入った
    Queued,
    /// 最も古いベストエフォートのメッセージを押し出して入った
    EvictedOldest,
    /// 押し出せるメッセージがなく、上限を超えて入った
    OverBound,
    /// キューが満杯のため破棄された（ベストエフォートのみ）
    Dropped,
}

/// 接続ごとの送信キューの投入側
///
/// 投入は決してブロックしない。
pub trait OutboundSender: Send + Sync {
    fn send(&self, message: OutboundMessage) -> Result<Delivery, RegistryError>;

    /// キューを閉じる（以降の `send` はエラー、送信ループは残りを流して終了する）
    fn close(&self);
}

/// 接続レジストリ
///
/// 内部で同期されるため、呼び出し側がロックを調整する必要はない。
#[async_trait]
pub trait ConnectionRegistry: Send + Sync {
    /// 接続を登録する（既存の登録は丸ごと置き換え、古いキューは閉じる）
    async fn register(
        &self,
        user_id: UserId,
        connection_id: ConnectionId,
        sender: Arc<dyn OutboundSender>,
    ) {
        self.register_resuming(user_id, connection_id, sender, None).await
    }

    /// 参加中の対局と局面を設定した状態で接続を登録する
    ///
    /// エントリは設定済みの状態で見えるようになるため、マッチメイカーが
    /// 対局中のユーザーを「空き」と誤認することはない。
    async fn register_resuming(
        &self,
        user_id: UserId,
        connection_id: ConnectionId,
        sender: Arc<dyn OutboundSender>,
        resumed: Option<ResumedGame>,
    );

    /// 登録を削除する（`connection_id` が一致する場合のみ）
    ///
    /// 削除した場合は `true` を返す。
    async fn unregister(&self, user_id: &UserId, connection_id: ConnectionId) -> bool;

    async fn is_connected(&self, user_id: &UserId) -> bool;

    /// 特定のユーザーにメッセージを送る
    async fn push_to(
        &self,
        user_id: &UserId,
        message: OutboundMessage,
    ) -> Result<Delivery, RegistryError>;

    /// 複数のユーザーにメッセージを送る（未接続のユーザーは読み飛ばす）
    async fn broadcast(&self, targets: &[UserId], message: OutboundMessage);

    /// 参加中の対局
    async fn active_session(&self, user_id: &UserId) -> Option<SessionId>;

    /// 参加中の対局を設定する（未接続なら何もしない）
    async fn set_active_session(&self, user_id: &UserId, session_id: Option<SessionId>);

    /// 最後に把握している局面（FEN）
    async fn last_position(&self, user_id: &UserId) -> Option<String>;

    async fn set_last_position(&self, user_id: &UserId, fen: String);
}
