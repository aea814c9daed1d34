//! UseCase: マッチメイカー
//!
//! 参加リクエストを 2 件ずつ取り出し、対局可能な 2 人を組み合わせる単一のワーカーです。
//! チェックは以下の固定順で行います。
//!
//! 1. `a == b` → `a` を末尾に戻す
//! 2. どちらも未接続 → 両方破棄
//! 3. `a` が未接続または対局中 → `b` だけ戻す
//! 4. `b` が未接続または対局中 → `a` だけ戻す
//! 5. それ以外 → 対局を作成（`a` が白、`b` が黒）
//!
//! 1 回の組み合わせ処理で panic が起きてもログに残して次に進みます。

use std::{collections::VecDeque, panic::AssertUnwindSafe, sync::Arc};

use futures_util::FutureExt;
use kingside_shared::time::Clock;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::domain::{
    Board, ConnectionRegistry, OutboundMessage, SessionId, SessionRepository, UserId,
};

/// 参加リクエストチャンネルの既定容量
pub const DEFAULT_MATCHMAKING_CAPACITY: usize = 100;

/// 参加リクエストチャンネルを作成
pub fn matchmaking_channel(capacity: usize) -> (mpsc::Sender<UserId>, mpsc::Receiver<UserId>) {
    mpsc::channel(capacity.max(1))
}

/// 1 回の組み合わせ処理の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pairing {
    /// 同じユーザー同士だった（`a` を戻した）
    SelfPair(UserId),
    /// どちらも未接続だった（両方破棄）
    BothUnavailable,
    /// 片方が対局できなかった（もう片方を戻した）
    Requeued(UserId),
    /// 対局を作成した
    Created(SessionId),
    /// ストアへの作成に失敗した（両方を戻した）
    StoreFailed,
    /// 処理中に panic した（両方破棄）
    Panicked,
}

/// マッチメイカー
pub struct Matchmaker {
    requests: mpsc::Receiver<UserId>,
    /// まだ組み合わせていないリクエスト（FIFO）
    backlog: VecDeque<UserId>,
    pairer: Pairer,
}

/// 2 人の組み合わせ処理（ストアとレジストリへの参照だけを持つ）
struct Pairer {
    sessions: Arc<dyn SessionRepository>,
    registry: Arc<dyn ConnectionRegistry>,
    clock: Arc<dyn Clock>,
}

impl Matchmaker {
    pub fn new(
        requests: mpsc::Receiver<UserId>,
        sessions: Arc<dyn SessionRepository>,
        registry: Arc<dyn ConnectionRegistry>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            requests,
            backlog: VecDeque::new(),
            pairer: Pairer {
                sessions,
                registry,
                clock,
            },
        }
    }

    /// ワーカーを起動
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// チャンネルが閉じられるまで組み合わせを続ける
    pub async fn run(mut self) {
        tracing::info!("Matchmaker started");
        while let Some(pairing) = self.run_once().await {
            tracing::debug!("Matchmaker pairing result: {:?}", pairing);
        }
        tracing::info!("Matchmaker stopped: request channel closed");
    }

    /// 2 件そろうまで待ち、1 回だけ組み合わせ処理を行う
    ///
    /// チャンネルが閉じられて 2 件そろわない場合は `None`。
    pub async fn run_once(&mut self) -> Option<Pairing> {
        self.fill().await?;
        let a = self.backlog.pop_front()?;
        let b = self.backlog.pop_front()?;

        let pairing = match AssertUnwindSafe(self.pairer.pair(a.clone(), b.clone()))
            .catch_unwind()
            .await
        {
            Ok(pairing) => pairing,
            Err(panic_payload) => {
                let info = if let Some(s) = panic_payload.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_payload.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "unknown panic".to_string()
                };
                tracing::error!("Matchmaker panicked while pairing '{}' and '{}': {}", a, b, info);
                Pairing::Panicked
            }
        };

        match &pairing {
            Pairing::SelfPair(user) | Pairing::Requeued(user) => {
                self.backlog.push_back(user.clone());
            }
            Pairing::StoreFailed => {
                self.backlog.push_back(a);
                self.backlog.push_back(b);
            }
            Pairing::BothUnavailable | Pairing::Created(_) | Pairing::Panicked => {}
        }
        Some(pairing)
    }

    /// 組み合わせ待ちのリクエスト（先頭から順に）
    pub fn backlog(&self) -> Vec<UserId> {
        self.backlog.iter().cloned().collect()
    }

    /// チャンネルに届いているリクエストを取り込み、2 件以上になるまで待つ
    async fn fill(&mut self) -> Option<()> {
        while let Ok(user) = self.requests.try_recv() {
            self.backlog.push_back(user);
        }
        while self.backlog.len() < 2 {
            let user = self.requests.recv().await?;
            self.backlog.push_back(user);
        }
        Some(())
    }
}

impl Pairer {
    async fn pair(&self, a: UserId, b: UserId) -> Pairing {
        if a == b {
            tracing::debug!("User '{}' paired with itself, requeued", a);
            return Pairing::SelfPair(a);
        }

        let a_connected = self.registry.is_connected(&a).await;
        let b_connected = self.registry.is_connected(&b).await;
        if !a_connected && !b_connected {
            tracing::debug!("Neither '{}' nor '{}' is connected, dropped", a, b);
            return Pairing::BothUnavailable;
        }

        if !a_connected || self.registry.active_session(&a).await.is_some() {
            tracing::debug!("User '{}' is unavailable, requeued '{}'", a, b);
            return Pairing::Requeued(b);
        }
        if !b_connected || self.registry.active_session(&b).await.is_some() {
            tracing::debug!("User '{}' is unavailable, requeued '{}'", b, a);
            return Pairing::Requeued(a);
        }

        let session = match self
            .sessions
            .create_session(a.clone(), b.clone(), self.clock.now_millis())
            .await
        {
            Ok(session) => session,
            Err(e) => {
                tracing::error!("Failed to create game for '{}' and '{}': {}", a, b, e);
                return Pairing::StoreFailed;
            }
        };

        let players = [a, b];
        let start_fen = Board::starting_fen();
        for player in &players {
            self.registry
                .set_active_session(player, Some(session.id))
                .await;
            self.registry
                .set_last_position(player, start_fen.clone())
                .await;
        }
        self.registry
            .broadcast(&players, OutboundMessage::GameStart(session.clone()))
            .await;

        tracing::info!(
            "Game {} started: '{}' (white) vs '{}' (black)",
            session.id,
            session.white,
            session.black
        );
        Pairing::Created(session.id)
    }
}
