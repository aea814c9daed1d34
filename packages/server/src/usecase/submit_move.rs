//! UseCase: 指し手送信処理
//!
//! 状態遷移: `手番待ち(白)` → `手番待ち(黒)` → … → `終局(結果)`
//!
//! 対局ごとに非同期 Mutex を持つキャッシュで処理を直列化します。
//! 取得から配信までロックを保持するため、同時に送られた 2 つ目の指し手は
//! 更新後の局面を見て `OutOfTurn` になります。
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SubmitMoveUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - 手番の交互性、不正な指し手の拒否、終局時の結果配信とレーティング更新を保証
//! - エラーは送信者にだけ返り、相手には届かないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：指し手の受理と配信、各記譜法、チェックメイト、投了
//! - 異常系：手番違い、参加者以外、存在しない対局、不正な指し手、終局後の指し手、保存失敗
//! - エッジケース：未接続の送信者、同時送信

use std::{collections::HashMap, sync::Arc};

use kingside_shared::time::Clock;
use tokio::sync::Mutex;

use crate::domain::{
    Board, ConnectionRegistry, Notation, OutboundMessage, Outcome, PieceColor, RepositoryError,
    Session, SessionId, SessionRepository, UserId,
};

use super::{error::MoveError, update_rating::UpdateRatingUseCase};

/// 指し手送信の入力
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRequest {
    pub session_id: SessionId,
    /// 投了のときは不要
    pub notation: Option<String>,
    pub dialect: Notation,
    pub request_draw: bool,
    pub resign: bool,
}

/// 指し手送信の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// 送信者が接続していなかったため無視した
    Ignored,
    /// 指し手を適用した（終局した場合は `outcome` を持つ）
    Applied {
        san: String,
        fen: String,
        outcome: Option<Outcome>,
    },
    /// 投了で終局した
    Resigned(Outcome),
}

/// メモリ上の対局（記録と権威ある局面）
struct LiveSession {
    session: Session,
    board: Board,
}

type SessionSlot = Arc<Mutex<Option<LiveSession>>>;

/// 指し手送信のユースケース
pub struct SubmitMoveUseCase {
    sessions: Arc<dyn SessionRepository>,
    registry: Arc<dyn ConnectionRegistry>,
    rating: Arc<UpdateRatingUseCase>,
    clock: Arc<dyn Clock>,
    /// 対局 ID → 対局ごとのロック付きキャッシュ
    cache: Mutex<HashMap<SessionId, SessionSlot>>,
}

impl SubmitMoveUseCase {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        registry: Arc<dyn ConnectionRegistry>,
        rating: Arc<UpdateRatingUseCase>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            sessions,
            registry,
            rating,
            clock,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// 指し手送信を実行
    ///
    /// エラーは送信者にだけ返すこと（相手には通知しない）。
    pub async fn execute(
        &self,
        requester: &UserId,
        request: MoveRequest,
    ) -> Result<MoveOutcome, MoveError> {
        // 1. 送信者の接続状態
        if !self.registry.is_connected(requester).await {
            tracing::debug!("Move from disconnected user '{}' ignored", requester);
            return Ok(MoveOutcome::Ignored);
        }

        let id = request.session_id;
        if request.request_draw {
            tracing::info!("User '{}' offered a draw in game {}", requester, id);
        }

        // 2-3. 対局の取得と局面の再構築（配信が終わるまでロックを保持）
        let slot = self.slot(id).await;
        let mut guard = slot.lock().await;
        let loaded_now = guard.is_none();
        if loaded_now {
            match self.load(id).await {
                Ok(live) => *guard = Some(live),
                Err(e) => {
                    drop(guard);
                    self.evict_if_empty(id).await;
                    return Err(e);
                }
            }
        }
        let Some(live) = guard.as_mut() else {
            return Err(MoveError::SessionNotFound(id));
        };

        // 4. 送信者の色
        let color = live
            .session
            .color_of(requester)
            .ok_or(MoveError::NotAParticipant)?;

        // 5. 終局済み（ストアから読んだばかりなら結果は保存済みなので、キャッシュには残さない）
        if live.session.is_concluded() {
            if loaded_now {
                drop(guard);
                self.cache.lock().await.remove(&id);
            }
            return Err(MoveError::GameAlreadyOver(id));
        }

        if request.resign {
            let outcome = Outcome::resignation(color);
            tracing::info!("User '{}' resigned game {}", requester, id);
            self.conclude(live, outcome).await?;
            return Ok(MoveOutcome::Resigned(outcome));
        }

        // 6. 手番
        if color != live.board.turn() {
            return Err(MoveError::OutOfTurn);
        }

        // 7. 記譜の解釈
        let notation = request
            .notation
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| MoveError::Malformed("Failed to parse notation.".to_string()))?;
        let chess_move = live
            .board
            .decode(notation, request.dialect)
            .map_err(|e| MoveError::IllegalMove(e.to_string()))?;

        // 8. 適用して保存（保存に失敗しても局面は適用したまま）
        let san = live.board.encode(chess_move, Notation::Algebraic);
        live.board
            .apply(chess_move)
            .map_err(|e| MoveError::IllegalMove(e.to_string()))?;
        live.session.moves.push(san.clone());
        live.session.updated_at = self.clock.now_millis();
        let fen = live.board.fen();

        let persisted = self
            .sessions
            .save_session(&live.session)
            .await
            .map_err(|e| {
                tracing::error!("Failed to save game {}: {}", id, e);
                MoveError::PersistenceFailure(e.to_string())
            });

        // 9. 送信者への受理通知
        if persisted.is_ok() {
            if let Err(e) = self.registry.push_to(requester, OutboundMessage::MoveAck).await {
                tracing::warn!("Failed to acknowledge move of '{}': {}", requester, e);
            }
        }

        // 10. 両者への配信
        let players = [live.session.white.clone(), live.session.black.clone()];
        self.registry
            .broadcast(
                &players,
                OutboundMessage::Move {
                    session_id: id,
                    notation: san.clone(),
                    fen: fen.clone(),
                    request_draw: request.request_draw,
                    resign: false,
                },
            )
            .await;
        for player in &players {
            self.registry.set_last_position(player, fen.clone()).await;
        }
        tracing::info!("Game {}: '{}' played {}", id, requester, san);

        // 11-12. 終局判定
        let outcome = live.board.outcome();
        let concluded = match outcome {
            Some(outcome) => self.conclude(live, outcome).await,
            None => Ok(()),
        };

        persisted?;
        concluded?;
        Ok(MoveOutcome::Applied { san, fen, outcome })
    }

    /// 終局処理（結果の記録、レーティング更新、結果の配信、参加中の対局の解除）
    ///
    /// 結果を保存できた対局はキャッシュから外す。
    async fn conclude(&self, live: &mut LiveSession, outcome: Outcome) -> Result<(), MoveError> {
        let session = &mut live.session;
        session.outcome = Some(outcome);
        session.updated_at = self.clock.now_millis();

        let persisted = self.sessions.save_session(session).await.map_err(|e| {
            tracing::error!("Failed to save result of game {}: {}", session.id, e);
            MoveError::PersistenceFailure(e.to_string())
        });
        // 結果が保存できたら以降はストアから再構築できる
        if persisted.is_ok() {
            self.cache.lock().await.remove(&session.id);
        }

        let change = match self.rating.execute(session, outcome).await {
            Ok(change) => Some(change),
            Err(e) => {
                tracing::error!("Game {}: {}", session.id, e);
                None
            }
        };

        let winner = outcome.result.winner();
        for color in [PieceColor::White, PieceColor::Black] {
            let recipient = session.player(color);
            let message = OutboundMessage::GameResult {
                outcome,
                winner: winner.map(|c| session.player(c).clone()),
                loser: winner.map(|c| session.player(c.opposite()).clone()),
                new_rating: change.map(|c| c.of(color)),
            };
            if let Err(e) = self.registry.push_to(recipient, message).await {
                tracing::warn!("Failed to send game result to '{}': {}", recipient, e);
            }
            self.registry.set_active_session(recipient, None).await;
        }

        tracing::info!(
            "Game {} concluded: {} by {}",
            session.id,
            outcome.result,
            outcome.method
        );
        persisted
    }

    async fn slot(&self, id: SessionId) -> SessionSlot {
        self.cache.lock().await.entry(id).or_default().clone()
    }

    /// 読み込みに失敗した空のエントリを取り除く
    async fn evict_if_empty(&self, id: SessionId) {
        let mut cache = self.cache.lock().await;
        let empty = cache
            .get(&id)
            .is_some_and(|slot| slot.try_lock().is_ok_and(|live| live.is_none()));
        if empty {
            cache.remove(&id);
        }
    }

    async fn load(&self, id: SessionId) -> Result<LiveSession, MoveError> {
        let session = self.sessions.get_session(id).await.map_err(|e| match e {
            RepositoryError::SessionNotFound(id) => MoveError::SessionNotFound(id),
            other => MoveError::PersistenceFailure(other.to_string()),
        })?;
        let board = Board::replay(&session.moves).map_err(|e| {
            tracing::error!("Game {} could not be rebuilt: {}", id, e);
            MoveError::CorruptHistory(e.to_string())
        })?;
        Ok(LiveSession { session, board })
    }
}
