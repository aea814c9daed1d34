//! UseCase: レーティング更新処理
//!
//! 終局時に両対局者の Elo レーティングを再計算して保存します。
//! 失敗してもログに残して呼び出し元に返すだけで、対局の状態は巻き戻さず、再試行もしません。
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - UpdateRatingUseCase::execute() メソッド
//!
//! ### どのような状況を想定しているか
//! - 正常系：勝敗が付いた対局、引き分け
//! - 異常系：両者の保存に失敗（mockall のモックで再現）

use std::sync::Arc;

use kingside_shared::time::{Clock, days_before};

use crate::domain::{
    Outcome, PieceColor, Rating, Session, SessionRepository, User, UserRepository,
    rating::{RECENT_WINDOW_DAYS, actual_score, expected_score, k_factor, new_rating},
};

use super::error::RatingError;

/// 更新後のレーティング
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingChange {
    pub white: Rating,
    pub black: Rating,
}

impl RatingChange {
    pub fn of(&self, color: PieceColor) -> Rating {
        match color {
            PieceColor::White => self.white,
            PieceColor::Black => self.black,
        }
    }
}

/// レーティング更新のユースケース
pub struct UpdateRatingUseCase {
    sessions: Arc<dyn SessionRepository>,
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

impl UpdateRatingUseCase {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        users: Arc<dyn UserRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            sessions,
            users,
            clock,
        }
    }

    /// レーティング更新を実行
    ///
    /// 両者の旧レーティングから期待勝率を求めてから、それぞれを更新する。
    pub async fn execute(
        &self,
        session: &Session,
        outcome: Outcome,
    ) -> Result<RatingChange, RatingError> {
        let mut white = self.users.get_user(&session.white).await?;
        let mut black = self.users.get_user(&session.black).await?;
        let since = days_before(self.clock.now_millis(), RECENT_WINDOW_DAYS);

        let white_k = self.k_factor_of(&white, since).await?;
        let black_k = self.k_factor_of(&black, since).await?;

        let white_rating = new_rating(
            white.rating,
            white_k,
            actual_score(outcome.result, PieceColor::White),
            expected_score(white.rating, black.rating),
        );
        let black_rating = new_rating(
            black.rating,
            black_k,
            actual_score(outcome.result, PieceColor::Black),
            expected_score(black.rating, white.rating),
        );

        // 片方だけ更新されることがないよう、両者を 1 回で保存する
        white.rating = white_rating;
        black.rating = black_rating;
        self.users.save_users(&[white.clone(), black.clone()]).await?;

        tracing::info!(
            "Game {} ratings updated: '{}' {}, '{}' {}",
            session.id,
            white.id,
            white.rating,
            black.id,
            black.rating
        );

        Ok(RatingChange {
            white: white_rating,
            black: black_rating,
        })
    }

    async fn k_factor_of(&self, user: &User, since: i64) -> Result<f64, RatingError> {
        let recent = self
            .sessions
            .count_recent_sessions(&user.id, since)
            .await?;
        Ok(k_factor(recent))
    }
}
