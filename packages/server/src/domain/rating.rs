//! Elo レーティング計算
//!
//! - 期待勝率: `E = 1 / (1 + 10^((R_y - R_x) / 400))`
//! - K 係数: 直近 90 日の対局数 `n` に対して `max(30, 400 / (1 + n))`
//! - 新レーティング: `R' = R + K * (S - E)` を最も近い整数に丸める

use super::{chess::PieceColor, entity::GameResult, value_object::Rating};

/// K 係数の下限
pub const MIN_K_FACTOR: f64 = 30.0;

/// K 係数の算出に使う対局数の集計期間（日）
pub const RECENT_WINDOW_DAYS: i64 = 90;

/// `r_x` が `r_y` に勝つ期待値
pub fn expected_score(r_x: Rating, r_y: Rating) -> f64 {
    let diff = f64::from(r_y.value() - r_x.value());
    1.0 / (1.0 + 10f64.powf(diff / 400.0))
}

/// 直近の対局数から K 係数を求める
pub fn k_factor(recent_sessions: usize) -> f64 {
    let provisional = 400.0 / (1.0 + recent_sessions as f64);
    provisional.max(MIN_K_FACTOR)
}

/// 実際のスコア（勝ち = 1.0, 引き分け = 0.5, 負け = 0.0）
pub fn actual_score(result: GameResult, color: PieceColor) -> f64 {
    match result.winner() {
        None => 0.5,
        Some(winner) if winner == color => 1.0,
        Some(_) => 0.0,
    }
}

/// 新しいレーティング
pub fn new_rating(old: Rating, k: f64, actual: f64, expected: f64) -> Rating {
    let updated = f64::from(old.value()) + k * (actual - expected);
    Rating::new(updated.round() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_score_equal_ratings() {
        // テスト項目: 同じレーティング同士の期待勝率は 0.5
        // given (前提条件):
        let r = Rating::new(1500);

        // when (操作):
        let e = expected_score(r, r);

        // then (期待する結果):
        assert!((e - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_k_factor_decreases_with_experience() {
        // テスト項目: 対局数が少ないほど K 係数が大きく、下限は 30
        // given (前提条件) / when (操作) / then (期待する結果):
        assert!((k_factor(0) - 400.0).abs() < f64::EPSILON);
        assert!((k_factor(3) - 100.0).abs() < f64::EPSILON);
        assert!((k_factor(100) - MIN_K_FACTOR).abs() < f64::EPSILON);
    }

    #[test]
    fn test_upset_win_gains_23_points() {
        // テスト項目: 1200 が 1400 に勝つと、K=30 で +23 / -23 になる
        // given (前提条件):
        let white = Rating::new(1200);
        let black = Rating::new(1400);
        let k = k_factor(20);

        // when (操作):
        let white_new = new_rating(
            white,
            k,
            actual_score(GameResult::WhiteWon, PieceColor::White),
            expected_score(white, black),
        );
        let black_new = new_rating(
            black,
            k,
            actual_score(GameResult::WhiteWon, PieceColor::Black),
            expected_score(black, white),
        );

        // then (期待する結果):
        assert_eq!(white_new, Rating::new(1223));
        assert_eq!(black_new, Rating::new(1377));
    }

    #[test]
    fn test_draw_between_equal_ratings_is_neutral() {
        let r = Rating::new(1200);
        let updated = new_rating(
            r,
            k_factor(0),
            actual_score(GameResult::Draw, PieceColor::White),
            expected_score(r, r),
        );
        assert_eq!(updated, r);
    }
}
