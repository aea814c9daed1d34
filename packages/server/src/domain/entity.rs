//! エンティティ
//!
//! - `Session`: 2 人のユーザーによる 1 局の対局
//! - `User`: 識別サービスが管理するユーザー（レーティングを持つ）
//! - `Outcome`: 対局の終局結果

use std::fmt;

use super::{
    chess::{PieceColor, serialize_history},
    value_object::{Rating, SessionId, UserId},
};

/// ユーザー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub access_token: String,
    pub rating: Rating,
}

impl User {
    pub fn new(id: UserId, email: String, access_token: String, rating: Rating) -> Self {
        Self {
            id,
            email,
            access_token,
            rating,
        }
    }
}

/// 対局結果（PGN の result タグと同じ表記）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    WhiteWon,
    BlackWon,
    Draw,
}

impl GameResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameResult::WhiteWon => "1-0",
            GameResult::BlackWon => "0-1",
            GameResult::Draw => "1/2-1/2",
        }
    }

    /// 勝者の色（引き分けなら `None`）
    pub fn winner(&self) -> Option<PieceColor> {
        match self {
            GameResult::WhiteWon => Some(PieceColor::White),
            GameResult::BlackWon => Some(PieceColor::Black),
            GameResult::Draw => None,
        }
    }

    pub fn won_by(color: PieceColor) -> Self {
        match color {
            PieceColor::White => GameResult::WhiteWon,
            PieceColor::Black => GameResult::BlackWon,
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 終局の方法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndMethod {
    Checkmate,
    Resignation,
    Stalemate,
    InsufficientMaterial,
    FivefoldRepetition,
    SeventyFiveMoveRule,
}

impl EndMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndMethod::Checkmate => "Checkmate",
            EndMethod::Resignation => "Resignation",
            EndMethod::Stalemate => "Stalemate",
            EndMethod::InsufficientMaterial => "InsufficientMaterial",
            EndMethod::FivefoldRepetition => "FivefoldRepetition",
            EndMethod::SeventyFiveMoveRule => "SeventyFiveMoveRule",
        }
    }
}

impl fmt::Display for EndMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 終局結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub result: GameResult,
    pub method: EndMethod,
}

impl Outcome {
    pub fn new(result: GameResult, method: EndMethod) -> Self {
        Self { result, method }
    }

    /// `resigning` 側の投了による終局
    pub fn resignation(resigning: PieceColor) -> Self {
        Self::new(GameResult::won_by(resigning.opposite()), EndMethod::Resignation)
    }

    pub fn is_draw(&self) -> bool {
        self.result == GameResult::Draw
    }
}

/// 対局
///
/// 棋譜（SAN の指し手リスト）から局面を決定的に再構築できる。
/// 終局すると `outcome` が記録されるが、削除はされない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: SessionId,
    /// 先手（白）
    pub white: UserId,
    /// 後手（黒）
    pub black: UserId,
    /// 正規化された SAN の指し手履歴
    pub moves: Vec<String>,
    pub outcome: Option<Outcome>,
    /// 作成時刻（Unix ミリ秒, UTC）
    pub created_at: i64,
    /// 更新時刻（Unix ミリ秒, UTC）
    pub updated_at: i64,
}

impl Session {
    pub fn new(id: SessionId, white: UserId, black: UserId, created_at: i64) -> Self {
        Self {
            id,
            white,
            black,
            moves: Vec::new(),
            outcome: None,
            created_at,
            updated_at: created_at,
        }
    }

    /// ユーザーの手番の色を解決する（参加者でなければ `None`）
    pub fn color_of(&self, user_id: &UserId) -> Option<PieceColor> {
        if &self.white == user_id {
            Some(PieceColor::White)
        } else if &self.black == user_id {
            Some(PieceColor::Black)
        } else {
            None
        }
    }

    pub fn player(&self, color: PieceColor) -> &UserId {
        match color {
            PieceColor::White => &self.white,
            PieceColor::Black => &self.black,
        }
    }

    pub fn involves(&self, user_id: &UserId) -> bool {
        self.color_of(user_id).is_some()
    }

    pub fn is_concluded(&self) -> bool {
        self.outcome.is_some()
    }

    /// PGN の指し手部分（例: `1. e4 e5 2. Nf3`）
    pub fn pgn(&self) -> String {
        serialize_history(&self.moves)
    }
}
