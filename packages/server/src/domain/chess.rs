//! チェスのルール（ルールエンジン境界）
//!
//! `shakmaty` をラップし、コーディネーターが必要とする操作だけを公開します。
//!
//! - 記譜の解釈（algebraic / uci / long algebraic）
//! - 指し手の適用と手番の管理
//! - 正規化された SAN への再エンコード
//! - 終局判定（チェックメイト、ステイルメイト、戦力不足、5 回同一局面、75 手ルール）
//! - 棋譜（PGN の指し手部分）のシリアライズ / デシリアライズ

use std::{fmt, str::FromStr};

use shakmaty::{
    CastlingMode, Chess, Color, EnPassantMode, KnownOutcome, Move, Position, Role, Square,
    fen::Fen,
    san::{San, SanPlus},
    uci::UciMove,
    zobrist::Zobrist64,
};

use super::{
    entity::{EndMethod, GameResult, Outcome},
    error::RulesError,
};

/// 75 手ルール（150 半手）
const SEVENTY_FIVE_MOVE_HALFMOVES: u32 = 150;

/// 同一局面がこの回数出現したら自動的に引き分け
const FIVEFOLD_REPETITION: usize = 5;

/// 駒の色（先手 = 白, 後手 = 黒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceColor {
    White,
    Black,
}

impl PieceColor {
    pub fn opposite(self) -> Self {
        match self {
            PieceColor::White => PieceColor::Black,
            PieceColor::Black => PieceColor::White,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PieceColor::White => "white",
            PieceColor::Black => "black",
        }
    }
}

impl From<Color> for PieceColor {
    fn from(color: Color) -> Self {
        match color {
            Color::White => PieceColor::White,
            Color::Black => PieceColor::Black,
        }
    }
}

impl fmt::Display for PieceColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// クライアントが宣言する記譜法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Notation {
    /// 標準代数記譜法（SAN）: `e4`, `Nf3`, `exd5`, `O-O`
    #[default]
    Algebraic,
    /// UCI: `e2e4`, `e7e8q`
    Uci,
    /// 長代数記譜法: `e2e4`, `Ng1-f3`, `Rd3xd7`, `e7e8=Q`
    LongAlgebraic,
}

impl Notation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Notation::Algebraic => "algebraic",
            Notation::Uci => "uci",
            Notation::LongAlgebraic => "long algebraic",
        }
    }
}

impl FromStr for Notation {
    type Err = RulesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "algebraic" => Ok(Notation::Algebraic),
            "uci" => Ok(Notation::Uci),
            "long algebraic" => Ok(Notation::LongAlgebraic),
            other => Err(RulesError::IllegalMove(format!(
                "unsupported notation type: {other}"
            ))),
        }
    }
}

/// 局面に対して合法性が確認済みの指し手
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChessMove(Move);

/// 権威ある局面
///
/// 局面に加えて、同一局面判定のために各局面の Zobrist ハッシュを保持する。
#[derive(Debug, Clone)]
pub struct Board {
    position: Chess,
    hashes: Vec<Zobrist64>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// 初期局面
    pub fn new() -> Self {
        let position = Chess::default();
        let hashes = vec![position.zobrist_hash::<Zobrist64>(EnPassantMode::Legal)];
        Self { position, hashes }
    }

    /// 初期局面の FEN
    pub fn starting_fen() -> String {
        Self::new().fen()
    }

    /// SAN の指し手履歴から局面を再構築する
    pub fn replay(moves: &[String]) -> Result<Self, RulesError> {
        let mut board = Self::new();
        for (index, san) in moves.iter().enumerate() {
            let chess_move = board.decode(san, Notation::Algebraic).map_err(|e| {
                RulesError::CorruptHistory(format!("move {} '{}': {}", index + 1, san, e))
            })?;
            board.apply(chess_move)?;
        }
        Ok(board)
    }

    /// 手番の色
    pub fn turn(&self) -> PieceColor {
        self.position.turn().into()
    }

    pub fn fen(&self) -> String {
        Fen::from_position(&self.position, EnPassantMode::Legal).to_string()
    }

    /// 指定された記譜法で指し手を解釈する
    pub fn decode(&self, notation: &str, dialect: Notation) -> Result<ChessMove, RulesError> {
        let notation = notation.trim();
        let m = match dialect {
            Notation::Algebraic => {
                let san = San::from_str(notation)
                    .map_err(|e| RulesError::IllegalMove(format!("{e}: '{notation}'")))?;
                san.to_move(&self.position)
                    .map_err(|e| RulesError::IllegalMove(format!("{e}: '{notation}'")))?
            }
            Notation::Uci => {
                let uci = UciMove::from_str(notation).map_err(|e| {
                    RulesError::IllegalMove(format!("{e}: '{notation}'"))
                })?;
                uci.to_move(&self.position)
                    .map_err(|e| RulesError::IllegalMove(format!("{e}: '{notation}'")))?
            }
            Notation::LongAlgebraic => self.decode_long_algebraic(notation)?,
        };
        Ok(ChessMove(m))
    }

    /// 指し手を適用する
    pub fn apply(&mut self, chess_move: ChessMove) -> Result<(), RulesError> {
        if !self.position.is_legal(chess_move.0) {
            return Err(RulesError::IllegalMove(
                "move is not legal in the current position".to_string(),
            ));
        }
        self.position.play_unchecked(chess_move.0);
        self.hashes
            .push(self.position.zobrist_hash::<Zobrist64>(EnPassantMode::Legal));
        Ok(())
    }

    /// 適用前の局面を基準に指し手をエンコードする
    pub fn encode(&self, chess_move: ChessMove, dialect: Notation) -> String {
        match dialect {
            Notation::Algebraic => {
                SanPlus::from_move(self.position.clone(), chess_move.0).to_string()
            }
            Notation::Uci => chess_move.0.to_uci(CastlingMode::Standard).to_string(),
            Notation::LongAlgebraic => self.encode_long_algebraic(chess_move.0),
        }
    }

    /// 終局判定（未終局なら `None`）
    pub fn outcome(&self) -> Option<Outcome> {
        match self.position.outcome() {
            shakmaty::Outcome::Known(KnownOutcome::Decisive { winner }) => Some(Outcome::new(
                GameResult::won_by(winner.into()),
                EndMethod::Checkmate,
            )),
            shakmaty::Outcome::Known(KnownOutcome::Draw) => {
                let method = if self.position.is_stalemate() {
                    EndMethod::Stalemate
                } else {
                    EndMethod::InsufficientMaterial
                };
                Some(Outcome::new(GameResult::Draw, method))
            }
            shakmaty::Outcome::Unknown => {
                if self.repetitions() >= FIVEFOLD_REPETITION {
                    Some(Outcome::new(GameResult::Draw, EndMethod::FivefoldRepetition))
                } else if self.position.halfmoves() >= SEVENTY_FIVE_MOVE_HALFMOVES {
                    Some(Outcome::new(GameResult::Draw, EndMethod::SeventyFiveMoveRule))
                } else {
                    None
                }
            }
        }
    }

    /// 現在の局面がこれまでに出現した回数（現在の局面を含む）
    fn repetitions(&self) -> usize {
        match self.hashes.last() {
            Some(current) => self.hashes.iter().filter(|h| *h == current).count(),
            None => 0,
        }
    }

    fn decode_long_algebraic(&self, notation: &str) -> Result<Move, RulesError> {
        let illegal =
            || RulesError::IllegalMove(format!("invalid long algebraic notation: '{notation}'"));

        let body = notation.trim_end_matches(['+', '#']);
        if matches!(body, "O-O" | "O-O-O" | "0-0" | "0-0-0") {
            let san = San::from_str(&body.replace('0', "O")).map_err(|_| illegal())?;
            return san
                .to_move(&self.position)
                .map_err(|e| RulesError::IllegalMove(format!("{e}: '{notation}'")));
        }

        let bytes = body.as_bytes();
        let mut cursor = 0;

        let role = match bytes.first().copied().map(char::from) {
            Some(c) if c.is_ascii_uppercase() => {
                cursor += 1;
                Some(Role::from_char(c).ok_or_else(illegal)?)
            }
            _ => None,
        };

        let from = bytes
            .get(cursor..cursor + 2)
            .and_then(|s| Square::from_ascii(s).ok())
            .ok_or_else(illegal)?;
        cursor += 2;

        let capture = match bytes.get(cursor) {
            Some(b'x') => {
                cursor += 1;
                true
            }
            Some(b'-') => {
                cursor += 1;
                false
            }
            _ => false,
        };

        let to = bytes
            .get(cursor..cursor + 2)
            .and_then(|s| Square::from_ascii(s).ok())
            .ok_or_else(illegal)?;
        cursor += 2;

        if bytes.get(cursor) == Some(&b'=') {
            cursor += 1;
        }
        let promotion = match bytes.get(cursor) {
            Some(&c) => {
                cursor += 1;
                Some(Role::from_char(char::from(c)).ok_or_else(illegal)?)
            }
            None => None,
        };
        if cursor != bytes.len() {
            return Err(illegal());
        }

        let m = UciMove::Normal {
            from,
            to,
            promotion,
        }
        .to_move(&self.position)
        .map_err(|e| RulesError::IllegalMove(format!("{e}: '{notation}'")))?;

        if role.is_some_and(|r| r != m.role()) {
            return Err(RulesError::IllegalMove(format!(
                "piece does not match the piece on {from}: '{notation}'"
            )));
        }
        if capture && !m.is_capture() {
            return Err(RulesError::IllegalMove(format!(
                "move is not a capture: '{notation}'"
            )));
        }
        Ok(m)
    }

    fn encode_long_algebraic(&self, m: Move) -> String {
        let mut encoded = match m {
            Move::Castle { king, rook } => {
                if rook.file() > king.file() {
                    "O-O".to_string()
                } else {
                    "O-O-O".to_string()
                }
            }
            Move::Normal { .. } | Move::EnPassant { .. } => {
                let mut s = String::new();
                if m.role() != Role::Pawn {
                    s.push(m.role().upper_char());
                }
                if let Some(from) = m.from() {
                    s.push_str(&from.to_string());
                }
                if m.is_capture() {
                    s.push('x');
                }
                s.push_str(&m.to().to_string());
                if let Some(promotion) = m.promotion() {
                    s.push('=');
                    s.push(promotion.upper_char());
                }
                s
            }
            Move::Put { .. } => m.to_uci(CastlingMode::Standard).to_string(),
        };

        let mut after = self.position.clone();
        after.play_unchecked(m);
        if after.is_checkmate() {
            encoded.push('#');
        } else if after.is_check() {
            encoded.push('+');
        }
        encoded
    }
}

/// SAN の指し手履歴を PGN の指し手部分に変換する
pub fn serialize_history(moves: &[String]) -> String {
    moves
        .chunks(2)
        .enumerate()
        .map(|(index, pair)| format!("{}. {}", index + 1, pair.join(" ")))
        .collect::<Vec<_>>()
        .join(" ")
}

/// PGN の指し手部分から SAN の指し手履歴を取り出す
///
/// 手数（`1.`, `12...`）と結果トークン（`1-0` など）は読み飛ばす。
pub fn deserialize_history(pgn: &str) -> Vec<String> {
    pgn.split_whitespace()
        .filter(|token| !matches!(*token, "*" | "1-0" | "0-1" | "1/2-1/2"))
        .map(strip_move_number)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// `12.e4` → `e4`, `3...` → ``
fn strip_move_number(token: &str) -> &str {
    match token.rfind('.') {
        Some(dot) if token[..dot].chars().all(|c| c.is_ascii_digit() || c == '.') => {
            &token[dot + 1..]
        }
        _ => token,
    }
}
