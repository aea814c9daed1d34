//! ユースケース層
//!
//! 接続、マッチメイキング、指し手、局面問い合わせ、レーティング更新の
//! 各ユースケースを定義します。

pub mod connect_user;
pub mod disconnect_user;
pub mod error;
pub mod join_matchmaking;
pub mod matchmaker;
pub mod query_position;
pub mod submit_move;
pub mod update_rating;

pub use connect_user::ConnectUserUseCase;
pub use disconnect_user::DisconnectUserUseCase;
pub use error::{ConnectError, JoinError, MoveError, RatingError, RequestError, WireError};
pub use join_matchmaking::JoinMatchmakingUseCase;
pub use matchmaker::{DEFAULT_MATCHMAKING_CAPACITY, Matchmaker, Pairing, matchmaking_channel};
pub use query_position::QueryPositionUseCase;
pub use submit_move::{MoveOutcome, MoveRequest, SubmitMoveUseCase};
pub use update_rating::{RatingChange, UpdateRatingUseCase};
