//! ドメイン層
//!
//! 対局（Session）、ユーザー、レーティング計算、チェスのルール、
//! およびユースケース層が依存するインターフェース（trait）を定義します。

pub mod chess;
pub mod entity;
pub mod error;
pub mod identity;
pub mod rating;
pub mod registry;
pub mod repository;
pub mod value_object;

pub use chess::{Board, ChessMove, Notation, PieceColor};
pub use entity::{EndMethod, GameResult, Outcome, Session, User};
pub use error::{AuthError, RegistryError, RepositoryError, RulesError, ValueObjectError};
pub use identity::IdentityProvider;
pub use registry::{
    ConnectionId, ConnectionRegistry, Delivery, OutboundMessage, OutboundSender, ResumedGame,
};
pub use repository::{SessionRepository, UserRepository};
pub use value_object::{Rating, SessionId, UserId};
