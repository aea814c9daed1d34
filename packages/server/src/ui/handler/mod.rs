//! HTTP and WebSocket handlers.

mod http;
mod websocket;

pub use http::{health_check, join_matchmaking};
pub use websocket::websocket_handler;
