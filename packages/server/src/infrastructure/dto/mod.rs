//! Data Transfer Objects (DTOs) for the match coordinator.
//!
//! DTOs are organized by protocol:
//! - `websocket`: WebSocket message DTOs
//! - `http`: HTTP API DTOs
//! - `user`: user seed file records

pub mod conversion;
pub mod http;
pub mod user;
pub mod websocket;
