//! Real-time chess match coordinator library.
//!
//! This library pairs players through a matchmaking queue, relays validated
//! moves between them over WebSocket connections and updates Elo ratings
//! when a game concludes.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
