//! Repository の実装
//!
//! - `inmemory`: HashMap を使ったインメモリ実装
//! - 将来的に: `postgres` など

pub mod inmemory;

pub use inmemory::{InMemorySessionRepository, InMemoryUserRepository, SeedError};
