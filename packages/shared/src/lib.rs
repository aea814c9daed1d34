//! Utilities shared by the Kingside binaries: logging setup and time.

pub mod logger;
pub mod time;
