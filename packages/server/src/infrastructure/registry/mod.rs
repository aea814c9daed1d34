//! 接続レジストリの実装
//!
//! ## 概要
//!
//! このモジュールは `ConnectionRegistry` trait の具体的な実装と、
//! 接続ごとの上限付き送信キューを提供します。
//!
//! ## 実装
//!
//! - `inmemory`: プロセス内の HashMap を使った実装
//! - `queue`: 上限付き送信キュー（`OutboundSender` の実装）

pub mod inmemory;
pub mod queue;

pub use inmemory::InMemoryConnectionRegistry;
pub use queue::{DEFAULT_OUTBOUND_CAPACITY, MIN_OUTBOUND_CAPACITY, OutboundQueue};
