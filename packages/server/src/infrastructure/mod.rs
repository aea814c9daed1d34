//! Infrastructure 層
//!
//! ドメイン層が定義する trait の具体的な実装（インメモリのストア、接続レジストリ）と、
//! 通信用の DTO を提供します。

pub mod dto;
pub mod registry;
pub mod repository;
