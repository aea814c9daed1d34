//! Server state shared by every handler.

use std::{sync::Arc, time::Duration};

use crate::{
    infrastructure::registry::DEFAULT_OUTBOUND_CAPACITY,
    usecase::{
        ConnectUserUseCase, DisconnectUserUseCase, JoinMatchmakingUseCase, QueryPositionUseCase,
        SubmitMoveUseCase,
    },
};

const MIN_PING_INTERVAL: Duration = Duration::from_millis(1);

/// Deadlines and queue bound of one connection pump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PumpConfig {
    /// Read deadline, refreshed on every pong. Also bounds the handshake.
    pub pong_wait: Duration,
    /// Deadline for writing a single frame.
    pub write_wait: Duration,
    /// Outbound queue bound.
    pub outbound_capacity: usize,
}

impl PumpConfig {
    /// Keepalive probe interval: 9/10 of the read deadline, never zero.
    pub fn ping_interval(&self) -> Duration {
        (self.pong_wait * 9 / 10).max(MIN_PING_INTERVAL)
    }
}

impl Default for PumpConfig {
    fn default() -> Self {
        Self {
            pong_wait: Duration::from_secs(60),
            write_wait: Duration::from_secs(10),
            outbound_capacity: DEFAULT_OUTBOUND_CAPACITY,
        }
    }
}

/// Shared application state
pub struct AppState {
    /// ConnectUserUseCase（ユーザー接続のユースケース）
    pub connect_user_usecase: Arc<ConnectUserUseCase>,
    /// DisconnectUserUseCase（ユーザー切断のユースケース）
    pub disconnect_user_usecase: Arc<DisconnectUserUseCase>,
    /// JoinMatchmakingUseCase（マッチメイキング参加のユースケース）
    pub join_matchmaking_usecase: Arc<JoinMatchmakingUseCase>,
    /// SubmitMoveUseCase（指し手送信のユースケース）
    pub submit_move_usecase: Arc<SubmitMoveUseCase>,
    /// QueryPositionUseCase（局面問い合わせのユースケース）
    pub query_position_usecase: Arc<QueryPositionUseCase>,
    pub pump: PumpConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ping_interval_is_nine_tenths_of_pong_wait() {
        // テスト項目: 死活監視の間隔は読み取り期限の 9/10
        // given (前提条件):
        let pump = PumpConfig::default();

        // when (操作):
        let interval = pump.ping_interval();

        // then (期待する結果):
        assert_eq!(interval, Duration::from_secs(54));
    }

    #[test]
    fn test_ping_interval_is_never_zero() {
        // テスト項目: 読み取り期限が 0 でも死活監視の間隔は 0 にならない
        // given (前提条件):
        let pump = PumpConfig {
            pong_wait: Duration::ZERO,
            ..PumpConfig::default()
        };

        // when (操作) / then (期待する結果):
        assert_eq!(pump.ping_interval(), MIN_PING_INTERVAL);
    }
}
