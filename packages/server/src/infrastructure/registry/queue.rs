//! 接続ごとの送信キュー
//!
//! 上限付きの FIFO。投入側（`OutboundSender`）は決してブロックせず、
//! 満杯のときは以下の方針で扱う。
//!
//! - ベストエフォートのメッセージ（ack, エラー, 局面応答など）は破棄
//! - 対局に欠かせないメッセージ（`game_start`, `move`, `game_result`）は
//!   最も古いベストエフォートのメッセージを押し出して入る。
//!   押し出せるものがなければ上限を超えて入る

use std::{
    collections::VecDeque,
    sync::{Mutex, MutexGuard, PoisonError},
};

use tokio::sync::Notify;

use crate::domain::{Delivery, OutboundMessage, OutboundSender, RegistryError};

/// 送信キューの最小容量
pub const MIN_OUTBOUND_CAPACITY: usize = 10;

/// 送信キューの既定容量
pub const DEFAULT_OUTBOUND_CAPACITY: usize = 32;

#[derive(Debug, Default)]
struct QueueState {
    messages: VecDeque<OutboundMessage>,
    closed: bool,
}

/// 上限付き送信キュー
#[derive(Debug)]
pub struct OutboundQueue {
    label: String,
    capacity: usize,
    state: Mutex<QueueState>,
    notify: Notify,
}

impl OutboundQueue {
    /// 新しい送信キューを作成（容量は最小値未満にならない）
    pub fn new(label: impl Into<String>, capacity: usize) -> Self {
        Self {
            label: label.into(),
            capacity: capacity.max(MIN_OUTBOUND_CAPACITY),
            state: Mutex::new(QueueState::default()),
            notify: Notify::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lock().messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// 次のメッセージを取り出す
    ///
    /// キューが空なら届くまで待つ。閉じられていて空なら `None`。
    pub async fn pop(&self) -> Option<OutboundMessage> {
        loop {
            let notified = self.notify.notified();
            {
                let mut state = self.lock();
                if let Some(message) = state.messages.pop_front() {
                    return Some(message);
                }
                if state.closed {
                    return None;
                }
            }
            notified.await;
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl OutboundSender for OutboundQueue {
    fn send(&self, message: OutboundMessage) -> Result<Delivery, RegistryError> {
        let delivery = {
            let mut state = self.lock();
            if state.closed {
                return Err(RegistryError::QueueClosed(self.label.clone()));
            }

            if state.messages.len() < self.capacity {
                state.messages.push_back(message);
                Delivery::Queued
            } else if !message.is_game_critical() {
                Delivery::Dropped
            } else if let Some(index) = state.messages.iter().position(|m| !m.is_game_critical()) {
                state.messages.remove(index);
                state.messages.push_back(message);
                Delivery::EvictedOldest
            } else {
                state.messages.push_back(message);
                Delivery::OverBound
            }
        };

        match delivery {
            Delivery::Dropped => {
                tracing::warn!("Outbound queue for '{}' is full, message dropped", self.label);
            }
            Delivery::EvictedOldest => {
                tracing::warn!(
                    "Outbound queue for '{}' is full, evicted oldest best-effort message",
                    self.label
                );
                self.notify.notify_one();
            }
            Delivery::OverBound => {
                tracing::warn!(
                    "Outbound queue for '{}' is full of game messages, admitted over bound",
                    self.label
                );
                self.notify.notify_one();
            }
            Delivery::Queued => self.notify.notify_one(),
        }
        Ok(delivery)
    }

    fn close(&self) {
        self.lock().closed = true;
        self.notify.notify_waiters();
        self.notify.notify_one();
    }
}
