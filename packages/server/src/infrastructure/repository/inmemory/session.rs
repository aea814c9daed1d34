//! InMemory Session Repository 実装
//!
//! ドメイン層が定義する SessionRepository trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。
//!
//! ## 技術的負債
//!
//! 現在、ドメインモデル（`Session`）を直接ストレージとして使用しています。
//! 永続化ストアを実装する際は、棋譜を PGN（`Session::pgn`）として保存し、
//! 読み込み時に `deserialize_history` で戻す変換層が必要になります。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{RepositoryError, Session, SessionId, SessionRepository, UserId};

#[derive(Debug)]
struct Store {
    sessions: HashMap<SessionId, Session>,
    next_id: u64,
}

impl Default for Store {
    fn default() -> Self {
        Self {
            sessions: HashMap::new(),
            next_id: 1,
        }
    }
}

/// インメモリ Session Repository 実装
///
/// 対局 ID は 1 から単調増加で採番します。
#[derive(Debug, Default)]
pub struct InMemorySessionRepository {
    store: Mutex<Store>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn create_session(
        &self,
        white: UserId,
        black: UserId,
        created_at: i64,
    ) -> Result<Session, RepositoryError> {
        let mut store = self.store.lock().await;
        let id = SessionId::new(store.next_id);
        store.next_id += 1;

        let session = Session::new(id, white, black, created_at);
        store.sessions.insert(id, session.clone());
        Ok(session)
    }

    async fn get_session(&self, id: SessionId) -> Result<Session, RepositoryError> {
        let store = self.store.lock().await;
        store
            .sessions
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::SessionNotFound(id))
    }

    async fn save_session(&self, session: &Session) -> Result<(), RepositoryError> {
        let mut store = self.store.lock().await;
        if !store.sessions.contains_key(&session.id) {
            return Err(RepositoryError::SessionNotFound(session.id));
        }
        store.sessions.insert(session.id, session.clone());
        Ok(())
    }

    async fn find_active_session(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Session>, RepositoryError> {
        let store = self.store.lock().await;
        Ok(store
            .sessions
            .values()
            .filter(|s| !s.is_concluded() && s.involves(user_id))
            .max_by_key(|s| s.id)
            .cloned())
    }

    async fn count_recent_sessions(
        &self,
        user_id: &UserId,
        since: i64,
    ) -> Result<usize, RepositoryError> {
        let store = self.store.lock().await;
        Ok(store
            .sessions
            .values()
            .filter(|s| s.created_at >= since && s.involves(user_id))
            .count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EndMethod, GameResult, Outcome};

    fn user(id: &str) -> UserId {
        UserId::new(id.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_create_session_assigns_increasing_ids() {
        // テスト項目: 対局 ID が 1 から単調増加で採番される
        // given (前提条件):
        let repository = InMemorySessionRepository::new();

        // when (操作):
        let first = repository
            .create_session(user("alice"), user("bob"), 0)
            .await
            .unwrap();
        let second = repository
            .create_session(user("carol"), user("dave"), 0)
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(first.id, SessionId::new(1));
        assert_eq!(second.id, SessionId::new(2));
        assert_eq!(first.white, user("alice"));
        assert_eq!(first.black, user("bob"));
    }

    #[tokio::test]
    async fn test_get_unknown_session() {
        let repository = InMemorySessionRepository::new();
        let result = repository.get_session(SessionId::new(42)).await;
        assert_eq!(
            result,
            Err(RepositoryError::SessionNotFound(SessionId::new(42)))
        );
    }

    #[tokio::test]
    async fn test_save_session_persists_history() {
        // テスト項目: 保存した棋譜が取得できる
        // given (前提条件):
        let repository = InMemorySessionRepository::new();
        let mut session = repository
            .create_session(user("alice"), user("bob"), 0)
            .await
            .unwrap();

        // when (操作):
        session.moves.push("e4".to_string());
        repository.save_session(&session).await.unwrap();

        // then (期待する結果):
        let stored = repository.get_session(session.id).await.unwrap();
        assert_eq!(stored.moves, vec!["e4".to_string()]);
    }

    #[tokio::test]
    async fn test_find_active_session_ignores_concluded() {
        // テスト項目: 終局した対局は「参加中の対局」として返されない
        // given (前提条件):
        let repository = InMemorySessionRepository::new();
        let mut session = repository
            .create_session(user("alice"), user("bob"), 0)
            .await
            .unwrap();
        assert_eq!(
            repository
                .find_active_session(&user("bob"))
                .await
                .unwrap()
                .map(|s| s.id),
            Some(session.id)
        );

        // when (操作):
        session.outcome = Some(Outcome::new(GameResult::WhiteWon, EndMethod::Resignation));
        repository.save_session(&session).await.unwrap();

        // then (期待する結果):
        assert_eq!(repository.find_active_session(&user("bob")).await, Ok(None));
        assert_eq!(
            repository.find_active_session(&user("carol")).await,
            Ok(None)
        );
    }

    #[tokio::test]
    async fn test_count_recent_sessions_respects_window() {
        // テスト項目: 期間内に作成された参加対局だけが数えられる
        // given (前提条件):
        let repository = InMemorySessionRepository::new();
        repository
            .create_session(user("alice"), user("bob"), 100)
            .await
            .unwrap();
        repository
            .create_session(user("carol"), user("alice"), 1_000)
            .await
            .unwrap();
        repository
            .create_session(user("carol"), user("dave"), 1_000)
            .await
            .unwrap();

        // when (操作):
        let count = repository
            .count_recent_sessions(&user("alice"), 500)
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(count, 1);
    }
}
