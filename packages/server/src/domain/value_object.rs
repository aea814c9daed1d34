//! 値オブジェクト
//!
//! ユーザー ID、対局 ID、レーティングを表す不変の値です。

use std::fmt;

use super::error::ValueObjectError;

/// ユーザー ID の最大長
pub const USER_ID_MAX_LENGTH: usize = 64;

/// 新規ユーザーの初期レーティング
pub const DEFAULT_RATING: i32 = 1200;

/// ユーザー ID（識別サービスが発行する永続的な識別子）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(String);

impl UserId {
    /// 新しい UserId を作成
    ///
    /// 空文字列、または最大長を超える文字列はエラーになる。
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::UserIdEmpty);
        }
        if value.chars().count() > USER_ID_MAX_LENGTH {
            return Err(ValueObjectError::UserIdTooLong(USER_ID_MAX_LENGTH));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 対局 ID（ストアが作成時に採番する）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Elo レーティング
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Rating(i32);

impl Rating {
    pub fn new(value: i32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i32 {
        self.0
    }
}

impl Default for Rating {
    fn default() -> Self {
        Self(DEFAULT_RATING)
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_valid() {
        // テスト項目: 通常の文字列から UserId を作成できる
        // given (前提条件):
        let value = "alice".to_string();

        // when (操作):
        let result = UserId::new(value);

        // then (期待する結果):
        assert_eq!(result.unwrap().as_str(), "alice");
    }

    #[test]
    fn test_user_id_empty_is_rejected() {
        // テスト項目: 空白のみの UserId はエラーになる
        // given (前提条件):
        let value = "   ".to_string();

        // when (操作):
        let result = UserId::new(value);

        // then (期待する結果):
        assert_eq!(result, Err(ValueObjectError::UserIdEmpty));
    }

    #[test]
    fn test_user_id_too_long_is_rejected() {
        // テスト項目: 最大長を超える UserId はエラーになる
        // given (前提条件):
        let value = "a".repeat(USER_ID_MAX_LENGTH + 1);

        // when (操作):
        let result = UserId::try_from(value);

        // then (期待する結果):
        assert_eq!(
            result,
            Err(ValueObjectError::UserIdTooLong(USER_ID_MAX_LENGTH))
        );
    }

    #[test]
    fn test_rating_default_is_1200() {
        assert_eq!(Rating::default().value(), 1200);
    }
}
