//! User seed file DTOs.
//!
//! The seed file is a JSON array of user records:
//!
//! ```json
//! [{"id": "u-1", "email": "alice@example.com", "access_token": "secret", "rating": 1500}]
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    pub access_token: String,
    /// Defaults to the initial rating when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<i32>,
}
