use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Giver -> receiver edge keyed by the integer ids handed out during a token import
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Pair {
    pub giver_id: i32,
    pub giver_name: String,
    pub receiver_id: i32,
    pub receiver_name: String,
}

/// Bearer credential bound to one giver. No expiry.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AuthToken {
    pub token: String,
    pub giver_id: i32,
    pub created_at: NaiveDateTime,
}

impl AuthToken {
    pub fn new(token: String, giver_id: i32) -> Self {
        Self {
            token,
            giver_id,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}
