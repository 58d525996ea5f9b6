use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A participant within a family group; `(family_group_id, slug)` is unique
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: Uuid,
    pub family_group_id: Uuid,
    pub name: String,
    pub slug: String,
    pub created_at: NaiveDateTime,
}

impl Member {
    /// Create a new Member
    pub fn new(family_group_id: Uuid, name: String, slug: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            family_group_id,
            name,
            slug,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}
