use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Directed giver -> receiver edge inside one family group
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: Uuid,
    pub family_group_id: Uuid,
    pub giver_id: Uuid,
    pub receiver_id: Uuid,
    pub created_at: NaiveDateTime,
}

impl Assignment {
    pub fn new(family_group_id: Uuid, giver_id: Uuid, receiver_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            family_group_id,
            giver_id,
            receiver_id,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    /// Same logical edge, ignoring row identity
    pub fn edge(&self) -> (Uuid, Uuid) {
        (self.giver_id, self.receiver_id)
    }
}
