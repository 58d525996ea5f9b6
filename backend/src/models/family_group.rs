use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One exchange instance, addressed by a globally unique slug
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FamilyGroup {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub created_at: NaiveDateTime,
}

impl FamilyGroup {
    pub fn new(slug: String, name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            slug,
            name,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}
