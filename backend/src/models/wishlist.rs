use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// Which identity model owns a wishlist row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WishlistKey {
    /// Slug-routed member
    Member(Uuid),
    /// Token-routed participant id
    Participant(i32),
}

impl fmt::Display for WishlistKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WishlistKey::Member(id) => write!(f, "member:{}", id),
            WishlistKey::Participant(id) => write!(f, "participant:{}", id),
        }
    }
}

/// Free-text wish content. Exactly one of `member_id` / `participant_id` is set.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Wishlist {
    pub id: Uuid,
    pub member_id: Option<Uuid>,
    pub participant_id: Option<i32>,
    pub content: String,
    pub updated_at: NaiveDateTime,
}

impl Wishlist {
    /// Create a wishlist row for the given owner
    pub fn new(key: WishlistKey, content: String) -> Self {
        let (member_id, participant_id) = match key {
            WishlistKey::Member(id) => (Some(id), None),
            WishlistKey::Participant(id) => (None, Some(id)),
        };
        Self {
            id: Uuid::new_v4(),
            member_id,
            participant_id,
            content,
            updated_at: chrono::Utc::now().naive_utc(),
        }
    }

    /// The owner this row is keyed by
    pub fn key(&self) -> Option<WishlistKey> {
        match (self.member_id, self.participant_id) {
            (Some(id), None) => Some(WishlistKey::Member(id)),
            (None, Some(id)) => Some(WishlistKey::Participant(id)),
            _ => None,
        }
    }
}
