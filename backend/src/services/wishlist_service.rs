use crate::error::{AppError, AppResult};
use crate::models::{Wishlist, WishlistKey};
use crate::repositories::{MemberStore, WishlistStore};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Read/save of wishlist content under either keying. Full replace, last write wins.
pub struct WishlistService {
    wishlists: Arc<dyn WishlistStore>,
    members: Arc<dyn MemberStore>,
}

impl WishlistService {
    pub fn new(wishlists: Arc<dyn WishlistStore>, members: Arc<dyn MemberStore>) -> Self {
        Self { wishlists, members }
    }

    /// Content for `key`, or an empty string when no row exists yet
    pub async fn read(&self, key: WishlistKey) -> AppResult<String> {
        Ok(self
            .wishlists
            .find(key)
            .await?
            .map(|w| w.content)
            .unwrap_or_default())
    }

    /// Create or overwrite the content for `key`
    pub async fn save(&self, key: WishlistKey, content: &str) -> AppResult<Wishlist> {
        let wishlist = self.wishlists.save(key, content).await?;
        info!("Saved wishlist for {} ({} bytes)", key, content.len());
        Ok(wishlist)
    }

    /// Save keyed by member id; the member must exist
    pub async fn save_for_member(&self, member_id: Uuid, content: &str) -> AppResult<Wishlist> {
        if self.members.find_by_id(member_id).await?.is_none() {
            return Err(AppError::NotFound("Member not found".to_string()));
        }
        self.save(WishlistKey::Member(member_id), content).await
    }
}
