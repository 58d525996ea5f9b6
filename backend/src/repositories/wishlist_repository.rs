use super::WishlistStore;
use crate::error::{RepositoryError, RepositoryResult};
use crate::models::{Wishlist, WishlistKey};
use async_trait::async_trait;
use sqlx::PgPool;

/// Repository for wishlist data access under either keying
pub struct WishlistRepository {
    pool: PgPool,
}

/// Owner column for a key; values come from a closed set, never from input
fn owner_column(key: WishlistKey) -> &'static str {
    match key {
        WishlistKey::Member(_) => "member_id",
        WishlistKey::Participant(_) => "participant_id",
    }
}

impl WishlistRepository {
    /// Create a new WishlistRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_keyed(
        &self,
        sql: &str,
        key: WishlistKey,
        content: Option<&str>,
    ) -> RepositoryResult<Option<Wishlist>> {
        let query = sqlx::query_as::<_, Wishlist>(sql);
        let query = match key {
            WishlistKey::Member(id) => query.bind(id),
            WishlistKey::Participant(id) => query.bind(id),
        };
        let query = match content {
            Some(content) => query.bind(content.to_string()),
            None => query,
        };
        Ok(query.fetch_optional(&self.pool).await?)
    }
}

#[async_trait]
impl WishlistStore for WishlistRepository {
    async fn ensure(&self, key: WishlistKey) -> RepositoryResult<Wishlist> {
        let column = owner_column(key);
        let insert = format!(
            r#"
            INSERT INTO wishlists ({column}, content)
            VALUES ($1, '')
            ON CONFLICT ({column}) DO NOTHING
            RETURNING id, member_id, participant_id, content, updated_at
            "#
        );

        if let Some(created) = self.fetch_one_keyed(&insert, key, None).await? {
            return Ok(created);
        }

        self.find(key)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("Wishlist {}", key)))
    }

    async fn save(&self, key: WishlistKey, content: &str) -> RepositoryResult<Wishlist> {
        let column = owner_column(key);
        let upsert = format!(
            r#"
            INSERT INTO wishlists ({column}, content)
            VALUES ($1, $2)
            ON CONFLICT ({column}) DO UPDATE
            SET content = EXCLUDED.content, updated_at = NOW()
            RETURNING id, member_id, participant_id, content, updated_at
            "#
        );

        self.fetch_one_keyed(&upsert, key, Some(content))
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("Wishlist {}", key)))
    }

    async fn find(&self, key: WishlistKey) -> RepositoryResult<Option<Wishlist>> {
        let column = owner_column(key);
        let select = format!(
            r#"
            SELECT id, member_id, participant_id, content, updated_at
            FROM wishlists
            WHERE {column} = $1
            "#
        );

        self.fetch_one_keyed(&select, key, None).await
    }
}
