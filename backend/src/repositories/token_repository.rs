use super::{TokenRoster, TokenStore, TOKEN_ROSTER_LOCK_KEY};
use crate::error::RepositoryResult;
use crate::models::{AuthToken, Pair};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

/// Repository for the token-routed model: pairs, auth tokens, participant wishlists
pub struct TokenRepository {
    pool: PgPool,
}

impl TokenRepository {
    /// Create a new TokenRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenStore for TokenRepository {
    async fn replace_all(&self, roster: &TokenRoster) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(TOKEN_ROSTER_LOCK_KEY)
            .execute(&mut *tx)
            .await?;

        let tokens = sqlx::query("DELETE FROM auth_tokens")
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let wishlists = sqlx::query("DELETE FROM wishlists WHERE participant_id IS NOT NULL")
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let pairs = sqlx::query("DELETE FROM pairs")
            .execute(&mut *tx)
            .await?
            .rows_affected();

        debug!(tokens, wishlists, pairs, "Cleared previous token roster");

        for pair in &roster.pairs {
            sqlx::query(
                r#"
                INSERT INTO pairs (giver_id, giver_name, receiver_id, receiver_name)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(pair.giver_id)
            .bind(&pair.giver_name)
            .bind(pair.receiver_id)
            .bind(&pair.receiver_name)
            .execute(&mut *tx)
            .await?;
        }

        for token in &roster.tokens {
            sqlx::query(
                r#"
                INSERT INTO auth_tokens (token, giver_id, created_at)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(&token.token)
            .bind(token.giver_id)
            .bind(token.created_at)
            .execute(&mut *tx)
            .await?;
        }

        for &participant_id in &roster.wishlist_owners {
            sqlx::query(
                r#"
                INSERT INTO wishlists (participant_id, content)
                VALUES ($1, '')
                "#,
            )
            .bind(participant_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn find_token(&self, token: &str) -> RepositoryResult<Option<AuthToken>> {
        let row = sqlx::query_as::<_, AuthToken>(
            r#"
            SELECT token, giver_id, created_at
            FROM auth_tokens
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_pair_by_giver(&self, giver_id: i32) -> RepositoryResult<Option<Pair>> {
        let pair = sqlx::query_as::<_, Pair>(
            r#"
            SELECT giver_id, giver_name, receiver_id, receiver_name
            FROM pairs
            WHERE giver_id = $1
            "#,
        )
        .bind(giver_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(pair)
    }

    async fn list_pairs(&self) -> RepositoryResult<Vec<Pair>> {
        let pairs = sqlx::query_as::<_, Pair>(
            r#"
            SELECT giver_id, giver_name, receiver_id, receiver_name
            FROM pairs
            ORDER BY giver_id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(pairs)
    }
}
