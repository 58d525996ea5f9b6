use super::{family_seed_lock_key, AssignmentStore};
use crate::error::RepositoryResult;
use crate::models::{Assignment, FamilyGroup};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

/// Repository for assignment data access
pub struct AssignmentRepository {
    pool: PgPool,
}

impl AssignmentRepository {
    /// Create a new AssignmentRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AssignmentStore for AssignmentRepository {
    async fn replace_for_family(
        &self,
        family: &FamilyGroup,
        edges: &[(Uuid, Uuid)],
    ) -> RepositoryResult<Vec<Assignment>> {
        let mut tx = self.pool.begin().await?;

        // Serialises concurrent re-seeds of this family across processes
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(family_seed_lock_key(&family.slug))
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query(
            r#"
            DELETE FROM assignments
            WHERE family_group_id = $1
            "#,
        )
        .bind(family.id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        debug!(family = %family.slug, deleted, "Cleared previous assignments");

        let mut created = Vec::with_capacity(edges.len());
        for &(giver_id, receiver_id) in edges {
            let assignment = sqlx::query_as::<_, Assignment>(
                r#"
                INSERT INTO assignments (family_group_id, giver_id, receiver_id)
                VALUES ($1, $2, $3)
                RETURNING id, family_group_id, giver_id, receiver_id, created_at
                "#,
            )
            .bind(family.id)
            .bind(giver_id)
            .bind(receiver_id)
            .fetch_one(&mut *tx)
            .await?;
            created.push(assignment);
        }

        tx.commit().await?;
        Ok(created)
    }

    async fn find_by_giver(
        &self,
        family_id: Uuid,
        giver_id: Uuid,
    ) -> RepositoryResult<Option<Assignment>> {
        let assignment = sqlx::query_as::<_, Assignment>(
            r#"
            SELECT id, family_group_id, giver_id, receiver_id, created_at
            FROM assignments
            WHERE family_group_id = $1 AND giver_id = $2
            ORDER BY created_at ASC
            LIMIT 1
            "#,
        )
        .bind(family_id)
        .bind(giver_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(assignment)
    }

    async fn list_by_family(&self, family_id: Uuid) -> RepositoryResult<Vec<Assignment>> {
        let assignments = sqlx::query_as::<_, Assignment>(
            r#"
            SELECT id, family_group_id, giver_id, receiver_id, created_at
            FROM assignments
            WHERE family_group_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(family_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(assignments)
    }
}
