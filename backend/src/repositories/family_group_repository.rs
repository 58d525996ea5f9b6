use super::FamilyStore;
use crate::error::RepositoryResult;
use crate::models::FamilyGroup;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Repository for family group data access
pub struct FamilyGroupRepository {
    pool: PgPool,
}

impl FamilyGroupRepository {
    /// Create a new FamilyGroupRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a family group by UUID
    pub async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<FamilyGroup>> {
        let group = sqlx::query_as::<_, FamilyGroup>(
            r#"
            SELECT id, slug, name, created_at
            FROM family_groups
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(group)
    }
}

#[async_trait]
impl FamilyStore for FamilyGroupRepository {
    async fn upsert_by_slug(&self, slug: &str, name: &str) -> RepositoryResult<FamilyGroup> {
        let inserted = sqlx::query_as::<_, FamilyGroup>(
            r#"
            INSERT INTO family_groups (slug, name)
            VALUES ($1, $2)
            ON CONFLICT (slug) DO NOTHING
            RETURNING id, slug, name, created_at
            "#,
        )
        .bind(slug)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(group) = inserted {
            return Ok(group);
        }

        // Slug already taken: the stored row is authoritative
        let existing = sqlx::query_as::<_, FamilyGroup>(
            r#"
            SELECT id, slug, name, created_at
            FROM family_groups
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_one(&self.pool)
        .await?;

        Ok(existing)
    }

    async fn find_by_slug(&self, slug: &str) -> RepositoryResult<Option<FamilyGroup>> {
        let group = sqlx::query_as::<_, FamilyGroup>(
            r#"
            SELECT id, slug, name, created_at
            FROM family_groups
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(group)
    }
}
