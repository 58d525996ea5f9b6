use super::{MemberStore, MemberUpsert};
use crate::error::RepositoryResult;
use crate::models::Member;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Repository for member data access
pub struct MemberRepository {
    pool: PgPool,
}

impl MemberRepository {
    /// Create a new MemberRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get member count for a family
    pub async fn count_by_family(&self, family_id: Uuid) -> RepositoryResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM members
            WHERE family_group_id = $1
            "#,
        )
        .bind(family_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}

#[async_trait]
impl MemberStore for MemberRepository {
    async fn upsert(&self, family_id: Uuid, name: &str, slug: &str) -> RepositoryResult<MemberUpsert> {
        let inserted = sqlx::query_as::<_, Member>(
            r#"
            INSERT INTO members (family_group_id, name, slug)
            VALUES ($1, $2, $3)
            ON CONFLICT (family_group_id, slug) DO NOTHING
            RETURNING id, family_group_id, name, slug, created_at
            "#,
        )
        .bind(family_id)
        .bind(name)
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(member) = inserted {
            return Ok(MemberUpsert {
                member,
                created: true,
            });
        }

        let member = sqlx::query_as::<_, Member>(
            r#"
            SELECT id, family_group_id, name, slug, created_at
            FROM members
            WHERE family_group_id = $1 AND slug = $2
            "#,
        )
        .bind(family_id)
        .bind(slug)
        .fetch_one(&self.pool)
        .await?;

        Ok(MemberUpsert {
            member,
            created: false,
        })
    }

    async fn find_by_slug(&self, family_id: Uuid, slug: &str) -> RepositoryResult<Option<Member>> {
        let member = sqlx::query_as::<_, Member>(
            r#"
            SELECT id, family_group_id, name, slug, created_at
            FROM members
            WHERE family_group_id = $1 AND slug = $2
            "#,
        )
        .bind(family_id)
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(member)
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Member>> {
        let member = sqlx::query_as::<_, Member>(
            r#"
            SELECT id, family_group_id, name, slug, created_at
            FROM members
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(member)
    }

    async fn list_by_family(&self, family_id: Uuid) -> RepositoryResult<Vec<Member>> {
        let members = sqlx::query_as::<_, Member>(
            r#"
            SELECT id, family_group_id, name, slug, created_at
            FROM members
            WHERE family_group_id = $1
            ORDER BY created_at ASC, slug ASC
            "#,
        )
        .bind(family_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(members)
    }
}
