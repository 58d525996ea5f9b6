use super::assignment_service::{AssignmentService, DroppedPair};
use super::identity_service::{plan_members, IdentityService};
use super::locks::NamedLocks;
use crate::config::SlugCollisionPolicy;
use crate::error::{AppError, AppResult};
use crate::ingest::{member_link, parse_family_csv, SkippedRow};
use crate::models::{Assignment, FamilyGroup};
use crate::repositories::{family_seed_lock_key, FamilyStore, Stores};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Shareable link for one seeded member
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeededMember {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub created: bool,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct FamilySeedReport {
    pub family: FamilyGroup,
    pub members: Vec<SeededMember>,
    pub assignments: Vec<Assignment>,
    pub skipped_rows: Vec<SkippedRow>,
    pub dropped_pairs: Vec<DroppedPair>,
}

/// Slug-model seeding: family CSV -> family, members, wishlists, assignments
pub struct SeedService {
    families: Arc<dyn FamilyStore>,
    identity: IdentityService,
    assignments: AssignmentService,
    locks: Arc<NamedLocks>,
    policy: SlugCollisionPolicy,
    base_url: String,
}

impl SeedService {
    pub fn new(
        stores: &Stores,
        locks: Arc<NamedLocks>,
        policy: SlugCollisionPolicy,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            families: stores.families.clone(),
            identity: IdentityService::new(stores.members.clone(), stores.wishlists.clone()),
            assignments: AssignmentService::new(stores.assignments.clone()),
            locks,
            policy,
            base_url: base_url.into(),
        }
    }

    /// Seed one family from the slug / header / pairs layout.
    ///
    /// Parsing and slug planning finish before the first write, so a
    /// format error or slug collision leaves the store untouched.
    pub async fn seed_family(
        &self,
        raw_csv: &str,
        family_name: Option<&str>,
    ) -> AppResult<FamilySeedReport> {
        let parsed = parse_family_csv(raw_csv)?;
        let family_slug = parsed
            .family_slug
            .clone()
            .ok_or_else(|| AppError::Message("family layout produced no slug".to_string()))?;
        let plan = plan_members(&parsed.names, self.policy)?;

        info!("Family slug: {}", family_slug);
        info!("Participants: {}", parsed.names.join(", "));

        let _guard = self.locks.acquire(&family_seed_lock_key(&family_slug)).await;

        let family = self
            .families
            .upsert_by_slug(&family_slug, family_name.unwrap_or(&family_slug))
            .await?;
        info!("Using family group id={}, slug={}", family.id, family.slug);

        let identities = self.identity.upsert_participants(&family, &plan).await?;
        let rebuilt = self
            .assignments
            .rebuild(&family, &identities.directory, &parsed.pairs)
            .await?;

        let members = identities
            .members
            .iter()
            .map(|upserted| {
                Ok(SeededMember {
                    id: upserted.member.id,
                    name: upserted.member.name.clone(),
                    slug: upserted.member.slug.clone(),
                    created: upserted.created,
                    url: member_link(&self.base_url, &family.slug, &upserted.member.slug)?,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        info!(
            "Seeding family {} complete: {} members, {} assignments, {} skipped rows",
            family.slug,
            members.len(),
            rebuilt.assignments.len(),
            parsed.skipped.len()
        );

        Ok(FamilySeedReport {
            family,
            members,
            assignments: rebuilt.assignments,
            skipped_rows: parsed.skipped,
            dropped_pairs: rebuilt.dropped,
        })
    }
}
