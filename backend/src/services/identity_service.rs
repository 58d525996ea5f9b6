use crate::config::SlugCollisionPolicy;
use crate::error::{AppResult, IngestError};
use crate::models::{FamilyGroup, Member, WishlistKey};
use crate::repositories::{MemberStore, WishlistStore};
use crate::slug::slugify;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// One member to upsert and every CSV spelling that maps onto it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMember {
    pub slug: String,
    /// First entry is the name used when the member is created
    pub names: Vec<String>,
}

/// Compute slugs for every distinct name before anything is written.
///
/// Fails on names that produce an empty slug, and on two distinct names
/// sharing a slug unless `policy` is [`SlugCollisionPolicy::Merge`].
pub fn plan_members(
    names: &[String],
    policy: SlugCollisionPolicy,
) -> Result<Vec<PlannedMember>, IngestError> {
    let mut planned: Vec<PlannedMember> = Vec::with_capacity(names.len());
    let mut by_slug: HashMap<String, usize> = HashMap::new();

    for name in names {
        let slug = slugify(name);
        if slug.is_empty() {
            return Err(IngestError::Format(format!(
                "Name {:?} does not produce a usable slug",
                name
            )));
        }

        match by_slug.get(&slug) {
            None => {
                by_slug.insert(slug.clone(), planned.len());
                planned.push(PlannedMember {
                    slug,
                    names: vec![name.clone()],
                });
            }
            Some(&idx) => {
                let entry = &mut planned[idx];
                if entry.names.contains(name) {
                    continue;
                }
                match policy {
                    SlugCollisionPolicy::Reject => {
                        return Err(IngestError::SlugCollision {
                            slug,
                            first: entry.names[0].clone(),
                            second: name.clone(),
                        });
                    }
                    SlugCollisionPolicy::Merge => {
                        warn!(
                            "Name {:?} collides with {:?} on slug {}; merging into one member",
                            name, entry.names[0], slug
                        );
                        entry.names.push(name.clone());
                    }
                }
            }
        }
    }

    Ok(planned)
}

/// Name -> member mapping produced by an identity upsert
#[derive(Debug, Clone, Default)]
pub struct ParticipantDirectory {
    by_name: HashMap<String, Member>,
}

impl ParticipantDirectory {
    pub fn insert(&mut self, name: impl Into<String>, member: Member) {
        self.by_name.insert(name.into(), member);
    }

    pub fn get(&self, name: &str) -> Option<&Member> {
        self.by_name.get(name)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Outcome of upserting one planned member
#[derive(Debug, Clone)]
pub struct UpsertedMember {
    pub member: Member,
    pub created: bool,
}

#[derive(Debug, Clone, Default)]
pub struct IdentityReport {
    pub directory: ParticipantDirectory,
    /// In plan order
    pub members: Vec<UpsertedMember>,
}

/// Idempotent upsert of members and their wishlist rows
pub struct IdentityService {
    members: Arc<dyn MemberStore>,
    wishlists: Arc<dyn WishlistStore>,
}

impl IdentityService {
    pub fn new(members: Arc<dyn MemberStore>, wishlists: Arc<dyn WishlistStore>) -> Self {
        Self { members, wishlists }
    }

    /// Upsert every planned member of `family` and make sure each has a wishlist.
    ///
    /// A member found by `(family, slug)` keeps its stored name. Existing
    /// wishlist content is never touched.
    pub async fn upsert_participants(
        &self,
        family: &FamilyGroup,
        plan: &[PlannedMember],
    ) -> AppResult<IdentityReport> {
        let mut report = IdentityReport::default();

        for planned in plan {
            let display_name = &planned.names[0];
            let upsert = self
                .members
                .upsert(family.id, display_name, &planned.slug)
                .await?;

            if upsert.created {
                info!(
                    "Created member {} (slug={}) -> id={}",
                    upsert.member.name, upsert.member.slug, upsert.member.id
                );
            } else {
                info!(
                    "Found existing member {} (slug={}) -> id={}",
                    upsert.member.name, upsert.member.slug, upsert.member.id
                );
            }

            self.wishlists
                .ensure(WishlistKey::Member(upsert.member.id))
                .await?;

            for name in &planned.names {
                report.directory.insert(name.clone(), upsert.member.clone());
            }
            report.members.push(UpsertedMember {
                member: upsert.member,
                created: upsert.created,
            });
        }

        Ok(report)
    }
}
