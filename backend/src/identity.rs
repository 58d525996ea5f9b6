//! Participant identity resolution.
//!
//! Two credentials identify a participant: a `(family slug, member slug)`
//! path and an opaque bearer token. Both resolve through
//! [`ParticipantIdentity`] into the same [`Participant`] shape, so lookups
//! and wishlist operations are written once.

use crate::error::{AppError, AppResult};
use crate::models::{AuthToken, FamilyGroup, Member, WishlistKey};
use crate::repositories::{AssignmentStore, FamilyStore, MemberStore, TokenStore};
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Progress of a lookup. A failure reports the last stage reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupStage {
    Start,
    GroupResolved,
    MemberResolved,
    AssignmentResolved,
    WishlistsLoaded,
}

impl fmt::Display for LookupStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            LookupStage::Start => "start",
            LookupStage::GroupResolved => "group-resolved",
            LookupStage::MemberResolved => "member-resolved",
            LookupStage::AssignmentResolved => "assignment-resolved",
            LookupStage::WishlistsLoaded => "wishlists-loaded",
        };
        f.write_str(text)
    }
}

/// Short-circuit a lookup into the terminal not-found state
pub fn not_found(stage: LookupStage, reason: &str) -> AppError {
    debug!("Lookup stopped after {}: {}", stage, reason);
    AppError::NotFound(reason.to_string())
}

/// Where a resolved participant came from
#[derive(Debug, Clone)]
pub enum ParticipantOrigin {
    Member { family: FamilyGroup, member: Member },
    Token { giver_id: i32 },
}

/// The participant's assigned receiver
#[derive(Debug, Clone)]
pub struct Recipient {
    pub name: String,
    pub wishlist_key: WishlistKey,
    /// Set for slug-routed lookups
    pub member: Option<Member>,
}

/// A resolved giver and, when one exists, their receiver
#[derive(Debug, Clone)]
pub struct Participant {
    pub display_name: String,
    pub wishlist_key: WishlistKey,
    pub origin: ParticipantOrigin,
    pub recipient: Option<Recipient>,
}

/// One resolution strategy for one credential type
#[async_trait]
pub trait ParticipantIdentity: Send + Sync {
    type Credential: ?Sized + Sync;

    /// Resolve the credential to a participant and their outgoing assignment
    async fn resolve(&self, credential: &Self::Credential) -> AppResult<Participant>;
}

/// `(family slug, member slug)` credential
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SlugPath {
    pub family_slug: String,
    pub member_slug: String,
}

impl SlugPath {
    pub fn new(family_slug: impl Into<String>, member_slug: impl Into<String>) -> Self {
        Self {
            family_slug: family_slug.into(),
            member_slug: member_slug.into(),
        }
    }
}

/// Slug-routed resolution: family -> member -> assignment -> receiver
pub struct SlugPathResolver {
    families: Arc<dyn FamilyStore>,
    members: Arc<dyn MemberStore>,
    assignments: Arc<dyn AssignmentStore>,
}

impl SlugPathResolver {
    pub fn new(
        families: Arc<dyn FamilyStore>,
        members: Arc<dyn MemberStore>,
        assignments: Arc<dyn AssignmentStore>,
    ) -> Self {
        Self {
            families,
            members,
            assignments,
        }
    }

    /// Resolve only as far as the member
    pub async fn resolve_member(&self, path: &SlugPath) -> AppResult<(FamilyGroup, Member)> {
        let stage = LookupStage::Start;
        let family = self
            .families
            .find_by_slug(&path.family_slug)
            .await?
            .ok_or_else(|| not_found(stage, "Family not found"))?;

        let stage = LookupStage::GroupResolved;
        let member = self
            .members
            .find_by_slug(family.id, &path.member_slug)
            .await?
            .ok_or_else(|| not_found(stage, "Member not found"))?;

        Ok((family, member))
    }
}

#[async_trait]
impl ParticipantIdentity for SlugPathResolver {
    type Credential = SlugPath;

    async fn resolve(&self, path: &SlugPath) -> AppResult<Participant> {
        let (family, member) = self.resolve_member(path).await?;

        let assignment = self.assignments.find_by_giver(family.id, member.id).await?;
        let recipient = match assignment {
            None => None,
            Some(assignment) => {
                let receiver = self
                    .members
                    .find_by_id(assignment.receiver_id)
                    .await?
                    .ok_or_else(|| not_found(LookupStage::MemberResolved, "Receiver not found"))?;
                Some(Recipient {
                    name: receiver.name.clone(),
                    wishlist_key: WishlistKey::Member(receiver.id),
                    member: Some(receiver),
                })
            }
        };

        Ok(Participant {
            display_name: member.name.clone(),
            wishlist_key: WishlistKey::Member(member.id),
            origin: ParticipantOrigin::Member { family, member },
            recipient,
        })
    }
}

/// Token-routed resolution: token -> giver id -> pair -> receiver
pub struct TokenResolver {
    tokens: Arc<dyn TokenStore>,
}

impl TokenResolver {
    pub fn new(tokens: Arc<dyn TokenStore>) -> Self {
        Self { tokens }
    }

    /// Check token possession only. Missing, blank and unknown tokens all
    /// produce [`AppError::Unauthenticated`].
    pub async fn authenticate(&self, token: Option<&str>) -> AppResult<AuthToken> {
        let token = match token.map(str::trim) {
            Some(token) if !token.is_empty() => token,
            _ => return Err(AppError::Unauthenticated),
        };

        self.tokens
            .find_token(token)
            .await?
            .ok_or(AppError::Unauthenticated)
    }
}

#[async_trait]
impl ParticipantIdentity for TokenResolver {
    type Credential = str;

    async fn resolve(&self, token: &str) -> AppResult<Participant> {
        let auth = self.authenticate(Some(token)).await?;

        let pair = self
            .tokens
            .find_pair_by_giver(auth.giver_id)
            .await?
            .ok_or_else(|| not_found(LookupStage::MemberResolved, "No pair found for this participant"))?;

        Ok(Participant {
            display_name: pair.giver_name.clone(),
            wishlist_key: WishlistKey::Participant(auth.giver_id),
            origin: ParticipantOrigin::Token {
                giver_id: auth.giver_id,
            },
            recipient: Some(Recipient {
                name: pair.receiver_name,
                wishlist_key: WishlistKey::Participant(pair.receiver_id),
                member: None,
            }),
        })
    }
}
