//! In-process store used by tests and local dry runs.
//!
//! One `RwLock` guards all tables, so every trait method is atomic with
//! respect to every other, including the replace operations.

use super::{
    AssignmentStore, FamilyStore, MemberStore, MemberUpsert, TokenRoster, TokenStore, WishlistStore,
};
use crate::error::{RepositoryError, RepositoryResult};
use crate::models::{Assignment, AuthToken, FamilyGroup, Member, Pair, Wishlist, WishlistKey};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct MemoryState {
    families: Vec<FamilyGroup>,
    members: Vec<Member>,
    wishlists: Vec<Wishlist>,
    assignments: Vec<Assignment>,
    pairs: Vec<Pair>,
    tokens: HashMap<String, AuthToken>,
}

impl MemoryState {
    fn wishlist_mut(&mut self, key: WishlistKey) -> Option<&mut Wishlist> {
        self.wishlists.iter_mut().find(|w| w.key() == Some(key))
    }
}

/// Shared in-memory implementation of every store trait
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of auth tokens currently stored
    pub async fn token_count(&self) -> usize {
        self.state.read().await.tokens.len()
    }

    /// Number of wishlist rows of either keying
    pub async fn wishlist_count(&self) -> usize {
        self.state.read().await.wishlists.len()
    }
}

#[async_trait]
impl FamilyStore for InMemoryStore {
    async fn upsert_by_slug(&self, slug: &str, name: &str) -> RepositoryResult<FamilyGroup> {
        let mut state = self.state.write().await;
        if let Some(existing) = state.families.iter().find(|f| f.slug == slug) {
            return Ok(existing.clone());
        }
        let group = FamilyGroup::new(slug.to_string(), name.to_string());
        state.families.push(group.clone());
        Ok(group)
    }

    async fn find_by_slug(&self, slug: &str) -> RepositoryResult<Option<FamilyGroup>> {
        let state = self.state.read().await;
        Ok(state.families.iter().find(|f| f.slug == slug).cloned())
    }
}

#[async_trait]
impl MemberStore for InMemoryStore {
    async fn upsert(&self, family_id: Uuid, name: &str, slug: &str) -> RepositoryResult<MemberUpsert> {
        let mut state = self.state.write().await;
        if !state.families.iter().any(|f| f.id == family_id) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "family group {} does not exist",
                family_id
            )));
        }
        if let Some(existing) = state
            .members
            .iter()
            .find(|m| m.family_group_id == family_id && m.slug == slug)
        {
            return Ok(MemberUpsert {
                member: existing.clone(),
                created: false,
            });
        }
        let member = Member::new(family_id, name.to_string(), slug.to_string());
        state.members.push(member.clone());
        Ok(MemberUpsert {
            member,
            created: true,
        })
    }

    async fn find_by_slug(&self, family_id: Uuid, slug: &str) -> RepositoryResult<Option<Member>> {
        let state = self.state.read().await;
        Ok(state
            .members
            .iter()
            .find(|m| m.family_group_id == family_id && m.slug == slug)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Member>> {
        let state = self.state.read().await;
        Ok(state.members.iter().find(|m| m.id == id).cloned())
    }

    async fn list_by_family(&self, family_id: Uuid) -> RepositoryResult<Vec<Member>> {
        let state = self.state.read().await;
        Ok(state
            .members
            .iter()
            .filter(|m| m.family_group_id == family_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl WishlistStore for InMemoryStore {
    async fn ensure(&self, key: WishlistKey) -> RepositoryResult<Wishlist> {
        let mut state = self.state.write().await;
        if let Some(existing) = state.wishlist_mut(key) {
            return Ok(existing.clone());
        }
        let wishlist = Wishlist::new(key, String::new());
        state.wishlists.push(wishlist.clone());
        Ok(wishlist)
    }

    async fn save(&self, key: WishlistKey, content: &str) -> RepositoryResult<Wishlist> {
        let mut state = self.state.write().await;
        if let WishlistKey::Member(id) = key {
            if !state.members.iter().any(|m| m.id == id) {
                return Err(RepositoryError::ConstraintViolation(format!(
                    "member {} does not exist",
                    id
                )));
            }
        }
        if let Some(existing) = state.wishlist_mut(key) {
            existing.content = content.to_string();
            existing.updated_at = chrono::Utc::now().naive_utc();
            return Ok(existing.clone());
        }
        let wishlist = Wishlist::new(key, content.to_string());
        state.wishlists.push(wishlist.clone());
        Ok(wishlist)
    }

    async fn find(&self, key: WishlistKey) -> RepositoryResult<Option<Wishlist>> {
        let state = self.state.read().await;
        Ok(state
            .wishlists
            .iter()
            .find(|w| w.key() == Some(key))
            .cloned())
    }
}

#[async_trait]
impl AssignmentStore for InMemoryStore {
    async fn replace_for_family(
        &self,
        family: &FamilyGroup,
        edges: &[(Uuid, Uuid)],
    ) -> RepositoryResult<Vec<Assignment>> {
        let mut state = self.state.write().await;

        let mut seen_givers = Vec::with_capacity(edges.len());
        for &(giver_id, _) in edges {
            if seen_givers.contains(&giver_id) {
                return Err(RepositoryError::Duplicate(format!(
                    "assignment for giver {} in family {}",
                    giver_id, family.slug
                )));
            }
            seen_givers.push(giver_id);
        }

        state.assignments.retain(|a| a.family_group_id != family.id);
        let created: Vec<Assignment> = edges
            .iter()
            .map(|&(giver_id, receiver_id)| Assignment::new(family.id, giver_id, receiver_id))
            .collect();
        state.assignments.extend(created.iter().cloned());
        Ok(created)
    }

    async fn find_by_giver(
        &self,
        family_id: Uuid,
        giver_id: Uuid,
    ) -> RepositoryResult<Option<Assignment>> {
        let state = self.state.read().await;
        Ok(state
            .assignments
            .iter()
            .find(|a| a.family_group_id == family_id && a.giver_id == giver_id)
            .cloned())
    }

    async fn list_by_family(&self, family_id: Uuid) -> RepositoryResult<Vec<Assignment>> {
        let state = self.state.read().await;
        Ok(state
            .assignments
            .iter()
            .filter(|a| a.family_group_id == family_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TokenStore for InMemoryStore {
    async fn replace_all(&self, roster: &TokenRoster) -> RepositoryResult<()> {
        let mut state = self.state.write().await;

        let mut tokens = HashMap::with_capacity(roster.tokens.len());
        for token in &roster.tokens {
            if tokens.insert(token.token.clone(), token.clone()).is_some() {
                return Err(RepositoryError::Duplicate(format!("auth token {}", token.token)));
            }
        }

        state.tokens = tokens;
        state.pairs = roster.pairs.clone();
        state.wishlists.retain(|w| w.participant_id.is_none());
        for &participant_id in &roster.wishlist_owners {
            state
                .wishlists
                .push(Wishlist::new(WishlistKey::Participant(participant_id), String::new()));
        }
        Ok(())
    }

    async fn find_token(&self, token: &str) -> RepositoryResult<Option<AuthToken>> {
        let state = self.state.read().await;
        Ok(state.tokens.get(token).cloned())
    }

    async fn find_pair_by_giver(&self, giver_id: i32) -> RepositoryResult<Option<Pair>> {
        let state = self.state.read().await;
        Ok(state.pairs.iter().find(|p| p.giver_id == giver_id).cloned())
    }

    async fn list_pairs(&self) -> RepositoryResult<Vec<Pair>> {
        let state = self.state.read().await;
        let mut pairs = state.pairs.clone();
        pairs.sort_by_key(|p| p.giver_id);
        Ok(pairs)
    }
}
