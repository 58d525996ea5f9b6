//! Persistence seams.
//!
//! Every store is an `async_trait` object so services can be built over
//! PostgreSQL in production and over [`InMemoryStore`] in tests.

pub mod assignment_repository;
pub mod family_group_repository;
pub mod member_repository;
pub mod memory;
pub mod token_repository;
pub mod wishlist_repository;

// Re-export all repositories for convenient access
pub use assignment_repository::AssignmentRepository;
pub use family_group_repository::FamilyGroupRepository;
pub use member_repository::MemberRepository;
pub use memory::InMemoryStore;
pub use token_repository::TokenRepository;
pub use wishlist_repository::WishlistRepository;

use crate::error::RepositoryResult;
use crate::models::{Assignment, AuthToken, FamilyGroup, Member, Pair, Wishlist, WishlistKey};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Advisory lock key serialising re-seeds of one family
pub fn family_seed_lock_key(family_slug: &str) -> String {
    format!("seed:family:{}", family_slug)
}

/// Advisory lock key serialising token roster imports
pub const TOKEN_ROSTER_LOCK_KEY: &str = "seed:token-roster";

#[async_trait]
pub trait FamilyStore: Send + Sync {
    /// Return the group with `slug`, creating it with `name` if absent. Never renames.
    async fn upsert_by_slug(&self, slug: &str, name: &str) -> RepositoryResult<FamilyGroup>;

    async fn find_by_slug(&self, slug: &str) -> RepositoryResult<Option<FamilyGroup>>;
}

/// Result of [`MemberStore::upsert`]
#[derive(Debug, Clone)]
pub struct MemberUpsert {
    pub member: Member,
    /// False when an existing `(family, slug)` row was reused
    pub created: bool,
}

#[async_trait]
pub trait MemberStore: Send + Sync {
    /// Find by `(family_id, slug)` or insert. An existing row keeps its stored name.
    async fn upsert(&self, family_id: Uuid, name: &str, slug: &str) -> RepositoryResult<MemberUpsert>;

    async fn find_by_slug(&self, family_id: Uuid, slug: &str) -> RepositoryResult<Option<Member>>;

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Member>>;

    async fn list_by_family(&self, family_id: Uuid) -> RepositoryResult<Vec<Member>>;
}

#[async_trait]
pub trait WishlistStore: Send + Sync {
    /// Create an empty wishlist for `key` if none exists; existing content is untouched
    async fn ensure(&self, key: WishlistKey) -> RepositoryResult<Wishlist>;

    /// Create or fully replace the content for `key`
    async fn save(&self, key: WishlistKey, content: &str) -> RepositoryResult<Wishlist>;

    async fn find(&self, key: WishlistKey) -> RepositoryResult<Option<Wishlist>>;
}

#[async_trait]
pub trait AssignmentStore: Send + Sync {
    /// Atomically swap the family's assignment set for `edges` (giver, receiver).
    ///
    /// Readers observe either the previous set or the new one.
    async fn replace_for_family(
        &self,
        family: &FamilyGroup,
        edges: &[(Uuid, Uuid)],
    ) -> RepositoryResult<Vec<Assignment>>;

    /// First assignment where `giver_id` gives inside the family
    async fn find_by_giver(
        &self,
        family_id: Uuid,
        giver_id: Uuid,
    ) -> RepositoryResult<Option<Assignment>>;

    async fn list_by_family(&self, family_id: Uuid) -> RepositoryResult<Vec<Assignment>>;
}

/// Everything a token import persists, written as one unit
#[derive(Debug, Clone, Default)]
pub struct TokenRoster {
    pub pairs: Vec<Pair>,
    pub tokens: Vec<AuthToken>,
    /// Participant ids that receive an empty wishlist
    pub wishlist_owners: Vec<i32>,
}

#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Clear every token, pair and participant wishlist, then insert `roster`
    async fn replace_all(&self, roster: &TokenRoster) -> RepositoryResult<()>;

    async fn find_token(&self, token: &str) -> RepositoryResult<Option<AuthToken>>;

    async fn find_pair_by_giver(&self, giver_id: i32) -> RepositoryResult<Option<Pair>>;

    async fn list_pairs(&self) -> RepositoryResult<Vec<Pair>>;
}

/// Handles to every store, shared by services and the API
#[derive(Clone)]
pub struct Stores {
    pub families: Arc<dyn FamilyStore>,
    pub members: Arc<dyn MemberStore>,
    pub wishlists: Arc<dyn WishlistStore>,
    pub assignments: Arc<dyn AssignmentStore>,
    pub tokens: Arc<dyn TokenStore>,
}

impl Stores {
    /// PostgreSQL-backed stores sharing one pool
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            families: Arc::new(FamilyGroupRepository::new(pool.clone())),
            members: Arc::new(MemberRepository::new(pool.clone())),
            wishlists: Arc::new(WishlistRepository::new(pool.clone())),
            assignments: Arc::new(AssignmentRepository::new(pool.clone())),
            tokens: Arc::new(TokenRepository::new(pool)),
        }
    }

    /// Every store backed by the same in-memory state
    pub fn in_memory(store: InMemoryStore) -> Self {
        Self {
            families: Arc::new(store.clone()),
            members: Arc::new(store.clone()),
            wishlists: Arc::new(store.clone()),
            assignments: Arc::new(store.clone()),
            tokens: Arc::new(store),
        }
    }
}
