#![allow(dead_code)]

use secret_santa_backend::config::{AppConfig, SlugCollisionPolicy};
use secret_santa_backend::repositories::{InMemoryStore, Stores};
use secret_santa_backend::services::{
    LookupService, NamedLocks, SeedService, TokenImportService, TokenIssuer,
};
use secret_santa_backend::AppState;
use sqlx::PgPool;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const BASE_URL: &str = "https://santa.example.com";

/// Family CSV for a three-person cycle
pub const ROSSI_CSV: &str = "rossi\ngiver,receiver\nAna,Luis\nLuis,Marta\nMarta,Ana\n";

/// Token CSV for a three-person cycle
pub const PAIRS_CSV: &str = "giver,receiver\nAlice,Bob\nBob,Carol\nCarol,Alice\n";

/// Hands out `token-1`, `token-2`, ... so tests can predict tokens
#[derive(Default)]
pub struct SequentialTokenIssuer {
    next: AtomicUsize,
}

impl TokenIssuer for SequentialTokenIssuer {
    fn mint(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        format!("token-{}", n)
    }
}

/// Every service wired over one in-memory store
pub struct TestContext {
    pub store: InMemoryStore,
    pub stores: Stores,
    pub seeding: SeedService,
    pub token_import: TokenImportService,
    pub lookup: LookupService,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_policy(SlugCollisionPolicy::Reject)
    }

    pub fn with_policy(policy: SlugCollisionPolicy) -> Self {
        let store = InMemoryStore::new();
        let stores = Stores::in_memory(store.clone());
        Self::from_stores(store, stores, policy)
    }

    fn from_stores(store: InMemoryStore, stores: Stores, policy: SlugCollisionPolicy) -> Self {
        let locks = Arc::new(NamedLocks::new());
        Self {
            seeding: SeedService::new(&stores, locks.clone(), policy, BASE_URL),
            token_import: TokenImportService::new(
                stores.tokens.clone(),
                Arc::new(SequentialTokenIssuer::default()),
                locks,
                BASE_URL,
            ),
            lookup: LookupService::new(&stores),
            store,
            stores,
        }
    }
}

/// Config pointing generated links at [`BASE_URL`]
pub fn test_config() -> AppConfig {
    AppConfig {
        base_url: BASE_URL.to_string(),
        ..AppConfig::default()
    }
}

/// HTTP state over a fresh in-memory store
pub fn in_memory_state() -> AppState {
    AppState::in_memory(InMemoryStore::new(), test_config())
}

/// Services over PostgreSQL (useful with sqlx::test)
pub struct TestDatabase {
    pub pool: PgPool,
    pub stores: Stores,
    pub seeding: SeedService,
    pub token_import: TokenImportService,
    pub lookup: LookupService,
}

impl TestDatabase {
    pub async fn from_pool(pool: PgPool) -> Self {
        let stores = Stores::postgres(pool.clone());
        let locks = Arc::new(NamedLocks::new());
        Self {
            seeding: SeedService::new(&stores, locks.clone(), SlugCollisionPolicy::Reject, BASE_URL),
            token_import: TokenImportService::new(
                stores.tokens.clone(),
                Arc::new(SequentialTokenIssuer::default()),
                locks,
                BASE_URL,
            ),
            lookup: LookupService::new(&stores),
            stores,
            pool,
        }
    }

    /// Clean up all test data
    pub async fn cleanup(&self) {
        sqlx::query(
            "TRUNCATE TABLE wishlists, assignments, members, family_groups, auth_tokens, pairs CASCADE",
        )
        .execute(&self.pool)
        .await
        .expect("Failed to cleanup test data");
    }
}
