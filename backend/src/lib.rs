//! Secret Santa Backend Library
//!
//! Gift-exchange seeding, participant lookup and wishlists, exposed for
//! the `secret-santa` binary and for tests.

pub mod api;
pub mod config;
pub mod database;
pub mod error;
pub mod identity;
pub mod ingest;
pub mod models;
pub mod repositories;
pub mod services;
pub mod slug;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, AppResult};

use database::Database;
use repositories::{InMemoryStore, Stores};
use services::{LookupService, NamedLocks, RandomTokenIssuer, SeedService, TokenImportService};
use std::sync::Arc;

/// Application state shared by the HTTP handlers and the seeding commands
#[derive(Clone)]
pub struct AppState {
    /// Present when backed by PostgreSQL; used by the readiness probe
    pub database: Option<Database>,
    pub stores: Stores,
    pub lookup: Arc<LookupService>,
    pub seeding: Arc<SeedService>,
    pub token_import: Arc<TokenImportService>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Build every service over `stores`
    pub fn new(stores: Stores, config: AppConfig) -> Self {
        let locks = Arc::new(NamedLocks::new());

        Self {
            database: None,
            lookup: Arc::new(LookupService::new(&stores)),
            seeding: Arc::new(SeedService::new(
                &stores,
                locks.clone(),
                config.slug_collision_policy,
                config.base_url.clone(),
            )),
            token_import: Arc::new(TokenImportService::new(
                stores.tokens.clone(),
                Arc::new(RandomTokenIssuer),
                locks,
                config.base_url.clone(),
            )),
            stores,
            config: Arc::new(config),
        }
    }

    /// State backed by PostgreSQL
    pub fn postgres(pool: sqlx::PgPool, config: AppConfig) -> Self {
        let database = Database::new(pool.clone());
        let mut state = Self::new(Stores::postgres(pool), config);
        state.database = Some(database);
        state
    }

    /// State backed by a fresh [`InMemoryStore`]
    pub fn in_memory(store: InMemoryStore, config: AppConfig) -> Self {
        Self::new(Stores::in_memory(store), config)
    }
}
