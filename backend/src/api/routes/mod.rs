//! API route handlers

pub mod family;
pub mod health;
pub mod token;

use axum::{routing::get, routing::post, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Create the API router with tracing and, when enabled, permissive CORS
pub fn create_router(state: AppState) -> Router {
    let enable_cors = state.config.enable_cors;

    let mut router = Router::new()
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        // Token-routed participant endpoints
        .route("/api/me", get(token::whoami))
        .route(
            "/api/wishlist/me",
            get(token::get_my_wishlist).post(token::save_my_wishlist),
        )
        .route("/api/wishlist/recipient", get(token::get_recipient_wishlist))
        // Slug-routed member endpoints
        .route("/api/families/:slug/:member_slug", get(family::get_member_view))
        .route(
            "/api/families/:slug/:member_slug/wishlist",
            post(family::save_member_wishlist),
        )
        .route("/api/wishlist", post(family::save_wishlist_by_member_id))
        // State
        .with_state(state);

    router = router.layer(TraceLayer::new_for_http());

    if enable_cors {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router
}
