//! Token-routed participant endpoints.
//!
//! Every handler takes `?token=`; a missing or unknown token is a 400
//! with `{"error": "Invalid or missing token"}`.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};
use serde_json::Value;

use crate::api::dto::{optional_content, ContentResponse, OkResponse, TokenQuery};
use crate::api::error::ApiResult;
use crate::services::{RecipientWishlist, WhoAmI};
use crate::AppState;

/// `GET /api/me`
pub async fn whoami(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> ApiResult<Json<WhoAmI>> {
    let who = state.lookup.whoami(query.token.as_deref()).await?;
    Ok(Json(who))
}

/// `GET /api/wishlist/me`
pub async fn get_my_wishlist(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> ApiResult<Json<ContentResponse>> {
    let content = state.lookup.my_wishlist(query.token.as_deref()).await?;
    Ok(Json(ContentResponse { content }))
}

/// `POST /api/wishlist/me` with `{ "content": "..." }`
///
/// A missing or null `content` saves an empty wishlist. Any other
/// non-string `content` (numbers, objects) is rejected with 400
/// `Invalid content` rather than stringified.
pub async fn save_my_wishlist(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<OkResponse>> {
    // Authenticate before looking at the body
    let auth = state.lookup.authenticate(query.token.as_deref()).await?;

    let Json(body) = body?;
    let content = optional_content(&body)?;
    state.lookup.save_for_token(&auth, &content).await?;

    Ok(Json(OkResponse { ok: true }))
}

/// `GET /api/wishlist/recipient`
pub async fn get_recipient_wishlist(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> ApiResult<Json<RecipientWishlist>> {
    let recipient = state
        .lookup
        .recipient_wishlist(query.token.as_deref())
        .await?;
    Ok(Json(recipient))
}
