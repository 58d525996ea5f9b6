//! Slug-routed member endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde_json::Value;

use crate::api::dto::{
    member_wishlist_fields, optional_content, SavedBySlugResponse, SavedWishlistResponse,
};
use crate::api::error::ApiResult;
use crate::services::MemberView;
use crate::AppState;

/// `GET /api/families/:slug/:member_slug`
pub async fn get_member_view(
    State(state): State<AppState>,
    Path((slug, member_slug)): Path<(String, String)>,
) -> ApiResult<Json<MemberView>> {
    let view = state.lookup.member_view(&slug, &member_slug).await?;
    Ok(Json(view))
}

/// `POST /api/families/:slug/:member_slug/wishlist`
pub async fn save_member_wishlist(
    State(state): State<AppState>,
    Path((slug, member_slug)): Path<(String, String)>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<SavedBySlugResponse>> {
    let Json(body) = body?;
    let content = optional_content(&body)?;

    let wishlist = state
        .lookup
        .save_wishlist_by_slug(&slug, &member_slug, &content)
        .await?;

    Ok(Json(SavedBySlugResponse {
        success: true,
        wishlist,
    }))
}

/// `POST /api/wishlist` with `{ "memberId": "...", "content": "..." }`
pub async fn save_wishlist_by_member_id(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<SavedWishlistResponse>> {
    let Json(body) = body?;
    let (member_id, content) = member_wishlist_fields(&body)?;

    let wishlist = state
        .lookup
        .save_wishlist_by_member_id(member_id, &content)
        .await?;

    Ok(Json(SavedWishlistResponse { wishlist }))
}
