//! Request and response bodies.

use crate::error::{AppError, AppResult};
use crate::models::Wishlist;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// `?token=` query parameter
#[derive(Debug, Default, Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ContentResponse {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

#[derive(Debug, Serialize)]
pub struct SavedBySlugResponse {
    pub success: bool,
    pub wishlist: Wishlist,
}

#[derive(Debug, Serialize)]
pub struct SavedWishlistResponse {
    pub wishlist: Wishlist,
}

/// `content` from a save body. Absent or null means empty; any other
/// non-string value is rejected.
pub fn optional_content(body: &Value) -> AppResult<String> {
    match body.get("content") {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(content)) => Ok(content.clone()),
        Some(_) => Err(AppError::Validation("Invalid content".to_string())),
    }
}

/// `{ memberId, content }` where both fields are required
pub fn member_wishlist_fields(body: &Value) -> AppResult<(Uuid, String)> {
    let missing = || AppError::Validation("memberId and content are required".to_string());

    let member_id = body
        .get("memberId")
        .and_then(Value::as_str)
        .ok_or_else(missing)?;
    let content = body
        .get("content")
        .and_then(Value::as_str)
        .ok_or_else(missing)?;

    let member_id = Uuid::parse_str(member_id)
        .map_err(|_| AppError::Validation("memberId must be a UUID".to_string()))?;

    Ok((member_id, content.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_optional_content() {
        assert_eq!(optional_content(&json!({ "content": "socks" })).unwrap(), "socks");
        assert_eq!(optional_content(&json!({})).unwrap(), "");
        assert_eq!(optional_content(&json!({ "content": null })).unwrap(), "");
        assert!(optional_content(&json!({ "content": 42 })).is_err());
        assert!(optional_content(&json!({ "content": ["a"] })).is_err());
    }

    #[test]
    fn test_member_wishlist_fields() {
        let id = Uuid::new_v4();
        let (parsed, content) =
            member_wishlist_fields(&json!({ "memberId": id.to_string(), "content": "" })).unwrap();
        assert_eq!(parsed, id);
        assert_eq!(content, "");

        assert!(member_wishlist_fields(&json!({ "content": "x" })).is_err());
        assert!(member_wishlist_fields(&json!({ "memberId": id.to_string() })).is_err());
        assert!(member_wishlist_fields(&json!({ "memberId": "nope", "content": "x" })).is_err());
        assert!(member_wishlist_fields(&json!({ "memberId": id.to_string(), "content": 1 })).is_err());
    }
}
