use axum::{Extension, Json, extract::State, response::IntoResponse};

use encore_types::api::{Claims, ProfileResponse, UpdateProfileRequest};

use crate::auth::AppState;
use crate::error::ApiError;

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .db
        .get_user_by_id(&claims.sub.to_string())?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(ProfileResponse {
        username: user.username,
        avatar: user.avatar,
        instagram: user.instagram,
        is_public: user.is_public,
    }))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let handle = match req.instagram.as_deref() {
        Some(raw) => normalize_instagram(raw)
            .map_err(|_| ApiError::bad_request("Invalid Instagram handle"))?,
        None => None,
    };

    let user_id = claims.sub.to_string();
    state
        .db
        .update_profile(&user_id, handle.as_deref(), req.is_public)?;

    let user = state
        .db
        .get_user_by_id(&user_id)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(ProfileResponse {
        username: user.username,
        avatar: user.avatar,
        instagram: user.instagram,
        is_public: user.is_public,
    }))
}

/// Strip a leading `@` and whitespace; an empty result clears the handle.
/// Instagram handles are 1-30 chars of letters, digits, dots and
/// underscores.
fn normalize_instagram(raw: &str) -> Result<Option<String>, ()> {
    let handle = raw.trim().trim_start_matches('@').trim();
    if handle.is_empty() {
        return Ok(None);
    }

    let valid = handle.len() <= 30
        && handle
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_');

    if valid { Ok(Some(handle.to_string())) } else { Err(()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_normalized() {
        assert_eq!(
            normalize_instagram(" @cosquin.rock ").unwrap(),
            Some("cosquin.rock".to_string())
        );
        assert_eq!(normalize_instagram("under_score").unwrap(), Some("under_score".to_string()));
        assert_eq!(normalize_instagram("   ").unwrap(), None);
        assert_eq!(normalize_instagram("@").unwrap(), None);
    }

    #[test]
    fn bad_handles_are_rejected() {
        assert!(normalize_instagram("has space").is_err());
        assert!(normalize_instagram("emoji🎸").is_err());
        assert!(normalize_instagram(&"x".repeat(31)).is_err());
    }
}
