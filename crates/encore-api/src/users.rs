use axum::{Extension, Json, extract::State, response::IntoResponse};

use encore_types::api::{Claims, UserEntry};

use crate::auth::AppState;
use crate::error::ApiError;

/// The directory: everyone who opted into being discoverable, plus the
/// caller, ordered by username.
pub async fn list_users(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let users: Vec<UserEntry> = state
        .db
        .list_visible_users(&claims.sub.to_string())?
        .into_iter()
        .map(|row| UserEntry {
            id: encore_db::models::parse_uuid(&row.id, "user id"),
            username: row.username,
            avatar: row.avatar,
            instagram: row.instagram,
        })
        .collect();

    Ok(Json(users))
}
