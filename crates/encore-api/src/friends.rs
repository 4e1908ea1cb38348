use anyhow::anyhow;
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use encore_db::models::FriendWithUser;
use encore_types::api::{AddFriendRequest, Claims, FriendEntry, FriendsResponse};

use crate::auth::{AppState, normalize_username};
use crate::error::ApiError;

/// Accepted friends plus pending requests in both directions.
pub async fn list_friends(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = claims.sub.to_string();
    let db = state.clone();

    let (friends, pending_received, pending_sent) = tokio::task::spawn_blocking(move || {
        let friends = db.db.accepted_friends_of(&user_id)?;
        let pending_received = db.db.pending_received_by(&user_id)?;
        let pending_sent = db.db.pending_sent_by(&user_id)?;
        Ok::<_, anyhow::Error>((friends, pending_received, pending_sent))
    })
    .await
    .map_err(|e| anyhow!("spawn_blocking join error: {}", e))??;

    Ok(Json(FriendsResponse {
        friends: friends.into_iter().map(friend_entry).collect(),
        pending_received: pending_received.into_iter().map(friend_entry).collect(),
        pending_sent: pending_sent.into_iter().map(friend_entry).collect(),
    }))
}

/// Send a friend request by username.
pub async fn send_request(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<AddFriendRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let username = normalize_username(&req.username);
    if username.is_empty() {
        return Err(ApiError::bad_request("Username is required"));
    }

    let target = state
        .db
        .get_user_by_username(&username)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let user_id = claims.sub.to_string();
    if target.id == user_id {
        return Err(ApiError::bad_request("You can't add yourself"));
    }

    // One row per unordered pair, whatever its state.
    if let Some(existing) = state.db.find_friendship_between(&user_id, &target.id)? {
        let msg = if existing.status == encore_db::queries::friends::STATUS_ACCEPTED {
            "You're already friends"
        } else {
            "A request is already pending"
        };
        return Err(ApiError::bad_request(msg));
    }

    let friendship_id = Uuid::new_v4();
    state.db.create_friendship(
        &friendship_id.to_string(),
        &user_id,
        &target.id,
        encore_db::queries::friends::STATUS_PENDING,
    )?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "id": friendship_id })),
    ))
}

/// Accept a pending request; only the addressee may.
pub async fn accept_request(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let friendship = state
        .db
        .get_friendship(&id.to_string())?
        .ok_or_else(|| ApiError::not_found("Request not found"))?;

    if friendship.addressee_id != claims.sub.to_string() {
        return Err(ApiError::forbidden("Only the addressee can accept"));
    }

    if friendship.status != encore_db::queries::friends::STATUS_PENDING {
        return Err(ApiError::bad_request("Request already handled"));
    }

    state.db.accept_friendship(&friendship.id)?;

    Ok(Json(serde_json::json!({ "ok": true })))
}

/// Reject a pending request or delete an accepted friendship; either
/// party may.
pub async fn remove_friendship(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let friendship = state
        .db
        .get_friendship(&id.to_string())?
        .ok_or_else(|| ApiError::not_found("Friendship not found"))?;

    let user_id = claims.sub.to_string();
    if friendship.requester_id != user_id && friendship.addressee_id != user_id {
        return Err(ApiError::forbidden("Not part of this friendship"));
    }

    state.db.delete_friendship(&friendship.id)?;

    Ok(Json(serde_json::json!({ "ok": true })))
}

fn friend_entry(row: FriendWithUser) -> FriendEntry {
    FriendEntry {
        id: encore_db::models::parse_uuid(&row.user_id, "user id"),
        username: row.username,
        avatar: row.avatar,
        friendship_id: encore_db::models::parse_uuid(&row.friendship_id, "friendship id"),
    }
}
