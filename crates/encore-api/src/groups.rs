use anyhow::anyhow;
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use rand::Rng;
use uuid::Uuid;

use encore_db::Database;
use encore_db::models::GroupRow;
use encore_db::queries::friends::STATUS_ACCEPTED;
use encore_types::api::{
    Claims, CreateGroupRequest, GroupMemberEntry, GroupResponse, JoinGroupRequest,
    RenameGroupRequest,
};
use encore_types::models::UserSummary;

use crate::auth::AppState;
use crate::error::ApiError;

const INVITE_CODE_LEN: usize = 6;
const INVITE_CODE_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub async fn create_group(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateGroupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = req.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::bad_request("Group name is required"));
    }

    let user_id = claims.sub.to_string();
    let group_id = Uuid::new_v4();

    // Regenerate on the (unlikely) collision; the UNIQUE index backstops.
    let mut invite_code = generate_invite_code();
    while state.db.invite_code_exists(&invite_code)? {
        invite_code = generate_invite_code();
    }

    state
        .db
        .create_group(&group_id.to_string(), &name, &invite_code, &user_id)?;
    state
        .db
        .add_group_member(&Uuid::new_v4().to_string(), &group_id.to_string(), &user_id)?;

    let group = group_response(&state.db, &group_id.to_string())?
        .ok_or_else(|| anyhow!("Group vanished after create"))?;

    Ok((StatusCode::CREATED, Json(group)))
}

pub async fn list_groups(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = claims.sub.to_string();
    let db = state.clone();

    let groups = tokio::task::spawn_blocking(move || {
        let rows = db.db.groups_for_user(&user_id)?;
        let mut groups = Vec::with_capacity(rows.len());
        for row in rows {
            groups.push(assemble_group(&db.db, row)?);
        }
        Ok::<_, anyhow::Error>(groups)
    })
    .await
    .map_err(|e| anyhow!("spawn_blocking join error: {}", e))??;

    Ok(Json(groups))
}

/// Rename, creator only.
pub async fn rename_group(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(group_id): Path<Uuid>,
    Json(req): Json<RenameGroupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = req.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::bad_request("Group name is required"));
    }

    let group = require_group(&state.db, group_id)?;
    require_creator(&group, &claims)?;

    state.db.rename_group(&group.id, &name)?;

    let group = group_response(&state.db, &group.id)?
        .ok_or_else(|| anyhow!("Group vanished after rename"))?;

    Ok(Json(group))
}

/// Delete, creator only. Memberships cascade.
pub async fn delete_group(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(group_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let group = require_group(&state.db, group_id)?;
    require_creator(&group, &claims)?;

    state.db.delete_group(&group.id)?;

    Ok(Json(serde_json::json!({ "ok": true })))
}

/// Join by invite code. The joiner is auto-friended (accepted) with every
/// member already in the group they weren't connected to.
pub async fn join_group(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<JoinGroupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let code = req.invite_code.trim().to_uppercase();
    if code.is_empty() {
        return Err(ApiError::bad_request("Invite code is required"));
    }

    let user_id = claims.sub.to_string();
    let db = state.clone();

    let group = tokio::task::spawn_blocking(move || {
        let group = match db.db.get_group_by_code(&code)? {
            Some(group) => group,
            None => return Ok(Err(ApiError::not_found("Invalid invite code"))),
        };

        if db.db.is_group_member(&group.id, &user_id)? {
            return Ok(Err(ApiError::bad_request(
                "You're already a member of this group",
            )));
        }

        let existing = db.db.member_ids_excluding(&group.id, &user_id)?;

        db.db
            .add_group_member(&Uuid::new_v4().to_string(), &group.id, &user_id)?;

        // Joining a crew means everyone in it is a friend now.
        for member_id in existing {
            if db.db.find_friendship_between(&user_id, &member_id)?.is_none() {
                db.db.create_friendship(
                    &Uuid::new_v4().to_string(),
                    &user_id,
                    &member_id,
                    STATUS_ACCEPTED,
                )?;
            }
        }

        Ok::<_, anyhow::Error>(Ok(group.id))
    })
    .await
    .map_err(|e| anyhow!("spawn_blocking join error: {}", e))??;

    let group_id = group?;

    let group = group_response(&state.db, &group_id)?
        .ok_or_else(|| anyhow!("Group vanished after join"))?;

    Ok(Json(group))
}

/// Any member may leave except the creator, who deletes instead.
pub async fn leave_group(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(group_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let group = require_group(&state.db, group_id)?;

    let user_id = claims.sub.to_string();
    if group.created_by == user_id {
        return Err(ApiError::bad_request(
            "The creator can't leave the group; delete it instead",
        ));
    }

    state.db.remove_membership(&group.id, &user_id)?;

    Ok(Json(serde_json::json!({ "ok": true })))
}

/// Kick a member, creator only; the creator's own row is off limits.
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((group_id, member_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let group = require_group(&state.db, group_id)?;
    require_creator(&group, &claims)?;

    let member = state
        .db
        .get_group_member(&member_id.to_string())?
        .filter(|m| m.group_id == group.id)
        .ok_or_else(|| ApiError::not_found("Member not found"))?;

    if member.user_id == claims.sub.to_string() {
        return Err(ApiError::bad_request("You can't remove yourself"));
    }

    state.db.remove_group_member(&member.id)?;

    Ok(Json(serde_json::json!({ "ok": true })))
}

fn generate_invite_code() -> String {
    let mut rng = rand::rng();
    (0..INVITE_CODE_LEN)
        .map(|_| INVITE_CODE_CHARS[rng.random_range(0..INVITE_CODE_CHARS.len())] as char)
        .collect()
}

fn require_group(db: &Database, group_id: Uuid) -> Result<GroupRow, ApiError> {
    db.get_group(&group_id.to_string())?
        .ok_or_else(|| ApiError::not_found("Group not found"))
}

fn require_creator(group: &GroupRow, claims: &Claims) -> Result<(), ApiError> {
    if group.created_by == claims.sub.to_string() {
        Ok(())
    } else {
        Err(ApiError::forbidden("Only the group creator can do that"))
    }
}

fn group_response(db: &Database, group_id: &str) -> Result<Option<GroupResponse>, ApiError> {
    match db.get_group(group_id)? {
        Some(row) => Ok(Some(assemble_group(db, row)?)),
        None => Ok(None),
    }
}

fn assemble_group(db: &Database, row: GroupRow) -> Result<GroupResponse, anyhow::Error> {
    let members = db
        .members_of_group(&row.id)?
        .into_iter()
        .map(|m| GroupMemberEntry {
            id: encore_db::models::parse_uuid(&m.member_id, "member id"),
            user: UserSummary {
                id: encore_db::models::parse_uuid(&m.user_id, "user id"),
                username: m.username,
                avatar: m.avatar,
            },
        })
        .collect();

    Ok(GroupResponse {
        id: encore_db::models::parse_uuid(&row.id, "group id"),
        name: row.name,
        invite_code: row.invite_code,
        created_by: encore_db::models::parse_uuid(&row.created_by, "user id"),
        members,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invite_codes_are_six_uppercase_alphanumerics() {
        for _ in 0..50 {
            let code = generate_invite_code();
            assert_eq!(code.len(), 6);
            assert!(
                code.chars()
                    .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
            );
        }
    }
}
