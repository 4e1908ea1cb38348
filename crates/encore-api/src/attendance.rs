use std::collections::HashSet;

use anyhow::anyhow;
use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use encore_types::api::{
    AgendaEntry, AttendeeSource, BandAttendee, Claims, ToggleAttendanceRequest,
};

use crate::auth::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceQuery {
    pub band_id: Option<Uuid>,
}

/// Mark or unmark "going" for a band. Unmarking is idempotent; marking
/// twice trips the UNIQUE constraint and reports it.
pub async fn toggle_attendance(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ToggleAttendanceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let band_id = req.band_id.to_string();
    let user_id = claims.sub.to_string();

    if state.db.get_band(&band_id)?.is_none() {
        return Err(ApiError::not_found("Band not found"));
    }

    if req.attending {
        let attendance_id = Uuid::new_v4();
        let inserted = state
            .db
            .mark_attendance(&attendance_id.to_string(), &user_id, &band_id)?;

        if !inserted {
            return Err(ApiError::bad_request("You're already going to this band"));
        }

        Ok((StatusCode::CREATED, Json(serde_json::json!({ "ok": true }))))
    } else {
        state.db.unmark_attendance(&user_id, &band_id)?;
        Ok((StatusCode::OK, Json(serde_json::json!({ "ok": true }))))
    }
}

/// Without `bandId`: the caller's agenda. With `bandId`: which of the
/// caller's connections are going to that band, each tagged with how
/// they're connected (shared group beats direct friendship).
pub async fn get_attendance(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<AttendanceQuery>,
) -> Result<axum::response::Response, ApiError> {
    let user_id = claims.sub.to_string();

    match query.band_id {
        Some(band_id) => {
            let attendees = band_attendees(state, user_id, band_id.to_string()).await?;
            Ok(Json(attendees).into_response())
        }
        None => {
            // Run the blocking DB read off the async runtime
            let db = state.clone();
            let rows = tokio::task::spawn_blocking(move || db.db.agenda_for_user(&user_id))
                .await
                .map_err(|e| anyhow!("spawn_blocking join error: {}", e))??;

            let agenda: Vec<AgendaEntry> = rows
                .into_iter()
                .map(|row| AgendaEntry {
                    id: encore_db::models::parse_uuid(&row.attendance_id, "attendance id"),
                    band: row.band.into_band(),
                })
                .collect();

            Ok(Json(agenda).into_response())
        }
    }
}

async fn band_attendees(
    state: AppState,
    user_id: String,
    band_id: String,
) -> Result<Vec<BandAttendee>, ApiError> {
    let db = state.clone();

    // Several dependent queries; run them all off the async runtime.
    let (group_ids, attendee_rows) = tokio::task::spawn_blocking(move || {
        let group_ids: HashSet<String> = db.db.co_member_ids(&user_id)?.into_iter().collect();
        let friend_ids: HashSet<String> =
            db.db.accepted_friend_ids(&user_id)?.into_iter().collect();

        let connected: Vec<String> = group_ids.union(&friend_ids).cloned().collect();
        let attendee_rows = db.db.attendees_for_band(&band_id, &connected)?;

        Ok::<_, anyhow::Error>((group_ids, attendee_rows))
    })
    .await
    .map_err(|e| anyhow!("spawn_blocking join error: {}", e))??;

    let attendees = attendee_rows
        .into_iter()
        .map(|row| {
            let source = if group_ids.contains(&row.user_id) {
                AttendeeSource::Group
            } else {
                AttendeeSource::Friend
            };
            BandAttendee {
                user: encore_types::models::UserSummary {
                    id: encore_db::models::parse_uuid(&row.user_id, "user id"),
                    username: row.username,
                    avatar: row.avatar,
                },
                source,
            }
        })
        .collect();

    Ok(attendees)
}
