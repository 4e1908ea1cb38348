use std::collections::HashSet;

use anyhow::anyhow;
use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use uuid::Uuid;

use encore_types::api::{Claims, CompareFriend, CompareResponse};
use encore_types::models::Band;

use crate::auth::AppState;
use crate::error::ApiError;

/// Side-by-side agendas: bands you share, bands only you marked, bands
/// only the friend marked.
pub async fn compare_agendas(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(friend_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = claims.sub.to_string();
    let friend_id = friend_id.to_string();
    let db = state.clone();

    let (friend, mine, theirs) = tokio::task::spawn_blocking(move || {
        let friend = db.db.get_user_by_id(&friend_id)?;
        let mine = db.db.agenda_bands_for_user(&user_id, None)?;
        let theirs = db.db.agenda_bands_for_user(&friend_id, None)?;
        Ok::<_, anyhow::Error>((friend, mine, theirs))
    })
    .await
    .map_err(|e| anyhow!("spawn_blocking join error: {}", e))??;

    let friend = friend.ok_or_else(|| ApiError::not_found("Friend not found"))?;

    let mine: Vec<Band> = mine.into_iter().map(|row| row.into_band()).collect();
    let theirs: Vec<Band> = theirs.into_iter().map(|row| row.into_band()).collect();
    let (both, only_me, only_friend) = classify(mine, theirs);

    Ok(Json(CompareResponse {
        friend: CompareFriend {
            username: friend.username,
            avatar: friend.avatar,
        },
        both,
        only_me,
        only_friend,
    }))
}

/// Partition two agendas by band-id set membership. Shared bands come
/// from the caller's copy.
fn classify(mine: Vec<Band>, theirs: Vec<Band>) -> (Vec<Band>, Vec<Band>, Vec<Band>) {
    let my_ids: HashSet<Uuid> = mine.iter().map(|b| b.id).collect();
    let their_ids: HashSet<Uuid> = theirs.iter().map(|b| b.id).collect();

    let mut both = Vec::new();
    let mut only_me = Vec::new();
    for band in mine {
        if their_ids.contains(&band.id) {
            both.push(band);
        } else {
            only_me.push(band);
        }
    }

    let only_friend = theirs
        .into_iter()
        .filter(|band| !my_ids.contains(&band.id))
        .collect();

    (both, only_me, only_friend)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use encore_types::models::Stage;

    fn band(id: u128, name: &str) -> Band {
        let start = Utc.with_ymd_and_hms(2026, 2, 14, 21, 20, 0).unwrap();
        Band {
            id: Uuid::from_u128(id),
            name: name.to_string(),
            day: 1,
            stage: Stage::Norte,
            start_time: start,
            end_time: start,
        }
    }

    #[test]
    fn classification_partitions_both_agendas() {
        let mine = vec![band(1, "Lali"), band(2, "Turf")];
        let theirs = vec![band(2, "Turf"), band(3, "Dillom")];

        let (both, only_me, only_friend) = classify(mine, theirs);

        assert_eq!(both.len(), 1);
        assert_eq!(both[0].name, "Turf");
        assert_eq!(only_me.len(), 1);
        assert_eq!(only_me[0].name, "Lali");
        assert_eq!(only_friend.len(), 1);
        assert_eq!(only_friend[0].name, "Dillom");
    }

    #[test]
    fn disjoint_agendas_share_nothing() {
        let (both, only_me, only_friend) =
            classify(vec![band(1, "Lali")], vec![band(2, "Turf")]);
        assert!(both.is_empty());
        assert_eq!(only_me.len(), 1);
        assert_eq!(only_friend.len(), 1);
    }

    #[test]
    fn empty_agendas_compare_cleanly() {
        let (both, only_me, only_friend) = classify(vec![], vec![]);
        assert!(both.is_empty() && only_me.is_empty() && only_friend.is_empty());
    }
}
