use anyhow::anyhow;
use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use rand::{Rng, distr::Alphanumeric};
use uuid::Uuid;

use encore_types::api::{Claims, CreateShareRequest, CreateShareResponse, SharedAgendaResponse};
use encore_types::models::{Band, ShareType};

use crate::auth::AppState;
use crate::error::ApiError;

const TOKEN_LEN: usize = 24;

/// Find-or-create the caller's share link for a day filter. Repeated
/// calls hand back the same token.
pub async fn create_share(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateShareRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = claims.sub.to_string();
    let share_type = req.share_type;

    let token = match state.db.find_share_token(&user_id, share_type.as_code())? {
        Some(existing) => existing.token,
        None => {
            let token = generate_token();
            state.db.create_share_token(
                &Uuid::new_v4().to_string(),
                &token,
                &user_id,
                share_type.as_code(),
            )?;
            token
        }
    };

    let url = format!("{}/agenda/{}", state.base_url.trim_end_matches('/'), token);

    Ok(Json(CreateShareResponse { url, token }))
}

/// Public, unauthenticated: the capability token is the whole check.
pub async fn resolve_share(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();

    let (owner, share_type, bands) = tokio::task::spawn_blocking(move || {
        let Some(share) = db.db.get_share_token(&token)? else {
            return Ok(None);
        };

        let share_type = ShareType::from_code(&share.share_type)
            .ok_or_else(|| anyhow!("Corrupt share type '{}'", share.share_type))?;

        let owner = db
            .db
            .get_user_by_id(&share.user_id)?
            .ok_or_else(|| anyhow!("Share token '{}' has no owner", share.id))?;

        let bands = db
            .db
            .agenda_bands_for_user(&share.user_id, share_type.day_filter())?;

        Ok::<_, anyhow::Error>(Some((owner, share_type, bands)))
    })
    .await
    .map_err(|e| anyhow!("spawn_blocking join error: {}", e))??
    .ok_or_else(|| ApiError::not_found("Invalid share link"))?;

    let bands: Vec<Band> = bands.into_iter().map(|row| row.into_band()).collect();

    Ok(Json(SharedAgendaResponse {
        username: owner.username,
        avatar: owner.avatar,
        share_type,
        bands,
    }))
}

fn generate_token() -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_url_safe_and_long_enough() {
        let token = generate_token();
        assert_eq!(token.len(), TOKEN_LEN);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));

        // Two draws colliding would mean the RNG is broken.
        assert_ne!(generate_token(), token);
    }
}
