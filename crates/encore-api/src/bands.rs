use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;

use encore_types::models::Band;

use crate::auth::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct BandsQuery {
    pub day: Option<u8>,
}

/// The lineup is public; no session required.
pub async fn list_bands(
    State(state): State<AppState>,
    Query(query): Query<BandsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(day) = query.day {
        validate_day(day)?;
    }

    let bands: Vec<Band> = state
        .db
        .list_bands(query.day)?
        .into_iter()
        .map(|row| row.into_band())
        .collect();

    Ok(Json(bands))
}

pub fn validate_day(day: u8) -> Result<(), ApiError> {
    if day == 1 || day == 2 {
        Ok(())
    } else {
        Err(ApiError::bad_request("Day must be 1 or 2"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_festival_days_are_accepted() {
        assert!(validate_day(1).is_ok());
        assert!(validate_day(2).is_ok());
        assert!(validate_day(0).is_err());
        assert!(validate_day(3).is_err());
    }
}
