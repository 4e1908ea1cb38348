use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use rand::Rng;
use uuid::Uuid;

use encore_db::Database;
use encore_types::api::{
    CheckUserRequest, CheckUserResponse, Claims, LoginRequest, LoginResponse, UserStatus,
};

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    /// Base URL prepended to generated share links.
    pub base_url: String,
}

/// First step of the credential state machine: tell the client whether
/// this username is new, predates PINs, or should be prompted for one.
pub async fn check_user(
    State(state): State<AppState>,
    Json(req): Json<CheckUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let username = normalize_username(&req.username);
    if username.is_empty() {
        return Err(ApiError::bad_request("Username is required"));
    }

    let status = match state.db.get_user_by_username(&username)? {
        None => UserStatus::New,
        Some(user) if user.pin.is_none() => UserStatus::NeedsPin,
        Some(_) => UserStatus::HasPin,
    };

    Ok(Json(CheckUserResponse { status }))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let username = normalize_username(&req.username);
    if username.is_empty() {
        return Err(ApiError::bad_request("Username is required"));
    }

    let pin = req.pin.as_deref().unwrap_or("");

    match state.db.get_user_by_username(&username)? {
        None => {
            // New user: registration requires a 4-digit PIN.
            if !is_valid_pin(pin) {
                return Err(ApiError::bad_request(
                    "A 4-digit PIN is required to register",
                ));
            }

            let pin_hash = hash_pin(pin)?;
            let user_id = Uuid::new_v4();
            let avatar = random_avatar_color();

            state
                .db
                .create_user(&user_id.to_string(), &username, &pin_hash, &avatar)?;

            let token = create_token(&state.jwt_secret, user_id, &username)?;

            Ok((
                StatusCode::CREATED,
                Json(LoginResponse {
                    user_id,
                    username,
                    token,
                }),
            ))
        }
        Some(user) => {
            let user_id: Uuid = user
                .id
                .parse()
                .map_err(|e| anyhow::anyhow!("Corrupt user id '{}': {}", user.id, e))?;

            match &user.pin {
                // Legacy user without a PIN: route through PIN setup.
                None => {
                    if !(req.is_registering && is_valid_pin(pin)) {
                        return Err(ApiError::bad_request(
                            "This account has no PIN yet; set a 4-digit PIN to continue",
                        ));
                    }
                    let pin_hash = hash_pin(pin)?;
                    state.db.set_user_pin(&user.id, &pin_hash)?;
                }
                Some(stored_hash) => {
                    if pin.is_empty() {
                        return Err(ApiError::bad_request("PIN is required"));
                    }

                    let parsed_hash = PasswordHash::new(stored_hash)
                        .map_err(|e| anyhow::anyhow!("Corrupt PIN hash: {}", e))?;

                    Argon2::default()
                        .verify_password(pin.as_bytes(), &parsed_hash)
                        .map_err(|_| ApiError::Unauthorized)?;
                }
            }

            let token = create_token(&state.jwt_secret, user_id, &user.username)?;

            Ok((
                StatusCode::OK,
                Json(LoginResponse {
                    user_id,
                    username: user.username,
                    token,
                }),
            ))
        }
    }
}

/// Usernames are case-insensitive: stored and matched in lowercase.
pub fn normalize_username(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub fn is_valid_pin(pin: &str) -> bool {
    pin.len() == 4 && pin.chars().all(|c| c.is_ascii_digit())
}

fn hash_pin(pin: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(pin.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("PIN hashing failed: {}", e))?
        .to_string();
    Ok(hash)
}

/// Every account gets a random color swatch as its avatar.
fn random_avatar_color() -> String {
    format!("#{:06x}", rand::rng().random_range(0..0x100_0000))
}

fn create_token(secret: &str, user_id: Uuid, username: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pin_must_be_four_digits() {
        assert!(is_valid_pin("0412"));
        assert!(!is_valid_pin("123"));
        assert!(!is_valid_pin("12345"));
        assert!(!is_valid_pin("12a4"));
        assert!(!is_valid_pin(""));
    }

    #[test]
    fn usernames_normalize_case_insensitively() {
        assert_eq!(normalize_username("  RoCiO "), "rocio");
        assert_eq!(normalize_username(""), "");
    }

    #[test]
    fn avatar_colors_are_css_hex() {
        let color = random_avatar_color();
        assert_eq!(color.len(), 7);
        assert!(color.starts_with('#'));
        assert!(color[1..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn pin_hash_verifies_round_trip() {
        let hash = hash_pin("4321").unwrap();
        let parsed = PasswordHash::new(&hash).unwrap();
        assert!(
            Argon2::default()
                .verify_password(b"4321", &parsed)
                .is_ok()
        );
        assert!(
            Argon2::default()
                .verify_password(b"1234", &parsed)
                .is_err()
        );
    }
}
