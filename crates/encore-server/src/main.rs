use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{delete, get, patch, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use encore_api::auth::{self, AppState, AppStateInner};
use encore_api::middleware::require_auth;
use encore_api::{attendance, bands, compare, friends, groups, profile, schedule, share, users};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "encore=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret =
        std::env::var("ENCORE_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
    let db_path = std::env::var("ENCORE_DB_PATH").unwrap_or_else(|_| "encore.db".into());
    let base_url =
        std::env::var("ENCORE_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".into());
    let host = std::env::var("ENCORE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("ENCORE_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;

    // Init database
    let db = encore_db::Database::open(&PathBuf::from(&db_path))?;

    // Shared state
    let app_state: AppState = Arc::new(AppStateInner {
        db,
        jwt_secret,
        base_url,
    });

    // Routes
    let public_routes = Router::new()
        .route("/auth/check-user", post(auth::check_user))
        .route("/auth/login", post(auth::login))
        .route("/bands", get(bands::list_bands))
        .route("/schedule", get(schedule::get_schedule))
        .route("/share/{token}", get(share::resolve_share))
        .with_state(app_state.clone());

    let protected_routes = Router::new()
        .route(
            "/attendance",
            get(attendance::get_attendance).post(attendance::toggle_attendance),
        )
        .route(
            "/friends",
            get(friends::list_friends).post(friends::send_request),
        )
        .route(
            "/friends/{id}",
            put(friends::accept_request).delete(friends::remove_friendship),
        )
        .route(
            "/groups",
            get(groups::list_groups).post(groups::create_group),
        )
        .route("/groups/join", post(groups::join_group))
        .route(
            "/groups/{group_id}",
            patch(groups::rename_group).delete(groups::delete_group),
        )
        .route("/groups/{group_id}/leave", post(groups::leave_group))
        .route(
            "/groups/{group_id}/members/{member_id}",
            delete(groups::remove_member),
        )
        .route("/share", post(share::create_share))
        .route(
            "/user/profile",
            get(profile::get_profile).put(profile::update_profile),
        )
        .route("/users", get(users::list_users))
        .route("/compare/{friend_id}", get(compare::compare_agendas))
        .layer(middleware::from_fn(require_auth))
        .with_state(app_state);

    let app = Router::new()
        .nest("/api", public_routes.merge(protected_routes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Encore server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
