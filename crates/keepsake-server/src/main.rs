mod api;
mod config;

use api::state::AppState;
use axum::{
    Router,
    http::{Method, header},
    routing::{delete, get, post, put},
};
use config::ServerConfig;
use keepsake_core::AppCore;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

#[derive(serde::Serialize)]
struct Health {
    status: String,
}

async fn health() -> axum::Json<Health> {
    axum::Json(Health {
        status: "keepsake is working!".to_string(),
    })
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,keepsake_server=debug".into()),
        )
        .with_target(false)
        .init();

    let config = ServerConfig::load().expect("Failed to load server config");
    tracing::info!(db_path = %config.db_path, "Starting Keepsake server");

    let core = Arc::new(AppCore::new(&config.db_path).expect("Failed to initialize app core"));

    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let shared_state: AppState = core.clone();

    let app = Router::new()
        .route("/health", get(health))
        // Notifications (reconciled) and their transitions
        .route("/api/notifications", get(api::notifications::list_notifications))
        .route("/api/notifications/{id}/read", put(api::notifications::mark_read))
        .route("/api/notifications/{id}/viewed", put(api::notifications::mark_viewed))
        .route("/api/notifications/{id}", delete(api::notifications::delete_notification))
        // Shares
        .route("/api/shares", post(api::shares::post_share))
        // Scheduled operations
        .route("/api/scheduled-operations", get(api::scheduled::list_scheduled))
        .route(
            "/api/scheduled-operations/{id}/execute",
            post(api::scheduled::execute_scheduled),
        )
        // Folders
        .route("/api/folders", post(api::folders::create_folder))
        .route("/api/folders", get(api::folders::list_folders))
        .route("/api/folders/{id}", get(api::folders::get_folder))
        .route("/api/folders/{id}", delete(api::folders::delete_folder))
        .route("/api/folders/{id}/view-once", put(api::folders::set_view_once))
        // Media
        .route("/api/media", post(api::media::create_media))
        .route("/api/media/{id}/view", post(api::media::view_media))
        .route("/api/media/{id}/hide", put(api::media::hide_media))
        .route("/api/media/{id}", delete(api::media::delete_media))
        .layer(cors)
        .with_state(shared_state);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind server address");
    axum::serve(listener, app).await.expect("Server error");
}
