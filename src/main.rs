use anyhow::Context;
use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod auth;
mod config;
mod db;
mod dto;
mod error;
mod extract;
mod handlers;
mod models;
mod services;
mod store;

use config::Config;
use store::MoodStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MoodStore>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "moodlog_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Arc::new(Config::from_env().context("invalid configuration")?);
    if config.access_password.is_empty() {
        tracing::warn!("ACCESS_PASSWORD is not set; an empty password will be accepted");
    }

    let store = store::connect(&config)
        .await
        .context("failed to set up the entry store")?;
    tracing::info!(backend = config.store.name(), "Entry store ready");

    let state = AppState {
        store,
        config: config.clone(),
    };
    let app = build_router(state)?;

    let addr = config.listen_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: AppState) -> anyhow::Result<Router> {
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz))
        .route("/api/auth/login", post(handlers::auth::login));

    let protected_routes = Router::new()
        .route("/api/session", get(handlers::auth::current_session))
        // Entries
        .route("/api/entries", get(handlers::entries::list_entries))
        .route("/api/entries/defaults", get(handlers::entries::form_defaults))
        .route("/api/entries/today", post(handlers::entries::save_today))
        .route("/api/entries/edits", post(handlers::entries::apply_edits))
        .route("/api/entries/:id", delete(handlers::entries::delete_entry))
        // Dashboard
        .route("/api/dashboard", get(handlers::dashboard::get_dashboard))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::require_auth,
        ));

    let allowed_origins: Vec<axum::http::HeaderValue> = {
        let mut origins = vec![state
            .config
            .frontend_url
            .parse::<axum::http::HeaderValue>()
            .context("FRONTEND_URL is not a valid origin")?];
        // In dev, also allow LAN access (e.g. testing from another device)
        if let Ok(extra) = std::env::var("CORS_EXTRA_ORIGINS") {
            for o in extra.split(',') {
                if let Ok(hv) = o.trim().parse::<axum::http::HeaderValue>() {
                    origins.push(hv);
                }
            }
        }
        origins
    };
    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ])
        .allow_credentials(true);

    Ok(Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}
