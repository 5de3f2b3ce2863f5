pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::db::Database;
use crate::services::stats_feed::StatsFeed;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub stats_feed: StatsFeed,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        Self {
            db: Arc::new(db),
            stats_feed: StatsFeed::new(),
        }
    }
}

/// Build the full router: user-scoped routes, the stats WebSocket feed
/// included, behind the identity middleware, plus health and connection
pub fn router(state: AppState) -> Router {
    let protected_routes = Router::new()
        // Task routes
        .route("/api/tasks", get(routes::tasks::list).post(routes::tasks::create))
        .route(
            "/api/tasks/{id}",
            patch(routes::tasks::set_completed).delete(routes::tasks::delete),
        )
        .route("/api/tasks/{id}/step", post(routes::tasks::advance_step))
        // Stats routes
        .route("/api/stats", get(routes::stats::get))
        .route("/api/stats/events", post(routes::stats::record_event))
        .route("/ws/stats", get(routes::stats::subscribe))
        // Achievement routes
        .route(
            "/api/achievements",
            get(routes::achievements::list).post(routes::achievements::create_missing),
        )
        .route(
            "/api/achievements/{achievement_id}",
            put(routes::achievements::update_progress),
        )
        // Capture routes
        .route(
            "/api/captures",
            get(routes::captures::list).post(routes::captures::create),
        )
        .route("/api/captures/{id}", delete(routes::captures::delete))
        // Community routes
        .route(
            "/api/community/posts",
            get(routes::community::list).post(routes::community::create),
        )
        .route("/api/community/posts/{id}/like", post(routes::community::like))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            routes::identity::identity_middleware,
        ));

    Router::new()
        .route("/health", get(routes::connection::health_check))
        .route("/api/connection", get(routes::connection::check))
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url, config.max_connections).await?;

    tracing::info!("Running migrations...");
    db.run_migrations().await?;

    let app = router(AppState::new(db));

    let addr = config.bind_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
