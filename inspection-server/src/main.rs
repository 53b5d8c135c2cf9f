//! Container Damage Inspection Server
//!
//! HTTP front for the severity scoring and alert decision pipeline.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                  INSPECTION SERVER (Axum)                    │
//! ├──────────────────────────────────────────────────────────────┤
//! │  detections ──► features ──► severity ──► tier ──► gate      │
//! │                                                   │          │
//! │                         report ◄──────────────────┤          │
//! │                                                   ▼          │
//! │                              dispatcher (blocking pool)      │
//! │                                                   │          │
//! │                                     Slack / Discord / Teams  │
//! └──────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod models;
mod handlers;
mod error;

#[cfg(test)]
mod tests;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use damage_core::logic::model::ModelRegistry;
use damage_core::{InspectionPipeline, Runtime};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before anything reads the environment
    dotenvy::dotenv().ok();

    let config = config::Config::from_env();
    let json_logs = config.is_production();

    // Initialize logging (also captures `log` records from the core)
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "container_damage_server=debug,damage_core=info,tower_http=debug".into()))
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    tracing::info!("Container Damage Inspection Server starting ({})...", config.environment);

    // Scoring config, models, notifier: loaded once, fatal on error
    let runtime = Runtime::from_env()?;
    let scoring = runtime.pipeline.config();
    tracing::info!(
        "Scoring config {} ({}), thresholds {}/{}/{}",
        scoring.version,
        scoring.mode.as_str(),
        scoring.thresholds.low,
        scoring.thresholds.medium,
        scoring.thresholds.high
    );
    tracing::info!("{} model(s) registered", runtime.registry.len());

    let state = AppState::new(runtime, config.clone());
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<InspectionPipeline>,
    pub registry: Arc<ModelRegistry>,
    pub config: config::Config,
}

impl AppState {
    pub fn new(runtime: Runtime, config: config::Config) -> Self {
        Self {
            pipeline: runtime.pipeline,
            registry: runtime.registry,
            config,
        }
    }
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    let max_body_bytes = state.config.max_body_bytes;

    let public_routes = Router::new()
        .route("/health", get(handlers::health::check));

    let api_routes = Router::new()
        // Inspection
        .route("/api/v1/inspect/image", post(handlers::inspect::image))
        .route("/api/v1/inspect/video", post(handlers::inspect::video))

        // Alerts
        .route("/api/v1/alerts/classify", post(handlers::alerts::classify))

        // Introspection
        .route("/api/v1/config", get(handlers::scoring::get_config))
        .route("/api/v1/models", get(handlers::models::list))
        .route("/api/v1/notifications/stats", get(handlers::notifications::stats));

    // Combine all routes
    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
