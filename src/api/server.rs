//! Axum server setup and configuration

use crate::api::routes;
use crate::notifier::Notifier;
use crate::services::auto_trader::RuntimeConfig;
use crate::services::control::ControlChannel;
use crate::services::metrics::Metrics;
use crate::{Config, Database};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub config: Arc<Config>,
    pub runtime: Arc<RuntimeConfig>,
    pub notifier: Arc<dyn Notifier>,
    pub metrics: Metrics,
    pub control: ControlChannel,
}

impl AppState {
    pub fn new(
        config: Config,
        db: Arc<Database>,
        runtime: Arc<RuntimeConfig>,
        notifier: Arc<dyn Notifier>,
        metrics: Metrics,
    ) -> Self {
        let control = ControlChannel::new(db.clone(), runtime.clone());
        Self {
            db,
            config: Arc::new(config),
            runtime,
            notifier,
            metrics,
            control,
        }
    }
}

/// Create the Axum application with all routes
pub fn create_app(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/status", get(routes::auto_trading::get_status))
        .route("/positions", get(routes::auto_trading::list_positions))
        .route("/settings", post(routes::auto_trading::update_settings))
        .route("/metrics", get(routes::auto_trading::get_metrics));

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health_check))
        .route("/:token", post(routes::telegram::webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
