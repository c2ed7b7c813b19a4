use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post},
};
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::state::SharedState;

pub mod auth;
mod documents;
mod error;
mod observability;
mod search;
mod system;
mod types;
pub mod validation;

pub use error::ApiError;
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn search_service(&self) -> &Arc<dyn crate::services::SearchService> {
        &self.shared.search_service
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub fn router(state: Arc<AppState>) -> Router {
    let static_dir = state.config().server.static_dir.clone();
    let cors_origins = state.config().server.cors_allowed_origins.clone();

    let admin_routes = create_admin_router(state.clone());

    let mut app = Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health_live))
        .route("/health/ready", get(system::health_ready))
        .route("/search", get(search::search))
        .route("/documents", get(documents::list_documents))
        .route("/metrics", get(observability::get_metrics))
        .merge(admin_routes)
        .with_state(state);

    if Path::new(&static_dir).is_dir() {
        app = app.nest_service("/static", ServeDir::new(static_dir));
    } else {
        tracing::debug!("Static directory {} not found, /static disabled", static_dir);
    }

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    app.layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
}

fn create_admin_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/documents/seed", post(documents::seed_documents))
        .route("/clear-database", delete(documents::clear_database))
        .route_layer(middleware::from_fn_with_state(
            state,
            auth::admin_middleware,
        ))
}
