use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tower_http::cors::CorsLayer;

use crate::aggregator::Aggregator;

pub const SERVICE_VERSION: &str = "aggregator-v2";
pub const UNAVAILABLE_BODY: &str = "Upstream services unavailable or cache empty";

pub static X_SERVICE_VERSION: HeaderName = HeaderName::from_static("x-service-version");
/// Diagnostics: `fresh` or `cache`.
pub static X_DASHBOARD_SOURCE: HeaderName = HeaderName::from_static("x-dashboard-source");

#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<Aggregator>,
}

impl AppState {
    pub fn new(aggregator: Aggregator) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/dashboard", get(dashboard))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn dashboard(State(state): State<AppState>) -> Response {
    tracing::debug!("GET /api/dashboard");

    match state.aggregator.aggregate().await {
        Ok(d) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "application/json"),
                (X_SERVICE_VERSION.clone(), SERVICE_VERSION),
                (X_DASHBOARD_SOURCE.clone(), d.origin.as_str()),
            ],
            d.body,
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "dashboard unavailable");
            (
                StatusCode::BAD_GATEWAY,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                UNAVAILABLE_BODY,
            )
                .into_response()
        }
    }
}
