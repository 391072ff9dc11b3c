//! scad-dash library - Streaming catalog analytics
//!
//! Read-only aggregation over a catalog of movies and TV shows, served as
//! JSON sections for a filterable dashboard.

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod analytics;
pub mod api;
pub mod cache;
pub mod db;
pub mod filter;
pub mod presentation;
pub mod query;

use analytics::Analytics;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub analytics: Analytics,
}

impl AppState {
    pub fn new(analytics: Analytics) -> Self {
        Self { analytics }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    let api = Router::new()
        .route("/api/buildinfo", get(api::get_build_info))
        .route("/api/filters/bounds", get(api::get_bounds))
        .route("/api/rankings/:kind", get(api::get_ranking))
        .route("/api/charts/countries", get(api::countries))
        .route("/api/charts/decades", get(api::decades))
        .route("/api/charts/certifications", get(api::certifications))
        .route("/api/charts/seasons", get(api::seasons))
        .route("/api/charts/average-scores", get(api::average_scores))
        .route("/api/dashboard", get(api::get_dashboard));

    Router::new()
        .merge(api)
        .merge(api::health_routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
