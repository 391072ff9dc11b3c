//! HTTP API handlers for scad-dash

pub mod buildinfo;
pub mod charts;
pub mod dashboard;
pub mod filters;
pub mod health;
pub mod rankings;

pub use buildinfo::get_build_info;
pub use charts::{average_scores, certifications, countries, decades, seasons};
pub use dashboard::get_dashboard;
pub use filters::get_bounds;
pub use health::health_routes;
pub use rankings::get_ranking;

use axum::extract::Query;

use crate::filter::{FilterSet, RawFilter};
use crate::AppState;

/// Query string as decoded pairs
///
/// Extracting pairs instead of a struct keeps repeated keys from turning
/// into a 400; [`RawFilter::from_pairs`] decides which value counts.
pub type QueryPairs = Query<Vec<(String, String)>>;

/// Normalize raw query parameters against the dataset's year bounds
async fn resolve_filter(state: &AppState, raw: &RawFilter) -> FilterSet {
    let bounds = state.analytics.year_bounds().await;
    raw.normalize(bounds)
}
