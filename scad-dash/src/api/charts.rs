//! Chart sections
//!
//! Every handler answers 200: a failed query shows up as an empty section
//! with a `notice`.

use axum::{
    extract::{Query, State},
    Json,
};

use super::QueryPairs;
use crate::filter::RawFilter;
use crate::presentation::{present_section, SectionView};
use crate::query::Operation;
use crate::AppState;

async fn chart(state: &AppState, raw: &RawFilter, operation: Operation) -> Json<SectionView> {
    let filter = super::resolve_filter(state, raw).await;
    let section = state.analytics.run(operation, filter).await;
    Json(present_section(&section))
}

/// GET /api/charts/countries
///
/// Raw country-list groups plus per-country totals in `chart.countries`.
pub async fn countries(
    State(state): State<AppState>,
    Query(pairs): QueryPairs,
) -> Json<SectionView> {
    let raw = RawFilter::from_pairs(pairs);
    chart(&state, &raw, Operation::ProductionCountries).await
}

/// GET /api/charts/decades
pub async fn decades(
    State(state): State<AppState>,
    Query(pairs): QueryPairs,
) -> Json<SectionView> {
    let raw = RawFilter::from_pairs(pairs);
    chart(&state, &raw, Operation::DecadeHistogram).await
}

/// GET /api/charts/certifications
pub async fn certifications(
    State(state): State<AppState>,
    Query(pairs): QueryPairs,
) -> Json<SectionView> {
    let raw = RawFilter::from_pairs(pairs);
    chart(&state, &raw, Operation::AgeCertificationTop).await
}

/// GET /api/charts/seasons
pub async fn seasons(
    State(state): State<AppState>,
    Query(pairs): QueryPairs,
) -> Json<SectionView> {
    let raw = RawFilter::from_pairs(pairs);
    let limit = raw.limit();
    chart(&state, &raw, Operation::TopSeasonsShows { limit }).await
}

/// GET /api/charts/average-scores
pub async fn average_scores(
    State(state): State<AppState>,
    Query(pairs): QueryPairs,
) -> Json<SectionView> {
    let raw = RawFilter::from_pairs(pairs);
    chart(&state, &raw, Operation::AverageScoresByType).await
}
