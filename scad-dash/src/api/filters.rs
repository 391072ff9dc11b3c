//! Filter control ranges
//!
//! Year slider bounds come from the dataset; the score slider is fixed.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::filter::{ContentTypeFilter, SCORE_MAX, SCORE_MIN};
use crate::AppState;

/// Step of the minimum-score slider
pub const SCORE_STEP: f64 = 0.1;

#[derive(Debug, Serialize)]
pub struct BoundsResponse {
    pub year_min: i64,
    pub year_max: i64,
    pub score_min: f64,
    pub score_max: f64,
    pub score_step: f64,
    pub content_types: Vec<ContentTypeFilter>,
}

/// GET /api/filters/bounds
pub async fn get_bounds(State(state): State<AppState>) -> Json<BoundsResponse> {
    let bounds = state.analytics.year_bounds().await;

    Json(BoundsResponse {
        year_min: bounds.min,
        year_max: bounds.max,
        score_min: SCORE_MIN,
        score_max: SCORE_MAX,
        score_step: SCORE_STEP,
        content_types: vec![
            ContentTypeFilter::All,
            ContentTypeFilter::Movie,
            ContentTypeFilter::Show,
        ],
    })
}
