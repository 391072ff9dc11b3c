//! Full dashboard render pass

use axum::{
    extract::{Query, State},
    Json,
};
use tracing::info;

use super::QueryPairs;
use crate::filter::RawFilter;
use crate::presentation::{present_dashboard, DashboardView};
use crate::AppState;

/// GET /api/dashboard
///
/// Every section for one set of filter selections, in display order.
pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(pairs): QueryPairs,
) -> Json<DashboardView> {
    let raw = RawFilter::from_pairs(pairs);
    let filter = super::resolve_filter(&state, &raw).await;
    let dashboard = state.analytics.dashboard(filter, raw.limit()).await;

    let degraded = dashboard.sections.iter().filter(|s| s.is_degraded()).count();
    if degraded > 0 {
        info!("Dashboard rendered with {} empty section(s)", degraded);
    }

    Json(present_dashboard(&dashboard))
}
