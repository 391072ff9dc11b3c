//! Top and bottom score rankings

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use super::QueryPairs;
use crate::filter::RawFilter;
use crate::presentation::{present_section, SectionView};
use crate::query::{Operation, RankingKind};
use crate::AppState;

/// GET /api/rankings/:kind
///
/// `kind` is one of `top-movies`, `bottom-movies`, `top-shows`, `bottom-shows`.
/// The content type is fixed by the kind; `content_type` in the query is ignored.
pub async fn get_ranking(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(pairs): QueryPairs,
) -> Result<Json<SectionView>, RankingError> {
    let kind = RankingKind::from_slug(&kind).ok_or(RankingError::UnknownKind(kind))?;
    let raw = RawFilter::from_pairs(pairs);

    let filter = super::resolve_filter(&state, &raw).await;
    let operation = Operation::Ranking {
        kind,
        limit: raw.limit(),
    };
    let section = state.analytics.run(operation, filter).await;

    Ok(Json(present_section(&section)))
}

#[derive(Debug)]
pub enum RankingError {
    UnknownKind(String),
}

impl IntoResponse for RankingError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            RankingError::UnknownKind(kind) => {
                (StatusCode::NOT_FOUND, format!("Unknown ranking: {}", kind))
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
