//! Aggregation query layer
//!
//! Each operation takes a [`FilterSet`] (plus a limit where relevant) and
//! returns ordered rows with stable column names. Ties are broken by storage
//! order (`rowid`) so results are deterministic for a given dataset.

use scad_common::catalog::TITLES_TABLE;
use scad_common::{ContentType, Result};
use serde::Serialize;
use sqlx::{FromRow, QueryBuilder, Sqlite};
use tracing::debug;

use crate::db::Store;
use crate::filter::{FilterSet, YearBounds};

pub mod predicate;

use predicate::{Column, Conditions, Predicate};

/// Row cap of the production-country aggregation
pub const COUNTRY_GROUP_LIMIT: i64 = 50;

/// Row cap of the certification aggregation
pub const CERTIFICATION_LIMIT: i64 = 5;

/// Earliest decade included in the decade histogram
pub const DECADE_FLOOR_YEAR: i64 = 1940;

/// Direction of a score ranking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RankingKind {
    TopMovies,
    BottomMovies,
    TopShows,
    BottomShows,
}

impl RankingKind {
    pub const ALL: [RankingKind; 4] = [
        RankingKind::TopMovies,
        RankingKind::TopShows,
        RankingKind::BottomMovies,
        RankingKind::BottomShows,
    ];

    pub fn content_type(&self) -> ContentType {
        match self {
            RankingKind::TopMovies | RankingKind::BottomMovies => ContentType::Movie,
            RankingKind::TopShows | RankingKind::BottomShows => ContentType::Show,
        }
    }

    pub fn descending(&self) -> bool {
        matches!(self, RankingKind::TopMovies | RankingKind::TopShows)
    }

    /// URL path segment, e.g. `top-movies`
    pub fn slug(&self) -> &'static str {
        match self {
            RankingKind::TopMovies => "top-movies",
            RankingKind::BottomMovies => "bottom-movies",
            RankingKind::TopShows => "top-shows",
            RankingKind::BottomShows => "bottom-shows",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.slug() == slug)
    }
}

/// A named aggregation together with its operation-specific arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Ranking { kind: RankingKind, limit: i64 },
    ProductionCountries,
    DecadeHistogram,
    AgeCertificationTop,
    TopSeasonsShows { limit: i64 },
    AverageScoresByType,
}

impl Operation {
    pub const fn ranking(kind: RankingKind, limit: i64) -> Self {
        Operation::Ranking { kind, limit }
    }

    /// Whether the operation selects its own content type, ignoring the filter's
    pub fn fixes_type(&self) -> bool {
        matches!(self, Operation::Ranking { .. } | Operation::TopSeasonsShows { .. })
    }

    /// Stable machine name
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Ranking { kind, .. } => match kind {
                RankingKind::TopMovies => "top_movies",
                RankingKind::BottomMovies => "bottom_movies",
                RankingKind::TopShows => "top_shows",
                RankingKind::BottomShows => "bottom_shows",
            },
            Operation::ProductionCountries => "production_countries",
            Operation::DecadeHistogram => "decade_histogram",
            Operation::AgeCertificationTop => "age_certification_top",
            Operation::TopSeasonsShows { .. } => "top_seasons_shows",
            Operation::AverageScoresByType => "average_scores_by_type",
        }
    }

    /// Column names of the rows this operation returns, in order
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Operation::Ranking { .. } => &["title", "imdb_score", "release_year"],
            Operation::ProductionCountries => &["production_countries", "count"],
            Operation::DecadeHistogram => &["decade", "type", "count"],
            Operation::AgeCertificationTop => &["age_certification", "count"],
            Operation::TopSeasonsShows { .. } => &["title", "total_seasons", "release_year"],
            Operation::AverageScoresByType => &["type", "avg_imdb_score", "avg_tmdb_score"],
        }
    }
}

/// Title ranked by IMDb score
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct RankedTitle {
    pub title: String,
    pub imdb_score: f64,
    pub release_year: Option<i64>,
}

/// Count of titles sharing one raw encoded country list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct CountryListCount {
    pub production_countries: String,
    pub count: i64,
}

/// Titles per decade and type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecadeCount {
    pub decade: i64,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub count: i64,
}

/// Titles per age certification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct CertificationCount {
    pub age_certification: String,
    pub count: i64,
}

/// Seasons summed over every row of one show title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct SeasonTotal {
    pub title: String,
    pub total_seasons: i64,
    pub release_year: Option<i64>,
}

/// Mean scores of one content type, rounded to 2 decimals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeAverage {
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub avg_imdb_score: f64,
    pub avg_tmdb_score: f64,
}

/// Per-type rows as they come back from SQLite, before the type is resolved
#[derive(Debug, FromRow)]
struct RawDecadeCount {
    decade: i64,
    #[sqlx(rename = "type")]
    content_type: String,
    count: i64,
}

#[derive(Debug, FromRow)]
struct RawTypeAverage {
    #[sqlx(rename = "type")]
    content_type: String,
    avg_imdb_score: f64,
    avg_tmdb_score: f64,
}

/// Result of any operation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResultTable {
    Rankings(Vec<RankedTitle>),
    CountryLists(Vec<CountryListCount>),
    Decades(Vec<DecadeCount>),
    Certifications(Vec<CertificationCount>),
    Seasons(Vec<SeasonTotal>),
    AverageScores(Vec<TypeAverage>),
}

impl ResultTable {
    /// Empty table of the shape `operation` produces
    pub fn empty_for(operation: &Operation) -> Self {
        match operation {
            Operation::Ranking { .. } => ResultTable::Rankings(Vec::new()),
            Operation::ProductionCountries => ResultTable::CountryLists(Vec::new()),
            Operation::DecadeHistogram => ResultTable::Decades(Vec::new()),
            Operation::AgeCertificationTop => ResultTable::Certifications(Vec::new()),
            Operation::TopSeasonsShows { .. } => ResultTable::Seasons(Vec::new()),
            Operation::AverageScoresByType => ResultTable::AverageScores(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ResultTable::Rankings(rows) => rows.len(),
            ResultTable::CountryLists(rows) => rows.len(),
            ResultTable::Decades(rows) => rows.len(),
            ResultTable::Certifications(rows) => rows.len(),
            ResultTable::Seasons(rows) => rows.len(),
            ResultTable::AverageScores(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Run `operation` against the store
pub async fn execute(
    store: &Store,
    operation: &Operation,
    filter: &FilterSet,
) -> Result<ResultTable> {
    debug!(operation = operation.name(), ?filter, "Executing aggregation");
    let table = match *operation {
        Operation::Ranking { kind, limit } => {
            ResultTable::Rankings(ranking(store, kind, filter, limit).await?)
        }
        Operation::ProductionCountries => {
            ResultTable::CountryLists(production_countries(store, filter).await?)
        }
        Operation::DecadeHistogram => ResultTable::Decades(decade_histogram(store, filter).await?),
        Operation::AgeCertificationTop => {
            ResultTable::Certifications(age_certification_top(store, filter).await?)
        }
        Operation::TopSeasonsShows { limit } => {
            ResultTable::Seasons(top_seasons_shows(store, filter, limit).await?)
        }
        Operation::AverageScoresByType => {
            ResultTable::AverageScores(average_scores_by_type(store, filter).await?)
        }
    };
    Ok(table)
}

fn select(columns: &str) -> QueryBuilder<'static, Sqlite> {
    let mut qb = QueryBuilder::new("SELECT ");
    qb.push(columns);
    qb.push(" FROM ");
    qb.push(TITLES_TABLE);
    qb
}

/// Top or bottom titles of one type by IMDb score
///
/// The filter's content type is ignored; the ranking kind fixes the type.
pub async fn ranking(
    store: &Store,
    kind: RankingKind,
    filter: &FilterSet,
    limit: i64,
) -> Result<Vec<RankedTitle>> {
    let mut qb = select(
        "COALESCE(title, '') AS title, \
         CAST(imdb_score AS REAL) AS imdb_score, \
         CAST(release_year AS INTEGER) AS release_year",
    );
    Conditions::for_type(kind.content_type(), filter)
        .and(Predicate::NotNull(Column::ImdbScore))
        .push_where(&mut qb);
    qb.push(if kind.descending() {
        " ORDER BY imdb_score DESC, rowid ASC"
    } else {
        " ORDER BY imdb_score ASC, rowid ASC"
    });
    qb.push(" LIMIT ");
    qb.push_bind(limit);

    store.fetch_all(qb).await
}

/// Title counts grouped by the raw encoded country list (not per country)
pub async fn production_countries(
    store: &Store,
    filter: &FilterSet,
) -> Result<Vec<CountryListCount>> {
    let mut qb = select("production_countries, COUNT(*) AS count");
    Conditions::from_filter(filter)
        .and(Predicate::Present(Column::ProductionCountries))
        .push_where(&mut qb);
    qb.push(" GROUP BY production_countries ORDER BY count DESC, MIN(rowid) ASC LIMIT ");
    qb.push_bind(COUNTRY_GROUP_LIMIT);

    store.fetch_all(qb).await
}

/// Title counts per decade (`floor(year / 10) * 10`) and type, from 1940 on
pub async fn decade_histogram(store: &Store, filter: &FilterSet) -> Result<Vec<DecadeCount>> {
    let mut qb = select(
        "(CAST(release_year AS INTEGER) / 10) * 10 AS decade, \
         COALESCE(UPPER(TRIM(type)), '') AS type, \
         COUNT(*) AS count",
    );
    Conditions::from_filter(filter)
        .and(Predicate::NotNull(Column::ReleaseYear))
        .and(Predicate::YearAtLeast(DECADE_FLOOR_YEAR))
        .push_where(&mut qb);
    qb.push(" GROUP BY decade, UPPER(TRIM(type))");
    qb.push(" ORDER BY decade ASC, UPPER(TRIM(type)) ASC");

    let rows: Vec<RawDecadeCount> = store.fetch_all(qb).await?;
    Ok(rows
        .into_iter()
        .filter_map(|row| {
            resolve_type(&row.content_type).map(|content_type| DecadeCount {
                decade: row.decade,
                content_type,
                count: row.count,
            })
        })
        .collect())
}

/// The most common age certifications
pub async fn age_certification_top(
    store: &Store,
    filter: &FilterSet,
) -> Result<Vec<CertificationCount>> {
    let mut qb = select("age_certification, COUNT(*) AS count");
    Conditions::from_filter(filter)
        .and(Predicate::Present(Column::AgeCertification))
        .push_where(&mut qb);
    qb.push(" GROUP BY age_certification ORDER BY count DESC, MIN(rowid) ASC LIMIT ");
    qb.push_bind(CERTIFICATION_LIMIT);

    store.fetch_all(qb).await
}

/// Shows with the most seasons, summed over every row sharing a title
///
/// `release_year` is the earliest year among the title's rows.
pub async fn top_seasons_shows(
    store: &Store,
    filter: &FilterSet,
    limit: i64,
) -> Result<Vec<SeasonTotal>> {
    let mut qb = select(
        "COALESCE(title, '') AS title, \
         CAST(SUM(seasons) AS INTEGER) AS total_seasons, \
         MIN(CAST(release_year AS INTEGER)) AS release_year",
    );
    Conditions::for_type(ContentType::Show, filter)
        .and(Predicate::NotNull(Column::Seasons))
        .push_where(&mut qb);
    qb.push(" GROUP BY title ORDER BY total_seasons DESC, MIN(rowid) ASC LIMIT ");
    qb.push_bind(limit);

    store.fetch_all(qb).await
}

/// Mean IMDb and TMDB score per type over rows where both are present
pub async fn average_scores_by_type(
    store: &Store,
    filter: &FilterSet,
) -> Result<Vec<TypeAverage>> {
    let mut qb = select(
        "COALESCE(UPPER(TRIM(type)), '') AS type, \
         ROUND(AVG(imdb_score), 2) AS avg_imdb_score, \
         ROUND(AVG(tmdb_score), 2) AS avg_tmdb_score",
    );
    Conditions::from_filter(filter)
        .and(Predicate::NotNull(Column::ImdbScore))
        .and(Predicate::NotNull(Column::TmdbScore))
        .push_where(&mut qb);
    qb.push(" GROUP BY UPPER(TRIM(type)) ORDER BY UPPER(TRIM(type)) ASC");

    let rows: Vec<RawTypeAverage> = store.fetch_all(qb).await?;
    Ok(rows
        .into_iter()
        .filter_map(|row| {
            resolve_type(&row.content_type).map(|content_type| TypeAverage {
                content_type,
                avg_imdb_score: row.avg_imdb_score,
                avg_tmdb_score: row.avg_tmdb_score,
            })
        })
        .collect())
}

/// Observed release-year range; fallbacks fill in when there are no years
pub async fn year_bounds(store: &Store) -> Result<YearBounds> {
    let mut qb = select(
        "MIN(CAST(release_year AS INTEGER)) AS min_year, \
         MAX(CAST(release_year AS INTEGER)) AS max_year",
    );
    Conditions::new()
        .and(Predicate::NotNull(Column::ReleaseYear))
        .push_where(&mut qb);

    let row: Option<(Option<i64>, Option<i64>)> = store.fetch_optional(qb).await?;
    let (min, max) = row.unwrap_or((None, None));
    Ok(YearBounds::from_observed(min, max))
}

fn resolve_type(raw: &str) -> Option<ContentType> {
    match raw.parse() {
        Ok(content_type) => Some(content_type),
        Err(_) => {
            debug!("Skipping row with unrecognized type '{}'", raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranking_kind_slugs_round_trip() {
        for kind in RankingKind::ALL {
            assert_eq!(RankingKind::from_slug(kind.slug()), Some(kind));
        }
        assert_eq!(RankingKind::from_slug("middle-movies"), None);
    }

    #[test]
    fn test_ranking_kind_direction_and_type() {
        assert!(RankingKind::TopShows.descending());
        assert!(!RankingKind::BottomMovies.descending());
        assert_eq!(RankingKind::BottomShows.content_type(), ContentType::Show);
        assert_eq!(RankingKind::TopMovies.content_type(), ContentType::Movie);
    }

    #[test]
    fn test_empty_table_matches_operation_shape() {
        let op = Operation::TopSeasonsShows { limit: 3 };
        let table = ResultTable::empty_for(&op);
        assert!(matches!(table, ResultTable::Seasons(ref rows) if rows.is_empty()));
        assert!(table.is_empty());
    }

    #[test]
    fn test_operation_names_are_distinct() {
        let ops = [
            Operation::ranking(RankingKind::TopMovies, 10),
            Operation::ranking(RankingKind::BottomMovies, 10),
            Operation::ranking(RankingKind::TopShows, 10),
            Operation::ranking(RankingKind::BottomShows, 10),
            Operation::ProductionCountries,
            Operation::DecadeHistogram,
            Operation::AgeCertificationTop,
            Operation::TopSeasonsShows { limit: 10 },
            Operation::AverageScoresByType,
        ];
        let names: std::collections::HashSet<_> = ops.iter().map(|op| op.name()).collect();
        assert_eq!(names.len(), ops.len());
    }

    #[test]
    fn test_fixed_type_operations() {
        assert!(Operation::ranking(RankingKind::BottomShows, 5).fixes_type());
        assert!(Operation::TopSeasonsShows { limit: 5 }.fixes_type());
        assert!(!Operation::AverageScoresByType.fixes_type());
        assert!(!Operation::DecadeHistogram.fixes_type());
    }
}
