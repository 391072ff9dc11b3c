//! Presentation adapter
//!
//! Shapes result tables for charts and tables: display column names, 1-based
//! ranks, heat colors, per-country fan-out and the decade pivot. Nothing here
//! changes what the aggregation layer computed.

use std::collections::BTreeMap;

use scad_common::ContentType;
use serde::Serialize;
use serde_json::{json, Value};

use crate::analytics::{Dashboard, Section};
use crate::filter::{FilterSet, YearBounds};
use crate::query::{
    CountryListCount, DecadeCount, Operation, RankedTitle, RankingKind, ResultTable, TypeAverage,
};

/// Column-oriented table ready for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableView {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// Titles attributed to one production country after fan-out
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryTotal {
    pub country: String,
    pub count: i64,
}

/// Movie and show counts of one decade
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecadeBucket {
    pub decade: i64,
    pub movies: i64,
    pub shows: i64,
}

/// Chart-ready extras attached to a section
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Chart {
    Ranking { table: TableView },
    Choropleth { countries: Vec<CountryTotal> },
    DecadeBars { decades: Vec<DecadeBucket> },
    Comparison { table: TableView },
}

/// Serialized form of a [`Section`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionView {
    pub name: String,
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub notice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<Chart>,
}

/// Serialized form of a [`Dashboard`]
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub filter: FilterSet,
    pub bounds: YearBounds,
    pub sections: Vec<SectionView>,
}

pub fn present_dashboard(dashboard: &Dashboard) -> DashboardView {
    DashboardView {
        filter: dashboard.filter,
        bounds: dashboard.bounds,
        sections: dashboard.sections.iter().map(present_section).collect(),
    }
}

pub fn present_section(section: &Section) -> SectionView {
    let columns = section.operation.columns();
    let chart = match section.table.as_ref() {
        ResultTable::Rankings(rows) => Some(Chart::Ranking {
            table: ranking_table(rows),
        }),
        ResultTable::CountryLists(rows) => Some(Chart::Choropleth {
            countries: country_totals(rows),
        }),
        ResultTable::Decades(rows) => Some(Chart::DecadeBars {
            decades: decade_pivot(rows),
        }),
        ResultTable::AverageScores(rows) => Some(Chart::Comparison {
            table: average_table(rows),
        }),
        ResultTable::Certifications(_) | ResultTable::Seasons(_) => None,
    };

    SectionView {
        name: section.operation.name().to_string(),
        title: section_title(&section.operation),
        columns: columns.iter().map(|c| c.to_string()).collect(),
        rows: table_rows(&section.table, columns),
        notice: section.notice.clone(),
        chart,
    }
}

/// Human readable heading of a section
pub fn section_title(operation: &Operation) -> String {
    match operation {
        Operation::Ranking { kind, limit } => {
            let (end, noun) = match kind {
                RankingKind::TopMovies => ("Top", "Movies"),
                RankingKind::TopShows => ("Top", "TV Shows"),
                RankingKind::BottomMovies => ("Bottom", "Movies"),
                RankingKind::BottomShows => ("Bottom", "TV Shows"),
            };
            format!("{} {} {}", end, limit, noun)
        }
        Operation::ProductionCountries => "Production Countries".to_string(),
        Operation::DecadeHistogram => "Titles by Decade".to_string(),
        Operation::AgeCertificationTop => "Top Age Certifications".to_string(),
        Operation::TopSeasonsShows { limit } => format!("Top {} Shows by Seasons", limit),
        Operation::AverageScoresByType => "Average Scores by Type".to_string(),
    }
}

/// Rows as arrays of values, in the order of `columns`
pub fn table_rows(table: &ResultTable, columns: &[&str]) -> Vec<Vec<Value>> {
    let Ok(Value::Array(rows)) = serde_json::to_value(table) else {
        return Vec::new();
    };

    rows.into_iter()
        .map(|row| {
            columns
                .iter()
                .map(|column| row.get(*column).cloned().unwrap_or(Value::Null))
                .collect()
        })
        .collect()
}

/// Ranking table with 1-based rank, 2-decimal score and a heat color per score
pub fn ranking_table(rows: &[RankedTitle]) -> TableView {
    let min = rows.iter().map(|r| r.imdb_score).fold(f64::INFINITY, f64::min);
    let max = rows.iter().map(|r| r.imdb_score).fold(f64::NEG_INFINITY, f64::max);

    TableView {
        columns: ["Rank", "Title", "IMDb Score", "Year", "Color"]
            .iter()
            .map(|c| c.to_string())
            .collect(),
        rows: rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                vec![
                    json!(i + 1),
                    json!(row.title),
                    json!(format!("{:.2}", row.imdb_score)),
                    json!(row.release_year),
                    json!(heat_color(row.imdb_score, min, max)),
                ]
            })
            .collect(),
    }
}

/// Red gradient from dark (table minimum) to bright (table maximum)
pub fn heat_color(score: f64, min: f64, max: f64) -> String {
    let range = if max != min { max - min } else { 1.0 };
    let normalized = ((score - min) / range).clamp(0.0, 1.0);
    let red = (100.0 + normalized * 155.0) as u8;
    format!("rgb({}, 9, 20)", red)
}

/// Decode an encoded country list such as `['US', 'GB']` or `["US","GB"]`
///
/// Returns `None` for anything that is not a bracketed list of quoted codes.
pub fn decode_country_list(raw: &str) -> Option<Vec<String>> {
    let raw = raw.trim();
    if !(raw.starts_with('[') && raw.ends_with(']')) {
        return None;
    }

    serde_json::from_str::<Vec<String>>(raw)
        .or_else(|_| serde_json::from_str::<Vec<String>>(&raw.replace('\'', "\"")))
        .ok()
        .map(|codes| {
            codes
                .into_iter()
                .map(|code| code.trim().to_string())
                .filter(|code| !code.is_empty())
                .collect()
        })
}

/// Fan each group's count out to every country in its list
///
/// One title listing several countries counts once for each of them.
/// Undecodable lists are skipped.
pub fn country_totals(rows: &[CountryListCount]) -> Vec<CountryTotal> {
    let mut totals: BTreeMap<String, i64> = BTreeMap::new();
    for row in rows {
        let Some(codes) = decode_country_list(&row.production_countries) else {
            continue;
        };
        for code in codes {
            *totals.entry(code).or_insert(0) += row.count;
        }
    }

    let mut totals: Vec<CountryTotal> = totals
        .into_iter()
        .map(|(country, count)| CountryTotal { country, count })
        .collect();
    // BTreeMap order already sorts by code; stable sort keeps it for equal counts
    totals.sort_by(|a, b| b.count.cmp(&a.count));
    totals
}

/// One bucket per decade with movie and show counts side by side
pub fn decade_pivot(rows: &[DecadeCount]) -> Vec<DecadeBucket> {
    let mut buckets: BTreeMap<i64, DecadeBucket> = BTreeMap::new();
    for row in rows {
        let bucket = buckets.entry(row.decade).or_insert(DecadeBucket {
            decade: row.decade,
            movies: 0,
            shows: 0,
        });
        match row.content_type {
            ContentType::Movie => bucket.movies += row.count,
            ContentType::Show => bucket.shows += row.count,
        }
    }
    buckets.into_values().collect()
}

pub fn average_table(rows: &[TypeAverage]) -> TableView {
    TableView {
        columns: ["Type", "Avg IMDb Score", "Avg TMDB Score"]
            .iter()
            .map(|c| c.to_string())
            .collect(),
        rows: rows
            .iter()
            .map(|row| {
                vec![
                    json!(row.content_type.label()),
                    json!(row.avg_imdb_score),
                    json!(row.avg_tmdb_score),
                ]
            })
            .collect(),
    }
}
