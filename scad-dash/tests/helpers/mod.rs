//! Shared fixtures: small catalogs written to a temp dir, then opened read-only

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use scad_dash::analytics::Analytics;
use scad_dash::cache::QueryCache;
use scad_dash::db::Store;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode};
use sqlx::{ConnectOptions, Connection, Executor};
use tempfile::TempDir;

pub const TITLES_DDL: &str = "CREATE TABLE titles (
    title TEXT,
    type TEXT,
    release_year INTEGER,
    imdb_score REAL,
    tmdb_score REAL,
    age_certification TEXT,
    production_countries TEXT,
    seasons REAL
)";

/// One row of the `titles` table
#[derive(Debug, Clone, Default)]
pub struct TitleRow {
    pub title: String,
    pub content_type: String,
    pub release_year: Option<i64>,
    pub imdb_score: Option<f64>,
    pub tmdb_score: Option<f64>,
    pub age_certification: Option<String>,
    pub production_countries: Option<String>,
    pub seasons: Option<f64>,
}

impl TitleRow {
    pub fn movie(title: &str, year: i64, imdb: f64) -> Self {
        Self {
            title: title.to_string(),
            content_type: "MOVIE".to_string(),
            release_year: Some(year),
            imdb_score: Some(imdb),
            ..Default::default()
        }
    }

    pub fn show(title: &str, year: i64, imdb: f64, seasons: f64) -> Self {
        Self {
            title: title.to_string(),
            content_type: "SHOW".to_string(),
            release_year: Some(year),
            imdb_score: Some(imdb),
            seasons: Some(seasons),
            ..Default::default()
        }
    }

    pub fn raw_type(mut self, raw: &str) -> Self {
        self.content_type = raw.to_string();
        self
    }

    pub fn year(mut self, year: Option<i64>) -> Self {
        self.release_year = year;
        self
    }

    pub fn imdb(mut self, score: Option<f64>) -> Self {
        self.imdb_score = score;
        self
    }

    pub fn tmdb(mut self, score: f64) -> Self {
        self.tmdb_score = Some(score);
        self
    }

    pub fn certification(mut self, cert: &str) -> Self {
        self.age_certification = Some(cert.to_string());
        self
    }

    pub fn countries(mut self, encoded: &str) -> Self {
        self.production_countries = Some(encoded.to_string());
        self
    }
}

/// A catalog file that lives as long as the fixture
pub struct Fixture {
    pub dir: TempDir,
    pub path: PathBuf,
    pub store: Store,
}

impl Fixture {
    pub fn analytics(&self) -> Analytics {
        Analytics::new(self.store.clone(), Arc::new(QueryCache::new()))
    }
}

/// Write `rows` into a fresh catalog and open it through the store
pub async fn catalog(rows: &[TitleRow]) -> Fixture {
    catalog_with_schema(TITLES_DDL, rows).await
}

/// Like [`catalog`] but with a custom `titles` definition
///
/// Rows are inserted column by column, so the schema must have every column.
/// Pass no rows for partial schemas.
pub async fn catalog_with_schema(ddl: &str, rows: &[TitleRow]) -> Fixture {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("titles.db");

    let mut conn = SqliteConnectOptions::new()
        .filename(&path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Delete)
        .connect()
        .await
        .expect("create fixture db");
    conn.execute(ddl).await.expect("fixture ddl");

    for row in rows {
        sqlx::query(
            "INSERT INTO titles (title, type, release_year, imdb_score, tmdb_score, \
             age_certification, production_countries, seasons) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&row.title)
        .bind(&row.content_type)
        .bind(row.release_year)
        .bind(row.imdb_score)
        .bind(row.tmdb_score)
        .bind(&row.age_certification)
        .bind(&row.production_countries)
        .bind(row.seasons)
        .execute(&mut conn)
        .await
        .expect("insert fixture row");
    }
    conn.close().await.expect("close fixture db");

    let store = Store::open(&path).await.expect("open fixture read-only");
    Fixture { dir, path, store }
}
