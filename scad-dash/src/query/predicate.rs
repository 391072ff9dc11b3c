//! Typed WHERE-clause construction
//!
//! Every value is bound as a parameter; column names come from a closed
//! enumeration. The "0 means unset" score rule and the sentinel rules for
//! certification and country columns live here and in the filter model only.

use scad_common::catalog::{CERTIFICATION_SENTINELS, COUNTRY_SENTINELS};
use scad_common::ContentType;
use sqlx::{QueryBuilder, Sqlite};

use crate::filter::FilterSet;

/// Columns of the `titles` table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Title,
    Type,
    ReleaseYear,
    ImdbScore,
    TmdbScore,
    AgeCertification,
    ProductionCountries,
    Seasons,
}

impl Column {
    pub fn name(&self) -> &'static str {
        match self {
            Column::Title => "title",
            Column::Type => "type",
            Column::ReleaseYear => "release_year",
            Column::ImdbScore => "imdb_score",
            Column::TmdbScore => "tmdb_score",
            Column::AgeCertification => "age_certification",
            Column::ProductionCountries => "production_countries",
            Column::Seasons => "seasons",
        }
    }

    /// Non-null values that mean "absent" for this column
    pub fn sentinels(&self) -> &'static [&'static str] {
        match self {
            Column::AgeCertification => CERTIFICATION_SENTINELS,
            Column::ProductionCountries => COUNTRY_SENTINELS,
            _ => &[],
        }
    }
}

/// A single condition on a `titles` row
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `UPPER(TRIM(type)) = ?`
    TypeIs(ContentType),
    /// `release_year >= ?`
    YearAtLeast(i64),
    /// `release_year <= ?`
    YearAtMost(i64),
    /// `imdb_score >= ?`
    ScoreAtLeast(f64),
    /// `<column> IS NOT NULL`
    NotNull(Column),
    /// Not null and not one of the column's sentinel strings
    Present(Column),
}

impl Predicate {
    fn push_sql(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        match self {
            Predicate::TypeIs(content_type) => {
                qb.push("UPPER(TRIM(type)) = ");
                qb.push_bind(content_type.as_db_str());
            }
            Predicate::YearAtLeast(year) => {
                qb.push("release_year >= ");
                qb.push_bind(*year);
            }
            Predicate::YearAtMost(year) => {
                qb.push("release_year <= ");
                qb.push_bind(*year);
            }
            Predicate::ScoreAtLeast(score) => {
                qb.push("imdb_score >= ");
                qb.push_bind(*score);
            }
            Predicate::NotNull(column) => {
                qb.push(column.name());
                qb.push(" IS NOT NULL");
            }
            Predicate::Present(column) => {
                qb.push(column.name());
                qb.push(" IS NOT NULL");
                for sentinel in column.sentinels() {
                    qb.push(" AND ");
                    qb.push(column.name());
                    qb.push(" != ");
                    qb.push_bind(*sentinel);
                }
            }
        }
    }
}

/// Conjunction of predicates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conditions(Vec<Predicate>);

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Conditions implied by a filter set: type (unless All), year bounds, minimum score
    pub fn from_filter(filter: &FilterSet) -> Self {
        let mut conditions = Self::new();
        if let Some(content_type) = filter.content_type.content_type() {
            conditions.0.push(Predicate::TypeIs(content_type));
        }
        conditions.push_bounds(filter);
        conditions
    }

    /// Like [`Conditions::from_filter`] but with the type fixed, whatever the filter selects
    pub fn for_type(content_type: ContentType, filter: &FilterSet) -> Self {
        let mut conditions = Self(vec![Predicate::TypeIs(content_type)]);
        conditions.push_bounds(filter);
        conditions
    }

    fn push_bounds(&mut self, filter: &FilterSet) {
        if let Some(year) = filter.year_min {
            self.0.push(Predicate::YearAtLeast(year));
        }
        if let Some(year) = filter.year_max {
            self.0.push(Predicate::YearAtMost(year));
        }
        if let Some(score) = filter.min_score() {
            self.0.push(Predicate::ScoreAtLeast(score));
        }
    }

    pub fn and(mut self, predicate: Predicate) -> Self {
        self.0.push(predicate);
        self
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.0
    }

    /// Append ` WHERE a AND b ...`; nothing when empty
    pub fn push_where(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        for (i, predicate) in self.0.iter().enumerate() {
            qb.push(if i == 0 { " WHERE " } else { " AND " });
            predicate.push_sql(qb);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::ContentTypeFilter;

    fn render(conditions: &Conditions) -> String {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM titles");
        conditions.push_where(&mut qb);
        qb.sql().to_string()
    }

    #[test]
    fn test_empty_conditions_render_nothing() {
        assert_eq!(render(&Conditions::new()), "SELECT * FROM titles");
        assert_eq!(render(&Conditions::from_filter(&FilterSet::default())), "SELECT * FROM titles");
    }

    #[test]
    fn test_values_are_bound_not_inlined() {
        let filter = FilterSet::default()
            .with_years(Some(1990), Some(2000))
            .with_min_score(Some(7.0))
            .with_content_type(ContentTypeFilter::Movie);
        let sql = render(&Conditions::from_filter(&filter));

        assert_eq!(
            sql,
            "SELECT * FROM titles WHERE UPPER(TRIM(type)) = ? AND release_year >= ? \
             AND release_year <= ? AND imdb_score >= ?"
        );
        assert!(!sql.contains("1990"));
        assert!(!sql.contains("MOVIE"));
    }

    #[test]
    fn test_zero_score_adds_no_predicate() {
        let filter = FilterSet::default().with_min_score(Some(0.0));
        assert!(Conditions::from_filter(&filter).predicates().is_empty());
    }

    #[test]
    fn test_for_type_ignores_filter_type() {
        let filter = FilterSet::default().with_content_type(ContentTypeFilter::Movie);
        let conditions = Conditions::for_type(ContentType::Show, &filter);
        assert_eq!(conditions.predicates(), &[Predicate::TypeIs(ContentType::Show)]);
    }

    #[test]
    fn test_present_expands_sentinels() {
        let sql = render(&Conditions::new().and(Predicate::Present(Column::AgeCertification)));
        assert_eq!(
            sql,
            "SELECT * FROM titles WHERE age_certification IS NOT NULL \
             AND age_certification != ? AND age_certification != ?"
        );

        let sql = render(&Conditions::new().and(Predicate::Present(Column::Seasons)));
        assert_eq!(sql, "SELECT * FROM titles WHERE seasons IS NOT NULL");
    }
}
