//! Filter model
//!
//! Normalizes raw user selections (content type, year range, minimum score)
//! into a canonical [`FilterSet`]. There is no error path: anything
//! malformed degrades to "no filter".

use scad_common::ContentType;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Lower year bound used when the dataset has no release years
pub const FALLBACK_YEAR_MIN: i64 = 1900;

/// Upper year bound used when the dataset has no release years
pub const FALLBACK_YEAR_MAX: i64 = 2024;

/// Inclusive score range of the minimum-score control
pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 10.0;

/// Row limit applied when none (or a nonsensical one) is requested
pub const DEFAULT_LIMIT: i64 = 10;

/// Largest caller-supplied row limit
pub const MAX_LIMIT: i64 = 100;

/// Content type selection; `All` applies no type restriction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentTypeFilter {
    #[default]
    All,
    Movie,
    Show,
}

impl ContentTypeFilter {
    /// Case-insensitive parse; unknown or missing input means `All`
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        match raw.map(ContentType::from_str) {
            Some(Ok(ContentType::Movie)) => ContentTypeFilter::Movie,
            Some(Ok(ContentType::Show)) => ContentTypeFilter::Show,
            _ => ContentTypeFilter::All,
        }
    }

    /// The single type this selection restricts to, if any
    pub fn content_type(&self) -> Option<ContentType> {
        match self {
            ContentTypeFilter::All => None,
            ContentTypeFilter::Movie => Some(ContentType::Movie),
            ContentTypeFilter::Show => Some(ContentType::Show),
        }
    }
}

/// A minimum IMDb score that is actually applied (finite, in (0, 10])
///
/// Compared and hashed by bit pattern so it can take part in cache keys.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(transparent)]
pub struct MinScore(f64);

impl MinScore {
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl PartialEq for MinScore {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for MinScore {}

impl Hash for MinScore {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

/// Apply the minimum-score policy
///
/// Exactly 0 means "no filter", not "score >= 0". Negative, non-finite and
/// out-of-range values are malformed and also mean "no filter".
pub fn normalize_min_score(raw: Option<f64>) -> Option<MinScore> {
    raw.filter(|s| s.is_finite() && *s > SCORE_MIN && *s <= SCORE_MAX)
        .map(MinScore)
}

/// Row limit policy: missing, non-positive or oversized limits fall back to the default
pub fn normalize_limit(raw: Option<i64>) -> i64 {
    raw.filter(|l| (1..=MAX_LIMIT).contains(l))
        .unwrap_or(DEFAULT_LIMIT)
}

/// Observed release-year range of the dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearBounds {
    pub min: i64,
    pub max: i64,
}

impl Default for YearBounds {
    fn default() -> Self {
        Self {
            min: FALLBACK_YEAR_MIN,
            max: FALLBACK_YEAR_MAX,
        }
    }
}

impl YearBounds {
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    /// Build from `MIN/MAX(release_year)`; a missing side takes its fallback
    pub fn from_observed(min: Option<i64>, max: Option<i64>) -> Self {
        let bounds = Self {
            min: min.unwrap_or(FALLBACK_YEAR_MIN),
            max: max.unwrap_or(FALLBACK_YEAR_MAX),
        };
        if bounds.min > bounds.max {
            Self::default()
        } else {
            bounds
        }
    }

    fn clamp(&self, year: i64) -> i64 {
        year.clamp(self.min, self.max)
    }
}

/// Normalized filter selections for one request
///
/// `None` bounds are unbounded. Immutable once built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct FilterSet {
    pub year_min: Option<i64>,
    pub year_max: Option<i64>,
    pub min_score: Option<MinScore>,
    pub content_type: ContentTypeFilter,
}

impl FilterSet {
    /// Build a canonical filter from raw selections
    ///
    /// Year bounds default to the dataset's observed range: a missing side is
    /// filled from `bounds`, values are clamped into it, and an inverted range
    /// degrades to the full range.
    pub fn normalize(
        raw_type: Option<&str>,
        raw_year_range: (Option<i64>, Option<i64>),
        raw_min_score: Option<f64>,
        bounds: YearBounds,
    ) -> Self {
        let (raw_min, raw_max) = raw_year_range;
        let mut year_min = raw_min.map(|y| bounds.clamp(y)).unwrap_or(bounds.min);
        let mut year_max = raw_max.map(|y| bounds.clamp(y)).unwrap_or(bounds.max);
        if year_min > year_max {
            year_min = bounds.min;
            year_max = bounds.max;
        }

        Self {
            year_min: Some(year_min),
            year_max: Some(year_max),
            min_score: normalize_min_score(raw_min_score),
            content_type: ContentTypeFilter::parse_lenient(raw_type),
        }
    }

    /// Applied minimum score, if any
    pub fn min_score(&self) -> Option<f64> {
        self.min_score.map(|s| s.value())
    }

    pub fn with_content_type(mut self, content_type: ContentTypeFilter) -> Self {
        self.content_type = content_type;
        self
    }

    pub fn with_years(mut self, year_min: Option<i64>, year_max: Option<i64>) -> Self {
        self.year_min = year_min;
        self.year_max = year_max;
        self
    }

    pub fn with_min_score(mut self, raw: Option<f64>) -> Self {
        self.min_score = normalize_min_score(raw);
        self
    }
}

/// Filter selections exactly as they arrive in a query string
///
/// Every field is kept as text so that garbage degrades instead of rejecting
/// the whole request.
#[derive(Debug, Clone, Default)]
pub struct RawFilter {
    pub content_type: Option<String>,
    pub year_min: Option<String>,
    pub year_max: Option<String>,
    pub min_score: Option<String>,
    pub limit: Option<String>,
}

impl RawFilter {
    /// Collect the filter keys from decoded query pairs
    ///
    /// The first occurrence of a repeated key wins; unknown keys are ignored.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut raw = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "content_type" => &mut raw.content_type,
                "year_min" => &mut raw.year_min,
                "year_max" => &mut raw.year_max,
                "min_score" => &mut raw.min_score,
                "limit" => &mut raw.limit,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        raw
    }

    pub fn normalize(&self, bounds: YearBounds) -> FilterSet {
        FilterSet::normalize(
            self.content_type.as_deref(),
            (parse_lenient(&self.year_min), parse_lenient(&self.year_max)),
            parse_lenient(&self.min_score),
            bounds,
        )
    }

    pub fn limit(&self) -> i64 {
        normalize_limit(parse_lenient(&self.limit))
    }
}

fn parse_lenient<T: FromStr>(raw: &Option<String>) -> Option<T> {
    raw.as_deref().and_then(|s| s.trim().parse().ok())
}
