//! Catalog model shared by the query layer and its consumers
//!
//! The catalog is a single `titles` table. Content types are stored with
//! inconsistent casing, so every comparison goes through [`ContentType`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Name of the catalog table
pub const TITLES_TABLE: &str = "titles";

/// Sentinel strings meaning "no certification"
pub const CERTIFICATION_SENTINELS: &[&str] = &["", "N/A"];

/// Sentinel strings meaning "no production countries"
pub const COUNTRY_SENTINELS: &[&str] = &["", "[]"];

/// Kind of catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ContentType {
    Movie,
    Show,
}

impl ContentType {
    /// Canonical uppercase form used in SQL comparisons against `UPPER(type)`
    pub fn as_db_str(&self) -> &'static str {
        match self {
            ContentType::Movie => "MOVIE",
            ContentType::Show => "SHOW",
        }
    }

    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            ContentType::Movie => "Movie",
            ContentType::Show => "Show",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_db_str())
    }
}

impl FromStr for ContentType {
    type Err = Error;

    /// Case-insensitive parse; surrounding spaces are ignored, matching SQL `TRIM`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim_matches(' ').to_ascii_uppercase().as_str() {
            "MOVIE" => Ok(ContentType::Movie),
            "SHOW" => Ok(ContentType::Show),
            other => Err(Error::InvalidInput(format!("unknown content type '{}'", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("movie".parse::<ContentType>().unwrap(), ContentType::Movie);
        assert_eq!("MOVIE".parse::<ContentType>().unwrap(), ContentType::Movie);
        assert_eq!(" Show ".parse::<ContentType>().unwrap(), ContentType::Show);
        assert_eq!("sHoW".parse::<ContentType>().unwrap(), ContentType::Show);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!(matches!(
            "series".parse::<ContentType>(),
            Err(Error::InvalidInput(_))
        ));
        // Only spaces are trimmed, as SQL TRIM does
        assert!("movie\t".parse::<ContentType>().is_err());
        assert!("".parse::<ContentType>().is_err());
    }

    #[test]
    fn test_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&ContentType::Show).unwrap(), "\"SHOW\"");
        let parsed: ContentType = serde_json::from_str("\"MOVIE\"").unwrap();
        assert_eq!(parsed, ContentType::Movie);
        assert_eq!(ContentType::Movie.to_string(), "MOVIE");
        assert_eq!(ContentType::Movie.label(), "Movie");
    }
}
