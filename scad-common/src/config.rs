//! Bootstrap configuration loading and database path discovery
//!
//! Settings are resolved in priority order:
//! 1. Command-line argument / environment variable (handled by the binary via clap)
//! 2. TOML config file
//! 3. Compiled defaults
//!
//! A missing or malformed TOML file never aborts startup: the problem is
//! reported back for logging and compiled defaults apply.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Application directory name under the platform config/data dirs
pub const APP_DIR: &str = "scad";

/// File name of the catalog database
pub const DATABASE_FILE_NAME: &str = "titles.db";

/// Environment variable naming an explicit TOML config file
pub const CONFIG_ENV_VAR: &str = "SCAD_CONFIG";

/// Bootstrap configuration loaded from TOML file
///
/// Every field is optional; absent fields fall through to compiled defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Path to SQLite database file (relative or absolute)
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// HTTP bind host
    #[serde(default)]
    pub host: Option<String>,

    /// HTTP server port
    #[serde(default)]
    pub port: Option<u16>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Compiled-in fallback values
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

impl Default for CompiledDefaults {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5790,
            log_level: default_log_level(),
        }
    }
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub database_path: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
}

/// Fully resolved bootstrap configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapConfig {
    pub database_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

impl BootstrapConfig {
    /// Merge overrides, TOML values and compiled defaults
    ///
    /// When no database path is configured anywhere, [`discover_database`]
    /// picks one.
    pub fn resolve(overrides: Overrides, toml: TomlConfig) -> Self {
        let defaults = CompiledDefaults::default();

        let database_path = overrides
            .database_path
            .or(toml.database_path)
            .unwrap_or_else(discover_database);

        Self {
            database_path,
            host: overrides.host.or(toml.host).unwrap_or(defaults.host),
            port: overrides.port.or(toml.port).unwrap_or(defaults.port),
            log_level: overrides.log_level.unwrap_or(toml.logging.level),
        }
    }

    /// Socket address string for the HTTP listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Locate the TOML config file
///
/// Priority: explicit path, then `SCAD_CONFIG`, then
/// `<config dir>/scad/config.toml` if it exists.
pub fn config_file_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    dirs::config_dir()
        .map(|d| d.join(APP_DIR).join("config.toml"))
        .filter(|p| p.exists())
}

/// Parse a TOML config file
pub fn read_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
}

/// Outcome of loading the TOML config
///
/// Loading happens before tracing is initialized, so problems are carried
/// back to the caller to be logged once a subscriber exists.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub toml: TomlConfig,
    /// File the values came from, if one was read successfully
    pub source: Option<PathBuf>,
    /// Why a located config file was ignored
    pub warning: Option<String>,
}

/// Load the TOML config, degrading to defaults on any failure
pub fn load_toml_config(explicit: Option<&Path>) -> LoadedConfig {
    let Some(path) = config_file_path(explicit) else {
        return LoadedConfig::default();
    };

    match read_toml_config(&path) {
        Ok(toml) => LoadedConfig {
            toml,
            source: Some(path),
            warning: None,
        },
        Err(e) => LoadedConfig {
            toml: TomlConfig::default(),
            source: None,
            warning: Some(format!("Ignoring config file {}: {}", path.display(), e)),
        },
    }
}

/// Candidate database locations, in search order
pub fn database_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from(DATABASE_FILE_NAME)];

    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        candidates.push(exe_dir.join(DATABASE_FILE_NAME));
    }

    if let Some(data_dir) = dirs::data_local_dir() {
        candidates.push(data_dir.join(APP_DIR).join(DATABASE_FILE_NAME));
    }

    candidates
}

/// First existing candidate, or the working-directory candidate when none exist
///
/// A non-existent result makes startup fail with a diagnostic naming the
/// expected location.
pub fn discover_database() -> PathBuf {
    pick_existing(&database_candidates())
}

fn pick_existing(candidates: &[PathBuf]) -> PathBuf {
    candidates
        .iter()
        .find(|p| p.exists())
        .or_else(|| candidates.first())
        .cloned()
        .unwrap_or_else(|| PathBuf::from(DATABASE_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_existing_prefers_first_existing() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("present.db");
        std::fs::write(&present, b"").unwrap();

        let candidates = vec![dir.path().join("missing.db"), present.clone()];
        assert_eq!(pick_existing(&candidates), present);
    }

    #[test]
    fn test_pick_existing_falls_back_to_first() {
        let candidates = vec![
            PathBuf::from("/nonexistent/a.db"),
            PathBuf::from("/nonexistent/b.db"),
        ];
        assert_eq!(pick_existing(&candidates), PathBuf::from("/nonexistent/a.db"));
        assert_eq!(pick_existing(&[]), PathBuf::from(DATABASE_FILE_NAME));
    }

    #[test]
    fn test_candidates_start_with_working_directory() {
        let candidates = database_candidates();
        assert_eq!(candidates[0], PathBuf::from(DATABASE_FILE_NAME));
    }
}
