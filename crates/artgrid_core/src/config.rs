//! Runtime configuration for hosts.
//!
//! # Responsibility
//! - Define the knobs shared by the HTTP fetcher, page cache and logging.
//! - Load them from an optional JSON file plus `ARTGRID_*` overrides.
//!
//! # Invariants
//! - `validate()` passes for every config returned by `load`.
//! - Missing file fields fall back to `AppConfig::default()` values.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Public artworks API root.
pub const DEFAULT_API_BASE_URL: &str = "https://api.artic.edu/api/v1";
/// Rows per table page.
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_CACHE_PAGES: usize = 0;
const MAX_PAGE_SIZE: u32 = 100;

const ENV_API_BASE_URL: &str = "ARTGRID_API_BASE_URL";
const ENV_PAGE_SIZE: &str = "ARTGRID_PAGE_SIZE";
const ENV_REQUEST_TIMEOUT_MS: &str = "ARTGRID_REQUEST_TIMEOUT_MS";
const ENV_CACHE_PAGES: &str = "ARTGRID_CACHE_PAGES";
const ENV_LOG_LEVEL: &str = "ARTGRID_LOG_LEVEL";
const ENV_LOG_DIR: &str = "ARTGRID_LOG_DIR";

/// Host configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub page_size: u32,
    pub request_timeout_ms: u64,
    /// Pages kept by the LRU cache; `0` disables caching.
    pub cache_pages: usize,
    /// One of `trace|debug|info|warn|error`; `None` uses the build default.
    pub log_level: Option<String>,
    /// Absolute directory for rolling log files; `None` disables file logging.
    pub log_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            cache_pages: DEFAULT_CACHE_PAGES,
            log_level: None,
            log_dir: None,
        }
    }
}

/// Configuration load/validation errors.
#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: serde_json::Error },
    InvalidValue { key: &'static str, message: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse config `{}`: {source}", path.display())
            }
            Self::InvalidValue { key, message } => write!(f, "invalid `{key}`: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::InvalidValue { .. } => None,
        }
    }
}

impl AppConfig {
    /// Loads defaults, then `path` (when given), then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON config file; absent keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(raw.as_str()).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies `ARTGRID_*` overrides read through `lookup`.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(value) = lookup(ENV_API_BASE_URL) {
            self.api_base_url = value.trim().to_string();
        }
        if let Some(value) = lookup(ENV_PAGE_SIZE) {
            self.page_size = parse_number(ENV_PAGE_SIZE, value.as_str())?;
        }
        if let Some(value) = lookup(ENV_REQUEST_TIMEOUT_MS) {
            self.request_timeout_ms = parse_number(ENV_REQUEST_TIMEOUT_MS, value.as_str())?;
        }
        if let Some(value) = lookup(ENV_CACHE_PAGES) {
            self.cache_pages = parse_number(ENV_CACHE_PAGES, value.as_str())?;
        }
        if let Some(value) = lookup(ENV_LOG_LEVEL) {
            self.log_level = Some(value.trim().to_string());
        }
        if let Some(value) = lookup(ENV_LOG_DIR) {
            self.log_dir = Some(PathBuf::from(value.trim()));
        }
        Ok(())
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = self.api_base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                key: "api_base_url",
                message: format!("expected http(s) URL, got `{base}`"),
            });
        }
        if self.page_size < 1 || self.page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::InvalidValue {
                key: "page_size",
                message: format!("expected 1..={MAX_PAGE_SIZE}, got {}", self.page_size),
            });
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "request_timeout_ms",
                message: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|err| ConfigError::InvalidValue {
            key,
            message: format!("`{}`: {err}", value.trim()),
        })
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, ConfigError, DEFAULT_API_BASE_URL};
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        config.validate().expect("defaults should validate");
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.page_size, 10);
    }

    #[test]
    fn file_fields_merge_over_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{"page_size": 25, "cache_pages": 4}}"#).expect("write config");

        let config = AppConfig::from_file(file.path()).expect("config should parse");
        assert_eq!(config.page_size, 25);
        assert_eq!(config.cache_pages, 4);
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn unreadable_and_unparsable_files_are_reported() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("missing.json");
        let err = AppConfig::from_file(&missing).expect_err("missing file must fail");
        assert!(matches!(err, ConfigError::Io { .. }));

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ page_size: ").expect("write broken config");
        let err = AppConfig::from_file(&broken).expect_err("broken json must fail");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn overrides_replace_values_and_reject_garbage() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("ARTGRID_PAGE_SIZE", " 20 "),
            ("ARTGRID_LOG_LEVEL", "debug"),
        ]);
        let mut config = AppConfig::default();
        config
            .apply_overrides(|key| env.get(key).map(|value| value.to_string()))
            .expect("overrides should apply");
        assert_eq!(config.page_size, 20);
        assert_eq!(config.log_level.as_deref(), Some("debug"));

        let err = config
            .apply_overrides(|key| (key == "ARTGRID_CACHE_PAGES").then(|| "many".to_string()))
            .expect_err("non-numeric cache size must fail");
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "ARTGRID_CACHE_PAGES",
                ..
            }
        ));
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let config = AppConfig {
            page_size: 0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());

        let config = AppConfig {
            api_base_url: "ftp://example.org".to_string(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());

        let config = AppConfig {
            request_timeout_ms: 0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
