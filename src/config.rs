//! Client configuration
//!
//! Resolution order: command-line flag / environment variable, then the
//! JSON config file, then built-in defaults.

use crate::error::AppError;
use crate::model::SearchType;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const DEFAULT_API_BASE: &str = "http://localhost:8000/api/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// On-disk configuration; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub api_base: Option<String>,
    pub timeout_secs: Option<u64>,
    pub search_type: Option<SearchType>,
    pub color: Option<bool>,
}

/// Values supplied on the command line (or through their env fallbacks)
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_base: Option<String>,
    pub timeout_secs: Option<u64>,
    pub no_color: bool,
}

/// Fully resolved configuration handed to the search client
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_base: Url,
    pub timeout: Duration,
    pub default_search_type: SearchType,
    pub color: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: Url::parse(DEFAULT_API_BASE).expect("default API base is a valid URL"),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            default_search_type: SearchType::default(),
            color: true,
        }
    }
}

impl Config {
    /// Config pointing at an explicit base URL, defaults elsewhere
    #[cfg(test)]
    pub fn with_api_base(api_base: &str) -> Result<Self, AppError> {
        Ok(Self {
            api_base: parse_api_base(api_base)?,
            ..Self::default()
        })
    }

    /// Merge file values and overrides on top of the defaults
    pub fn resolve(file: FileConfig, overrides: Overrides) -> Result<Self, AppError> {
        let mut config = Config::default();

        if let Some(base) = overrides.api_base.as_deref().or(file.api_base.as_deref()) {
            config.api_base = parse_api_base(base)?;
        }

        if let Some(secs) = overrides.timeout_secs.or(file.timeout_secs) {
            if secs == 0 {
                return Err(AppError::Config("timeout must be at least 1 second".to_string()));
            }
            config.timeout = Duration::from_secs(secs);
        }

        if let Some(search_type) = file.search_type {
            config.default_search_type = search_type;
        }

        config.color = !overrides.no_color
            && file.color.unwrap_or(true)
            && std::env::var_os("NO_COLOR").is_none();

        Ok(config)
    }

    /// Build an endpoint URL below the API base, e.g. `search` or `search/similar/42`
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, AppError> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::Config(format!("API base '{}' cannot hold a path", self.api_base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

fn parse_api_base(raw: &str) -> Result<Url, AppError> {
    let url = Url::parse(raw.trim())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(AppError::Config(format!(
            "API base must be http or https, got '{}'",
            other
        ))),
    }
}

/// Get the path to the default configuration file
pub fn config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().context("Cannot determine config directory")?;
    Ok(config_dir.join("akta-search").join("config.json"))
}

/// Load the configuration file, returning defaults if it does not exist
pub fn load_file_config(path: Option<&Path>) -> Result<FileConfig> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => config_path()?,
    };

    if !path.exists() {
        debug!("No config file at {}, using defaults", path.display());
        return Ok(FileConfig::default());
    }

    let data = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    let config: FileConfig = serde_json::from_str(&data)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;

    debug!("Loaded config from {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = Config::resolve(FileConfig::default(), Overrides::default()).unwrap();
        assert_eq!(config.api_base.as_str(), DEFAULT_API_BASE);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.default_search_type, SearchType::Hybrid);
    }

    #[test]
    fn test_override_beats_file() {
        let file = FileConfig {
            api_base: Some("http://file.example/api/v1".into()),
            timeout_secs: Some(5),
            ..Default::default()
        };
        let overrides = Overrides {
            api_base: Some("https://cli.example/api/v1".into()),
            ..Default::default()
        };
        let config = Config::resolve(file, overrides).unwrap();
        assert_eq!(config.api_base.as_str(), "https://cli.example/api/v1");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_rejects_bad_values() {
        let overrides = Overrides {
            api_base: Some("ftp://archive".into()),
            ..Default::default()
        };
        assert!(Config::resolve(FileConfig::default(), overrides).is_err());

        let overrides = Overrides {
            timeout_secs: Some(0),
            ..Default::default()
        };
        assert!(Config::resolve(FileConfig::default(), overrides).is_err());
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let config = Config::with_api_base("http://localhost:8000/api/v1").unwrap();
        assert_eq!(
            config.endpoint(&["search"]).unwrap().as_str(),
            "http://localhost:8000/api/v1/search"
        );

        let config = Config::with_api_base("http://localhost:8000/api/v1/").unwrap();
        assert_eq!(
            config.endpoint(&["search", "similar", "abc"]).unwrap().as_str(),
            "http://localhost:8000/api/v1/search/similar/abc"
        );
    }

    #[test]
    fn test_load_file_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "api_base": "http://archive.local/api/v1", "search_type": "fulltext" }}"#).unwrap();

        let loaded = load_file_config(Some(file.path())).unwrap();
        assert_eq!(loaded.api_base.as_deref(), Some("http://archive.local/api/v1"));
        assert_eq!(loaded.search_type, Some(SearchType::Fulltext));
        assert_eq!(loaded.timeout_secs, None);
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_file_config(Some(&dir.path().join("absent.json"))).unwrap();
        assert_eq!(loaded, FileConfig::default());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(load_file_config(Some(file.path())).is_err());
    }
}
