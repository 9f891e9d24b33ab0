//! Configuration System
//!
//! Handles loading the endpoint and alias definitions from a TOML file at a
//! user-scoped location, with environment variable overrides. Alias and
//! endpoint definitions are intentionally cheap to reload: components hold a
//! [`ConfigProvider`] and ask it for a fresh snapshot per request, so edits to
//! the config file take effect without a restart.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base URL of the Prometheus-compatible backend
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Per-request HTTP timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Named PromQL query templates, keyed by alias name
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_endpoint() -> String {
    "http://localhost:9090".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            request_timeout_secs: default_request_timeout(),
            aliases: BTreeMap::new(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(endpoint) = std::env::var("PROMTAB_ENDPOINT") {
            self.endpoint = endpoint;
        }
        if let Ok(level) = std::env::var("PROMTAB_LOG_LEVEL") {
            self.logging.level = level;
        }
    }
}

/// The default user-scoped config location: `PROMTAB_CONFIG` wins over
/// `$XDG_CONFIG_HOME/promtab/config.toml`, falling back to `./promtab.toml`.
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var("PROMTAB_CONFIG") {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .map(|p| p.join("promtab").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("./promtab.toml"))
}

/// Capability for obtaining a configuration snapshot.
///
/// Each provider decides its own staleness policy: [`FileConfigProvider`]
/// re-reads the file on every call, while a plain [`Config`] acts as a fixed
/// snapshot. Components take `Arc<dyn ConfigProvider>` so the policy is
/// injected at construction time.
pub trait ConfigProvider: Send + Sync {
    fn load(&self) -> Result<Config, ConfigError>;
}

/// Reads the config file fresh on every load
pub struct FileConfigProvider {
    path: PathBuf,
}

impl FileConfigProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Provider over the default user-scoped location
    pub fn default_location() -> Self {
        Self::new(default_config_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigProvider for FileConfigProvider {
    fn load(&self) -> Result<Config, ConfigError> {
        Config::load_with_env(&self.path)
    }
}

/// A `Config` value is itself a provider: a fixed snapshot
impl ConfigProvider for Config {
    fn load(&self) -> Result<Config, ConfigError> {
        Ok(self.clone())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Promtab Configuration
#
# Environment variables override these settings:
# - PROMTAB_ENDPOINT
# - PROMTAB_LOG_LEVEL
#
# The file is re-read on every query, so alias edits apply immediately.

# Base URL of the Prometheus-compatible backend
endpoint = "http://localhost:9090"

# Per-request HTTP timeout in seconds
request_timeout_secs = 30

# Named PromQL query templates. A query for an alias name runs the template;
# a query for an unknown name runs the bare name as a selector. Templates may
# reference the `filter` parameter, e.g. `{{.filter}}`.
[aliases]
# cpu_busy = "1 - avg by (instance) (rate(node_cpu_seconds_total{mode=\"idle\"}[5m]))"
# mem_used = "node_memory_MemTotal_bytes - node_memory_MemAvailable_bytes"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.endpoint, "http://localhost:9090");
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.aliases.is_empty());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
endpoint = "http://prom.internal:9090"

[aliases]
cpu = "sum(rate(node_cpu_seconds_total[5m]))"
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.endpoint, "http://prom.internal:9090");
        assert_eq!(
            config.aliases.get("cpu").unwrap(),
            "sum(rate(node_cpu_seconds_total[5m]))"
        );
        // Field defaults still apply for omitted sections
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Config::load(Path::new("/nonexistent/promtab.toml")).unwrap_err();
        match err {
            ConfigError::Io { path, .. } => {
                assert_eq!(path, PathBuf::from("/nonexistent/promtab.toml"))
            }
            other => panic!("expected Io error, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "endpoint = [not toml").unwrap();

        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_file_provider_rereads() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "endpoint = \"http://first:9090\"").unwrap();
        file.flush().unwrap();

        let provider = FileConfigProvider::new(file.path());
        assert_eq!(provider.load().unwrap().endpoint, "http://first:9090");

        std::fs::write(file.path(), "endpoint = \"http://second:9090\"").unwrap();
        assert_eq!(provider.load().unwrap().endpoint, "http://second:9090");
    }

    #[test]
    fn test_config_is_its_own_provider() {
        let mut config = Config::default();
        config.aliases.insert("up".to_string(), "up".to_string());

        let snapshot = ConfigProvider::load(&config).unwrap();
        assert_eq!(snapshot.aliases.len(), 1);
    }

    #[test]
    fn test_default_config_parses() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config.endpoint, "http://localhost:9090");
        assert!(config.aliases.is_empty());
    }
}
