use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::clients::page::FragmentSelector;
use crate::services::scheduler::validate_cron;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub quota: QuotaConfig,

    pub cache: CacheConfig,

    pub search: SearchConfig,

    pub ingestion: IngestionConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/docsearch.db".to_string(),
            log_level: "info".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    pub cors_allowed_origins: Vec<String>,

    /// Directory mounted under `/static`. Skipped when it does not exist.
    pub static_dir: String,

    /// Key required by the administrative routes (`X-Api-Key` or bearer token).
    /// When unset those routes answer 403.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_api_key: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            cors_allowed_origins: vec![
                "http://localhost:8000".to_string(),
                "http://127.0.0.1:8000".to_string(),
            ],
            static_dir: "static".to_string(),
            admin_api_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaConfig {
    /// Cumulative number of searches a user may perform. The counter never resets.
    pub max_requests: i32,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self { max_requests: 5 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub max_age_hours: u32,

    /// Optional cron expression (with a leading seconds field) for a recurring
    /// sweep. Without it the cache is swept once at startup only.
    pub sweep_cron: Option<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_age_hours: 24,
            sweep_cron: None,
        }
    }
}

impl CacheConfig {
    #[must_use]
    pub fn max_age(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.max_age_hours))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub default_top_k: u64,

    pub default_threshold: f64,

    pub max_top_k: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_top_k: 5,
            default_threshold: 0.5,
            max_top_k: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    pub run_on_startup: bool,

    pub target_url: String,

    /// `[tag][.class][ > child]`, e.g. `.titleline > a`
    pub selector: String,

    pub default_score: f64,

    /// Request timeout in seconds (default: 30)
    pub request_timeout_seconds: u32,

    pub user_agent: String,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            run_on_startup: true,
            target_url: "https://news.ycombinator.com/".to_string(),
            selector: ".titleline > a".to_string(),
            default_score: 1.0,
            request_timeout_seconds: 30,
            user_agent: "docsearch/1.0".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
        }
    }
}

impl Config {
    /// Reads the first config file found (or defaults) and applies env overrides.
    /// Runs before tracing is set up, so the caller logs [`Config::source_path`].
    pub fn load() -> Result<Self> {
        let mut config = match Self::source_path() {
            Some(path) => Self::load_from_path(&path)?,
            None => Self::default(),
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// The config file `load` reads, if any exists.
    #[must_use]
    pub fn source_path() -> Option<PathBuf> {
        Self::config_paths().into_iter().find(|path| path.exists())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    /// Values from the environment (or `.env`) win over the config file.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("DOCSEARCH_DATABASE_URL")
            && !url.is_empty()
        {
            self.general.database_path = url;
        }

        if let Ok(key) = std::env::var("DOCSEARCH_ADMIN_API_KEY")
            && !key.is_empty()
        {
            self.server.admin_api_key = Some(key);
        }

        if let Some(port) = std::env::var("DOCSEARCH_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
        {
            self.server.port = port;
        }
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("docsearch").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".docsearch").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.quota.max_requests < 1 {
            anyhow::bail!("quota.max_requests must be at least 1");
        }

        if self.search.max_top_k == 0 {
            anyhow::bail!("search.max_top_k must be > 0");
        }

        if !(1..=self.search.max_top_k).contains(&self.search.default_top_k) {
            anyhow::bail!(
                "search.default_top_k must be between 1 and {}",
                self.search.max_top_k
            );
        }

        if !self.search.default_threshold.is_finite() {
            anyhow::bail!("search.default_threshold must be a finite number");
        }

        if !self.ingestion.default_score.is_finite() {
            anyhow::bail!("ingestion.default_score must be a finite number");
        }

        url::Url::parse(&self.ingestion.target_url).with_context(|| {
            format!(
                "Invalid ingestion target URL: {}",
                self.ingestion.target_url
            )
        })?;

        FragmentSelector::parse(&self.ingestion.selector)?;

        if let Some(cron) = &self.cache.sweep_cron {
            validate_cron(cron).context("cache.sweep_cron")?;
        }

        if let Some(key) = &self.server.admin_api_key
            && key.trim().is_empty()
        {
            anyhow::bail!("server.admin_api_key cannot be blank; omit it to disable admin routes");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.quota.max_requests, 5);
        assert_eq!(config.cache.max_age_hours, 24);
        assert_eq!(config.search.default_top_k, 5);
        assert!((config.ingestion.default_score - 1.0).abs() < f64::EPSILON);
        assert!(config.server.admin_api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[quota]"));
        assert!(toml_str.contains("[ingestion]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [quota]
            max_requests = 10

            [cache]
            max_age_hours = 1
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.quota.max_requests, 10);
        assert_eq!(config.cache.max_age(), chrono::Duration::hours(1));

        assert_eq!(config.ingestion.selector, ".titleline > a");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.quota.max_requests = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.ingestion.target_url = "not a url".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.server.admin_api_key = Some("  ".to_string());
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.ingestion.selector = String::new();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.cache.sweep_cron = Some("every night".to_string());
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.cache.sweep_cron = Some("0 0 3 * * *".to_string());
        assert!(config.validate().is_ok());
    }
}
