//! Configuration management for lacak
//!
//! All tunables of the lookup pipeline live here and are consumed read-only
//! at construction time: remote API credentials and endpoints, local store
//! toggle, rate-limit window, cache duration, and target classification
//! parameters.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ConfigError, Result};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Local store settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Outbound request budget
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// In-memory result cache
    #[serde(default)]
    pub cache: CacheConfig,

    /// Target classification settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Feature toggles
    #[serde(default)]
    pub features: FeatureToggles,

    /// Directory for exported results
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,
}

/// Remote API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Master switch for remote lookups
    #[serde(default)]
    pub enabled: bool,

    /// Bearer token for the lookup provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// Per-purpose endpoint URLs
    #[serde(default)]
    pub endpoints: Endpoints,

    /// Per-attempt request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retry ceiling for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Forced delay between successful requests, in seconds
    #[serde(default = "default_request_delay_secs")]
    pub request_delay_secs: u64,
}

/// Per-purpose endpoint URLs, each taking the identifier as a query parameter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Endpoints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_lookup: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nik_lookup: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator_check: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_lookup: Option<String>,
}

/// Local store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Whether local-store queries run before the remote tier
    #[serde(default)]
    pub enabled: bool,

    /// Database file path (defaults to ~/.lacak/local.db)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Sliding-window rate limit for outbound calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Maximum requests admitted within the window
    #[serde(default = "default_max_requests")]
    pub max_requests: usize,

    /// Window length in seconds
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

/// In-memory result cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Entry time-to-live in seconds
    #[serde(default = "default_cache_duration_secs")]
    pub duration_secs: u64,
}

/// Target classification settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// National mobile prefix marking a phone-shaped target
    #[serde(default = "default_phone_prefix")]
    pub phone_prefix: String,

    /// Exact length of a national ID (NIK)
    #[serde(default = "default_nik_length")]
    pub nik_length: usize,
}

/// Feature toggles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureToggles {
    /// Allow the operator sub-lookup to fall back to the remote API
    #[serde(default = "default_true")]
    pub operator_check: bool,
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    3
}

fn default_request_delay_secs() -> u64 {
    1
}

fn default_max_requests() -> usize {
    10
}

fn default_window_secs() -> u64 {
    60
}

fn default_cache_duration_secs() -> u64 {
    3600
}

fn default_phone_prefix() -> String {
    "08".to_string()
}

fn default_nik_length() -> usize {
    16
}

fn default_export_dir() -> PathBuf {
    PathBuf::from("exports")
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            key: None,
            endpoints: Endpoints::default(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            request_delay_secs: default_request_delay_secs(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: None,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            duration_secs: default_cache_duration_secs(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            phone_prefix: default_phone_prefix(),
            nik_length: default_nik_length(),
        }
    }
}

impl Default for FeatureToggles {
    fn default() -> Self {
        Self {
            operator_check: true,
        }
    }
}

impl Config {
    /// Get the default config file path (~/.lacak/config.yaml)
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".lacak").join("config.yaml"))
    }

    /// Default local database path (~/.lacak/local.db)
    pub fn default_db_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".lacak").join("local.db"))
    }

    /// Load configuration from an override path, or the default location
    pub fn load_at(path: Option<&str>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from(PathBuf::from(p)),
            None => Self::load_from(Self::default_path()?),
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound.into());
        }

        let contents = std::fs::read_to_string(&path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;

        Ok(config)
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(Self::default_path()?)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            serde_yaml::to_string(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;

        std::fs::write(&path, contents)?;

        // The config holds the API key; keep it private on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(&path, perms)?;
        }

        Ok(())
    }

    /// Resolved local database path
    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.database.path {
            Some(p) => Ok(p.clone()),
            None => Self::default_db_path(),
        }
    }

    /// Whether remote lookups are possible (enabled and credentialed)
    pub fn remote_configured(&self) -> bool {
        self.api.enabled && self.api.key.as_deref().is_some_and(|k| !k.is_empty())
    }
}
