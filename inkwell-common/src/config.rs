//! Configuration loading and validation
//!
//! Resolution order for every field:
//! 1. Environment variable (highest priority)
//! 2. TOML config file
//! 3. Compiled default (fallback)
//!
//! The resulting [`InkwellConfig`] is built once at process start and handed to the
//! capability client and store adapter explicitly.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const ENV_API_KEY: &str = "INKWELL_API_KEY";
pub const ENV_API_BASE_URL: &str = "INKWELL_API_BASE_URL";
pub const ENV_DATABASE: &str = "INKWELL_DATABASE";
pub const ENV_PORT: &str = "INKWELL_PORT";
pub const ENV_ALLOWED_ORIGINS: &str = "INKWELL_ALLOWED_ORIGINS";
pub const ENV_REDIRECT_URL: &str = "INKWELL_REDIRECT_URL";
pub const ENV_LOG_LEVEL: &str = "INKWELL_LOG_LEVEL";

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_PORT: u16 = 3001;

/// Complete service configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InkwellConfig {
    pub capability: CapabilityConfig,
    pub store: StoreConfig,
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

/// Vision/language provider settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapabilityConfig {
    /// Provider credential; required at startup
    pub api_key: Option<String>,
    pub base_url: String,
    pub vision_model: String,
    pub title_model: String,
    pub insight_model: String,
    pub timeout_secs: u64,
}

impl Default for CapabilityConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            vision_model: "gpt-4o".to_string(),
            title_model: "gpt-4".to_string(),
            insight_model: "gpt-4o".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Store connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub database_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    /// Origins allowed to call the API cross-origin
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            allowed_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

/// Auth provider settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub redirect_url: Option<String>,
    pub session_ttl_hours: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            redirect_url: None,
            session_ttl_hours: 24,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "inkwell_scribe=info,inkwell_common=info,tower_http=info".to_string(),
        }
    }
}

impl InkwellConfig {
    /// Load configuration: TOML file (if any), then environment overrides
    ///
    /// An explicit `path` that does not exist is an error. A missing default config
    /// file only produces a warning.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_toml_file(p)?,
            None => match default_config_file() {
                Some(p) if p.exists() => Self::from_toml_file(&p)?,
                _ => {
                    warn!("No config file found, using defaults and environment");
                    Self::default()
                }
            },
        };

        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Parse a TOML config file
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        let config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Override fields from environment variables
    ///
    /// `lookup` is `std::env::var` in production; tests pass a map.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(ENV_API_KEY) {
            self.capability.api_key = Some(key);
        }
        if let Some(url) = lookup(ENV_API_BASE_URL) {
            self.capability.base_url = url;
        }
        if let Some(db) = lookup(ENV_DATABASE) {
            self.store.database_path = PathBuf::from(db);
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|e| Error::Config(format!("{} is not a port: {}", ENV_PORT, e)))?;
        }
        if let Some(origins) = lookup(ENV_ALLOWED_ORIGINS) {
            self.server.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(url) = lookup(ENV_REDIRECT_URL) {
            self.auth.redirect_url = Some(url);
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }
        Ok(())
    }

    /// Fail fast on configuration the service cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.api_key().is_none() {
            return Err(Error::Config(format!(
                "Capability API key not configured. Set {} or capability.api_key in the config file",
                ENV_API_KEY
            )));
        }
        if self.server.port == 0 {
            return Err(Error::Config("server.port must be non-zero".to_string()));
        }
        for origin in &self.server.allowed_origins {
            if !(origin.starts_with("http://") || origin.starts_with("https://")) {
                return Err(Error::Config(format!(
                    "Allowed origin '{}' must start with http:// or https://",
                    origin
                )));
            }
        }
        if self.auth.session_ttl_hours <= 0 {
            return Err(Error::Config("auth.session_ttl_hours must be positive".to_string()));
        }
        Ok(())
    }

    /// Capability credential, ignoring whitespace-only values
    pub fn api_key(&self) -> Option<&str> {
        self.capability
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
    }
}

/// `<config_dir>/inkwell/inkwell.toml`
pub fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("inkwell").join("inkwell.toml"))
}

/// OS-dependent default database location
fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("inkwell").join("inkwell.db"))
        .unwrap_or_else(|| PathBuf::from("./inkwell_data/inkwell.db"))
}
