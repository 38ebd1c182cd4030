//! Configuration for estimation runs.
//!
//! Configuration is read from `~/.plancost/config.yaml` (or an explicit path)
//! and can be overridden with `PLANCOST_*` environment variables.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{PlancostError, Result};
use crate::logging::plancost_home;

/// Default pricing API endpoint (a self-hosted pricing GraphQL service).
pub const DEFAULT_PRICING_API_ENDPOINT: &str = "http://127.0.0.1:4000/graphql";

/// Default environment variable holding the pricing API key.
pub const DEFAULT_API_KEY_ENV: &str = "PLANCOST_API_KEY";

/// Estimation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// GraphQL endpoint of the pricing service
    pub pricing_api_endpoint: String,

    /// Name of the environment variable holding the API key
    pub api_key_env: String,

    /// Timeout for one batched pricing request, in seconds
    pub timeout_secs: u64,

    /// Maximum number of top-level resources priced in parallel
    pub concurrency: usize,

    /// Region used when neither the plan nor the resource specifies one
    pub default_region: String,

    /// Directory for log files (defaults to ~/.plancost/logs/)
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pricing_api_endpoint: DEFAULT_PRICING_API_ENDPOINT.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            timeout_secs: 30,
            concurrency: 4,
            default_region: "us-east-1".to_string(),
            log_dir: None,
        }
    }
}

impl Config {
    /// Load configuration from an explicit YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PlancostError::config_not_found_with_source(path, e)
            } else {
                PlancostError::io("reading config", path, e)
            }
        })?;

        Self::from_yaml(&contents).map_err(|message| PlancostError::ConfigInvalid {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Load `~/.plancost/config.yaml`, falling back to defaults when absent.
    pub fn load_default() -> Result<Self> {
        let path = default_config_path()?;
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Parse configuration from YAML text.
    pub fn from_yaml(contents: &str) -> std::result::Result<Self, String> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(contents).map_err(|e| e.to_string())
    }

    /// Apply `PLANCOST_*` environment overrides.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(endpoint) = lookup("PLANCOST_PRICING_API_ENDPOINT") {
            self.pricing_api_endpoint = endpoint;
        }
        if let Some(concurrency) = lookup("PLANCOST_CONCURRENCY") {
            match concurrency.trim().parse() {
                Ok(value) => self.concurrency = value,
                Err(_) => tracing::warn!(value = %concurrency, "ignoring invalid PLANCOST_CONCURRENCY"),
            }
        }
        if let Some(region) = lookup("PLANCOST_DEFAULT_REGION") {
            self.default_region = region;
        }
        self
    }

    /// Check that the configuration can drive an estimation run.
    pub fn validate(&self) -> Result<()> {
        if self.pricing_api_endpoint.trim().is_empty() {
            return Err(PlancostError::validation("pricing_api_endpoint must not be empty"));
        }
        if self.concurrency == 0 {
            return Err(PlancostError::validation("concurrency must be at least 1"));
        }
        if self.timeout_secs == 0 {
            return Err(PlancostError::validation("timeout_secs must be at least 1"));
        }
        if self.default_region.trim().is_empty() {
            return Err(PlancostError::validation("default_region must not be empty"));
        }
        Ok(())
    }

    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env).ok().filter(|key| !key.is_empty())
    }

    /// Set a custom pricing API endpoint.
    pub fn with_pricing_api_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.pricing_api_endpoint = endpoint.into();
        self
    }

    /// Set the concurrency limit.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set the request timeout.
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Set the default region.
    pub fn with_default_region(mut self, region: impl Into<String>) -> Self {
        self.default_region = region.into();
        self
    }
}

/// Get the default configuration file path.
///
/// Returns `~/.plancost/config.yaml`
pub fn default_config_path() -> Result<PathBuf> {
    Ok(plancost_home()?.join("config.yaml"))
}
