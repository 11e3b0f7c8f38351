//! Client configuration loading
//!
//! Reads `config.toml` from the linechat config directory. Every key is
//! optional:
//!
//! ```toml
//! address = "chat.example.net:9090"
//! render_interval_ms = 50
//!
//! [servers]
//! home = "192.168.1.5:9090"
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use linechat_utils::{LinechatError, Result};

/// Address dialed when nothing else is configured
pub const DEFAULT_ADDRESS: &str = "localhost:9090";

/// Default redraw period in milliseconds
pub const DEFAULT_RENDER_INTERVAL_MS: u64 = 50;

/// Client settings from the config file
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Server to dial, `host:port` or a `[servers]` alias
    pub address: String,
    /// Redraw period, must be positive
    pub render_interval_ms: u64,
    /// Named server addresses
    pub servers: HashMap<String, String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.into(),
            render_interval_ms: DEFAULT_RENDER_INTERVAL_MS,
            servers: HashMap::new(),
        }
    }
}

impl ClientConfig {
    /// Load configuration
    ///
    /// An explicit path must exist and parse. Without one, the default
    /// location is tried; a missing or broken default file falls back to
    /// defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        let path = linechat_utils::config_file();
        if !path.exists() {
            tracing::debug!("Config file not found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        match Self::load_from(&path) {
            Ok(config) => Ok(config),
            Err(e) => {
                tracing::warn!("{}, using defaults", e);
                Ok(Self::default())
            }
        }
    }

    /// Read and validate a config file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| LinechatError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| LinechatError::ConfigInvalid {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config
            .validate()
            .map_err(|e| LinechatError::ConfigInvalid {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if self.render_interval_ms == 0 {
            return Err(LinechatError::config("render_interval_ms must be greater than 0"));
        }
        if self.address.trim().is_empty() {
            return Err(LinechatError::config("address must not be empty"));
        }
        Ok(())
    }

    /// Pick the address to dial
    ///
    /// `requested` (from the command line or environment) wins over the
    /// configured address. Either may name a `[servers]` alias.
    pub fn resolve_address(&self, requested: Option<&str>) -> String {
        let addr = requested.unwrap_or(&self.address);

        match self.servers.get(addr) {
            Some(resolved) => {
                tracing::debug!(alias = addr, %resolved, "Resolved server alias");
                resolved.clone()
            }
            None => addr.to_string(),
        }
    }

    pub fn render_interval(&self) -> Duration {
        Duration::from_millis(self.render_interval_ms)
    }
}
