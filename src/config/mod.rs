//! Configuration for the wallet adapters
//!
//! Values come from, in increasing priority:
//! 1. Built-in defaults
//! 2. A JSON file (`--config`)
//! 3. Environment variables (`KDA_CHAINWEAVER_URL`, `KDA_ZELCORE_URL`,
//!    `KDA_NETWORK_ID`, `KDA_AUTORESUME_KEY`), typically loaded from `.env`

use crate::pact::is_chainweb_network_id;
use crate::resume::DEFAULT_AUTORESUME_KEY;
use crate::wallets::{chainweaver, zelcore};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable names
pub mod env_vars {
    pub const CHAINWEAVER_URL: &str = "KDA_CHAINWEAVER_URL";
    pub const ZELCORE_URL: &str = "KDA_ZELCORE_URL";
    pub const NETWORK_ID: &str = "KDA_NETWORK_ID";
    pub const AUTORESUME_KEY: &str = "KDA_AUTORESUME_KEY";
}

pub const DEFAULT_NETWORK_ID: &str = "mainnet01";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Chainweaver signing API base URL
    pub chainweaver_url: String,
    /// Zelcore signing API base URL
    pub zelcore_url: String,
    /// Network id for injected and relay connections
    pub network_id: String,
    /// Storage key the UI layer uses for auto-resume records
    pub autoresume_key: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chainweaver_url: chainweaver::DEFAULT_API_URL.to_string(),
            zelcore_url: zelcore::DEFAULT_API_URL.to_string(),
            network_id: DEFAULT_NETWORK_ID.to_string(),
            autoresume_key: DEFAULT_AUTORESUME_KEY.to_string(),
        }
    }
}

impl Config {
    /// Defaults overridden by the process environment
    pub fn from_env() -> Self {
        Self::default().with_overrides(|name| std::env::var(name).ok())
    }

    /// Read a JSON config file. Missing fields keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        let mut config: Self = serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        config.network_id = checked_network_id(config.network_id);
        Ok(config)
    }

    /// Apply overrides from `lookup`, keyed by the names in [`env_vars`]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(env_vars::CHAINWEAVER_URL) {
            tracing::debug!("Using {} for Chainweaver", env_vars::CHAINWEAVER_URL);
            self.chainweaver_url = url;
        }
        if let Some(url) = lookup(env_vars::ZELCORE_URL) {
            tracing::debug!("Using {} for Zelcore", env_vars::ZELCORE_URL);
            self.zelcore_url = url;
        }
        if let Some(network_id) = lookup(env_vars::NETWORK_ID) {
            self.network_id = checked_network_id(network_id);
        }
        if let Some(key) = lookup(env_vars::AUTORESUME_KEY) {
            self.autoresume_key = key;
        }
        self
    }
}

/// Unknown network ids fall back to mainnet
fn checked_network_id(network_id: String) -> String {
    if is_chainweb_network_id(&network_id) {
        network_id
    } else {
        tracing::warn!(
            network_id = %network_id,
            fallback = DEFAULT_NETWORK_ID,
            "Not a chainweb network id"
        );
        DEFAULT_NETWORK_ID.to_string()
    }
}
