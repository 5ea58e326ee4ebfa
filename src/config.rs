//! Configuration management for the Amoveo client
//!
//! Loads configuration from TOML files with environment variable substitution.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub node: NodeConfig,
    pub explorer: ExplorerConfig,
    #[serde(default)]
    pub tx: TxConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeConfig {
    /// Node API endpoints, tried in order on failure
    pub urls: Vec<String>,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExplorerConfig {
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TxConfig {
    /// Fee in satoshi attached to prepared transactions unless the
    /// intent overrides it
    pub default_fee: u64,
}

impl Default for TxConfig {
    fn default() -> Self {
        Self {
            default_fee: crate::tx::DEFAULT_TX_FEE,
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

impl Settings {
    /// Load settings from configuration files
    pub fn load() -> Result<Self> {
        let config_path = env::var("AMOVEO_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config/default.toml"));

        Self::load_from(&config_path)
    }

    /// Load settings from a specific file
    pub fn load_from(config_path: &std::path::Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        // Substitute environment variables
        let config_str = substitute_env_vars(&config_str);

        let settings: Settings =
            toml::from_str(&config_str).with_context(|| "Failed to parse configuration")?;

        settings.validate()?;

        Ok(settings)
    }

    /// Build settings programmatically from endpoint URLs
    pub fn from_urls(node_url: impl Into<String>, explorer_url: impl Into<String>) -> Self {
        Self {
            node: NodeConfig {
                urls: vec![node_url.into()],
                request_timeout_secs: default_timeout_secs(),
            },
            explorer: ExplorerConfig {
                url: explorer_url.into(),
                request_timeout_secs: default_timeout_secs(),
            },
            tx: TxConfig::default(),
        }
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.node.urls.is_empty() {
            anyhow::bail!("At least one node URL must be configured");
        }
        for url in &self.node.urls {
            if url.is_empty() {
                anyhow::bail!("Node URL must not be empty");
            }
        }
        if self.explorer.url.is_empty() {
            anyhow::bail!("Explorer URL must not be empty");
        }
        if self.tx.default_fee == 0 {
            tracing::warn!("Default fee is zero - nodes will reject free transactions");
        }

        Ok(())
    }
}

/// Substitute environment variables in the format ${VAR_NAME}
fn substitute_env_vars(input: &str) -> String {
    let mut result = input.to_string();
    let re = regex::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();

    for cap in re.captures_iter(input) {
        let var_name = &cap[1];
        let var_value = env::var(var_name).unwrap_or_default();
        result = result.replace(&cap[0], &var_value);
    }

    result
}
