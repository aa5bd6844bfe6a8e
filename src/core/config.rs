use super::currency::Currency;
use super::subscription::PaymentCycle;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ExchangeRateProviderConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ExchangeRateProviderConfig {
    fn default() -> Self {
        ExchangeRateProviderConfig {
            base_url: "https://api.exchangerate-api.com".to_string(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ProxyProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub exchange_rate: ExchangeRateProviderConfig,
    /// When set, rates are read from a running `vpsval serve` instead of the upstream API.
    pub proxy: Option<ProxyProviderConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct RatesConfig {
    pub max_attempts: u32,
    pub refresh_attempts: u32,
    pub backoff_ms: u64,
    pub cache_ttl_ms: u64,
}

impl Default for RatesConfig {
    fn default() -> Self {
        RatesConfig {
            max_attempts: 3,
            refresh_attempts: 2,
            backoff_ms: 1000,
            cache_ttl_ms: 3_600_000,
        }
    }
}

impl RatesConfig {
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 3457,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AppConfig {
    #[serde(default = "default_currency")]
    pub currency: Currency,
    #[serde(default = "default_cycle")]
    pub cycle: PaymentCycle,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub rates: RatesConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

fn default_currency() -> Currency {
    Currency::Usd
}

fn default_cycle() -> PaymentCycle {
    PaymentCycle::Monthly
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            currency: default_currency(),
            cycle: default_cycle(),
            providers: ProvidersConfig::default(),
            rates: RatesConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads the config from the default location, falling back to built-in
    /// defaults when no file exists there.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "vpsval", "vpsval")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
