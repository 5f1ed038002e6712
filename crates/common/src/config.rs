//! Suite configuration
//!
//! Loaded from a TOML file with an `[app]` and an `[other]` section. The
//! `BASE_URL` and `SEED` environment variables take precedence over the file.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Environment variable overriding `app.base_url`
pub const BASE_URL_ENV: &str = "BASE_URL";

/// Environment variable overriding `other.seed`
pub const SEED_ENV: &str = "SEED";

/// Suite configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteConfig {
    /// Application under test
    #[serde(default)]
    pub app: AppConfig,

    /// Everything else
    #[serde(default)]
    pub other: OtherConfig,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            app: AppConfig::default(),
            other: OtherConfig::default(),
        }
    }
}

/// Application under test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the booking site, also the root of the booking API
    pub base_url: String,

    /// Basic auth user for the booking API
    pub booker_api_username: String,

    /// Basic auth password for the booking API
    pub booker_api_password: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "https://aw1.automationintesting.online".to_string(),
            booker_api_username: "admin".to_string(),
            booker_api_password: "password".to_string(),
        }
    }
}

/// Remaining settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OtherConfig {
    /// Seed for the fake data generator
    pub seed: u64,
}

impl Default for OtherConfig {
    fn default() -> Self {
        Self { seed: 1234 }
    }
}

impl SuiteConfig {
    /// Load configuration from file, falling back to defaults when it is missing
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            debug!("Loaded configuration from {}", path.display());
            Ok(config)
        } else {
            debug!("No configuration at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load configuration from file and apply `BASE_URL` / `SEED` from the environment
    pub fn load_with_env(path: &Path) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        info!(
            "Configuration: base_url={} seed={}",
            config.app.base_url, config.other.seed
        );
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the process environment in practice)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup(BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.app.base_url = base_url.trim().to_string();
        }

        if let Some(seed) = lookup(SEED_ENV).filter(|v| !v.trim().is_empty()) {
            self.other.seed = seed.trim().parse().map_err(|_| {
                Error::InvalidConfig(format!("{} must be an unsigned integer, got '{}'", SEED_ENV, seed))
            })?;
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.app.base_url.trim_end_matches('/')
    }
}
