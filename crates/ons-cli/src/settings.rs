//! Environment configuration
//!
//! | Variable                | Default  | Meaning                                  |
//! |-------------------------|----------|------------------------------------------|
//! | `ONS_ZONE`              |          | DNS zone to manage (or `--zone`)         |
//! | `ONS_PATH`              | `dns`    | Directory of the desired and state files |
//! | `ONS_ENDPOINT`          | `ovh-eu` | OVH endpoint alias or base URL           |
//! | `ONS_AK`                |          | Application key                          |
//! | `ONS_AS`                |          | Application secret                       |
//! | `ONS_CK`                |          | Consumer key                             |
//! | `ONS_FETCH_CONCURRENCY` | `16`     | Parallel record fetches                  |
//! | `ONS_LOG_LEVEL`         | `warn`   | trace, debug, info, warn or error        |

use anyhow::Result;
use ons_core::config::{OnsConfig, ProviderConfig, ReconcilerConfig, StoreConfig};
use std::env;
use tracing::Level;

/// Command line settings
pub struct Settings {
    pub zone: String,
    pub path: String,
    pub endpoint: String,
    pub application_key: String,
    pub application_secret: String,
    pub consumer_key: String,
    pub fetch_concurrency: Option<usize>,
    pub log_level: String,
}

impl Settings {
    /// Load settings from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load settings through `lookup`, which maps a variable name to its value
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let fetch_concurrency = match lookup("ONS_FETCH_CONCURRENCY") {
            Some(value) => Some(value.trim().parse().map_err(|_| {
                anyhow::anyhow!(
                    "ONS_FETCH_CONCURRENCY must be a positive integer. Got: {}",
                    value
                )
            })?),
            None => None,
        };

        Ok(Self {
            zone: lookup("ONS_ZONE").unwrap_or_default(),
            path: lookup("ONS_PATH").unwrap_or_else(|| "dns".to_string()),
            endpoint: lookup("ONS_ENDPOINT").unwrap_or_else(|| "ovh-eu".to_string()),
            application_key: lookup("ONS_AK").unwrap_or_default(),
            application_secret: lookup("ONS_AS").unwrap_or_default(),
            consumer_key: lookup("ONS_CK").unwrap_or_default(),
            fetch_concurrency,
            log_level: lookup("ONS_LOG_LEVEL").unwrap_or_else(|| "warn".to_string()),
        })
    }

    /// Override the zone from the command line
    pub fn with_zone(mut self, zone: Option<String>) -> Self {
        if let Some(zone) = zone {
            self.zone = zone;
        }
        self
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        if self.zone.trim().is_empty() {
            anyhow::bail!(
                "ONS_ZONE is required. \
                Set it via: export ONS_ZONE=example.com (or pass --zone)"
            );
        }

        for (name, value) in [
            ("ONS_AK", &self.application_key),
            ("ONS_AS", &self.application_secret),
            ("ONS_CK", &self.consumer_key),
        ] {
            if value.is_empty() {
                anyhow::bail!(
                    "{} is required. Create API credentials at https://api.ovh.com/createToken/",
                    name
                );
            }
        }

        if self.path.is_empty() {
            anyhow::bail!("ONS_PATH cannot be empty");
        }

        if self.fetch_concurrency == Some(0) {
            anyhow::bail!("ONS_FETCH_CONCURRENCY must be greater than 0");
        }

        self.level()?;
        Ok(())
    }

    /// Tracing level from `log_level`
    pub fn level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            _ => anyhow::bail!(
                "ONS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }
    }

    /// Library configuration
    pub fn to_config(&self) -> OnsConfig {
        let mut reconciler = ReconcilerConfig::default();
        if let Some(concurrency) = self.fetch_concurrency {
            reconciler.fetch_concurrency = concurrency;
        }

        OnsConfig {
            provider: ProviderConfig {
                endpoint: self.endpoint.clone(),
                application_key: self.application_key.clone(),
                application_secret: self.application_secret.clone(),
                consumer_key: self.consumer_key.clone(),
            },
            store: StoreConfig::new(&self.path),
            reconciler,
        }
    }
}
