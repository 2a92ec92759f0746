//! Configuration types for ons
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::record::FIELD_TYPE_A;

/// File name of the desired record set inside the store directory
pub const DESIRED_FILE_NAME: &str = "ons.config.json";

/// File name of the tracked record set inside the store directory
pub const TRACKED_FILE_NAME: &str = "ons.state.json";

/// Main ons configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnsConfig {
    /// Zone API provider configuration
    pub provider: ProviderConfig,

    /// Record store configuration
    pub store: StoreConfig,

    /// Optional reconciler settings
    #[serde(default)]
    pub reconciler: ReconcilerConfig,
}

impl OnsConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.provider.validate()?;
        self.store.validate()?;
        self.reconciler.validate()?;
        Ok(())
    }
}

/// OVH API credentials and endpoint
///
/// The Debug implementation does NOT expose the secret or consumer key.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Endpoint alias (`ovh-eu`, `ovh-ca`, ...) or explicit base URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Application key
    pub application_key: String,

    /// Application secret
    /// ⚠️ NEVER log this value
    pub application_secret: String,

    /// Consumer key
    /// ⚠️ NEVER log this value
    pub consumer_key: String,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("endpoint", &self.endpoint)
            .field("application_key", &self.application_key)
            .field("application_secret", &"<REDACTED>")
            .field("consumer_key", &"<REDACTED>")
            .finish()
    }
}

impl ProviderConfig {
    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.endpoint.is_empty() {
            return Err(crate::Error::config("Provider endpoint cannot be empty"));
        }
        if self.application_key.is_empty() {
            return Err(crate::Error::config("Application key cannot be empty"));
        }
        if self.application_secret.is_empty() {
            return Err(crate::Error::config("Application secret cannot be empty"));
        }
        if self.consumer_key.is_empty() {
            return Err(crate::Error::config("Consumer key cannot be empty"));
        }
        Ok(())
    }
}

fn default_endpoint() -> String {
    "ovh-eu".to_string()
}

/// Record store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding the desired and tracked files
    pub dir: PathBuf,
}

impl StoreConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn desired_path(&self) -> PathBuf {
        self.dir.join(DESIRED_FILE_NAME)
    }

    pub fn tracked_path(&self) -> PathBuf {
        self.dir.join(TRACKED_FILE_NAME)
    }

    /// Validate the store configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.dir.as_os_str().is_empty() {
            return Err(crate::Error::config("Store directory cannot be empty"));
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new("dns")
    }
}

/// Reconciler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    /// Record type listed from the zone
    #[serde(default = "default_field_type")]
    pub field_type: String,

    /// Maximum number of record detail fetches in flight
    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: usize,

    /// Capacity of the reconcile event channel
    ///
    /// When full, new events are dropped (with a warning log).
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl ReconcilerConfig {
    /// Validate the reconciler configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.field_type != FIELD_TYPE_A {
            return Err(crate::Error::config(format!(
                "Unsupported record type '{}': only A records are managed",
                self.field_type
            )));
        }
        if self.fetch_concurrency == 0 {
            return Err(crate::Error::config("Fetch concurrency must be > 0"));
        }
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }
        Ok(())
    }
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            field_type: default_field_type(),
            fetch_concurrency: default_fetch_concurrency(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_field_type() -> String {
    FIELD_TYPE_A.to_string()
}

fn default_fetch_concurrency() -> usize {
    16
}

fn default_event_channel_capacity() -> usize {
    1000
}
