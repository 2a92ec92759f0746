//! Error types for ons
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for ons operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for ons
#[derive(Error, Debug)]
pub enum Error {
    /// The exact (zone, sub-domain, target) triple is already declared
    #[error("Record `{sub_domain}.{zone} {target}` already added")]
    AlreadyDeclared {
        zone: String,
        sub_domain: String,
        target: String,
    },

    /// Neither the desired nor the tracked set knows this sub-domain
    #[error("Record `{sub_domain}.{zone}` not managed")]
    NotManaged { zone: String, sub_domain: String },

    /// Zone API failure (network, authentication, non-success status)
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Failure to read or write a record store
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An apply aborted part-way; the counted changes are already live
    ///
    /// `persist_error` is set when the tracked set could not be saved
    /// afterwards, leaving the file behind the zone.
    #[error(
        "Apply interrupted after {added} added, {removed} removed: {source}{}",
        unsaved_note(.persist_error)
    )]
    PartialApply {
        added: usize,
        removed: usize,
        forgotten: usize,
        #[source]
        source: Box<Error>,
        persist_error: Option<Box<Error>>,
    },
}

fn unsaved_note(persist_error: &Option<Box<Error>>) -> String {
    match persist_error {
        Some(e) => format!(" (tracked records not saved: {})", e),
        None => String::new(),
    }
}

impl Error {
    /// Create an "already declared" error for a triple
    pub fn already_declared(
        zone: impl Into<String>,
        sub_domain: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self::AlreadyDeclared {
            zone: zone.into(),
            sub_domain: sub_domain.into(),
            target: target.into(),
        }
    }

    /// Create a "not managed" error for a sub-domain
    pub fn not_managed(zone: impl Into<String>, sub_domain: impl Into<String>) -> Self {
        Self::NotManaged {
            zone: zone.into(),
            sub_domain: sub_domain.into(),
        }
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a persistence error
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// True when this error (or the cause of an interrupted apply) came
    /// from the zone API.
    pub fn is_provider(&self) -> bool {
        match self {
            Self::Provider { .. } => true,
            Self::PartialApply { source, .. } => source.is_provider(),
            _ => false,
        }
    }

    /// The save failure that followed an interrupted apply, if any
    pub fn persist_error(&self) -> Option<&Error> {
        match self {
            Self::PartialApply { persist_error, .. } => persist_error.as_deref(),
            _ => None,
        }
    }
}
