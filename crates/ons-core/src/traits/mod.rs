//! Core traits for ons
//!
//! This module defines the abstract interfaces the reconciler depends on.
//!
//! - [`ZoneApi`]: Read and edit the provider-hosted zone
//! - [`RecordStore`]: Whole-set persistence of record sequences

pub mod record_store;
pub mod zone_api;

pub use record_store::RecordStore;
pub use zone_api::ZoneApi;
