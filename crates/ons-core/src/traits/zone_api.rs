// # Zone API Trait
//
// Defines the interface the reconciler uses to read and edit a DNS zone
// hosted by the remote provider.
//
// ## Implementations
//
// - OVH: `ons-provider-ovh` crate
//
// ## Usage
//
// ```rust,ignore
// use ons_core::ZoneApi;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let api = /* ZoneApi implementation */;
//
//     let created = api.create_record("example.com", "www", "1.2.3.4").await?;
//     api.publish_zone("example.com").await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::record::{Record, RecordId};

/// Trait for zone API implementations
///
/// Every method maps to a single provider call.
///
/// # Thread Safety
///
/// Implementations must be thread-safe: record details are fetched
/// concurrently through a shared reference.
///
/// ## Forbidden Capabilities
/// - ❌ Retry or back off (every failure is surfaced to the reconciler)
/// - ❌ Access the desired or tracked stores (owned by the `Reconciler`)
/// - ❌ Cache zone content between calls (the live set is always fresh)
/// - ❌ Publish implicitly after an edit (`publish_zone` is called once per batch)
#[async_trait]
pub trait ZoneApi: Send + Sync {
    /// List the identifiers of every record of `field_type` in the zone
    ///
    /// Bare identifiers only; details need one `fetch_record` call each.
    async fn list_identifiers(
        &self,
        zone: &str,
        field_type: &str,
    ) -> Result<Vec<RecordId>, crate::Error>;

    /// Fetch one record's full value
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Record))`: the record, carrying its identifier
    /// - `Ok(None)`: no record with this identifier exists
    /// - `Err(Error)`: the request failed
    async fn fetch_record(
        &self,
        zone: &str,
        id: RecordId,
    ) -> Result<Option<Record>, crate::Error>;

    /// Create an A record; the provider assigns the identifier
    async fn create_record(
        &self,
        zone: &str,
        sub_domain: &str,
        target: &str,
    ) -> Result<Record, crate::Error>;

    /// Delete a record by identifier
    async fn delete_record(&self, zone: &str, id: RecordId) -> Result<(), crate::Error>;

    /// Propagate pending edits to the authoritative nameservers
    async fn publish_zone(&self, zone: &str) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
