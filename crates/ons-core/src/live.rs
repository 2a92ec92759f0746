//! Live set construction
//!
//! The live set is the provider's current record list for one zone. It is
//! pulled fresh on every reconciliation and never persisted.
//!
//! Fetching is a two-step affair: one call lists bare identifiers, then one
//! call per identifier retrieves the record. Detail fetches run through a
//! bounded fan-out and are all joined before anything is returned, so a
//! caller never sees a partial live set.

use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::record::{Record, RecordId};
use crate::traits::ZoneApi;

/// Fetch every `field_type` record of `zone`
///
/// # Parameters
///
/// - `concurrency`: maximum number of detail fetches in flight
///
/// # Returns
///
/// Records sorted by (sub-domain, target, identifier). A record that
/// vanished between listing and fetching is skipped. Any other failed
/// fetch fails the whole call with a single `Error::Provider` naming
/// every identifier that could not be read.
pub async fn fetch_live(
    api: &dyn ZoneApi,
    zone: &str,
    field_type: &str,
    concurrency: usize,
) -> Result<Vec<Record>> {
    let ids = api.list_identifiers(zone, field_type).await?;
    debug!("Zone {} lists {} {} record(s)", zone, ids.len(), field_type);

    let results: Vec<(RecordId, Result<Option<Record>>)> = stream::iter(ids)
        .map(|id| async move { (id, api.fetch_record(zone, id).await) })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let mut live = Vec::with_capacity(results.len());
    let mut failed = Vec::new();

    for (id, result) in results {
        match result {
            Ok(Some(mut record)) => {
                if record.zone.is_empty() {
                    record.zone = zone.to_string();
                }
                if record.id.is_none() {
                    record.id = Some(id);
                }
                live.push(record);
            }
            Ok(None) => {
                debug!("Record {} disappeared from {} while listing", id, zone);
            }
            Err(e) => {
                warn!("Failed to fetch record {} of {}: {}", id, zone, e);
                failed.push(format!("{} ({})", id, e));
            }
        }
    }

    if !failed.is_empty() {
        failed.sort();
        return Err(Error::provider(
            api.provider_name(),
            format!(
                "Failed to fetch {} record(s) of {}: {}",
                failed.len(),
                zone,
                failed.join(", ")
            ),
        ));
    }

    live.sort_by(|a, b| {
        a.sub_domain
            .cmp(&b.sub_domain)
            .then_with(|| a.target.cmp(&b.target))
            .then_with(|| a.id.cmp(&b.id))
    });

    Ok(live)
}
