//! Zone reconciler
//!
//! The Reconciler is responsible for:
//! - Fetching a fresh live set from the ZoneApi on every call
//! - Diffing desired, tracked and live records into a plan
//! - Executing the plan and keeping the tracked set consistent
//! - Persisting the tracked set only after a structural change
//!
//! ## Architecture
//!
//! ```text
//!                       ┌──────────────┐
//!   add / remove ──────▶│  DesiredSet  │
//!                       └──────────────┘
//!                              │
//!                              ▼
//! ┌─────────────┐       ┌──────────────┐       ┌─────────────┐
//! │   ZoneApi   │──────▶│  Reconciler  │──────▶│ TrackedSet  │
//! │   (live)    │◀──────│ plan / apply │       │ (persisted) │
//! └─────────────┘       └──────────────┘       └─────────────┘
//!                              │
//!                              ▼
//!                       ┌──────────────┐
//!                       │    Events    │
//!                       │   (notify)   │
//!                       └──────────────┘
//! ```
//!
//! ## Apply Flow
//!
//! 1. Plan (which may persist a rebuilt tracked set)
//! 2. Create every missing record, tracking each one as it lands
//! 3. Delete every undesired record; forget drifted ones without a call
//! 4. Publish the zone once if anything changed remotely
//! 5. Persist the tracked set
//!
//! A provider failure stops the batch. Edits already made are never
//! rolled back; see [`Reconciler::apply`].

pub mod plan;

use std::net::Ipv4Addr;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::{ReconcilerConfig, StoreConfig};
use crate::error::{Error, Result};
use crate::live::fetch_live;
use crate::record::{ListedRecord, Record};
use crate::store::{DesiredSet, FileRecordStore, TrackedSet};
use crate::traits::ZoneApi;

pub use plan::{Diff, diff};

/// Events emitted by the Reconciler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileEvent {
    /// A record was created on the provider
    RecordCreated { record: Record },

    /// A record was deleted from the provider
    RecordDeleted { record: Record },

    /// A drifted record was dropped from the tracked set without a remote call
    RecordForgotten { record: Record },

    /// Pending edits were published
    ZonePublished { zone: String },

    /// The tracked set was written to its store
    TrackedPersisted { records_count: usize },

    /// An apply stopped on a provider failure
    ApplyInterrupted {
        zone: String,
        added: usize,
        removed: usize,
        error: String,
    },
}

/// Changes required to bring a zone in line with the desired set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub zone: String,

    /// Records to create, in desired order
    pub to_add: Vec<Record>,

    /// Records to delete (live identifier) or forget (unknown identifier),
    /// in tracked order
    pub to_remove: Vec<Record>,

    /// Whether computing the plan rewrote the tracked set
    pub tracked_changed: bool,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Counts of changes committed by an apply
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyOutcome {
    /// Records created on the provider
    pub added: usize,

    /// Records deleted from the provider
    pub removed: usize,

    /// Drifted records dropped from the tracked set
    pub forgotten: usize,
}

impl ApplyOutcome {
    /// Remote edits made (the ones that need a publish)
    pub fn edits(&self) -> usize {
        self.added + self.removed
    }

    pub fn is_noop(&self) -> bool {
        self.edits() == 0 && self.forgotten == 0
    }

    fn interrupted(self, source: Error, persist_error: Option<Error>) -> Error {
        Error::PartialApply {
            added: self.added,
            removed: self.removed,
            forgotten: self.forgotten,
            source: Box::new(source),
            persist_error: persist_error.map(Box::new),
        }
    }
}

/// Zone reconciler
///
/// Owns the desired and tracked sets for the lifetime of one invocation.
/// Every call works on a single zone; entries of other zones are carried
/// along untouched.
///
/// ## Threading
///
/// Calls take `&mut self` and run sequentially. The only concurrency is
/// the bounded detail fan-out inside live fetching.
///
/// ## Observation
///
/// The reconciler never prints. Progress is reported through the
/// [`ReconcileEvent`] receiver returned by [`Reconciler::new`]. The
/// channel is bounded; when it is full, events are dropped (logged).
pub struct Reconciler {
    /// Zone API for live reads and edits
    api: Box<dyn ZoneApi>,

    /// User-declared records
    desired: DesiredSet,

    /// Records created or adopted by ons
    tracked: TrackedSet,

    /// Record type handled
    field_type: String,

    /// Maximum detail fetches in flight
    fetch_concurrency: usize,

    /// Event sender for external reporting
    event_tx: mpsc::Sender<ReconcileEvent>,
}

impl Reconciler {
    /// Create a new reconciler
    ///
    /// # Parameters
    ///
    /// - `api`: ZoneApi implementation
    /// - `desired`: loaded desired set
    /// - `tracked`: loaded tracked set
    /// - `config`: reconciler configuration
    ///
    /// # Returns
    ///
    /// A tuple of (reconciler, event_receiver)
    pub fn new(
        api: Box<dyn ZoneApi>,
        desired: DesiredSet,
        tracked: TrackedSet,
        config: ReconcilerConfig,
    ) -> Result<(Self, mpsc::Receiver<ReconcileEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.event_channel_capacity);

        let reconciler = Self {
            api,
            desired,
            tracked,
            field_type: config.field_type,
            fetch_concurrency: config.fetch_concurrency,
            event_tx: tx,
        };

        Ok((reconciler, rx))
    }

    /// Create a reconciler backed by the record files of `store`
    ///
    /// The desired file must exist; the tracked file is created empty
    /// when missing.
    pub async fn open(
        api: Box<dyn ZoneApi>,
        store: &StoreConfig,
        config: ReconcilerConfig,
    ) -> Result<(Self, mpsc::Receiver<ReconcileEvent>)> {
        store.validate()?;

        let desired_store = FileRecordStore::open(store.desired_path()).await?;
        let tracked_store = FileRecordStore::open_or_create(store.tracked_path()).await?;

        let desired = DesiredSet::load(Box::new(desired_store)).await?;
        let tracked = TrackedSet::load(Box::new(tracked_store)).await?;

        Self::new(api, desired, tracked, config)
    }

    pub fn desired(&self) -> &DesiredSet {
        &self.desired
    }

    pub fn tracked(&self) -> &TrackedSet {
        &self.tracked
    }

    /// Compute the changes needed for `zone`
    ///
    /// The tracked set is rebuilt from the desired and live sets and
    /// persisted if that changed it.
    pub async fn plan(&mut self, zone: &str) -> Result<Plan> {
        let live = self.fetch_live(zone).await?;

        let Diff {
            to_add,
            to_remove,
            tracked,
            dirty,
        } = diff(zone, self.desired.records(), self.tracked.records(), &live);

        debug!(
            "Plan for {}: {} to add, {} to remove (tracked changed: {})",
            zone,
            to_add.len(),
            to_remove.len(),
            dirty
        );

        self.tracked.replace(tracked);
        if dirty {
            self.persist_tracked().await?;
        }

        Ok(Plan {
            zone: zone.to_string(),
            to_add,
            to_remove,
            tracked_changed: dirty,
        })
    }

    /// Execute the plan for `zone`
    ///
    /// An empty plan is a no-op: no publish, no write.
    ///
    /// # Errors
    ///
    /// On a provider failure the batch stops and `Error::PartialApply`
    /// is returned with the committed counts. When progress was made,
    /// the zone is published (best effort) and the tracked set persisted
    /// first, so the next plan starts from what is really live. A failed
    /// save is carried in the error's `persist_error`.
    pub async fn apply(&mut self, zone: &str) -> Result<ApplyOutcome> {
        let plan = self.plan(zone).await?;
        if plan.is_empty() {
            debug!("Nothing to apply for {}", zone);
            return Ok(ApplyOutcome::default());
        }

        let mut outcome = ApplyOutcome::default();

        if let Err(source) = self.execute(&plan, &mut outcome).await {
            return Err(self.interrupt(zone, outcome, source).await);
        }

        if outcome.edits() > 0 {
            if let Err(source) = self.publish(zone).await {
                error!("Failed to publish {}: {}", zone, source);
                let persist_error = self.persist_after_interruption().await;
                return Err(outcome.interrupted(source, persist_error));
            }
        }

        self.persist_tracked().await?;

        info!(
            "Applied {}: {} added, {} removed, {} forgotten",
            zone, outcome.added, outcome.removed, outcome.forgotten
        );
        Ok(outcome)
    }

    /// List the live records of `zone`, marking the ones that are declared
    pub async fn list(&self, zone: &str) -> Result<Vec<ListedRecord>> {
        let live = self.fetch_live(zone).await?;

        Ok(live
            .into_iter()
            .map(|record| {
                let managed = self.desired.contains(&record);
                ListedRecord { record, managed }
            })
            .collect())
    }

    /// Declare an A record
    pub async fn add(&mut self, zone: &str, sub_domain: &str, target: &str) -> Result<Record> {
        validate_zone(zone)?;
        if target.parse::<Ipv4Addr>().is_err() {
            return Err(Error::invalid_input(format!(
                "'{}' is not an IPv4 address",
                target
            )));
        }

        self.desired.add(zone, sub_domain, target).await
    }

    /// Undeclare a sub-domain, or a single target of it
    ///
    /// The records disappear from the zone on the next apply.
    pub async fn remove(
        &mut self,
        zone: &str,
        sub_domain: &str,
        target: Option<&str>,
    ) -> Result<Vec<Record>> {
        validate_zone(zone)?;
        self.desired
            .remove(zone, sub_domain, target, self.tracked.records())
            .await
    }

    async fn fetch_live(&self, zone: &str) -> Result<Vec<Record>> {
        validate_zone(zone)?;
        fetch_live(
            self.api.as_ref(),
            zone,
            &self.field_type,
            self.fetch_concurrency,
        )
        .await
    }

    /// Run the creates then the removals of `plan`, counting into `outcome`
    async fn execute(&mut self, plan: &Plan, outcome: &mut ApplyOutcome) -> Result<()> {
        for record in &plan.to_add {
            let mut created = self
                .api
                .create_record(&plan.zone, &record.sub_domain, &record.target)
                .await?;
            if created.zone.is_empty() {
                created.zone = plan.zone.clone();
            }

            info!("Created {}", created);
            self.tracked.push(created.clone());
            outcome.added += 1;
            self.emit_event(ReconcileEvent::RecordCreated { record: created });
        }

        for record in &plan.to_remove {
            match record.id {
                Some(id) => {
                    self.api.delete_record(&plan.zone, id).await?;
                    info!("Deleted {}", record);
                    outcome.removed += 1;
                    self.emit_event(ReconcileEvent::RecordDeleted {
                        record: record.clone(),
                    });
                }
                None => {
                    debug!("Forgetting {}, already gone from {}", record, plan.zone);
                    outcome.forgotten += 1;
                    self.emit_event(ReconcileEvent::RecordForgotten {
                        record: record.clone(),
                    });
                }
            }
            self.tracked.forget(record);
        }

        Ok(())
    }

    /// Wrap up an apply stopped by `source`
    async fn interrupt(&mut self, zone: &str, outcome: ApplyOutcome, source: Error) -> Error {
        warn!(
            "Apply of {} interrupted after {} added, {} removed: {}",
            zone, outcome.added, outcome.removed, source
        );
        self.emit_event(ReconcileEvent::ApplyInterrupted {
            zone: zone.to_string(),
            added: outcome.added,
            removed: outcome.removed,
            error: source.to_string(),
        });

        if outcome.edits() > 0 {
            if let Err(e) = self.publish(zone).await {
                warn!("Best-effort publish of {} failed: {}", zone, e);
            }
        }

        let persist_error = if outcome.is_noop() {
            None
        } else {
            self.persist_after_interruption().await
        };

        outcome.interrupted(source, persist_error)
    }

    async fn persist_after_interruption(&self) -> Option<Error> {
        let e = self.persist_tracked().await.err()?;
        error!("Failed to persist tracked records after interruption: {}", e);
        Some(e)
    }

    async fn publish(&self, zone: &str) -> Result<()> {
        self.api.publish_zone(zone).await?;
        info!("Published {}", zone);
        self.emit_event(ReconcileEvent::ZonePublished {
            zone: zone.to_string(),
        });
        Ok(())
    }

    async fn persist_tracked(&self) -> Result<()> {
        self.tracked.save().await?;
        self.emit_event(ReconcileEvent::TrackedPersisted {
            records_count: self.tracked.records().len(),
        });
        Ok(())
    }

    /// Emit a reconcile event
    ///
    /// Never blocks: when the channel is full, the event is dropped.
    fn emit_event(&self, event: ReconcileEvent) {
        if self.event_tx.try_send(event).is_err() {
            warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
        }
    }
}

fn validate_zone(zone: &str) -> Result<()> {
    if zone.trim().is_empty() {
        return Err(Error::invalid_input("Zone cannot be empty"));
    }
    Ok(())
}
