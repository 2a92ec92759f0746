// # ons-core
//
// Core library for ons, a declarative manager of DNS A records hosted
// by OVH.
//
// ## Architecture Overview
//
// Three record sets meet in this crate:
// - **Desired**: what the user declared (`DesiredSet`, persisted on every edit)
// - **Tracked**: what ons created or adopted (`TrackedSet`, persisted when it changes)
// - **Live**: what the provider serves (fetched through `ZoneApi`, never persisted)
//
// The `Reconciler` diffs them into a plan and, on request, applies it.
//
// ## Design Principles
//
// 1. **Library-First**: the binary only parses arguments and prints events
// 2. **Fresh Reads**: the live set is fetched on every call, never cached
// 3. **Fail-Fast**: provider failures stop the batch, nothing is retried
// 4. **Roll-Forward**: committed edits are kept; the next plan reconciles them

pub mod config;
pub mod error;
pub mod live;
pub mod reconciler;
pub mod record;
pub mod store;
pub mod traits;

// Re-export core types for convenience
pub use config::{OnsConfig, ProviderConfig, ReconcilerConfig, StoreConfig};
pub use error::{Error, Result};
pub use reconciler::{ApplyOutcome, Plan, ReconcileEvent, Reconciler};
pub use record::{FIELD_TYPE_A, ListedRecord, Record, RecordId, RecordKey};
pub use store::{DesiredSet, FileRecordStore, MemoryRecordStore, TrackedSet};
pub use traits::{RecordStore, ZoneApi};
