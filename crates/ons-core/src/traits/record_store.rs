// # Record Store Trait
//
// Defines whole-set persistence for the desired and tracked record sets.
//
// Stores hold an ordered sequence of records and know nothing about
// their meaning: loading returns the full sequence, saving overwrites it.
// All mutation logic lives in `DesiredSet` and the `Reconciler`.
//
// ## Implementations
//
// - `FileRecordStore`: indented JSON array on disk
// - `MemoryRecordStore`: in-process, for tests and embedding

use async_trait::async_trait;

use crate::record::Record;

/// Trait for record store implementations
///
/// There is no locking across processes: two invocations racing on the
/// same backing file can lose writes.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Read the whole record sequence
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<Record>)`: records in stored order
    /// - `Err(Error::Persistence)`: the store could not be read or parsed
    async fn load(&self) -> Result<Vec<Record>, crate::Error>;

    /// Overwrite the store with `records`
    async fn save(&self, records: &[Record]) -> Result<(), crate::Error>;

    /// Human-readable location (for logging)
    fn location(&self) -> String;
}
