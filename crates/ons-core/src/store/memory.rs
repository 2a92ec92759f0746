// # Memory Record Store
//
// In-memory implementation of RecordStore.
//
// Clones share the same contents and counters, so a test can hand one
// clone to the reconciler and inspect another afterwards.

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

use crate::Error;
use crate::record::Record;
use crate::traits::RecordStore;

/// In-memory record store
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    inner: Arc<RwLock<Vec<Record>>>,
    save_count: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
}

impl MemoryRecordStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `records`
    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(records)),
            ..Self::default()
        }
    }

    /// Current stored contents
    pub async fn records(&self) -> Vec<Record> {
        self.inner.read().await.clone()
    }

    /// Number of successful saves so far
    pub fn save_count(&self) -> usize {
        self.save_count.load(Ordering::SeqCst)
    }

    /// Make subsequent loads and saves fail with a persistence error
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check_failing(&self) -> Result<(), Error> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::persistence("memory store is failing"));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn load(&self) -> Result<Vec<Record>, Error> {
        self.check_failing()?;
        Ok(self.inner.read().await.clone())
    }

    async fn save(&self, records: &[Record]) -> Result<(), Error> {
        self.check_failing()?;
        *self.inner.write().await = records.to_vec();
        self.save_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
