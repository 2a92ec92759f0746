// # Desired and Tracked Record Sets
//
// Both sets are loaded fully at construction and saved in full after a
// structural change. A mutation is applied to a copy, the copy is
// persisted, and only then does it replace the in-memory set, so a
// failed write leaves the set as it was on disk.

use crate::error::{Error, Result};
use crate::record::Record;
use crate::traits::RecordStore;

/// Records the user wants present
///
/// Invariant: no two entries share the same (zone, sub-domain, target)
/// triple.
pub struct DesiredSet {
    records: Vec<Record>,
    store: Box<dyn RecordStore>,
}

impl DesiredSet {
    /// Load the desired set from its store
    pub async fn load(store: Box<dyn RecordStore>) -> Result<Self> {
        let records = store.load().await?;
        Ok(Self { records, store })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Exact triple membership
    pub fn contains(&self, record: &Record) -> bool {
        self.records.iter().any(|r| r.same_triple(record))
    }

    /// Declare a record
    ///
    /// Fails with `AlreadyDeclared` if the exact triple is present.
    pub async fn add(&mut self, zone: &str, sub_domain: &str, target: &str) -> Result<Record> {
        let record = Record::new(zone, sub_domain, target);
        if self.contains(&record) {
            return Err(Error::already_declared(zone, sub_domain, target));
        }

        let mut next = self.records.clone();
        next.push(record.clone());
        self.commit(next).await?;

        tracing::debug!("Declared {}", record);
        Ok(record)
    }

    /// Undeclare records of a sub-domain
    ///
    /// With a `target`, only the exact triple is removed; without one,
    /// every target of the sub-domain is. Fails with `NotManaged` when
    /// neither this set nor `tracked` knows the sub-domain.
    ///
    /// # Returns
    ///
    /// The removed entries (possibly empty).
    pub async fn remove(
        &mut self,
        zone: &str,
        sub_domain: &str,
        target: Option<&str>,
        tracked: &[Record],
    ) -> Result<Vec<Record>> {
        let known = |records: &[Record]| records.iter().any(|r| r.same_sub_domain(zone, sub_domain));
        if !known(&self.records) && !known(tracked) {
            return Err(Error::not_managed(zone, sub_domain));
        }

        let (removed, kept): (Vec<Record>, Vec<Record>) =
            self.records.iter().cloned().partition(|r| {
                r.same_sub_domain(zone, sub_domain) && target.is_none_or(|t| r.target == t)
            });

        self.commit(kept).await?;

        tracing::debug!(
            "Undeclared {} record(s) for {}.{}",
            removed.len(),
            sub_domain,
            zone
        );
        Ok(removed)
    }

    async fn commit(&mut self, next: Vec<Record>) -> Result<()> {
        self.store.save(&next).await?;
        self.records = next;
        Ok(())
    }
}

/// Records the tool created or adopted
///
/// Mutated only by the reconciler; this type offers load and
/// save-on-demand plus the primitive edits the reconciler performs.
pub struct TrackedSet {
    records: Vec<Record>,
    store: Box<dyn RecordStore>,
}

impl TrackedSet {
    /// Load the tracked set from its store
    pub async fn load(store: Box<dyn RecordStore>) -> Result<Self> {
        let records = store.load().await?;
        Ok(Self { records, store })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub(crate) fn replace(&mut self, records: Vec<Record>) {
        self.records = records;
    }

    pub(crate) fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    /// Drop the entry matching `record`'s triple and identifier
    ///
    /// Round-robin siblings (same sub-domain, other target) and a freshly
    /// created copy of the same triple are left untouched.
    pub(crate) fn forget(&mut self, record: &Record) -> bool {
        let before = self.records.len();
        self.records
            .retain(|r| !(r.same_triple(record) && r.id == record.id));
        self.records.len() != before
    }

    /// Persist the whole set
    pub async fn save(&self) -> Result<()> {
        self.store.save(&self.records).await?;
        tracing::debug!(
            "Persisted {} tracked record(s) to {}",
            self.records.len(),
            self.store.location()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordId;
    use crate::store::MemoryRecordStore;

    fn rec(sub: &str, target: &str) -> Record {
        Record::new("example.com", sub, target)
    }

    #[tokio::test]
    async fn failed_save_leaves_desired_set_unchanged() {
        let store = MemoryRecordStore::new();
        let mut desired = DesiredSet::load(Box::new(store.clone())).await.unwrap();

        store.set_failing(true);
        let err = desired.add("example.com", "www", "1.2.3.4").await.unwrap_err();

        assert!(matches!(err, Error::Persistence(_)));
        assert!(desired.records().is_empty());
    }

    #[tokio::test]
    async fn forget_matches_triple_and_identifier() {
        let stale = rec("www", "1.2.3.4");
        let fresh = rec("www", "1.2.3.4").with_id(RecordId(11));
        let sibling = rec("www", "5.6.7.8").with_id(RecordId(12));
        let store = MemoryRecordStore::with_records(vec![
            stale.clone(),
            fresh.clone(),
            sibling.clone(),
        ]);
        let mut tracked = TrackedSet::load(Box::new(store)).await.unwrap();

        assert!(tracked.forget(&stale));
        assert_eq!(tracked.records(), &[fresh, sibling]);
        assert!(!tracked.forget(&stale));
    }
}
