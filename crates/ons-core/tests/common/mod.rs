//! Test doubles and common utilities for reconciler contract tests
//!
//! This module provides an in-memory zone that records every call made
//! against it, plus helpers to wire a Reconciler over memory stores.

#![allow(dead_code)]

use ons_core::config::ReconcilerConfig;
use ons_core::error::{Error, Result};
use ons_core::record::{Record, RecordId};
use ons_core::store::{DesiredSet, MemoryRecordStore, TrackedSet};
use ons_core::traits::ZoneApi;
use ons_core::{ReconcileEvent, Reconciler};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

pub const ZONE: &str = "example.com";

/// A record of `ZONE` without identifier
pub fn rec(sub_domain: &str, target: &str) -> Record {
    Record::new(ZONE, sub_domain, target)
}

/// A record of `ZONE` carrying a provider identifier
pub fn live(sub_domain: &str, target: &str, id: u64) -> Record {
    rec(sub_domain, target).with_id(RecordId(id))
}

/// An in-memory zone that tracks calls
///
/// Clones share the zone content, counters and failure switches, so the
/// test keeps one handle while the reconciler owns another.
#[derive(Clone)]
pub struct MockZoneApi {
    /// Records currently in the zone
    records: Arc<Mutex<Vec<Record>>>,
    /// Next identifier handed out by create_record()
    next_id: Arc<AtomicUsize>,
    /// Call counter for list_identifiers()
    list_call_count: Arc<AtomicUsize>,
    /// Call counter for fetch_record()
    fetch_call_count: Arc<AtomicUsize>,
    /// Call counter for create_record()
    create_call_count: Arc<AtomicUsize>,
    /// Call counter for delete_record()
    delete_call_count: Arc<AtomicUsize>,
    /// Call counter for publish_zone()
    publish_call_count: Arc<AtomicUsize>,
    /// Identifiers passed to delete_record()
    deleted_ids: Arc<Mutex<Vec<RecordId>>>,
    /// Number of creates that succeed before every following one fails
    fail_create_after: Arc<Mutex<Option<usize>>>,
    /// Identifiers whose fetch fails
    failing_fetches: Arc<Mutex<HashSet<RecordId>>>,
    /// Identifiers listed but not fetchable (vanished)
    vanished: Arc<Mutex<HashSet<RecordId>>>,
    /// Make delete_record() fail
    fail_delete: Arc<AtomicBool>,
    /// Make publish_zone() fail
    fail_publish: Arc<AtomicBool>,
}

impl MockZoneApi {
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    /// A zone already holding `records`
    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
            next_id: Arc::new(AtomicUsize::new(1000)),
            list_call_count: Arc::new(AtomicUsize::new(0)),
            fetch_call_count: Arc::new(AtomicUsize::new(0)),
            create_call_count: Arc::new(AtomicUsize::new(0)),
            delete_call_count: Arc::new(AtomicUsize::new(0)),
            publish_call_count: Arc::new(AtomicUsize::new(0)),
            deleted_ids: Arc::new(Mutex::new(Vec::new())),
            fail_create_after: Arc::new(Mutex::new(None)),
            failing_fetches: Arc::new(Mutex::new(HashSet::new())),
            vanished: Arc::new(Mutex::new(HashSet::new())),
            fail_delete: Arc::new(AtomicBool::new(false)),
            fail_publish: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Current zone content
    pub fn records(&self) -> Vec<Record> {
        self.records.lock().unwrap().clone()
    }

    /// Remove a record behind the reconciler's back
    pub fn drop_out_of_band(&self, id: u64) {
        self.records
            .lock()
            .unwrap()
            .retain(|r| r.id != Some(RecordId(id)));
    }

    pub fn list_call_count(&self) -> usize {
        self.list_call_count.load(Ordering::SeqCst)
    }

    pub fn fetch_call_count(&self) -> usize {
        self.fetch_call_count.load(Ordering::SeqCst)
    }

    pub fn create_call_count(&self) -> usize {
        self.create_call_count.load(Ordering::SeqCst)
    }

    pub fn delete_call_count(&self) -> usize {
        self.delete_call_count.load(Ordering::SeqCst)
    }

    pub fn publish_call_count(&self) -> usize {
        self.publish_call_count.load(Ordering::SeqCst)
    }

    pub fn deleted_ids(&self) -> Vec<RecordId> {
        self.deleted_ids.lock().unwrap().clone()
    }

    /// Let `successes` creates through, then fail every following one
    pub fn fail_create_after(&self, successes: usize) {
        *self.fail_create_after.lock().unwrap() = Some(successes);
    }

    pub fn fail_fetch_of(&self, id: u64) {
        self.failing_fetches.lock().unwrap().insert(RecordId(id));
    }

    /// List `id` without being able to fetch it
    pub fn vanish(&self, id: u64) {
        self.vanished.lock().unwrap().insert(RecordId(id));
    }

    pub fn set_fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_publish(&self, fail: bool) {
        self.fail_publish.store(fail, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl ZoneApi for MockZoneApi {
    async fn list_identifiers(&self, zone: &str, field_type: &str) -> Result<Vec<RecordId>> {
        self.list_call_count.fetch_add(1, Ordering::SeqCst);

        let mut ids: Vec<RecordId> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.zone == zone)
            .filter(|r| r.field_type.as_deref().unwrap_or("A") == field_type)
            .filter_map(|r| r.id)
            .collect();
        ids.extend(self.vanished.lock().unwrap().iter().copied());
        Ok(ids)
    }

    async fn fetch_record(&self, zone: &str, id: RecordId) -> Result<Option<Record>> {
        self.fetch_call_count.fetch_add(1, Ordering::SeqCst);

        if self.failing_fetches.lock().unwrap().contains(&id) {
            return Err(Error::provider("mock", format!("fetch of {} failed", id)));
        }

        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.zone == zone && r.id == Some(id))
            .cloned())
    }

    async fn create_record(&self, zone: &str, sub_domain: &str, target: &str) -> Result<Record> {
        let previous = self.create_call_count.fetch_add(1, Ordering::SeqCst);

        let limit = *self.fail_create_after.lock().unwrap();
        if let Some(successes) = limit {
            if previous >= successes {
                return Err(Error::provider("mock", "create failed"));
            }
        }

        let id = RecordId(self.next_id.fetch_add(1, Ordering::SeqCst) as u64);
        let record = Record::new(zone, sub_domain, target).with_id(id);
        self.records.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn delete_record(&self, _zone: &str, id: RecordId) -> Result<()> {
        self.delete_call_count.fetch_add(1, Ordering::SeqCst);

        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(Error::provider("mock", "delete failed"));
        }

        self.deleted_ids.lock().unwrap().push(id);
        self.records.lock().unwrap().retain(|r| r.id != Some(id));
        Ok(())
    }

    async fn publish_zone(&self, _zone: &str) -> Result<()> {
        self.publish_call_count.fetch_add(1, Ordering::SeqCst);

        if self.fail_publish.load(Ordering::SeqCst) {
            return Err(Error::provider("mock", "refresh failed"));
        }
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Handles kept by a test after the reconciler takes ownership
pub struct Harness {
    pub reconciler: Reconciler,
    pub events: mpsc::Receiver<ReconcileEvent>,
    pub api: MockZoneApi,
    pub desired_store: MemoryRecordStore,
    pub tracked_store: MemoryRecordStore,
}

impl Harness {
    /// Build a reconciler over memory stores seeded with `desired` and
    /// `tracked`, and a zone seeded with `live`
    pub async fn new(desired: Vec<Record>, tracked: Vec<Record>, live: Vec<Record>) -> Self {
        let api = MockZoneApi::with_records(live);
        let desired_store = MemoryRecordStore::with_records(desired);
        let tracked_store = MemoryRecordStore::with_records(tracked);

        let desired_set = DesiredSet::load(Box::new(desired_store.clone()))
            .await
            .expect("desired set loads");
        let tracked_set = TrackedSet::load(Box::new(tracked_store.clone()))
            .await
            .expect("tracked set loads");

        let (reconciler, events) = Reconciler::new(
            Box::new(api.clone()),
            desired_set,
            tracked_set,
            ReconcilerConfig::default(),
        )
        .expect("reconciler construction succeeds");

        Self {
            reconciler,
            events,
            api,
            desired_store,
            tracked_store,
        }
    }

    /// Events emitted so far
    pub fn drain_events(&mut self) -> Vec<ReconcileEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}
