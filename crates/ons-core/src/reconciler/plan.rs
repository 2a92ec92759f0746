// # Plan
//
// Three-way diff of the desired (D), tracked (T) and live (L) sets for a
// single zone. Pure: no I/O, no provider calls.
//
// ## Rules
//
// 1. `to_add`: every D triple absent from L, in D order.
// 2. `to_remove`, in T order:
//    - a T triple absent from L drifted away; it is reported with its
//      identifier reset to unknown and kept (unknown) in the rebuilt T
//    - a T triple present in L but no longer in D is reported with its
//      live identifier
// 3. Rebuilt T: every T entry refreshed from L, followed by D triples
//    found in L that T did not know about (adoption).
//
// Entries of other zones pass through the rebuilt T untouched.

use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

use crate::record::{Record, RecordKey};

/// Result of diffing one zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diff {
    /// Desired records missing from the zone
    pub to_add: Vec<Record>,

    /// Tracked records to delete (live identifier) or forget (no identifier)
    pub to_remove: Vec<Record>,

    /// The rebuilt tracked set, all zones included
    pub tracked: Vec<Record>,

    /// True when `tracked` differs structurally from the input tracked set
    pub dirty: bool,
}

/// Compute the diff for `zone`
///
/// `desired` and `tracked` may hold entries of any zone; `live` is the
/// live set of `zone` as returned by `fetch_live`.
pub fn diff(zone: &str, desired: &[Record], tracked: &[Record], live: &[Record]) -> Diff {
    // First wins when the provider holds the same triple twice.
    let mut live_index: HashMap<RecordKey, &Record> = HashMap::with_capacity(live.len());
    for record in live.iter().filter(|r| r.zone == zone) {
        live_index.entry(record.key()).or_insert(record);
    }

    let desired_keys: HashSet<RecordKey> = desired
        .iter()
        .filter(|r| r.zone == zone)
        .map(Record::key)
        .collect();

    let mut to_add = Vec::new();
    let mut added_keys = HashSet::new();
    for record in desired.iter().filter(|r| r.zone == zone) {
        let key = record.key();
        if !live_index.contains_key(&key) && added_keys.insert(key) {
            to_add.push(record.without_id());
        }
    }

    let mut rebuilt: IndexMap<RecordKey, Record> = IndexMap::with_capacity(tracked.len());
    let mut to_remove = Vec::new();
    let mut removed_keys = HashSet::new();
    let mut dirty = false;

    for record in tracked {
        let key = record.key();

        if record.zone != zone {
            rebuilt.entry(key).or_insert_with(|| record.clone());
            continue;
        }

        match live_index.get(&key) {
            None => {
                if record.has_live_id() {
                    dirty = true;
                }
                let stale = record.without_id();
                if removed_keys.insert(key.clone()) {
                    to_remove.push(stale.clone());
                }
                rebuilt.entry(key).or_insert(stale);
            }
            Some(live_record) => {
                if record.id != live_record.id {
                    dirty = true;
                }
                if !desired_keys.contains(&key) && removed_keys.insert(key.clone()) {
                    to_remove.push((*live_record).clone());
                }
                rebuilt.entry(key).or_insert_with(|| (*live_record).clone());
            }
        }
    }

    for record in desired.iter().filter(|r| r.zone == zone) {
        let key = record.key();
        if rebuilt.contains_key(&key) {
            continue;
        }
        if let Some(live_record) = live_index.get(&key) {
            rebuilt.insert(key, (*live_record).clone());
            dirty = true;
        }
    }

    if rebuilt.len() != tracked.len() {
        dirty = true;
    }

    Diff {
        to_add,
        to_remove,
        tracked: rebuilt.into_values().collect(),
        dirty,
    }
}
