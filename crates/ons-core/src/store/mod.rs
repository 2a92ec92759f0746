// # Record Store Implementations
//
// This module provides implementations of the RecordStore trait and the
// two record sets built on top of them.

pub mod file;
pub mod memory;
pub mod sets;

pub use file::FileRecordStore;
pub use memory::MemoryRecordStore;
pub use sets::{DesiredSet, TrackedSet};
