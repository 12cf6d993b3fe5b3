//! Deduplication buffer.
//!
//! Continuous inventory re-reports every tag in range many times a second.
//! The buffer keeps two concurrent sets per reader: identifiers already
//! surfaced, and the full records that were accepted. A read produces a tag
//! event only when both inserts succeed.
//!
//! Both sets are [`DashSet`]s so the SDK callback thread can insert while any
//! other thread takes a [`BufferView`]. An outer reader/writer gate makes
//! `clear` atomic with respect to concurrent accepts: an accept observes
//! either both sets full or both empty, never one of each.

use dashmap::DashSet;
use std::sync::{PoisonError, RwLock};
use tracing::trace;
use uhfkit_core::{TagId, TagRecord};

/// Per-reader set of accepted tag reads.
#[derive(Debug, Default)]
pub struct TagBuffer {
    gate: RwLock<()>,
    uniques: DashSet<TagId>,
    records: DashSet<TagRecord>,
}

impl TagBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a normalized read.
    ///
    /// Returns `true` when the identifier had not been seen in this session
    /// and the record was stored, i.e. when a tag event must be emitted.
    pub fn accept(&self, record: &TagRecord) -> bool {
        let _gate = self.gate.read().unwrap_or_else(PoisonError::into_inner);

        if !self.uniques.insert(record.epc.clone()) {
            trace!(epc = %record.epc, "Duplicate read discarded");
            return false;
        }

        self.records.insert(record.clone())
    }

    /// Forget every identifier and record.
    pub fn clear(&self) {
        let _gate = self.gate.write().unwrap_or_else(PoisonError::into_inner);
        self.uniques.clear();
        self.records.clear();
    }

    /// Whether `epc` has already been surfaced.
    pub fn contains(&self, epc: &TagId) -> bool {
        self.uniques.contains(epc)
    }

    /// Number of accepted records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing has been accepted.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Read-only snapshot of the accepted records, oldest first.
    pub fn view(&self) -> BufferView {
        let _gate = self.gate.read().unwrap_or_else(PoisonError::into_inner);
        let mut records: Vec<TagRecord> = self.records.iter().map(|r| r.key().clone()).collect();
        records.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.epc.cmp(&b.epc)));
        BufferView { records }
    }
}

/// Snapshot of a reader's accepted records.
///
/// Later reads do not show up in an existing view; take a new one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferView {
    records: Vec<TagRecord>,
}

impl BufferView {
    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the view is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over records, oldest first.
    pub fn iter(&self) -> std::slice::Iter<'_, TagRecord> {
        self.records.iter()
    }

    /// Records as a slice.
    pub fn records(&self) -> &[TagRecord] {
        &self.records
    }

    /// Whether a record with this identifier is present.
    pub fn contains_epc(&self, epc: &str) -> bool {
        self.records.iter().any(|r| r.epc.as_str() == epc)
    }

    /// Identifiers in the view, oldest first.
    pub fn epcs(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.epc.as_str()).collect()
    }
}

impl<'a> IntoIterator for &'a BufferView {
    type Item = &'a TagRecord;
    type IntoIter = std::slice::Iter<'a, TagRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
