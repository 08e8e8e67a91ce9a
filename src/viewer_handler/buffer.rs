//! Pending record queue owned by the worker.

use std::collections::VecDeque;

use crate::log_record::LogRecord;

/// Unbounded FIFO of records awaiting delivery.
///
/// Insertion order is delivery order. Records leave only from the head,
/// either because they were sent or because a flush discarded them.
#[derive(Debug, Default)]
pub struct RecordBuffer {
    records: VecDeque<LogRecord>,
}

impl RecordBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: LogRecord) {
        self.records.push_back(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogRecord> {
        self.records.iter()
    }

    /// The first `limit` records, oldest first.
    pub fn head(&self, limit: usize) -> impl Iterator<Item = &LogRecord> {
        self.records.iter().take(limit)
    }

    /// Remove up to `count` records from the head. Returns how many were removed.
    pub fn discard_front(&mut self, count: usize) -> usize {
        let count = count.min(self.records.len());
        self.records.drain(..count);
        count
    }

    /// Remove everything. Returns how many records were discarded.
    pub fn clear(&mut self) -> usize {
        let count = self.records.len();
        self.records.clear();
        count
    }
}
