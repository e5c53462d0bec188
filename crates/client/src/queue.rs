// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline queue for sends issued while the connection is not open.
//!
//! Entries are held in memory and owned by the connection until flushed or
//! the client is discarded. The flush contract works on a snapshot: entries
//! appended while a flush is dispatching are not part of it and wait for the
//! next open transition. Capacity is unbounded; there is no back-pressure or
//! eviction policy.

use chrono::{DateTime, Utc};

/// A payload waiting for the connection to open.
#[derive(Debug, Clone)]
pub struct QueuedMessage {
    /// The payload exactly as handed to `send()`.
    pub payload: serde_json::Value,
    /// When the send was issued.
    pub enqueued_at: DateTime<Utc>,
}

/// In-memory buffer of undelivered sends.
#[derive(Debug, Default)]
pub struct OfflineQueue {
    entries: Vec<QueuedMessage>,
}

impl OfflineQueue {
    pub fn new() -> Self {
        OfflineQueue {
            entries: Vec::new(),
        }
    }

    /// Append a payload stamped with the current time.
    pub fn push(&mut self, payload: serde_json::Value) {
        self.entries.push(QueuedMessage {
            payload,
            enqueued_at: Utc::now(),
        });
    }

    /// Remove and return everything queued so far, sorted by enqueue time.
    ///
    /// The sort is stable, so entries with equal timestamps keep their
    /// insertion order. The queue is left empty: re-entrant sends during the
    /// flush accumulate fresh instead of joining the in-progress snapshot.
    pub fn take_snapshot(&mut self) -> Vec<QueuedMessage> {
        let mut snapshot = std::mem::take(&mut self.entries);
        snapshot.sort_by_key(|entry| entry.enqueued_at);
        snapshot
    }

    /// Put back the unsent remainder of a failed flush, ahead of anything
    /// queued since. Original timestamps are kept so the next flush preserves
    /// the delivery order.
    pub fn requeue(&mut self, remainder: Vec<QueuedMessage>) {
        self.entries.splice(0..0, remainder);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
