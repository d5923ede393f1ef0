use chrono::{DateTime, Utc};
use itertools::Itertools as _;

use crate::student::{Priority, RequestId, Student};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    priority: Priority,
    arrival: DateTime<Utc>,
    request_id: RequestId,
}

impl Entry {
    const fn key(&self) -> (Priority, DateTime<Utc>, RequestId) {
        (self.priority, self.arrival, self.request_id)
    }
}

/// Waiting list for one resource kind, kept sorted by priority and then by
/// arrival.
#[derive(Debug, Clone, Default)]
pub struct WaitQueue {
    entries: Vec<Entry>,
}

impl WaitQueue {
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn enqueue(&mut self, student: &Student) {
        self.entries.push(Entry {
            priority: student.priority(),
            arrival: student.arrival(),
            request_id: student.request_id(),
        });
        // full re-sort, not an insertion
        self.entries.sort_by_key(Entry::key);
    }

    #[must_use]
    pub fn head(&self) -> Option<RequestId> {
        self.entries.first().map(|entry| entry.request_id)
    }

    pub fn pop_head(&mut self) -> Option<RequestId> {
        if self.entries.is_empty() {
            return None;
        }
        Some(self.entries.remove(0).request_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = RequestId> + '_ {
        self.entries.iter().map(|entry| entry.request_id)
    }

    #[must_use]
    pub fn is_ordered(&self) -> bool {
        self.entries
            .iter()
            .tuple_windows()
            .all(|(left, right)| left.key() <= right.key())
    }
}
