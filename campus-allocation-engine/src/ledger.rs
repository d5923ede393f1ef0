use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::student::RequestId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllocationRecord {
    pub request_id: RequestId,
    pub student_id: String,
    pub resource_id: String,
    pub allocated_at: DateTime<Utc>,
}

/// Active (student, resource) pairs. Lookups are linear.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    records: Vec<AllocationRecord>,
}

impl Ledger {
    pub fn record(&mut self, record: AllocationRecord) {
        self.records.push(record);
    }

    /// Removes the first record for this external student id on this
    /// resource.
    pub fn remove(&mut self, student_id: &str, resource_id: &str) -> Option<AllocationRecord> {
        let position = self.records.iter().position(|record| {
            record.student_id == student_id && record.resource_id == resource_id
        })?;
        Some(self.records.remove(position))
    }

    #[must_use]
    pub fn find_by_resource(&self, resource_id: &str) -> Option<&AllocationRecord> {
        self.records
            .iter()
            .find(|record| record.resource_id == resource_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AllocationRecord> {
        self.records.iter()
    }
}
