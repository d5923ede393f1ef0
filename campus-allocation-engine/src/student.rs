use core::fmt::{self, Display};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AllocationError;
use crate::resource::ResourceKind;

pub const DEFAULT_DURATION_MINUTES: u32 = 30;

/// Engine-assigned handle of a single request.
///
/// Handles are handed out in submission order, so they also serve as the
/// arrival sequence number when two requests share a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(u64);

impl RequestId {
    pub(crate) const fn from_index(index: usize) -> Self {
        Self(index as u64)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lower value means higher precedence, both in the wait queues and when
/// deciding who may be preempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Priority(u8);

impl Priority {
    pub const HIGHEST: Self = Self(1);
    pub const LOWEST: Self = Self(5);

    #[must_use]
    pub const fn new(value: u8) -> Option<Self> {
        if value >= Self::HIGHEST.0 && value <= Self::LOWEST.0 {
            Some(Self(value))
        } else {
            None
        }
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self(2)
    }
}

impl TryFrom<i64> for Priority {
    type Error = AllocationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .ok()
            .and_then(Self::new)
            .ok_or(AllocationError::InvalidPriority(value))
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

pub fn parse_duration_minutes(value: i64) -> Result<u32, AllocationError> {
    u32::try_from(value)
        .ok()
        .filter(|minutes| *minutes > 0)
        .ok_or(AllocationError::InvalidDuration(value))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StudentStatus {
    Waiting,
    Allocated,
    /// Set whenever a student leaves a resource, including when it was
    /// preempted and put back into a queue.
    Completed,
}

#[derive(Debug, Clone)]
pub struct Student {
    request_id: RequestId,
    name: String,
    student_id: String,
    priority: Priority,
    duration_minutes: u32,
    arrival: DateTime<Utc>,
    status: StudentStatus,
}

impl Student {
    pub(crate) const fn new(
        request_id: RequestId,
        name: String,
        student_id: String,
        priority: Priority,
        duration_minutes: u32,
        arrival: DateTime<Utc>,
    ) -> Self {
        Self {
            request_id,
            name,
            student_id,
            priority,
            duration_minutes,
            arrival,
            status: StudentStatus::Waiting,
        }
    }

    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn student_id(&self) -> &str {
        &self.student_id
    }

    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    #[must_use]
    pub const fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    #[must_use]
    pub const fn arrival(&self) -> DateTime<Utc> {
        self.arrival
    }

    #[must_use]
    pub const fn status(&self) -> StudentStatus {
        self.status
    }

    pub(crate) fn mark_allocated(&mut self) {
        self.status = StudentStatus::Allocated;
    }

    pub(crate) fn mark_completed(&mut self) {
        self.status = StudentStatus::Completed;
    }

    #[must_use]
    pub fn view(&self) -> StudentView {
        StudentView {
            request_id: self.request_id,
            name: self.name.clone(),
            student_id: self.student_id.clone(),
            priority: self.priority,
            required_time: self.duration_minutes,
            arrival_time: self.arrival,
            status: self.status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentView {
    pub request_id: RequestId,
    pub name: String,
    pub student_id: String,
    pub priority: Priority,
    pub required_time: u32,
    pub arrival_time: DateTime<Utc>,
    pub status: StudentStatus,
}

/// A request as submitted by a caller, before the engine has assigned it an
/// arrival time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentRequest {
    pub name: String,
    pub student_id: String,
    pub resource_type: ResourceKind,
    pub priority: Priority,
    pub duration_minutes: u32,
}

impl StudentRequest {
    pub fn new(
        name: impl Into<String>,
        student_id: impl Into<String>,
        resource_type: ResourceKind,
    ) -> Self {
        Self {
            name: name.into(),
            student_id: student_id.into(),
            resource_type,
            priority: Priority::default(),
            duration_minutes: DEFAULT_DURATION_MINUTES,
        }
    }

    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub const fn with_duration(mut self, minutes: u32) -> Self {
        self.duration_minutes = minutes;
        self
    }
}
