use core::fmt::{self, Display};
use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AllocationError;
use crate::student::{RequestId, Student, StudentView};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Pc,
    Book,
    Seat,
}

impl ResourceKind {
    pub const ALL: [Self; 3] = [Self::Pc, Self::Book, Self::Seat];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pc => "pc",
            Self::Book => "book",
            Self::Seat => "seat",
        }
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            Self::Pc => 0,
            Self::Book => 1,
            Self::Seat => 2,
        }
    }

    /// Identifier of the `number`-th unit of this kind, counting from one:
    /// `PC-01`, `Book-001`, `Seat-001`.
    #[must_use]
    pub fn unit_id(self, number: usize) -> String {
        match self {
            Self::Pc => format!("PC-{number:02}"),
            Self::Book => format!("Book-{number:03}"),
            Self::Seat => format!("Seat-{number:03}"),
        }
    }
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = AllocationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pc" | "computer" | "compute" => Ok(Self::Pc),
            "book" => Ok(Self::Book),
            "seat" => Ok(Self::Seat),
            _ => Err(AllocationError::InvalidResourceType(value.to_owned())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Occupancy {
    Available,
    Allocated,
}

#[derive(Debug, Clone)]
struct Holding {
    holder: RequestId,
    granted_at: DateTime<Utc>,
    /// Copied from the request at grant time. Nothing counts it down.
    remaining_minutes: u32,
}

/// A single allocatable unit.
///
/// Holder, grant time and remaining time live in one optional value, so a
/// resource is available exactly when none of them are set.
#[derive(Debug, Clone)]
pub struct Resource {
    id: String,
    kind: ResourceKind,
    name: String,
    holding: Option<Holding>,
}

impl Resource {
    #[must_use]
    pub fn new(kind: ResourceKind, number: usize) -> Self {
        let id = kind.unit_id(number);
        Self {
            name: id.clone(),
            id,
            kind,
            holding: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn occupancy(&self) -> Occupancy {
        if self.holding.is_some() {
            Occupancy::Allocated
        } else {
            Occupancy::Available
        }
    }

    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.holding.is_none()
    }

    #[must_use]
    pub fn holder(&self) -> Option<RequestId> {
        self.holding.as_ref().map(|holding| holding.holder)
    }

    #[must_use]
    pub fn granted_at(&self) -> Option<DateTime<Utc>> {
        self.holding.as_ref().map(|holding| holding.granted_at)
    }

    #[must_use]
    pub fn remaining_minutes(&self) -> Option<u32> {
        self.holding.as_ref().map(|holding| holding.remaining_minutes)
    }

    pub(crate) fn allocate(&mut self, student: &mut Student, now: DateTime<Utc>) {
        debug_assert!(self.is_available(), "{} is already allocated", self.id);
        self.holding = Some(Holding {
            holder: student.request_id(),
            granted_at: now,
            remaining_minutes: student.duration_minutes(),
        });
        student.mark_allocated();
    }

    /// Clears the holding and marks the departing student completed, whether
    /// it finished or is being preempted.
    pub(crate) fn deallocate(&mut self, holder: &mut Student) {
        debug_assert_eq!(self.holder(), Some(holder.request_id()));
        self.holding = None;
        holder.mark_completed();
    }

    #[must_use]
    pub fn view(&self, holder: Option<&Student>) -> ResourceView {
        ResourceView {
            resource_id: self.id.clone(),
            resource_type: self.kind,
            name: self.name.clone(),
            status: self.occupancy(),
            allocated_to: holder.map(Student::view),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceView {
    pub resource_id: String,
    pub resource_type: ResourceKind,
    pub name: String,
    pub status: Occupancy,
    pub allocated_to: Option<StudentView>,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;

    use super::*;
    use crate::student::{Priority, StudentStatus};

    #[test]
    fn unit_ids_are_zero_padded() {
        assert_eq!(ResourceKind::Pc.unit_id(1), "PC-01");
        assert_eq!(ResourceKind::Pc.unit_id(10), "PC-10");
        assert_eq!(ResourceKind::Book.unit_id(7), "Book-007");
        assert_eq!(ResourceKind::Seat.unit_id(30), "Seat-030");
    }

    #[test]
    fn parses_known_kinds_only() {
        assert_eq!("pc".parse(), Ok(ResourceKind::Pc));
        assert_eq!(" Computer ".parse(), Ok(ResourceKind::Pc));
        assert_eq!("BOOK".parse(), Ok(ResourceKind::Book));
        assert_eq!("seat".parse(), Ok(ResourceKind::Seat));
        assert_eq!(
            "printer".parse::<ResourceKind>(),
            Err(AllocationError::InvalidResourceType("printer".to_owned()))
        );
    }

    #[test]
    fn allocate_then_deallocate() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let mut student = Student::new(
            RequestId::from_index(0),
            "Alice".to_owned(),
            "1001".to_owned(),
            Priority::default(),
            45,
            now,
        );
        let mut resource = Resource::new(ResourceKind::Pc, 1);
        assert_eq!(resource.occupancy(), Occupancy::Available);
        assert_eq!(resource.holder(), None);
        assert_eq!(resource.granted_at(), None);

        resource.allocate(&mut student, now);
        assert_eq!(resource.occupancy(), Occupancy::Allocated);
        assert_eq!(resource.holder(), Some(student.request_id()));
        assert_eq!(resource.granted_at(), Some(now));
        assert_eq!(resource.remaining_minutes(), Some(45));
        assert_eq!(student.status(), StudentStatus::Allocated);

        resource.deallocate(&mut student);
        assert_eq!(resource.occupancy(), Occupancy::Available);
        assert_eq!(resource.holder(), None);
        assert_eq!(resource.granted_at(), None);
        assert_eq!(resource.remaining_minutes(), None);
        assert_eq!(student.status(), StudentStatus::Completed);
    }
}
