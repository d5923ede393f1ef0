use alloc::collections::{BTreeMap, VecDeque};
use core::fmt::{self, Debug};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::AllocationError;
use crate::ledger::{AllocationRecord, Ledger};
use crate::queue::WaitQueue;
use crate::resource::{Occupancy, Resource, ResourceKind, ResourceView};
use crate::student::{Priority, RequestId, Student, StudentRequest, StudentView};

/// Released requests kept around for `student` lookups, oldest dropped first.
pub const COMPLETED_HISTORY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSizes {
    pub pc: usize,
    pub book: usize,
    pub seat: usize,
}

impl PoolSizes {
    #[must_use]
    pub const fn get(self, kind: ResourceKind) -> usize {
        match kind {
            ResourceKind::Pc => self.pc,
            ResourceKind::Book => self.book,
            ResourceKind::Seat => self.seat,
        }
    }
}

impl Default for PoolSizes {
    fn default() -> Self {
        Self {
            pc: 10,
            book: 50,
            seat: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Grant {
    pub resource: ResourceView,
    pub student: StudentView,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    Allocated(Grant),
    Queued {
        queue_type: ResourceKind,
        student: StudentView,
    },
}

impl Outcome {
    #[must_use]
    pub const fn student(&self) -> &StudentView {
        match self {
            Self::Allocated(grant) => &grant.student,
            Self::Queued { student, .. } => student,
        }
    }

    #[must_use]
    pub fn resource_id(&self) -> Option<&str> {
        match self {
            Self::Allocated(grant) => Some(&grant.resource.resource_id),
            Self::Queued { .. } => None,
        }
    }

    #[must_use]
    pub const fn is_allocated(&self) -> bool {
        matches!(self, Self::Allocated(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSnapshot {
    pub total_allocated: usize,
    pub available_by_type: BTreeMap<ResourceKind, usize>,
    pub allocated_by_type: BTreeMap<ResourceKind, usize>,
    pub queue_length_by_type: BTreeMap<ResourceKind, usize>,
    pub preemption_count: u64,
    pub total_students: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllocationRow {
    pub resource_id: String,
    pub resource_type: ResourceKind,
    pub resource_name: String,
    pub request_id: RequestId,
    pub student_name: String,
    pub student_id: String,
    pub priority: Priority,
    pub time_required: u32,
    pub remaining_time: u32,
    pub allocation_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueRow {
    pub position: usize,
    pub request_id: RequestId,
    pub student_name: String,
    pub student_id: String,
    pub resource_type: ResourceKind,
    pub priority: Priority,
    pub arrival_time: DateTime<Utc>,
    pub wait_minutes: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueListing {
    pub queue_type: ResourceKind,
    pub length: usize,
    pub students: Vec<QueueRow>,
}

/// Owns the three resource pools, their wait queues and the ledger.
///
/// Every public method runs to completion without yielding. Callers sharing
/// an engine between threads must hold one lock around each call.
pub struct AllocationEngine {
    pool_sizes: PoolSizes,
    clock: Arc<dyn Clock>,
    resources: Vec<Resource>,
    queues: [WaitQueue; 3],
    ledger: Ledger,
    /// Requests that hold a resource or wait in a queue.
    students: BTreeMap<RequestId, Student>,
    completed: VecDeque<Student>,
    next_request: usize,
    preemption_count: u64,
    last_arrival: Option<DateTime<Utc>>,
}

impl Debug for AllocationEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AllocationEngine")
            .field("pool_sizes", &self.pool_sizes)
            .field("allocated", &self.ledger.len())
            .field("students", &self.students.len())
            .field("completed", &self.completed.len())
            .field("preemption_count", &self.preemption_count)
            .finish_non_exhaustive()
    }
}

impl Default for AllocationEngine {
    fn default() -> Self {
        Self::new(PoolSizes::default())
    }
}

impl AllocationEngine {
    #[must_use]
    pub fn new(pool_sizes: PoolSizes) -> Self {
        Self::with_clock(pool_sizes, Arc::new(SystemClock))
    }

    #[must_use]
    pub fn with_clock(pool_sizes: PoolSizes, clock: Arc<dyn Clock>) -> Self {
        let resources = ResourceKind::ALL
            .into_iter()
            .flat_map(|kind| {
                (1..=pool_sizes.get(kind)).map(move |number| Resource::new(kind, number))
            })
            .collect();
        Self {
            pool_sizes,
            clock,
            resources,
            queues: ResourceKind::ALL.map(|_| WaitQueue::default()),
            ledger: Ledger::default(),
            students: BTreeMap::new(),
            completed: VecDeque::new(),
            next_request: 0,
            preemption_count: 0,
            last_arrival: None,
        }
    }

    /// Throws away every request, allocation and queue entry and rebuilds
    /// the pools at their configured sizes.
    pub fn reset(&mut self) {
        info!(pool_sizes = ?self.pool_sizes, "resetting allocation engine");
        *self = Self::with_clock(self.pool_sizes, Arc::clone(&self.clock));
    }

    pub fn submit_request(&mut self, request: StudentRequest) -> Result<Outcome, AllocationError> {
        if request.duration_minutes == 0 {
            return Err(AllocationError::InvalidDuration(0));
        }
        let kind = request.resource_type;
        let request_id = RequestId::from_index(self.next_request);
        self.next_request += 1;
        let arrival = self.next_arrival();
        self.students.insert(
            request_id,
            Student::new(
                request_id,
                request.name,
                request.student_id,
                request.priority,
                request.duration_minutes,
                arrival,
            ),
        );

        if let Some(grant) = self
            .find_available(kind)
            .and_then(|index| self.grant(index, request_id))
        {
            return Ok(Outcome::Allocated(grant));
        }

        if self.preempt_for(request_id, kind) {
            if let Some(grant) = self
                .find_available(kind)
                .and_then(|index| self.grant(index, request_id))
            {
                return Ok(Outcome::Allocated(grant));
            }
        }

        let student = &self.students[&request_id];
        self.queues[kind.index()].enqueue(student);
        debug!(
            request = %request_id,
            student_id = student.student_id(),
            priority = %student.priority(),
            %kind,
            queue_length = self.queues[kind.index()].len(),
            "queued request"
        );
        debug_assert!(self.ledger_matches_occupancy());
        Ok(Outcome::Queued {
            queue_type: kind,
            student: student.view(),
        })
    }

    /// Frees an allocated resource and hands it to the head of its queue.
    ///
    /// Returns `false` without changing anything when the id is unknown or the
    /// resource is not allocated.
    pub fn release_resource(&mut self, resource_id: &str) -> bool {
        let Some(index) = self
            .resources
            .iter()
            .position(|resource| resource.id() == resource_id && !resource.is_available())
        else {
            warn!(resource_id, "release of unknown or unallocated resource");
            return false;
        };

        let kind = self.resources[index].kind();
        if let Some(holder) = self.vacate(index) {
            self.retire(holder);
        }
        info!(resource_id, "released resource");
        self.drain_queue(kind);
        true
    }

    /// Grants one free resource of `kind` to the head of its queue, if there is
    /// both a free resource and a waiting student.
    pub fn drain_queue(&mut self, kind: ResourceKind) -> Option<Grant> {
        let index = self.find_available(kind)?;
        let request_id = self.queues[kind.index()].pop_head()?;
        let grant = self.grant(index, request_id)?;
        info!(
            request = %request_id,
            resource_id = %grant.resource.resource_id,
            "allocated from queue"
        );
        debug_assert!(self.ledger_matches_occupancy());
        Some(grant)
    }

    #[must_use]
    pub fn dashboard_snapshot(&self) -> DashboardSnapshot {
        let mut available_by_type = BTreeMap::new();
        let mut allocated_by_type = BTreeMap::new();
        let mut queue_length_by_type = BTreeMap::new();
        for kind in ResourceKind::ALL {
            let (available, allocated): (Vec<_>, Vec<_>) = self
                .resources_of(kind)
                .map(|(_, resource)| resource)
                .partition(|resource| resource.is_available());
            available_by_type.insert(kind, available.len());
            allocated_by_type.insert(kind, allocated.len());
            queue_length_by_type.insert(kind, self.queues[kind.index()].len());
        }
        let total_allocated = allocated_by_type.values().sum::<usize>();
        let total_queued = queue_length_by_type.values().sum::<usize>();
        DashboardSnapshot {
            total_allocated,
            available_by_type,
            allocated_by_type,
            queue_length_by_type,
            preemption_count: self.preemption_count,
            total_students: total_allocated + total_queued,
        }
    }

    #[must_use]
    pub fn allocation_listing(&self) -> Vec<AllocationRow> {
        self.resources
            .iter()
            .filter_map(|resource| {
                let student = self.students.get(&resource.holder()?)?;
                Some(AllocationRow {
                    resource_id: resource.id().to_owned(),
                    resource_type: resource.kind(),
                    resource_name: resource.name().to_owned(),
                    request_id: student.request_id(),
                    student_name: student.name().to_owned(),
                    student_id: student.student_id().to_owned(),
                    priority: student.priority(),
                    time_required: student.duration_minutes(),
                    remaining_time: resource.remaining_minutes()?,
                    allocation_time: resource.granted_at()?,
                })
            })
            .collect()
    }

    #[must_use]
    pub fn queue_listing(&self) -> Vec<QueueListing> {
        let now = self.clock.now();
        ResourceKind::ALL
            .into_iter()
            .map(|kind| {
                let queue = &self.queues[kind.index()];
                let students = queue
                    .iter()
                    .enumerate()
                    .filter_map(|(position, request_id)| {
                        let student = self.students.get(&request_id)?;
                        Some(QueueRow {
                            position: position + 1,
                            request_id,
                            student_name: student.name().to_owned(),
                            student_id: student.student_id().to_owned(),
                            resource_type: kind,
                            priority: student.priority(),
                            arrival_time: student.arrival(),
                            wait_minutes: (now - student.arrival()).num_minutes().max(0),
                        })
                    })
                    .collect();
                QueueListing {
                    queue_type: kind,
                    length: queue.len(),
                    students,
                }
            })
            .collect()
    }

    #[must_use]
    pub fn resources(&self) -> Vec<ResourceView> {
        self.resources
            .iter()
            .map(|resource| resource.view(self.holder_of(resource)))
            .collect()
    }

    #[must_use]
    pub fn resource(&self, resource_id: &str) -> Option<ResourceView> {
        self.resources
            .iter()
            .find(|resource| resource.id() == resource_id)
            .map(|resource| resource.view(self.holder_of(resource)))
    }

    #[must_use]
    pub fn student(&self, request_id: RequestId) -> Option<StudentView> {
        self.students
            .get(&request_id)
            .or_else(|| {
                self.completed
                    .iter()
                    .rev()
                    .find(|student| student.request_id() == request_id)
            })
            .map(Student::view)
    }

    #[must_use]
    pub const fn preemption_count(&self) -> u64 {
        self.preemption_count
    }

    #[must_use]
    pub const fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    #[must_use]
    pub const fn queue(&self, kind: ResourceKind) -> &WaitQueue {
        &self.queues[kind.index()]
    }

    /// Every allocated resource has exactly one ledger record naming its
    /// holder, and the ledger has no other records.
    #[must_use]
    pub fn ledger_matches_occupancy(&self) -> bool {
        let allocated = self
            .resources
            .iter()
            .filter(|resource| resource.occupancy() == Occupancy::Allocated)
            .count();
        allocated == self.ledger.len()
            && self.resources.iter().all(|resource| {
                match (resource.holder(), self.ledger.find_by_resource(resource.id())) {
                    (None, None) => true,
                    (Some(holder), Some(record)) => {
                        record.request_id == holder
                            && self
                                .students
                                .get(&holder)
                                .is_some_and(|student| student.student_id() == record.student_id)
                    }
                    _ => false,
                }
            })
    }

    fn next_arrival(&mut self) -> DateTime<Utc> {
        let now = self.clock.now();
        let arrival = self.last_arrival.map_or(now, |last| last.max(now));
        self.last_arrival = Some(arrival);
        arrival
    }

    fn resources_of(&self, kind: ResourceKind) -> impl Iterator<Item = (usize, &Resource)> {
        self.resources
            .iter()
            .enumerate()
            .filter(move |(_, resource)| resource.kind() == kind)
    }

    fn find_available(&self, kind: ResourceKind) -> Option<usize> {
        self.resources_of(kind)
            .find(|(_, resource)| resource.is_available())
            .map(|(index, _)| index)
    }

    fn holder_of(&self, resource: &Resource) -> Option<&Student> {
        resource
            .holder()
            .and_then(|holder| self.students.get(&holder))
    }

    fn grant(&mut self, index: usize, request_id: RequestId) -> Option<Grant> {
        let now = self.clock.now();
        let student = self.students.get_mut(&request_id)?;
        let resource = &mut self.resources[index];
        resource.allocate(student, now);
        self.ledger.record(AllocationRecord {
            request_id,
            student_id: student.student_id().to_owned(),
            resource_id: resource.id().to_owned(),
            allocated_at: now,
        });
        info!(
            request = %request_id,
            student_id = student.student_id(),
            priority = %student.priority(),
            resource_id = resource.id(),
            "allocated resource"
        );
        let grant = Grant {
            resource: resource.view(Some(&*student)),
            student: student.view(),
        };
        debug_assert!(self.ledger_matches_occupancy());
        Some(grant)
    }

    /// Deallocates the resource at `index` and drops its ledger record.
    /// Returns the displaced holder.
    fn vacate(&mut self, index: usize) -> Option<RequestId> {
        let resource = &mut self.resources[index];
        let holder = resource.holder()?;
        let student = self.students.get_mut(&holder)?;
        resource.deallocate(student);
        let removed = self.ledger.remove(student.student_id(), resource.id());
        debug_assert!(removed.is_some(), "{} had no ledger record", resource.id());
        Some(holder)
    }

    /// Moves a released request out of the live set into the bounded
    /// history.
    fn retire(&mut self, request_id: RequestId) {
        let Some(student) = self.students.remove(&request_id) else {
            return;
        };
        if self.completed.len() == COMPLETED_HISTORY {
            self.completed.pop_front();
        }
        self.completed.push_back(student);
    }

    /// Evicts the holder of `kind` with the numerically largest priority that
    /// is still strictly worse than the requester's. Among equally bad
    /// holders the first in pool order is chosen. The evicted student goes
    /// back into the queue with its original priority and arrival.
    fn preempt_for(&mut self, requester: RequestId, kind: ResourceKind) -> bool {
        let Some(requester_priority) = self.students.get(&requester).map(Student::priority) else {
            return false;
        };
        let mut victim: Option<(usize, Priority)> = None;
        for (index, resource) in self.resources_of(kind) {
            let Some(holder) = resource.holder() else {
                continue;
            };
            let Some(holder_priority) = self.students.get(&holder).map(Student::priority) else {
                continue;
            };
            if holder_priority <= requester_priority {
                continue;
            }
            if victim.map_or(true, |(_, worst)| holder_priority > worst) {
                victim = Some((index, holder_priority));
            }
        }

        let Some((index, _)) = victim else {
            return false;
        };
        let Some(displaced) = self.vacate(index) else {
            return false;
        };
        let (Some(requester), Some(displaced)) =
            (self.students.get(&requester), self.students.get(&displaced))
        else {
            return false;
        };
        self.queues[kind.index()].enqueue(displaced);
        self.preemption_count += 1;

        info!(
            preempting_student = requester.student_id(),
            preempting_priority = %requester.priority(),
            preempted_student = displaced.student_id(),
            preempted_priority = %displaced.priority(),
            resource_id = self.resources[index].id(),
            preemption_count = self.preemption_count,
            "preempted resource"
        );
        true
    }
}
