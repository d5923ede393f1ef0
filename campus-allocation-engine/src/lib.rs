//! Allocation of shared campus resources (computers, books, seats) to
//! students.
//!
//! Requests are granted straight away when a unit of the requested kind is
//! free. Otherwise the engine tries to preempt a holder with a strictly worse
//! priority, and failing that the request waits in a per-kind queue ordered
//! by priority and arrival. Releasing a unit hands it to the head of its
//! queue.

extern crate alloc;

pub mod clock;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod queue;
pub mod resource;
pub mod sample;
pub mod student;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{
    AllocationEngine, AllocationRow, DashboardSnapshot, Grant, Outcome, PoolSizes, QueueListing,
    QueueRow, COMPLETED_HISTORY,
};
pub use error::AllocationError;
pub use resource::{Occupancy, ResourceKind, ResourceView};
pub use sample::seed_sample_data;
pub use student::{
    parse_duration_minutes, Priority, RequestId, StudentRequest, StudentStatus, StudentView,
    DEFAULT_DURATION_MINUTES,
};
