use thiserror::Error;

#[allow(clippy::module_name_repetitions)]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    #[error("invalid resource type {0:?}, expected one of pc, book, seat")]
    InvalidResourceType(String),
    #[error("priority {0} is out of range, expected 1 (highest) to 5 (lowest)")]
    InvalidPriority(i64),
    #[error("required time must be a positive number of minutes, got {0}")]
    InvalidDuration(i64),
}
