pub mod allocations;
pub mod dashboard;
pub mod index;
pub mod queues;
pub mod resources;
pub mod sample_data;
pub mod students;
