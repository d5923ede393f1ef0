//! Demonstration requests used to populate a fresh engine.

use tracing::info;

use crate::engine::{AllocationEngine, Outcome};
use crate::error::AllocationError;
use crate::resource::ResourceKind;
use crate::student::{Priority, StudentRequest};

#[derive(Debug, Clone, Copy)]
pub struct SampleRequest {
    pub name: &'static str,
    pub student_id: &'static str,
    pub resource_type: ResourceKind,
    pub priority: i64,
    pub required_time: u32,
}

const fn sample(
    name: &'static str,
    student_id: &'static str,
    resource_type: ResourceKind,
    priority: i64,
    required_time: u32,
) -> SampleRequest {
    SampleRequest {
        name,
        student_id,
        resource_type,
        priority,
        required_time,
    }
}

// with the default ten pcs the last pc request has to wait
pub const SAMPLE_REQUESTS: [SampleRequest; 16] = [
    sample("Alice Sharma", "1001", ResourceKind::Pc, 2, 45),
    sample("Bob Singh", "1002", ResourceKind::Pc, 2, 30),
    sample("Charlie Kumar", "1003", ResourceKind::Pc, 2, 60),
    sample("Diana Patel", "1004", ResourceKind::Pc, 2, 30),
    sample("Eva Verma", "1005", ResourceKind::Pc, 2, 25),
    sample("Frank Joshi", "1006", ResourceKind::Pc, 2, 90),
    sample("Grace Reddy", "1007", ResourceKind::Pc, 2, 50),
    sample("Henry Malhotra", "1008", ResourceKind::Pc, 2, 40),
    sample("Isha Gupta", "1009", ResourceKind::Pc, 2, 35),
    sample("Jack Choudhary", "1010", ResourceKind::Pc, 2, 20),
    sample("Kiran Mehta", "1011", ResourceKind::Pc, 2, 75),
    sample("Lina Nair", "1012", ResourceKind::Book, 2, 55),
    sample("Mohan Das", "1013", ResourceKind::Book, 2, 30),
    sample("Neha Kapoor", "1014", ResourceKind::Book, 3, 25),
    sample("Om Prakash", "1015", ResourceKind::Seat, 2, 60),
    sample("Priya Singh", "1016", ResourceKind::Seat, 1, 90),
];

impl SampleRequest {
    pub fn to_request(self) -> Result<StudentRequest, AllocationError> {
        Ok(
            StudentRequest::new(self.name, self.student_id, self.resource_type)
                .with_priority(Priority::try_from(self.priority)?)
                .with_duration(self.required_time),
        )
    }
}

pub fn seed_sample_data(engine: &mut AllocationEngine) -> Result<Vec<Outcome>, AllocationError> {
    info!("initializing sample data");
    SAMPLE_REQUESTS
        .iter()
        .map(|sample| {
            let outcome = engine.submit_request(sample.to_request()?)?;
            match &outcome {
                Outcome::Allocated(grant) => info!(
                    student = sample.name,
                    resource_id = %grant.resource.resource_id,
                    "sample request allocated"
                ),
                Outcome::Queued { queue_type, .. } => info!(
                    student = sample.name,
                    %queue_type,
                    "sample request queued"
                ),
            }
            Ok::<_, AllocationError>(outcome)
        })
        .collect()
}
