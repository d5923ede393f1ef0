use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use campus_allocation_engine::{
    parse_duration_minutes, Outcome, Priority, ResourceKind, StudentRequest,
    DEFAULT_DURATION_MINUTES,
};
use serde::Deserialize;

use crate::error::AppError;
use crate::response::ApiResponse;
use crate::AppState;

#[derive(Deserialize, Debug, Default)]
pub struct AddStudentPayload {
    pub name: Option<String>,
    pub student_id: Option<String>,
    pub resource_type: Option<String>,
    pub priority: Option<i64>,
    pub required_time: Option<i64>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

impl AddStudentPayload {
    /// Everything is validated here so a rejected request never reaches the
    /// engine.
    pub fn into_request(self) -> Result<StudentRequest, AppError> {
        let (Some(name), Some(student_id), Some(resource_type)) = (
            non_blank(self.name),
            non_blank(self.student_id),
            non_blank(self.resource_type),
        ) else {
            return Err(AppError::MissingFields);
        };
        let resource_type = resource_type.parse::<ResourceKind>()?;
        let priority = self
            .priority
            .map_or(Ok(Priority::default()), Priority::try_from)?;
        let duration = self
            .required_time
            .map_or(Ok(DEFAULT_DURATION_MINUTES), parse_duration_minutes)?;
        Ok(StudentRequest::new(name, student_id, resource_type)
            .with_priority(priority)
            .with_duration(duration))
    }
}

pub async fn add_student(
    State(state): State<AppState>,
    payload: Result<Json<AddStudentPayload>, JsonRejection>,
) -> Result<Json<ApiResponse<Outcome>>, AppError> {
    let Json(payload) = payload?;
    let request = payload.into_request()?;
    let outcome = state.with_engine(|engine| engine.submit_request(request))??;
    let message = if outcome.is_allocated() {
        "Student allocated"
    } else {
        "Student queued"
    };
    Ok(Json(ApiResponse::data(outcome).with_message(message)))
}

#[cfg(test)]
mod tests {
    use campus_allocation_engine::AllocationError;

    use super::*;

    fn payload() -> AddStudentPayload {
        AddStudentPayload {
            name: Some("Alice Sharma".to_owned()),
            student_id: Some("1001".to_owned()),
            resource_type: Some("pc".to_owned()),
            ..AddStudentPayload::default()
        }
    }

    #[test]
    fn fills_in_defaults() {
        let request = payload().into_request().unwrap();
        assert_eq!(request.resource_type, ResourceKind::Pc);
        assert_eq!(request.priority, Priority::default());
        assert_eq!(request.duration_minutes, DEFAULT_DURATION_MINUTES);
    }

    #[test]
    fn blank_fields_are_missing() {
        let request = AddStudentPayload {
            name: Some("   ".to_owned()),
            ..payload()
        };
        assert!(matches!(
            request.into_request(),
            Err(AppError::MissingFields)
        ));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let request = AddStudentPayload {
            priority: Some(9),
            ..payload()
        };
        assert!(matches!(
            request.into_request(),
            Err(AppError::Allocation(AllocationError::InvalidPriority(9)))
        ));

        let request = AddStudentPayload {
            required_time: Some(0),
            ..payload()
        };
        assert!(matches!(
            request.into_request(),
            Err(AppError::Allocation(AllocationError::InvalidDuration(0)))
        ));

        let request = AddStudentPayload {
            resource_type: Some("laptop".to_owned()),
            ..payload()
        };
        assert!(matches!(
            request.into_request(),
            Err(AppError::Allocation(AllocationError::InvalidResourceType(_)))
        ));
    }
}
