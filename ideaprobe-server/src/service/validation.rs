//! Validation Service
//!
//! Business logic for validation feedback attached to submissions.

use ideaprobe_core::domain::validation::Validation;
use ideaprobe_core::dto::submission::{CreateValidation, UpdateValidation};
use sqlx::PgPool;
use uuid::Uuid;

use crate::repository::{submission_repository, validation_repository};

/// Service error type
#[derive(Debug)]
pub enum ValidationError {
    NotFound(Uuid),
    SubmissionNotFound(Uuid),
    InvalidRequest(String),
    DatabaseError(sqlx::Error),
}

impl From<sqlx::Error> for ValidationError {
    fn from(err: sqlx::Error) -> Self {
        ValidationError::DatabaseError(err)
    }
}

pub type Result<T> = std::result::Result<T, ValidationError>;

/// Store feedback for an existing submission
pub async fn create_validation(pool: &PgPool, req: CreateValidation) -> Result<Validation> {
    if req.feedback.trim().is_empty() {
        return Err(ValidationError::InvalidRequest(
            "Feedback cannot be empty".to_string(),
        ));
    }

    // Verify submission exists
    let _submission = submission_repository::find_by_id(pool, req.submission_id)
        .await?
        .ok_or(ValidationError::SubmissionNotFound(req.submission_id))?;

    let validation = validation_repository::create(pool, req).await?;

    tracing::info!(
        "Validation created: {} for submission: {}",
        validation.id,
        validation.submission_id
    );

    Ok(validation)
}

/// Get a validation by ID
pub async fn get_validation(pool: &PgPool, id: Uuid) -> Result<Validation> {
    validation_repository::find_by_id(pool, id)
        .await?
        .ok_or(ValidationError::NotFound(id))
}

/// List all validations
pub async fn list_validations(pool: &PgPool) -> Result<Vec<Validation>> {
    let validations = validation_repository::list_all(pool).await?;
    Ok(validations)
}

/// List validations of one submission
pub async fn list_validations_by_submission(
    pool: &PgPool,
    submission_id: Uuid,
) -> Result<Vec<Validation>> {
    // Verify submission exists
    let _submission = submission_repository::find_by_id(pool, submission_id)
        .await?
        .ok_or(ValidationError::SubmissionNotFound(submission_id))?;

    let validations = validation_repository::find_by_submission(pool, submission_id).await?;
    Ok(validations)
}

/// Update feedback, report execution or status of a validation
pub async fn update_validation(
    pool: &PgPool,
    id: Uuid,
    req: UpdateValidation,
) -> Result<Validation> {
    validate_update(&req)?;

    let validation = validation_repository::update(pool, id, req)
        .await?
        .ok_or(ValidationError::NotFound(id))?;

    tracing::info!(
        "Validation updated: {} (status: {})",
        validation.id,
        validation.status.as_str()
    );

    Ok(validation)
}

fn validate_update(req: &UpdateValidation) -> Result<()> {
    if req.feedback.is_none() && req.execution_id.is_none() && req.status.is_none() {
        return Err(ValidationError::InvalidRequest(
            "Update must change at least one field".to_string(),
        ));
    }

    if matches!(&req.feedback, Some(f) if f.trim().is_empty()) {
        return Err(ValidationError::InvalidRequest(
            "Feedback cannot be empty".to_string(),
        ));
    }

    if matches!(&req.execution_id, Some(id) if id.trim().is_empty()) {
        return Err(ValidationError::InvalidRequest(
            "Execution id cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ideaprobe_core::domain::validation::ValidationStatus;

    #[test]
    fn test_empty_update_is_rejected() {
        let result = validate_update(&UpdateValidation::default());
        assert!(matches!(result, Err(ValidationError::InvalidRequest(_))));
    }

    #[test]
    fn test_blank_fields_are_rejected() {
        let req = UpdateValidation {
            feedback: Some(" ".to_string()),
            ..Default::default()
        };
        assert!(validate_update(&req).is_err());

        let req = UpdateValidation {
            execution_id: Some(String::new()),
            ..Default::default()
        };
        assert!(validate_update(&req).is_err());
    }

    #[test]
    fn test_status_only_update_is_valid() {
        let req = UpdateValidation {
            status: Some(ValidationStatus::ReportReady),
            ..Default::default()
        };
        assert!(validate_update(&req).is_ok());
    }
}
