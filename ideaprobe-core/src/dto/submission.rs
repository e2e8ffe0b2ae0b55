//! Submission and validation DTOs for the backend API

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::validation::ValidationStatus;

/// Request to store a new idea submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubmission {
    pub idea: String,
    pub target_market: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Request to store validation feedback for a submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateValidation {
    pub submission_id: Uuid,
    pub feedback: String,
}

/// Partial update of a validation
///
/// Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateValidation {
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub execution_id: Option<String>,
    #[serde(default)]
    pub status: Option<ValidationStatus>,
}
