//! Validation domain types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation feedback produced for a submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Validation {
    pub id: Uuid,
    pub submission_id: Uuid,
    /// Formatted LLM feedback
    pub feedback: String,
    /// Feasibility report execution, once one was purchased and launched
    pub execution_id: Option<String>,
    pub status: ValidationStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Where a validation stands in the funnel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationStatus {
    /// LLM feedback delivered
    Delivered,
    /// Feasibility report launched and being polled
    ReportPending,
    ReportReady,
    ReportFailed,
}

impl ValidationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delivered => "Delivered",
            Self::ReportPending => "ReportPending",
            Self::ReportReady => "ReportReady",
            Self::ReportFailed => "ReportFailed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Delivered" => Some(Self::Delivered),
            "ReportPending" => Some(Self::ReportPending),
            "ReportReady" => Some(Self::ReportReady),
            "ReportFailed" => Some(Self::ReportFailed),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_string_round_trip() {
        for status in [
            ValidationStatus::Delivered,
            ValidationStatus::ReportPending,
            ValidationStatus::ReportReady,
            ValidationStatus::ReportFailed,
        ] {
            assert_eq!(ValidationStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ValidationStatus::parse("delivered"), None);
    }
}
