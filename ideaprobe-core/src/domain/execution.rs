//! Execution domain types
//!
//! An execution is one long-running job on the remote research workflow engine.
//! The engine assigns its identifier at launch time and reports progress through
//! a `processing_status` field on every status response.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier assigned by the workflow engine when an execution is launched
///
/// Never empty and never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExecutionId(String);

/// Error returned when an execution identifier is empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyExecutionId;

impl fmt::Display for EmptyExecutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "execution id cannot be empty")
    }
}

impl std::error::Error for EmptyExecutionId {}

impl ExecutionId {
    /// Create an execution id, rejecting empty or whitespace-only input
    pub fn new(id: impl Into<String>) -> Result<Self, EmptyExecutionId> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(EmptyExecutionId);
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExecutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ExecutionId {
    type Error = EmptyExecutionId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ExecutionId> for String {
    fn from(id: ExecutionId) -> Self {
        id.0
    }
}

/// Processing status reported by the workflow engine
///
/// The engine is not guaranteed to move monotonically between the in-progress
/// values, so callers must not assume a non-terminal status cannot reappear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    Pending,
    /// Any in-progress value other than `pending`
    Running,
    Finished,
    Failed,
}

impl ProcessingStatus {
    /// Parse a status string as sent by the engine
    ///
    /// Matching is case-insensitive. Unknown non-empty values are treated as
    /// in-progress so that a new engine state never stops the poll loop early.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "" => None,
            "pending" => Some(Self::Pending),
            "finished" | "completed" | "complete" | "success" => Some(Self::Finished),
            "failed" | "error" => Some(Self::Failed),
            _ => Some(Self::Running),
        }
    }

    /// Whether no further polling is meaningful
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished | Self::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Finished => "finished",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extract the processing status from a decoded status response
///
/// Reads `processing_status`, falling back to `status`. Returns `None` when
/// neither field holds a usable string.
pub fn observed_status(payload: &serde_json::Value) -> Option<ProcessingStatus> {
    ["processing_status", "status"]
        .iter()
        .filter_map(|key| payload.get(*key).and_then(|v| v.as_str()))
        .find_map(ProcessingStatus::parse)
}

/// One round-trip of the poll loop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollAttempt {
    /// 1-based, strictly increasing within one polling session
    pub sequence_number: u32,
    /// Decoded response body, absent when the attempt failed
    pub raw_response: Option<serde_json::Value>,
    pub observed_status: Option<ProcessingStatus>,
    /// Transport or decode failure message for this attempt
    pub error: Option<String>,
    pub observed_at: chrono::DateTime<chrono::Utc>,
}

impl PollAttempt {
    /// Record an attempt whose body decoded successfully
    pub fn decoded(sequence_number: u32, payload: serde_json::Value) -> Self {
        let observed_status = observed_status(&payload);
        Self {
            sequence_number,
            raw_response: Some(payload),
            observed_status,
            error: None,
            observed_at: chrono::Utc::now(),
        }
    }

    /// Record an attempt that failed before a payload was decoded
    pub fn errored(sequence_number: u32, error: impl Into<String>) -> Self {
        Self {
            sequence_number,
            raw_response: None,
            observed_status: None,
            error: Some(error.into()),
            observed_at: chrono::Utc::now(),
        }
    }

    pub fn is_decoded(&self) -> bool {
        self.raw_response.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_execution_id_rejects_empty() {
        assert!(ExecutionId::new("").is_err());
        assert!(ExecutionId::new("   ").is_err());
        assert_eq!(
            ExecutionId::new("1fcda3d7-aa").unwrap().as_str(),
            "1fcda3d7-aa"
        );
    }

    #[test]
    fn test_execution_id_serde_is_transparent() {
        let id = ExecutionId::new("abc").unwrap();
        assert_eq!(serde_json::to_value(&id).unwrap(), json!("abc"));

        let parsed: ExecutionId = serde_json::from_value(json!("abc")).unwrap();
        assert_eq!(parsed, id);

        assert!(serde_json::from_value::<ExecutionId>(json!("")).is_err());
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!(ProcessingStatus::parse("pending"), Some(ProcessingStatus::Pending));
        assert_eq!(ProcessingStatus::parse("FINISHED"), Some(ProcessingStatus::Finished));
        assert_eq!(ProcessingStatus::parse("failed"), Some(ProcessingStatus::Failed));
        assert_eq!(ProcessingStatus::parse("processing"), Some(ProcessingStatus::Running));
        assert_eq!(ProcessingStatus::parse("something-new"), Some(ProcessingStatus::Running));
        assert_eq!(ProcessingStatus::parse(""), None);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(ProcessingStatus::Finished.is_terminal());
        assert!(ProcessingStatus::Failed.is_terminal());
        assert!(!ProcessingStatus::Pending.is_terminal());
        assert!(!ProcessingStatus::Running.is_terminal());
    }

    #[test]
    fn test_observed_status() {
        assert_eq!(
            observed_status(&json!({"processing_status": "finished", "title": "Report X"})),
            Some(ProcessingStatus::Finished)
        );
        assert_eq!(
            observed_status(&json!({"status": "pending"})),
            Some(ProcessingStatus::Pending)
        );
        assert_eq!(observed_status(&json!({"processing_status": 3})), None);
        assert_eq!(observed_status(&json!({})), None);
    }

    #[test]
    fn test_poll_attempt_constructors() {
        let attempt = PollAttempt::decoded(1, json!({"processing_status": "pending"}));
        assert!(attempt.is_decoded());
        assert_eq!(attempt.observed_status, Some(ProcessingStatus::Pending));

        let attempt = PollAttempt::errored(2, "connection refused");
        assert!(!attempt.is_decoded());
        assert_eq!(attempt.observed_status, None);
        assert_eq!(attempt.error.as_deref(), Some("connection refused"));
    }
}
