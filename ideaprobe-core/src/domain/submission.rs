//! Submission domain types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A startup idea submitted by a visitor
///
/// Structure shared between backend (persists) and CLI (displays).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: Uuid,
    pub idea: String,
    pub target_market: String,
    pub email: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
