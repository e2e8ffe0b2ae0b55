//! Service Module
//!
//! Business logic layer for the backend.
//! Services validate requests and orchestrate repository calls.

pub mod submission;
pub mod validation;

// Re-export for convenience
pub use submission as submission_service;
pub use validation as validation_service;
