//! Repository Module
//!
//! Data access layer for the backend.
//! Each repository handles database operations for a specific domain entity.

pub mod submission;
pub mod validation;

// Re-export for convenience
pub use submission as submission_repository;
pub use validation as validation_repository;
