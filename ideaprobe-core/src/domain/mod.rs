//! Core domain types
//!
//! This module contains the core domain structures used across Ideaprobe services.
//! Execution types model the remote research workflow; submission and validation
//! types are shared between the backend (persists) and the CLI (displays).

pub mod execution;
pub mod report;
pub mod submission;
pub mod validation;
