//! Data Transfer Objects
//!
//! Request and response shapes for the research workflow engine and the
//! Ideaprobe backend API.

pub mod launch;
pub mod submission;
