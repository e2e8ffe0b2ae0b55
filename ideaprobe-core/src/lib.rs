//! Ideaprobe Core
//!
//! Core types and abstractions for the Ideaprobe validation funnel.
//!
//! This crate contains:
//! - Domain types: Executions on the research workflow engine, poll attempts,
//!   rendered reports, stored submissions and validations
//! - DTOs: Request/response shapes exchanged with the workflow engine and the backend
//! - Prompts: LLM prompt templates and best-effort extraction from LLM output

pub mod domain;
pub mod dto;
pub mod prompt;
