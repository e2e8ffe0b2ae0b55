//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod idea;
mod report;
mod submission;
mod validation;

pub use idea::IdeaCommands;
pub use report::ReportCommands;
pub use submission::SubmissionCommands;
pub use validation::ValidationCommands;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Feasibility reports on the research workflow engine
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// LLM feedback, interviews and site-builder prompts for an idea
    Idea {
        #[command(subcommand)]
        command: IdeaCommands,
    },
    /// Stored idea submissions
    Submission {
        #[command(subcommand)]
        command: SubmissionCommands,
    },
    /// Stored validation feedback
    Validation {
        #[command(subcommand)]
        command: ValidationCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Report { command } => report::handle_report_command(command, config).await,
        Commands::Idea { command } => idea::handle_idea_command(command, config).await,
        Commands::Submission { command } => {
            submission::handle_submission_command(command, config).await
        }
        Commands::Validation { command } => {
            validation::handle_validation_command(command, config).await
        }
    }
}
