//! Submission command handlers
//!
//! Lists, shows, creates and deletes idea submissions on the backend.

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use ideaprobe_core::domain::submission::Submission;
use ideaprobe_core::dto::submission::CreateSubmission;

use crate::api::ApiClient;
use crate::commands::validation::print_validation_summary;
use crate::config::Config;
use crate::id_resolver::resolve_submission_id;

/// Submission subcommands
#[derive(Subcommand)]
pub enum SubmissionCommands {
    /// List all submissions (admin)
    List,
    /// Get submission details and its validations
    Get {
        /// Submission ID or unambiguous prefix
        id: String,
    },
    /// Store a new submission
    Create {
        /// Product idea
        #[arg(short, long)]
        idea: String,

        /// Target market
        #[arg(short, long)]
        market: String,

        /// Contact email
        #[arg(short, long)]
        email: Option<String>,
    },
    /// Delete a submission and its validations (admin)
    Delete {
        /// Submission ID or unambiguous prefix
        id: String,
    },
}

/// Handle submission commands
///
/// # Arguments
/// * `command` - The submission command to execute
/// * `config` - The CLI configuration
pub async fn handle_submission_command(command: SubmissionCommands, config: &Config) -> Result<()> {
    let client = ApiClient::new(&config.backend_url, config.admin_token.clone());

    match command {
        SubmissionCommands::List => list_submissions(&client).await,
        SubmissionCommands::Get { id } => get_submission(&client, &id).await,
        SubmissionCommands::Create {
            idea,
            market,
            email,
        } => {
            let req = CreateSubmission {
                idea,
                target_market: market,
                email,
            };
            create_submission(&client, &req).await
        }
        SubmissionCommands::Delete { id } => delete_submission(&client, &id).await,
    }
}

async fn list_submissions(client: &ApiClient) -> Result<()> {
    let submissions = client.list_submissions().await?;

    if submissions.is_empty() {
        println!("{}", "No submissions found.".yellow());
    } else {
        println!(
            "{}",
            format!("Found {} submission(s):", submissions.len()).bold()
        );
        println!();
        for submission in submissions {
            print_submission_summary(&submission);
        }
    }

    Ok(())
}

async fn get_submission(client: &ApiClient, id: &str) -> Result<()> {
    let uuid = resolve_submission_id(client, id).await?;

    let submission = client.get_submission(uuid).await?;
    let validations = client.list_submission_validations(uuid).await?;

    print_submission_details(&submission);

    if validations.is_empty() {
        println!("\n{}", "No validations yet.".dimmed());
    } else {
        println!("\n{}", format!("Validations ({}):", validations.len()).bold());
        for validation in validations {
            print_validation_summary(&validation);
        }
    }

    Ok(())
}

async fn create_submission(client: &ApiClient, req: &CreateSubmission) -> Result<()> {
    let submission = client.create_submission(req).await?;

    println!("{} Submission created", "✓".green());
    println!("  ID: {}", submission.id.to_string().cyan());

    Ok(())
}

async fn delete_submission(client: &ApiClient, id: &str) -> Result<()> {
    let uuid = resolve_submission_id(client, id).await?;

    client.delete_submission(uuid).await?;

    println!(
        "{} Submission {} deleted",
        "✓".green(),
        uuid.to_string().dimmed()
    );

    Ok(())
}

fn print_submission_summary(submission: &Submission) {
    println!(
        "  {} {} {}",
        "▸".cyan(),
        truncate(&submission.idea, 60).bold(),
        submission.id.to_string().dimmed()
    );
    println!("    Market:  {}", submission.target_market);
    if let Some(email) = &submission.email {
        println!("    Email:   {}", email.dimmed());
    }
    println!(
        "    Created: {}",
        submission
            .created_at
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .dimmed()
    );
    println!();
}

fn print_submission_details(submission: &Submission) {
    println!("{}", "Submission Details:".bold());
    println!("  ID:      {}", submission.id.to_string().cyan());
    println!("  Market:  {}", submission.target_market);
    if let Some(email) = &submission.email {
        println!("  Email:   {}", email);
    }
    println!(
        "  Created: {}",
        submission.created_at.format("%Y-%m-%d %H:%M:%S")
    );
    println!("\n{}", "Idea:".bold());
    println!("{}", submission.idea);
}

/// Shorten to at most `max` characters, marking the cut with an ellipsis
fn truncate(text: &str, max: usize) -> String {
    let line = text.lines().next().unwrap_or_default();
    if line.chars().count() <= max && line.len() == text.len() {
        return line.to_string();
    }
    let cut: String = line.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_single_line() {
        assert_eq!(truncate("Smart shelves", 60), "Smart shelves");
    }

    #[test]
    fn test_truncate_long_and_multiline() {
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
        assert_eq!(truncate("first\nsecond", 60), "first…");
    }
}
