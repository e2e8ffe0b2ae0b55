//! Validation command handlers

use anyhow::{Result, anyhow, bail};
use clap::Subcommand;
use colored::*;
use ideaprobe_core::domain::validation::{Validation, ValidationStatus};
use ideaprobe_core::dto::submission::UpdateValidation;

use crate::api::ApiClient;
use crate::config::Config;
use crate::id_resolver::{resolve_submission_id, resolve_validation_id};

/// Validation subcommands
#[derive(Subcommand)]
pub enum ValidationCommands {
    /// List all validations (admin)
    List,
    /// Get validation details
    Get {
        /// Validation ID or unambiguous prefix
        id: String,
    },
    /// List validations for a submission
    For {
        /// Submission ID or unambiguous prefix
        submission_id: String,
    },
    /// Update feedback, linked execution or status
    Update {
        /// Validation ID or unambiguous prefix
        id: String,

        #[arg(long)]
        feedback: Option<String>,

        /// Feasibility report execution to link
        #[arg(long)]
        execution_id: Option<String>,

        /// Delivered, ReportPending, ReportReady or ReportFailed
        #[arg(long)]
        status: Option<String>,
    },
}

/// Handle validation commands
///
/// # Arguments
/// * `command` - The validation command to execute
/// * `config` - The CLI configuration
pub async fn handle_validation_command(command: ValidationCommands, config: &Config) -> Result<()> {
    let client = ApiClient::new(&config.backend_url, config.admin_token.clone());

    match command {
        ValidationCommands::List => list_validations(&client).await,
        ValidationCommands::Get { id } => get_validation(&client, &id).await,
        ValidationCommands::For { submission_id } => {
            list_submission_validations(&client, &submission_id).await
        }
        ValidationCommands::Update {
            id,
            feedback,
            execution_id,
            status,
        } => {
            let req = update_request(feedback, execution_id, status.as_deref())?;
            update_validation(&client, &id, &req).await
        }
    }
}

async fn list_validations(client: &ApiClient) -> Result<()> {
    let validations = client.list_validations().await?;

    if validations.is_empty() {
        println!("{}", "No validations found.".yellow());
    } else {
        println!(
            "{}",
            format!("Found {} validation(s):", validations.len()).bold()
        );
        println!();
        for validation in validations {
            print_validation_summary(&validation);
        }
    }

    Ok(())
}

async fn get_validation(client: &ApiClient, id: &str) -> Result<()> {
    let uuid = resolve_validation_id(client, id).await?;
    let validation = client.get_validation(uuid).await?;

    print_validation_details(&validation);

    Ok(())
}

async fn list_submission_validations(client: &ApiClient, submission_id: &str) -> Result<()> {
    let submission_uuid = resolve_submission_id(client, submission_id).await?;
    let validations = client.list_submission_validations(submission_uuid).await?;

    if validations.is_empty() {
        println!(
            "{}",
            format!("No validations found for submission {}.", submission_uuid).yellow()
        );
    } else {
        println!(
            "{}",
            format!(
                "Found {} validation(s) for submission {}:",
                validations.len(),
                submission_uuid
            )
            .bold()
        );
        println!();
        for validation in validations {
            print_validation_summary(&validation);
        }
    }

    Ok(())
}

async fn update_validation(client: &ApiClient, id: &str, req: &UpdateValidation) -> Result<()> {
    let uuid = resolve_validation_id(client, id).await?;
    let validation = client.update_validation(uuid, req).await?;

    println!("{} Validation updated", "✓".green());
    print_validation_details(&validation);

    Ok(())
}

/// Build a partial update, requiring at least one field
fn update_request(
    feedback: Option<String>,
    execution_id: Option<String>,
    status: Option<&str>,
) -> Result<UpdateValidation> {
    if feedback.is_none() && execution_id.is_none() && status.is_none() {
        bail!("Nothing to update: pass --feedback, --execution-id or --status");
    }

    let status = status
        .map(|raw| {
            ValidationStatus::parse(raw).ok_or_else(|| {
                anyhow!(
                    "Unknown status '{}', expected Delivered, ReportPending, ReportReady or ReportFailed",
                    raw
                )
            })
        })
        .transpose()?;

    Ok(UpdateValidation {
        feedback,
        execution_id,
        status,
    })
}

/// Print a validation summary
pub(crate) fn print_validation_summary(validation: &Validation) {
    println!(
        "  {} Validation {}",
        "▸".cyan(),
        validation.id.to_string().dimmed()
    );
    println!("    Status:    {}", colorize_status(validation.status));
    if let Some(execution_id) = &validation.execution_id {
        println!("    Execution: {}", execution_id.dimmed());
    }
    println!(
        "    Updated:   {}",
        validation
            .updated_at
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .dimmed()
    );
    println!();
}

fn print_validation_details(validation: &Validation) {
    println!("{}", "Validation Details:".bold());
    println!("  ID:            {}", validation.id.to_string().cyan());
    println!(
        "  Submission ID: {}",
        validation.submission_id.to_string().dimmed()
    );
    println!("  Status:        {}", colorize_status(validation.status));
    if let Some(execution_id) = &validation.execution_id {
        println!("  Execution:     {}", execution_id);
    }
    println!(
        "  Created:       {}",
        validation.created_at.format("%Y-%m-%d %H:%M:%S")
    );
    println!(
        "  Updated:       {}",
        validation.updated_at.format("%Y-%m-%d %H:%M:%S")
    );

    println!("\n{}", "Feedback:".bold());
    println!("{}", validation.feedback);
}

fn colorize_status(status: ValidationStatus) -> ColoredString {
    let label = status.as_str();
    match status {
        ValidationStatus::Delivered => label.cyan(),
        ValidationStatus::ReportPending => label.yellow(),
        ValidationStatus::ReportReady => label.green(),
        ValidationStatus::ReportFailed => label.red(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_requires_a_field() {
        assert!(update_request(None, None, None).is_err());
    }

    #[test]
    fn test_update_request_parses_status() {
        let req = update_request(None, Some("exec-1".to_string()), Some("ReportPending")).unwrap();
        assert_eq!(req.status, Some(ValidationStatus::ReportPending));
        assert_eq!(req.execution_id.as_deref(), Some("exec-1"));

        let err = update_request(None, None, Some("done")).unwrap_err();
        assert!(err.to_string().contains("Unknown status"));
    }
}
