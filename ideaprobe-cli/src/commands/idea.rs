//! Idea command handlers
//!
//! Asks the completion endpoint for validation feedback, simulated customer
//! interviews, and a landing-page builder prompt.

use anyhow::{Context, Result, anyhow};
use clap::Subcommand;
use colored::*;
use ideaprobe_client::CompletionClient;
use ideaprobe_core::dto::submission::{CreateSubmission, CreateValidation};
use ideaprobe_core::prompt::{PERSONA_COUNT, PromptSource};

use crate::api::ApiClient;
use crate::config::Config;

/// Idea subcommands
#[derive(Subcommand)]
pub enum IdeaCommands {
    /// Get candid validation feedback for an idea
    Validate {
        /// Product idea to validate
        #[arg(short, long)]
        idea: String,

        /// Target market for the idea
        #[arg(short, long)]
        market: String,

        /// Contact email stored with the submission
        #[arg(short, long)]
        email: Option<String>,

        /// Store the idea and the feedback on the backend
        #[arg(long)]
        save: bool,
    },
    /// Simulate customer interviews with fixed personas
    Interview {
        /// Product idea to discuss
        #[arg(short, long)]
        idea: String,

        /// Number of interviews to run
        #[arg(short, long, default_value_t = PERSONA_COUNT)]
        count: usize,
    },
    /// Generate a prompt for a landing-page builder
    SitePrompt {
        /// Product idea the landing page is for
        #[arg(short, long)]
        idea: String,
    },
}

/// Handle idea commands
///
/// # Arguments
/// * `command` - The idea command to execute
/// * `config` - The CLI configuration
pub async fn handle_idea_command(command: IdeaCommands, config: &Config) -> Result<()> {
    let completion = completion_client(config)?;

    match command {
        IdeaCommands::Validate {
            idea,
            market,
            email,
            save,
        } => {
            let feedback = validate(&completion, &idea, &market).await?;
            if save {
                let api = ApiClient::new(&config.backend_url, config.admin_token.clone());
                save_feedback(&api, idea, market, email, feedback).await?;
            }
            Ok(())
        }
        IdeaCommands::Interview { idea, count } => interview(&completion, &idea, count).await,
        IdeaCommands::SitePrompt { idea } => site_prompt(&completion, &idea).await,
    }
}

fn completion_client(config: &Config) -> Result<CompletionClient> {
    let api_key = config
        .openai_api_key
        .as_deref()
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| anyhow!("OPENAI_API_KEY is required for idea commands"))?;

    Ok(CompletionClient::with_base_url(&config.openai_base_url, api_key)
        .with_model(&config.openai_model))
}

async fn validate(completion: &CompletionClient, idea: &str, market: &str) -> Result<String> {
    eprintln!(
        "{}",
        format!("Asking {} for feedback...", completion.model()).dimmed()
    );

    let feedback = completion
        .validate_idea(idea, market)
        .await
        .context("Failed to get validation feedback")?;

    println!("{}", "Validation Feedback:".bold());
    println!("{}", "─".repeat(80).dimmed());
    println!("{}", feedback);
    println!("{}", "─".repeat(80).dimmed());

    Ok(feedback)
}

/// Store the idea as a submission, then the feedback as its validation
async fn save_feedback(
    api: &ApiClient,
    idea: String,
    market: String,
    email: Option<String>,
    feedback: String,
) -> Result<()> {
    let submission = api
        .create_submission(&CreateSubmission {
            idea,
            target_market: market,
            email,
        })
        .await
        .context("Failed to save submission")?;

    let validation = api
        .create_validation(&CreateValidation {
            submission_id: submission.id,
            feedback,
        })
        .await
        .context("Failed to save validation")?;

    println!();
    println!("{} Saved", "✓".green());
    println!("  Submission: {}", submission.id.to_string().cyan());
    println!("  Validation: {}", validation.id.to_string().cyan());

    Ok(())
}

async fn interview(completion: &CompletionClient, idea: &str, count: usize) -> Result<()> {
    let interviews = completion
        .simulate_interviews(idea, count)
        .await
        .context("Failed to simulate interviews")?;

    if interviews.is_empty() {
        println!("{}", "No interviews requested.".yellow());
        return Ok(());
    }

    println!(
        "{}",
        format!("{} simulated interview(s):", interviews.len()).bold()
    );
    for interview in interviews {
        println!();
        println!("{} {}", "▸".cyan(), interview.persona.bold());
        println!("{}", interview.transcript);
    }

    Ok(())
}

async fn site_prompt(completion: &CompletionClient, idea: &str) -> Result<()> {
    let prompt = completion
        .site_builder_prompt(idea)
        .await
        .context("Failed to generate site prompt")?;

    if prompt.source == PromptSource::Fallback {
        eprintln!(
            "{}",
            "⚠ No prompt found in the model response, using the default template".yellow()
        );
    }

    println!("{}", prompt.text);

    Ok(())
}
