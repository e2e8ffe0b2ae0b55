//! Report command handlers
//!
//! Launches feasibility report executions on the research workflow engine
//! and follows them until they reach a terminal state.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};
use colored::*;
use ideaprobe_client::WorkflowClient;
use ideaprobe_client::poller::{ExhaustionReason, PollConfig, PollOutcome, PollSession};
use ideaprobe_core::domain::execution::{ExecutionId, PollAttempt, ProcessingStatus};
use ideaprobe_core::domain::report::Report;
use ideaprobe_core::dto::launch::LaunchRequest;
use tokio_util::sync::CancellationToken;

use crate::config::Config;

/// Report subcommands
#[derive(Subcommand)]
pub enum ReportCommands {
    /// Launch a report execution and print its execution ID
    Launch(LaunchArgs),
    /// Fetch the current status of an execution once
    Status {
        /// Execution ID returned by launch
        id: String,
    },
    /// Poll an execution until it finishes, fails, or the budget runs out
    Wait {
        /// Execution ID returned by launch
        id: String,

        #[command(flatten)]
        poll: PollArgs,
    },
    /// Launch a report execution and wait for the result
    Run {
        #[command(flatten)]
        launch: LaunchArgs,

        #[command(flatten)]
        poll: PollArgs,
    },
}

#[derive(Args)]
pub struct LaunchArgs {
    /// Target market for the idea
    #[arg(short, long)]
    market: String,

    /// Product idea to research
    #[arg(short, long)]
    idea: String,

    /// Email to deliver the report to (simplified form only)
    #[arg(short, long)]
    email: Option<String>,

    /// Send the simplified launch body instead of flow variables
    #[arg(long)]
    simplified: bool,
}

impl LaunchArgs {
    fn to_request(&self) -> LaunchRequest {
        if self.simplified || self.email.is_some() {
            LaunchRequest::simplified(&self.market, &self.idea, self.email.clone())
        } else {
            LaunchRequest::research(&self.market, &self.idea)
        }
    }
}

#[derive(Args)]
pub struct PollArgs {
    /// Maximum number of status requests
    #[arg(long, default_value_t = 60)]
    max_attempts: u32,

    /// Seconds between status requests
    #[arg(long, default_value_t = 5)]
    delay_secs: u64,

    /// Give up after this many seconds regardless of attempts left
    #[arg(long)]
    timeout_secs: Option<u64>,
}

impl PollArgs {
    fn to_config(&self) -> Result<PollConfig> {
        let mut config = PollConfig::new(self.max_attempts, Duration::from_secs(self.delay_secs));
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        config.validate()?;
        Ok(config)
    }
}

/// Handle report commands
///
/// # Arguments
/// * `command` - The report command to execute
/// * `config` - The CLI configuration
pub async fn handle_report_command(command: ReportCommands, config: &Config) -> Result<()> {
    let client = workflow_client(config);

    match command {
        ReportCommands::Launch(args) => {
            let execution_id = launch(&client, &args).await?;
            println!("{}", execution_id);
            Ok(())
        }
        ReportCommands::Status { id } => show_status(&client, &id).await,
        ReportCommands::Wait { id, poll } => {
            let execution_id = ExecutionId::new(id).context("Invalid execution ID")?;
            wait(&client, execution_id, &poll).await
        }
        ReportCommands::Run { launch: args, poll } => {
            // Fail on bad poll flags before anything is launched
            poll.to_config()?;
            let execution_id = launch(&client, &args).await?;
            wait(&client, execution_id, &poll).await
        }
    }
}

fn workflow_client(config: &Config) -> WorkflowClient {
    let client = WorkflowClient::new(&config.workflow_url);
    match &config.session_cookie {
        Some(cookie) => client.with_session_cookie(cookie),
        None => client,
    }
}

async fn launch(client: &WorkflowClient, args: &LaunchArgs) -> Result<ExecutionId> {
    let execution_id = client
        .launch(&args.to_request())
        .await
        .context("Failed to launch report")?;

    eprintln!(
        "{} Launched execution {}",
        "✓".green(),
        execution_id.as_str().cyan()
    );

    Ok(execution_id)
}

async fn show_status(client: &WorkflowClient, id: &str) -> Result<()> {
    let execution_id = ExecutionId::new(id).context("Invalid execution ID")?;
    let payload = client
        .fetch_status(&execution_id)
        .await
        .context("Failed to fetch execution status")?;

    let status = ideaprobe_core::domain::execution::observed_status(&payload);

    println!("{}", "Execution Status:".bold());
    println!("  ID:     {}", execution_id.as_str().cyan());
    println!("  Status: {}", colorize_status(status));

    if status == Some(ProcessingStatus::Finished) {
        println!();
        print_report(&payload);
    }

    Ok(())
}

/// Poll until terminal, cancelling on Ctrl-C
async fn wait(client: &WorkflowClient, execution_id: ExecutionId, poll: &PollArgs) -> Result<()> {
    let poll_config = poll.to_config()?;
    let cancel = CancellationToken::new();

    let guard = cancel.clone();
    let signal = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            guard.cancel();
        }
    });

    eprintln!(
        "{}",
        format!(
            "Waiting for {} (up to {} attempts, {}s apart, about {}s)...",
            execution_id,
            poll_config.max_attempts,
            poll_config.delay.as_secs(),
            wait_estimate(&poll_config).as_secs()
        )
        .dimmed()
    );

    let outcome = PollSession::new(execution_id.clone(), poll_config)
        .run_with_observer(client, &cancel, print_attempt)
        .await;

    signal.abort();

    report_outcome(&execution_id, outcome)
}

/// Longest the wait can take, ignoring request latency
fn wait_estimate(config: &PollConfig) -> Duration {
    match config.timeout {
        Some(timeout) => timeout.min(config.max_wait()),
        None => config.max_wait(),
    }
}

/// Print the report or turn a non-finished outcome into an error
fn report_outcome(execution_id: &ExecutionId, outcome: PollOutcome) -> Result<()> {
    let attempts = outcome.attempts().len();

    match outcome {
        PollOutcome::Finished { payload, .. } => {
            eprintln!(
                "{} Report finished after {} attempt(s)",
                "✓".green(),
                attempts
            );
            println!();
            print_report(&payload);
            Ok(())
        }
        PollOutcome::Failed { payload, .. } => {
            if let Some(message) = failure_message(&payload) {
                eprintln!("{}", message.red());
            }
            bail!(
                "Execution {} failed on the workflow engine after {} attempt(s)",
                execution_id,
                attempts
            )
        }
        PollOutcome::BudgetExhausted { reason, .. } => match reason {
            ExhaustionReason::StillInProgress { last_status } => bail!(
                "Execution {} still {} after {} attempt(s); run `ideaprobe report wait {}` to keep waiting",
                execution_id,
                last_status.map_or("in progress", |s| s.as_str()),
                attempts,
                execution_id
            ),
            ExhaustionReason::NoSuccessfulResponse { last_error } => bail!(
                "No usable response for execution {} in {} attempt(s){}",
                execution_id,
                attempts,
                last_error.map(|e| format!(": {}", e)).unwrap_or_default()
            ),
            ExhaustionReason::Timeout { last_status } => bail!(
                "Timed out waiting for execution {} (last status: {})",
                execution_id,
                last_status.map_or("unknown", |s| s.as_str())
            ),
        },
        PollOutcome::Cancelled { .. } => {
            bail!("Cancelled while waiting for execution {}", execution_id)
        }
    }
}

fn print_attempt(attempt: &PollAttempt) {
    let detail = match (&attempt.error, attempt.observed_status) {
        (Some(error), _) => error.red(),
        (None, status) => colorize_status(status),
    };

    eprintln!(
        "  {} #{} {} {}",
        "▸".cyan(),
        attempt.sequence_number,
        attempt.observed_at.format("%H:%M:%S").to_string().dimmed(),
        detail
    );
}

fn print_report(payload: &serde_json::Value) {
    let report = Report::from_payload(payload);

    if report.is_empty() {
        // Unknown shape, show what the engine sent
        match serde_json::to_string_pretty(payload) {
            Ok(pretty) => println!("{}", pretty),
            Err(_) => println!("{}", payload),
        }
        return;
    }

    if let Some(title) = &report.title {
        println!("{}", title.bold());
    }
    if let Some(description) = &report.description {
        println!("{}", description.dimmed());
    }

    for step in &report.steps {
        println!();
        println!("{} {}", "▸".cyan(), step.name.bold());
        println!("{}", "─".repeat(80).dimmed());
        println!("{}", step.output);
    }
}

fn failure_message(payload: &serde_json::Value) -> Option<&str> {
    ["error", "message", "error_message"]
        .iter()
        .find_map(|key| payload.get(*key).and_then(serde_json::Value::as_str))
}

fn colorize_status(status: Option<ProcessingStatus>) -> ColoredString {
    match status {
        Some(ProcessingStatus::Pending) => "pending".yellow(),
        Some(ProcessingStatus::Running) => "running".blue(),
        Some(ProcessingStatus::Finished) => "finished".green(),
        Some(ProcessingStatus::Failed) => "failed".red(),
        None => "unknown".dimmed(),
    }
}
