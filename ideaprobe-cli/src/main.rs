//! Ideaprobe CLI
//!
//! Command-line interface for the Ideaprobe validation funnel: launches and
//! follows feasibility reports, requests LLM feedback, and browses the backend.

mod api;
mod commands;
mod config;
mod id_resolver;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ideaprobe")]
#[command(about = "Ideaprobe idea validation CLI", long_about = None)]
struct Cli {
    /// Research workflow engine URL
    #[arg(
        long,
        env = "IDEAPROBE_WORKFLOW_URL",
        default_value = "http://localhost:8000"
    )]
    workflow_url: String,

    /// Session cookie for the workflow engine (e.g. "PHPSESSID=...")
    #[arg(long, env = "IDEAPROBE_SESSION_COOKIE", hide_env_values = true)]
    session_cookie: Option<String>,

    /// Backend URL
    #[arg(
        long,
        env = "IDEAPROBE_BACKEND_URL",
        default_value = "http://localhost:8080"
    )]
    backend_url: String,

    /// Admin token for listing and deleting backend records
    #[arg(long, env = "IDEAPROBE_ADMIN_TOKEN", hide_env_values = true)]
    admin_token: Option<String>,

    /// OpenAI-compatible API base URL
    #[arg(
        long,
        env = "IDEAPROBE_OPENAI_BASE_URL",
        default_value = ideaprobe_client::completion::DEFAULT_BASE_URL
    )]
    openai_base_url: String,

    /// API key for the completion endpoint
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    /// Chat model used for feedback and interviews
    #[arg(
        long,
        env = "IDEAPROBE_OPENAI_MODEL",
        default_value = ideaprobe_client::completion::DEFAULT_MODEL
    )]
    openai_model: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging on stderr so command output stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ideaprobe_cli=warn,ideaprobe_client=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config {
        workflow_url: cli.workflow_url,
        session_cookie: cli.session_cookie,
        backend_url: cli.backend_url,
        admin_token: cli.admin_token,
        openai_base_url: cli.openai_base_url,
        openai_api_key: cli.openai_api_key,
        openai_model: cli.openai_model,
    };

    handle_command(cli.command, &config).await
}
