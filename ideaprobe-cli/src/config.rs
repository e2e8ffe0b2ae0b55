//! Configuration module
//!
//! Handles CLI configuration: service URLs and credentials.

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the research workflow engine
    pub workflow_url: String,
    /// Session cookie sent to the workflow engine
    pub session_cookie: Option<String>,
    /// URL of the Ideaprobe backend
    pub backend_url: String,
    /// Bearer token for admin backend endpoints
    pub admin_token: Option<String>,
    /// OpenAI-compatible API base URL
    pub openai_base_url: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
}
