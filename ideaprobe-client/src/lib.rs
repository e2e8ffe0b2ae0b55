//! Ideaprobe HTTP Client
//!
//! Type-safe access to the research workflow engine that produces feasibility
//! reports, plus an OpenAI-compatible completion client for idea feedback.
//!
//! The workflow side is split into three layers:
//! - `WorkflowClient::request_json`: one request/response cycle with noise-stripping
//! - `WorkflowClient::launch`: creates a remote execution and yields its id
//! - `poller::PollSession`: polls an execution until it is terminal or the budget runs out
//!
//! # Example
//!
//! ```no_run
//! use ideaprobe_client::{WorkflowClient, poller::{PollConfig, PollSession}};
//! use ideaprobe_core::dto::launch::LaunchRequest;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = WorkflowClient::new("https://workflows.example.com");
//!
//!     let id = client
//!         .launch(&LaunchRequest::research("Maritime Logistics", "ETA optimizer"))
//!         .await?;
//!
//!     let outcome = PollSession::new(id, PollConfig::default())
//!         .run(&client, &CancellationToken::new())
//!         .await;
//!
//!     println!("{:?}", outcome.state());
//!     Ok(())
//! }
//! ```

pub mod completion;
pub mod error;
mod executions;
pub mod noise;
pub mod poller;

// Re-export commonly used types
pub use completion::CompletionClient;
pub use error::{ClientError, Result};
pub use executions::launch_and_poll;
pub use noise::NoiseFilter;

use reqwest::{Client, Method, header};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Per-request timeout of the default HTTP client
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Paths of the workflow engine endpoints, relative to the base URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowEndpoints {
    /// Creates an execution
    pub launch_path: String,
    /// Returns the status of an execution given `{"execution_id": ...}`
    pub status_path: String,
}

impl Default for WorkflowEndpoints {
    fn default() -> Self {
        Self {
            launch_path: "/api/research/launch".to_string(),
            status_path: "/api/research/status".to_string(),
        }
    }
}

/// HTTP client for the research workflow engine
///
/// Requests carry credentials through cookies rather than a bearer token: the
/// default HTTP client keeps a cookie store, and an explicit session cookie can
/// be attached with `with_session_cookie`.
#[derive(Debug, Clone)]
pub struct WorkflowClient {
    /// Base URL of the engine (e.g., "https://workflows.example.com")
    base_url: String,
    /// HTTP client instance
    client: Client,
    endpoints: WorkflowEndpoints,
    session_cookie: Option<String>,
    noise: NoiseFilter,
}

impl WorkflowClient {
    /// Create a new workflow client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the workflow engine
    ///
    /// # Example
    /// ```
    /// use ideaprobe_client::WorkflowClient;
    ///
    /// let client = WorkflowClient::new("http://localhost:8000");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        match Self::try_new(base_url.clone()) {
            Ok(client) => client,
            Err(e) => {
                warn!(
                    "Failed to build HTTP client ({}), falling back to one without cookie store or timeout",
                    e
                );
                Self::with_client(base_url, Client::new())
            }
        }
    }

    /// Create a new workflow client, reporting HTTP client construction errors
    ///
    /// The client keeps a cookie store and gives up on any single request
    /// after `DEFAULT_REQUEST_TIMEOUT`.
    pub fn try_new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()?;
        Ok(Self::with_client(base_url, client))
    }

    /// Create a new workflow client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            endpoints: WorkflowEndpoints::default(),
            session_cookie: None,
            noise: NoiseFilter::default(),
        }
    }

    /// Override the endpoint paths
    pub fn with_endpoints(mut self, endpoints: WorkflowEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Send this cookie header value with every request
    pub fn with_session_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.session_cookie = Some(cookie.into());
        self
    }

    /// Replace the noise filter applied before JSON parsing
    pub fn with_noise_filter(mut self, noise: NoiseFilter) -> Self {
        self.noise = noise;
        self
    }

    /// Get the base URL of the workflow engine
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoints(&self) -> &WorkflowEndpoints {
        &self.endpoints
    }

    // =============================================================================
    // Request/Response Cycle
    // =============================================================================

    /// Perform one request against the engine and decode the JSON body
    ///
    /// The body is read as text, stripped of known noise markers and then
    /// parsed. Domain fields such as `processing_status` are not interpreted.
    ///
    /// # Errors
    /// * `TransportFailed` - the engine could not be reached
    /// * `ApiError` - the engine answered with a non-success status
    /// * `DecodeFailed` - the cleaned body is not JSON
    pub async fn request_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Value> {
        let url = self.url(path);
        debug!(%method, %url, "Sending workflow request");

        let mut request = self.client.request(method, &url);
        if let Some(cookie) = &self.session_cookie {
            request = request.header(header::COOKIE, cookie);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ClientError::api_error(status.as_u16(), text));
        }

        self.decode(&text)
    }

    /// Strip noise from a response body and parse it as JSON
    pub fn decode(&self, text: &str) -> Result<Value> {
        let cleaned = self.noise.strip(text);
        serde_json::from_str(&cleaned).map_err(|e| ClientError::DecodeFailed {
            message: e.to_string(),
            body: cleaned.into_owned(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}
