//! Execution-related workflow endpoints

use async_trait::async_trait;
use ideaprobe_core::domain::execution::ExecutionId;
use ideaprobe_core::dto::launch::{LaunchRequest, StatusRequest, extract_execution_id};
use reqwest::Method;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::WorkflowClient;
use crate::error::{ClientError, Result};
use crate::poller::{PollConfig, PollOutcome, PollSession, StatusSource};

impl WorkflowClient {
    // =============================================================================
    // Execution Lifecycle
    // =============================================================================

    /// Launch a new research execution
    ///
    /// Issues exactly one request and never retries; retry policy belongs to
    /// the caller.
    ///
    /// # Arguments
    /// * `req` - The launch request; every variable value must be non-empty
    ///
    /// # Returns
    /// The identifier assigned by the engine
    ///
    /// # Errors
    /// `InvalidRequest` when a variable is empty (nothing is sent). Otherwise any
    /// failure, including a response without an identifier, is `LaunchFailed`.
    ///
    /// # Example
    /// ```no_run
    /// # use ideaprobe_client::WorkflowClient;
    /// # use ideaprobe_core::dto::launch::LaunchRequest;
    /// # async fn example() -> anyhow::Result<()> {
    /// let client = WorkflowClient::new("http://localhost:8000");
    /// let id = client
    ///     .launch(&LaunchRequest::research("Maritime Logistics", "ETA optimizer"))
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn launch(&self, req: &LaunchRequest) -> Result<ExecutionId> {
        req.validate()
            .map_err(|e| ClientError::InvalidRequest(e.to_string()))?;

        let path = self.endpoints().launch_path.clone();
        let response = self
            .request_json(Method::POST, &path, Some(req))
            .await
            .map_err(ClientError::launch_failed)?;

        let execution_id = extract_execution_id(&response).ok_or_else(|| {
            ClientError::launch_failed(ClientError::MissingField("execution_id".to_string()))
        })?;

        info!(execution_id = %execution_id, "Launched research execution");
        Ok(execution_id)
    }

    /// Fetch the current status payload of an execution
    ///
    /// The identifier is sent in the body of a POST to the status endpoint.
    ///
    /// # Returns
    /// The decoded payload, including `processing_status`
    pub async fn fetch_status(&self, execution_id: &ExecutionId) -> Result<Value> {
        let path = self.endpoints().status_path.clone();
        let body = StatusRequest {
            execution_id: execution_id.clone(),
        };

        self.request_json(Method::POST, &path, Some(&body)).await
    }
}

#[async_trait]
impl StatusSource for WorkflowClient {
    async fn fetch_status(&self, execution_id: &ExecutionId) -> Result<Value> {
        WorkflowClient::fetch_status(self, execution_id).await
    }
}

/// Launch an execution and poll it until it is terminal
///
/// A launch failure is returned immediately; everything after launch is
/// reported through the `PollOutcome`.
pub async fn launch_and_poll(
    client: &WorkflowClient,
    req: &LaunchRequest,
    config: PollConfig,
    cancel: &CancellationToken,
) -> Result<(ExecutionId, PollOutcome)> {
    let execution_id = client.launch(req).await.inspect_err(|e| {
        warn!("Failed to launch research execution: {}", e);
    })?;

    let outcome = PollSession::new(execution_id.clone(), config)
        .run(client, cancel)
        .await;

    Ok((execution_id, outcome))
}
