//! API client module
//!
//! HTTP client for communicating with the Ideaprobe backend.

use anyhow::{Context, Result};
use ideaprobe_core::domain::submission::Submission;
use ideaprobe_core::domain::validation::Validation;
use ideaprobe_core::dto::submission::{CreateSubmission, CreateValidation, UpdateValidation};
use reqwest::{Client, RequestBuilder};
use uuid::Uuid;

/// HTTP client for the Ideaprobe backend API
pub struct ApiClient {
    base_url: String,
    client: Client,
    admin_token: Option<String>,
}

impl ApiClient {
    /// Create a new API client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the backend
    /// * `admin_token` - Bearer token sent to admin endpoints
    pub fn new(base_url: &str, admin_token: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
            admin_token,
        }
    }

    /// Store a new submission
    pub async fn create_submission(&self, req: &CreateSubmission) -> Result<Submission> {
        let url = format!("{}/api/submissions", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(req)
            .send()
            .await
            .context("Failed to send create submission request")?;

        self.handle_response(response).await
    }

    /// List all submissions (admin)
    pub async fn list_submissions(&self) -> Result<Vec<Submission>> {
        let url = format!("{}/api/submissions", self.base_url);
        let response = self
            .admin(self.client.get(&url))
            .send()
            .await
            .context("Failed to send list submissions request")?;

        self.handle_response(response).await
    }

    /// Get a submission by ID
    pub async fn get_submission(&self, id: Uuid) -> Result<Submission> {
        let url = format!("{}/api/submissions/{}", self.base_url, id);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send get submission request")?;

        self.handle_response(response).await
    }

    /// Delete a submission (admin)
    pub async fn delete_submission(&self, id: Uuid) -> Result<()> {
        let url = format!("{}/api/submissions/{}", self.base_url, id);
        let response = self
            .admin(self.client.delete(&url))
            .send()
            .await
            .context("Failed to send delete submission request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Request failed with status {}: {}", status, error_text);
        }

        Ok(())
    }

    /// Store validation feedback for a submission
    pub async fn create_validation(&self, req: &CreateValidation) -> Result<Validation> {
        let url = format!("{}/api/validations", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(req)
            .send()
            .await
            .context("Failed to send create validation request")?;

        self.handle_response(response).await
    }

    /// List all validations (admin)
    pub async fn list_validations(&self) -> Result<Vec<Validation>> {
        let url = format!("{}/api/validations", self.base_url);
        let response = self
            .admin(self.client.get(&url))
            .send()
            .await
            .context("Failed to send list validations request")?;

        self.handle_response(response).await
    }

    /// Get a validation by ID
    pub async fn get_validation(&self, id: Uuid) -> Result<Validation> {
        let url = format!("{}/api/validations/{}", self.base_url, id);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send get validation request")?;

        self.handle_response(response).await
    }

    /// List validations for a submission
    pub async fn list_submission_validations(&self, submission_id: Uuid) -> Result<Vec<Validation>> {
        let url = format!(
            "{}/api/submissions/{}/validations",
            self.base_url, submission_id
        );
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send list submission validations request")?;

        self.handle_response(response).await
    }

    /// Update a validation
    pub async fn update_validation(&self, id: Uuid, req: &UpdateValidation) -> Result<Validation> {
        let url = format!("{}/api/validations/{}", self.base_url, id);
        let response = self
            .client
            .put(&url)
            .json(req)
            .send()
            .await
            .context("Failed to send update validation request")?;

        self.handle_response(response).await
    }

    fn admin(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.admin_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Handle API response and deserialize JSON
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Request failed with status {}: {}", status, error_text);
        }

        response
            .json()
            .await
            .context("Failed to parse response JSON")
    }
}
