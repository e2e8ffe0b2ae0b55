//! OpenAI-compatible chat completion client
//!
//! Produces the validation feedback, synthetic interviews and site-builder
//! prompts shown to visitors.

use ideaprobe_core::prompt::{self, ExtractedPrompt, SYSTEM_PROMPT};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ClientError, Result};

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
/// Default chat model
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Chat completion client
#[derive(Debug, Clone)]
pub struct CompletionClient {
    base_url: String,
    api_key: String,
    model: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// One simulated customer interview
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interview {
    pub persona: String,
    pub transcript: String,
}

impl CompletionClient {
    /// Create a client for the public OpenAI API
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, api_key)
    }

    /// Create a client for any OpenAI-compatible endpoint
    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            client: Client::new(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one system + user exchange and return the reply text
    pub async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: 0.7,
        };

        debug!(model = %self.model, "Requesting chat completion");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ClientError::api_error(status.as_u16(), text));
        }

        let parsed: ChatResponse =
            serde_json::from_str(&text).map_err(|e| ClientError::DecodeFailed {
                message: e.to_string(),
                body: text.clone(),
            })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ClientError::MissingField("choices[0].message.content".to_string()))
    }

    // =============================================================================
    // Funnel Operations
    // =============================================================================

    /// Produce HTML-formatted validation feedback for an idea
    pub async fn validate_idea(&self, idea: &str, target_market: &str) -> Result<String> {
        if idea.trim().is_empty() {
            return Err(ClientError::InvalidRequest("idea cannot be empty".to_string()));
        }

        let reply = self
            .complete(SYSTEM_PROMPT, &prompt::validation_prompt(idea, target_market))
            .await?;
        Ok(prompt::strip_code_fences(&reply).to_string())
    }

    /// Simulate `count` customer interviews, one persona per interview
    ///
    /// Interviews run one after another so a failure stops the batch early.
    pub async fn simulate_interviews(&self, idea: &str, count: usize) -> Result<Vec<Interview>> {
        let mut interviews = Vec::with_capacity(count);
        for index in 0..count {
            let transcript = self
                .complete(SYSTEM_PROMPT, &prompt::interview_prompt(idea, index))
                .await?;
            interviews.push(Interview {
                persona: prompt::persona_name(index).to_string(),
                transcript: transcript.trim().to_string(),
            });
        }
        Ok(interviews)
    }

    /// Ask for a site-builder prompt
    ///
    /// Extraction from the reply is best-effort; an unusable reply yields the
    /// templated fallback rather than an error.
    pub async fn site_builder_prompt(&self, idea: &str) -> Result<ExtractedPrompt> {
        let reply = self
            .complete(SYSTEM_PROMPT, &prompt::site_builder_prompt(idea))
            .await?;
        Ok(prompt::extract_site_prompt(&reply, idea))
    }
}
