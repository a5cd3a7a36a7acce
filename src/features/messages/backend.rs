//! # Generation Backends
//!
//! Text generation providers behind a single async trait. Every provider is
//! treated as slow and unreliable: calls run under a timeout and blank output
//! counts as a failure.
//!
//! - **Version**: 1.2.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.2.0: Reachability checks for the health endpoints
//! - 1.1.0: Ollama provider over its HTTP API
//! - 1.0.0: OpenAI chat completions provider

use crate::core::error::GenerationError;
use async_trait::async_trait;
use log::{debug, info};
use openai::chat::{ChatCompletion, ChatCompletionMessage, ChatCompletionMessageRole};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::timeout;

/// Sampling parameters passed to the provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 200,
        }
    }
}

#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Provider label for logs and `/info`
    fn provider_name(&self) -> &'static str;

    async fn generate(&self, prompt: &str, params: GenerationParams)
        -> Result<String, GenerationError>;

    /// Reachability check. Providers without a cheap check report ready.
    async fn check(&self) -> Result<(), GenerationError> {
        Ok(())
    }
}

/// Trim provider output and reject blank text
fn non_empty(text: &str) -> Result<String, GenerationError> {
    let text = text.trim();
    if text.is_empty() {
        Err(GenerationError::Empty)
    } else {
        Ok(text.to_string())
    }
}

/// OpenAI chat completions. The API key is read from the environment by the
/// `openai` crate.
pub struct OpenAiBackend {
    model: String,
    timeout: Duration,
}

impl OpenAiBackend {
    pub fn new(model: String, timeout: Duration) -> Self {
        Self { model, timeout }
    }
}

#[async_trait]
impl GenerationBackend for OpenAiBackend {
    fn provider_name(&self) -> &'static str {
        "OpenAI"
    }

    async fn generate(
        &self,
        prompt: &str,
        params: GenerationParams,
    ) -> Result<String, GenerationError> {
        let messages = vec![
            ChatCompletionMessage {
                role: ChatCompletionMessageRole::System,
                content: Some(
                    "You write short chat messages for a sports group. \
                     Follow the requested format exactly."
                        .to_string(),
                ),
                name: None,
                function_call: None,
                tool_call_id: None,
                tool_calls: None,
            },
            ChatCompletionMessage {
                role: ChatCompletionMessageRole::User,
                content: Some(prompt.to_string()),
                name: None,
                function_call: None,
                tool_call_id: None,
                tool_calls: None,
            },
        ];

        debug!("Sending generation request to OpenAI model {}", self.model);

        let completion = timeout(
            self.timeout,
            ChatCompletion::builder(&self.model, messages)
                .temperature(params.temperature)
                .max_tokens(u64::from(params.max_tokens))
                .create(),
        )
        .await
        .map_err(|_| GenerationError::Timeout {
            timeout_secs: self.timeout.as_secs(),
        })?
        .map_err(|e| GenerationError::Backend(e.to_string()))?;

        let text = completion
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        info!("OpenAI generated {} chars", text.len());
        non_empty(&text)
    }
}

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct OllamaResponse {
    #[serde(default)]
    response: String,
}

/// Local Ollama server via `POST /api/generate`
pub struct OllamaBackend {
    client: reqwest::Client,
    host: String,
    model: String,
    timeout: Duration,
}

impl OllamaBackend {
    pub fn new(host: String, model: String, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            host: host.trim_end_matches('/').to_string(),
            model,
            timeout,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.host)
    }

    fn tags_endpoint(&self) -> String {
        format!("{}/api/tags", self.host)
    }
}

#[async_trait]
impl GenerationBackend for OllamaBackend {
    fn provider_name(&self) -> &'static str {
        "Ollama"
    }

    async fn generate(
        &self,
        prompt: &str,
        params: GenerationParams,
    ) -> Result<String, GenerationError> {
        let request = OllamaRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: OllamaOptions {
                temperature: params.temperature,
                num_predict: params.max_tokens,
            },
        };

        debug!("Sending generation request to Ollama at {}", self.endpoint());

        let call = async {
            let response = self
                .client
                .post(self.endpoint())
                .json(&request)
                .send()
                .await?
                .error_for_status()?;
            response.json::<OllamaResponse>().await
        };

        let body = timeout(self.timeout, call)
            .await
            .map_err(|_| GenerationError::Timeout {
                timeout_secs: self.timeout.as_secs(),
            })?
            .map_err(|e| GenerationError::Backend(e.to_string()))?;

        info!("Ollama generated {} chars", body.response.len());
        non_empty(&body.response)
    }

    async fn check(&self) -> Result<(), GenerationError> {
        let call = async {
            self.client
                .get(self.tags_endpoint())
                .send()
                .await?
                .error_for_status()
        };

        timeout(self.timeout, call)
            .await
            .map_err(|_| GenerationError::Timeout {
                timeout_secs: self.timeout.as_secs(),
            })?
            .map_err(|e| GenerationError::Backend(e.to_string()))?;
        Ok(())
    }
}
