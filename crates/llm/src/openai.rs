//! OpenAI Assistants
//!
//! Implementation of `AssistantApi` for the OpenAI Assistants API (v2).

use async_trait::async_trait;
use serde::Deserialize;

use super::provider::{missing_api_key_error, parse_http_error, AssistantApi};
use super::types::{AssistantConfig, AssistantObject, LlmError, LlmResult};
use crate::http_client::build_http_client;

/// Default OpenAI API root
const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Beta header required by the assistants endpoints
const ASSISTANTS_BETA_HEADER: (&str, &str) = ("OpenAI-Beta", "assistants=v2");

/// OpenAI assistants client
pub struct OpenAIAssistants {
    config: AssistantConfig,
    client: reqwest::Client,
}

/// Body returned by `DELETE /assistants/{id}`
#[derive(Debug, Deserialize)]
struct DeletionStatus {
    #[serde(default)]
    deleted: bool,
}

impl OpenAIAssistants {
    /// Create a new client with the given configuration
    pub fn new(config: AssistantConfig) -> LlmResult<Self> {
        let client = build_http_client(config.proxy.as_ref())?;
        Ok(Self { config, client })
    }

    /// Get the API root, without a trailing slash
    fn base_url(&self) -> &str {
        self.config
            .base_url
            .as_deref()
            .unwrap_or(OPENAI_API_BASE)
            .trim_end_matches('/')
    }

    fn api_key(&self) -> LlmResult<&str> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| missing_api_key_error("openai"))
    }

    fn request_body(&self, name: &str, instructions: &str) -> serde_json::Value {
        serde_json::json!({
            "name": name,
            "instructions": instructions,
            "model": self.config.model,
        })
    }

    /// Send a request and return `(status, body)`
    async fn send(&self, request: reqwest::RequestBuilder) -> LlmResult<(u16, String)> {
        let api_key = self.api_key()?;
        let response = request
            .header("Authorization", format!("Bearer {}", api_key))
            .header(ASSISTANTS_BETA_HEADER.0, ASSISTANTS_BETA_HEADER.1)
            .send()
            .await
            .map_err(|e| LlmError::NetworkError {
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| LlmError::NetworkError {
            message: e.to_string(),
        })?;
        Ok((status, body))
    }

    fn parse_assistant(body: &str) -> LlmResult<AssistantObject> {
        serde_json::from_str(body).map_err(|e| LlmError::ParseError {
            message: format!("Failed to parse assistant: {}", e),
        })
    }
}

#[async_trait]
impl AssistantApi for OpenAIAssistants {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn create_assistant(&self, name: &str, instructions: &str) -> LlmResult<String> {
        let url = format!("{}/assistants", self.base_url());
        let request = self
            .client
            .post(&url)
            .json(&self.request_body(name, instructions));

        let (status, body) = self.send(request).await?;
        if !(200..300).contains(&status) {
            return Err(parse_http_error(status, &body, "openai"));
        }

        let assistant = Self::parse_assistant(&body)?;
        tracing::info!("[OpenAIAssistants] created assistant {}", assistant.id);
        Ok(assistant.id)
    }

    async fn update_assistant(
        &self,
        assistant_id: &str,
        name: &str,
        instructions: &str,
    ) -> LlmResult<String> {
        let url = format!("{}/assistants/{}", self.base_url(), assistant_id);
        let request = self
            .client
            .post(&url)
            .json(&self.request_body(name, instructions));

        let (status, body) = self.send(request).await?;
        if !(200..300).contains(&status) {
            return Err(parse_http_error(status, &body, "openai"));
        }

        let assistant = Self::parse_assistant(&body)?;
        tracing::info!("[OpenAIAssistants] updated assistant {}", assistant.id);
        Ok(assistant.id)
    }

    async fn delete_assistant(&self, assistant_id: &str) -> LlmResult<()> {
        let url = format!("{}/assistants/{}", self.base_url(), assistant_id);
        let (status, body) = self.send(self.client.delete(&url)).await?;

        if status == 404 {
            tracing::info!(
                "[OpenAIAssistants] assistant {} already gone, treating as deleted",
                assistant_id
            );
            return Ok(());
        }
        if !(200..300).contains(&status) {
            return Err(parse_http_error(status, &body, "openai"));
        }

        let deletion: DeletionStatus =
            serde_json::from_str(&body).map_err(|e| LlmError::ParseError {
                message: format!("Failed to parse deletion status: {}", e),
            })?;
        if !deletion.deleted {
            return Err(LlmError::Other {
                message: format!("OpenAI did not delete assistant {}", assistant_id),
            });
        }

        tracing::info!("[OpenAIAssistants] deleted assistant {}", assistant_id);
        Ok(())
    }
}
