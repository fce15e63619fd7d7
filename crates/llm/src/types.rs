//! Assistant API Types
//!
//! Configuration and error types shared by assistant providers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use prospectiq_core::ProxyConfig;

/// Default model backing ICP assistants
pub const DEFAULT_ASSISTANT_MODEL: &str = "gpt-4o";

/// Errors returned by remote assistant calls
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Assistant not found: {resource}")]
    NotFound { resource: String },

    #[error("Rate limited: {message}")]
    RateLimited {
        message: String,
        retry_after: Option<u64>,
    },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Server error ({status:?}): {message}")]
    ServerError { message: String, status: Option<u16> },

    #[error("Network error: {message}")]
    NetworkError { message: String },

    #[error("Parse error: {message}")]
    ParseError { message: String },

    #[error("{message}")]
    Other { message: String },
}

impl LlmError {
    /// The remote side reports that the resource does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type alias for assistant calls
pub type LlmResult<T> = Result<T, LlmError>;

/// Connection settings for an assistant provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Secret key; never serialized
    #[serde(skip_serializing, default)]
    pub api_key: Option<String>,
    /// Override of the API root (e.g. `https://api.openai.com/v1`)
    #[serde(default)]
    pub base_url: Option<String>,
    /// Model the assistants run on
    pub model: String,
    #[serde(default)]
    pub proxy: Option<ProxyConfig>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: DEFAULT_ASSISTANT_MODEL.to_string(),
            proxy: None,
        }
    }
}

impl AssistantConfig {
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }
}

/// The subset of an assistant object the application reads back
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssistantObject {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}
