//! Assistant API Trait
//!
//! The three operations the application needs from a remote assistant
//! host, plus the shared HTTP status mapping.

use async_trait::async_trait;

use super::types::{LlmError, LlmResult};

/// A remote service that hosts configurable assistants.
///
/// Implementations perform exactly one attempt per call; retry policy is the
/// caller's concern.
#[async_trait]
pub trait AssistantApi: Send + Sync {
    /// Returns the provider name for identification.
    fn name(&self) -> &'static str;

    /// Returns the model new assistants are created with.
    fn model(&self) -> &str;

    /// Create an assistant and return its resource id.
    async fn create_assistant(&self, name: &str, instructions: &str) -> LlmResult<String>;

    /// Replace the name and instructions of an existing assistant.
    ///
    /// Returns the id reported by the remote side, which callers adopt.
    async fn update_assistant(
        &self,
        assistant_id: &str,
        name: &str,
        instructions: &str,
    ) -> LlmResult<String>;

    /// Delete an assistant.
    ///
    /// An assistant that is already gone counts as deleted: implementations
    /// return `Ok(())` for a remote "not found".
    async fn delete_assistant(&self, assistant_id: &str) -> LlmResult<()>;
}

/// Helper function to create an error for missing API key
pub fn missing_api_key_error(provider: &str) -> LlmError {
    LlmError::AuthenticationFailed {
        message: format!("API key not configured for {}", provider),
    }
}

/// Helper function to parse HTTP error status codes
pub fn parse_http_error(status: u16, body: &str, provider: &str) -> LlmError {
    match status {
        401 => LlmError::AuthenticationFailed {
            message: format!("{}: Invalid API key", provider),
        },
        403 => LlmError::AuthenticationFailed {
            message: format!("{}: Access denied", provider),
        },
        404 => LlmError::NotFound {
            resource: extract_error_message(body),
        },
        429 => LlmError::RateLimited {
            message: extract_error_message(body),
            retry_after: None,
        },
        400 | 422 => LlmError::InvalidRequest {
            message: extract_error_message(body),
        },
        500..=599 => LlmError::ServerError {
            message: extract_error_message(body),
            status: Some(status),
        },
        _ => LlmError::Other {
            message: format!("HTTP {}: {}", status, body),
        },
    }
}

/// Pull `error.message` out of an OpenAI-style error body, falling back to the raw text
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}
