//! ProspectIQ LLM
//!
//! Client side of the remotely hosted "assistant" resources that mirror each
//! ICP: a configured model endpoint holding the ICP's instructions.
//!
//! - `provider` - the `AssistantApi` trait and HTTP error mapping
//! - `openai` - OpenAI Assistants (v2) implementation
//! - `http_client` - reqwest client factory with proxy support
//! - `types` - configuration and error types

pub mod http_client;
pub mod openai;
pub mod provider;
pub mod types;

// Re-export main types
pub use http_client::build_http_client;
pub use openai::OpenAIAssistants;
pub use provider::AssistantApi;
pub use types::*;
