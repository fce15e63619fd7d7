//! Assistant Synchronizer
//!
//! Best-effort mirroring of each ICP onto a remote assistant. Every call
//! degrades to a sentinel (`None` / `false`) and a log line; callers decide
//! how to report it. The ICP row, not the assistant, is the system of record.

use std::sync::Arc;

use prospectiq_llm::{AssistantApi, AssistantConfig, OpenAIAssistants};

use crate::models::icp::assistant_display_name;
use crate::models::settings::AppConfig;
use crate::utils::error::AppResult;

pub struct AssistantSynchronizer {
    api: Option<Arc<dyn AssistantApi>>,
}

impl AssistantSynchronizer {
    pub fn new(api: Option<Arc<dyn AssistantApi>>) -> Self {
        Self { api }
    }

    /// A synchronizer that reports failure for every call
    pub fn disabled() -> Self {
        Self { api: None }
    }

    /// Build the OpenAI-backed synchronizer; disabled when no key is configured
    pub fn from_config(api_key: Option<String>, config: &AppConfig) -> AppResult<Self> {
        let Some(api_key) = api_key else {
            tracing::warn!("[AssistantSync] no OpenAI API key configured, assistant sync disabled");
            return Ok(Self::disabled());
        };

        let assistant_config = AssistantConfig {
            api_key: Some(api_key),
            base_url: config.openai_base_url.clone(),
            model: config.assistant_model.clone(),
            proxy: config.proxy.clone().map(|p| p.with_env_password()),
        };
        let api = OpenAIAssistants::new(assistant_config)?;
        Ok(Self::new(Some(Arc::new(api))))
    }

    pub fn is_enabled(&self) -> bool {
        self.api.is_some()
    }

    fn api(&self, operation: &str) -> Option<&Arc<dyn AssistantApi>> {
        if self.api.is_none() {
            tracing::warn!(
                "[AssistantSync] cannot {} assistant: assistant sync is disabled",
                operation
            );
        }
        self.api.as_ref()
    }

    /// Create the assistant for an ICP; returns its resource id
    pub async fn create(&self, icp_name: &str, instructions: &str) -> Option<String> {
        let api = self.api("create")?;
        let name = assistant_display_name(icp_name);
        tracing::info!("[AssistantSync] creating assistant '{}'", name);

        match api.create_assistant(&name, instructions).await {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::error!("[AssistantSync] failed to create assistant '{}': {}", name, e);
                None
            }
        }
    }

    /// Replace an assistant's name and instructions; returns the id to adopt
    pub async fn update(
        &self,
        assistant_id: &str,
        icp_name: &str,
        instructions: &str,
    ) -> Option<String> {
        let api = self.api("update")?;
        let name = assistant_display_name(icp_name);
        tracing::info!("[AssistantSync] updating assistant {}", assistant_id);

        match api.update_assistant(assistant_id, &name, instructions).await {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::error!(
                    "[AssistantSync] failed to update assistant {}: {}",
                    assistant_id,
                    e
                );
                None
            }
        }
    }

    /// Delete an assistant. An assistant that is already gone counts as deleted.
    pub async fn delete(&self, assistant_id: &str) -> bool {
        let Some(api) = self.api("delete") else {
            return false;
        };
        tracing::info!("[AssistantSync] deleting assistant {}", assistant_id);

        match api.delete_assistant(assistant_id).await {
            Ok(()) => true,
            Err(e) if e.is_not_found() => {
                tracing::info!("[AssistantSync] assistant {} already gone", assistant_id);
                true
            }
            Err(e) => {
                tracing::error!(
                    "[AssistantSync] failed to delete assistant {}: {}",
                    assistant_id,
                    e
                );
                false
            }
        }
    }
}
