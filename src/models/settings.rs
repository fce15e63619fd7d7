//! Settings Models
//!
//! Application configuration and settings data structures.

use prospectiq_core::ProxyConfig;
use prospectiq_llm::DEFAULT_ASSISTANT_MODEL;
use serde::{Deserialize, Serialize};

/// Owner id used while authentication is stubbed out
pub const DEMO_USER_ID: &str = "demo-user-123";

/// Where ICP rows are persisted
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// `icps` table in the local SQLite database
    #[default]
    Sqlite,
    /// `icps` table behind a Supabase (PostgREST) endpoint
    Supabase,
}

/// Tuning of the task progress simulator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationConfig {
    /// Shortest pause between progress ticks
    pub min_interval_ms: u64,
    /// Longest pause between progress ticks
    pub max_interval_ms: u64,
    /// Smallest progress increment per tick (inclusive)
    pub min_increment: f64,
    /// Largest progress increment per tick (exclusive)
    pub max_increment: f64,
    /// Fixed RNG seed for reproducible runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: 2000,
            max_interval_ms: 5000,
            min_increment: 0.0,
            max_increment: 15.0,
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.min_interval_ms == 0 || self.min_interval_ms > self.max_interval_ms {
            return Err(format!(
                "Invalid simulation interval: {}..{} ms",
                self.min_interval_ms, self.max_interval_ms
            ));
        }
        if self.min_increment < 0.0
            || self.max_increment > 100.0
            || self.min_increment >= self.max_increment
        {
            return Err(format!(
                "Invalid simulation increment: {}..{}",
                self.min_increment, self.max_increment
            ));
        }
        Ok(())
    }
}

/// Application configuration stored in config.json
///
/// API keys are deliberately absent: they come from `OPENAI_API_KEY` and
/// `SUPABASE_ANON_KEY` at startup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// ICP row storage backend
    #[serde(default)]
    pub store_backend: StoreBackend,
    /// Supabase project URL, required for the supabase backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supabase_url: Option<String>,
    /// Owner reference stamped on new ICPs
    #[serde(default = "default_owner_id")]
    pub owner_id: String,
    /// Model backing ICP assistants
    #[serde(default = "default_assistant_model")]
    pub assistant_model: String,
    /// Override of the OpenAI API root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai_base_url: Option<String>,
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// How often `task start --wait` polls the task store
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Proxy for all outbound HTTP
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<ProxyConfig>,
}

fn default_owner_id() -> String {
    DEMO_USER_ID.to_string()
}

fn default_assistant_model() -> String {
    DEFAULT_ASSISTANT_MODEL.to_string()
}

fn default_poll_interval_ms() -> u64 {
    1000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_backend: StoreBackend::Sqlite,
            supabase_url: None,
            owner_id: default_owner_id(),
            assistant_model: default_assistant_model(),
            openai_base_url: None,
            simulation: SimulationConfig::default(),
            poll_interval_ms: default_poll_interval_ms(),
            proxy: None,
        }
    }
}

/// Settings update request (partial update)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SettingsUpdate {
    pub store_backend: Option<StoreBackend>,
    pub supabase_url: Option<String>,
    pub owner_id: Option<String>,
    pub assistant_model: Option<String>,
    pub openai_base_url: Option<String>,
    pub simulation: Option<SimulationConfig>,
    pub poll_interval_ms: Option<u64>,
    pub proxy: Option<ProxyConfig>,
}

impl AppConfig {
    /// Apply a partial update to the configuration
    pub fn apply_update(&mut self, update: SettingsUpdate) {
        if let Some(backend) = update.store_backend {
            self.store_backend = backend;
        }
        if let Some(url) = update.supabase_url {
            self.supabase_url = Some(url);
        }
        if let Some(owner_id) = update.owner_id {
            self.owner_id = owner_id;
        }
        if let Some(model) = update.assistant_model {
            self.assistant_model = model;
        }
        if let Some(url) = update.openai_base_url {
            self.openai_base_url = Some(url);
        }
        if let Some(simulation) = update.simulation {
            self.simulation = simulation;
        }
        if let Some(interval) = update.poll_interval_ms {
            self.poll_interval_ms = interval;
        }
        if let Some(proxy) = update.proxy {
            self.proxy = Some(proxy);
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.owner_id.trim().is_empty() {
            return Err("owner_id cannot be empty".to_string());
        }

        if self.assistant_model.trim().is_empty() {
            return Err("assistant_model cannot be empty".to_string());
        }

        if self.store_backend == StoreBackend::Supabase {
            match &self.supabase_url {
                Some(url) => validate_url("supabase_url", url)?,
                None => return Err("supabase_url is required for the supabase backend".to_string()),
            }
        }

        if let Some(url) = &self.openai_base_url {
            validate_url("openai_base_url", url)?;
        }

        self.simulation.validate()?;

        if self.poll_interval_ms < 100 {
            return Err("poll_interval_ms must be at least 100".to_string());
        }

        if let Some(proxy) = &self.proxy {
            proxy.validate().map_err(|e| e.to_string())?;
        }

        Ok(())
    }
}

fn validate_url(field: &str, value: &str) -> Result<(), String> {
    let parsed = url::Url::parse(value).map_err(|e| format!("Invalid {}: {}", field, e))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(format!("Invalid {}: scheme must be http or https", field));
    }
    Ok(())
}
