//! Initialization Commands
//!
//! Commands for application initialization and setup.
//! On startup, initializes all backend services and resumes the progress
//! simulation of tasks that were still running when the process exited.

use serde::{Deserialize, Serialize};

use crate::models::response::CommandResponse;
use crate::state::AppState;

/// Result of application initialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitResult {
    /// Success message
    pub message: String,
    /// Tasks whose simulation was resumed
    pub running_tasks: usize,
}

/// Initialize the application on startup
pub async fn init_app(state: &AppState) -> CommandResponse<InitResult> {
    if let Err(e) = state.initialize().await {
        return CommandResponse::err(e.to_string());
    }

    let running_tasks = match state.tasks().await {
        Ok(tasks) => tasks.get_running_tasks().len(),
        Err(e) => return CommandResponse::err(e.to_string()),
    };
    let message = if running_tasks > 0 {
        format!(
            "Application initialized successfully. Resumed {} running task(s).",
            running_tasks
        )
    } else {
        "Application initialized successfully".to_string()
    };

    CommandResponse::ok(InitResult {
        message,
        running_tasks,
    })
}

/// Get the application version
pub fn get_version() -> CommandResponse<String> {
    CommandResponse::ok(env!("CARGO_PKG_VERSION").to_string())
}
