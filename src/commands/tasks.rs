//! Task Commands
//!
//! Submitting analysis runs and reading the task dashboard.

use serde::{Deserialize, Serialize};

use prospectiq_core::Notification;

use crate::models::response::CommandResponse;
use crate::models::task::{NewTask, Task};
use crate::services::upload::validate_upload;
use crate::state::AppState;

/// Placeholder shown until the simulator produces the first estimate
const INITIAL_ESTIMATE: &str = "Calculating...";

/// Request to analyze an uploaded company list against an ICP
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartAnalysisRequest {
    pub name: String,
    pub icp_id: String,
    pub file_name: String,
    pub size_bytes: u64,
}

/// Validate the upload and ICP, record a running task and start its simulation
pub async fn start_analysis(state: &AppState, request: StartAnalysisRequest) -> CommandResponse<Task> {
    let name = request.name.trim();
    if name.is_empty() {
        return CommandResponse::err("Task name must not be empty");
    }
    if let Err(e) = validate_upload(&request.file_name, request.size_bytes) {
        return CommandResponse::err(e.to_string());
    }

    let (icps, tasks, simulator) = match (
        state.icps().await,
        state.tasks().await,
        state.simulator().await,
    ) {
        (Ok(icps), Ok(tasks), Ok(simulator)) => (icps, tasks, simulator),
        (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => {
            return CommandResponse::err(e.to_string())
        }
    };

    let Some(icp) = icps.get_by_id(&request.icp_id).await else {
        return CommandResponse::err(format!("ICP with ID {} not found", request.icp_id));
    };

    let mut new_task = NewTask::new(name, icp.name, request.file_name);
    new_task.estimated_completion = Some(INITIAL_ESTIMATE.to_string());
    let store = tasks.clone();
    let task_id = match tokio::task::spawn_blocking(move || store.add_task(new_task)).await {
        Ok(id) => id,
        Err(e) => return CommandResponse::err(format!("Failed to store task: {}", e)),
    };
    simulator.start(&task_id);

    state.notifier().notify(Notification::success(
        "Analysis started",
        format!(
            "Task \"{}\" has been queued and will appear in the dashboard",
            name
        ),
    ));

    match tasks.get_task(&task_id) {
        Some(task) => CommandResponse::ok(task),
        None => CommandResponse::err(format!("Task {} vanished after creation", task_id)),
    }
}

/// Tasks still running, in insertion order
pub async fn list_running_tasks(state: &AppState) -> CommandResponse<Vec<Task>> {
    state.tasks().await.map(|tasks| tasks.get_running_tasks()).into()
}

/// Completed tasks, most recently completed first
pub async fn list_completed_tasks(state: &AppState) -> CommandResponse<Vec<Task>> {
    state.tasks().await.map(|tasks| tasks.get_completed_tasks()).into()
}

pub async fn get_task(state: &AppState, id: &str) -> CommandResponse<Task> {
    match state.tasks().await {
        Ok(tasks) => match tasks.get_task(id) {
            Some(task) => CommandResponse::ok(task),
            None => CommandResponse::err(format!("Task with ID {} not found", id)),
        },
        Err(e) => CommandResponse::err(e.to_string()),
    }
}

/// Stop the task's simulation and remove it; `data` is whether it existed
pub async fn delete_task(state: &AppState, id: &str) -> CommandResponse<bool> {
    let (tasks, simulator) = match (state.tasks().await, state.simulator().await) {
        (Ok(tasks), Ok(simulator)) => (tasks, simulator),
        (Err(e), _) | (_, Err(e)) => return CommandResponse::err(e.to_string()),
    };
    simulator.cancel(id);
    let id = id.to_string();
    match tokio::task::spawn_blocking(move || tasks.delete_task(&id)).await {
        Ok(removed) => CommandResponse::ok(removed),
        Err(e) => CommandResponse::err(format!("Failed to delete task: {}", e)),
    }
}
