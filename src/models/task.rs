//! Analysis Task Models
//!
//! One run of the analysis workflow against an uploaded file and a chosen ICP.

use serde::{Deserialize, Serialize};

/// Lifecycle state of an analysis task
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Running,
    Completed,
    Failed,
}

impl TaskStatus {
    /// Completed and failed tasks never change status again
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Running => "running",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        }
    }
}

/// A running or finished analysis task
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    /// ICP name captured at creation
    pub icp: String,
    pub file_name: String,
    pub status: TaskStatus,
    /// 0..=100
    pub progress: f64,
    pub start_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_completion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub companies: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_score: Option<u32>,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
}

impl Task {
    /// Timestamp used to order completed tasks, newest first
    pub fn completion_key(&self) -> &str {
        self.completed_at.as_deref().unwrap_or(&self.created_at)
    }

    /// Merge a partial update.
    ///
    /// A completed or failed task is frozen: the whole update is dropped,
    /// unless it carries nothing but a repeat of the current status. Returns
    /// whether the update was refused.
    pub fn apply(&mut self, update: TaskUpdate) -> bool {
        if self.status.is_terminal() {
            let repeat = TaskUpdate {
                status: Some(self.status),
                ..Default::default()
            };
            return update != repeat && update != TaskUpdate::default();
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(progress) = update.progress {
            self.progress = progress.clamp(0.0, 100.0);
        }
        if let Some(estimated) = update.estimated_completion {
            self.estimated_completion = estimated;
        }
        if let Some(runtime) = update.runtime {
            self.runtime = Some(runtime);
        }
        if let Some(companies) = update.companies {
            self.companies = Some(companies);
        }
        if let Some(avg_score) = update.avg_score {
            self.avg_score = Some(avg_score);
        }
        if let Some(completed_at) = update.completed_at {
            self.completed_at = Some(completed_at);
        }
        false
    }
}

/// Fields captured when a task is submitted
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub name: String,
    pub icp: String,
    pub file_name: String,
    #[serde(default = "default_start_time")]
    pub start_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_completion: Option<String>,
}

fn default_start_time() -> String {
    "Just now".to_string()
}

impl NewTask {
    pub fn new(
        name: impl Into<String>,
        icp: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            icp: icp.into(),
            file_name: file_name.into(),
            start_time: default_start_time(),
            estimated_completion: None,
        }
    }

    /// Materialize as a running task at progress 0
    pub fn into_task(self, id: String, created_at: String) -> Task {
        Task {
            id,
            name: self.name,
            icp: self.icp,
            file_name: self.file_name,
            status: TaskStatus::Running,
            progress: 0.0,
            start_time: self.start_time,
            estimated_completion: self.estimated_completion,
            runtime: None,
            companies: None,
            avg_score: None,
            created_at,
            completed_at: None,
        }
    }
}

/// Partial update of a task; `None` leaves a field unchanged.
///
/// `estimated_completion` is doubly optional so it can be cleared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskUpdate {
    pub status: Option<TaskStatus>,
    pub progress: Option<f64>,
    pub estimated_completion: Option<Option<String>>,
    pub runtime: Option<String>,
    pub companies: Option<u32>,
    pub avg_score: Option<u32>,
    pub completed_at: Option<String>,
}
