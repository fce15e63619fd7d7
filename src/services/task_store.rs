//! Task Store
//!
//! Process-wide collection of analysis tasks, written through to an injected
//! persistence adapter after every mutation so it survives restarts.
//!
//! The full list is persisted as a single JSON value under [`TASK_STORE_KEY`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::models::task::{NewTask, Task, TaskStatus, TaskUpdate};
use crate::storage::database::Database;
use crate::utils::error::AppResult;

/// Key the task list is stored under
pub const TASK_STORE_KEY: &str = "task-store";

/// Format version written into the persisted envelope
const STORE_VERSION: u32 = 0;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Durable home for the serialized task list
pub trait TaskPersistence: Send + Sync {
    /// Read the stored value, `None` if nothing has been stored yet
    fn load(&self) -> AppResult<Option<String>>;

    /// Replace the stored value
    fn save(&self, value: &str) -> AppResult<()>;
}

/// Persists into the `settings` table of the application database
pub struct SqliteTaskPersistence {
    db: Database,
}

impl SqliteTaskPersistence {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl TaskPersistence for SqliteTaskPersistence {
    fn load(&self) -> AppResult<Option<String>> {
        self.db.get_setting(TASK_STORE_KEY)
    }

    fn save(&self, value: &str) -> AppResult<()> {
        self.db.set_setting(TASK_STORE_KEY, value)
    }
}

/// Keeps the serialized value in memory
#[derive(Default)]
pub struct MemoryTaskPersistence {
    value: Mutex<Option<String>>,
}

impl MemoryTaskPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start out with an already-stored value
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: Mutex::new(Some(value.into())),
        }
    }

    /// The last value written
    pub fn value(&self) -> Option<String> {
        self.value
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl TaskPersistence for MemoryTaskPersistence {
    fn load(&self) -> AppResult<Option<String>> {
        Ok(self.value())
    }

    fn save(&self, value: &str) -> AppResult<()> {
        *self.value.lock().unwrap_or_else(PoisonError::into_inner) = Some(value.to_string());
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct PersistedState {
    tasks: Vec<Task>,
}

/// `{"state": {"tasks": [...]}, "version": 0}`
#[derive(Serialize, Deserialize)]
struct PersistedEnvelope {
    state: PersistedState,
    #[serde(default)]
    version: u32,
}

/// Generate a task id: `task_<epoch millis>_<9 base36 chars>`
pub fn generate_task_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..9)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect();
    format!("task_{}_{}", chrono::Utc::now().timestamp_millis(), suffix)
}

/// The task collection plus its persistence adapter
pub struct TaskStore {
    tasks: Mutex<Vec<Task>>,
    persistence: Arc<dyn TaskPersistence>,
}

impl TaskStore {
    /// An empty store; nothing is read from `persistence`
    pub fn new(persistence: Arc<dyn TaskPersistence>) -> Self {
        Self {
            tasks: Mutex::new(Vec::new()),
            persistence,
        }
    }

    /// Restore the collection from `persistence`.
    ///
    /// A missing value yields an empty store. A value that cannot be read or
    /// parsed is logged and replaced by an empty collection.
    pub fn load(persistence: Arc<dyn TaskPersistence>) -> Self {
        let tasks = match persistence.load() {
            Ok(Some(raw)) => match parse_persisted(&raw) {
                Ok(tasks) => tasks,
                Err(e) => {
                    tracing::warn!("[TaskStore] discarding unreadable task list: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("[TaskStore] failed to load task list: {}", e);
                Vec::new()
            }
        };

        tracing::debug!("[TaskStore] loaded {} task(s)", tasks.len());
        Self {
            tasks: Mutex::new(tasks),
            persistence,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Task>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write the collection through while the caller still holds the lock
    fn persist(&self, tasks: &[Task]) {
        let envelope = PersistedEnvelope {
            state: PersistedState {
                tasks: tasks.to_vec(),
            },
            version: STORE_VERSION,
        };
        let result = serde_json::to_string(&envelope)
            .map_err(Into::into)
            .and_then(|value| self.persistence.save(&value));
        if let Err(e) = result {
            tracing::warn!("[TaskStore] failed to persist task list: {}", e);
        }
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Append a new running task and return its id
    pub fn add_task(&self, data: NewTask) -> String {
        let id = generate_task_id();
        let task = data.into_task(id.clone(), chrono::Utc::now().to_rfc3339());

        let mut tasks = self.lock();
        tasks.push(task);
        self.persist(&tasks);

        tracing::info!("[TaskStore] added task {}", id);
        id
    }

    /// Merge `update` into the task with `id`.
    ///
    /// Unknown ids are a no-op, as are updates to a completed or failed task.
    /// Returns whether the task exists.
    pub fn update_task(&self, id: &str, update: TaskUpdate) -> bool {
        self.modify(id, |_| Some(update)).is_some()
    }

    /// Read the task and write an update back under a single lock.
    ///
    /// `step` sees the current task and returns the update to apply, or
    /// `None` to leave it alone. Returns the task as it stands afterwards,
    /// `None` if no task has `id`.
    pub fn modify<F>(&self, id: &str, step: F) -> Option<Task>
    where
        F: FnOnce(&Task) -> Option<TaskUpdate>,
    {
        let mut tasks = self.lock();
        let task = tasks.iter_mut().find(|t| t.id == id)?;

        let Some(update) = step(task) else {
            return Some(task.clone());
        };
        if task.apply(update) {
            tracing::warn!(
                "[TaskStore] ignored update to {} task {}",
                task.status.as_str(),
                id
            );
            return Some(task.clone());
        }
        let current = task.clone();
        self.persist(&tasks);
        Some(current)
    }

    /// Remove a task. Idempotent; returns whether a task was removed.
    pub fn delete_task(&self, id: &str) -> bool {
        let mut tasks = self.lock();
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        let removed = tasks.len() != before;
        if removed {
            self.persist(&tasks);
            tracing::info!("[TaskStore] deleted task {}", id);
        }
        removed
    }

    // ========================================================================
    // Views
    // ========================================================================

    pub fn get_task(&self, id: &str) -> Option<Task> {
        self.lock().iter().find(|t| t.id == id).cloned()
    }

    /// Every task, in insertion order
    pub fn all_tasks(&self) -> Vec<Task> {
        self.lock().clone()
    }

    pub fn get_running_tasks(&self) -> Vec<Task> {
        self.lock()
            .iter()
            .filter(|t| t.status == TaskStatus::Running)
            .cloned()
            .collect()
    }

    /// Completed tasks, most recently completed first
    pub fn get_completed_tasks(&self) -> Vec<Task> {
        let mut completed: Vec<Task> = self
            .lock()
            .iter()
            .filter(|t| t.status == TaskStatus::Completed)
            .cloned()
            .collect();
        completed.sort_by(|a, b| completion_instant(b).cmp(&completion_instant(a)));
        completed
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Parse a completion timestamp for ordering; unparseable values sort last
fn completion_instant(task: &Task) -> Option<chrono::DateTime<chrono::FixedOffset>> {
    chrono::DateTime::parse_from_rfc3339(task.completion_key()).ok()
}

/// Accept the envelope format, or a bare task array
fn parse_persisted(raw: &str) -> Result<Vec<Task>, serde_json::Error> {
    match serde_json::from_str::<PersistedEnvelope>(raw) {
        Ok(envelope) => Ok(envelope.state.tasks),
        Err(envelope_err) => {
            serde_json::from_str::<Vec<Task>>(raw).map_err(|_| envelope_err)
        }
    }
}
