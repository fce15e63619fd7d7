//! Task Progress Simulator
//!
//! Stands in for a real analysis pipeline: one background tokio task per
//! task id nudges `progress` forward at random intervals until it reaches
//! 100, then marks the task completed with placeholder results.
//!
//! Each simulation is registered under its task id with a
//! `CancellationToken`. A loop also ends on its own as soon as its task
//! disappears from the store or stops being `running`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio_util::sync::CancellationToken;

use crate::models::settings::SimulationConfig;
use crate::models::task::{TaskStatus, TaskUpdate};
use crate::services::task_store::TaskStore;

/// Registry entry for one running simulation
struct ActiveSimulation {
    generation: u64,
    token: CancellationToken,
}

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TickOutcome {
    Advanced,
    Completed,
    /// Task vanished or is no longer running
    Stopped,
}

/// Shared state handed to every simulation loop
struct SimulatorInner {
    store: Arc<TaskStore>,
    config: SimulationConfig,
    rng: Mutex<StdRng>,
    active: Mutex<HashMap<String, ActiveSimulation>>,
    next_generation: AtomicU64,
    shutdown: CancellationToken,
}

/// Drives simulated progress for running tasks
#[derive(Clone)]
pub struct TaskSimulator {
    inner: Arc<SimulatorInner>,
}

impl TaskSimulator {
    pub fn new(store: Arc<TaskStore>, config: SimulationConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            inner: Arc::new(SimulatorInner {
                store,
                config,
                rng: Mutex::new(rng),
                active: Mutex::new(HashMap::new()),
                next_generation: AtomicU64::new(0),
                shutdown: CancellationToken::new(),
            }),
        }
    }

    /// Start simulating `task_id`.
    ///
    /// Returns false when the task does not exist, is not running, is already
    /// being simulated, or the simulator has been shut down. Must be called
    /// from within a tokio runtime.
    pub fn start(&self, task_id: &str) -> bool {
        if self.inner.shutdown.is_cancelled() {
            return false;
        }
        match self.inner.store.get_task(task_id) {
            Some(task) if task.status == TaskStatus::Running => {}
            _ => return false,
        }

        let (generation, token) = {
            let mut active = self.inner.active();
            if active.contains_key(task_id) {
                return false;
            }
            let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed);
            let token = self.inner.shutdown.child_token();
            active.insert(
                task_id.to_string(),
                ActiveSimulation {
                    generation,
                    token: token.clone(),
                },
            );
            (generation, token)
        };

        tracing::info!("[TaskSimulator] starting simulation for {}", task_id);
        let inner = self.inner.clone();
        let id = task_id.to_string();
        tokio::spawn(async move {
            inner.clone().run(id.clone(), token).await;
            inner.unregister(&id, generation);
        });
        true
    }

    /// Stop simulating `task_id`; the task itself is left as it is
    pub fn cancel(&self, task_id: &str) -> bool {
        match self.inner.active().remove(task_id) {
            Some(sim) => {
                sim.token.cancel();
                tracing::info!("[TaskSimulator] cancelled simulation for {}", task_id);
                true
            }
            None => false,
        }
    }

    /// Cancel every simulation and refuse new ones
    pub fn shutdown(&self) {
        self.inner.shutdown.cancel();
        let count = {
            let mut active = self.inner.active();
            let count = active.len();
            active.clear();
            count
        };
        tracing::info!("[TaskSimulator] shut down ({} active)", count);
    }

    pub fn is_active(&self, task_id: &str) -> bool {
        self.inner.active().contains_key(task_id)
    }

    pub fn active_count(&self) -> usize {
        self.inner.active().len()
    }

    /// Start simulations for every persisted task still marked running.
    ///
    /// Returns the number of simulations started.
    pub fn resume_running(&self) -> usize {
        let started = self
            .inner
            .store
            .get_running_tasks()
            .iter()
            .filter(|task| self.start(&task.id))
            .count();
        if started > 0 {
            tracing::info!("[TaskSimulator] resumed {} running task(s)", started);
        }
        started
    }
}

impl SimulatorInner {
    fn active(&self) -> MutexGuard<'_, HashMap<String, ActiveSimulation>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn rng(&self) -> MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drop the registry entry, unless a newer simulation took its place
    fn unregister(&self, task_id: &str, generation: u64) {
        let mut active = self.active();
        if matches!(active.get(task_id), Some(sim) if sim.generation == generation) {
            active.remove(task_id);
        }
    }

    fn next_delay(&self) -> Duration {
        let ms = self
            .rng()
            .gen_range(self.config.min_interval_ms..=self.config.max_interval_ms);
        Duration::from_millis(ms)
    }

    async fn run(self: Arc<Self>, task_id: String, token: CancellationToken) {
        loop {
            let delay = self.next_delay();
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::debug!("[TaskSimulator] {} cancelled", task_id);
                    return;
                }
                _ = tokio::time::sleep(delay) => {}
            }

            // the store writes through to SQLite
            let inner = self.clone();
            let id = task_id.clone();
            let outcome = match tokio::task::spawn_blocking(move || inner.tick(&id)).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::warn!("[TaskSimulator] tick for {} failed: {}", task_id, e);
                    return;
                }
            };

            match outcome {
                TickOutcome::Advanced => continue,
                TickOutcome::Completed => {
                    tracing::info!("[TaskSimulator] task {} completed", task_id);
                    return;
                }
                TickOutcome::Stopped => {
                    tracing::debug!("[TaskSimulator] task {} no longer running", task_id);
                    return;
                }
            }
        }
    }

    /// Advance the task by one random increment.
    ///
    /// The running check and the write happen under one store lock, so a task
    /// that fails or completes meanwhile is left untouched.
    fn tick(&self, task_id: &str) -> TickOutcome {
        let after = self.store.modify(task_id, |task| {
            if task.status != TaskStatus::Running {
                return None;
            }
            let mut rng = self.rng();
            let increment = rng.gen_range(self.config.min_increment..self.config.max_increment);
            let progress = (task.progress + increment).min(100.0);

            if progress >= 100.0 {
                return Some(placeholder_completion(&mut *rng));
            }

            // progress < 100 here, so the minute count is small and non-negative
            let remaining = ((100.0 - progress) / 10.0).floor() as u32 + rng.gen_range(0..5);
            Some(TaskUpdate {
                progress: Some(progress),
                estimated_completion: Some(Some(format!("{} min remaining", remaining))),
                ..Default::default()
            })
        });

        match after.map(|task| task.status) {
            Some(TaskStatus::Running) => TickOutcome::Advanced,
            Some(TaskStatus::Completed) => TickOutcome::Completed,
            Some(TaskStatus::Failed) | None => TickOutcome::Stopped,
        }
    }
}

/// Completion update with placeholder results.
///
/// There is no scoring engine: `runtime`, `companies` and `avg_score` are
/// random stand-ins and must be replaced once real analysis exists.
fn placeholder_completion(rng: &mut impl Rng) -> TaskUpdate {
    TaskUpdate {
        status: Some(TaskStatus::Completed),
        progress: Some(100.0),
        estimated_completion: Some(None),
        runtime: Some(format!("{} min", rng.gen_range(5..20))),
        companies: Some(rng.gen_range(100..600)),
        avg_score: Some(rng.gen_range(60..90)),
        completed_at: Some(chrono::Utc::now().to_rfc3339()),
    }
}
