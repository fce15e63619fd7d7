//! Task Simulation Integration Tests
//!
//! Runs the progress simulator against a `TaskStore` persisted in a real
//! in-memory SQLite database:
//! - a task runs to completion with monotone progress
//! - the completed state is what a fresh store loads back
//! - running tasks survive a restart and resume
//! - deleted tasks stop their simulation

use std::sync::Arc;
use std::time::Duration;

use prospectiq::models::settings::SimulationConfig;
use prospectiq::models::task::{NewTask, TaskStatus};
use prospectiq::services::simulator::TaskSimulator;
use prospectiq::services::task_store::{SqliteTaskPersistence, TaskStore, TASK_STORE_KEY};
use prospectiq::storage::database::Database;

// ============================================================================
// Helpers
// ============================================================================

fn fast_config() -> SimulationConfig {
    SimulationConfig {
        min_interval_ms: 1,
        max_interval_ms: 5,
        min_increment: 10.0,
        max_increment: 30.0,
        seed: Some(42),
    }
}

fn slow_config() -> SimulationConfig {
    SimulationConfig {
        min_interval_ms: 60_000,
        max_interval_ms: 60_000,
        ..fast_config()
    }
}

fn load_store(db: &Database) -> Arc<TaskStore> {
    Arc::new(TaskStore::load(Arc::new(SqliteTaskPersistence::new(db.clone()))))
}

fn new_task(name: &str) -> NewTask {
    NewTask::new(name, "SMB Marketing Teams", "companies.csv")
}

async fn wait_for_completion(store: &TaskStore, id: &str) -> Vec<f64> {
    let mut seen = Vec::new();
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            let task = store.get_task(id).expect("task exists");
            seen.push(task.progress);
            if task.status == TaskStatus::Completed {
                break;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    })
    .await
    .expect("task completes in time");
    seen
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_task_runs_to_completion_and_persists() {
    let db = Database::new_in_memory().unwrap();
    let store = load_store(&db);
    let simulator = TaskSimulator::new(store.clone(), fast_config());

    let id = store.add_task(new_task("Q1 prospects"));
    assert!(simulator.start(&id));

    let seen = wait_for_completion(&store, &id).await;
    assert!(seen.windows(2).all(|w| w[0] <= w[1]), "progress regressed: {:?}", seen);

    let task = store.get_task(&id).unwrap();
    assert_eq!(task.progress, 100.0);
    assert!(task.completed_at.is_some());
    assert!(task.estimated_completion.is_none());
    assert!(task.runtime.as_deref().unwrap_or_default().ends_with(" min"));
    let companies = task.companies.unwrap();
    assert!((100..600).contains(&companies));
    let avg_score = task.avg_score.unwrap();
    assert!((60..90).contains(&avg_score));

    assert!(store.get_running_tasks().is_empty());
    assert_eq!(store.get_completed_tasks()[0].id, id);

    // the persisted envelope reloads to the same state
    let raw = db.get_setting(TASK_STORE_KEY).unwrap().expect("persisted");
    assert!(raw.contains("\"version\":0"));
    let reloaded = load_store(&db);
    assert_eq!(reloaded.get_task(&id), Some(task));
}

#[tokio::test]
async fn test_running_task_resumes_after_restart() {
    let db = Database::new_in_memory().unwrap();

    let id = {
        let store = load_store(&db);
        let simulator = TaskSimulator::new(store.clone(), slow_config());
        let id = store.add_task(new_task("Interrupted"));
        simulator.start(&id);
        simulator.shutdown();
        id
    };

    let store = load_store(&db);
    assert_eq!(store.get_task(&id).unwrap().status, TaskStatus::Running);

    let simulator = TaskSimulator::new(store.clone(), fast_config());
    assert_eq!(simulator.resume_running(), 1);
    wait_for_completion(&store, &id).await;
}

#[tokio::test]
async fn test_deleted_task_leaves_every_view() {
    let db = Database::new_in_memory().unwrap();
    let store = load_store(&db);
    let simulator = TaskSimulator::new(store.clone(), slow_config());

    let keep = store.add_task(new_task("Keep"));
    let dropped = store.add_task(new_task("Drop"));
    simulator.start(&dropped);

    assert!(simulator.cancel(&dropped));
    assert!(store.delete_task(&dropped));

    let running: Vec<String> = store.get_running_tasks().into_iter().map(|t| t.id).collect();
    assert_eq!(running, vec![keep]);
    assert!(store.get_completed_tasks().is_empty());
    assert!(load_store(&db).get_task(&dropped).is_none());
}
