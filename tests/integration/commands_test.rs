//! Command Layer Integration Tests
//!
//! Exercises the command functions over an `AppState` initialized from a
//! temporary config file and an in-memory database, with assistant sync
//! disabled.

use std::sync::Arc;
use std::time::Duration;

use prospectiq::commands;
use prospectiq::models::icp::{CustomParameter, IcpDraft, IcpUpdate};
use prospectiq::models::settings::{SettingsUpdate, SimulationConfig};
use prospectiq::models::task::TaskStatus;
use prospectiq::services::assistant_sync::AssistantSynchronizer;
use prospectiq::services::icp::{IcpRowStore, SqliteIcpStore};
use prospectiq::storage::{ConfigService, Database};
use prospectiq::{AppState, StartAnalysisRequest};
use prospectiq_core::{CollectingNotifier, NotificationLevel};

// ============================================================================
// Helpers
// ============================================================================

struct TestApp {
    state: AppState,
    notifier: Arc<CollectingNotifier>,
    _dir: tempfile::TempDir,
}

async fn test_app() -> TestApp {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = ConfigService::open(dir.path().join("config.json")).expect("config");
    config
        .update_config(SettingsUpdate {
            simulation: Some(SimulationConfig {
                min_interval_ms: 1,
                max_interval_ms: 3,
                min_increment: 20.0,
                max_increment: 50.0,
                seed: Some(3),
            }),
            ..Default::default()
        })
        .expect("fast simulation");

    let database = Database::new_in_memory().expect("database");
    let store: Arc<dyn IcpRowStore> = Arc::new(SqliteIcpStore::new(database.clone()));
    let notifier = Arc::new(CollectingNotifier::new());

    let state = AppState::with_notifier(notifier.clone());
    state
        .initialize_with(config, database, store, AssistantSynchronizer::disabled())
        .await
        .expect("initialized");

    TestApp {
        state,
        notifier,
        _dir: dir,
    }
}

fn draft(name: &str) -> IcpDraft {
    IcpDraft {
        name: name.to_string(),
        description: "Technology decision makers".to_string(),
        custom_parameters: vec![CustomParameter::new("Tech Stack", "Primary technologies")],
        color: None,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_health_reports_initialized_services() {
    let app = test_app().await;
    let health = commands::get_health(&app.state).await.into_result().unwrap();

    assert_eq!(health.status, "healthy");
    assert!(health.database);
    assert!(health.config);
    assert!(!health.assistants);
    assert_eq!(health.icp_store, "sqlite");
}

#[tokio::test]
async fn test_icp_commands_round_trip() {
    let app = test_app().await;

    let created = commands::create_icp(&app.state, draft("Tech Startups"))
        .await
        .into_result()
        .unwrap();
    assert_eq!(created.owner_id, "demo-user-123");
    // assistant sync is disabled, so the row is saved unsynced
    assert_eq!(app.notifier.levels(), vec![NotificationLevel::PartialSuccess]);

    let fetched = commands::get_icp(&app.state, &created.id).await.into_result().unwrap();
    assert_eq!(fetched, created);

    let updated = commands::update_icp(
        &app.state,
        &created.id,
        IcpUpdate {
            name: Some("Tech Scaleups".to_string()),
            ..Default::default()
        },
    )
    .await
    .into_result()
    .unwrap();
    assert!(updated.system_prompt.contains("ICP Name: Tech Scaleups"));

    let listed = commands::list_icps(&app.state).await.into_result().unwrap();
    assert_eq!(listed.len(), 1);

    assert!(commands::delete_icp(&app.state, &created.id).await.into_result().unwrap());
    assert!(!commands::get_icp(&app.state, &created.id).await.success);
}

#[tokio::test]
async fn test_invalid_icp_input_is_rejected() {
    let app = test_app().await;

    let response = commands::create_icp(&app.state, draft("   ")).await;
    assert!(!response.success);
    assert!(response.error.unwrap().contains("name"));

    let mut bad_range = draft("Ranges");
    bad_range.custom_parameters[0].scoring_min = Some(80);
    bad_range.custom_parameters[0].scoring_max = Some(10);
    assert!(!commands::create_icp(&app.state, bad_range).await.success);

    let empty = commands::update_icp(&app.state, "any", IcpUpdate::default()).await;
    assert_eq!(empty.error.as_deref(), Some("Nothing to update"));

    // nothing reached the service
    assert!(app.notifier.received().is_empty());
}

#[tokio::test]
async fn test_start_analysis_validates_upload_and_icp() {
    let app = test_app().await;
    let icp = commands::create_icp(&app.state, draft("Tech Startups"))
        .await
        .into_result()
        .unwrap();

    let bad_type = commands::start_analysis(
        &app.state,
        StartAnalysisRequest {
            name: "Q2".to_string(),
            icp_id: icp.id.clone(),
            file_name: "companies.pdf".to_string(),
            size_bytes: 1024,
        },
    )
    .await;
    assert!(!bad_type.success);

    let too_big = commands::start_analysis(
        &app.state,
        StartAnalysisRequest {
            name: "Q2".to_string(),
            icp_id: icp.id.clone(),
            file_name: "companies.csv".to_string(),
            size_bytes: 60 * 1024 * 1024,
        },
    )
    .await;
    assert!(!too_big.success);

    let unknown_icp = commands::start_analysis(
        &app.state,
        StartAnalysisRequest {
            name: "Q2".to_string(),
            icp_id: "missing".to_string(),
            file_name: "companies.csv".to_string(),
            size_bytes: 1024,
        },
    )
    .await;
    assert_eq!(unknown_icp.error.as_deref(), Some("ICP with ID missing not found"));

    assert!(commands::list_running_tasks(&app.state).await.into_result().unwrap().is_empty());
}

#[tokio::test]
async fn test_analysis_runs_to_completion() {
    let app = test_app().await;
    let icp = commands::create_icp(&app.state, draft("Tech Startups"))
        .await
        .into_result()
        .unwrap();

    let task = commands::start_analysis(
        &app.state,
        StartAnalysisRequest {
            name: "Q2 Prospects".to_string(),
            icp_id: icp.id.clone(),
            file_name: "companies.xlsx".to_string(),
            size_bytes: 4096,
        },
    )
    .await
    .into_result()
    .unwrap();
    assert_eq!(task.icp, "Tech Startups");
    assert_eq!(task.status, TaskStatus::Running);
    assert_eq!(task.estimated_completion.as_deref(), Some("Calculating..."));

    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            let current = commands::get_task(&app.state, &task.id).await.into_result().unwrap();
            if current.status == TaskStatus::Completed {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("analysis completes");

    let completed = commands::list_completed_tasks(&app.state).await.into_result().unwrap();
    assert_eq!(completed[0].id, task.id);
    assert_eq!(completed[0].progress, 100.0);

    assert!(commands::delete_task(&app.state, &task.id).await.into_result().unwrap());
    assert!(commands::list_completed_tasks(&app.state).await.into_result().unwrap().is_empty());
    assert!(!commands::delete_task(&app.state, &task.id).await.into_result().unwrap());
}

#[tokio::test]
async fn test_template_and_upload_commands() {
    let template = commands::get_csv_template().into_result().unwrap();
    assert!(template.content.starts_with("Company Name,Company Website\n"));

    let info = commands::validate_upload_file("Leads.XLSX", 10).into_result().unwrap();
    assert_eq!(info.extension, "xlsx");
    assert!(!commands::validate_upload_file("leads.txt", 10).success);
}
