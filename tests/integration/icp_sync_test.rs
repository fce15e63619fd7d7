//! ICP Assistant Synchronization Integration Tests
//!
//! Drives `IcpService` over the SQLite row store with the real OpenAI
//! assistants client pointed at a wiremock server:
//! - create links a new assistant named after the ICP
//! - prompt-affecting updates push new instructions to the same assistant
//! - remote failures degrade to partial success without losing the row
//! - delete tolerates an assistant that is already gone

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use prospectiq::models::icp::{AssistantLink, CustomParameter, IcpDraft, IcpUpdate, ScoringType};
use prospectiq::services::assistant_sync::AssistantSynchronizer;
use prospectiq::services::icp::{IcpService, SqliteIcpStore};
use prospectiq::storage::database::Database;
use prospectiq_core::{CollectingNotifier, NotificationLevel};
use prospectiq_llm::{AssistantConfig, OpenAIAssistants};

// ============================================================================
// Helpers
// ============================================================================

struct Harness {
    service: IcpService,
    notifier: Arc<CollectingNotifier>,
}

fn harness(server: &MockServer) -> Harness {
    let api = OpenAIAssistants::new(
        AssistantConfig::default()
            .with_api_key("sk-test")
            .with_base_url(server.uri()),
    )
    .expect("client");
    let notifier = Arc::new(CollectingNotifier::new());
    let db = Database::new_in_memory().expect("Failed to create in-memory test database");

    let service = IcpService::new(
        Arc::new(SqliteIcpStore::new(db)),
        Arc::new(AssistantSynchronizer::new(Some(Arc::new(api)))),
        notifier.clone(),
        "demo-user-123",
    );
    Harness { service, notifier }
}

fn smb_draft() -> IcpDraft {
    let mut automation = CustomParameter::new("Has Automation", "Uses marketing automation");
    automation.set_scoring_type(ScoringType::Binary);

    IcpDraft {
        name: "SMB Marketing Teams".to_string(),
        description: "Marketing professionals at small to medium businesses".to_string(),
        custom_parameters: vec![
            CustomParameter::new("Team Size", "Number of marketing team members"),
            automation,
        ],
        color: None,
    }
}

async fn mount_create(server: &MockServer, assistant_id: &str) {
    Mock::given(method("POST"))
        .and(path("/assistants"))
        .and(header("Authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "name": "ICP Assistant - SMB Marketing Teams",
            "model": "gpt-4o"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": assistant_id,
            "object": "assistant"
        })))
        .expect(1)
        .mount(server)
        .await;
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_create_links_remote_assistant() {
    let server = MockServer::start().await;
    mount_create(&server, "asst_smb").await;
    let h = harness(&server);

    let icp = h
        .service
        .create(smb_draft(), "demo-user-123")
        .await
        .expect("ICP created");

    assert_eq!(icp.assistant, AssistantLink::Synced("asst_smb".to_string()));
    assert!(icp.system_prompt.contains("- Team Size: Number of marketing team members (Score between 1 and 100)"));
    assert!(icp.system_prompt.contains("- Has Automation: Uses marketing automation (Expect Yes/No or True/False)"));
    assert_eq!(h.notifier.levels(), vec![NotificationLevel::Success]);

    let stored = h.service.get_by_id(&icp.id).await.expect("row stored");
    assert_eq!(stored.custom_parameters, icp.custom_parameters);
}

#[tokio::test]
async fn test_create_survives_assistant_outage() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/assistants"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": { "message": "upstream unavailable" }
        })))
        .mount(&server)
        .await;
    let h = harness(&server);

    let icp = h
        .service
        .create(smb_draft(), "demo-user-123")
        .await
        .expect("row saved despite outage");

    assert_eq!(icp.assistant, AssistantLink::Unsynced);
    assert_eq!(h.notifier.levels(), vec![NotificationLevel::PartialSuccess]);
    assert_eq!(h.service.list().await.len(), 1);
}

#[tokio::test]
async fn test_description_update_pushes_new_instructions() {
    let server = MockServer::start().await;
    mount_create(&server, "asst_smb").await;
    Mock::given(method("POST"))
        .and(path("/assistants/asst_smb"))
        .and(body_partial_json(json!({ "model": "gpt-4o" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "asst_smb" })))
        .expect(1)
        .mount(&server)
        .await;
    let h = harness(&server);

    let icp = h.service.create(smb_draft(), "demo-user-123").await.unwrap();
    let updated = h
        .service
        .update(
            &icp.id,
            IcpUpdate {
                description: Some("Growth marketers at seed-stage startups".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("ICP updated");

    assert!(updated
        .system_prompt
        .contains("ICP Description: Growth marketers at seed-stage startups"));
    assert_eq!(updated.assistant, AssistantLink::Synced("asst_smb".to_string()));
    assert_eq!(updated.created_at, icp.created_at);
}

#[tokio::test]
async fn test_update_retries_assistant_for_unsynced_icp() {
    let server = MockServer::start().await;
    // first create fails, the later update creates the assistant
    Mock::given(method("POST"))
        .and(path("/assistants"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/assistants"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "asst_late" })))
        .mount(&server)
        .await;
    let h = harness(&server);

    let icp = h.service.create(smb_draft(), "demo-user-123").await.unwrap();
    assert_eq!(icp.assistant, AssistantLink::Unsynced);

    let updated = h
        .service
        .update(
            &icp.id,
            IcpUpdate {
                name: Some("SMB Growth Teams".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.assistant, AssistantLink::Synced("asst_late".to_string()));
}

#[tokio::test]
async fn test_delete_with_missing_assistant_still_removes_row() {
    let server = MockServer::start().await;
    mount_create(&server, "asst_gone").await;
    Mock::given(method("DELETE"))
        .and(path("/assistants/asst_gone"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "message": "No assistant found with id 'asst_gone'." }
        })))
        .expect(1)
        .mount(&server)
        .await;
    let h = harness(&server);

    let icp = h.service.create(smb_draft(), "demo-user-123").await.unwrap();
    h.notifier.take();

    assert!(h.service.delete(&icp.id).await);
    assert!(h.service.get_by_id(&icp.id).await.is_none());

    let received = h.notifier.received();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].level, NotificationLevel::Success);
    assert_eq!(received[0].message, "ICP deleted successfully.");
}
