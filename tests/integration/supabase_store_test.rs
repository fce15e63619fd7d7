//! Supabase Store Integration Tests
//!
//! `IcpService` over `SupabaseIcpStore` with a wiremock PostgREST endpoint.
//! Assistant sync is disabled, so every write is a partial success.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use prospectiq::models::icp::{AssistantLink, IcpColor, IcpDraft};
use prospectiq::services::assistant_sync::AssistantSynchronizer;
use prospectiq::services::icp::{IcpService, SupabaseIcpStore};
use prospectiq_core::{CollectingNotifier, NotificationLevel};

fn service_for(server: &MockServer, notifier: Arc<CollectingNotifier>) -> IcpService {
    let store = SupabaseIcpStore::new(&server.uri(), "anon-key", None).expect("store");
    IcpService::new(
        Arc::new(store),
        Arc::new(AssistantSynchronizer::disabled()),
        notifier,
        "demo-user-123",
    )
}

fn stored_row(id: &str, name: &str, created_at: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "description": "Decision makers at large enterprises",
        "custom_parameters": [{
            "id": "param_1",
            "parameterName": "Company Size",
            "parameterDescription": "Number of employees",
            "scoringType": "Score Range",
            "scoringMin": 1,
            "scoringMax": 100
        }],
        "color": "purple",
        "assistant_id": "asst_demo1",
        "system_prompt": "You are an AI assistant",
        "user_id": "demo-user-123",
        "created_at": created_at,
        "updated_at": created_at,
        "date_modified": null
    })
}

#[tokio::test]
async fn test_list_filters_by_owner_and_maps_rows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/icps"))
        .and(query_param("user_id", "eq.demo-user-123"))
        .and(query_param("order", "created_at.desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            stored_row("icp_2", "Newer", "2023-11-20T14:45:00+00:00"),
            stored_row("icp_1", "Older", "2023-10-15T08:30:00+00:00"),
        ])))
        .mount(&server)
        .await;

    let notifier = Arc::new(CollectingNotifier::new());
    let icps = service_for(&server, notifier.clone()).list().await;

    assert_eq!(icps.len(), 2);
    assert_eq!(icps[0].name, "Newer");
    assert_eq!(icps[0].color, IcpColor::Purple);
    assert_eq!(icps[0].assistant, AssistantLink::Synced("asst_demo1".to_string()));
    assert_eq!(icps[0].custom_parameters[0].parameter_name, "Company Size");
    assert!(notifier.received().is_empty());
}

#[tokio::test]
async fn test_list_failure_notifies_and_returns_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/icps"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let notifier = Arc::new(CollectingNotifier::new());
    assert!(service_for(&server, notifier.clone()).list().await.is_empty());

    let received = notifier.received();
    assert_eq!(received[0].level, NotificationLevel::Error);
    assert_eq!(received[0].message, "Could not fetch ICPs");
}

#[tokio::test]
async fn test_create_posts_row_without_assistant() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/icps"))
        .and(header("Prefer", "return=representation"))
        .and(body_partial_json(json!({
            "name": "Enterprise SaaS Buyers",
            "user_id": "demo-user-123",
            "color": "blue"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
            "id": "icp_new",
            "name": "Enterprise SaaS Buyers",
            "description": "Decision makers at large enterprises",
            "custom_parameters": [],
            "color": "blue",
            "assistant_id": null,
            "system_prompt": "prompt",
            "user_id": "demo-user-123",
            "created_at": "2024-03-01T00:00:00+00:00",
            "updated_at": "2024-03-01T00:00:00+00:00",
            "date_modified": "2024-03-01T00:00:00+00:00"
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = Arc::new(CollectingNotifier::new());
    let draft = IcpDraft {
        name: "Enterprise SaaS Buyers".to_string(),
        description: "Decision makers at large enterprises".to_string(),
        custom_parameters: vec![],
        color: None,
    };
    let icp = service_for(&server, notifier.clone())
        .create(draft, "demo-user-123")
        .await
        .expect("created");

    assert_eq!(icp.id, "icp_new");
    assert_eq!(icp.assistant, AssistantLink::Unsynced);
    assert_eq!(notifier.levels(), vec![NotificationLevel::PartialSuccess]);
}

#[tokio::test]
async fn test_update_of_missing_row_reports_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/icps"))
        .and(query_param("id", "eq.ghost"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let notifier = Arc::new(CollectingNotifier::new());
    let result = service_for(&server, notifier.clone())
        .update(
            "ghost",
            prospectiq::models::icp::IcpUpdate {
                color: Some(IcpColor::Green),
                ..Default::default()
            },
        )
        .await;

    assert!(result.is_none());
    let received = notifier.received();
    assert_eq!(received[0].title, "Update Failed");
    assert_eq!(received[0].message, "ICP with ID ghost not found. Cannot update.");
}
