//! Endpoint tests for the API client
//!
//! Each test mounts the backend route it expects and checks both the request
//! the client sends and how the response is decoded.

use assert_matches::assert_matches;
use instance_deck::ApiClient;
use instance_deck::api::types::{
    BackupConfiguration, BackupFrequency, BackupStatus, CreateInstanceRequest, DomainStatus,
    HistoryRange, InstanceStatus, OpenTicketRequest, Permission, SubscriptionStatus,
    TicketStatus,
};
use instance_deck::sampler::history_series;
use pretty_assertions::assert_eq;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::helpers::*;

#[tokio::test]
async fn test_login_accepts_access_token_field() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(serde_json::json!({
            "email": "ada@example.com",
            "password": "hunter2"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "tok-1",
            "user": { "id": 1, "email": "ada@example.com" }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ApiClient::with_base_url(mock_server.uri()).unwrap();
    let auth = client.login("ada@example.com", "hunter2").await.unwrap();

    assert_eq!(auth.token, "tok-1");
    assert_eq!(auth.user.id, "1");
    assert_eq!(auth.user.name, None);
}

#[tokio::test]
async fn test_me_sends_bearer_token() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("Authorization", bearer().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "u-1",
            "email": "ada@example.com",
            "name": "Ada"
        })))
        .mount(&mock_server)
        .await;

    let user = authed_client(&mock_server).me().await.unwrap();
    assert_eq!(user, test_user());
}

#[tokio::test]
async fn test_list_instances_unwraps_items_envelope() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/instances"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [
                instance_json("i-1", "shop", "running"),
                instance_json("i-2", "blog", "provisioning"),
            ]
        })))
        .mount(&mock_server)
        .await;

    let instances = authed_client(&mock_server).list_instances().await.unwrap();

    assert_eq!(instances.len(), 2);
    assert_eq!(instances[0].status, InstanceStatus::Running);
    assert_eq!(instances[0].usage.memory_mib, 256.0);
    assert_eq!(instances[1].status, InstanceStatus::Unknown);
}

#[tokio::test]
async fn test_create_instance_omits_unset_fields() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/instances"))
        .and(body_json(serde_json::json!({ "name": "shop" })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(instance_json("i-9", "shop", "pending")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let instance = authed_client(&mock_server)
        .create_instance(&CreateInstanceRequest {
            name: "shop".to_string(),
            plan_id: None,
            version: None,
        })
        .await
        .unwrap();

    assert_eq!(instance.id, "i-9");
    assert_eq!(instance.status, InstanceStatus::Pending);
}

#[tokio::test]
async fn test_delete_and_restart_instance() {
    let mock_server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/instances/i-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/instances/i-1/restart"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = authed_client(&mock_server);
    client.restart_instance("i-1").await.unwrap();
    client.delete_instance("i-1").await.unwrap();
}

#[tokio::test]
async fn test_metrics_history_requests_range() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/instances/i-1/metrics/history"))
        .and(query_param("range", "6h"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "range": "6h",
            "points": [
                {
                    "timestamp": "2026-10-17T10:00:10Z",
                    "cpu_percent": 20.0,
                    "block_read_bytes": 0,
                    "block_write_bytes": 0,
                    "net_rx_bytes": 3000,
                    "net_tx_bytes": 0
                },
                {
                    "timestamp": "2026-10-17T10:00:00Z",
                    "cpu_percent": 10.0,
                    "block_read_bytes": 0,
                    "block_write_bytes": 0,
                    "net_rx_bytes": 1000,
                    "net_tx_bytes": 0
                }
            ]
        })))
        .mount(&mock_server)
        .await;

    let history = authed_client(&mock_server)
        .metrics_history("i-1", HistoryRange::SixHours)
        .await
        .unwrap();
    let series = history_series(&history.points);

    assert_eq!(series.len(), 2);
    assert_eq!(series[0].cpu_percent, 10.0);
    assert_eq!(series[0].net_rx_rate, 0.0);
    assert_eq!(series[1].net_rx_rate, 200.0);
}

#[tokio::test]
async fn test_create_backup_is_manual() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/instances/i-1/backups"))
        .and(body_json(serde_json::json!({ "kind": "manual" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "id": 77,
            "status": "pending",
            "kind": "manual"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let backup = authed_client(&mock_server)
        .create_backup("i-1")
        .await
        .unwrap();

    assert_eq!(backup.id, "77");
    assert_eq!(backup.status, BackupStatus::Pending);
}

#[tokio::test]
async fn test_backup_schedule_round_trip() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/instances/i-1/backup-configurations"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "enabled": true })),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/instances/i-1/backup-configurations"))
        .and(body_json(serde_json::json!({
            "enabled": true,
            "frequency": "weekly",
            "time_of_day": "03:30",
            "retention_days": 30
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "enabled": true,
            "frequency": "weekly",
            "time_of_day": "03:30",
            "retention_days": 30
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = authed_client(&mock_server);
    let mut schedule = client.backup_configuration("i-1").await.unwrap();
    assert_eq!(
        schedule,
        BackupConfiguration {
            enabled: true,
            ..BackupConfiguration::default()
        }
    );

    schedule.frequency = BackupFrequency::Weekly;
    schedule.time_of_day = Some("03:30".to_string());
    schedule.retention_days = 30;

    let updated = client
        .update_backup_configuration("i-1", &schedule)
        .await
        .unwrap();
    assert_eq!(updated, schedule);
}

#[tokio::test]
async fn test_restore_and_delete_backup_use_backup_routes() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/backups/b-1/restore"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/backups/b-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = authed_client(&mock_server);
    client.restore_backup("b-1").await.unwrap();
    client.delete_backup("b-1").await.unwrap();
}

#[tokio::test]
async fn test_add_domain_normalizes_name() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/instances/i-1/domains"))
        .and(body_json(serde_json::json!({ "name": "shop.example.com" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "id": "d-1",
            "domain": "shop.example.com",
            "status": "pending",
            "dns_target": "i-1.hosted.example.net"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let domain = authed_client(&mock_server)
        .add_domain("i-1", "  Shop.Example.COM ")
        .await
        .unwrap();

    assert_eq!(domain.name, "shop.example.com");
    assert_eq!(domain.status, DomainStatus::Pending);
    assert!(!domain.is_primary);
}

#[tokio::test]
async fn test_verify_domain() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/domains/d-1/verify"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "d-1",
            "name": "shop.example.com",
            "status": "verified",
            "is_primary": true
        })))
        .mount(&mock_server)
        .await;

    let domain = authed_client(&mock_server)
        .verify_domain("d-1")
        .await
        .unwrap();

    assert_eq!(domain.status, DomainStatus::Verified);
    assert!(domain.is_primary);
}

#[tokio::test]
async fn test_collaborators_add_and_remove() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/instances/i-1/collaborators"))
        .and(body_json(serde_json::json!({
            "username": "grace",
            "permission": "admin"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "username": "grace",
            "permission": "admin"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/instances/i-1/collaborators/grace"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = authed_client(&mock_server);
    let collaborator = client
        .add_collaborator("i-1", "grace", Permission::Admin)
        .await
        .unwrap();
    assert_eq!(collaborator.permission, Permission::Admin);

    client.remove_collaborator("i-1", "grace").await.unwrap();
}

#[tokio::test]
async fn test_plans_are_public() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/subscription-plans"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [
                { "id": 1, "name": "Starter", "price_cents": 500, "currency": "eur" },
                {
                    "id": 2,
                    "name": "Pro",
                    "price_cents": 1250,
                    "interval": "year",
                    "features": ["backups"]
                }
            ]
        })))
        .mount(&mock_server)
        .await;

    let client = ApiClient::with_base_url(mock_server.uri()).unwrap();
    let plans = client.list_plans().await.unwrap();

    assert_eq!(plans[0].price_label(), "5.00 EUR/month");
    assert_eq!(plans[1].price_label(), "12.50 USD/year");
    assert_eq!(plans[1].features, vec!["backups".to_string()]);
}

#[tokio::test]
async fn test_subscribe_for_instance() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/subscriptions"))
        .and(body_json(serde_json::json!({
            "plan_id": "2",
            "instance_id": "i-1"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "id": "s-1",
            "plan_id": 2,
            "status": "past_due",
            "instance_id": "i-1"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let subscription = authed_client(&mock_server)
        .subscribe("2", Some("i-1"))
        .await
        .unwrap();

    assert_eq!(subscription.plan_id, "2");
    assert_eq!(subscription.status, SubscriptionStatus::PastDue);
}

#[tokio::test]
async fn test_ticket_lifecycle() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/help-tickets"))
        .and(body_json(serde_json::json!({
            "subject": "Slow shop",
            "body": "Pages take 10s"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "id": 5,
            "subject": "Slow shop",
            "status": "open",
            "messages": [{ "author": "ada", "body": "Pages take 10s" }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/help-tickets/5/replies"))
        .and(body_json(serde_json::json!({ "body": "Still slow" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "id": 5,
            "subject": "Slow shop",
            "status": "pending",
            "messages": [
                { "author": "ada", "body": "Pages take 10s" },
                { "author": "ada", "body": "Still slow" }
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/help-tickets/5/close"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = authed_client(&mock_server);
    let ticket = client
        .open_ticket(&OpenTicketRequest {
            subject: "Slow shop".to_string(),
            body: "Pages take 10s".to_string(),
            instance_id: None,
        })
        .await
        .unwrap();
    assert_eq!(ticket.id, "5");
    assert_eq!(ticket.status, TicketStatus::Open);

    let ticket = client.reply_to_ticket("5", "Still slow").await.unwrap();
    assert_eq!(ticket.messages.len(), 2);
    assert_eq!(ticket.status, TicketStatus::Pending);

    client.close_ticket("5").await.unwrap();
}

#[tokio::test]
async fn test_scoped_calls_need_a_session() {
    let mock_server = MockServer::start().await;
    let client = ApiClient::with_base_url(mock_server.uri()).unwrap();

    let result = client.list_backups("i-1").await;

    assert_matches!(result, Err(instance_deck::ApiError::NotAuthenticated));
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}
