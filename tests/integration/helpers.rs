//! Helper functions for integration tests

use instance_deck::ApiClient;
use instance_deck::api::types::{Instance, InstanceStatus, ResourceUsage, User};
use wiremock::MockServer;

pub const TOKEN: &str = "test-token";

/// Client pointed at the mock server with a session token
pub fn authed_client(server: &MockServer) -> ApiClient {
    ApiClient::with_base_url(server.uri())
        .unwrap()
        .with_token(Some(TOKEN.to_string()))
}

pub fn bearer() -> String {
    format!("Bearer {TOKEN}")
}

pub fn test_user() -> User {
    User {
        id: "u-1".to_string(),
        email: "ada@example.com".to_string(),
        name: Some("Ada".to_string()),
    }
}

pub fn test_instance(id: &str, name: &str) -> Instance {
    Instance {
        id: id.to_string(),
        name: name.to_string(),
        version: Some("2.4".to_string()),
        status: InstanceStatus::Running,
        usage: ResourceUsage::default(),
        url: None,
        created_at: None,
    }
}

pub fn instance_json(id: &str, name: &str, status: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "version": "2.4",
        "status": status,
        "usage": { "cpu_percent": 12.5, "memory_mib": 256.0 },
        "created_at": "2026-10-01T08:00:00Z"
    })
}

pub fn live_metrics_json(cpu: f64, disk_read: u64, net_rx: u64) -> serde_json::Value {
    serde_json::json!({
        "cpu_percent": cpu,
        "memory_mib": 512.0,
        "block_read_bytes": disk_read,
        "block_write_bytes": 0,
        "net_rx_bytes": net_rx,
        "net_tx_bytes": 0
    })
}
