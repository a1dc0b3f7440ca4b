#![allow(unused_crate_dependencies)]
#![allow(clippy::tests_outside_test_module, reason = "integration tests live in tests/ dir")]
#![allow(clippy::expect_used, reason = "integration test: panics are the assertion mechanism")]

use std::sync::Arc;

use tasmota_bridge_core::sync::{Credentials, DeviceMapping};
use tasmota_bridge_core::utils::http::create_client;
use tasmota_bridge_core::{
    DeviceUpdater, FetchError, HttpOutputSource, MemoryConfigStore, OutputStateSource,
    SyncController, TasmotaClient, TickOutcome, TickReport, UpdateError,
};
use tasmota_bridge_types::{BridgeConfig, DeviceMappingConfig};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn power_body(state: &str) -> serde_json::Value {
    serde_json::json!({ "POWER": state })
}

fn updater() -> TasmotaClient {
    TasmotaClient::with_timeout(2).expect("client builds")
}

fn mapping_for(server: &MockServer) -> DeviceMapping {
    DeviceMapping::new("lamp", server.address().to_string(), 3)
}

#[tokio::test]
async fn test_push_reports_device_state() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cm"))
        .and(query_param("cmnd", "Power 1"))
        .and(header("X-Requested-With", "Tasmota bridge"))
        .respond_with(ResponseTemplate::new(200).set_body_json(power_body("ON")))
        .expect(1)
        .mount(&server)
        .await;

    let reported = updater().push(&mapping_for(&server), true).await;
    assert!(reported.expect("device answered 200"));
}

#[tokio::test]
async fn test_push_returns_reported_state_not_requested_one() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cm"))
        .and(query_param("cmnd", "Power 0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(power_body("ON")))
        .mount(&server)
        .await;

    let reported = updater().push(&mapping_for(&server), false).await;
    assert!(reported.expect("device answered 200"), "device said ON");
}

#[tokio::test]
async fn test_push_sends_credentials_only_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cm"))
        .and(query_param("user", "admin"))
        .and(query_param("password", "p&ss word"))
        .respond_with(ResponseTemplate::new(200).set_body_json(power_body("OFF")))
        .expect(1)
        .mount(&server)
        .await;

    let mut mapping = mapping_for(&server);
    mapping.credentials =
        Some(Credentials { username: "admin".to_string(), password: "p&ss word".to_string() });

    let reported = updater().push(&mapping, false).await;
    assert!(!reported.expect("credentials matched"));
}

#[tokio::test]
async fn test_push_maps_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cm"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;

    let err = updater().push(&mapping_for(&server), true).await.expect_err("401 is a failure");
    assert!(matches!(err, UpdateError::Status { status: 401, .. }), "got {err:?}");
    assert_eq!(err.address(), server.address().to_string());
}

#[tokio::test]
async fn test_push_rejects_body_without_power() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cm"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let err = updater().push(&mapping_for(&server), true).await.expect_err("not JSON");
    assert!(matches!(err, UpdateError::InvalidResponse { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_push_to_unreachable_device_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let address = listener.local_addr().expect("local addr").to_string();
    drop(listener);
    let mapping = DeviceMapping::new("lamp", address, 3);

    let err = updater().push(&mapping, true).await.expect_err("nothing listening");
    assert!(matches!(err, UpdateError::Transport { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_hanging_device_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cm"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(power_body("ON"))
                .set_delay(std::time::Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let client = TasmotaClient::with_timeout(1).expect("client builds");
    let started = std::time::Instant::now();
    let err = client.push(&mapping_for(&server), true).await.expect_err("request must time out");

    assert!(matches!(err, UpdateError::Transport { .. }), "got {err:?}");
    assert!(started.elapsed() < std::time::Duration::from_secs(4));
}

#[tokio::test]
async fn test_output_source_reads_status_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/outputs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": [{ "id": 1, "status": 1 }, { "id": 2, "status": 0 }],
            "extra": "ignored"
        })))
        .mount(&server)
        .await;

    let client = create_client(2).expect("client builds");
    let source = HttpOutputSource::new(client, format!("{}/api/outputs", server.uri()));
    let snapshot = source.fetch().await.expect("payload is valid");

    assert!(snapshot.find(1).expect("output 1").is_on());
    assert!(!snapshot.find(2).expect("output 2").is_on());
    assert!(snapshot.find(3).is_none());
}

#[tokio::test]
async fn test_output_source_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ok": true })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = create_client(2).expect("client builds");

    let missing = HttpOutputSource::new(client.clone(), format!("{}/missing", server.uri()));
    assert!(matches!(missing.fetch().await, Err(FetchError::MissingStatus)));

    let broken = HttpOutputSource::new(client, format!("{}/broken", server.uri()));
    assert!(matches!(broken.fetch().await, Err(FetchError::Status(503))));
}

#[tokio::test]
async fn test_sync_flow_against_mock_devices() {
    let controller_api = MockServer::start().await;
    let healthy = MockServer::start().await;
    let broken = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/outputs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": [{ "id": 1, "status": 1 }, { "id": 2, "status": 1 }]
        })))
        .mount(&controller_api)
        .await;
    Mock::given(method("GET"))
        .and(path("/cm"))
        .and(query_param("cmnd", "Power 1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(power_body("ON")))
        .expect(1)
        .mount(&healthy)
        .await;
    Mock::given(method("GET"))
        .and(path("/cm"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&broken)
        .await;

    let config = BridgeConfig {
        max_retries: 1,
        clear_interval: 30,
        tasmota_mapping: vec![
            DeviceMappingConfig::new("broken", broken.address().to_string(), 2),
            DeviceMappingConfig::new("healthy", healthy.address().to_string(), 1),
        ],
        ..BridgeConfig::default()
    };
    let controller = SyncController::new(config, Arc::new(MemoryConfigStore::new()));
    let source = HttpOutputSource::new(
        create_client(2).expect("client builds"),
        format!("{}/outputs", controller_api.uri()),
    );
    let reconciler = controller.reconciler(Arc::new(source), Arc::new(updater()));

    let first = reconciler.tick().await;
    assert_eq!(
        first,
        TickOutcome::Completed(TickReport { pushed: 1, failed: 1, ..TickReport::default() })
    );

    // Second failure exceeds max_retries=1 and starts the cooldown.
    let second = reconciler.tick().await;
    assert_eq!(
        second,
        TickOutcome::Completed(TickReport { failed: 1, unchanged: 1, ..TickReport::default() })
    );

    let third = reconciler.tick().await;
    let expected = TickReport { cooling_down: 1, unchanged: 1, ..TickReport::default() };
    assert_eq!(third, TickOutcome::Completed(expected));

    let status = controller.status();
    assert_eq!(status.devices[0].failure_count, 2);
    assert!(status.devices[0].cooldown_until.is_some());
    assert_eq!(status.devices[1].last_pushed, Some(true));
}
