mod support;

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use support::{start_ok, wait_for, CannedResponse, MockBackend};
use todos_desktop_lib::test_support::sign_in_harness;

const LONG_TIMEOUT: Duration = Duration::from_secs(600);

#[tokio::test]
async fn callback_resolves_and_exchange_returns_custom_token() {
    let backend = MockBackend::spawn(
        start_ok("abc123"),
        CannedResponse::ok(json!({ "customToken": "tok_xyz" })),
    )
    .await;
    let harness = Arc::new(sign_in_harness(&backend.base_url(), LONG_TIMEOUT).expect("harness"));

    let attempt = tokio::spawn({
        let harness = harness.clone();
        async move { harness.sign_in().await }
    });

    wait_for(|| harness.is_pending("abc123")).await;
    assert_eq!(harness.opened_urls(), vec!["https://provider/authorize"]);

    assert_eq!(
        harness.deliver_callback("app-scheme://callback?sid=abc123"),
        "resolved"
    );
    let token = attempt.await.expect("join").expect("token");
    assert_eq!(token, "tok_xyz");

    let starts = backend.start_requests();
    assert_eq!(starts.len(), 1);
    let nonce = starts[0]["clientNonce"].as_str().expect("nonce").to_string();
    assert!(!nonce.is_empty());
    assert_eq!(
        backend.exchange_requests(),
        vec![json!({ "sid": "abc123", "clientNonce": nonce })]
    );
    assert_eq!(harness.pending_count(), 0);

    // Replay after consumption is a silent no-op.
    assert_eq!(
        harness.deliver_callback("app-scheme://callback?sid=abc123"),
        "unknown_session"
    );
    assert_eq!(backend.exchange_requests().len(), 1);
}

#[tokio::test]
async fn missing_callback_times_out_and_late_callback_is_unknown() {
    let backend = MockBackend::spawn(
        start_ok("def456"),
        CannedResponse::ok(json!({ "customToken": "never" })),
    )
    .await;
    let harness =
        sign_in_harness(&backend.base_url(), Duration::from_millis(200)).expect("harness");

    let err = harness.sign_in().await.expect_err("timeout");
    assert!(err.starts_with("AUTH_TIMEOUT:"), "{err}");
    assert!(!harness.is_pending("def456"));

    assert_eq!(
        harness.deliver_callback("app-scheme://callback?sid=def456"),
        "unknown_session"
    );
    assert!(backend.exchange_requests().is_empty());
}

#[tokio::test]
async fn start_http_500_fails_without_registering() {
    let backend = MockBackend::spawn(
        CannedResponse::status(500, json!({ "error": "boom" })),
        CannedResponse::ok(json!({ "customToken": "never" })),
    )
    .await;
    let harness = sign_in_harness(&backend.base_url(), LONG_TIMEOUT).expect("harness");

    let err = harness.sign_in().await.expect_err("start failure");
    assert!(err.starts_with("AUTH_START_FAILED:"), "{err}");
    assert!(err.contains("status=500"), "{err}");
    assert_eq!(harness.pending_count(), 0);
    assert!(harness.opened_urls().is_empty());
}

#[tokio::test]
async fn start_transport_error_is_a_start_failure() {
    // Bind then drop to get a port with nothing listening.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr").port()
    };
    let harness =
        sign_in_harness(&format!("http://127.0.0.1:{port}"), LONG_TIMEOUT).expect("harness");

    let err = harness.sign_in().await.expect_err("transport failure");
    assert!(err.starts_with("AUTH_START_FAILED:"), "{err}");
    assert_eq!(harness.pending_count(), 0);
}

#[tokio::test]
async fn exchange_error_surfaces_backend_message() {
    let backend = MockBackend::spawn(
        start_ok("ghi789"),
        CannedResponse::status(403, json!({ "error": "nonce mismatch" })),
    )
    .await;
    let harness = Arc::new(sign_in_harness(&backend.base_url(), LONG_TIMEOUT).expect("harness"));

    let attempt = tokio::spawn({
        let harness = harness.clone();
        async move { harness.sign_in().await }
    });
    wait_for(|| harness.is_pending("ghi789")).await;
    harness.deliver_callback("app-scheme://callback?sid=ghi789");

    let err = attempt.await.expect("join").expect_err("exchange failure");
    assert_eq!(err, "AUTH_EXCHANGE_FAILED: nonce mismatch");
}

#[tokio::test]
async fn exchange_error_without_message_uses_generic_text() {
    let backend = MockBackend::spawn(
        start_ok("jkl012"),
        CannedResponse::status(500, json!({})),
    )
    .await;
    let harness = Arc::new(sign_in_harness(&backend.base_url(), LONG_TIMEOUT).expect("harness"));

    let attempt = tokio::spawn({
        let harness = harness.clone();
        async move { harness.sign_in().await }
    });
    wait_for(|| harness.is_pending("jkl012")).await;
    harness.deliver_callback("app-scheme://callback?sid=jkl012");

    let err = attempt.await.expect("join").expect_err("exchange failure");
    assert_eq!(err, "AUTH_EXCHANGE_FAILED: token exchange failed");
}

#[tokio::test]
async fn stray_callbacks_do_not_disturb_pending_attempt() {
    let backend = MockBackend::spawn(
        start_ok("mno345"),
        CannedResponse::ok(json!({ "customToken": "tok_ok" })),
    )
    .await;
    let harness = Arc::new(sign_in_harness(&backend.base_url(), LONG_TIMEOUT).expect("harness"));

    let attempt = tokio::spawn({
        let harness = harness.clone();
        async move { harness.sign_in().await }
    });
    wait_for(|| harness.is_pending("mno345")).await;

    assert_eq!(harness.deliver_callback("app-scheme://callback"), "missing_sid");
    assert_eq!(
        harness.deliver_callback("app-scheme://callback?sid=someone-else"),
        "unknown_session"
    );
    assert_eq!(
        harness.deliver_callback("https://evil.example/callback?sid=mno345"),
        "not_a_callback"
    );
    assert!(harness.is_pending("mno345"));
    assert!(backend.exchange_requests().is_empty());

    // Second-instance activation carries the real callback in argv.
    let routed = harness.deliver_second_instance_args(&[
        "/opt/todos/todos-desktop",
        "app-scheme://callback?sid=mno345&state=ignored",
    ]);
    assert_eq!(routed, 1);
    assert_eq!(attempt.await.expect("join").expect("token"), "tok_ok");
}
