mod common;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::json;
use tokio::sync::mpsc;

fn auth_header(token: &str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("authorization"),
        format!("Bearer {}", token).parse().unwrap(),
    )
}

async fn setup() -> (TestServer, std::sync::Arc<amora_server::AppState>) {
    let pool = common::setup_test_db().await;
    let state = common::test_state(pool);
    let server = TestServer::new(amora_server::routes::build_router(state.clone())).unwrap();
    (server, state)
}

/// Attach a fake fabric connection for a user and return its outbox.
async fn fake_connection(
    state: &amora_server::AppState,
    user_id: i64,
    username: &str,
) -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    let cid = state.gateway.next_client_id().await;
    state
        .gateway
        .register(cid, user_id, username.into(), tx)
        .await;
    rx
}

async fn ringing_call(
    server: &TestServer,
    caller_token: &str,
    receiver_id: i64,
) -> serde_json::Value {
    let (h, v) = auth_header(caller_token);
    let res = server
        .post("/api/calls")
        .add_header(h, v)
        .json(&json!({ "receiverId": receiver_id }))
        .await;
    res.assert_status_ok();
    res.json()
}

#[tokio::test]
async fn initiate_creates_ringing_call_and_notifies_receiver() {
    let (server, state) = setup().await;
    let (_alice, alice_token) = common::create_test_user(&state.db, "alice").await;
    let (bob, bob_token) = common::create_test_user(&state.db, "bob").await;
    let _ = bob_token;

    let mut bob_rx = fake_connection(&state, bob, "bob").await;

    let call = ringing_call(&server, &alice_token, bob).await;
    assert_eq!(call["status"], "ringing");
    assert!(call["endedAt"].is_null());

    let event: serde_json::Value =
        serde_json::from_str(&bob_rx.try_recv().unwrap()).unwrap();
    assert_eq!(event["type"], "incoming-call");
    assert_eq!(event["call"]["id"], call["id"]);
    assert_eq!(event["callerUsername"], "alice");
}

#[tokio::test]
async fn accept_moves_to_ongoing_without_ended_at() {
    let (server, state) = setup().await;
    let (alice, alice_token) = common::create_test_user(&state.db, "alice").await;
    let (bob, bob_token) = common::create_test_user(&state.db, "bob").await;

    let call = ringing_call(&server, &alice_token, bob).await;

    let (h, v) = auth_header(&bob_token);
    let res = server
        .post("/api/calls/respond")
        .add_header(h, v)
        .json(&json!({
            "callId": call["id"],
            "callerId": alice,
            "receiverId": bob,
            "response": "accepted",
        }))
        .await;

    res.assert_status_ok();
    let body: serde_json::Value = res.json();
    assert_eq!(body["status"], "ongoing");
    assert!(body["call"]["endedAt"].is_null());
}

#[tokio::test]
async fn decline_stamps_ended_at_and_notifies_caller() {
    let (server, state) = setup().await;
    let (alice, alice_token) = common::create_test_user(&state.db, "alice").await;
    let (bob, bob_token) = common::create_test_user(&state.db, "bob").await;

    let mut alice_rx = fake_connection(&state, alice, "alice").await;
    let call = ringing_call(&server, &alice_token, bob).await;

    let (h, v) = auth_header(&bob_token);
    let res = server
        .post("/api/calls/respond")
        .add_header(h, v)
        .json(&json!({
            "callId": call["id"],
            "callerId": alice,
            "receiverId": bob,
            "response": "declined",
        }))
        .await;

    res.assert_status_ok();
    let body: serde_json::Value = res.json();
    assert_eq!(body["status"], "declined");
    assert!(body["call"]["endedAt"].is_string());

    // call-response lands on the caller's private address.
    let events: Vec<serde_json::Value> = std::iter::from_fn(|| {
        alice_rx
            .try_recv()
            .ok()
            .map(|s| serde_json::from_str(&s).unwrap())
    })
    .collect();
    let response = events
        .iter()
        .find(|e| e["type"] == "call-response")
        .expect("caller should receive call-response");
    assert_eq!(response["receiverId"], bob);
    assert_eq!(response["response"], "declined");
}

#[tokio::test]
async fn missing_parameters_is_validation_error() {
    let (server, state) = setup().await;
    let (_bob, bob_token) = common::create_test_user(&state.db, "bob").await;

    let (h, v) = auth_header(&bob_token);
    let res = server
        .post("/api/calls/respond")
        .add_header(h, v)
        .json(&json!({ "response": "accepted" }))
        .await;

    res.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json();
    assert_eq!(body["error"]["kind"], "validation");
}

#[tokio::test]
async fn unknown_response_verb_is_rejected() {
    let (server, state) = setup().await;
    let (alice, alice_token) = common::create_test_user(&state.db, "alice").await;
    let (bob, bob_token) = common::create_test_user(&state.db, "bob").await;

    let call = ringing_call(&server, &alice_token, bob).await;

    let (h, v) = auth_header(&bob_token);
    let res = server
        .post("/api/calls/respond")
        .add_header(h, v)
        .json(&json!({
            "callId": call["id"],
            "callerId": alice,
            "receiverId": bob,
            "response": "maybe",
        }))
        .await;

    res.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn respond_to_unknown_call_is_not_found() {
    let (server, state) = setup().await;
    let (alice, _) = common::create_test_user(&state.db, "alice").await;
    let (bob, bob_token) = common::create_test_user(&state.db, "bob").await;

    let (h, v) = auth_header(&bob_token);
    let res = server
        .post("/api/calls/respond")
        .add_header(h, v)
        .json(&json!({
            "callId": "no-such-call",
            "callerId": alice,
            "receiverId": bob,
            "response": "accepted",
        }))
        .await;

    res.assert_status(StatusCode::NOT_FOUND);
    let body: serde_json::Value = res.json();
    assert_eq!(body["error"]["kind"], "not_found");
}

#[tokio::test]
async fn second_response_conflicts() {
    let (server, state) = setup().await;
    let (alice, alice_token) = common::create_test_user(&state.db, "alice").await;
    let (bob, bob_token) = common::create_test_user(&state.db, "bob").await;

    let call = ringing_call(&server, &alice_token, bob).await;
    let respond = json!({
        "callId": call["id"],
        "callerId": alice,
        "receiverId": bob,
        "response": "accepted",
    });

    let (h, v) = auth_header(&bob_token);
    server
        .post("/api/calls/respond")
        .add_header(h.clone(), v.clone())
        .json(&respond)
        .await
        .assert_status_ok();

    let res = server
        .post("/api/calls/respond")
        .add_header(h, v)
        .json(&respond)
        .await;

    res.assert_status(StatusCode::CONFLICT);
    let body: serde_json::Value = res.json();
    assert_eq!(body["error"]["kind"], "conflict");
}
