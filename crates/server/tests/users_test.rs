mod common;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;

fn auth_header(token: &str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("authorization"),
        format!("Bearer {}", token).parse().unwrap(),
    )
}

async fn setup() -> (TestServer, sqlx::SqlitePool) {
    let pool = common::setup_test_db().await;
    let app = common::create_test_app(pool.clone());
    let server = TestServer::new(app).unwrap();
    (server, pool)
}

#[tokio::test]
async fn get_me_returns_profile() {
    let (server, pool) = setup().await;
    let (user_id, token) = common::create_test_user(&pool, "alice").await;

    let (h, v) = auth_header(&token);
    let res = server.get("/api/users/me").add_header(h, v).await;

    res.assert_status_ok();
    let body: serde_json::Value = res.json();
    assert_eq!(body["id"], user_id);
    assert_eq!(body["username"], "alice");
    assert!(body["lastActive"].is_null());
}

#[tokio::test]
async fn get_me_without_auth_returns_401() {
    let (server, _pool) = setup().await;
    let res = server.get("/api/users/me").await;
    res.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_session_is_rejected() {
    let (server, pool) = setup().await;
    let (user_id, _token) = common::create_test_user(&pool, "alice").await;

    let stale = uuid::Uuid::new_v4().to_string();
    let expired_at = (chrono::Utc::now() - chrono::Duration::days(1)).to_rfc3339();
    sqlx::query("INSERT INTO sessions (token, user_id, expires_at) VALUES (?, ?, ?)")
        .bind(&stale)
        .bind(user_id)
        .bind(&expired_at)
        .execute(&pool)
        .await
        .unwrap();

    let (h, v) = auth_header(&stale);
    let res = server.get("/api/users/me").add_header(h, v).await;
    res.assert_status(StatusCode::UNAUTHORIZED);
}
