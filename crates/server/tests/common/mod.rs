#![allow(dead_code)]

pub mod ws_helpers;

use amora_server::{config::Config, db, routes, ws, AppState};
use axum::Router;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::sync::Arc;

/// Create an in-memory SQLite pool with schema applied.
pub async fn setup_test_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory SQLite pool");

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await
        .unwrap();

    db::run_schema(&pool).await.unwrap();

    pool
}

/// Build the shared app state around the given pool.
pub fn test_state(pool: SqlitePool) -> Arc<AppState> {
    Arc::new(AppState {
        db: pool,
        config: Config {
            host: "127.0.0.1".into(),
            port: 0,
            database_path: ":memory:".into(),
            reaction_retry_max: 5,
        },
        gateway: Arc::new(ws::gateway::GatewayState::new()),
    })
}

/// Build a test Axum app with the given pool.
pub fn create_test_app(pool: SqlitePool) -> Router {
    routes::build_router(test_state(pool))
}

/// Create a test user with a valid session. Returns (user_id, session_token).
pub async fn create_test_user(pool: &SqlitePool, username: &str) -> (i64, String) {
    let result = sqlx::query("INSERT INTO users (username) VALUES (?)")
        .bind(username)
        .execute(pool)
        .await
        .unwrap();
    let user_id = result.last_insert_rowid();

    let token = uuid::Uuid::new_v4().to_string();
    let expires_at = (chrono::Utc::now() + chrono::Duration::days(30)).to_rfc3339();

    sqlx::query("INSERT INTO sessions (token, user_id, expires_at) VALUES (?, ?, ?)")
        .bind(&token)
        .bind(user_id)
        .bind(&expires_at)
        .execute(pool)
        .await
        .unwrap();

    (user_id, token)
}

/// Insert a message row directly. Returns the message id.
pub async fn insert_test_message(
    pool: &SqlitePool,
    sender_id: i64,
    receiver_id: i64,
    content: &str,
) -> String {
    let id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        r#"INSERT INTO messages (id, sender_id, receiver_id, content, message_type, status, reactions, created_at, updated_at)
           VALUES (?, ?, ?, ?, 'text', 'sent', '[]', ?, ?)"#,
    )
    .bind(&id)
    .bind(sender_id)
    .bind(receiver_id)
    .bind(content)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await
    .unwrap();

    id
}

/// Insert a schedule row directly. Returns the schedule id.
pub async fn insert_test_schedule(
    pool: &SqlitePool,
    sender_id: i64,
    receiver_id: i64,
    date: &str,
) -> i64 {
    let result =
        sqlx::query("INSERT INTO schedules (sender_id, receiver_id, date) VALUES (?, ?, ?)")
            .bind(sender_id)
            .bind(receiver_id)
            .bind(date)
            .execute(pool)
            .await
            .unwrap();

    result.last_insert_rowid()
}
