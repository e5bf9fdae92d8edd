#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use phasewatch::Workspace;
use rusqlite::Connection;
use serde_json::Value;
use tempfile::TempDir;

/// A fresh workspace directory named `todo-app` inside a temp dir.
pub fn workspace() -> (TempDir, Workspace) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let root = dir.path().join("todo-app");
    std::fs::create_dir_all(&root).expect("Failed to create workspace");
    (dir, Workspace::new(root))
}

/// Create `features.db` with the current schema (with a `phase` column).
pub fn create_store(workspace: &Workspace) -> Connection {
    let conn = Connection::open(workspace.features_db()).expect("Failed to open features.db");
    conn.execute_batch(
        "CREATE TABLE features (
            id INTEGER PRIMARY KEY,
            priority INTEGER NOT NULL DEFAULT 0,
            category TEXT NOT NULL DEFAULT '',
            name TEXT NOT NULL,
            description TEXT,
            passes BOOLEAN NOT NULL DEFAULT 0,
            phase INTEGER NOT NULL DEFAULT 1
        )",
    )
    .expect("Failed to create features table");
    conn
}

/// Create `features.db` as written before phases existed.
pub fn create_legacy_store(workspace: &Workspace) -> Connection {
    let conn = Connection::open(workspace.features_db()).expect("Failed to open features.db");
    conn.execute_batch(
        "CREATE TABLE features (
            id INTEGER PRIMARY KEY,
            priority INTEGER NOT NULL DEFAULT 0,
            category TEXT NOT NULL DEFAULT '',
            name TEXT NOT NULL,
            passes BOOLEAN NOT NULL DEFAULT 0
        )",
    )
    .expect("Failed to create features table");
    conn
}

pub fn insert_feature(
    conn: &Connection,
    id: i64,
    category: &str,
    name: &str,
    priority: i64,
    phase: u32,
    passes: bool,
) {
    conn.execute(
        "INSERT INTO features (id, priority, category, name, passes, phase) VALUES (?, ?, ?, ?, ?, ?)",
        (id, priority, category, name, passes, phase),
    )
    .expect("Failed to insert feature");
}

pub fn insert_legacy_feature(conn: &Connection, id: i64, name: &str, passes: bool) {
    conn.execute(
        "INSERT INTO features (id, priority, category, name, passes) VALUES (?, ?, '', ?, ?)",
        (id, id, name, passes),
    )
    .expect("Failed to insert feature");
}

pub fn set_passes(conn: &Connection, id: i64, passes: bool) {
    conn.execute("UPDATE features SET passes = ? WHERE id = ?", (passes, id))
        .expect("Failed to update feature");
}

// ============================================================
// Webhook recorder
// ============================================================

type Received = Arc<Mutex<Vec<Value>>>;

/// Local webhook endpoint that records every JSON body it receives.
pub struct Webhook {
    pub url: String,
    received: Received,
}

impl Webhook {
    pub fn received(&self) -> Vec<Value> {
        self.received.lock().expect("recorder lock poisoned").clone()
    }
}

#[derive(Clone)]
struct HookState {
    received: Received,
    status: StatusCode,
    delay: Duration,
}

async fn record(State(state): State<HookState>, Json(body): Json<Value>) -> StatusCode {
    state
        .received
        .lock()
        .expect("recorder lock poisoned")
        .push(body);
    tokio::time::sleep(state.delay).await;
    state.status
}

pub async fn spawn_webhook_with(status: StatusCode, delay: Duration) -> Webhook {
    let received: Received = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new().route("/hook", post(record)).with_state(HookState {
        received: received.clone(),
        status,
        delay,
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind webhook listener");
    let addr = listener.local_addr().expect("No local address");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Webhook {
        url: format!("http://{}/hook", addr),
        received,
    }
}

pub async fn spawn_webhook() -> Webhook {
    spawn_webhook_with(StatusCode::OK, Duration::ZERO).await
}

/// A URL nothing is listening on.
pub async fn dead_endpoint() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind listener");
    let addr = listener.local_addr().expect("No local address");
    drop(listener);
    format!("http://{}/hook", addr)
}
