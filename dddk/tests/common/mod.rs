//! Shared test utilities for dddk integration tests.
//!
//! `TestServer` runs an in-memory Datadog API on a random local port. Every
//! write is recorded as `"METHOD /v1/..."` so tests can assert exactly which
//! remote calls a push made.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Request, State};
use axum::http::{Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use dddk::{HttpClient, CREATED_BY_TAG, DESCRIPTION_TAG};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// What the fake Datadog currently holds.
#[derive(Debug, Default)]
pub struct Remote {
    pub dashboards: Vec<Value>,
    pub monitors: Vec<Value>,
    pub synthetics: Vec<Value>,
    pub slos: Vec<Value>,
    /// Last body written per `"{kind}/{id}"`.
    pub bodies: BTreeMap<String, Value>,
    pub calls: Vec<String>,
    /// Answer every write with a 500.
    pub fail_writes: bool,
    next_id: i64,
}

impl Remote {
    /// One owned resource of every kind, plus the monitor Datadog keeps for
    /// the synthetic.
    pub fn scenario() -> Self {
        Self {
            dashboards: vec![json!({
                "id": "111",
                "title": "Dashboard Name",
                "description": DESCRIPTION_TAG,
            })],
            monitors: vec![
                json!({ "id": 222, "name": "Monitor Name", "tags": [CREATED_BY_TAG] }),
                json!({
                    "id": 555,
                    "name": "[Synthetics] Synthetics Name",
                    "tags": [CREATED_BY_TAG],
                }),
            ],
            slos: vec![json!({ "id": "333", "name": "SLO Name", "tags": [CREATED_BY_TAG] })],
            synthetics: vec![json!({
                "public_id": "444",
                "name": "Synthetic Name",
                "tags": [CREATED_BY_TAG],
            })],
            next_id: 1000,
            ..Default::default()
        }
    }

    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

type Shared = Arc<Mutex<Remote>>;

/// Fake Datadog API server bound to 127.0.0.1 on a random port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub remote: Shared,
    shutdown_tx: tokio::sync::oneshot::Sender<()>,
}

impl TestServer {
    pub async fn spawn(remote: Remote) -> Self {
        let remote = Arc::new(Mutex::new(remote));
        let router = create_router(remote.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("Server error");
        });

        Self {
            addr,
            remote,
            shutdown_tx,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    pub fn client(&self) -> Arc<HttpClient> {
        Arc::new(
            HttpClient::new(&self.base_url(), "TEST", "TEST", Duration::from_secs(5))
                .expect("Failed to build client"),
        )
    }

    /// Writes recorded so far.
    pub fn calls(&self) -> Vec<String> {
        self.remote.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.remote.lock().unwrap().calls.clear();
    }

    pub fn body(&self, key: &str) -> Option<Value> {
        self.remote.lock().unwrap().bodies.get(key).cloned()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.remote.lock().unwrap().fail_writes = fail;
    }

    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
    }
}

fn create_router(remote: Shared) -> Router {
    Router::new()
        .route("/api/v1/dashboard", get(list_dashboards).post(create_dashboard))
        .route(
            "/api/v1/dashboard/{id}",
            put(update_dashboard).delete(delete_dashboard),
        )
        .route("/api/v1/monitor", get(list_monitors).post(create_monitor))
        .route(
            "/api/v1/monitor/{id}",
            put(update_monitor).delete(delete_monitor),
        )
        .route(
            "/api/v1/synthetics/tests",
            get(list_synthetics).post(create_synthetic),
        )
        .route("/api/v1/synthetics/tests/delete", post(delete_synthetics))
        .route("/api/v1/synthetics/tests/{id}", put(update_synthetic))
        .route("/api/v1/slo", get(list_slos).post(create_slo))
        .route("/api/v1/slo/{id}", put(update_slo).delete(delete_slo))
        .layer(middleware::from_fn_with_state(remote.clone(), record))
        .with_state(remote)
}

/// Checks the API keys and records every write.
async fn record(State(remote): State<Shared>, req: Request, next: Next) -> Response {
    let headers = req.headers();
    if !headers.contains_key("dd-api-key") || !headers.contains_key("dd-application-key") {
        return (StatusCode::FORBIDDEN, Json(json!({ "errors": ["Forbidden"] }))).into_response();
    }

    if req.method() != Method::GET {
        let call = format!(
            "{} {}",
            req.method(),
            req.uri().path().trim_start_matches("/api")
        );
        let fail = {
            let mut remote = remote.lock().unwrap();
            remote.calls.push(call);
            remote.fail_writes
        };
        if fail {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "errors": ["boom"] })),
            )
                .into_response();
        }
    }

    next.run(req).await
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "errors": ["Not found"] }))).into_response()
}

fn position(items: &[Value], key: &str, id: &Value) -> Option<usize> {
    items.iter().position(|item| &item[key] == id)
}

// =============================================================================
// Dashboards
// =============================================================================

async fn list_dashboards(State(remote): State<Shared>) -> Json<Value> {
    let remote = remote.lock().unwrap();
    Json(json!({ "dashboards": remote.dashboards }))
}

async fn create_dashboard(State(remote): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    let mut remote = remote.lock().unwrap();
    let id = format!("dash-{}", remote.next_id());
    remote.dashboards.push(json!({
        "id": id,
        "title": body["title"],
        "description": body["description"],
    }));
    remote.bodies.insert(format!("dashboard/{id}"), body.clone());
    Json(json!({ "id": id, "title": body["title"] }))
}

async fn update_dashboard(
    State(remote): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut remote = remote.lock().unwrap();
    let Some(i) = position(&remote.dashboards, "id", &json!(id)) else {
        return not_found();
    };
    remote.dashboards[i]["title"] = body["title"].clone();
    remote.dashboards[i]["description"] = body["description"].clone();
    remote.bodies.insert(format!("dashboard/{id}"), body.clone());
    Json(json!({ "id": id, "title": body["title"] })).into_response()
}

async fn delete_dashboard(State(remote): State<Shared>, Path(id): Path<String>) -> Response {
    let mut remote = remote.lock().unwrap();
    let Some(i) = position(&remote.dashboards, "id", &json!(id)) else {
        return not_found();
    };
    remote.dashboards.remove(i);
    Json(json!({ "deleted_dashboard_id": id })).into_response()
}

// =============================================================================
// Monitors
// =============================================================================

async fn list_monitors(State(remote): State<Shared>) -> Json<Value> {
    let remote = remote.lock().unwrap();
    Json(Value::Array(remote.monitors.clone()))
}

async fn create_monitor(State(remote): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    let mut remote = remote.lock().unwrap();
    let id = remote.next_id();
    remote.monitors.push(json!({
        "id": id,
        "name": body["name"],
        "tags": body["tags"],
    }));
    remote.bodies.insert(format!("monitor/{id}"), body.clone());
    Json(json!({ "id": id, "name": body["name"] }))
}

async fn update_monitor(
    State(remote): State<Shared>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let mut remote = remote.lock().unwrap();
    let Some(i) = position(&remote.monitors, "id", &json!(id)) else {
        return not_found();
    };
    remote.monitors[i]["name"] = body["name"].clone();
    remote.monitors[i]["tags"] = body["tags"].clone();
    remote.bodies.insert(format!("monitor/{id}"), body.clone());
    Json(json!({ "id": id, "name": body["name"] })).into_response()
}

async fn delete_monitor(State(remote): State<Shared>, Path(id): Path<i64>) -> Response {
    let mut remote = remote.lock().unwrap();
    let Some(i) = position(&remote.monitors, "id", &json!(id)) else {
        return not_found();
    };
    remote.monitors.remove(i);
    Json(json!({ "deleted_monitor_id": id })).into_response()
}

// =============================================================================
// Synthetics
// =============================================================================

async fn list_synthetics(State(remote): State<Shared>) -> Json<Value> {
    let remote = remote.lock().unwrap();
    Json(json!({ "tests": remote.synthetics }))
}

/// Like Datadog, also creates the `[Synthetics] <name>` monitor.
async fn create_synthetic(State(remote): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    let mut remote = remote.lock().unwrap();
    let public_id = format!("syn-{}", remote.next_id());
    remote.synthetics.push(json!({
        "public_id": public_id,
        "name": body["name"],
        "tags": body["tags"],
    }));

    let monitor_id = remote.next_id();
    let monitor_name = format!("[Synthetics] {}", body["name"].as_str().unwrap_or_default());
    remote.monitors.push(json!({
        "id": monitor_id,
        "name": monitor_name,
        "tags": body["tags"],
    }));

    remote.bodies.insert(format!("synthetic/{public_id}"), body.clone());
    Json(json!({ "public_id": public_id, "name": body["name"] }))
}

async fn update_synthetic(
    State(remote): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut remote = remote.lock().unwrap();
    let Some(i) = position(&remote.synthetics, "public_id", &json!(id)) else {
        return not_found();
    };
    remote.synthetics[i]["tags"] = body["tags"].clone();
    remote.bodies.insert(format!("synthetic/{id}"), body.clone());
    Json(json!({ "public_id": id, "name": body["name"] })).into_response()
}

async fn delete_synthetics(State(remote): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    let mut remote = remote.lock().unwrap();
    let ids: Vec<Value> = body["public_ids"].as_array().cloned().unwrap_or_default();
    remote
        .synthetics
        .retain(|s| !ids.contains(&s["public_id"]));
    let deleted: Vec<Value> = ids
        .iter()
        .map(|id| json!({ "public_id": id }))
        .collect();
    Json(json!({ "deleted_tests": deleted }))
}

// =============================================================================
// SLOs
// =============================================================================

async fn list_slos(State(remote): State<Shared>) -> Json<Value> {
    let remote = remote.lock().unwrap();
    Json(json!({ "data": remote.slos, "error": null }))
}

async fn create_slo(State(remote): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    let mut remote = remote.lock().unwrap();
    let id = format!("slo-{}", remote.next_id());
    remote.slos.push(json!({
        "id": id,
        "name": body["name"],
        "tags": body["tags"],
    }));
    remote.bodies.insert(format!("slo/{id}"), body.clone());
    Json(json!({ "data": [{ "id": id, "name": body["name"] }], "error": null }))
}

async fn update_slo(
    State(remote): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut remote = remote.lock().unwrap();
    let Some(i) = position(&remote.slos, "id", &json!(id)) else {
        return not_found();
    };
    remote.slos[i]["name"] = body["name"].clone();
    remote.slos[i]["tags"] = body["tags"].clone();
    remote.bodies.insert(format!("slo/{id}"), body.clone());
    Json(json!({ "data": [{ "id": id, "name": body["name"] }], "error": null })).into_response()
}

async fn delete_slo(State(remote): State<Shared>, Path(id): Path<String>) -> Response {
    let mut remote = remote.lock().unwrap();
    let Some(i) = position(&remote.slos, "id", &json!(id)) else {
        return not_found();
    };
    remote.slos.remove(i);
    Json(json!({ "data": [id], "error": null })).into_response()
}
