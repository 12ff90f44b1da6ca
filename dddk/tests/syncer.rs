//! Syncer integration tests against a fake Datadog API.

mod common;

use std::sync::Arc;

use common::{Remote, TestServer};
use dddk::api::{
    Assertion, Dashboard, Monitor, Request, Slo, Synthetic, SyntheticConfig,
    SyntheticOptions, SyntheticRequest, TimeSeries, WidgetDefinition,
};
use dddk::app::manifest::parse_manifest;
use dddk::{DatadogApi, Error, LockFile, Stats, Syncer};
use serde_json::json;
use tempfile::TempDir;

async fn scenario() -> (TestServer, Syncer) {
    let server = TestServer::spawn(Remote::scenario()).await;
    let syncer = Syncer::create(server.client(), LockFile::default(), false)
        .await
        .unwrap();
    (server, syncer)
}

fn stats(skipped: u32, updated: u32, created: u32, deleted: u32) -> Stats {
    Stats {
        skipped,
        updated,
        created,
        deleted,
    }
}

fn changed_dashboard() -> Dashboard {
    let mut board = Dashboard::new("Dashboard Name");
    board.widgets.push(
        WidgetDefinition::Timeseries(TimeSeries {
            requests: vec![Request {
                q: Some("different".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        })
        .into(),
    );
    board
}

#[tokio::test]
async fn test_updating_dashboards() {
    let (server, mut syncer) = scenario().await;

    syncer.sync_dashboard(changed_dashboard()).await.unwrap();
    syncer.sync_dashboard(changed_dashboard()).await.unwrap();

    assert_eq!(server.calls(), vec!["PUT /v1/dashboard/111"]);
    assert_eq!(syncer.stats().dashboards, stats(1, 1, 0, 0));

    let body = server.body("dashboard/111").unwrap();
    assert_eq!(body["description"], json!(dddk::DESCRIPTION_TAG));
    assert_eq!(body["widgets"][0]["definition"]["type"], json!("timeseries"));

    server.shutdown().await;
}

#[tokio::test]
async fn test_updating_monitors() {
    let (server, mut syncer) = scenario().await;

    let mut monitor = Monitor::new("query alert", "asdf", "asdf");
    monitor.name = "Monitor Name".to_string();

    let first = syncer.sync_monitor(monitor.clone()).await.unwrap();
    let second = syncer.sync_monitor(monitor).await.unwrap();

    assert_eq!(first, 222);
    assert_eq!(second, 222);
    assert_eq!(server.calls(), vec!["PUT /v1/monitor/222"]);
    assert_eq!(
        server.body("monitor/222").unwrap()["tags"],
        json!([dddk::CREATED_BY_TAG])
    );

    server.shutdown().await;
}

#[tokio::test]
async fn test_creating_slos() {
    let (server, mut syncer) = scenario().await;

    let slo = Slo {
        name: "Slo Name".to_string(),
        kind: "monitor".to_string(),
        description: Some("asdf".to_string()),
        monitor_ids: vec![],
        thresholds: vec![],
        tags: vec![],
    };

    let id = syncer.sync_slo(slo.clone()).await.unwrap();
    syncer.sync_slo(slo).await.unwrap();

    assert_eq!(server.calls(), vec!["POST /v1/slo"]);
    assert_eq!(syncer.stats().slos, stats(1, 0, 1, 0));
    assert!(syncer.lock_file().slos.contains_key(&id));

    server.shutdown().await;
}

#[tokio::test]
async fn test_updating_synthetics() {
    let (server, mut syncer) = scenario().await;

    let synthetic = Synthetic {
        name: "Synthetic Name".to_string(),
        kind: "api".to_string(),
        subtype: None,
        message: "Updated message".to_string(),
        tags: vec![],
        locations: vec![],
        config: SyntheticConfig {
            request: SyntheticRequest {
                method: "GET".to_string(),
                url: "asdf".to_string(),
                timeout: None,
                port: None,
                headers: None,
                body: None,
            },
            assertions: vec![Assertion {
                kind: "statusCode".to_string(),
                operator: "is".to_string(),
                target: json!(200),
                property: None,
            }],
        },
        options: SyntheticOptions {
            tick_every: 1,
            ..Default::default()
        },
        status: None,
    };

    syncer.sync_synthetic(synthetic.clone()).await.unwrap();
    syncer.sync_synthetic(synthetic).await.unwrap();

    assert_eq!(server.calls(), vec!["PUT /v1/synthetics/tests/444"]);
    assert_eq!(syncer.stats().synthetics, stats(1, 1, 0, 0));

    server.shutdown().await;
}

#[tokio::test]
async fn test_deletes_unseen() {
    let (server, mut syncer) = scenario().await;

    syncer.sync_dashboard(changed_dashboard()).await.unwrap();
    syncer.delete_unseen().await.unwrap();

    assert_eq!(
        server.calls(),
        vec![
            "PUT /v1/dashboard/111",
            "DELETE /v1/slo/333",
            "POST /v1/synthetics/tests/delete",
            "DELETE /v1/monitor/222",
        ]
    );

    let stats = syncer.stats();
    assert_eq!(stats.dashboards, self::stats(0, 1, 0, 0));
    assert_eq!(stats.monitors.deleted, 1);
    assert_eq!(stats.slos.deleted, 1);
    assert_eq!(stats.synthetics.deleted, 1);

    // The synthetic's own monitor is left to Datadog.
    let remote = server.remote.lock().unwrap();
    assert_eq!(remote.monitors.len(), 1);
    assert_eq!(remote.monitors[0]["id"], json!(555));
    drop(remote);

    server.shutdown().await;
}

const CHECKOUT: &str = r#"
name: Checkout
team:
  warning_contact: "@slack-checkout"
  alert_contact: "@pagerduty-checkout"
components:
  - healthcheck: { url: "https://checkout.example.com/health" }
  - alb: { name: checkout-alb }
  - warning_monitor:
      name: Checkout queue is long
      type: metric alert
      query: "avg(last_5m):avg:checkout.queue{*} > 100"
      message: "queue is long"
      tags: ["dddk:alert_graph"]
"#;

#[tokio::test]
async fn test_push_is_idempotent() {
    let server = TestServer::spawn(Remote::scenario()).await;
    let app = parse_manifest(CHECKOUT, false).unwrap().into_app();
    let dir = TempDir::new().unwrap();
    let lock_path = dir.path().join("lock.json");

    // First run creates the app and sweeps the scenario resources.
    let lock = LockFile::load(&lock_path).await.unwrap();
    let mut syncer = Syncer::create(server.client(), lock, false).await.unwrap();
    syncer.push(std::slice::from_ref(&app), None).await.unwrap();
    syncer.lock_file().save(&lock_path).await.unwrap();

    let first = syncer.stats();
    assert_eq!(first.synthetics.created, 1);
    assert_eq!(first.monitors.created, 3);
    assert_eq!(first.slos.created, 1);
    assert_eq!(first.dashboards.created, 1);
    assert_eq!(first.dashboards.deleted, 1);

    let calls = server.calls();
    let created: Vec<&str> = calls
        .iter()
        .map(String::as_str)
        .filter(|c| c.starts_with("POST") && !c.ends_with("/delete"))
        .collect();
    assert_eq!(
        created,
        vec![
            "POST /v1/synthetics/tests",
            "POST /v1/monitor",
            "POST /v1/monitor",
            "POST /v1/monitor",
            "POST /v1/slo",
            "POST /v1/dashboard",
        ]
    );

    // The SLO covers the synthetic's monitor and the outage monitor, and
    // leads the dashboard.
    let slo_id = syncer.lock_file().slos.keys().next().cloned().unwrap();
    let slo = server.body(&format!("slo/{slo_id}")).unwrap();
    assert_eq!(slo["monitor_ids"].as_array().unwrap().len(), 2);
    assert_eq!(slo["name"], json!("Checkout SLO"));

    let board_id = syncer.lock_file().dashboards.keys().next().cloned().unwrap();
    let board = server.body(&format!("dashboard/{board_id}")).unwrap();
    assert_eq!(board["widgets"][0]["definition"]["type"], json!("slo"));
    assert_eq!(board["widgets"][0]["definition"]["slo_id"], json!(slo_id));
    let widgets = board["widgets"].as_array().unwrap();
    assert_eq!(
        widgets.last().unwrap()["definition"]["type"],
        json!("alert_graph")
    );

    // Second run against the saved lock file makes no writes.
    server.clear_calls();
    let lock = LockFile::load(&lock_path).await.unwrap();
    let mut syncer = Syncer::create(server.client(), lock, false).await.unwrap();
    syncer.push(std::slice::from_ref(&app), None).await.unwrap();

    assert!(server.calls().is_empty());
    let second = syncer.stats();
    assert_eq!(second.monitors, stats(3, 0, 0, 0));
    assert_eq!(second.synthetics, stats(1, 0, 0, 0));
    assert_eq!(second.slos, stats(1, 0, 0, 0));
    assert_eq!(second.dashboards, stats(1, 0, 0, 0));

    server.shutdown().await;
}

#[tokio::test]
async fn test_name_filter_skips_sweep() {
    let (server, mut syncer) = scenario().await;
    let app = parse_manifest(CHECKOUT, false).unwrap().into_app();

    syncer.push(&[app], Some("checkout")).await.unwrap();

    assert!(server
        .calls()
        .iter()
        .all(|c| !c.starts_with("DELETE") && !c.ends_with("/delete")));
    assert_eq!(syncer.stats().dashboards.created, 1);

    server.shutdown().await;
}

#[tokio::test]
async fn test_api_errors_abort() {
    let (server, mut syncer) = scenario().await;
    server.set_fail_writes(true);

    let err = syncer.sync_dashboard(changed_dashboard()).await.unwrap_err();
    match err {
        Error::Api { status, body } => {
            assert_eq!(status, 500);
            assert!(body.contains("boom"));
        }
        other => panic!("expected api error, got {other:?}"),
    }
    assert_eq!(syncer.stats().dashboards, Stats::default());
    assert!(syncer.lock_file().dashboards.is_empty());

    server.shutdown().await;
}

#[tokio::test]
async fn test_client_filters_locally() {
    let server = TestServer::spawn(Remote::scenario()).await;
    let client: Arc<dyn DatadogApi> = server.client();

    let owned = client
        .list_monitors(&dddk::Filter::has_tag(dddk::CREATED_BY_TAG))
        .await
        .unwrap();
    assert_eq!(owned.len(), 2);

    let named = client
        .list_monitors(&dddk::Filter::name("[Synthetics] Synthetics Name"))
        .await
        .unwrap();
    assert_eq!(named.len(), 1);
    assert_eq!(named[0].id, 555);

    server.shutdown().await;
}
