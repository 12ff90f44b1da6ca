//! reqwest-backed Datadog client.
//!
//! A thin layer that makes the Datadog v1 endpoints look consistent. List
//! filters are applied locally after fetching the whole collection.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::{DatadogApi, Filter};
use crate::api::{
    Dashboard, DashboardSummary, Monitor, MonitorSummary, Slo, SloSummary, Synthetic,
    SyntheticSummary,
};
use crate::error::{Error, Result};

pub const DEFAULT_API_URL: &str = "https://api.datadoghq.com/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);
const USER_AGENT: &str = "github.com/99designs/dddk";

/// HTTP client for the Datadog API.
pub struct HttpClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    app_key: String,
}

#[derive(Deserialize)]
struct DashboardList {
    dashboards: Vec<DashboardSummary>,
}

#[derive(Deserialize)]
struct SyntheticList {
    tests: Vec<SyntheticSummary>,
}

#[derive(Deserialize)]
struct SloEnvelope<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Deserialize)]
struct CreatedDashboard {
    id: String,
}

#[derive(Deserialize)]
struct CreatedMonitor {
    id: i64,
}

#[derive(Deserialize)]
struct CreatedSynthetic {
    public_id: String,
}

#[derive(Deserialize)]
struct CreatedSlo {
    id: String,
}

impl HttpClient {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        app_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            app_key: app_key.into(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);
        self.http
            .request(method, url)
            .header("DD-API-KEY", &self.api_key)
            .header("DD-APPLICATION-KEY", &self.app_key)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = execute(self.request(Method::GET, path)).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn send<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let body = execute(self.request(method, path).json(body)).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Sends a request whose response body is irrelevant.
    async fn fire<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<()>
    where
        B: Serialize + ?Sized + Sync,
    {
        let mut req = self.request(method, path);
        if let Some(body) = body {
            req = req.json(body);
        }
        execute(req).await?;
        Ok(())
    }

    async fn slo_envelope<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Slo>,
    ) -> Result<Vec<T>> {
        let envelope: SloEnvelope<T> = match body {
            Some(slo) => self.send(method, path, slo).await?,
            None => self.get(path).await?,
        };
        match envelope.error {
            Some(err) if !err.is_null() => Err(Error::Api {
                status: 200,
                body: err.to_string(),
            }),
            _ => Ok(envelope.data),
        }
    }
}

async fn execute(req: RequestBuilder) -> Result<String> {
    let resp = req.send().await?;
    let status = resp.status();
    let body = resp.text().await?;

    if !status.is_success() {
        return Err(Error::Api {
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}

#[async_trait]
impl DatadogApi for HttpClient {
    async fn list_dashboards(&self, filter: &Filter) -> Result<Vec<DashboardSummary>> {
        let list: DashboardList = self.get("/v1/dashboard").await?;
        Ok(filter.apply(list.dashboards))
    }

    async fn create_dashboard(&self, dashboard: &Dashboard) -> Result<String> {
        let created: CreatedDashboard = self.send(Method::POST, "/v1/dashboard", dashboard).await?;
        Ok(created.id)
    }

    async fn update_dashboard(&self, id: &str, dashboard: &Dashboard) -> Result<()> {
        self.fire(Method::PUT, &format!("/v1/dashboard/{id}"), Some(dashboard))
            .await
    }

    async fn delete_dashboard(&self, id: &str) -> Result<()> {
        self.fire::<()>(Method::DELETE, &format!("/v1/dashboard/{id}"), None)
            .await
    }

    async fn list_monitors(&self, filter: &Filter) -> Result<Vec<MonitorSummary>> {
        let monitors: Vec<MonitorSummary> = self.get("/v1/monitor?per_page=1000").await?;
        Ok(filter.apply(monitors))
    }

    async fn create_monitor(&self, monitor: &Monitor) -> Result<i64> {
        let created: CreatedMonitor = self.send(Method::POST, "/v1/monitor", monitor).await?;
        Ok(created.id)
    }

    async fn update_monitor(&self, id: i64, monitor: &Monitor) -> Result<()> {
        self.fire(Method::PUT, &format!("/v1/monitor/{id}"), Some(monitor))
            .await
    }

    async fn delete_monitor(&self, id: i64) -> Result<()> {
        self.fire::<()>(Method::DELETE, &format!("/v1/monitor/{id}"), None)
            .await
    }

    async fn list_synthetics(&self, filter: &Filter) -> Result<Vec<SyntheticSummary>> {
        let list: SyntheticList = self.get("/v1/synthetics/tests").await?;
        Ok(filter.apply(list.tests))
    }

    async fn create_synthetic(&self, synthetic: &Synthetic) -> Result<String> {
        let created: CreatedSynthetic = self
            .send(Method::POST, "/v1/synthetics/tests", synthetic)
            .await?;
        Ok(created.public_id)
    }

    async fn update_synthetic(&self, id: &str, synthetic: &Synthetic) -> Result<()> {
        self.fire(
            Method::PUT,
            &format!("/v1/synthetics/tests/{id}"),
            Some(synthetic),
        )
        .await
    }

    async fn delete_synthetic(&self, id: &str) -> Result<()> {
        // Synthetics are deleted in bulk by public id.
        let body = json!({ "public_ids": [id] });
        self.fire(Method::POST, "/v1/synthetics/tests/delete", Some(&body))
            .await
    }

    async fn list_slos(&self, filter: &Filter) -> Result<Vec<SloSummary>> {
        let slos: Vec<SloSummary> = self
            .slo_envelope(Method::GET, "/v1/slo?limit=1000", None)
            .await?;
        Ok(filter.apply(slos))
    }

    async fn create_slo(&self, slo: &Slo) -> Result<String> {
        let created: Vec<CreatedSlo> = self.slo_envelope(Method::POST, "/v1/slo", Some(slo)).await?;
        created
            .into_iter()
            .next()
            .map(|c| c.id)
            .ok_or_else(|| Error::Api {
                status: 200,
                body: "create slo returned no data".to_string(),
            })
    }

    async fn update_slo(&self, id: &str, slo: &Slo) -> Result<()> {
        self.slo_envelope::<Value>(Method::PUT, &format!("/v1/slo/{id}"), Some(slo))
            .await?;
        Ok(())
    }

    async fn delete_slo(&self, id: &str) -> Result<()> {
        self.fire::<()>(Method::DELETE, &format!("/v1/slo/{id}"), None)
            .await
    }
}
