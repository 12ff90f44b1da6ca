//! Clients for the Datadog API.
//!
//! - `DatadogApi`: the capability set the reconciler and syncer consume
//! - `HttpClient`: the reqwest-backed implementation
//! - `Filter`: client-side list filtering (most Datadog list filters are unreliable)

pub mod filter;
pub mod http;

use async_trait::async_trait;

use crate::api::{
    Dashboard, DashboardSummary, Monitor, MonitorSummary, Slo, SloSummary, Synthetic,
    SyntheticSummary,
};
use crate::error::Result;

pub use filter::{Filter, Listed};
pub use http::HttpClient;

/// List/create/update/delete per resource kind.
///
/// Implementations only report success or failure; callers never inspect
/// transport details.
#[async_trait]
pub trait DatadogApi: Send + Sync {
    async fn list_dashboards(&self, filter: &Filter) -> Result<Vec<DashboardSummary>>;
    async fn create_dashboard(&self, dashboard: &Dashboard) -> Result<String>;
    async fn update_dashboard(&self, id: &str, dashboard: &Dashboard) -> Result<()>;
    async fn delete_dashboard(&self, id: &str) -> Result<()>;

    async fn list_monitors(&self, filter: &Filter) -> Result<Vec<MonitorSummary>>;
    async fn create_monitor(&self, monitor: &Monitor) -> Result<i64>;
    async fn update_monitor(&self, id: i64, monitor: &Monitor) -> Result<()>;
    async fn delete_monitor(&self, id: i64) -> Result<()>;

    async fn list_synthetics(&self, filter: &Filter) -> Result<Vec<SyntheticSummary>>;
    async fn create_synthetic(&self, synthetic: &Synthetic) -> Result<String>;
    async fn update_synthetic(&self, id: &str, synthetic: &Synthetic) -> Result<()>;
    async fn delete_synthetic(&self, id: &str) -> Result<()>;

    async fn list_slos(&self, filter: &Filter) -> Result<Vec<SloSummary>>;
    async fn create_slo(&self, slo: &Slo) -> Result<String>;
    async fn update_slo(&self, id: &str, slo: &Slo) -> Result<()>;
    async fn delete_slo(&self, id: &str) -> Result<()>;
}
