//! The syncer pushes declared apps to Datadog.
//!
//! It links everything dddk owns remotely at creation, then syncs each app in
//! dependency order (synthetics, monitors, SLO, dashboard) and finally
//! deletes whatever was owned but not declared. The lock file snapshot lets
//! unchanged resources be skipped without a remote call.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::api::{Dashboard, Monitor, Slo, Synthetic};
use crate::app::{AlertGraphSource, App, ALERT_GRAPH_TAG};
use crate::client::{DatadogApi, Filter};
use crate::error::Result;
use crate::lock::LockFile;
use crate::reconciler::monitor::parse_id;
use crate::reconciler::{
    DashboardApi, MonitorApi, Reconciler, ResourceKind, SloApi, Stats, SyntheticApi,
};

/// Dashboards have no tags, so ownership is marked in the description.
pub const DESCRIPTION_TAG: &str = "managed by [dddk](github.com/99designs/dddk)";
pub const CREATED_BY_TAG: &str = "created_by:dddk";

/// Datadog creates a monitor named `"[Synthetics] " + test name` for every
/// synthetic test. Those belong to the synthetic, never to the monitor kind.
pub const SYNTHETICS_MONITOR_PREFIX: &str = "[Synthetics] ";

/// Per-kind counters of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncStats {
    pub dashboards: Stats,
    pub monitors: Stats,
    pub synthetics: Stats,
    pub slos: Stats,
}

impl SyncStats {
    pub fn by_kind(&self) -> [(ResourceKind, Stats); 4] {
        [
            (ResourceKind::Dashboard, self.dashboards),
            (ResourceKind::Monitor, self.monitors),
            (ResourceKind::Synthetic, self.synthetics),
            (ResourceKind::Slo, self.slos),
        ]
    }
}

pub struct Syncer {
    client: Arc<dyn DatadogApi>,
    dashboards: Reconciler<Dashboard>,
    monitors: Reconciler<Monitor>,
    synthetics: Reconciler<Synthetic>,
    slos: Reconciler<Slo>,
}

impl Syncer {
    /// Build a syncer from the lock file and link everything dddk owns
    /// remotely.
    pub async fn create(
        client: Arc<dyn DatadogApi>,
        lock: LockFile,
        show_diff: bool,
    ) -> Result<Self> {
        let LockFile {
            monitors,
            dashboards,
            synthetics,
            slos,
        } = lock;

        let mut syncer = Self {
            dashboards: Reconciler::new(
                ResourceKind::Dashboard,
                Box::new(DashboardApi::new(client.clone())),
                dashboards,
            )
            .with_diff(show_diff),
            monitors: Reconciler::new(
                ResourceKind::Monitor,
                Box::new(MonitorApi::new(client.clone())),
                monitors,
            )
            .with_diff(show_diff),
            synthetics: Reconciler::new(
                ResourceKind::Synthetic,
                Box::new(SyntheticApi::new(client.clone())),
                synthetics,
            )
            .with_diff(show_diff),
            slos: Reconciler::new(
                ResourceKind::Slo,
                Box::new(SloApi::new(client.clone())),
                slos,
            )
            .with_diff(show_diff),
            client,
        };

        syncer.link_remote().await?;
        Ok(syncer)
    }

    async fn link_remote(&mut self) -> Result<()> {
        let described = Filter::has_tag(DESCRIPTION_TAG);
        let tagged = Filter::has_tag(CREATED_BY_TAG);

        let (dashboards, monitors, slos, synthetics) = tokio::try_join!(
            self.client.list_dashboards(&described),
            self.client.list_monitors(&tagged),
            self.client.list_slos(&tagged),
            self.client.list_synthetics(&tagged),
        )?;

        info!(
            "Found {} dashboards, {} monitors, {} SLOs, {} synthetics managed by dddk",
            dashboards.len(),
            monitors.len(),
            slos.len(),
            synthetics.len()
        );

        for d in dashboards {
            self.dashboards.link(d.title, d.id);
        }
        for m in monitors {
            if m.name.starts_with(SYNTHETICS_MONITOR_PREFIX) {
                continue;
            }
            self.monitors.link(m.name, m.id.to_string());
        }
        for s in slos {
            self.slos.link(s.name, s.id);
        }
        for s in synthetics {
            self.synthetics.link(s.name, s.public_id);
        }

        Ok(())
    }

    // =========================================================================
    // Per-kind sync
    // =========================================================================

    pub async fn sync_dashboard(&mut self, mut board: Dashboard) -> Result<String> {
        board.description = Some(DESCRIPTION_TAG.to_string());
        let title = board.title.clone();
        self.dashboards.sync(&title, board).await
    }

    pub async fn sync_monitor(&mut self, mut monitor: Monitor) -> Result<i64> {
        mark_created_by(&mut monitor.tags);
        let name = monitor.name.clone();
        let id = self.monitors.sync(&name, monitor).await?;
        parse_id(&id)
    }

    pub async fn sync_synthetic(&mut self, mut synthetic: Synthetic) -> Result<String> {
        mark_created_by(&mut synthetic.tags);
        let name = synthetic.name.clone();
        self.synthetics.sync(&name, synthetic).await
    }

    pub async fn sync_slo(&mut self, mut slo: Slo) -> Result<String> {
        mark_created_by(&mut slo.tags);
        let name = slo.name.clone();
        self.slos.sync(&name, slo).await
    }

    /// Id of the monitor Datadog created for the synthetic, if exactly one
    /// monitor carries its name.
    pub async fn synthetic_monitor_id(&self, synthetic_name: &str) -> Result<Option<i64>> {
        let name = format!("{SYNTHETICS_MONITOR_PREFIX}{synthetic_name}");
        let monitors = self.client.list_monitors(&Filter::name(name.clone())).await?;

        match monitors.as_slice() {
            [monitor] => Ok(Some(monitor.id)),
            [] => {
                warn!("Monitor {} not found, not adding it to the SLO", name);
                Ok(None)
            }
            found => {
                warn!(
                    "{} monitors named {}, not adding any of them to the SLO",
                    found.len(),
                    name
                );
                Ok(None)
            }
        }
    }

    // =========================================================================
    // Apps
    // =========================================================================

    /// Sync one app: synthetics, warning monitors, outage monitors, the SLO
    /// over all outage monitors, then the dashboard.
    pub async fn push_app(&mut self, app: &App) -> Result<()> {
        info!("Pushing app {}", app.name);

        let mut outage_ids = Vec::new();
        let mut alert_graphs = Vec::new();

        for synthetic in &app.synthetics {
            self.sync_synthetic(synthetic.clone()).await?;
            if let Some(id) = self.synthetic_monitor_id(&synthetic.name).await? {
                outage_ids.push(id);
            }
        }

        for monitor in &app.warning_monitors {
            let id = self.sync_monitor(monitor.clone()).await?;
            if let Some(graph) = alert_graph(id, monitor) {
                alert_graphs.push(graph);
            }
        }

        for monitor in &app.outage_monitors {
            let id = self.sync_monitor(monitor.clone()).await?;
            outage_ids.push(id);
            if let Some(graph) = alert_graph(id, monitor) {
                alert_graphs.push(graph);
            }
        }

        let slo_id = match app.slo(outage_ids) {
            Some(slo) => Some(self.sync_slo(slo).await?),
            None => None,
        };

        self.sync_dashboard(app.dashboard(slo_id.as_deref(), &alert_graphs))
            .await?;
        Ok(())
    }

    /// Push all apps, or only the one whose dashboard title matches `only`
    /// (case-insensitive). The deletion sweep only runs for a full push.
    pub async fn push(&mut self, apps: &[App], only: Option<&str>) -> Result<()> {
        let only = only.map(str::to_lowercase);
        let mut pushed = 0;

        for app in apps {
            if let Some(only) = &only {
                if app.board.title.to_lowercase() != *only {
                    continue;
                }
            }
            self.push_app(app).await?;
            pushed += 1;
        }

        match only {
            None => self.delete_unseen().await?,
            Some(name) => {
                if pushed == 0 {
                    warn!("No app named {}", name);
                }
                info!("Pushed a single app, skipping deletion of unseen resources");
            }
        }
        Ok(())
    }

    /// Delete everything linked at creation but not synced since.
    pub async fn delete_unseen(&mut self) -> Result<()> {
        self.dashboards.delete_unseen().await?;
        self.slos.delete_unseen().await?;
        self.synthetics.delete_unseen().await?;
        self.monitors.delete_unseen().await?;
        Ok(())
    }

    /// Snapshot of every kind, to be written back to the lock file.
    pub fn lock_file(&self) -> LockFile {
        LockFile {
            monitors: self.monitors.data().clone(),
            dashboards: self.dashboards.data().clone(),
            synthetics: self.synthetics.data().clone(),
            slos: self.slos.data().clone(),
        }
    }

    pub fn stats(&self) -> SyncStats {
        SyncStats {
            dashboards: self.dashboards.stats(),
            monitors: self.monitors.stats(),
            synthetics: self.synthetics.stats(),
            slos: self.slos.stats(),
        }
    }
}

fn mark_created_by(tags: &mut Vec<String>) {
    if !tags.iter().any(|t| t == CREATED_BY_TAG) {
        tags.push(CREATED_BY_TAG.to_string());
    }
}

fn alert_graph(monitor_id: i64, monitor: &Monitor) -> Option<AlertGraphSource> {
    if !monitor.tags.iter().any(|t| t == ALERT_GRAPH_TAG) {
        return None;
    }
    info!("Adding alert graph for monitor {}", monitor.name);
    Some(AlertGraphSource {
        monitor_id,
        monitor_name: monitor.name.clone(),
    })
}
