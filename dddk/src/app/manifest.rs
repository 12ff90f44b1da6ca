//! App manifests: one app per YAML or JSON file.
//!
//! ```yaml
//! name: checkout
//! team: { warning_contact: "@slack-checkout", alert_contact: "@pagerduty-checkout" }
//! components:
//!   - healthcheck: { url: https://checkout.example.com/health }
//!   - fargate: { task_family: checkout }
//!   - mute:
//!       - alb: { name: checkout-alb }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::components::{
    Alb, BurstableRds, Elb, Fargate, FargateService, Group, Healthcheck, Mute, Rds,
};
use super::{App, Component, Container, Team};
use crate::api::{Monitor, Synthetic, WidgetDefinition};
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppManifest {
    pub name: String,
    pub team: Team,
    #[serde(default)]
    pub components: Vec<ComponentSpec>,
}

/// A component as declared in a manifest, keyed by its kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentSpec {
    Healthcheck(Healthcheck),
    Rds(Rds),
    BurstableRds(BurstableRds),
    Alb(Alb),
    Elb(Elb),
    Fargate(Fargate),
    FargateService(FargateService),
    Mute(Mute<ComponentSpec>),
    Group(Group<ComponentSpec>),
    Widget(CustomWidget),
    WarningMonitor(Monitor),
    OutageMonitor(Monitor),
    Synthetic(Synthetic),
}

/// A hand-written widget definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomWidget {
    pub title: String,
    pub definition: WidgetDefinition,
}

impl Component for ComponentSpec {
    fn apply(&self, container: &mut dyn Container) {
        match self {
            ComponentSpec::Healthcheck(c) => c.apply(container),
            ComponentSpec::Rds(c) => c.apply(container),
            ComponentSpec::BurstableRds(c) => c.apply(container),
            ComponentSpec::Alb(c) => c.apply(container),
            ComponentSpec::Elb(c) => c.apply(container),
            ComponentSpec::Fargate(c) => c.apply(container),
            ComponentSpec::FargateService(c) => c.apply(container),
            ComponentSpec::Mute(c) => c.apply(container),
            ComponentSpec::Group(c) => c.apply(container),
            ComponentSpec::Widget(w) => container.add_widget(&w.title, w.definition.clone()),
            ComponentSpec::WarningMonitor(m) => container.add_warning_monitor(&m.name, m.clone()),
            ComponentSpec::OutageMonitor(m) => container.add_outage_monitor(&m.name, m.clone()),
            ComponentSpec::Synthetic(s) => container.add_synthetic(&s.name, s.clone()),
        }
    }
}

impl ComponentSpec {
    /// Inline monitors and synthetics must be named; everything else names
    /// its own resources.
    fn validate(&self) -> Result<()> {
        match self {
            ComponentSpec::WarningMonitor(m) | ComponentSpec::OutageMonitor(m)
                if m.name.trim().is_empty() =>
            {
                Err(Error::Manifest(format!("monitor without a name: {}", m.query)))
            }
            ComponentSpec::Synthetic(s) if s.name.trim().is_empty() => Err(Error::Manifest(
                format!("synthetic without a name: {}", s.config.request.url),
            )),
            ComponentSpec::Mute(Mute(children)) => children.iter().try_for_each(Self::validate),
            ComponentSpec::Group(group) => group.components.iter().try_for_each(Self::validate),
            _ => Ok(()),
        }
    }
}

impl AppManifest {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Manifest("app without a name".to_string()));
        }
        self.components.iter().try_for_each(ComponentSpec::validate)
    }

    pub fn into_app(self) -> App {
        App::new(self.name, self.team, &self.components)
    }
}

/// Parse one manifest; `json` selects JSON over YAML.
pub fn parse_manifest(raw: &str, json: bool) -> Result<AppManifest> {
    let manifest: AppManifest = if json {
        serde_json::from_str(raw)?
    } else {
        serde_yaml::from_str(raw)?
    };
    manifest.validate()?;
    Ok(manifest)
}

fn manifest_format(path: &Path) -> Option<bool> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => Some(false),
        Some("json") => Some(true),
        _ => None,
    }
}

/// Load every app in `dir`, in file name order.
pub async fn load_apps(dir: impl AsRef<Path>) -> Result<Vec<App>> {
    let dir = dir.as_ref();

    let mut files: Vec<(PathBuf, bool)> = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if let Some(json) = manifest_format(&path) {
            files.push((path, json));
        }
    }
    files.sort();

    if files.is_empty() {
        return Err(Error::Manifest(format!("no apps found in {}", dir.display())));
    }

    let mut apps = Vec::with_capacity(files.len());
    for (path, json) in files {
        debug!("Loading app from {}", path.display());
        let raw = tokio::fs::read_to_string(&path).await?;
        let manifest = parse_manifest(&raw, json)
            .map_err(|e| Error::Manifest(format!("{}: {}", path.display(), e)))?;
        apps.push(manifest.into_app());
    }

    Ok(apps)
}
