//! Reconcilers for the different resource kinds.
//!
//! A `Reconciler` decides per declared name whether to create, update or
//! skip, and deletes whatever was linked at bootstrap but never synced.
//! Skips are decided against the lock file snapshot; create vs update comes
//! from the refs seeded by `link`.

pub mod dashboard;
pub mod diff;
pub mod monitor;
pub mod slo;
pub mod synthetic;

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::Result;

pub use dashboard::DashboardApi;
pub use monitor::MonitorApi;
pub use slo::SloApi;
pub use synthetic::SyntheticApi;

/// Last-applied bodies of one resource kind, keyed by Datadog id.
pub type LockData<T> = BTreeMap<String, T>;

/// Remote writes for one resource kind.
#[async_trait]
pub trait ResourceApi<T>: Send + Sync {
    /// Create the resource and return its server-assigned id.
    async fn create(&self, item: &T) -> Result<String>;

    async fn update(&self, id: &str, item: &T) -> Result<()>;

    async fn delete(&self, id: &str) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Dashboard,
    Monitor,
    Synthetic,
    Slo,
}

impl ResourceKind {
    /// Plural key used in the lock file and stats output.
    pub fn plural(&self) -> &'static str {
        match self {
            ResourceKind::Dashboard => "dashboards",
            ResourceKind::Monitor => "monitors",
            ResourceKind::Synthetic => "synthetics",
            ResourceKind::Slo => "slos",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResourceKind::Dashboard => "Dashboard",
            ResourceKind::Monitor => "Monitor",
            ResourceKind::Synthetic => "Synthetic",
            ResourceKind::Slo => "SLO",
        };
        f.write_str(s)
    }
}

/// Link between a declared name and a remote id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ref {
    pub id: String,
    pub synced: bool,
}

/// Per-kind counters for one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub skipped: u32,
    pub updated: u32,
    pub created: u32,
    pub deleted: u32,
}

/// Create/update/skip/delete decisions for one resource kind.
pub struct Reconciler<T> {
    kind: ResourceKind,
    api: Box<dyn ResourceApi<T>>,
    refs: IndexMap<String, Ref>,
    data: LockData<T>,
    stats: Stats,
    show_diff: bool,
}

impl<T> Reconciler<T>
where
    T: Serialize + PartialEq + Clone + Send + Sync,
{
    pub fn new(kind: ResourceKind, api: Box<dyn ResourceApi<T>>, data: LockData<T>) -> Self {
        Self {
            kind,
            api,
            refs: IndexMap::new(),
            data,
            stats: Stats::default(),
            show_diff: false,
        }
    }

    /// Print a colored diff against the snapshot before every update.
    pub fn with_diff(mut self, show_diff: bool) -> Self {
        self.show_diff = show_diff;
        self
    }

    /// Register a resource that already exists remotely.
    ///
    /// Must happen before any `sync` in the pass. Linking the same name twice
    /// keeps the last id.
    pub fn link(&mut self, name: impl Into<String>, id: impl Into<String>) {
        self.refs.insert(
            name.into(),
            Ref {
                id: id.into(),
                synced: false,
            },
        );
    }

    /// Bring the remote resource called `name` in line with `item`.
    ///
    /// Returns the Datadog id of the resource.
    pub async fn sync(&mut self, name: &str, item: T) -> Result<String> {
        let existing = self.refs.get(name).cloned();

        if existing.as_ref().is_some_and(|r| r.synced) {
            warn!(
                "{} {} declared more than once, the last declaration wins",
                self.kind, name
            );
        }

        match existing {
            Some(r) if self.data.get(&r.id) == Some(&item) => {
                debug!("{} {} is up to date", self.kind, name);
                self.mark_synced(name, &r.id);
                self.stats.skipped += 1;
                Ok(r.id)
            }
            Some(r) => {
                info!("Updating {} {}...", self.kind, name);
                if self.show_diff {
                    if let Some(previous) = self.data.get(&r.id) {
                        diff::print_diff(previous, &item);
                    }
                }

                self.api.update(&r.id, &item).await?;
                self.mark_synced(name, &r.id);
                self.stats.updated += 1;
                self.data.insert(r.id.clone(), item);
                Ok(r.id)
            }
            None => {
                let id = self.api.create(&item).await?;
                info!("Created {} {} ({})", self.kind, name, id);
                self.mark_synced(name, &id);
                self.stats.created += 1;
                self.data.insert(id.clone(), item);
                Ok(id)
            }
        }
    }

    /// Delete every linked resource that was not synced in this pass.
    pub async fn delete_unseen(&mut self) -> Result<()> {
        let unseen: Vec<(String, String)> = self
            .refs
            .iter()
            .filter(|(_, r)| !r.synced)
            .map(|(name, r)| (name.clone(), r.id.clone()))
            .collect();

        for (name, id) in unseen {
            info!("Deleting {} {}...", self.kind, name);
            self.api.delete(&id).await?;
            self.refs.shift_remove(&name);
            self.data.remove(&id);
            self.stats.deleted += 1;
        }

        Ok(())
    }

    fn mark_synced(&mut self, name: &str, id: &str) {
        self.refs.insert(
            name.to_string(),
            Ref {
                id: id.to_string(),
                synced: true,
            },
        );
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// Snapshot bodies, including everything written during this pass.
    pub fn data(&self) -> &LockData<T> {
        &self.data
    }

    pub fn get_ref(&self, name: &str) -> Option<&Ref> {
        self.refs.get(name)
    }
}
