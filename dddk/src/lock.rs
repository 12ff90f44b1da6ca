//! The lock file: last-applied bodies of every managed resource.
//!
//! Loaded at start, written back after a successful run. A missing or
//! unreadable file means a cold start; every linked resource then gets one
//! update on the next push.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::{Dashboard, Monitor, Slo, Synthetic};
use crate::error::Result;
use crate::reconciler::LockData;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LockFile {
    #[serde(default)]
    pub monitors: LockData<Monitor>,
    #[serde(default)]
    pub dashboards: LockData<Dashboard>,
    #[serde(default)]
    pub synthetics: LockData<Synthetic>,
    #[serde(default)]
    pub slos: LockData<Slo>,
}

impl LockFile {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let raw = match tokio::fs::read(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No lock file at {}, starting cold", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice(&raw) {
            Ok(lock) => Ok(lock),
            Err(e) => {
                warn!(
                    "Ignoring unreadable lock file {}: {}",
                    path.display(),
                    e
                );
                Ok(Self::default())
            }
        }
    }

    /// Write the lock file atomically (temp sibling, then rename).
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');

        let tmp = tmp_path(path);
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
            && self.dashboards.is_empty()
            && self.synthetics.is_empty()
            && self.slos.is_empty()
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "lock.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}
