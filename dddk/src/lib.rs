//! dddk: Datadog dashboards, monitors, synthetics and SLOs as code.
//!
//! Apps are declared in manifests, turned into resource bodies by
//! [`app::App`] and pushed by [`syncer::Syncer`], which creates, updates or
//! skips each resource and deletes the ones that are no longer declared.

pub mod api;
pub mod app;
pub mod client;
pub mod error;
pub mod lock;
pub mod reconciler;
pub mod syncer;

pub use app::{load_apps, App, Team};
pub use client::{DatadogApi, Filter, HttpClient};
pub use error::{Error, Result};
pub use lock::LockFile;
pub use reconciler::{ResourceKind, Stats};
pub use syncer::{SyncStats, Syncer, CREATED_BY_TAG, DESCRIPTION_TAG};
