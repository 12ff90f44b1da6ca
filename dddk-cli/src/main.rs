//! dddk: push Datadog dashboards, monitors, synthetics and SLOs declared as
//! app manifests.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dddk::client::http::{DEFAULT_API_URL, DEFAULT_TIMEOUT};
use dddk::{load_apps, HttpClient, LockFile, SyncStats, Syncer};
use tabled::{Table, Tabled};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "dddk", version, about)]
struct Cli {
    /// Datadog API key
    #[arg(long, env = "DD_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Datadog application key
    #[arg(long, env = "DD_APP_KEY", hide_env_values = true)]
    app_key: String,

    /// Datadog API base URL
    #[arg(long, env = "DD_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Snapshot of everything pushed so far
    #[arg(long, default_value = "lock.json")]
    lock_file: PathBuf,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create, update and delete resources to match the app manifests
    Push {
        /// Directory of app manifests (.yaml, .yml, .json)
        #[arg(long, default_value = "apps")]
        source: PathBuf,

        /// Only push the app with this name; skips deleting unseen resources
        #[arg(long)]
        name: Option<String>,

        /// Print a diff of every updated resource
        #[arg(long)]
        diff: bool,
    },
}

#[derive(Tabled, Debug, PartialEq)]
struct StatsRow {
    #[tabled(rename = "KIND")]
    kind: &'static str,
    #[tabled(rename = "CREATED")]
    created: u32,
    #[tabled(rename = "UPDATED")]
    updated: u32,
    #[tabled(rename = "SKIPPED")]
    skipped: u32,
    #[tabled(rename = "DELETED")]
    deleted: u32,
}

fn stats_rows(stats: &SyncStats) -> Vec<StatsRow> {
    stats
        .by_kind()
        .into_iter()
        .map(|(kind, s)| StatsRow {
            kind: kind.plural(),
            created: s.created,
            updated: s.updated,
            skipped: s.skipped,
            deleted: s.deleted,
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dddk=info,dddk_cli=info,reqwest=warn,hyper=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Push { source, name, diff } => {
            push(&cli, source, name.as_deref(), *diff).await
        }
    }
}

async fn push(cli: &Cli, source: &Path, name: Option<&str>, diff: bool) -> Result<()> {
    let started = Instant::now();

    let apps = load_apps(source)
        .await
        .with_context(|| format!("loading apps from {}", source.display()))?;
    info!("Loaded {} apps...completed in {:?}", apps.len(), started.elapsed());

    let lock = LockFile::load(&cli.lock_file)
        .await
        .with_context(|| format!("reading {}", cli.lock_file.display()))?;

    let client = HttpClient::new(
        &cli.api_url,
        cli.api_key.as_str(),
        cli.app_key.as_str(),
        Duration::from_secs(cli.timeout),
    )
    .context("building Datadog client")?;

    let phase = Instant::now();
    let mut syncer = Syncer::create(Arc::new(client), lock, diff)
        .await
        .context("listing managed resources")?;
    info!("Bootstrap...completed in {:?}", phase.elapsed());

    let phase = Instant::now();
    syncer.push(&apps, name).await.context("pushing apps")?;
    info!("Push...completed in {:?}", phase.elapsed());

    syncer
        .lock_file()
        .save(&cli.lock_file)
        .await
        .with_context(|| format!("writing {}", cli.lock_file.display()))?;

    println!("{}", Table::new(stats_rows(&syncer.stats())));
    info!("Run...completed in {:?}", started.elapsed());
    Ok(())
}
