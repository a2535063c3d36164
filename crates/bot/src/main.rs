//! solvewatch binary entry point.
//!
//! Composition root: loads configuration from the environment, opens the
//! roster with autocommit on, and runs the sync worker on a current-thread
//! runtime until a shutdown signal arrives. The deployment model is
//! cooperative scheduling on one worker; nothing here runs preemptively
//! against the roster.

use anyhow::Result;
use platform_api::PlatformClient;
use roster::Roster;
use solvewatch::{BotConfig, SolveEvent, SyncWorker, reports};
use tokio::sync::mpsc;
use tokio::time::Duration;
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = BotConfig::from_env()?;
    info!("starting solvewatch");
    info!("roster path: {}", config.roster_path.display());
    info!("sync interval: {}s", config.sync_interval_secs);

    let roster = Roster::open(&config.roster_path, true)?;
    info!("tracking {} user(s)", roster.len());

    let client = PlatformClient::new(config.api_base_url, config.api_key);

    let (events_tx, mut events_rx) = mpsc::channel::<SolveEvent>(64);
    tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            info!("{}", reports::solve_announcement(&event));
        }
    });

    let worker = SyncWorker::new(
        roster,
        client,
        events_tx,
        Duration::from_secs(config.sync_interval_secs),
    );

    // Dropping the worker future on shutdown cancels any in-flight cycle;
    // its open transaction rolls back, leaving the on-disk roster as of the
    // last commit.
    tokio::select! {
        _ = worker.run() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received, stopping");
        }
    }

    Ok(())
}
