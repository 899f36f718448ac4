//! Probe Runtime
//!
//! Host binary: boots worker threads, each running the configured profiler
//! scripts in its own bootstrapped script context.

mod worker;

use anyhow::{Context, Result};
use probe_services::Settings;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!("Probe v{}", probe_core::VERSION);

    let settings_path = std::env::args_os().nth(1).map(PathBuf::from);
    let settings = Settings::load_or_default(settings_path.as_deref())
        .context("failed to load settings")?;

    tracing::info!(
        workers = settings.runtime.workers,
        scripts = settings.runtime.scripts.len(),
        "starting workers"
    );
    worker::run_workers(&settings)?;

    tracing::info!("all workers finished");
    Ok(())
}
