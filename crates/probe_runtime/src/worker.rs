//! Worker threads
//!
//! Each worker owns one runtime and one context. The only state shared
//! between workers is the host lock exposed to scripts as `hostLock`.

use anyhow::{anyhow, Context, Result};
use probe_core::{Bridge, LockHandle};
use probe_script::{init_standard_objects, BootstrapPolicy, ScriptContext, ScriptRuntime};
use probe_services::Settings;
use std::thread;

/// Global name of the lock shared by every worker.
pub const HOST_LOCK_GLOBAL: &str = "hostLock";

/// Prepare a context the way every worker does before running scripts.
pub fn prepare_context(settings: &Settings, host_lock: &LockHandle) -> Result<ScriptContext> {
    let runtime = match settings.runtime.memory_limit_bytes {
        Some(limit) => ScriptRuntime::with_memory_limit(limit),
        None => ScriptRuntime::new(),
    }
    .context("failed to create script runtime")?;

    let ctx = runtime
        .new_context()
        .context("failed to create script context")?;

    let policy = BootstrapPolicy {
        allow_raw_engine_access: settings.bootstrap.allow_raw_engine_access,
    };
    init_standard_objects(&ctx, &policy).context("bootstrap failed")?;

    ctx.install_bridge(&settings.bridge.global_name)
        .context("failed to install bridge")?;
    ctx.expose_lock(HOST_LOCK_GLOBAL, host_lock)
        .context("failed to expose host lock")?;

    Ok(ctx)
}

fn run_worker(index: usize, settings: &Settings, host_lock: &LockHandle) -> Result<()> {
    let ctx = prepare_context(settings, host_lock)?;
    tracing::debug!(worker = index, "context ready");

    let result = settings.runtime.scripts.iter().try_for_each(|script| {
        ctx.execute_file(script)
            .with_context(|| format!("worker {index} failed running '{}'", script.display()))
    });

    if result.is_err() {
        // A script that threw mid-section must not leave the other workers blocked
        let released = release_holds(host_lock)?;
        if released > 0 {
            tracing::warn!(worker = index, released, "released host lock after script failure");
        }
    }
    result
}

/// Drop every hold the calling thread has on `lock`, returning how many.
fn release_holds(lock: &LockHandle) -> Result<usize> {
    let mut released = 0;
    while lock.hold_count()? > 0 {
        lock.unlock()?;
        released += 1;
    }
    Ok(released)
}

/// Run every configured script on `settings.runtime.workers` threads.
pub fn run_workers(settings: &Settings) -> Result<()> {
    let host_lock = Bridge::new().create_lock();

    let failures: Vec<anyhow::Error> = thread::scope(|scope| {
        let handles: Vec<_> = (0..settings.runtime.workers)
            .map(|index| {
                let host_lock = &host_lock;
                thread::Builder::new()
                    .name(format!("probe-worker-{index}"))
                    .spawn_scoped(scope, move || run_worker(index, settings, host_lock))
            })
            .collect();

        handles
            .into_iter()
            .enumerate()
            .filter_map(|(index, handle)| {
                let result = match handle {
                    Ok(handle) => handle
                        .join()
                        .unwrap_or_else(|_| Err(anyhow!("worker {index} panicked"))),
                    Err(err) => {
                        Err(anyhow!(err).context(format!("failed to spawn worker {index}")))
                    }
                };
                result.err()
            })
            .collect()
    });

    for failure in &failures {
        tracing::error!("{failure:#}");
    }

    match failures.into_iter().next() {
        Some(first) => Err(first),
        None => Ok(()),
    }
}
