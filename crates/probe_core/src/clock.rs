//! Monotonic time snapshots
//!
//! Snapshots count microseconds since a process-wide epoch taken on first use.
//! They come from `Instant`, so wall-clock adjustments never move them.

use once_cell::sync::Lazy;
use std::time::{Duration, Instant};

/// Microseconds since the process epoch.
pub type Micros = u64;

static EPOCH: Lazy<Instant> = Lazy::new(Instant::now);

/// Take a time snapshot.
///
/// Only differences between snapshots of the same process are meaningful.
pub fn snapshot() -> Micros {
    let elapsed = EPOCH.elapsed().as_micros();
    // u64 microseconds cover ~584k years of uptime
    elapsed.min(u64::MAX as u128) as Micros
}

/// Elapsed microseconds between two snapshots, zero if `end` precedes `start`.
pub fn elapsed_micros(start: Micros, end: Micros) -> Micros {
    end.saturating_sub(start)
}

/// Convert a snapshot difference into a `Duration`.
pub fn as_duration(micros: Micros) -> Duration {
    Duration::from_micros(micros)
}
