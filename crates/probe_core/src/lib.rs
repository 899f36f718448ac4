//! Probe Core
//!
//! Host primitives for embedded profiler scripts:
//! - Thread identity
//! - Monotonic time snapshots
//! - Reentrant locks
//! - Thread-local slots
//!
//! Scripts have none of these natively; `probe_script` exposes them.

pub mod bridge;
pub mod clock;
pub mod error;
pub mod lock;
pub mod slot;
pub mod thread;

pub use bridge::Bridge;
pub use clock::{snapshot, Micros};
pub use error::{BridgeError, LockError};
pub use lock::{LockHandle, ReentrantLock};
pub use slot::ThreadLocalSlot;
pub use thread::{thread_number, ThreadNumber};

/// Bridge version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
