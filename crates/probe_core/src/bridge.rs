//! Capability bridge
//!
//! The four host primitives behind one stateless factory.

use crate::clock::{self, Micros};
use crate::lock::{LockHandle, ReentrantLock};
use crate::slot::ThreadLocalSlot;
use crate::thread::{self, ThreadNumber};
use std::sync::Arc;

/// Stateless access point to thread, clock and locking primitives.
///
/// Every call is a fresh allocation or a pure read; nothing returned is
/// retained by the bridge.
#[derive(Debug, Default, Clone, Copy)]
pub struct Bridge;

impl Bridge {
    pub fn new() -> Self {
        Self
    }

    /// A new, empty thread-local slot.
    pub fn create_thread_local<T>(&self) -> ThreadLocalSlot<T> {
        ThreadLocalSlot::new()
    }

    /// Number of the calling thread.
    pub fn thread_number(&self) -> ThreadNumber {
        thread::thread_number()
    }

    /// Monotonic time snapshot in microseconds.
    pub fn snapshot(&self) -> Micros {
        clock::snapshot()
    }

    /// A new reentrant lock, owned entirely by the caller.
    pub fn create_lock(&self) -> LockHandle {
        Arc::new(ReentrantLock::new())
    }
}
