//! Reentrant mutual exclusion
//!
//! Scripts call `lock()` and `unlock()` as separate operations, so the lock
//! cannot hand out RAII guards. Ownership is tracked by thread number.

use crate::error::{BridgeError, LockError};
use crate::thread::{thread_number, ThreadNumber};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct LockState {
    owner: Option<ThreadNumber>,
    holds: usize,
}

/// A lock the holding thread may acquire again without blocking itself.
///
/// Every `lock()` must be matched by an `unlock()` before another thread can
/// acquire it.
#[derive(Debug, Default)]
pub struct ReentrantLock {
    state: Mutex<LockState>,
    released: Condvar,
}

/// Shared handle to a [`ReentrantLock`].
pub type LockHandle = Arc<ReentrantLock>;

impl ReentrantLock {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, LockState>, BridgeError> {
        self.state
            .lock()
            .map_err(|_| BridgeError::Unavailable { facility: "lock" })
    }

    /// Acquire the lock, blocking while another thread holds it.
    pub fn lock(&self) -> Result<(), BridgeError> {
        let me = thread_number();
        let mut state = self.state()?;

        while let Some(owner) = state.owner {
            if owner == me {
                break;
            }
            tracing::trace!(thread = me, owner, "waiting for reentrant lock");
            state = self
                .released
                .wait(state)
                .map_err(|_| BridgeError::Unavailable { facility: "lock" })?;
        }

        state.owner = Some(me);
        state.holds += 1;
        Ok(())
    }

    /// Acquire the lock only if that does not require waiting.
    pub fn try_lock(&self) -> Result<bool, BridgeError> {
        let me = thread_number();
        let mut state = self.state()?;

        match state.owner {
            Some(owner) if owner != me => Ok(false),
            _ => {
                state.owner = Some(me);
                state.holds += 1;
                Ok(true)
            }
        }
    }

    /// Release one hold. The lock becomes free once every hold is released.
    pub fn unlock(&self) -> Result<(), BridgeError> {
        let me = thread_number();
        let mut state = self.state()?;

        if state.owner != Some(me) {
            return Err(LockError::NotOwner {
                thread: me,
                owner: state.owner,
            }
            .into());
        }

        state.holds -= 1;
        if state.holds == 0 {
            state.owner = None;
            drop(state);
            self.released.notify_one();
        }
        Ok(())
    }

    /// Number of holds the calling thread currently has.
    pub fn hold_count(&self) -> Result<usize, BridgeError> {
        let state = self.state()?;
        Ok(if state.owner == Some(thread_number()) {
            state.holds
        } else {
            0
        })
    }

    /// Whether any thread holds the lock.
    pub fn is_locked(&self) -> Result<bool, BridgeError> {
        Ok(self.state()?.owner.is_some())
    }
}
