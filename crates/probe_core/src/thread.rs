//! Thread identity
//!
//! Numbers are handed out from a process-wide counter the first time a thread
//! asks for one and cached in a thread-local afterwards.

use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifier of a host thread, unique for the process run.
pub type ThreadNumber = u64;

static NEXT_THREAD_NUMBER: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static CURRENT: Cell<ThreadNumber> = const { Cell::new(0) };
}

/// Number of the calling thread.
///
/// Stable for the lifetime of the thread. Numbers start at 1 and are never
/// handed out twice, so a new thread never inherits a dead thread's number.
pub fn thread_number() -> ThreadNumber {
    CURRENT.with(|current| {
        let number = current.get();
        if number != 0 {
            return number;
        }

        let number = NEXT_THREAD_NUMBER.fetch_add(1, Ordering::Relaxed);
        current.set(number);
        number
    })
}
