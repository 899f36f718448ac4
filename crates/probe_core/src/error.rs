use crate::thread::ThreadNumber;
use thiserror::Error;

/// Errors raised by the capability bridge.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BridgeError {
    #[error(transparent)]
    Lock(#[from] LockError),

    #[error("host facility '{facility}' is unavailable")]
    Unavailable { facility: &'static str },
}

/// Misuse of a reentrant lock.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LockError {
    #[error("thread {thread} released a lock it does not hold (owner: {owner:?})")]
    NotOwner {
        thread: ThreadNumber,
        owner: Option<ThreadNumber>,
    },
}
