//! Thread-local slots
//!
//! Unlike `thread_local!`, slots are created at runtime and any number of
//! them may exist. Values are partitioned by [`thread_number`].

use crate::thread::{thread_number, ThreadNumber};
use dashmap::DashMap;

/// Storage cell whose value is private to each thread that touches it.
#[derive(Debug)]
pub struct ThreadLocalSlot<T> {
    values: DashMap<ThreadNumber, T>,
}

impl<T> ThreadLocalSlot<T> {
    pub fn new() -> Self {
        Self {
            values: DashMap::new(),
        }
    }

    /// Store `value` as the calling thread's copy, returning the previous one.
    pub fn set(&self, value: T) -> Option<T> {
        self.values.insert(thread_number(), value)
    }

    /// Remove and return the calling thread's copy.
    pub fn take(&self) -> Option<T> {
        self.values
            .remove(&thread_number())
            .map(|(_, value)| value)
    }

    /// Run `f` against the calling thread's copy without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(Option<&T>) -> R) -> R {
        match self.values.get(&thread_number()) {
            Some(entry) => f(Some(entry.value())),
            None => f(None),
        }
    }

    /// Whether the calling thread has stored a value.
    pub fn is_set(&self) -> bool {
        self.values.contains_key(&thread_number())
    }
}

impl<T: Clone> ThreadLocalSlot<T> {
    /// The calling thread's copy, if it stored one.
    pub fn get(&self) -> Option<T> {
        self.with(|value| value.cloned())
    }
}

impl<T> Default for ThreadLocalSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn starts_empty() {
        let slot: ThreadLocalSlot<String> = ThreadLocalSlot::new();
        assert_eq!(slot.get(), None);
        assert!(!slot.is_set());
    }

    #[test]
    fn set_get_take() {
        let slot = ThreadLocalSlot::new();
        assert_eq!(slot.set(1), None);
        assert_eq!(slot.set(2), Some(1));
        assert_eq!(slot.get(), Some(2));
        assert_eq!(slot.take(), Some(2));
        assert_eq!(slot.get(), None);
    }

    #[test]
    fn slots_are_independent() {
        let a = ThreadLocalSlot::new();
        let b: ThreadLocalSlot<&str> = ThreadLocalSlot::new();
        a.set("a");
        assert_eq!(a.get(), Some("a"));
        assert_eq!(b.get(), None);
    }

    #[test]
    fn values_are_private_to_threads() {
        let slot = Arc::new(ThreadLocalSlot::new());
        slot.set(String::from("main"));

        let other = Arc::clone(&slot);
        let seen = thread::spawn(move || {
            let before = other.get();
            other.set(String::from("worker"));
            (before, other.get())
        })
        .join()
        .unwrap();

        assert_eq!(seen, (None, Some(String::from("worker"))));
        assert_eq!(slot.get(), Some(String::from("main")));
    }

    #[test]
    fn with_borrows_in_place() {
        let slot = ThreadLocalSlot::new();
        slot.set(vec![1, 2, 3]);
        assert_eq!(slot.with(|v| v.map(Vec::len)), Some(3));
    }
}
