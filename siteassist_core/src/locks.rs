//! Per-user lock registry.
//!
//! Each user id maps to its own `tokio::sync::Mutex`, handed out as an
//! `Arc` so a caller can hold the lock across await points (the backend
//! call happens inside the critical section). Locks for different users
//! never contend.
//!
//! Entries are never evicted, even after the user's stored session is
//! cleared: a waiter may still hold the old `Arc`, and handing a fresh
//! mutex to the next caller would break mutual exclusion. The map is
//! bounded by the number of distinct users seen in the process lifetime.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
pub struct UserLocks {
    inner: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl UserLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock token for `user_id`, created on first use.
    #[must_use]
    pub fn acquire(&self, user_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut map = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        Arc::clone(
            map.entry(user_id.to_string())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))),
        )
    }
}
