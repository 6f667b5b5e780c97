//! Per-call concurrency control (spec §4.4: "under a per-call mutex").
//!
//! Ensures only one turn runs per call at a time; a second trigger arriving
//! while a turn is in-flight waits for the current one to finish rather
//! than running concurrently and corrupting turn ordering.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Manages per-call run locks.
///
/// Each call key maps to a `Semaphore(1)`. Acquiring the permit ensures
/// exclusive access to the turn pipeline for one call at a time.
pub struct CallLockMap {
    locks: Mutex<HashMap<String, Arc<Semaphore>>>,
}

impl Default for CallLockMap {
    fn default() -> Self {
        Self::new()
    }
}

impl CallLockMap {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Acquire the run lock for a call, waiting if a turn is already
    /// in-flight.
    pub async fn acquire(&self, call_id: &str) -> OwnedSemaphorePermit {
        let sem = {
            let mut locks = self.locks.lock();
            locks
                .entry(call_id.to_owned())
                .or_insert_with(|| Arc::new(Semaphore::new(1)))
                .clone()
        };
        sem.acquire_owned()
            .await
            .expect("semaphore never closed")
    }

    /// Drop the tracked lock for a call (called from `close_call`).
    pub fn remove(&self, call_id: &str) {
        self.locks.lock().remove(call_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sequential_access() {
        let map = CallLockMap::new();
        let p1 = map.acquire("c1").await;
        drop(p1);
        let p2 = map.acquire("c1").await;
        drop(p2);
    }

    #[tokio::test]
    async fn different_calls_concurrent() {
        let map = Arc::new(CallLockMap::new());
        let p1 = map.acquire("c1").await;
        let p2 = map.acquire("c2").await;
        drop(p1);
        drop(p2);
    }

    #[tokio::test]
    async fn same_call_waits() {
        let map = Arc::new(CallLockMap::new());
        let map2 = map.clone();

        let p1 = map.acquire("c1").await;
        let handle = tokio::spawn(async move {
            let _p2 = map2.acquire("c1").await;
            42
        });

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        drop(p1);

        assert_eq!(handle.await.unwrap(), 42);
    }
}
