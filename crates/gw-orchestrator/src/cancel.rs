//! Per-call cancellation tokens (spec §4.4 "Cancellation & timeouts").
//!
//! Each running turn gets a `CancelToken`; a call-end signal or a response
//! timeout cancels the in-flight STT/LLM/TTS work by flipping it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

/// A cancellation token checked by the turn pipeline between steps.
#[derive(Clone)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracks the active cancellation token for each call currently running a
/// turn.
pub struct CancelMap {
    tokens: Mutex<HashMap<String, CancelToken>>,
}

impl Default for CancelMap {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelMap {
    pub fn new() -> Self {
        Self {
            tokens: Mutex::new(HashMap::new()),
        }
    }

    /// Register a fresh cancel token for a call's in-flight turn.
    pub fn register(&self, call_id: &str) -> CancelToken {
        let token = CancelToken::new();
        self.tokens.lock().insert(call_id.to_owned(), token.clone());
        token
    }

    /// Cancel the running turn for a call, if any. Returns true if found.
    pub fn cancel(&self, call_id: &str) -> bool {
        if let Some(token) = self.tokens.lock().get(call_id) {
            token.cancel();
            true
        } else {
            false
        }
    }

    /// Remove the token once a turn completes.
    pub fn remove(&self, call_id: &str) {
        self.tokens.lock().remove(call_id);
    }

    pub fn is_running(&self, call_id: &str) -> bool {
        self.tokens.lock().contains_key(call_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_token_lifecycle() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        token.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn cancel_map_register_and_cancel() {
        let map = CancelMap::new();
        let token = map.register("c1");
        assert!(map.is_running("c1"));
        assert!(map.cancel("c1"));
        assert!(token.is_cancelled());

        map.remove("c1");
        assert!(!map.is_running("c1"));
        assert!(!map.cancel("c1"));
    }

    #[test]
    fn register_replaces_previous_token() {
        let map = CancelMap::new();
        let old = map.register("c1");
        let new = map.register("c1");
        map.cancel("c1");
        assert!(!old.is_cancelled());
        assert!(new.is_cancelled());
    }
}
