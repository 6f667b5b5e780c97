//! Concurrency admission gate (spec §4.4 "Admission").
//!
//! Adapted from a daily-usage quota tracker to a live-call-count limiter:
//! instead of resetting on a UTC date rollover, a slot is held for exactly
//! as long as a call is live and freed explicitly by `close_call`.

use std::collections::HashSet;

use parking_lot::RwLock;

/// Returned when a call is rejected for lack of capacity.
pub struct AdmissionRejected {
    pub reason: &'static str,
    pub in_use: usize,
    pub limit: usize,
}

/// Tracks which call IDs currently hold a concurrency slot.
pub struct AdmissionGate {
    limit: usize,
    active: RwLock<HashSet<String>>,
}

impl AdmissionGate {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            active: RwLock::new(HashSet::new()),
        }
    }

    /// Attempt to admit a call. Returns `Ok(())` and holds the slot on
    /// success, `Err` (without mutating state) when the gateway is
    /// saturated (spec: `max_concurrent_calls_reached`).
    pub fn admit(&self, call_id: &str) -> Result<(), AdmissionRejected> {
        let mut active = self.active.write();
        if active.len() >= self.limit {
            return Err(AdmissionRejected {
                reason: "max_concurrent_calls_reached",
                in_use: active.len(),
                limit: self.limit,
            });
        }
        active.insert(call_id.to_owned());
        Ok(())
    }

    /// Release a call's slot (idempotent — safe to call on a call that
    /// was never admitted or already released).
    pub fn release(&self, call_id: &str) {
        self.active.write().remove(call_id);
    }

    pub fn in_use(&self) -> usize {
        self.active.read().len()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admits_until_limit() {
        let gate = AdmissionGate::new(2);
        assert!(gate.admit("a").is_ok());
        assert!(gate.admit("b").is_ok());
        let err = gate.admit("c").unwrap_err();
        assert_eq!(err.reason, "max_concurrent_calls_reached");
        assert_eq!(err.in_use, 2);
        assert_eq!(err.limit, 2);
    }

    #[test]
    fn release_frees_a_slot() {
        let gate = AdmissionGate::new(1);
        gate.admit("a").unwrap();
        assert!(gate.admit("b").is_err());
        gate.release("a");
        assert!(gate.admit("b").is_ok());
    }

    #[test]
    fn release_is_idempotent() {
        let gate = AdmissionGate::new(1);
        gate.release("ghost");
        assert_eq!(gate.in_use(), 0);
    }

    #[test]
    fn readmitting_same_call_id_is_rejected_not_double_counted() {
        let gate = AdmissionGate::new(1);
        gate.admit("a").unwrap();
        assert!(gate.admit("a").is_err());
        assert_eq!(gate.in_use(), 1);
    }
}
