use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;

/// Per-endpoint call counters (spec §4.2: "total, success, failure,
/// retries, avg_latency_ms").
#[derive(Debug, Clone, Default)]
pub struct EndpointMetrics {
    pub total: u64,
    pub success: u64,
    pub failure: u64,
    pub retries: u64,
    total_latency_ms: u64,
}

impl EndpointMetrics {
    pub fn avg_latency_ms(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.total_latency_ms as f64 / self.total as f64
        }
    }
}

/// Aggregates retry/latency metrics per Twirp endpoint called.
#[derive(Default)]
pub struct ClientMetrics {
    by_endpoint: Mutex<HashMap<String, EndpointMetrics>>,
}

impl ClientMetrics {
    pub fn record_attempt(&self, endpoint: &str, latency: Duration, succeeded: bool, retried: bool) {
        let mut map = self.by_endpoint.lock();
        let entry = map.entry(endpoint.to_string()).or_default();
        entry.total += 1;
        entry.total_latency_ms += latency.as_millis() as u64;
        if succeeded {
            entry.success += 1;
        } else {
            entry.failure += 1;
        }
        if retried {
            entry.retries += 1;
        }
        metrics::counter!("media_client_requests_total", "endpoint" => endpoint.to_string()).increment(1);
    }

    pub fn snapshot(&self, endpoint: &str) -> EndpointMetrics {
        self.by_endpoint.lock().get(endpoint).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_success_and_failure_counts() {
        let m = ClientMetrics::default();
        m.record_attempt("CreateRoom", Duration::from_millis(10), true, false);
        m.record_attempt("CreateRoom", Duration::from_millis(20), false, true);
        let snap = m.snapshot("CreateRoom");
        assert_eq!(snap.total, 2);
        assert_eq!(snap.success, 1);
        assert_eq!(snap.failure, 1);
        assert_eq!(snap.retries, 1);
        assert_eq!(snap.avg_latency_ms(), 15.0);
    }
}
