use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use gw_domain::config::SipTrunkConfig;
use gw_domain::model::{TrunkHealth, TrunkState};
use gw_domain::{BackoffPolicy, TraceEvent};
use parking_lot::{Mutex, RwLock};

use crate::prober::TrunkProber;

fn state_gauge_value(state: TrunkState) -> f64 {
    match state {
        TrunkState::Connected => 1.0,
        TrunkState::Connecting => 0.5,
        TrunkState::Unknown => 0.0,
        TrunkState::Disconnected => -0.5,
        TrunkState::Failed => -1.0,
    }
}

/// Maintains reachability state per configured SIP trunk and runs the
/// health-probe / reconnection loops (spec §4.3).
pub struct TrunkSupervisor {
    trunks: HashMap<String, SipTrunkConfig>,
    health: RwLock<HashMap<String, TrunkHealth>>,
    /// Single-writer guard: at most one reconnection task per trunk
    /// (spec §8 invariant 5).
    reconnecting: Mutex<HashSet<String>>,
    prober: Arc<dyn TrunkProber>,
}

impl TrunkSupervisor {
    pub fn new(trunks: Vec<SipTrunkConfig>, prober: Arc<dyn TrunkProber>) -> Arc<Self> {
        let mut health = HashMap::new();
        for trunk in &trunks {
            health.insert(trunk.name.clone(), TrunkHealth::new(trunk.name.clone()));
        }
        Arc::new(Self {
            trunks: trunks.into_iter().map(|t| (t.name.clone(), t)).collect(),
            health: RwLock::new(health),
            reconnecting: Mutex::new(HashSet::new()),
            prober,
        })
    }

    pub fn health_status(&self) -> HashMap<String, TrunkHealth> {
        self.health.read().clone()
    }

    pub fn trunk_health(&self, name: &str) -> Option<TrunkHealth> {
        self.health.read().get(name).cloned()
    }

    /// Spawns one health-probe loop per configured trunk. Each loop ticks
    /// at the trunk's configured `health_check.interval` (spec §4.3).
    pub fn spawn_probe_loops(self: &Arc<Self>) -> Vec<tokio::task::JoinHandle<()>> {
        self.trunks
            .values()
            .filter(|t| t.health_check.enabled)
            .map(|trunk| {
                let this = self.clone();
                let trunk = trunk.clone();
                tokio::spawn(async move { this.probe_loop(trunk).await })
            })
            .collect()
    }

    async fn probe_loop(self: Arc<Self>, trunk: SipTrunkConfig) {
        let mut ticker = tokio::time::interval(Duration::from_secs(trunk.health_check.interval));
        loop {
            ticker.tick().await;
            self.run_probe_once(&trunk).await;
        }
    }

    /// Runs a single probe against `trunk` and updates its health record.
    /// Exposed separately from the loop so tests can drive individual
    /// probes deterministically.
    pub async fn run_probe_once(&self, trunk: &SipTrunkConfig) {
        let timeout = Duration::from_secs(trunk.health_check.timeout);
        let result = self.prober.probe(&trunk.host, trunk.port, timeout).await;

        let (failure_count, should_reconnect) = {
            let mut health = self.health.write();
            let entry = health
                .entry(trunk.name.clone())
                .or_insert_with(|| TrunkHealth::new(trunk.name.clone()));
            let from = entry.state;

            match result {
                Ok(elapsed) => {
                    entry.record_success(elapsed.as_millis() as u64);
                }
                Err(e) => {
                    entry.record_failure(e.to_string());
                }
            }

            if entry.state != from {
                TraceEvent::TrunkStateChanged {
                    trunk: trunk.name.clone(),
                    from: from.as_str().into(),
                    to: entry.state.as_str().into(),
                }
                .emit();
            }

            metrics::gauge!("sip_trunk_status", "trunk" => trunk.name.clone())
                .set(state_gauge_value(entry.state));
            if let Some(rt) = entry.response_time_ms {
                metrics::gauge!("sip_trunk_response_time", "trunk" => trunk.name.clone()).set(rt as f64);
            }

            let should_reconnect = trunk.retry.enabled && entry.failure_count >= trunk.health_check.max_failures;
            (entry.failure_count, should_reconnect)
        };

        if should_reconnect && failure_count >= trunk.health_check.max_failures {
            self.maybe_spawn_reconnect(trunk.clone());
        }
    }

    /// Spawns a reconnection task for `trunk` unless one is already
    /// running (spec §8 invariant 5: "at most one concurrent
    /// reconnection task").
    fn maybe_spawn_reconnect(self: &Arc<Self>, trunk: SipTrunkConfig) {
        let mut guard = self.reconnecting.lock();
        if guard.contains(&trunk.name) {
            return;
        }
        guard.insert(trunk.name.clone());
        drop(guard);

        let this = self.clone();
        tokio::spawn(async move {
            this.reconnect_loop(trunk.clone()).await;
            this.reconnecting.lock().remove(&trunk.name);
        });
    }

    async fn reconnect_loop(self: Arc<Self>, trunk: SipTrunkConfig) {
        {
            let mut health = self.health.write();
            if let Some(entry) = health.get_mut(&trunk.name) {
                entry.state = TrunkState::Connecting;
            }
        }

        let backoff = BackoffPolicy::new(
            Duration::from_millis(trunk.retry.initial_delay_ms),
            Duration::from_millis(trunk.retry.max_delay_ms),
            trunk.retry.multiplier,
            false,
        );

        let timeout = Duration::from_secs(trunk.health_check.timeout);
        let mut attempt: u32 = 0;
        loop {
            metrics::counter!("sip_trunk_reconnection_attempts", "trunk" => trunk.name.clone()).increment(1);
            TraceEvent::TrunkReconnectAttempt {
                trunk: trunk.name.clone(),
                attempt,
            }
            .emit();

            match self.prober.probe(&trunk.host, trunk.port, timeout).await {
                Ok(elapsed) => {
                    let mut health = self.health.write();
                    if let Some(entry) = health.get_mut(&trunk.name) {
                        entry.record_success(elapsed.as_millis() as u64);
                    }
                    return;
                }
                Err(_) => {
                    attempt += 1;
                    if backoff.should_give_up(attempt, trunk.retry.max_attempts) {
                        let mut health = self.health.write();
                        if let Some(entry) = health.get_mut(&trunk.name) {
                            entry.state = TrunkState::Failed;
                        }
                        return;
                    }
                    tokio::time::sleep(backoff.delay_for_attempt(attempt - 1)).await;
                }
            }
        }
    }

    pub fn is_reconnecting(&self, trunk_name: &str) -> bool {
        self.reconnecting.lock().contains(trunk_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use gw_domain::config::{HealthCheckConfig, TrunkRetryConfig};
    use gw_domain::Result;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn trunk(name: &str) -> SipTrunkConfig {
        SipTrunkConfig {
            name: name.into(),
            host: "sip.example.com".into(),
            port: 5060,
            transport: "udp".into(),
            username: None,
            password: None,
            register: false,
            register_interval: 3600,
            keep_alive_interval: 30,
            health_check: HealthCheckConfig {
                enabled: true,
                interval: 60,
                timeout: 1,
                max_failures: 3,
            },
            retry: TrunkRetryConfig {
                enabled: true,
                initial_delay_ms: 1,
                max_delay_ms: 5,
                multiplier: 2.0,
                max_attempts: 2,
            },
        }
    }

    /// Scripted prober: fails the first `fail_times` calls, then succeeds.
    struct ScriptedProber {
        fail_times: usize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TrunkProber for ScriptedProber {
        async fn probe(&self, _host: &str, _port: u16, _timeout: Duration) -> Result<Duration> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.fail_times {
                Err(gw_domain::Error::Connection("refused".into()))
            } else {
                Ok(Duration::from_millis(5))
            }
        }
    }

    #[tokio::test]
    async fn failures_increment_and_flip_to_disconnected() {
        let prober = Arc::new(ScriptedProber { fail_times: 10, calls: AtomicUsize::new(0) });
        let sup = TrunkSupervisor::new(vec![trunk("novofon")], prober);
        let t = trunk("novofon");

        sup.run_probe_once(&t).await;
        sup.run_probe_once(&t).await;
        let health = sup.trunk_health("novofon").unwrap();
        assert_eq!(health.failure_count, 2);
        assert_eq!(health.state, TrunkState::Disconnected);
    }

    #[tokio::test]
    async fn three_failures_spawn_a_single_reconnection_task() {
        let prober = Arc::new(ScriptedProber { fail_times: 10, calls: AtomicUsize::new(0) });
        let sup = TrunkSupervisor::new(vec![trunk("novofon")], prober);
        let t = trunk("novofon");

        sup.run_probe_once(&t).await;
        sup.run_probe_once(&t).await;
        sup.run_probe_once(&t).await;

        // Give the spawned reconnect task a chance to register itself.
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(sup.is_reconnecting("novofon"));

        // A further probe at this failure count must not spawn a second task.
        sup.run_probe_once(&t).await;
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn reconnect_succeeds_and_resets_failure_count() {
        // First three probe calls fail (driving the supervisor into
        // reconnect), the fourth (the reconnect attempt) succeeds.
        let prober = Arc::new(ScriptedProber { fail_times: 3, calls: AtomicUsize::new(0) });
        let sup = TrunkSupervisor::new(vec![trunk("novofon")], prober);
        let t = trunk("novofon");

        sup.run_probe_once(&t).await;
        sup.run_probe_once(&t).await;
        sup.run_probe_once(&t).await;

        // Wait for the reconnect task to complete.
        for _ in 0..50 {
            if !sup.is_reconnecting("novofon") {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let health = sup.trunk_health("novofon").unwrap();
        assert_eq!(health.state, TrunkState::Connected);
        assert_eq!(health.failure_count, 0);
    }

    #[tokio::test]
    async fn reconnect_exhausts_attempts_and_marks_failed() {
        let prober = Arc::new(ScriptedProber { fail_times: 100, calls: AtomicUsize::new(0) });
        let sup = TrunkSupervisor::new(vec![trunk("novofon")], prober);
        let t = trunk("novofon");

        sup.run_probe_once(&t).await;
        sup.run_probe_once(&t).await;
        sup.run_probe_once(&t).await;

        for _ in 0..100 {
            if !sup.is_reconnecting("novofon") {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let health = sup.trunk_health("novofon").unwrap();
        assert_eq!(health.state, TrunkState::Failed);
    }
}
