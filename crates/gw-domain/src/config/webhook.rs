use serde::{Deserialize, Serialize};

/// Webhook ingestor settings (spec §4.5, §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Env var holding the HMAC secret. Empty means verification is
    /// skipped — spec §4.5: "Missing-secret configurations skip
    /// verification only if explicitly empty, to aid testing; this is
    /// logged."
    #[serde(default)]
    pub secret_env: String,
    #[serde(default = "d_max_event_age_secs")]
    pub max_event_age_secs: i64,
    #[serde(default = "d_queue_capacity")]
    pub queue_capacity: usize,
    #[serde(default = "d_stale_session_max_age_hours")]
    pub stale_session_max_age_hours: i64,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            secret_env: String::new(),
            max_event_age_secs: d_max_event_age_secs(),
            queue_capacity: d_queue_capacity(),
            stale_session_max_age_hours: d_stale_session_max_age_hours(),
        }
    }
}

fn d_max_event_age_secs() -> i64 {
    300
}
fn d_queue_capacity() -> usize {
    1_024
}
fn d_stale_session_max_age_hours() -> i64 {
    24
}
