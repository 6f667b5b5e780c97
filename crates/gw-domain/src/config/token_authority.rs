use serde::{Deserialize, Serialize};

/// Token Authority settings (spec §4.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenAuthorityConfig {
    /// Env var holding the process-wide token signing secret.
    #[serde(default = "d_signing_secret_env")]
    pub signing_secret_env: String,
    #[serde(default = "d_default_ttl_secs")]
    pub default_ttl_secs: i64,
    #[serde(default = "d_renewal_check_interval_secs")]
    pub renewal_check_interval_secs: u64,
    /// Renew when remaining validity drops to this many minutes (spec §4.1:
    /// "When expires_at - now <= 2 min").
    #[serde(default = "d_renewal_headroom_minutes")]
    pub renewal_headroom_minutes: i64,
}

impl Default for TokenAuthorityConfig {
    fn default() -> Self {
        Self {
            signing_secret_env: d_signing_secret_env(),
            default_ttl_secs: d_default_ttl_secs(),
            renewal_check_interval_secs: d_renewal_check_interval_secs(),
            renewal_headroom_minutes: d_renewal_headroom_minutes(),
        }
    }
}

fn d_signing_secret_env() -> String {
    "GATEWAY_SIGNING_SECRET".into()
}
fn d_default_ttl_secs() -> i64 {
    3600
}
fn d_renewal_check_interval_secs() -> u64 {
    60
}
fn d_renewal_headroom_minutes() -> i64 {
    2
}
