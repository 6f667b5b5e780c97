use serde::{Deserialize, Serialize};

/// Connection settings for the external real-time media server (spec §4.2,
/// §6). Credentials are resolved from the named env vars at startup, never
/// stored in the config struct itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaServerConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(default = "d_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "d_api_secret_env")]
    pub api_secret_env: String,
    #[serde(default)]
    pub retry: RetryPolicyConfig,
}

impl Default for MediaServerConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key_env: d_api_key_env(),
            api_secret_env: d_api_secret_env(),
            retry: RetryPolicyConfig::default(),
        }
    }
}

/// Generic retry/backoff policy (spec §4.2). Shared between MC and, by
/// extension, anything that needs the same shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicyConfig {
    #[serde(default = "d_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "d_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "d_max_delay_ms")]
    pub max_delay_ms: u64,
    #[serde(default = "d_multiplier")]
    pub multiplier: f64,
    #[serde(default = "d_jitter")]
    pub jitter: bool,
}

impl Default for RetryPolicyConfig {
    fn default() -> Self {
        Self {
            max_attempts: d_max_attempts(),
            base_delay_ms: d_base_delay_ms(),
            max_delay_ms: d_max_delay_ms(),
            multiplier: d_multiplier(),
            jitter: d_jitter(),
        }
    }
}

fn d_api_key_env() -> String {
    "MEDIA_SERVER_API_KEY".into()
}
fn d_api_secret_env() -> String {
    "MEDIA_SERVER_API_SECRET".into()
}
fn d_max_attempts() -> u32 {
    3
}
fn d_base_delay_ms() -> u64 {
    1_000
}
fn d_max_delay_ms() -> u64 {
    60_000
}
fn d_multiplier() -> f64 {
    2.0
}
fn d_jitter() -> bool {
    true
}
