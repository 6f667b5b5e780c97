use serde::{Deserialize, Serialize};

/// One configured SIP peer (spec §6 `sip_trunks[]`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SipTrunkConfig {
    pub name: String,
    pub host: String,
    #[serde(default = "d_sip_port")]
    pub port: u16,
    #[serde(default = "d_transport")]
    pub transport: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub register: bool,
    #[serde(default = "d_register_interval")]
    pub register_interval: u64,
    #[serde(default = "d_keep_alive_interval")]
    pub keep_alive_interval: u64,
    #[serde(default)]
    pub health_check: HealthCheckConfig,
    #[serde(default)]
    pub retry: TrunkRetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckConfig {
    #[serde(default = "d_true")]
    pub enabled: bool,
    #[serde(default = "d_health_check_interval")]
    pub interval: u64,
    #[serde(default = "d_health_check_timeout")]
    pub timeout: u64,
    #[serde(default = "d_max_failures")]
    pub max_failures: u32,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            enabled: d_true(),
            interval: d_health_check_interval(),
            timeout: d_health_check_timeout(),
            max_failures: d_max_failures(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrunkRetryConfig {
    #[serde(default = "d_true")]
    pub enabled: bool,
    #[serde(default = "d_initial_delay_ms")]
    pub initial_delay_ms: u64,
    #[serde(default = "d_max_delay_ms")]
    pub max_delay_ms: u64,
    #[serde(default = "d_multiplier")]
    pub multiplier: f64,
    #[serde(default = "d_retry_max_attempts")]
    pub max_attempts: u32,
}

impl Default for TrunkRetryConfig {
    fn default() -> Self {
        Self {
            enabled: d_true(),
            initial_delay_ms: d_initial_delay_ms(),
            max_delay_ms: d_max_delay_ms(),
            multiplier: d_multiplier(),
            max_attempts: d_retry_max_attempts(),
        }
    }
}

/// One configured audio codec (spec §6 `audio_codecs[]`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioCodecConfig {
    pub name: String,
    pub payload_type: u8,
    pub sample_rate: u32,
    pub channels: u8,
    #[serde(default)]
    pub priority: i32,
    #[serde(default = "d_true")]
    pub enabled: bool,
}

fn d_sip_port() -> u16 {
    5060
}
fn d_transport() -> String {
    "udp".into()
}
fn d_register_interval() -> u64 {
    3600
}
fn d_keep_alive_interval() -> u64 {
    30
}
fn d_health_check_interval() -> u64 {
    60
}
fn d_health_check_timeout() -> u64 {
    5
}
fn d_max_failures() -> u32 {
    3
}
fn d_initial_delay_ms() -> u64 {
    1_000
}
fn d_max_delay_ms() -> u64 {
    30_000
}
fn d_multiplier() -> f64 {
    2.0
}
fn d_retry_max_attempts() -> u32 {
    5
}
fn d_true() -> bool {
    true
}
