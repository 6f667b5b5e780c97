use serde::{Deserialize, Serialize};

/// Ambient HTTP server settings for the `gateway` binary's axum listener.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "d_host")]
    pub host: String,
    #[serde(default = "d_port")]
    pub port: u16,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: d_host(),
            port: d_port(),
            cors: CorsConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "d_rl_enabled")]
    pub enabled: bool,
    #[serde(default = "d_rl_burst_size")]
    pub burst_size: u32,
    #[serde(default = "d_rl_per_second")]
    pub per_second: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: d_rl_enabled(),
            burst_size: d_rl_burst_size(),
            per_second: d_rl_per_second(),
        }
    }
}

fn d_host() -> String {
    "0.0.0.0".into()
}
fn d_port() -> u16 {
    8080
}
fn d_rl_enabled() -> bool {
    true
}
fn d_rl_burst_size() -> u32 {
    20
}
fn d_rl_per_second() -> u64 {
    10
}
