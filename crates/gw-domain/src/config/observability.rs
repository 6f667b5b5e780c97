use serde::{Deserialize, Serialize};

/// Logging / tracing export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "d_log_level")]
    pub log_level: String,
    /// OTLP collector endpoint. Unset disables OpenTelemetry export entirely.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
    #[serde(default = "d_metrics_port")]
    pub metrics_port: u16,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: d_log_level(),
            otlp_endpoint: None,
            metrics_port: d_metrics_port(),
        }
    }
}

fn d_log_level() -> String {
    "info".into()
}
fn d_metrics_port() -> u16 {
    9090
}
