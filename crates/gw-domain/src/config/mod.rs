mod call;
mod journal;
mod media_server;
mod observability;
mod routing;
mod server;
mod sip;
mod token_authority;
mod webhook;

pub use call::*;
pub use journal::*;
pub use media_server::*;
pub use observability::*;
pub use routing::*;
pub use server::*;
pub use sip::*;
pub use token_authority::*;
pub use webhook::*;

use serde::{Deserialize, Serialize};
use std::fmt;

/// The gateway's top-level configuration, loaded from `sip.yaml` (spec §6).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub sip_trunks: Vec<SipTrunkConfig>,
    #[serde(default)]
    pub audio_codecs: Vec<AudioCodecConfig>,
    #[serde(default)]
    pub routing_rules: Vec<RoutingRuleConfig>,
    #[serde(default)]
    pub media_server: MediaServerConfig,
    #[serde(default)]
    pub journal: JournalConfig,
    #[serde(default)]
    pub call: CallConfig,
    #[serde(default)]
    pub webhook: WebhookConfig,
    #[serde(default)]
    pub token_authority: TokenAuthorityConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Severity level for a configuration issue (grounded on the teacher's
/// `ConfigSeverity`/`ConfigError` validation report shape).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Load `sip.yaml` from `path`, expanding `${VAR}` / `${VAR:-default}`
    /// references against the process environment before parsing.
    pub fn load_from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::load_from_str(&raw)
    }

    pub fn load_from_str(raw: &str) -> crate::error::Result<Self> {
        let expanded = crate::env_subst::substitute(raw);
        let config = serde_yaml::from_str(&expanded)?;
        Ok(config)
    }

    /// Validate the configuration and return a list of issues. An empty
    /// vec means the config is good to boot with.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.server.port == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "server.port".into(),
                message: "port must be greater than 0".into(),
            });
        }

        if self.media_server.base_url.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "media_server.base_url".into(),
                message: "base_url must not be empty".into(),
            });
        }

        if self.journal.database_url.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "journal.database_url".into(),
                message: "database_url must not be empty".into(),
            });
        }

        if self.sip_trunks.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "sip_trunks".into(),
                message: "no SIP trunks configured — no calls can arrive".into(),
            });
        }

        for trunk in &self.sip_trunks {
            if trunk.name.is_empty() {
                errors.push(ConfigError {
                    severity: ConfigSeverity::Error,
                    field: "sip_trunks[].name".into(),
                    message: "trunk name must not be empty".into(),
                });
            }
            if trunk.port == 0 {
                errors.push(ConfigError {
                    severity: ConfigSeverity::Error,
                    field: format!("sip_trunks[{}].port", trunk.name),
                    message: "port must be greater than 0".into(),
                });
            }
        }

        if self.call.max_concurrent_calls == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "call.max_concurrent_calls".into(),
                message: "must be greater than 0".into(),
            });
        }

        if self.webhook.secret_env.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "webhook.secret_env".into(),
                message:
                    "no webhook secret env var configured — signature verification will be skipped"
                        .into(),
            });
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_from_str_expands_env_vars() {
        std::env::set_var("GW_TEST_DB_URL", "postgres://test/db");
        let yaml = r#"
journal:
  database_url: "${GW_TEST_DB_URL}"
media_server:
  base_url: "https://media.example.com"
"#;
        let config = Config::load_from_str(yaml).unwrap();
        assert_eq!(config.journal.database_url, "postgres://test/db");
        assert_eq!(config.media_server.base_url, "https://media.example.com");
    }

    #[test]
    fn validate_flags_missing_required_fields() {
        let config = Config::default();
        let errors = config.validate();
        assert!(errors
            .iter()
            .any(|e| e.field == "media_server.base_url" && e.severity == ConfigSeverity::Error));
        assert!(errors
            .iter()
            .any(|e| e.field == "journal.database_url" && e.severity == ConfigSeverity::Error));
    }

    #[test]
    fn validate_passes_on_well_formed_config() {
        let mut config = Config::default();
        config.server.port = 8080;
        config.media_server.base_url = "https://media.example.com".into();
        config.journal.database_url = "postgres://localhost/gw".into();
        config.sip_trunks.push(SipTrunkConfig {
            name: "trunk-a".into(),
            host: "sip.example.com".into(),
            port: 5060,
            transport: "udp".into(),
            username: None,
            password: None,
            register: false,
            register_interval: 3600,
            keep_alive_interval: 30,
            health_check: HealthCheckConfig::default(),
            retry: TrunkRetryConfig::default(),
        });
        let errors = config.validate();
        assert!(errors
            .iter()
            .all(|e| e.severity != ConfigSeverity::Error));
    }
}
