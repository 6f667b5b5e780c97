use gw_domain::config::{Config, ConfigSeverity};

#[test]
fn default_server_binds_all_interfaces() {
    let config = Config::default();
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 8080);
}

#[test]
fn env_substitution_applies_before_parsing() {
    std::env::set_var("GW_TEST_PORT_DEFAULTS", "9443");
    let yaml = r#"
server:
  host: "0.0.0.0"
  port: ${GW_TEST_PORT_DEFAULTS}
"#;
    let config = Config::load_from_str(yaml).unwrap();
    assert_eq!(config.server.port, 9443);
}

#[test]
fn missing_media_server_and_journal_url_are_validation_errors() {
    let config = Config::default();
    let errors = config.validate();
    assert!(errors
        .iter()
        .any(|e| e.field == "media_server.base_url" && e.severity == ConfigSeverity::Error));
    assert!(errors
        .iter()
        .any(|e| e.field == "journal.database_url" && e.severity == ConfigSeverity::Error));
    assert!(errors
        .iter()
        .any(|e| e.field == "sip_trunks" && e.severity == ConfigSeverity::Warning));
}
