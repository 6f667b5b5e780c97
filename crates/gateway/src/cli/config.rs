use std::path::Path;

use gw_domain::config::{Config, ConfigSeverity};

/// `gw config validate`: prints every issue found by [`Config::validate`]
/// and returns whether the config is error-free. Grounded on
/// `sa_gateway::cli::config::validate`.
pub fn validate(config: &Config, path: &Path) -> bool {
    println!("Validating {}", path.display());
    let issues = config.validate();

    if issues.is_empty() {
        println!("  OK — no issues found");
        return true;
    }

    let mut error_count = 0;
    let mut warning_count = 0;
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Error => error_count += 1,
            ConfigSeverity::Warning => warning_count += 1,
        }
        println!("  {issue}");
    }

    println!("\n{error_count} error(s), {warning_count} warning(s)");
    error_count == 0
}

/// `gw config show`: dumps the effective, env-substituted configuration
/// as YAML.
pub fn show(config: &Config) -> anyhow::Result<()> {
    println!("{}", serde_yaml::to_string(config)?);
    Ok(())
}
