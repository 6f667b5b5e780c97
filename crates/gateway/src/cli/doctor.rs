use std::path::Path;

use gw_domain::config::{Config, ConfigSeverity};

fn print_check(name: &str, passed: bool, detail: &str) {
    let marker = if passed { "OK" } else { "FAIL" };
    println!("  [{marker}] {name}: {detail}");
}

/// `gw doctor`: a sequence of startup diagnostics run without actually
/// starting the server, grounded on `sa_gateway::cli::doctor::run`'s
/// "one check function per concern, all_passed accumulated" shape.
pub async fn run(config: &Config, config_path: &Path) -> anyhow::Result<bool> {
    println!("Voice-AI Call Gateway — doctor\n");
    let mut all_passed = true;

    check_config_file(config_path, &mut all_passed);
    check_config_validation(config, &mut all_passed);
    check_required_env(config, &mut all_passed);
    check_journal_reachable(config, &mut all_passed).await;
    check_media_server_reachable(config, &mut all_passed).await;

    println!();
    if all_passed {
        println!("All checks passed.");
    } else {
        println!("Some checks failed — see above.");
    }
    Ok(all_passed)
}

fn check_config_file(path: &Path, all_passed: &mut bool) {
    let exists = path.exists();
    if !exists {
        *all_passed = false;
    }
    print_check(
        "config file",
        exists,
        &format!("{}{}", path.display(), if exists { "" } else { " (not found, using defaults)" }),
    );
}

fn check_config_validation(config: &Config, all_passed: &mut bool) {
    let issues = config.validate();
    let errors = issues.iter().filter(|i| i.severity == ConfigSeverity::Error).count();
    let warnings = issues.len() - errors;
    if errors > 0 {
        *all_passed = false;
    }
    print_check(
        "config validation",
        errors == 0,
        &format!("{errors} error(s), {warnings} warning(s)"),
    );
}

fn check_required_env(config: &Config, all_passed: &mut bool) {
    let vars = [
        config.token_authority.signing_secret_env.as_str(),
        config.media_server.api_key_env.as_str(),
        config.media_server.api_secret_env.as_str(),
        config.webhook.secret_env.as_str(),
    ];
    for var in vars {
        if var.is_empty() {
            continue;
        }
        let present = std::env::var(var).is_ok();
        if !present {
            *all_passed = false;
        }
        print_check(&format!("env {var}"), present, if present { "set" } else { "unset" });
    }
}

async fn check_journal_reachable(config: &Config, all_passed: &mut bool) {
    match gw_journal::Journal::connect(&config.journal).await {
        Ok(_) => print_check("journal database", true, &config.journal.database_url),
        Err(err) => {
            *all_passed = false;
            print_check("journal database", false, &err.to_string());
        }
    }
}

async fn check_media_server_reachable(config: &Config, all_passed: &mut bool) {
    if config.media_server.base_url.is_empty() {
        *all_passed = false;
        print_check("media server", false, "no base_url configured");
        return;
    }
    match reqwest::Client::new().get(&config.media_server.base_url).send().await {
        Ok(_) => print_check("media server", true, &config.media_server.base_url),
        Err(err) => {
            *all_passed = false;
            print_check("media server", false, &err.to_string());
        }
    }
}
