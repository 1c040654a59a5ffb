//! CLI Doctor Command
//!
//! Checks the credential and the effective configuration without contacting
//! the model.

use std::path::Path;

use dropcheck_config::{validate, DropcheckConfig, API_KEY_VAR, LEGACY_API_KEY_VAR};

use crate::report::{note_error, note_info, note_success, note_warn};

/// Run every check; returns whether all passed.
pub fn run(config: &DropcheckConfig, config_path: &Path) -> bool {
    println!("\nRunning dropcheck doctor...\n");

    note_info(&format!("Config file: {}", config_path.display()));
    let env_ok = check_env_vars();
    let config_ok = check_config(config);

    println!();
    let ok = env_ok && config_ok;
    if ok {
        note_success("All checks passed.");
    } else {
        note_error("Some checks failed. Please fix the errors above.");
    }
    ok
}

fn is_set(var: &str) -> bool {
    std::env::var(var).map(|v| !v.trim().is_empty()).unwrap_or(false)
}

fn check_env_vars() -> bool {
    match (is_set(API_KEY_VAR), is_set(LEGACY_API_KEY_VAR)) {
        (true, _) => note_success(&format!("{API_KEY_VAR} is set")),
        (false, true) => note_warn(&format!(
            "{API_KEY_VAR} is missing; falling back to {LEGACY_API_KEY_VAR}"
        )),
        (false, false) => note_info(&format!(
            "{API_KEY_VAR} is not set; the config file must provide gemini.apiKey"
        )),
    }
    true
}

fn check_config(config: &DropcheckConfig) -> bool {
    let report = validate(config);
    for warning in &report.warnings {
        note_warn(&format!("{}: {}", warning.path, warning.message));
    }
    for error in &report.errors {
        note_error(&format!("{}: {}", error.path, error.message));
    }
    if report.is_valid() {
        note_success(&format!("Config valid (model {})", config.model()));
    }
    report.is_valid()
}
