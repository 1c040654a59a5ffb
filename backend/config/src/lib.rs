//! `dropcheck-config`: configuration management.
//!
//! Provides:
//! - Typed config schema
//! - YAML loading from the config directory
//! - `${ENV_VAR}` substitution and env overrides
//! - Default value application
//! - Validation
//! - Redaction for safe display

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{
    apply_env_overrides, resolve_env_vars_with, MissingEnvVarError,
    API_KEY_VAR, LEGACY_API_KEY_VAR,
};
pub use io::{config_dir, config_file_path, load_config, load_raw};
pub use redact::redact;
pub use schema::{DropcheckConfig, GeminiConfig, IntakeConfig, LoggingConfig, ServerConfig};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};

/// Load a config file, substitute env vars, apply env overrides and defaults.
///
/// Validation is left to the caller: commands that only inspect the config
/// must still work without a credential.
pub async fn load_and_prepare(path: &Path) -> Result<DropcheckConfig> {
    let env: HashMap<String, String> = std::env::vars().collect();
    load_and_prepare_with(path, &env).await
}

/// [`load_and_prepare`] against an explicit environment.
pub async fn load_and_prepare_with(
    path: &Path,
    env: &HashMap<String, String>,
) -> Result<DropcheckConfig> {
    let raw = load_raw(path).await?;
    let value = resolve_env_vars_with(&raw, env).context("Failed to resolve env vars in config")?;
    let config: DropcheckConfig = serde_json::from_value(value)
        .context("Failed to deserialize config after processing")?;
    let config = apply_env_overrides(config, env);
    Ok(apply_all_defaults(config))
}

/// Serialize the effective config for display with secrets masked.
pub fn redacted_yaml(config: &DropcheckConfig) -> Result<String> {
    let value = serde_json::to_value(config).context("Failed to serialize config")?;
    serde_yaml::to_string(&redact(&value)).context("Failed to render config as YAML")
}
