//! Environment handling for config values.
//!
//! Two passes: `${VAR_NAME}` substitution inside string values at load time
//! (uppercase `[A-Z_][A-Z0-9_]*` names only, `$${VAR}` escapes to a literal
//! `${VAR}`), then direct overrides from well-known variables.

use std::collections::HashMap;

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;

use crate::schema::{DropcheckConfig, GeminiConfig, LoggingConfig, ServerConfig};

/// `${VAR}` or the escaped form `$${VAR}`.
static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$(\$)?\{([A-Z_][A-Z0-9_]*)\}").unwrap());

/// Primary credential variable.
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
/// Fallback credential variable.
pub const LEGACY_API_KEY_VAR: &str = "API_KEY";

/// Error returned for missing env vars.
#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Substitute `${VAR}` references against a provided environment map.
///
/// Fails if any referenced variable is unset or empty.
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    Ok(substitute_value(value, env, "")?)
}

fn substitute_value(
    value: &Value,
    env: &HashMap<String, String>,
    path: &str,
) -> Result<Value, MissingEnvVarError> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_string(s, env, path)?)),
        Value::Array(arr) => arr
            .iter()
            .enumerate()
            .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                let child_path = if path.is_empty() {
                    k.clone()
                } else {
                    format!("{path}.{k}")
                };
                result.insert(k.clone(), substitute_value(v, env, &child_path)?);
            }
            Ok(Value::Object(result))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(
    s: &str,
    env: &HashMap<String, String>,
    path: &str,
) -> Result<String, MissingEnvVarError> {
    if !s.contains('$') {
        return Ok(s.to_string());
    }

    let mut missing: Option<MissingEnvVarError> = None;
    let substituted = ENV_VAR_PATTERN.replace_all(s, |caps: &Captures| {
        let name = &caps[2];
        if caps.get(1).is_some() {
            return format!("${{{name}}}");
        }
        match env.get(name) {
            Some(val) if !val.is_empty() => val.clone(),
            _ => {
                missing.get_or_insert_with(|| MissingEnvVarError {
                    var_name: name.to_string(),
                    config_path: path.to_string(),
                });
                String::new()
            }
        }
    });

    match missing {
        Some(err) => Err(err),
        None => Ok(substituted.into_owned()),
    }
}

/// Apply overrides from well-known variables on top of the file config.
///
/// `GEMINI_API_KEY` wins over `API_KEY`; both win over the file. Blank values
/// are ignored, as is an unparsable `DROPCHECK_PORT`.
pub fn apply_env_overrides(
    mut config: DropcheckConfig,
    env: &HashMap<String, String>,
) -> DropcheckConfig {
    let get = |name: &str| env.get(name).map(|v| v.trim()).filter(|v| !v.is_empty());

    if let Some(key) = get(API_KEY_VAR).or_else(|| get(LEGACY_API_KEY_VAR)) {
        config.gemini.get_or_insert_with(GeminiConfig::default).api_key = Some(key.to_string());
    }
    if let Some(model) = get("DROPCHECK_MODEL") {
        config.gemini.get_or_insert_with(GeminiConfig::default).model = Some(model.to_string());
    }
    if let Some(url) = get("DROPCHECK_GEMINI_URL") {
        config.gemini.get_or_insert_with(GeminiConfig::default).base_url = Some(url.to_string());
    }
    if let Some(bind) = get("DROPCHECK_BIND") {
        config.server.get_or_insert_with(ServerConfig::default).bind = Some(bind.to_string());
    }
    if let Some(port) = get("DROPCHECK_PORT").and_then(|p| p.parse().ok()) {
        config.server.get_or_insert_with(ServerConfig::default).port = Some(port);
    }
    if let Some(dir) = get("DROPCHECK_LOG_DIR") {
        config.logging.get_or_insert_with(LoggingConfig::default).dir = Some(dir.to_string());
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn substitutes_nested_var() {
        let v = json!({"gemini": {"apiKey": "${GEMINI_API_KEY}"}});
        let result = resolve_env_vars_with(&v, &env(&[("GEMINI_API_KEY", "AIza-test")])).unwrap();
        assert_eq!(result["gemini"]["apiKey"], "AIza-test");
    }

    #[test]
    fn error_names_var_and_path() {
        let v = json!({"gemini": {"apiKey": "${MISSING_VAR}"}});
        let err = resolve_env_vars_with(&v, &HashMap::new()).unwrap_err().to_string();
        assert!(err.contains("MISSING_VAR"));
        assert!(err.contains("gemini.apiKey"));
    }

    #[test]
    fn escaped_reference_is_literal() {
        let v = json!({"note": "cost $${HOME} and ${USER_NAME}"});
        let result = resolve_env_vars_with(&v, &env(&[("USER_NAME", "ops")])).unwrap();
        assert_eq!(result["note"], "cost ${HOME} and ops");
    }

    #[test]
    fn passthrough_non_strings() {
        let v = json!({"server": {"port": 9000}, "list": ["plain"]});
        assert_eq!(resolve_env_vars_with(&v, &HashMap::new()).unwrap(), v);
    }

    #[test]
    fn primary_key_var_wins() {
        let config = apply_env_overrides(
            DropcheckConfig::default(),
            &env(&[(API_KEY_VAR, "primary"), (LEGACY_API_KEY_VAR, "legacy")]),
        );
        assert_eq!(config.api_key(), Some("primary"));
    }

    #[test]
    fn legacy_key_var_is_fallback() {
        let config =
            apply_env_overrides(DropcheckConfig::default(), &env(&[(LEGACY_API_KEY_VAR, "legacy")]));
        assert_eq!(config.api_key(), Some("legacy"));
    }

    #[test]
    fn bad_port_is_ignored() {
        let config = apply_env_overrides(
            DropcheckConfig::default(),
            &env(&[("DROPCHECK_PORT", "eighty"), ("DROPCHECK_BIND", "0.0.0.0")]),
        );
        assert_eq!(config.port(), crate::defaults::DEFAULT_PORT);
        assert_eq!(config.bind(), "0.0.0.0");
    }
}
