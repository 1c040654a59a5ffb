use std::path::{Path, PathBuf};

use anyhow::Result;
use dropcheck_config::{config_dir, config_file_path, load_and_prepare, DropcheckConfig};
use dropcheck_core::DropcheckError;
use dropcheck_logging::LoggerOptions;

/// Resolved runtime settings for commands that talk to the model.
#[derive(Debug, Clone)]
pub struct Settings {
    /// HTTP server bind address
    pub bind_address: String,
    /// HTTP server port
    pub port: u16,
    /// Gemini API key
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub max_images: usize,
    pub preview_capacity: usize,
    pub max_upload_bytes: usize,
}

impl Settings {
    /// Build from an effective config. A missing credential is fatal.
    pub fn from_config(config: &DropcheckConfig) -> Result<Self, DropcheckError> {
        let api_key = config.api_key().ok_or_else(|| {
            DropcheckError::ConfigError(
                "API key not set; export GEMINI_API_KEY (or API_KEY) or set gemini.apiKey".into(),
            )
        })?;

        Ok(Self {
            bind_address: config.bind().to_string(),
            port: config.port(),
            api_key: api_key.to_string(),
            model: config.model().to_string(),
            base_url: config.base_url().to_string(),
            max_images: config.max_images(),
            preview_capacity: config.preview_capacity(),
            max_upload_bytes: config.max_upload_bytes(),
        })
    }
}

/// Config file to use: the explicit path, else the default location.
pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config_file_path(&config_dir()))
}

pub async fn load(path: &Path) -> Result<DropcheckConfig> {
    load_and_prepare(path).await
}

pub fn logger_options(config: &DropcheckConfig) -> LoggerOptions {
    LoggerOptions {
        level: config.log_level().to_string(),
        json: config.log_json(),
        log_dir: config.log_dir().map(PathBuf::from),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dropcheck_config::{apply_all_defaults, GeminiConfig};

    #[test]
    fn missing_key_is_config_error() {
        let config = apply_all_defaults(DropcheckConfig::default());
        let err = Settings::from_config(&config).unwrap_err();
        assert!(matches!(err, DropcheckError::ConfigError(_)));
    }

    #[test]
    fn resolves_defaults() {
        let config = apply_all_defaults(DropcheckConfig {
            gemini: Some(GeminiConfig {
                api_key: Some("AIza-test".into()),
                ..Default::default()
            }),
            ..Default::default()
        });
        let settings = Settings::from_config(&config).unwrap();
        assert_eq!(settings.model, "gemini-2.5-flash");
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.bind_address, "127.0.0.1");
    }
}
