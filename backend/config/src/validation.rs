//! Config validation with field paths in every message.

use thiserror::Error;

use crate::schema::DropcheckConfig;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &DropcheckConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_gemini(config, &mut report);
    validate_server(config, &mut report);
    validate_intake(config, &mut report);
    report
}

fn validate_gemini(config: &DropcheckConfig, report: &mut ValidationReport) {
    if config.api_key().is_none() {
        report.error(
            "gemini.apiKey",
            "API key is required; set GEMINI_API_KEY (or API_KEY) or gemini.apiKey",
        );
    }
    if config.model().trim().is_empty() {
        report.error("gemini.model", "Model name cannot be empty");
    }
    let url = config.base_url();
    if !(url.starts_with("https://") || url.starts_with("http://")) {
        report.error("gemini.baseUrl", format!("'{url}' is not an http(s) URL"));
    } else if url.starts_with("http://") {
        report.warn("gemini.baseUrl", "Plain http sends the API key unencrypted");
    }
}

fn validate_server(config: &DropcheckConfig, report: &mut ValidationReport) {
    let port = config.port();
    if port == 0 {
        report.error("server.port", "Port must be > 0");
    } else if port < 1024 && port != 80 && port != 443 {
        report.warn(
            "server.port",
            format!("Port {port} requires elevated privileges; consider using a port >= 1024"),
        );
    }
}

fn validate_intake(config: &DropcheckConfig, report: &mut ValidationReport) {
    let max_images = config.max_images();
    if max_images == 0 {
        report.error("intake.maxImages", "maxImages must be >= 1");
    }
    let capacity = config.preview_capacity();
    if capacity < max_images {
        report.error(
            "intake.previewCapacity",
            format!("previewCapacity ({capacity}) must be >= maxImages ({max_images})"),
        );
    } else if capacity < max_images * 2 {
        // A replacement allocates the new batch before releasing the old one.
        report.warn(
            "intake.previewCapacity",
            "previewCapacity below 2 x maxImages can reject a full-size reselection",
        );
    }
    if config.max_upload_bytes() == 0 {
        report.error("intake.maxUploadBytes", "maxUploadBytes must be > 0");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{GeminiConfig, IntakeConfig};

    fn with_key() -> DropcheckConfig {
        DropcheckConfig {
            gemini: Some(GeminiConfig {
                api_key: Some("AIza-test".into()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn keyed_default_config_is_valid() {
        let report = validate(&with_key());
        assert!(report.is_valid(), "errors: {:?}", report.errors);
    }

    #[test]
    fn missing_key_is_error() {
        let report = validate(&DropcheckConfig::default());
        assert!(!report.is_valid());
        assert_eq!(report.errors[0].path, "gemini.apiKey");
    }

    #[test]
    fn blank_key_is_error() {
        let mut config = with_key();
        config.gemini.as_mut().unwrap().api_key = Some("  ".into());
        assert!(!validate(&config).is_valid());
    }

    #[test]
    fn capacity_below_max_images_is_error() {
        let mut config = with_key();
        config.intake = Some(IntakeConfig {
            max_images: Some(10),
            preview_capacity: Some(5),
            ..Default::default()
        });
        let report = validate(&config);
        assert!(report.errors.iter().any(|e| e.path == "intake.previewCapacity"));
    }
}
