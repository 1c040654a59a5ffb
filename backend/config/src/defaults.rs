//! Config defaults: applies default values to a parsed config.

use crate::schema::{DropcheckConfig, GeminiConfig, IntakeConfig, LoggingConfig, ServerConfig};

pub use dropcheck_media::{DEFAULT_MAX_IMAGES, DEFAULT_PREVIEW_CAPACITY};
pub use dropcheck_understanding::{DEFAULT_BASE_URL, DEFAULT_MODEL};

pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: DropcheckConfig) -> DropcheckConfig {
    let config = apply_gemini_defaults(config);
    let config = apply_server_defaults(config);
    let config = apply_intake_defaults(config);
    apply_logging_defaults(config)
}

fn apply_gemini_defaults(mut config: DropcheckConfig) -> DropcheckConfig {
    let gemini = config.gemini.get_or_insert_with(GeminiConfig::default);
    gemini.model.get_or_insert_with(|| DEFAULT_MODEL.to_string());
    gemini.base_url.get_or_insert_with(|| DEFAULT_BASE_URL.to_string());
    config
}

fn apply_server_defaults(mut config: DropcheckConfig) -> DropcheckConfig {
    let server = config.server.get_or_insert_with(ServerConfig::default);
    server.bind.get_or_insert_with(|| DEFAULT_BIND.to_string());
    server.port.get_or_insert(DEFAULT_PORT);
    config
}

fn apply_intake_defaults(mut config: DropcheckConfig) -> DropcheckConfig {
    let intake = config.intake.get_or_insert_with(IntakeConfig::default);
    intake.max_images.get_or_insert(DEFAULT_MAX_IMAGES);
    intake.preview_capacity.get_or_insert(DEFAULT_PREVIEW_CAPACITY);
    intake.max_upload_bytes.get_or_insert(DEFAULT_MAX_UPLOAD_BYTES);
    config
}

fn apply_logging_defaults(mut config: DropcheckConfig) -> DropcheckConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    logging.level.get_or_insert_with(|| DEFAULT_LOG_LEVEL.to_string());
    logging.json.get_or_insert(false);
    config
}
