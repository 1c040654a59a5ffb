//! dropcheck configuration schema.
//!
//! Every field is optional on disk; [`crate::apply_all_defaults`] fills the
//! gaps and the accessors below read the effective values.

use serde::{Deserialize, Serialize};

use crate::defaults::{
    DEFAULT_BASE_URL, DEFAULT_BIND, DEFAULT_LOG_LEVEL, DEFAULT_MAX_IMAGES,
    DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_MODEL, DEFAULT_PORT, DEFAULT_PREVIEW_CAPACITY,
};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropcheckConfig {
    /// Vision model credentials and endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemini: Option<GeminiConfig>,

    /// HTTP surface
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerConfig>,

    /// Selection limits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intake: Option<IntakeConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_images: Option<usize>,
    /// Live previews allowed at once
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_capacity: Option<usize>,
    /// Cap on one upload request body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_upload_bytes: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,
    /// Directory for rolling NDJSON logs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

impl DropcheckConfig {
    /// The credential, if configured and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.gemini
            .as_ref()
            .and_then(|g| g.api_key.as_deref())
            .filter(|k| !k.trim().is_empty())
    }

    pub fn model(&self) -> &str {
        self.gemini
            .as_ref()
            .and_then(|g| g.model.as_deref())
            .unwrap_or(DEFAULT_MODEL)
    }

    pub fn base_url(&self) -> &str {
        self.gemini
            .as_ref()
            .and_then(|g| g.base_url.as_deref())
            .unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn bind(&self) -> &str {
        self.server
            .as_ref()
            .and_then(|s| s.bind.as_deref())
            .unwrap_or(DEFAULT_BIND)
    }

    pub fn port(&self) -> u16 {
        self.server.as_ref().and_then(|s| s.port).unwrap_or(DEFAULT_PORT)
    }

    pub fn max_images(&self) -> usize {
        self.intake
            .as_ref()
            .and_then(|i| i.max_images)
            .unwrap_or(DEFAULT_MAX_IMAGES)
    }

    pub fn preview_capacity(&self) -> usize {
        self.intake
            .as_ref()
            .and_then(|i| i.preview_capacity)
            .unwrap_or(DEFAULT_PREVIEW_CAPACITY)
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.intake
            .as_ref()
            .and_then(|i| i.max_upload_bytes)
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES)
    }

    pub fn log_level(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_json(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }

    pub fn log_dir(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.dir.as_deref())
    }
}
