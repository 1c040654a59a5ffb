use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Base64 image payload plus its declared media type, ready to embed in a
/// request body.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

// Payloads run to megabytes; keep them out of debug logs.
impl fmt::Debug for InlineImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InlineImage")
            .field("mime_type", &self.mime_type)
            .field("data_len", &self.data.len())
            .finish()
    }
}

/// One part of a multimodal prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    Image(InlineImage),
    Text(String),
}

/// Request to a vision model.
#[derive(Debug, Clone)]
pub struct VisionRequest {
    pub model: String,
    pub parts: Vec<ContentPart>,
    pub response_mime_type: String,
    pub response_schema: serde_json::Value,
}

impl VisionRequest {
    pub fn image_count(&self) -> usize {
        self.parts
            .iter()
            .filter(|p| matches!(p, ContentPart::Image(_)))
            .count()
    }
}

/// Raw text response from a vision model.
#[derive(Debug, Clone)]
pub struct VisionResponse {
    pub text: String,
    pub provider: String,
    pub model: String,
    pub latency_ms: u64,
}

/// A multimodal model that answers one request with one text payload.
///
/// Passed explicitly into the request builder so tests can substitute a
/// double for the network client.
#[async_trait]
pub trait VisionModel: Send + Sync {
    /// Provider name (e.g., "gemini").
    fn name(&self) -> &str;

    /// Send one request and return the response text.
    async fn generate(&self, request: &VisionRequest) -> Result<VisionResponse>;
}
