//! Delivery verification: one request, one structured verdict.

use dropcheck_core::{
    ContentPart, InlineImage, VerificationResult, VerifyError, VisionModel, VisionRequest,
};
use dropcheck_logging::redact_sensitive_data;
use dropcheck_media::{encode_all, ImageFile, MediaError};
use tracing::{error, info, warn};

use crate::prompt::{DEFAULT_MODEL, DELIVERY_INSTRUCTION, RESPONSE_MIME_TYPE};

#[derive(Debug, Clone)]
pub struct VerifyOptions {
    pub model: String,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

/// Assemble the single request: every image part in order, then the fixed
/// instruction, constrained to the verdict schema.
pub fn build_request(images: Vec<InlineImage>, model: &str) -> VisionRequest {
    let mut parts: Vec<ContentPart> = images.into_iter().map(ContentPart::Image).collect();
    parts.push(ContentPart::Text(DELIVERY_INSTRUCTION.to_string()));
    VisionRequest {
        model: model.to_string(),
        parts,
        response_mime_type: RESPONSE_MIME_TYPE.to_string(),
        response_schema: VerificationResult::response_schema(),
    }
}

/// Parse the model's text payload against the verdict schema.
pub fn parse_result(text: &str) -> Result<VerificationResult, serde_json::Error> {
    serde_json::from_str(text.trim())
}

fn unreadable(err: MediaError) -> VerifyError {
    VerifyError::UnreadableImage {
        name: err.file_name().unwrap_or("<unknown>").to_string(),
        reason: err.to_string(),
    }
}

/// Verify a delivery's photo set.
///
/// Fails with [`VerifyError::NoImages`] before doing any work on an empty
/// slice. Any transport or parse failure is logged and reported as
/// [`VerifyError::AnalysisFailed`]. No retries.
pub async fn analyze_delivery_images(
    model: &dyn VisionModel,
    images: &[ImageFile],
    options: &VerifyOptions,
) -> Result<VerificationResult, VerifyError> {
    if images.is_empty() {
        return Err(VerifyError::NoImages);
    }

    let encoded = encode_all(images).await.map_err(|e| {
        warn!(error = %e, "Failed to encode images");
        unreadable(e)
    })?;

    let request = build_request(encoded, &options.model);
    info!(
        provider = model.name(),
        model = %options.model,
        images = request.image_count(),
        "Requesting delivery verification"
    );

    let response = model.generate(&request).await.map_err(|e| {
        error!(
            error = %redact_sensitive_data(&format!("{e:#}")),
            "Error analyzing images"
        );
        VerifyError::AnalysisFailed
    })?;

    let result = parse_result(&response.text).map_err(|e| {
        error!(
            error = %e,
            chars = response.text.len(),
            "Model response did not match the verification schema"
        );
        VerifyError::AnalysisFailed
    })?;

    info!(
        passed = result.overall_passed(),
        latency_ms = response.latency_ms,
        "Verification complete"
    );
    Ok(result)
}
