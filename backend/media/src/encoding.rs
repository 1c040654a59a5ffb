//! Base64 encoding of selected images into inline request parts.

use base64::{engine::general_purpose::STANDARD, Engine};
use dropcheck_core::InlineImage;
use futures::future::try_join_all;
use tracing::debug;

use crate::file::ImageFile;
use crate::MediaError;

/// Split a `data:<mime>;base64,<payload>` URL into its declared MIME type
/// (empty when absent) and payload. Returns `None` for anything else.
pub fn strip_data_url_prefix(s: &str) -> Option<(&str, &str)> {
    let rest = s.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let mime = header.strip_suffix(";base64")?;
    Some((mime, payload))
}

/// Read one file and encode it as an inline image part.
///
/// Unreadable or empty inputs are errors, never an empty payload. Contents
/// that are already a base64 data URL are unwrapped rather than re-encoded.
pub async fn encode_image(file: &ImageFile) -> Result<InlineImage, MediaError> {
    let bytes = file.read_all().await?;
    if bytes.is_empty() {
        return Err(MediaError::Empty {
            name: file.name().to_string(),
        });
    }

    if bytes.starts_with(b"data:") {
        let text = std::str::from_utf8(&bytes).map_err(|_| MediaError::MalformedDataUrl {
            name: file.name().to_string(),
        })?;
        let (declared, payload) =
            strip_data_url_prefix(text.trim()).ok_or_else(|| MediaError::MalformedDataUrl {
                name: file.name().to_string(),
            })?;
        if payload.is_empty() || STANDARD.decode(payload).is_err() {
            return Err(MediaError::MalformedDataUrl {
                name: file.name().to_string(),
            });
        }
        let mime_type = if declared.is_empty() {
            file.media_type().to_string()
        } else {
            declared.to_string()
        };
        return Ok(InlineImage {
            mime_type,
            data: payload.to_string(),
        });
    }

    debug!(name = %file.name(), bytes = bytes.len(), "Encoding image");
    Ok(InlineImage {
        mime_type: file.media_type().to_string(),
        data: STANDARD.encode(&bytes),
    })
}

/// Encode every file concurrently, preserving order. The first failure fails
/// the whole batch.
pub async fn encode_all(files: &[ImageFile]) -> Result<Vec<InlineImage>, MediaError> {
    try_join_all(files.iter().map(encode_image)).await
}
