//! MIME type detection for selected images.
//!
//! Declared types win; otherwise the file's magic bytes, then its extension.

use std::path::Path;

/// Fallback type for anything unrecognized.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Detect MIME type by file extension.
pub fn detect_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png"          => "image/png",
        "gif"          => "image/gif",
        "webp"         => "image/webp",
        "heic"         => "image/heic",
        "heif"         => "image/heif",
        "avif"         => "image/avif",
        "bmp"          => "image/bmp",
        "tiff" | "tif" => "image/tiff",

        "pdf"          => "application/pdf",
        "txt"          => "text/plain",
        "json"         => "application/json",

        _              => OCTET_STREAM,
    }
}

/// Detect MIME type from leading magic bytes.
pub fn sniff_mime_type(bytes: &[u8]) -> Option<&'static str> {
    infer::get(bytes).map(|kind| kind.mime_type())
}

/// Pick the media type for an input: a meaningful declared type, else the
/// sniffed type, else the extension mapping.
pub fn resolve_media_type(declared: Option<&str>, name: &str, bytes: &[u8]) -> String {
    if let Some(declared) = declared.map(str::trim) {
        if !declared.is_empty() && declared != OCTET_STREAM {
            return declared.to_string();
        }
    }
    if let Some(sniffed) = sniff_mime_type(bytes) {
        return sniffed.to_string();
    }
    detect_mime_type(Path::new(name)).to_string()
}

/// Whether a MIME type is for an image.
pub fn is_image(mime: &str) -> bool {
    mime.starts_with("image/")
}

/// Whether a preview of this type is safe to serve inline.
pub fn is_inline_safe(mime: &str) -> bool {
    matches!(
        mime,
        "image/jpeg" | "image/png" | "image/gif" | "image/webp" | "image/avif" | "image/bmp"
    )
}
