//! Image intake, preview lifecycle, and inline encoding for dropcheck.

use thiserror::Error;

pub mod encoding;
pub mod file;
pub mod intake;
pub mod mime_detect;
pub mod preview;
pub mod preview_server;

pub use encoding::{encode_all, encode_image, strip_data_url_prefix};
pub use file::{ImageData, ImageFile};
pub use intake::{ImageIntake, IntakeOutcome, IntakeSource, SelectedImage, DEFAULT_MAX_IMAGES};
pub use mime_detect::{detect_mime_type, is_image, resolve_media_type, sniff_mime_type};
pub use preview::{PreviewHandle, PreviewRegistry, DEFAULT_PREVIEW_CAPACITY};
pub use preview_server::preview_router;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("could not read '{name}': {source}")]
    Unreadable {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{name}' is empty")]
    Empty { name: String },

    #[error("'{name}' holds a malformed data URL")]
    MalformedDataUrl { name: String },

    #[error("preview table is full ({capacity} entries)")]
    PreviewTableFull { capacity: usize },

    #[error("too many images: {count} selected, at most {max} allowed")]
    TooManyImages { count: usize, max: usize },
}

impl MediaError {
    /// The input the error is about, if any.
    pub fn file_name(&self) -> Option<&str> {
        match self {
            MediaError::Unreadable { name, .. }
            | MediaError::Empty { name }
            | MediaError::MalformedDataUrl { name } => Some(name),
            MediaError::PreviewTableFull { .. } | MediaError::TooManyImages { .. } => None,
        }
    }
}
