use thiserror::Error;

/// Message shown when verification is triggered with an empty selection.
pub const SELECT_IMAGES_MESSAGE: &str = "Please select images to verify.";

/// Fallback for failures that carry no message of their own.
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred.";

/// Failures of a single verification attempt, as surfaced to the user.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("No images provided for analysis.")]
    NoImages,

    #[error("Could not read image '{name}': {reason}")]
    UnreadableImage { name: String, reason: String },

    /// Transport and parse failures collapse into this one message; the cause
    /// is logged where it happens and never shown.
    #[error("Failed to analyze images. The AI model could not process the request.")]
    AnalysisFailed,
}

/// Top-level error type for dropcheck.
#[derive(Debug, Error)]
pub enum DropcheckError {
    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Verify(#[from] VerifyError),

    #[error(transparent)]
    Session(#[from] crate::session::SessionError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// User-facing text for an error, falling back when the message is blank.
pub fn user_message(err: &dyn std::error::Error) -> String {
    let msg = err.to_string();
    if msg.trim().is_empty() {
        UNKNOWN_ERROR_MESSAGE.to_string()
    } else {
        msg
    }
}
