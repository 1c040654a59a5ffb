pub mod error;
pub mod session;
pub mod traits;
pub mod types;

pub use error::{user_message, DropcheckError, VerifyError, SELECT_IMAGES_MESSAGE, UNKNOWN_ERROR_MESSAGE};
pub use session::{Attempt, Session, SessionError, SessionStatus};
pub use traits::{ContentPart, InlineImage, VisionModel, VisionRequest, VisionResponse};
pub use types::{ChecklistItem, Criterion, VerificationResult, FAILED_BANNER, PASSED_BANNER};
