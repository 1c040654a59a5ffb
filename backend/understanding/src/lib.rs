//! Delivery verification through a multimodal vision model.

pub mod gemini;
pub mod mock;
pub mod prompt;
pub mod verification;

pub use gemini::{GeminiProvider, DEFAULT_BASE_URL};
pub use mock::MockVisionModel;
pub use prompt::{DEFAULT_MODEL, DELIVERY_INSTRUCTION};
pub use verification::{analyze_delivery_images, build_request, parse_result, VerifyOptions};
