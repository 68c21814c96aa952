//! FretCoach Model Client
//!
//! The boundary to the multimodal model: one prompt plus an ordered set of
//! encoded frames in, free text out. The reply is not validated here.

pub mod gemini;

use fretcoach_common::error::FretcoachResult;
use fretcoach_evidence::EncodedImage;

pub use gemini::GeminiClient;

/// A multimodal text generator.
#[async_trait::async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Send one request carrying the prompt and every image, in order.
    async fn generate(&self, prompt: &str, images: &[EncodedImage]) -> FretcoachResult<String>;

    /// Human-readable model name.
    fn name(&self) -> &str;
}
