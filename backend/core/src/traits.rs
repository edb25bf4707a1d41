use anyhow::Result;
use async_trait::async_trait;

/// A generative vision model that answers an instruction about an image.
///
/// The reply is free text; detections inside it are recovered by the
/// annotation parser, so implementations must not post-process it.
#[async_trait]
pub trait VisionModel: Send + Sync {
    /// Provider name used in logs (e.g., "gemini").
    fn name(&self) -> &str;

    /// Send encoded image bytes plus an instruction and return the raw reply text.
    async fn detect(&self, image: &[u8], prompt: &str) -> Result<String>;
}

/// A generative text model used for document comparison.
#[async_trait]
pub trait TextModel: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String>;
}
