/// Content generation collaborators
///
/// The candidate generator only ever talks to these two narrow traits, so the
/// backing provider (hosted OpenAI, a local OpenAI-compatible server, a stub in
/// tests) can be swapped without touching generation logic.
use crate::error::AppResult;

pub mod openai;

pub use openai::OpenAiCompatibleClient;

/// Chat-style text generation
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    /// Returns the raw text of the model's reply
    async fn generate_text(&self, system_prompt: &str, user_prompt: &str) -> AppResult<String>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Prompt-to-image generation
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Returns a URL referencing the generated image
    async fn generate_image(&self, prompt: &str) -> AppResult<String>;

    fn name(&self) -> &'static str;
}
