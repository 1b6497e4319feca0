pub mod connection;
pub mod endpoints;
pub mod gemini;

use async_trait::async_trait;

use crate::config::{AiSettings, ProviderKind};

pub use connection::{ApiConnectionError, ChatCompletionClient};
pub use gemini::GeminiClient;

/// A prompt for a text-generation service: a standing instruction plus the
/// request itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// The one capability the planner needs from an external model: turn a
/// prompt into text in a single round trip.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn name(&self) -> &'static str;

    async fn generate(&self, prompt: &Prompt) -> Result<String, ApiConnectionError>;
}

/// Builds the generator selected by configuration.
pub fn build_generator(settings: &AiSettings) -> Result<Box<dyn TextGenerator>, ApiConnectionError> {
    Ok(match settings.provider {
        ProviderKind::OpenAi => Box::new(ChatCompletionClient::new(settings)?),
        ProviderKind::Gemini => Box::new(GeminiClient::new(settings)?),
    })
}
