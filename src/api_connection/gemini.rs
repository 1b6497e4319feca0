use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error};

use super::connection::{build_http_client, read_api_key, ApiConnectionError};
use super::endpoints::{
    GeminiContent, GeminiGenerationConfig, GeminiPart, GeminiRequest, GeminiResponse,
    GEMINI_API_BASE_URL,
};
use super::{Prompt, TextGenerator};
use crate::config::AiSettings;

const GEMINI_TEMPERATURE: f32 = 0.7;
const GEMINI_MAX_OUTPUT_TOKENS: u32 = 500;

/// Client for Gemini's single-prompt `generateContent` call.
///
/// Gemini gets no separate system message here: the instruction is prepended
/// to the prompt text.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key_env: String,
}

impl GeminiClient {
    pub fn new(settings: &AiSettings) -> Result<Self, ApiConnectionError> {
        Ok(Self {
            client: build_http_client(settings)?,
            base_url: GEMINI_API_BASE_URL.to_string(),
            model: settings.model.clone(),
            api_key_env: settings.api_key_env.clone(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    pub fn build_request(prompt: &Prompt) -> GeminiRequest {
        let full_prompt = if prompt.system.is_empty() {
            prompt.user.clone()
        } else {
            format!("{}\n\n{}", prompt.system, prompt.user)
        };
        GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart { text: Some(full_prompt) }],
            }],
            generation_config: Some(GeminiGenerationConfig {
                temperature: Some(GEMINI_TEMPERATURE),
                max_output_tokens: Some(GEMINI_MAX_OUTPUT_TOKENS),
            }),
        }
    }

    pub async fn generate_content(
        &self,
        request: &GeminiRequest,
    ) -> Result<GeminiResponse, ApiConnectionError> {
        let api_key = read_api_key(&self.api_key_env)?;

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            error!(%status, "Gemini generateContent failed");
            return Err(ApiConnectionError::ApiError { status, error_body: body });
        }
        let parsed: GeminiResponse = serde_json::from_str(&body)?;
        if let Some(api_error) = &parsed.error {
            return Err(ApiConnectionError::ApiError {
                status,
                error_body: api_error.message.clone(),
            });
        }
        Ok(parsed)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn generate(&self, prompt: &Prompt) -> Result<String, ApiConnectionError> {
        let request = Self::build_request(prompt);
        debug!(model = %self.model, "sending Gemini request");
        let response = self.generate_content(&request).await?;
        let finish_reason = response
            .first_candidate()
            .and_then(|c| c.finish_reason.as_deref())
            .unwrap_or("none");
        debug!(finish_reason, "Gemini response received");
        let text = response.first_text().map(str::trim).unwrap_or_default();
        if text.is_empty() {
            return Err(ApiConnectionError::EmptyResponse);
        }
        Ok(text.to_string())
    }
}
