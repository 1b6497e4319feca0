use std::env;

use async_trait::async_trait;
use dotenv::dotenv;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, error};

use super::endpoints::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use super::{Prompt, TextGenerator};
use crate::config::AiSettings;

const CHAT_TEMPERATURE: f32 = 0.7;
const CHAT_MAX_TOKENS: u32 = 200;

#[derive(Debug, Error)]
pub enum ApiConnectionError {
    #[error("API key not found in environment: {0}")]
    MissingApiKey(String),
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("API error {status}: {error_body}")]
    ApiError {
        status: reqwest::StatusCode,
        error_body: String,
    },
    #[error("API returned no content")]
    EmptyResponse,
}

/// Reads the API key from the named environment variable (after `.env`).
pub(crate) fn read_api_key(api_key_env_var_name: &str) -> Result<String, ApiConnectionError> {
    dotenv().ok();
    env::var(api_key_env_var_name)
        .ok()
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| ApiConnectionError::MissingApiKey(api_key_env_var_name.to_string()))
}

/// Builds the shared HTTP client; the configured timeout bounds the single
/// round trip made per generation.
pub(crate) fn build_http_client(settings: &AiSettings) -> Result<Client, ApiConnectionError> {
    Ok(Client::builder().timeout(settings.timeout).build()?)
}

/// Client for OpenAI-compatible `/chat/completions` endpoints.
#[derive(Debug, Clone)]
pub struct ChatCompletionClient {
    client: Client,
    base_url: String,
    model: String,
    api_key_env: String,
}

impl ChatCompletionClient {
    pub fn new(settings: &AiSettings) -> Result<Self, ApiConnectionError> {
        Ok(Self {
            client: build_http_client(settings)?,
            base_url: settings.base_url.clone(),
            model: settings.model.clone(),
            api_key_env: settings.api_key_env.clone(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    pub fn build_request(&self, prompt: &Prompt) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::system(&prompt.system), ChatMessage::user(&prompt.user)],
            temperature: Some(CHAT_TEMPERATURE),
            max_tokens: Some(CHAT_MAX_TOKENS),
        }
    }

    pub async fn call_chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ApiConnectionError> {
        let actual_api_key = read_api_key(&self.api_key_env)?;

        let site_url = env::var("SITE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
        let app_name = env::var("APP_NAME").unwrap_or_else(|_| "MealPlanner".to_string());

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(actual_api_key)
            .header("HTTP-Referer", site_url)
            .header("X-Title", app_name)
            .json(request)
            .send()
            .await?;

        if response.status().is_success() {
            let body = response.text().await?;
            Ok(serde_json::from_str::<ChatCompletionResponse>(&body)?)
        } else {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(%status, "chat completion request failed");
            Err(ApiConnectionError::ApiError { status, error_body })
        }
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionClient {
    fn name(&self) -> &'static str {
        "openai-compatible"
    }

    async fn generate(&self, prompt: &Prompt) -> Result<String, ApiConnectionError> {
        let request = self.build_request(prompt);
        debug!(model = %request.model, "sending chat completion request");
        let response = self.call_chat_completion(&request).await?;
        let content = response.first_content().map(str::trim).unwrap_or_default();
        if content.is_empty() {
            return Err(ApiConnectionError::EmptyResponse);
        }
        Ok(content.to_string())
    }
}
