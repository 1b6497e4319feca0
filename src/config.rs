use std::env;
use std::str::FromStr;
use std::time::Duration;

use clap::ValueEnum;
use dotenv::dotenv;

use crate::errors::ConfigError;

/// Recipe categories that count as a main dish.
pub const MAIN_DISH_CATEGORIES: &[&str] = &[
    "Beef", "Chicken", "Pork", "Pasta", "Pizza", "Beans", "Vegetable", "Sandwich", "Soup",
];

/// Days before a new plan's start during which reuse is not allowed.
pub const DEFAULT_LOOKBACK_DAYS: i64 = 14;
/// A recipe used `w` weeks ago has its weight multiplied by `DECAY_BASE^(1/w)`.
pub const RECENCY_DECAY_BASE: f64 = 0.3;
/// Number of most recent schedules that feed the recency weighting.
pub const DEFAULT_HISTORY_DEPTH: usize = 4;
pub const DEFAULT_DAY_COUNT: usize = 7;

pub const AI_PROVIDER_ENV: &str = "AI_PROVIDER";
pub const AI_MODEL_ENV: &str = "AI_MODEL";
pub const AI_BASE_URL_ENV: &str = "AI_BASE_URL";
pub const AI_API_KEY_ENV: &str = "AI_API_KEY";
pub const GOOGLE_API_KEY_ENV: &str = "GOOGLE_API_KEY";
pub const AI_TIMEOUT_ENV: &str = "AI_TIMEOUT_SECS";

pub const DEFAULT_CHAT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_CHAT_MODEL: &str = "qwen/qwen3-32b";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct PlannerSettings {
    pub main_dish_categories: Vec<String>,
    pub lookback_days: i64,
    pub decay_base: f64,
    pub history_depth: usize,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            main_dish_categories: MAIN_DISH_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            decay_base: RECENCY_DECAY_BASE,
            history_depth: DEFAULT_HISTORY_DEPTH,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProviderKind {
    /// Any OpenAI-compatible chat completion endpoint (OpenRouter by default).
    #[value(name = "openai")]
    OpenAi,
    #[value(name = "gemini")]
    Gemini,
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "openai" | "openrouter" => Ok(ProviderKind::OpenAi),
            "gemini" => Ok(ProviderKind::Gemini),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }
}

/// Settings for the external text-generation provider.
///
/// The API key itself is not stored: `api_key_env` names the variable that is
/// read when a request is made, so a missing key surfaces as a provider error
/// (and therefore a fallback) rather than a startup failure.
#[derive(Debug, Clone, PartialEq)]
pub struct AiSettings {
    pub provider: ProviderKind,
    pub model: String,
    pub base_url: String,
    pub api_key_env: String,
    pub timeout: Duration,
}

impl AiSettings {
    pub fn for_provider(provider: ProviderKind) -> Self {
        let (model, api_key_env) = match provider {
            ProviderKind::OpenAi => (DEFAULT_CHAT_MODEL, AI_API_KEY_ENV),
            ProviderKind::Gemini => (DEFAULT_GEMINI_MODEL, GOOGLE_API_KEY_ENV),
        };
        Self {
            provider,
            model: model.to_string(),
            base_url: DEFAULT_CHAT_BASE_URL.to_string(),
            api_key_env: api_key_env.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Reads settings from the process environment, loading `.env` first.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let provider = match lookup(AI_PROVIDER_ENV) {
            Some(raw) => raw.parse()?,
            None => ProviderKind::OpenAi,
        };
        let mut settings = Self::for_provider(provider);

        if let Some(model) = lookup(AI_MODEL_ENV).filter(|m| !m.trim().is_empty()) {
            settings.model = model.trim().to_string();
        }
        if let Some(base_url) = lookup(AI_BASE_URL_ENV).filter(|u| !u.trim().is_empty()) {
            settings.base_url = base_url.trim().trim_end_matches('/').to_string();
        }
        if let Some(raw) = lookup(AI_TIMEOUT_ENV) {
            let secs = raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                key: AI_TIMEOUT_ENV.to_string(),
                value: raw.clone(),
            })?;
            settings.timeout = Duration::from_secs(secs);
        }
        Ok(settings)
    }

    pub fn with_provider(mut self, provider: ProviderKind) -> Self {
        if provider != self.provider {
            let defaults = Self::for_provider(provider);
            self.provider = provider;
            self.model = defaults.model;
            self.api_key_env = defaults.api_key_env;
        }
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }
}
