use std::{env, str::FromStr, time::Duration};

use secrecy::{ExposeSecret, SecretString};

use crate::errors::{AppError, AppResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelProvider {
    OpenAi,
    Azure,
}

impl ModelProvider {
    fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "azure" | "azure_openai" => ModelProvider::Azure,
            _ => ModelProvider::OpenAi,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelProvider::OpenAi => "openai",
            ModelProvider::Azure => "azure",
        }
    }
}

#[derive(Clone, Debug)]
pub struct ModelConfig {
    pub provider: ModelProvider,
    pub api_key: SecretString,
    pub api_base: String,
    pub model: String,
    pub api_version: String,
    pub deployment_name: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Bounds and budgets handed to the pipeline components at construction.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationSettings {
    pub min_question_count: u32,
    pub max_question_count: u32,
    pub default_question_count: u32,
    pub model_timeout: Duration,
    pub request_timeout: Duration,
    pub max_attempts: u32,
    pub retry_base_delay: Duration,
    pub retry_max_delay: Duration,
    pub batch_concurrency_limit: usize,
    pub max_batch_size: usize,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            min_question_count: 5,
            max_question_count: 50,
            default_question_count: 20,
            model_timeout: Duration::from_secs(120),
            request_timeout: Duration::from_secs(300),
            max_attempts: 3,
            retry_base_delay: Duration::from_millis(1000),
            retry_max_delay: Duration::from_millis(8000),
            batch_concurrency_limit: 5,
            max_batch_size: 5,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub web_server_host: String,
    pub web_server_port: u16,
    pub model: ModelConfig,
    pub generation: GenerationSettings,
}

const DEFAULT_API_KEY: &str = "";

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = GenerationSettings::default();

        Self {
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "127.0.0.1".to_string()),
            web_server_port: env_or("WEB_SERVER_PORT", 8000),
            model: ModelConfig {
                provider: ModelProvider::parse(
                    &env::var("MODEL_PROVIDER").unwrap_or_else(|_| "openai".to_string()),
                ),
                api_key: SecretString::from(
                    env::var("OPENAI_API_KEY").unwrap_or_else(|_| DEFAULT_API_KEY.to_string()),
                ),
                api_base: env::var("OPENAI_API_BASE")
                    .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
                model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o".to_string()),
                api_version: env::var("AZURE_API_VERSION")
                    .unwrap_or_else(|_| "2025-01-01-preview".to_string()),
                deployment_name: env::var("AZURE_DEPLOYMENT_NAME")
                    .unwrap_or_else(|_| "gpt-4o".to_string()),
                temperature: env_or("MODEL_TEMPERATURE", 0.7),
                max_tokens: env_or("MODEL_MAX_TOKENS", 4000),
            },
            generation: GenerationSettings {
                min_question_count: env_or("MIN_QUESTIONS_PER_REQUEST", defaults.min_question_count),
                max_question_count: env_or("MAX_QUESTIONS_PER_REQUEST", defaults.max_question_count),
                default_question_count: env_or(
                    "DEFAULT_QUESTION_COUNT",
                    defaults.default_question_count,
                ),
                model_timeout: Duration::from_secs(env_or("LLM_TIMEOUT", 120)),
                request_timeout: Duration::from_secs(env_or("REQUEST_TIMEOUT", 300)),
                max_attempts: env_or("MAX_RETRY_ATTEMPTS", defaults.max_attempts),
                retry_base_delay: Duration::from_millis(env_or("RETRY_BASE_DELAY_MS", 1000)),
                retry_max_delay: Duration::from_millis(env_or("RETRY_MAX_DELAY_MS", 8000)),
                batch_concurrency_limit: env_or(
                    "BATCH_CONCURRENCY_LIMIT",
                    defaults.batch_concurrency_limit,
                ),
                max_batch_size: env_or("MAX_BATCH_SIZE", defaults.max_batch_size),
            },
        }
    }

    /// Checks bounds that would otherwise surface as confusing runtime behaviour.
    pub fn validate(&self) -> AppResult<()> {
        let g = &self.generation;
        let mut errors = Vec::new();

        if g.max_question_count <= g.min_question_count {
            errors.push("MAX_QUESTIONS_PER_REQUEST must be greater than MIN_QUESTIONS_PER_REQUEST");
        }
        if g.default_question_count < g.min_question_count
            || g.default_question_count > g.max_question_count
        {
            errors.push("DEFAULT_QUESTION_COUNT must be within the min/max range");
        }
        if g.model_timeout.is_zero() {
            errors.push("LLM_TIMEOUT must be positive");
        }
        if g.request_timeout.is_zero() {
            errors.push("REQUEST_TIMEOUT must be positive");
        }
        if g.max_attempts == 0 {
            errors.push("MAX_RETRY_ATTEMPTS must be at least 1");
        }
        if g.batch_concurrency_limit == 0 {
            errors.push("BATCH_CONCURRENCY_LIMIT must be at least 1");
        }
        if g.max_batch_size == 0 {
            errors.push("MAX_BATCH_SIZE must be at least 1");
        }
        if !self.model.api_base.starts_with("http://") && !self.model.api_base.starts_with("https://")
        {
            errors.push("OPENAI_API_BASE must start with http:// or https://");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::ConfigError(errors.join("; ")))
        }
    }

    /// Validate that production-critical configuration is set
    pub fn validate_for_production(&self) -> AppResult<()> {
        self.validate()?;

        if self.model.api_key.expose_secret().trim().is_empty() {
            return Err(AppError::ConfigError(
                "OPENAI_API_KEY is not set. Set it to the key for the configured provider."
                    .to_string(),
            ));
        }

        Ok(())
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8000,
            model: ModelConfig {
                provider: ModelProvider::OpenAi,
                api_key: SecretString::from("test_api_key".to_string()),
                api_base: "http://localhost:9999/v1".to_string(),
                model: "test-model".to_string(),
                api_version: "2025-01-01-preview".to_string(),
                deployment_name: "test-deployment".to_string(),
                temperature: 0.0,
                max_tokens: 512,
            },
            generation: GenerationSettings {
                model_timeout: Duration::from_millis(500),
                request_timeout: Duration::from_secs(5),
                retry_base_delay: Duration::from_millis(1),
                retry_max_delay: Duration::from_millis(4),
                ..GenerationSettings::default()
            },
        }
    }
}
