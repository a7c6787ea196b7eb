use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use async_openai::{
    config::{AzureConfig, Config as OpenAiClientConfig, OpenAIConfig},
    error::OpenAIError,
    Client,
};
use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde_json::{json, Value};

use crate::{
    config::{ModelConfig, ModelProvider},
    constants::prompts::SYSTEM_PROMPT,
    errors::{AppError, AppResult, TransportFailure, TransportReason},
    services::prompt_helpers::truncate_for_log,
};

/// The generative capability: prompt text in, response text out.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, TransportFailure>;

    fn describe(&self) -> String;
}

pub struct OpenAiModelClient<C: OpenAiClientConfig> {
    client: Client<C>,
    label: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl<C: OpenAiClientConfig> OpenAiModelClient<C> {
    pub fn new(client: Client<C>, label: String, settings: &ModelConfig) -> Self {
        Self {
            client,
            label,
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        }
    }
}

#[async_trait]
impl<C: OpenAiClientConfig> ModelClient for OpenAiModelClient<C> {
    async fn complete(&self, prompt: &str) -> Result<String, TransportFailure> {
        let request = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": prompt }
            ],
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
            "response_format": { "type": "json_object" }
        });

        let response: Value = self
            .client
            .chat()
            .create_byot(request)
            .await
            .map_err(map_openai_error)?;

        extract_message_content(&response)
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

fn extract_message_content(response: &Value) -> Result<String, TransportFailure> {
    let choice = &response["choices"][0];
    if choice["finish_reason"].as_str() == Some("content_filter") {
        return Err(TransportFailure::new(
            TransportReason::Rejected,
            "completion was blocked by the provider's content filter",
        ));
    }

    match choice["message"]["content"].as_str() {
        Some(content) if !content.trim().is_empty() => Ok(content.to_string()),
        _ => Err(TransportFailure::new(
            TransportReason::Rejected,
            "completion contained no message content",
        )),
    }
}

fn map_openai_error(err: OpenAIError) -> TransportFailure {
    let is_api_error = matches!(err, OpenAIError::ApiError(_));
    let message = err.to_string();
    TransportFailure::new(classify_failure(is_api_error, &message), message)
}

/// Maps a provider error onto a transport sub-reason. Rate limits are recognised by
/// message text because both providers report them inside the API error body.
pub fn classify_failure(is_api_error: bool, message: &str) -> TransportReason {
    let lower = message.to_lowercase();
    if lower.contains("rate limit")
        || lower.contains("rate_limit")
        || lower.contains("429")
        || lower.contains("quota")
    {
        TransportReason::RateLimited
    } else if lower.contains("timed out") || lower.contains("timeout") {
        TransportReason::Timeout
    } else if is_api_error {
        TransportReason::Rejected
    } else {
        TransportReason::Network
    }
}

pub fn build_model_client(settings: &ModelConfig) -> AppResult<Arc<dyn ModelClient>> {
    if settings.api_base.trim().is_empty() {
        return Err(AppError::ConfigError(
            "OPENAI_API_BASE must not be empty".to_string(),
        ));
    }

    let client: Arc<dyn ModelClient> = match settings.provider {
        ModelProvider::OpenAi => {
            let config = OpenAIConfig::new()
                .with_api_key(settings.api_key.expose_secret())
                .with_api_base(&settings.api_base);
            Arc::new(OpenAiModelClient::new(
                Client::with_config(config),
                format!("openai:{}", settings.model),
                settings,
            ))
        }
        ModelProvider::Azure => {
            let config = AzureConfig::new()
                .with_api_base(&settings.api_base)
                .with_api_version(&settings.api_version)
                .with_deployment_id(&settings.deployment_name)
                .with_api_key(settings.api_key.expose_secret());
            Arc::new(OpenAiModelClient::new(
                Client::with_config(config),
                format!("azure:{}", settings.deployment_name),
                settings,
            ))
        }
    };

    log::info!("Model client configured: {}", client.describe());
    Ok(client)
}

/// One bounded call to the model. Content is never interpreted here.
#[derive(Clone)]
pub struct ModelInvoker {
    client: Arc<dyn ModelClient>,
    timeout: Duration,
}

impl ModelInvoker {
    pub fn new(client: Arc<dyn ModelClient>, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub async fn invoke(&self, prompt: &str) -> Result<String, TransportFailure> {
        if prompt.trim().is_empty() {
            return Err(TransportFailure::new(
                TransportReason::Rejected,
                "prompt must not be empty",
            ));
        }

        let started = Instant::now();
        match tokio::time::timeout(self.timeout, self.client.complete(prompt)).await {
            Ok(Ok(text)) => {
                log::debug!(
                    "Model responded in {}ms: {}",
                    started.elapsed().as_millis(),
                    truncate_for_log(&text, 200)
                );
                Ok(text)
            }
            Ok(Err(failure)) => Err(failure),
            Err(_) => Err(TransportFailure::new(
                TransportReason::Timeout,
                format!("no response within {}ms", self.timeout.as_millis()),
            )),
        }
    }
}
