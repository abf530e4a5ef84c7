//! Chat-completions backed remote suggester

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{RemoteRequest, RemoteSuggester, clean_suggestion, system_prompt, user_prompt};
use crate::config::RemoteConfig;
use crate::error::RemoteError;

/// A message in a chat completion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    fn new(role: &str, content: String) -> Self {
        Self {
            role: role.to_string(),
            content,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

/// Remote suggester for Azure OpenAI compatible chat completion deployments
pub struct ChatCompletionSuggester {
    client: reqwest::Client,
    url: String,
    api_key: String,
    max_tokens: u32,
    temperature: f32,
}

impl ChatCompletionSuggester {
    /// Create a suggester for `endpoint` using the deployment settings in `config`.
    ///
    /// # Arguments
    /// * `endpoint` - Service base URL
    /// * `api_key` - Key sent in the `api-key` header
    /// * `config` - Deployment, API version and sampling settings
    pub fn new(endpoint: &str, api_key: impl Into<String>, config: &RemoteConfig) -> Self {
        let url = format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            endpoint.trim_end_matches('/'),
            config.deployment,
            config.api_version
        );

        Self {
            client: reqwest::Client::new(),
            url,
            api_key: api_key.into(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    /// Build a suggester from configuration, reading the key from the environment.
    ///
    /// Returns `None` when remote suggestions are disabled or not fully configured.
    pub fn from_config(config: &RemoteConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        let endpoint = config.endpoint.as_deref()?;
        let api_key = match std::env::var(&config.api_key_env) {
            Ok(key) if !key.is_empty() => key,
            _ => {
                tracing::warn!(
                    "Remote suggestions enabled but {} is not set",
                    config.api_key_env
                );
                return None;
            }
        };
        Some(Self::new(endpoint, api_key, config))
    }

    /// Send a chat completion request and return the first choice's content
    pub async fn complete(&self, messages: &[ChatMessage]) -> Result<String, RemoteError> {
        let body = ChatCompletionRequest {
            messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&self.url)
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(RemoteError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        let parsed: ChatCompletionResponse =
            serde_json::from_str(&text).map_err(|e| RemoteError::Malformed(e.to_string()))?;

        if let Some(error) = parsed.error {
            return Err(RemoteError::Api {
                status: status.as_u16(),
                message: error.message,
            });
        }

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(RemoteError::EmptyResponse)
    }
}

#[async_trait]
impl RemoteSuggester for ChatCompletionSuggester {
    async fn suggest(&self, request: &RemoteRequest) -> Result<String, RemoteError> {
        let messages = [
            ChatMessage::new("system", system_prompt(request)),
            ChatMessage::new("user", user_prompt(request)),
        ];

        let suggestion = clean_suggestion(&self.complete(&messages).await?);
        if suggestion.is_empty() {
            return Err(RemoteError::EmptyResponse);
        }
        Ok(suggestion)
    }
}
