pub mod highlights;
pub mod summary;

pub use highlights::*;
pub use summary::*;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use tracing::debug;

use crate::{error::IntelligenceError, provider::Provider};

const DEFAULT_TEMPERATURE: f64 = 0.3;

/// Thin client for an OpenAI-compatible chat completions endpoint.
#[derive(Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    provider: Provider,
    api_url: String,
    api_key: String,
    model: String,
    temperature: f64,
}

impl ChatClient {
    /// Reads the provider's API key from its environment variable.
    pub fn from_env(provider: Provider) -> Result<Self, IntelligenceError> {
        let api_key = provider.validate_api_key()?;
        Ok(Self::new(provider, api_key))
    }

    pub fn new(provider: Provider, api_key: impl Into<String>) -> Self {
        let config = provider.config();
        Self {
            http: reqwest::Client::new(),
            provider,
            api_url: config.api_url.to_string(),
            api_key: api_key.into(),
            model: config.model.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// One system + user exchange; returns the assistant message text.
    pub async fn complete(&self, system: &str, user: &str) -> Result<String, IntelligenceError> {
        debug!(provider = %self.provider, model = %self.model, "chat completion request");

        let response = self
            .http
            .post(&self.api_url)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&serde_json::json!({
                "model": self.model,
                "messages": [
                    {
                        "role": "system",
                        "content": system,
                    },
                    {
                        "role": "user",
                        "content": user,
                    },
                ],
                "temperature": self.temperature,
            }))
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;

        let content = message_content(&response).map(str::to_string);
        content.ok_or(IntelligenceError::InvalidApiResponse(response))
    }
}

/// `choices[0].message.content` of a chat completion, if present and non-blank.
pub fn message_content(response: &Value) -> Option<&str> {
    response["choices"][0]["message"]["content"]
        .as_str()
        .filter(|content| !content.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn reads_first_choice_content() {
        let response = json!({
            "choices": [{"message": {"role": "assistant", "content": "[1, 2]"}}]
        });
        assert_eq!(message_content(&response), Some("[1, 2]"));
    }

    #[test]
    fn missing_or_blank_content_is_none() {
        assert_eq!(message_content(&json!({"error": "quota"})), None);
        assert_eq!(
            message_content(&json!({"choices": [{"message": {"content": "  "}}]})),
            None
        );
    }

    #[test]
    fn builder_overrides_provider_defaults() {
        let client = ChatClient::new(Provider::Openai, "sk-test")
            .with_model("gpt-4o-mini")
            .with_temperature(0.0);
        assert_eq!(client.model(), "gpt-4o-mini");
        assert_eq!(client.provider(), Provider::Openai);
        assert_eq!(client.api_url, "https://api.openai.com/v1/chat/completions");
    }
}
