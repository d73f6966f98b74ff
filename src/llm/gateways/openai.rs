//! OpenAI Gateway for LLM interactions.
//!
//! This module provides a gateway for OpenAI-compatible chat-completions and
//! embeddings endpoints.

use crate::error::{Result, ToolchatError};
use crate::llm::gateway::{CompletionConfig, LlmGateway};
use crate::llm::gateways::openai_messages_adapter::{adapt_messages_to_openai, convert_tool_calls};
use crate::llm::models::{LlmGatewayResponse, LlmMessage};
use crate::llm::tools::ToolDescriptor;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Configuration for connecting to OpenAI API.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Option<std::time::Duration>,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
            base_url: std::env::var("OPENAI_API_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            timeout: None,
        }
    }
}

impl OpenAIConfig {
    /// Read the configuration from the environment, requiring an API key
    pub fn from_env() -> Result<Self> {
        let config = Self::default();
        if config.api_key.is_empty() {
            return Err(ToolchatError::ConfigError(
                "OPENAI_API_KEY is not set".to_string(),
            ));
        }
        Ok(config)
    }
}

/// Gateway for OpenAI LLM service.
pub struct OpenAIGateway {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIGateway {
    /// Create a new OpenAI gateway with default configuration.
    pub fn new() -> Self {
        Self::with_config(OpenAIConfig::default())
    }

    /// Create a new OpenAI gateway with custom configuration.
    pub fn with_config(config: OpenAIConfig) -> Self {
        let mut client_builder = Client::builder();

        if let Some(timeout) = config.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        let client = client_builder.build().unwrap_or_else(|e| {
            warn!(error = %e, "Falling back to default HTTP client");
            Client::new()
        });

        Self { client, config }
    }

    /// Create gateway with custom API key and base URL.
    pub fn with_api_key_and_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self::with_config(OpenAIConfig {
            api_key: api_key.into(),
            base_url: base_url.into(),
            timeout: None,
        })
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        let response = self
            .client
            .post(format!("{}/{}", self.config.base_url, path))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ToolchatError::GatewayError(format!(
                "OpenAI API error: {} - {}",
                status, error_text
            )));
        }

        Ok(response.json().await?)
    }
}

impl Default for OpenAIGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmGateway for OpenAIGateway {
    async fn complete(
        &self,
        model: &str,
        messages: &[LlmMessage],
        tools: Option<&[ToolDescriptor]>,
        config: &CompletionConfig,
    ) -> Result<LlmGatewayResponse> {
        info!("Delegating to OpenAI for completion");
        debug!("Model: {}, Message count: {}", model, messages.len());

        let mut body = json!({
            "model": model,
            "messages": adapt_messages_to_openai(messages)?,
            "temperature": config.temperature,
        });

        if let Some(max_tokens) = config.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }

        if let Some(tools) = tools {
            body["tools"] = serde_json::to_value(tools)?;
        }

        let response_body = self.post("chat/completions", &body).await?;
        let message = &response_body["choices"][0]["message"];
        if message.is_null() {
            return Err(ToolchatError::GatewayError("No message in response".to_string()));
        }

        let content = message["content"].as_str().map(String::from);
        let tool_calls = message["tool_calls"]
            .as_array()
            .map(|calls| convert_tool_calls(calls))
            .unwrap_or_default();

        Ok(LlmGatewayResponse {
            content,
            tool_calls,
        })
    }

    async fn calculate_embeddings(&self, text: &str, model: Option<&str>) -> Result<Vec<f32>> {
        let model = model.unwrap_or("text-embedding-3-small");
        debug!("Calculating embeddings with model: {}", model);

        let body = json!({
            "model": model,
            "input": text
        });
        let response_body = self.post("embeddings", &body).await?;

        response_body["data"][0]["embedding"]
            .as_array()
            .ok_or_else(|| ToolchatError::GatewayError("No embedding in response".to_string()))?
            .iter()
            .map(|v| {
                v.as_f64().map(|f| f as f32).ok_or_else(|| {
                    ToolchatError::GatewayError("Invalid embedding value".to_string())
                })
            })
            .collect()
    }
}
