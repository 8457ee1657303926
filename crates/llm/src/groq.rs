//! Groq Provider
//!
//! Implementation of the LlmProvider trait for Groq's OpenAI-compatible
//! chat-completions API. Any server exposing the same
//! `/openai/v1/chat/completions` route can be targeted through `base_url`.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::provider::{missing_api_key_error, parse_http_error, LlmProvider};
use super::types::{
    LlmError, LlmRequestOptions, LlmResponse, LlmResult, Message, ProviderConfig, StopReason,
    UsageStats,
};
use crate::http_client::build_http_client;

/// Chat-completions route relative to the API host.
const CHAT_COMPLETIONS_PATH: &str = "/openai/v1/chat/completions";

/// Model listing route, used for health checks.
const MODELS_PATH: &str = "/openai/v1/models";

/// How much of an unexpected response body is surfaced as content.
const MAX_RAW_BODY_CHARS: usize = 800;

/// Groq provider
pub struct GroqProvider {
    config: ProviderConfig,
    client: reqwest::Client,
}

impl GroqProvider {
    /// Create a new Groq provider with the given configuration
    pub fn new(config: ProviderConfig) -> LlmResult<Self> {
        let client = build_http_client(&config)?;
        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn api_key(&self) -> LlmResult<&str> {
        self.config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| missing_api_key_error("groq"))
    }

    /// Build the request body for the API
    fn build_request_body(
        &self,
        messages: &[Message],
        system: Option<&str>,
        request_options: &LlmRequestOptions,
    ) -> serde_json::Value {
        let system_message = system.map(Message::system);
        let wire_messages: Vec<serde_json::Value> = system_message
            .iter()
            .chain(messages)
            .map(|msg| {
                serde_json::json!({
                    "role": msg.role.as_str(),
                    "content": msg.content
                })
            })
            .collect();

        let mut body = serde_json::json!({
            "model": self.config.model,
            "messages": wire_messages,
            "max_tokens": request_options
                .max_tokens_override
                .unwrap_or(self.config.max_tokens),
            "temperature": request_options
                .temperature_override
                .unwrap_or(self.config.temperature),
            "stream": false,
        });

        if request_options.json_mode {
            body["response_format"] = serde_json::json!({ "type": "json_object" });
        }

        body
    }

    /// Parse a 200 response body.
    ///
    /// A JSON body without the usual `choices[0].message.content` shape is
    /// returned verbatim (truncated) as the content so the caller still sees
    /// what the server said.
    fn parse_response(&self, body_text: &str) -> LlmResult<LlmResponse> {
        let value: serde_json::Value =
            serde_json::from_str(body_text).map_err(|e| LlmError::ParseError {
                message: format!("Failed to parse response: {}", e),
            })?;

        match serde_json::from_value::<ChatResponse>(value.clone()) {
            Ok(response) if response.first_content().is_some() => {
                let choice = response.choices.first();
                let stop_reason = choice
                    .and_then(|c| c.finish_reason.as_deref())
                    .map(StopReason::from)
                    .unwrap_or(StopReason::EndTurn);
                let usage = response
                    .usage
                    .as_ref()
                    .map(|u| UsageStats {
                        input_tokens: u.prompt_tokens,
                        output_tokens: u.completion_tokens,
                    })
                    .unwrap_or_default();

                Ok(LlmResponse {
                    content: response.first_content().map(|c| c.trim().to_string()),
                    stop_reason,
                    usage,
                    model: response.model.unwrap_or_else(|| self.config.model.clone()),
                })
            }
            _ => {
                debug!("groq: unexpected response shape, surfacing raw body");
                Ok(LlmResponse {
                    content: Some(value.to_string().chars().take(MAX_RAW_BODY_CHARS).collect()),
                    stop_reason: StopReason::Other("unexpected_shape".to_string()),
                    usage: UsageStats::default(),
                    model: self.config.model.clone(),
                })
            }
        }
    }
}

#[async_trait]
impl LlmProvider for GroqProvider {
    fn name(&self) -> &'static str {
        "groq"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn send_message(
        &self,
        messages: Vec<Message>,
        system: Option<String>,
        request_options: LlmRequestOptions,
    ) -> LlmResult<LlmResponse> {
        let api_key = self.api_key()?;
        let body = self.build_request_body(&messages, system.as_deref(), &request_options);

        let response = self
            .client
            .post(self.url(CHAT_COMPLETIONS_PATH))
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::NetworkError {
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        let body_text = response.text().await.map_err(|e| LlmError::NetworkError {
            message: e.to_string(),
        })?;

        if status != 200 {
            return Err(parse_http_error(status, &body_text, "groq"));
        }

        self.parse_response(&body_text)
    }

    async fn health_check(&self) -> LlmResult<()> {
        let api_key = self.api_key()?;

        let response = self
            .client
            .get(self.url(MODELS_PATH))
            .header("Authorization", format!("Bearer {}", api_key))
            .send()
            .await
            .map_err(|e| LlmError::NetworkError {
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        if status == 200 {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(parse_http_error(status, &body, "groq"))
        }
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }
}

/// Chat-completions response format
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<ResponseUsage>,
}

impl ChatResponse {
    fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}
