//! Ollama-style chat endpoint adapter
//!
//! One request per round-trip, no streaming:
//!
//! ```text
//! POST {base_url}/api/chat
//! {"model": "...", "stream": false, "format": "json",
//!  "messages": [{"role":"system",...}, {"role":"user",...}],
//!  "options": {"temperature": 0.2}}
//!
//! 200 {"message": {"role": "assistant", "content": "..."}, "done": true}
//! ```
//!
//! `format` is only sent for [`ResponseFormat::Json`], `options` only when a
//! temperature is configured.

use async_trait::async_trait;
use pmcro_application::{GatewayError, LlmGateway, ResponseFormat};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llama3.1";

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<ChatOptions>,
}

#[derive(Debug, Deserialize)]
struct ChatReplyMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Option<ChatReplyMessage>,
    #[serde(default)]
    error: Option<String>,
}

/// [`LlmGateway`] over an Ollama-compatible `/api/chat` endpoint.
pub struct OllamaGateway {
    client: reqwest::Client,
    base_url: String,
    model: String,
    temperature: Option<f32>,
}

impl OllamaGateway {
    /// Create a gateway with a client-level request timeout.
    ///
    /// The use cases enforce their own phase deadlines; this one only guards
    /// against a hung connection.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::ConnectionError(e.to_string()))?;

        let gateway = Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            temperature: None,
        };
        info!(
            "OllamaGateway initialized ({} at {})",
            gateway.model, gateway.base_url
        );
        Ok(gateway)
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }

    fn build_request<'a>(
        &'a self,
        system_prompt: &'a str,
        user_prompt: &'a str,
        format: ResponseFormat,
    ) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            stream: false,
            format: match format {
                ResponseFormat::Json => Some("json"),
                ResponseFormat::Text => None,
            },
            options: self.temperature.map(|temperature| ChatOptions { temperature }),
        }
    }
}

/// Pull the assistant text out of a decoded reply body.
fn extract_content(body: &str) -> Result<String, GatewayError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| GatewayError::InvalidResponse(format!("Malformed reply: {}", e)))?;

    if let Some(error) = response.error {
        return Err(GatewayError::RequestFailed(error));
    }

    match response.message {
        Some(message) if !message.content.trim().is_empty() => Ok(message.content),
        Some(_) => Err(GatewayError::InvalidResponse("Empty reply".to_string())),
        None => Err(GatewayError::InvalidResponse(
            "Reply has no message".to_string(),
        )),
    }
}

fn map_send_error(error: reqwest::Error) -> GatewayError {
    if error.is_timeout() {
        GatewayError::Timeout
    } else if error.is_connect() {
        GatewayError::ConnectionError(error.to_string())
    } else {
        GatewayError::RequestFailed(error.to_string())
    }
}

#[async_trait]
impl LlmGateway for OllamaGateway {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        format: ResponseFormat,
    ) -> Result<String, GatewayError> {
        let request = self.build_request(system_prompt, user_prompt, format);
        debug!(model = %self.model, ?format, "Sending oracle request");

        let response = self
            .client
            .post(self.chat_url())
            .json(&request)
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        let body = response.text().await.map_err(map_send_error)?;
        if !status.is_success() {
            return Err(GatewayError::RequestFailed(format!(
                "Oracle returned {}: {}",
                status,
                pmcro_domain::util::truncate_str(body.trim(), 200)
            )));
        }

        extract_content(&body)
    }
}
