/// LLM Client: the Model Gateway used by every interview stage.
///
/// ARCHITECTURAL RULE: Stage nodes never talk to the Anthropic API directly.
/// They receive a `&dyn ModelGateway` and call `ask` / `ask_json` on it.
/// Retry and backoff live here, never in the nodes.
///
/// Model: claude-sonnet-4-5 (hardcoded; do not make configurable to prevent drift)
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::interview::models::{Message, Role};

pub mod prompts;
#[cfg(test)]
pub mod scripted;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all interview calls.
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 4096;
const MAX_RETRIES: u32 = 3;
/// Synthetic opening turn for histories that start with the interviewer.
const CONVERSATION_OPENER: &str = "Hello, I am ready for the interview.";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("LLM returned JSON that is not an object")]
    NotAnObject,
}

// ────────────────────────────────────────────────────────────────────────────
// Gateway contract
// ────────────────────────────────────────────────────────────────────────────

/// One request to the model: system instructions, the conversation so far,
/// and the instruction for this call (sent as the final user turn).
#[derive(Debug, Clone, Default)]
pub struct GatewayRequest {
    pub system: String,
    pub history: Vec<Message>,
    pub prompt: String,
}

impl GatewayRequest {
    pub fn new(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            history: Vec::new(),
            prompt: prompt.into(),
        }
    }

    pub fn with_history(mut self, history: &[Message]) -> Self {
        self.history = history.to_vec();
        self
    }
}

/// The capability every stage node depends on. `LlmClient` is the
/// production implementation; tests script their own.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Free-text completion.
    async fn ask(&self, request: &GatewayRequest) -> Result<String, LlmError>;

    /// Structured completion. Malformed or non-JSON output is an `Err`,
    /// never a panic.
    async fn ask_json(&self, request: &GatewayRequest) -> Result<Value, LlmError> {
        let text = self.ask(request).await?;
        if text.trim().is_empty() {
            return Err(LlmError::EmptyContent);
        }
        Ok(serde_json::from_str(strip_json_fences(&text))?)
    }
}

/// Structured completion deserialized into `T`. The response must be a JSON
/// object.
pub async fn ask_structured<T: DeserializeOwned>(
    gateway: &dyn ModelGateway,
    request: &GatewayRequest,
) -> Result<T, LlmError> {
    let value = gateway.ask_json(request).await?;
    if !value.is_object() {
        return Err(LlmError::NotAnObject);
    }
    Ok(serde_json::from_value(value)?)
}

// ────────────────────────────────────────────────────────────────────────────
// Anthropic wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct AnthropicMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// Anthropic Messages API client with retry logic.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
        })
    }

    /// Makes a raw call to the Claude API, returning the full response object.
    /// Retries on 429 (rate limit) and 5xx errors with exponential backoff.
    pub async fn call(&self, request: &GatewayRequest) -> Result<LlmResponse, LlmError> {
        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            system: &request.system,
            messages: to_anthropic_messages(&request.history, &request.prompt),
        };

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(ANTHROPIC_API_URL)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<AnthropicError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let llm_response: LlmResponse = response.json().await?;

            debug!(
                "LLM call succeeded: input_tokens={}, output_tokens={}",
                llm_response.usage.input_tokens, llm_response.usage.output_tokens
            );

            return Ok(llm_response);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

#[async_trait]
impl ModelGateway for LlmClient {
    async fn ask(&self, request: &GatewayRequest) -> Result<String, LlmError> {
        let response = self.call(request).await?;
        response
            .text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }
}

/// Maps transcript history plus the call's instruction onto Anthropic turns.
///
/// The API wants the first turn to be the user's and alternating roles, so a
/// leading interviewer turn gets a synthetic opener and same-role runs are
/// merged.
fn to_anthropic_messages(history: &[Message], prompt: &str) -> Vec<AnthropicMessage> {
    let mut turns: Vec<AnthropicMessage> = Vec::with_capacity(history.len() + 2);

    let tail = (!prompt.trim().is_empty()).then(|| Message::human(prompt));
    for message in history.iter().chain(tail.iter()) {
        let role = match message.role {
            Role::Human => "user",
            Role::Assistant => "assistant",
        };
        if turns.is_empty() && role == "assistant" {
            turns.push(AnthropicMessage {
                role: "user",
                content: CONVERSATION_OPENER.to_string(),
            });
        }
        match turns.last_mut() {
            Some(last) if last.role == role => {
                last.content.push_str("\n\n");
                last.content.push_str(&message.content);
            }
            _ => turns.push(AnthropicMessage {
                role,
                content: message.content.clone(),
            }),
        }
    }

    if turns.is_empty() {
        turns.push(AnthropicMessage {
            role: "user",
            content: CONVERSATION_OPENER.to_string(),
        });
    }
    turns
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
