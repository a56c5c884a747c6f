//! HTTP decomposition backend
//!
//! Talks to any OpenAI-compatible chat completions endpoint (OpenRouter by
//! default) and asks for a JSON array of sub-task strings. Rate-limited
//! requests are retried with exponential backoff.

use std::time::Duration;

use reqwest::blocking::Client as HttpClient;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{DecomposeError, Decomposer};
use crate::storage::DecomposeConfig;

/// Maximum number of attempts for rate-limited requests
const MAX_RETRY_ATTEMPTS: u32 = 3;

/// Base delay for exponential backoff
const BACKOFF_BASE: Duration = Duration::from_millis(500);

const SYSTEM_PROMPT: &str = "You split a to-do item into a few short, concrete sub-tasks. \
Reply with a JSON array of strings and nothing else. \
Reply with [] if the item is already a single step.";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

impl Message {
    fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

/// Decomposer backed by a chat completions endpoint
pub struct HttpDecomposer {
    http_client: HttpClient,
    base_url: String,
    model: String,
    api_key: String,
    backoff_base: Duration,
}

impl std::fmt::Debug for HttpDecomposer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpDecomposer")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl HttpDecomposer {
    /// Builds a client from config. The API key is read from the configured
    /// environment variable.
    pub fn from_config(config: &DecomposeConfig) -> Result<Self, DecomposeError> {
        let api_key = config
            .api_key()
            .ok_or_else(|| DecomposeError::MissingApiKey(config.api_key_env.clone()))?;

        Self::new(&config.endpoint, &config.model, api_key, config.timeout_secs)
    }

    pub fn new(
        base_url: &str,
        model: &str,
        api_key: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, DecomposeError> {
        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(DecomposeError::Network)?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.into(),
            backoff_base: BACKOFF_BASE,
        })
    }

    /// Overrides the first retry delay; later retries double it
    pub fn with_backoff_base(mut self, base: Duration) -> Self {
        self.backoff_base = base;
        self
    }

    /// Sends one request, retrying on 429
    fn execute_request(&self, request: &ChatRequest<'_>) -> Result<String, DecomposeError> {
        let mut attempts = 0;

        loop {
            attempts += 1;

            match self.send_request(request) {
                Err(DecomposeError::RateLimited) if attempts < MAX_RETRY_ATTEMPTS => {
                    let backoff = self.backoff_base * 2u32.pow(attempts - 1);
                    warn!(
                        attempt = attempts,
                        wait_ms = backoff.as_millis() as u64,
                        "Rate limited, retrying after backoff"
                    );
                    std::thread::sleep(backoff);
                }
                other => return other,
            }
        }
    }

    fn send_request(&self, request: &ChatRequest<'_>) -> Result<String, DecomposeError> {
        let url = format!("{}/chat/completions", self.base_url);

        debug!(model = %request.model, "Sending decomposition request");

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("X-Title", "Prism")
            .json(request)
            .send()
            .map_err(DecomposeError::Network)?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(DecomposeError::RateLimited);
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(DecomposeError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(DecomposeError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let chat: ChatResponse = response
            .json()
            .map_err(|e| DecomposeError::Malformed(format!("response body: {}", e)))?;

        chat.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| DecomposeError::Malformed("response has no choices".to_string()))
    }
}

impl Decomposer for HttpDecomposer {
    fn decompose(&self, text: &str) -> Result<Vec<String>, DecomposeError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![Message::new("system", SYSTEM_PROMPT), Message::new("user", text)],
            temperature: 0.2,
        };

        let content = self.execute_request(&request)?;
        parse_subtask_array(&content)
    }
}

/// Pulls the first JSON array of strings out of a model reply. Models often
/// wrap the array in prose or code fences, and the prose may contain other
/// brackets, so every `[` is tried in order.
pub fn parse_subtask_array(content: &str) -> Result<Vec<String>, DecomposeError> {
    let mut last_error = None;

    for (start, _) in content.match_indices('[') {
        // The stream reads one value and leaves trailing prose alone
        let mut values =
            serde_json::Deserializer::from_str(&content[start..]).into_iter::<Vec<String>>();
        match values.next() {
            Some(Ok(items)) => return Ok(items),
            Some(Err(e)) => last_error = Some(e),
            None => {}
        }
    }

    Err(DecomposeError::Malformed(match last_error {
        Some(e) => format!("sub-task array: {}", e),
        None => "reply contains no JSON array".to_string(),
    }))
}
