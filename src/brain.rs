//! Response gateway: turns an event description into notification text
//!
//! Two sequential round trips per call against an OpenAI-compatible server
//! (LM Studio, llama.cpp server, ...): model discovery, then a chat
//! completion with the fixed personality prompt. Each step independently
//! retries transient failures a bounded number of times; terminal failures
//! surface as typed `GatewayError` values so the caller can skip dispatch
//! without inspecting message text.
//!
//! The HTTP client is blocking (ureq); the consumer loop calls `generate`
//! through `spawn_blocking`.

use crate::config::LlmConfig;
use crate::error::GatewayError;
use crate::personality::SYSTEM_PROMPT;
use serde::Deserialize;
use std::time::Duration;

/// Timeout for the model-list request
const MODEL_LIST_TIMEOUT: Duration = Duration::from_secs(10);
/// Timeout for the completion request
const COMPLETION_TIMEOUT: Duration = Duration::from_secs(20);
/// Attempts per round trip before giving up
const MAX_ATTEMPTS: u32 = 3;
/// Fixed delay between attempts
const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Seam between the retry/prompt logic and the wire protocol
pub trait ChatBackend: Send + Sync {
    /// List the identifiers of models loaded on the server
    fn list_models(&self) -> Result<Vec<String>, GatewayError>;

    /// Run one non-streaming chat completion
    fn complete(&self, model: &str, system: &str, user: &str) -> Result<String, GatewayError>;
}

/// The gateway: retry policy + prompt construction + response sanitizing
pub struct Brain {
    backend: Box<dyn ChatBackend>,
}

impl Brain {
    /// Gateway over the configured HTTP endpoint
    pub fn new(config: &LlmConfig) -> Self {
        Self {
            backend: Box::new(HttpBackend::new(config)),
        }
    }

    /// Gateway over an arbitrary backend (used by tests)
    pub fn with_backend(backend: Box<dyn ChatBackend>) -> Self {
        Self { backend }
    }

    /// Generate a notification for `event_description`.
    ///
    /// An empty model list fails immediately with `GatewayError::NoModels`;
    /// that's a server configuration problem, not a transient fault.
    pub fn generate(&self, event_description: &str) -> Result<String, GatewayError> {
        let models = with_retries("model discovery", || self.backend.list_models())?;
        let model = models.first().ok_or(GatewayError::NoModels)?;
        tracing::debug!("Using model '{}'", model);

        let user_message = format!("Translate the following event: '{}'", event_description);
        let raw = with_retries("completion", || {
            self.backend.complete(model, SYSTEM_PROMPT, &user_message)
        })?;

        Ok(sanitize(&raw))
    }
}

/// Run `operation` up to `MAX_ATTEMPTS` times with a fixed delay between
/// attempts. Non-retryable errors short-circuit.
fn with_retries<T>(
    what: &str,
    mut operation: impl FnMut() -> Result<T, GatewayError>,
) -> Result<T, GatewayError> {
    let mut attempt = 1;
    loop {
        match operation() {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < MAX_ATTEMPTS => {
                tracing::warn!(
                    "{} failed (attempt {}/{}), retrying: {}",
                    what,
                    attempt,
                    MAX_ATTEMPTS,
                    e
                );
                std::thread::sleep(RETRY_DELAY);
                attempt += 1;
            }
            Err(e) => {
                tracing::error!("{} failed after {} attempt(s): {}", what, attempt, e);
                return Err(e);
            }
        }
    }
}

/// Strip conversational preamble models sometimes prepend.
///
/// Applied once to the trimmed completion text: the substring between the
/// first pair of double quotes if any, else the text after the last colon,
/// else the text unchanged.
pub fn sanitize(raw: &str) -> String {
    let text = raw.trim();

    if text.contains('"') {
        if let Some(quoted) = text.split('"').nth(1) {
            return quoted.trim().to_string();
        }
    }
    if let Some((_, after)) = text.rsplit_once(':') {
        return after.trim().to_string();
    }

    text.to_string()
}

/// Blocking HTTP backend speaking the OpenAI-compatible wire format
pub struct HttpBackend {
    endpoint: String,
    temperature: f32,
}

#[derive(Deserialize)]
struct ModelList {
    data: Vec<ModelEntry>,
}

#[derive(Deserialize)]
struct ModelEntry {
    id: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

impl HttpBackend {
    pub fn new(config: &LlmConfig) -> Self {
        Self {
            endpoint: config.lm_studio_endpoint.trim_end_matches('/').to_string(),
            temperature: config.temperature,
        }
    }
}

fn map_ureq_error(e: ureq::Error) -> GatewayError {
    match e {
        ureq::Error::Status(code, resp) => {
            let body = resp.into_string().unwrap_or_default();
            GatewayError::HttpStatus(code, body)
        }
        ureq::Error::Transport(t) => GatewayError::Connection(t.to_string()),
    }
}

impl ChatBackend for HttpBackend {
    fn list_models(&self) -> Result<Vec<String>, GatewayError> {
        let url = format!("{}/models", self.endpoint);
        tracing::debug!("Querying models at {}", url);

        let response = ureq::get(&url)
            .timeout(MODEL_LIST_TIMEOUT)
            .call()
            .map_err(map_ureq_error)?;

        let list: ModelList = response
            .into_json()
            .map_err(|e| GatewayError::MalformedResponse(format!("model list: {}", e)))?;

        Ok(list.data.into_iter().map(|m| m.id).collect())
    }

    fn complete(&self, model: &str, system: &str, user: &str) -> Result<String, GatewayError> {
        let url = format!("{}/chat/completions", self.endpoint);

        let response = ureq::post(&url)
            .timeout(COMPLETION_TIMEOUT)
            .send_json(serde_json::json!({
                "model": model,
                "messages": [
                    { "role": "system", "content": system },
                    { "role": "user", "content": user },
                ],
                "temperature": self.temperature,
                "stream": false,
            }))
            .map_err(map_ureq_error)?;

        let parsed: ChatResponse = response
            .into_json()
            .map_err(|e| GatewayError::MalformedResponse(format!("completion: {}", e)))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| GatewayError::MalformedResponse("no choices in completion".into()))?;

        Ok(content.trim().to_string())
    }
}
