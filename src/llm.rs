use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ApiConfig;

/// Outcome of one completion attempt. This is the client's entire boundary:
/// faults never propagate past it as errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionResult {
    Success(String),
    Unavailable(UnavailableReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnavailableReason {
    NoCredential,
    HttpError(u16),
    Timeout,
    MalformedResponse,
    TransportError,
}

impl std::fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnavailableReason::NoCredential => write!(f, "no API credential configured"),
            UnavailableReason::HttpError(status) => write!(f, "endpoint returned HTTP {}", status),
            UnavailableReason::Timeout => write!(f, "request timed out"),
            UnavailableReason::MalformedResponse => write!(f, "no text in response"),
            UnavailableReason::TransportError => write!(f, "transport error"),
        }
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<RoleMessage<'a>>,
    stream: bool,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct RoleMessage<'a> {
    role: &'a str,
    content: &'a str,
}

pub struct CompletionClient {
    client: reqwest::Client,
    config: ApiConfig,
}

impl CompletionClient {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// One completion attempt for `user_text`. Exactly zero or one HTTP
    /// request; no retries. The whole exchange is bounded by the configured
    /// timeout, after which the in-flight request is dropped.
    pub async fn complete(&self, user_text: &str) -> CompletionResult {
        let Some(api_key) = self.config.api_key.as_deref() else {
            debug!("no API key configured, skipping completion call");
            return CompletionResult::Unavailable(UnavailableReason::NoCredential);
        };

        let request = CompletionRequest {
            model: &self.config.model,
            messages: vec![
                RoleMessage {
                    role: "system",
                    content: &self.config.system_prompt,
                },
                RoleMessage {
                    role: "user",
                    content: user_text,
                },
            ],
            stream: false,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        debug!("Sending completion request to {}", self.config.endpoint);

        let exchange = async {
            let response = match self
                .client
                .post(&self.config.endpoint)
                .header("Authorization", format!("Bearer {}", api_key))
                .header("Content-Type", "application/json")
                .json(&request)
                .send()
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    warn!("Completion request failed to send: {}", e);
                    let reason = if e.is_timeout() {
                        UnavailableReason::Timeout
                    } else {
                        UnavailableReason::TransportError
                    };
                    return CompletionResult::Unavailable(reason);
                }
            };

            let status = response.status();
            if !status.is_success() {
                // Surface the body in the log for diagnostics, never to the caller.
                let body = response.text().await.unwrap_or_default();
                warn!("Completion endpoint returned {}: {}", status, body);
                return CompletionResult::Unavailable(UnavailableReason::HttpError(
                    status.as_u16(),
                ));
            }

            let payload: Value = match response.json().await {
                Ok(payload) => payload,
                Err(e) => {
                    warn!("Completion response was not valid JSON: {}", e);
                    return CompletionResult::Unavailable(UnavailableReason::TransportError);
                }
            };

            match extract_text(&payload) {
                Some(text) => CompletionResult::Success(text),
                None => {
                    warn!("Completion response had no recognizable text field");
                    CompletionResult::Unavailable(UnavailableReason::MalformedResponse)
                }
            }
        };

        match tokio::time::timeout(self.config.timeout, exchange).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    "Completion request exceeded {:?}, aborting",
                    self.config.timeout
                );
                CompletionResult::Unavailable(UnavailableReason::Timeout)
            }
        }
    }
}

/// Probe the documented response shapes in priority order; first non-empty
/// text wins.
fn extract_text(payload: &Value) -> Option<String> {
    [
        payload.pointer("/choices/0/message/content"),
        payload.get("text"),
        payload.pointer("/output/0/content/0/text"),
        payload.get("generated_text"),
    ]
    .into_iter()
    .flatten()
    .filter_map(Value::as_str)
    .map(str::trim)
    .find(|s| !s.is_empty())
    .map(str::to_string)
}
