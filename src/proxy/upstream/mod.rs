//! Client for the upstream OpenAI-compatible chat completion API.

pub mod sse;

use std::time::Duration;

use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use reqwest::header;
use tokio_stream::wrappers::ReceiverStream;

use crate::proxy::errors::{ProxyError, ProxyResult};
use crate::proxy::types::openai::{
    ChatCompletion, ChatCompletionChunk, ChatCompletionMessage, ChatCompletionRequest, ChatDelta,
    ModelList,
};
use crate::settings::Settings;

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// A source of upstream model identifiers.
///
/// Seam between the alias registry and the network so tests can supply a
/// fixed catalog.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fully qualified model identifiers, in the upstream's listing order.
    async fn model_ids(&self) -> ProxyResult<Vec<String>>;
}

/// HTTP client for the OpenRouter API.
#[derive(Clone)]
pub struct OpenRouterClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    /// Applied to non-streaming exchanges only. `None` disables it.
    request_timeout: Option<Duration>,
    /// Maximum gap between stream events before the stream is abandoned.
    stream_idle_timeout: Option<Duration>,
}

impl OpenRouterClient {
    pub fn new(settings: &Settings) -> ProxyResult<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| ProxyError::Internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: settings.upstream_base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            request_timeout: duration_or_none(settings.request_timeout_secs),
            stream_idle_timeout: duration_or_none(settings.stream_idle_timeout_secs),
        })
    }

    /// Performs a non-streaming chat completion.
    pub async fn chat(
        &self,
        model: &str,
        messages: Vec<ChatCompletionMessage>,
    ) -> ProxyResult<ChatCompletion> {
        let body = ChatCompletionRequest {
            model: model.to_string(),
            messages,
            stream: false,
        };
        let mut request = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body);
        if let Some(timeout) = self.request_timeout {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProxyError::UpstreamUnavailable(format!("chat request failed: {}", e)))?;
        let response = check_status(response).await?;

        response
            .json::<ChatCompletion>()
            .await
            .map_err(|e| ProxyError::UpstreamUnavailable(format!("invalid chat response: {}", e)))
    }

    /// Opens a streaming chat completion and yields one delta per upstream
    /// data event. Returns an error if the stream cannot be established;
    /// failures after that surface as `MidStreamFailure` items.
    pub async fn chat_stream(
        &self,
        model: &str,
        messages: Vec<ChatCompletionMessage>,
    ) -> ProxyResult<impl Stream<Item = ProxyResult<ChatDelta>> + Send + 'static> {
        let body = ChatCompletionRequest {
            model: model.to_string(),
            messages,
            stream: true,
        };
        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .header(header::ACCEPT, "text/event-stream")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProxyError::UpstreamUnavailable(format!("chat request failed: {}", e)))?;
        let response = check_status(response).await?;

        let mut events = ReceiverStream::new(sse::split_events(response));
        let idle_timeout = self.stream_idle_timeout;

        Ok(async_stream::stream! {
            loop {
                let next = match idle_timeout {
                    Some(limit) => match tokio::time::timeout(limit, events.next()).await {
                        Ok(item) => item,
                        Err(_) => {
                            yield Err(ProxyError::MidStreamFailure(format!(
                                "no data from upstream for {}s",
                                limit.as_secs()
                            )));
                            return;
                        }
                    },
                    None => events.next().await,
                };

                // Channel closed without a [DONE] sentinel: treat as a
                // clean end of stream.
                let Some(item) = next else { return };

                let event = match item {
                    Ok(event) => event,
                    Err(e) => {
                        yield Err(ProxyError::MidStreamFailure(e));
                        return;
                    }
                };

                let text = String::from_utf8_lossy(&event);
                let Some(data) = sse::data_line(&text) else { continue };
                if data == "[DONE]" {
                    return;
                }

                match serde_json::from_str::<ChatCompletionChunk>(data) {
                    Ok(chunk) => {
                        if let Some(delta) = ChatDelta::from_chunk(chunk) {
                            yield Ok(delta);
                        }
                    }
                    Err(e) => {
                        log::error!("unparsable upstream stream event: {}", e);
                        yield Err(ProxyError::MidStreamFailure(format!(
                            "invalid upstream chunk: {}",
                            e
                        )));
                        return;
                    }
                }
            }
        })
    }

    async fn list_models(&self) -> ProxyResult<Vec<String>> {
        let mut request = self
            .http
            .get(format!("{}/models", self.base_url))
            .bearer_auth(&self.api_key);
        if let Some(timeout) = self.request_timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| {
            ProxyError::UpstreamUnavailable(format!("model listing failed: {}", e))
        })?;
        let response = check_status(response).await?;

        let list: ModelList = response.json().await.map_err(|e| {
            ProxyError::UpstreamUnavailable(format!("invalid model listing: {}", e))
        })?;
        Ok(list.data.into_iter().map(|m| m.id).collect())
    }
}

#[async_trait]
impl CatalogSource for OpenRouterClient {
    async fn model_ids(&self) -> ProxyResult<Vec<String>> {
        self.list_models().await
    }
}

/// Turns a non-2xx upstream response into an error carrying the upstream's
/// own error text.
async fn check_status(response: reqwest::Response) -> ProxyResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    log::warn!("upstream returned {}: {}", status, body);
    Err(ProxyError::UpstreamUnavailable(if body.is_empty() {
        status.to_string()
    } else {
        body
    }))
}

fn duration_or_none(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}
