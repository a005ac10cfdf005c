use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::proxy::errors::{ProxyError, ProxyResult};
use crate::proxy::router::SharedState;
use crate::proxy::translator;
use crate::proxy::types::ollama::{ChatChunk, ChatRequest};
use crate::proxy::types::openai::ChatCompletionMessage;

/// Handles `POST /api/chat`.
pub async fn handle_chat(state: Arc<SharedState>, body: Bytes) -> ProxyResult<Response> {
    let request: ChatRequest = serde_json::from_slice(&body).map_err(|e| {
        log::warn!("rejecting unparsable chat request: {}", e);
        ProxyError::MalformedRequest(format!("invalid JSON payload: {}", e))
    })?;

    // Clients like Open WebUI omit "stream" here and expect streaming.
    let streaming = request.stream.unwrap_or(true);

    let model = state.registry.resolve(&request.model).await?;
    log::info!(
        "chat request: alias='{}' model='{}' stream={}",
        request.model,
        model,
        streaming
    );

    let messages: Vec<ChatCompletionMessage> = request
        .messages
        .into_iter()
        .map(|m| ChatCompletionMessage {
            role: m.role,
            content: m.content,
        })
        .collect();

    if streaming {
        let deltas = state.upstream.chat_stream(&model, messages).await?;
        let body = Body::from_stream(translator::ndjson_chunks(model, deltas));
        Response::builder()
            .header(header::CONTENT_TYPE, "application/x-ndjson")
            .header(header::CACHE_CONTROL, "no-cache")
            .body(body)
            .map_err(|e| ProxyError::Internal(format!("failed to build response: {}", e)))
    } else {
        let completion = state.upstream.chat(&model, messages).await?;
        let choice = completion.choices.into_iter().next().ok_or_else(|| {
            ProxyError::UpstreamUnavailable("upstream returned no choices".to_string())
        })?;
        let reason = choice
            .finish_reason
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| translator::DEFAULT_FINISH_REASON.to_string());
        let chunk = ChatChunk::complete(&model, choice.message.content, reason);
        Ok(Json(chunk).into_response())
    }
}
