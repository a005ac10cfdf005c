use serde::{Deserialize, Serialize};

// Represents the upstream `GET /models` listing.
#[derive(Deserialize, Debug, Clone)]
pub struct ModelList {
    pub data: Vec<UpstreamModel>,
}

// Represents one model in the upstream listing. Only the identifier is
// consumed; the rest of the entry is ignored.
#[derive(Deserialize, Debug, Clone)]
pub struct UpstreamModel {
    pub id: String,
}

// Represents the upstream `POST /chat/completions` request body.
#[derive(Serialize, Debug, Clone)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatCompletionMessage>,
    pub stream: bool,
}

// Represents a message in an upstream request or response.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ChatCompletionMessage {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
}

// Represents a non-streamed upstream completion response.
#[derive(Deserialize, Debug, Clone)]
pub struct ChatCompletion {
    pub choices: Vec<ChatChoice>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ChatChoice {
    pub message: ChatCompletionMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

// Represents one parsed SSE data event of a streamed completion.
#[derive(Deserialize, Debug, Clone)]
pub struct ChatCompletionChunk {
    #[serde(default)]
    pub choices: Vec<StreamChoice>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct StreamChoice {
    #[serde(default)]
    pub delta: MessageDelta,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct MessageDelta {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// One incremental unit of a streamed completion, decoupled from the
/// upstream wire format. Transient: produced per SSE data event, consumed
/// by the response translator, never stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatDelta {
    pub role: Option<String>,
    pub content: String,
    pub finish_reason: Option<String>,
}

impl ChatDelta {
    /// Collapses an upstream stream chunk into a delta. Returns `None` when
    /// the chunk has no choices (some providers send keep-alive chunks).
    pub fn from_chunk(chunk: ChatCompletionChunk) -> Option<Self> {
        let choice = chunk.choices.into_iter().next()?;
        Some(Self {
            role: choice.delta.role,
            content: choice.delta.content.unwrap_or_default(),
            finish_reason: choice.finish_reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_stream_chunk_with_content() {
        let data = r#"{"id":"gen-1","choices":[{"delta":{"role":"assistant","content":"Hel"},"finish_reason":null}]}"#;
        let chunk: ChatCompletionChunk = serde_json::from_str(data).unwrap();
        let delta = ChatDelta::from_chunk(chunk).unwrap();

        assert_eq!(delta.role.as_deref(), Some("assistant"));
        assert_eq!(delta.content, "Hel");
        assert!(delta.finish_reason.is_none());
    }

    #[test]
    fn parses_final_stream_chunk_with_finish_reason() {
        let data = r#"{"choices":[{"delta":{},"finish_reason":"stop"}]}"#;
        let chunk: ChatCompletionChunk = serde_json::from_str(data).unwrap();
        let delta = ChatDelta::from_chunk(chunk).unwrap();

        assert_eq!(delta.content, "");
        assert_eq!(delta.finish_reason.as_deref(), Some("stop"));
    }

    #[test]
    fn chunk_without_choices_yields_no_delta() {
        let chunk: ChatCompletionChunk = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(ChatDelta::from_chunk(chunk).is_none());
    }

    #[test]
    fn parses_model_listing() {
        let body = r#"{"data":[{"id":"anthropic/claude-sonnet-4"},{"id":"openai/gpt-4o","name":"GPT-4o"}]}"#;
        let list: ModelList = serde_json::from_str(body).unwrap();
        let ids: Vec<&str> = list.data.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["anthropic/claude-sonnet-4", "openai/gpt-4o"]);
    }
}
