use serde::{Deserialize, Serialize};

/// Synthetic size reported for every model. The upstream listing carries no
/// size information, but clients expect the field to be present.
pub const SYNTHETIC_MODEL_SIZE: u64 = 270_898_672;

// Represents an Ollama chat completion request.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ChatRequest {
    pub model: String,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

// Represents a message in a chat request or a streamed chunk.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default)]
    pub content: String,
}

// Represents an `/api/show` request body.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ShowRequest {
    pub name: Option<String>,
}

// Represents a single model entry in the `/api/tags` listing.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TagModel {
    /// Short display name, the part after the vendor prefix.
    pub name: String,
    /// Fully qualified upstream identifier.
    pub model: String,
    pub modified_at: String,
    pub size: u64,
    pub digest: String,
    pub details: ModelDetails,
}

/// Synthetic model metadata. The upstream API exposes nothing comparable;
/// clients only check that the fields exist.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ModelDetails {
    pub parent_model: String,
    pub format: String,
    pub family: String,
    pub families: Vec<String>,
    pub parameter_size: String,
    pub quantization_level: String,
}

impl Default for ModelDetails {
    fn default() -> Self {
        Self {
            parent_model: String::new(),
            format: "gguf".to_string(),
            family: "claude".to_string(),
            families: vec!["claude".to_string()],
            parameter_size: "175B".to_string(),
            quantization_level: "Q4_K_M".to_string(),
        }
    }
}

/// One unit of an `/api/chat` response. Streaming responses are a sequence
/// of these, one JSON object per line; the last one has `done: true`, no
/// message, and zero-valued timing stats.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ChatChunk {
    pub model: String,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<ChatMessage>,
    pub done: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_duration: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_duration: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_eval_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eval_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eval_duration: Option<u64>,
}

impl ChatChunk {
    /// A non-terminal chunk carrying one content delta. The content may be
    /// empty; clients rely on `done: false`, not on content length.
    pub fn delta(model: &str, content: String) -> Self {
        Self {
            model: model.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            message: Some(ChatMessage {
                role: "assistant".to_string(),
                content,
            }),
            done: false,
            ..Default::default()
        }
    }

    /// The terminal chunk closing a streamed response.
    pub fn terminal(model: &str, finish_reason: String) -> Self {
        Self {
            model: model.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            message: None,
            done: true,
            finish_reason: Some(finish_reason),
            total_duration: Some(0),
            load_duration: Some(0),
            prompt_eval_count: Some(0),
            eval_count: Some(0),
            eval_duration: Some(0),
        }
    }

    /// A complete non-streamed response: full content plus the terminal
    /// fields in a single chunk.
    pub fn complete(model: &str, content: String, finish_reason: String) -> Self {
        let mut chunk = Self::terminal(model, finish_reason);
        chunk.message = Some(ChatMessage {
            role: "assistant".to_string(),
            content,
        });
        chunk
    }
}
