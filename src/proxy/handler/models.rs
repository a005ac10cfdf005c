use std::sync::Arc;

use axum::body::Bytes;
use axum::Json;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use crate::proxy::errors::{ProxyError, ProxyResult};
use crate::proxy::filter::ModelFilter;
use crate::proxy::router::SharedState;
use crate::proxy::types::ollama::{ModelDetails, ShowRequest, TagModel, SYNTHETIC_MODEL_SIZE};

/// Handles `GET /api/tags`.
///
/// Fetching the listing is also what refreshes the alias registry, so the
/// table is published before the allow-list filter is applied: filtering
/// is display-only and must not narrow what aliases resolve.
pub async fn handle_tags(state: Arc<SharedState>) -> ProxyResult<Json<Value>> {
    let ids = state.registry.refresh().await?;
    let models = filtered_models(&ids, &state.filter);
    Ok(Json(json!({ "models": models })))
}

fn filtered_models(ids: &[String], filter: &ModelFilter) -> Vec<TagModel> {
    ids.iter()
        .map(|id| tag_model(id))
        .filter(|model| filter.allows(&model.name))
        .collect()
}

/// Builds the listing entry for one fully qualified model id.
fn tag_model(id: &str) -> TagModel {
    TagModel {
        name: display_name(id).to_string(),
        model: id.to_string(),
        modified_at: chrono::Utc::now().to_rfc3339(),
        size: SYNTHETIC_MODEL_SIZE,
        digest: digest_for(id),
        details: ModelDetails::default(),
    }
}

/// Final `/`-delimited segment, or the id itself when not vendor-prefixed.
fn display_name(id: &str) -> &str {
    id.rsplit('/').next().unwrap_or(id)
}

/// Deterministic stand-in digest. Clients only check that the field is
/// present, but keeping it stable across refreshes keeps listings
/// idempotent.
fn digest_for(id: &str) -> String {
    format!("{:x}", Sha256::digest(id.as_bytes()))
}

/// Handles `POST /api/show`. The response is a fixed stub: the upstream
/// API has none of this metadata.
pub async fn handle_show(body: Bytes) -> ProxyResult<Json<Value>> {
    let payload: ShowRequest = serde_json::from_slice(&body)
        .map_err(|e| ProxyError::MalformedRequest(format!("invalid JSON payload: {}", e)))?;
    let name = payload
        .name
        .filter(|name| !name.is_empty())
        .ok_or(ProxyError::MissingModelName)?;
    log::debug!("serving stub details for model '{}'", name);

    Ok(Json(json!({
        "license": "STUB License",
        "system": "STUB SYSTEM",
        "modifiedAt": chrono::Utc::now().to_rfc3339(),
        "details": {
            "format": "gguf",
            "parameter_size": "200B",
            "quantization_level": "Q4_K_M",
        },
        "model_info": {
            "architecture": "STUB",
            "context_length": 200000,
            "parameter_count": 200_000_000_000u64,
        },
    })))
}
