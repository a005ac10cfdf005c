//! HTTP routing for the bridge.
//!
//! The surface mirrors the subset of Ollama's REST API that chat clients
//! actually probe: liveness at `/` (axum answers HEAD for GET routes, so
//! `HEAD /` health checks get their empty 200), the model listing at
//! `/api/tags`, stub model details at `/api/show`, and completions at
//! `/api/chat`.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;

use crate::proxy::errors::ProxyResult;
use crate::proxy::filter::ModelFilter;
use crate::proxy::handler;
use crate::proxy::registry::ModelRegistry;
use crate::proxy::upstream::OpenRouterClient;
use crate::settings::Settings;

/// State shared by all request handlers.
pub struct SharedState {
    pub settings: Settings,
    pub upstream: Arc<OpenRouterClient>,
    pub registry: ModelRegistry,
    pub filter: ModelFilter,
}

pub fn routes(state: Arc<SharedState>) -> Router {
    Router::new()
        .route("/", get(liveness))
        .route("/api/tags", get(tags))
        .route("/api/show", post(show))
        .route("/api/chat", post(chat))
        .with_state(state)
}

async fn liveness() -> &'static str {
    "Ollama is running"
}

async fn tags(State(state): State<Arc<SharedState>>) -> ProxyResult<Json<Value>> {
    handler::handle_tags(state).await
}

async fn show(body: Bytes) -> ProxyResult<Json<Value>> {
    handler::handle_show(body).await
}

async fn chat(State(state): State<Arc<SharedState>>, body: Bytes) -> ProxyResult<Response> {
    handler::handle_chat(state, body).await
}
