use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type ProxyResult<T> = Result<T, ProxyError>;

/// Error types for the proxy module.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// The request body could not be parsed or is missing required fields.
    #[error("invalid request: {0}")]
    MalformedRequest(String),

    /// `/api/show` was called without a model name.
    #[error("model name is required")]
    MissingModelName,

    /// Alias resolution failed and pass-through is disabled.
    #[error("model '{0}' not found")]
    ModelNotResolved(String),

    /// The upstream API could not be reached or rejected the request. The
    /// message carries the upstream error text verbatim.
    #[error("upstream error: {0}")]
    UpstreamUnavailable(String),

    /// The upstream stream failed after the response status was already
    /// sent. Reported in-band as an NDJSON error line, never as a status.
    #[error("stream error: {0}")]
    MidStreamFailure(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ProxyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::MalformedRequest(_) | ProxyError::MissingModelName => {
                StatusCode::BAD_REQUEST
            }
            ProxyError::ModelNotResolved(_) => StatusCode::NOT_FOUND,
            ProxyError::UpstreamUnavailable(_)
            | ProxyError::MidStreamFailure(_)
            | ProxyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
