//! # Ollama-compatible proxy module
//!
//! Serves an HTTP API shaped like Ollama's REST interface and forwards
//! requests to an OpenAI-compatible upstream, reshaping responses
//! (including streamed token deltas) back into the Ollama wire format.

pub mod errors;
pub mod filter;
pub mod handler;
pub mod registry;
pub mod router;
pub mod translator;
pub mod types;
pub mod upstream;

pub use errors::{ProxyError, ProxyResult};
pub use router::{routes, SharedState};
