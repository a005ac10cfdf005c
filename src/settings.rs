use std::collections::HashMap;
use std::path::PathBuf;

use thiserror::Error;

use crate::proxy::upstream::DEFAULT_BASE_URL;

/// Ollama's well-known port, so existing clients connect unconfigured.
pub const DEFAULT_PORT: u16 = 11434;

const DEFAULT_FILTER_PATH: &str = "models-filter";
const DEFAULT_STREAM_IDLE_TIMEOUT_SECS: u64 = 300;

const API_KEY_ENV: &str = "OPENROUTER_API_KEY";
const PORT_ENV: &str = "OLLABRIDGE_PORT";
const FILTER_PATH_ENV: &str = "OLLABRIDGE_MODEL_FILTER";
const STRICT_ENV: &str = "OLLABRIDGE_STRICT_MODELS";
const UPSTREAM_URL_ENV: &str = "OLLABRIDGE_UPSTREAM_URL";
const REQUEST_TIMEOUT_ENV: &str = "OLLABRIDGE_REQUEST_TIMEOUT_SECS";
const STREAM_IDLE_TIMEOUT_ENV: &str = "OLLABRIDGE_STREAM_IDLE_TIMEOUT_SECS";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("no API key: set OPENROUTER_API_KEY or pass the key as the first argument")]
    MissingApiKey,

    #[error("invalid value for {var}: '{value}'")]
    InvalidValue { var: &'static str, value: String },
}

/// Runtime configuration, read once at startup from the environment and
/// the command line.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: String,
    pub port: u16,
    pub filter_path: PathBuf,
    /// Reject aliases missing from the upstream catalog instead of
    /// passing them through.
    pub strict_models: bool,
    pub upstream_base_url: String,
    /// Timeout for non-streaming upstream exchanges. 0 disables.
    pub request_timeout_secs: u64,
    /// Maximum gap between streamed deltas before the stream is dropped.
    /// 0 disables.
    pub stream_idle_timeout_secs: u64,
}

impl Settings {
    pub fn load() -> Result<Self, SettingsError> {
        Self::from_sources(std::env::vars().collect(), std::env::args().skip(1).collect())
    }

    /// The environment variable takes precedence over the positional
    /// argument; without either the process cannot start.
    fn from_sources(
        env: HashMap<String, String>,
        args: Vec<String>,
    ) -> Result<Self, SettingsError> {
        let api_key = env
            .get(API_KEY_ENV)
            .cloned()
            .filter(|key| !key.is_empty())
            .or_else(|| args.first().cloned().filter(|key| !key.is_empty()))
            .ok_or(SettingsError::MissingApiKey)?;

        Ok(Self {
            api_key,
            port: parse_var(&env, PORT_ENV)?.unwrap_or(DEFAULT_PORT),
            filter_path: env
                .get(FILTER_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_FILTER_PATH)),
            strict_models: env
                .get(STRICT_ENV)
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            upstream_base_url: env
                .get(UPSTREAM_URL_ENV)
                .cloned()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            request_timeout_secs: parse_var(&env, REQUEST_TIMEOUT_ENV)?.unwrap_or(0),
            stream_idle_timeout_secs: parse_var(&env, STREAM_IDLE_TIMEOUT_ENV)?
                .unwrap_or(DEFAULT_STREAM_IDLE_TIMEOUT_SECS),
        })
    }
}

fn parse_var<T: std::str::FromStr>(
    env: &HashMap<String, String>,
    var: &'static str,
) -> Result<Option<T>, SettingsError> {
    match env.get(var) {
        None => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| SettingsError::InvalidValue {
                var,
                value: value.clone(),
            }),
    }
}
