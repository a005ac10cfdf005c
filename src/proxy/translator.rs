//! Reshapes upstream completion deltas into Ollama chat chunks.
//!
//! The streaming wire format is NDJSON: one complete JSON object per
//! line, closed by a single terminal object with `"done": true`. Every
//! chunk is yielded as its own body frame so the transport flushes it as
//! soon as the delta arrives.

use std::convert::Infallible;
use std::pin::pin;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};

use crate::proxy::errors::ProxyError;
use crate::proxy::types::ollama::ChatChunk;
use crate::proxy::types::openai::ChatDelta;

/// Finish reason reported when the upstream never sent one.
pub const DEFAULT_FINISH_REASON: &str = "stop";

/// Translates a delta stream into an NDJSON chunk stream.
///
/// One non-terminal chunk per delta (content may be empty), then exactly
/// one terminal chunk carrying the last finish reason seen. If the
/// upstream fails mid-stream a best-effort in-band `{"error": ...}` line
/// is written and the stream ends with no terminal chunk; the 200 status
/// is long gone by then.
pub fn ndjson_chunks<S>(
    model: String,
    deltas: S,
) -> impl Stream<Item = Result<Bytes, Infallible>> + Send
where
    S: Stream<Item = Result<ChatDelta, ProxyError>> + Send + 'static,
{
    async_stream::stream! {
        let mut deltas = pin!(deltas);
        let mut finish_reason: Option<String> = None;

        while let Some(item) = deltas.next().await {
            match item {
                Ok(delta) => {
                    if let Some(reason) = delta.finish_reason.filter(|r| !r.is_empty()) {
                        finish_reason = Some(reason);
                    }
                    yield Ok(ndjson_line(&ChatChunk::delta(&model, delta.content)));
                }
                Err(e) => {
                    log::error!("stream translation aborted: {}", e);
                    yield Ok(error_line(&e));
                    return;
                }
            }
        }

        let reason = finish_reason.unwrap_or_else(|| DEFAULT_FINISH_REASON.to_string());
        yield Ok(ndjson_line(&ChatChunk::terminal(&model, reason)));
    }
}

fn ndjson_line(chunk: &ChatChunk) -> Bytes {
    let mut line = match serde_json::to_string(chunk) {
        Ok(line) => line,
        Err(e) => {
            log::error!("failed to serialize chat chunk: {}", e);
            return Bytes::new();
        }
    };
    line.push('\n');
    Bytes::from(line)
}

fn error_line(err: &ProxyError) -> Bytes {
    let mut line = serde_json::json!({ "error": err.to_string() }).to_string();
    line.push('\n');
    Bytes::from(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;
    use serde_json::Value;

    async fn collect_lines<S>(chunks: S) -> Vec<Value>
    where
        S: Stream<Item = Result<Bytes, Infallible>> + Send,
    {
        let body: Vec<Bytes> = pin!(chunks).map(|item| item.unwrap()).collect().await;
        let text = body
            .iter()
            .map(|b| std::str::from_utf8(b).unwrap())
            .collect::<String>();
        text.lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    fn content_delta(content: &str) -> Result<ChatDelta, ProxyError> {
        Ok(ChatDelta {
            role: Some("assistant".to_string()),
            content: content.to_string(),
            finish_reason: None,
        })
    }

    #[tokio::test]
    async fn three_deltas_yield_three_chunks_plus_terminal() {
        let deltas = stream::iter(vec![
            content_delta("He"),
            content_delta("llo"),
            Ok(ChatDelta {
                role: None,
                content: String::new(),
                finish_reason: Some("length".to_string()),
            }),
        ]);

        let lines = collect_lines(ndjson_chunks("m".to_string(), deltas)).await;
        assert_eq!(lines.len(), 4);

        for line in &lines[..3] {
            assert_eq!(line["done"], false);
            assert_eq!(line["message"]["role"], "assistant");
        }
        assert_eq!(lines[0]["message"]["content"], "He");
        assert_eq!(lines[1]["message"]["content"], "llo");
        assert_eq!(lines[2]["message"]["content"], "");

        let terminal = &lines[3];
        assert_eq!(terminal["done"], true);
        assert_eq!(terminal["finish_reason"], "length");
        assert!(terminal.get("message").is_none());
        assert_eq!(terminal["eval_count"], 0);
    }

    #[tokio::test]
    async fn finish_reason_defaults_to_stop() {
        let deltas = stream::iter(vec![content_delta("hi")]);
        let lines = collect_lines(ndjson_chunks("m".to_string(), deltas)).await;

        assert_eq!(lines.last().unwrap()["finish_reason"], "stop");
    }

    #[tokio::test]
    async fn empty_stream_still_emits_a_terminal_chunk() {
        let deltas = stream::iter(Vec::<Result<ChatDelta, ProxyError>>::new());
        let lines = collect_lines(ndjson_chunks("m".to_string(), deltas)).await;

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["done"], true);
        assert_eq!(lines[0]["finish_reason"], "stop");
    }

    #[tokio::test]
    async fn mid_stream_error_writes_error_line_and_stops() {
        let deltas = stream::iter(vec![
            content_delta("partial"),
            Err(ProxyError::MidStreamFailure("connection reset".to_string())),
            content_delta("never sent"),
        ]);

        let lines = collect_lines(ndjson_chunks("m".to_string(), deltas)).await;
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["message"]["content"], "partial");
        assert_eq!(lines[1]["error"], "stream error: connection reset");
        // No terminal chunk after an error.
        assert!(lines.iter().all(|l| l["done"] != true));
    }
}
