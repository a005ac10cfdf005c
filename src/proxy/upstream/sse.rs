use bytes::{Bytes, BytesMut};
use tokio::sync::mpsc;

/// SSE events are separated by a blank line.
const EVENT_DELIMITER: &[u8] = b"\n\n";

const BUFFER_CAPACITY: usize = 8192;
const CHANNEL_CAPACITY: usize = 32;

/// Splits a streaming HTTP response body into complete SSE event blocks.
///
/// Network chunks do not respect event boundaries: one chunk may hold half
/// an event or several. Incoming bytes are buffered and one message is sent
/// per `\n\n` delimiter, so the consumer only ever sees whole events.
/// Reading runs on a spawned task; dropping the receiver ends it.
pub fn split_events(mut response: reqwest::Response) -> mpsc::Receiver<Result<Bytes, String>> {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

    tokio::spawn(async move {
        let mut buffer = BytesMut::with_capacity(BUFFER_CAPACITY);
        loop {
            match response.chunk().await {
                Ok(Some(chunk)) => {
                    buffer.extend_from_slice(&chunk);
                    while let Some(pos) = memchr::memmem::find(&buffer, EVENT_DELIMITER) {
                        let event = buffer.split_to(pos + EVENT_DELIMITER.len()).freeze();
                        if tx.send(Ok(event)).await.is_err() {
                            // Receiver dropped: the client went away.
                            return;
                        }
                    }
                }
                Ok(None) => {
                    // Upstream closed the connection; flush whatever is
                    // left without a trailing delimiter.
                    if !buffer.is_empty() {
                        let _ = tx.send(Ok(buffer.split().freeze())).await;
                    }
                    return;
                }
                Err(e) => {
                    log::error!("error reading upstream stream: {}", e);
                    let _ = tx.send(Err(e.to_string())).await;
                    return;
                }
            }
        }
    });

    rx
}

/// Extracts the payload of the first `data:` line in a raw SSE event.
pub fn data_line(event: &str) -> Option<&str> {
    event
        .lines()
        .find_map(|line| line.strip_prefix("data:").map(str::trim))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_data_payload() {
        let event = "data: {\"choices\":[]}\n\n";
        assert_eq!(data_line(event), Some("{\"choices\":[]}"));
    }

    #[test]
    fn skips_non_data_fields() {
        let event = ": keep-alive\nevent: message\ndata: [DONE]\n\n";
        assert_eq!(data_line(event), Some("[DONE]"));
    }

    #[test]
    fn event_without_data_yields_none() {
        assert_eq!(data_line(": ping\n\n"), None);
        assert_eq!(data_line(""), None);
    }

    #[test]
    fn tolerates_missing_space_after_colon() {
        assert_eq!(data_line("data:{\"x\":1}\n\n"), Some("{\"x\":1}"));
    }
}
