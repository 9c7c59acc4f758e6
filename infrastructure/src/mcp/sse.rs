//! Server-sent events decoding.
//!
//! Reads a `reqwest::Response` as a byte stream, splits it on blank-line
//! event boundaries and yields one [`SseEvent`] per complete event.

use super::error::{McpError, Result};
use futures::stream::{self, Stream, StreamExt};

/// One decoded event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// `event:` field, `"message"` when absent
    pub event: String,
    /// `data:` lines joined with `\n`
    pub data: String,
    pub id: Option<String>,
}

/// Incremental decoder; feed it bytes as they arrive.
///
/// Works on bytes so a multi-byte character split across chunks is only
/// decoded once the whole event has arrived.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    /// Bytes before this offset hold no boundary start
    scan_from: usize,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every event it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some((end, separator)) = find_boundary(&self.buffer, self.scan_from) {
            let block: Vec<u8> = self.buffer.drain(..end + separator).take(end).collect();
            self.scan_from = 0;
            if let Some(event) = parse_block(&String::from_utf8_lossy(&block)) {
                events.push(event);
            }
        }
        // A boundary is at most 4 bytes, so only the tail can still complete one.
        self.scan_from = self.buffer.len().saturating_sub(3);
        events
    }

    /// Flush a trailing event the server did not terminate with a blank line.
    pub fn finish(&mut self) -> Option<SseEvent> {
        let rest = std::mem::take(&mut self.buffer);
        self.scan_from = 0;
        let text = String::from_utf8_lossy(&rest);
        if text.trim().is_empty() {
            return None;
        }
        parse_block(&text)
    }
}

fn find_boundary(buffer: &[u8], from: usize) -> Option<(usize, usize)> {
    (from..buffer.len()).find_map(|i| {
        let rest = &buffer[i..];
        if rest.starts_with(b"\r\n\r\n") {
            Some((i, 4))
        } else if rest.starts_with(b"\n\n") || rest.starts_with(b"\r\r") {
            Some((i, 2))
        } else {
            None
        }
    })
}

/// Parse one event block. Blocks with only comments yield `None`.
fn parse_block(block: &str) -> Option<SseEvent> {
    let mut event = None;
    let mut data: Vec<&str> = Vec::new();
    let mut id = None;

    for line in block.lines() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() || line.starts_with(':') {
            continue;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => event = Some(value.to_string()),
            "data" => data.push(value),
            "id" => id = Some(value.to_string()),
            _ => {}
        }
    }

    if event.is_none() && data.is_empty() {
        return None;
    }

    Some(SseEvent {
        event: event.unwrap_or_else(|| "message".to_string()),
        data: data.join("\n"),
        id,
    })
}

/// Turn a streaming HTTP response into a stream of events.
///
/// The stream ends when the server closes the body.
pub fn event_stream(response: reqwest::Response) -> impl Stream<Item = Result<SseEvent>> + Send {
    let byte_stream = response.bytes_stream();

    stream::unfold(
        (byte_stream, SseDecoder::new(), std::collections::VecDeque::new(), false),
        |(mut byte_stream, mut decoder, mut ready, mut ended)| async move {
            loop {
                if let Some(event) = ready.pop_front() {
                    return Some((Ok(event), (byte_stream, decoder, ready, ended)));
                }
                if ended {
                    return None;
                }

                match byte_stream.next().await {
                    Some(Ok(bytes)) => ready.extend(decoder.push(&bytes)),
                    Some(Err(e)) => {
                        ended = true;
                        return Some((
                            Err(McpError::Http(format!("event stream read error: {e}"))),
                            (byte_stream, decoder, ready, ended),
                        ));
                    }
                    None => {
                        ended = true;
                        ready.extend(decoder.finish());
                    }
                }
            }
        },
    )
}
