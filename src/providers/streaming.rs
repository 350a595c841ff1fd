use crate::error::{Error, Result};
use std::time::Duration;

/// Connection timeout for every request
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Total timeout for non-streamed completions
pub const COMPLETE_TIMEOUT: Duration = Duration::from_secs(120);

/// Maximum response size (1MB)
pub const MAX_RESPONSE_SIZE: usize = 1_048_576;

/// Text extracted from the events completed by the latest chunks.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Drained {
    pub texts: Vec<String>,
    /// `data: [DONE]` was seen
    pub done: bool,
}

/// Handles SSE stream processing with buffer management and size limits.
///
/// Bytes are buffered raw and decoded per complete event, so a multibyte
/// character split across network chunks survives.
pub struct SseProcessor {
    buffer: Vec<u8>,
    received: usize,
    max_size: usize,
}

impl SseProcessor {
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            received: 0,
            max_size: MAX_RESPONSE_SIZE,
        }
    }

    /// Append a chunk to the buffer
    pub fn push_chunk(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Process complete SSE events from the buffer.
    /// Calls the provided closure for each `data:` payload (excluding `[DONE]`)
    /// and collects the text it returns. Events that are not valid UTF-8 are
    /// skipped.
    pub fn process_events<F>(&mut self, mut handler: F) -> Result<Drained>
    where
        F: FnMut(&str) -> Result<Option<String>>,
    {
        let mut drained = Drained::default();

        while let Some((event_end, separator)) = find_event_end(&self.buffer) {
            let event: Vec<u8> = self.buffer.drain(..event_end + separator).collect();
            let Ok(event) = std::str::from_utf8(&event[..event_end]) else {
                tracing::warn!("skipping SSE event that is not valid UTF-8");
                continue;
            };

            for line in event.lines() {
                let Some(data) = line.strip_prefix("data:") else {
                    continue;
                };
                let data = data.strip_prefix(' ').unwrap_or(data);

                if data == "[DONE]" {
                    drained.done = true;
                    return Ok(drained);
                }

                if let Some(text) = handler(data)? {
                    self.received += text.len();

                    // Check size limit
                    if self.received > self.max_size {
                        return Err(Error::ResponseTooLarge(self.max_size));
                    }
                    drained.texts.push(text);
                }
            }
        }
        Ok(drained)
    }
}

impl Default for SseProcessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Position and length of the first blank-line separator (`\n\n` or
/// `\r\n\r\n`).
fn find_event_end(buffer: &[u8]) -> Option<(usize, usize)> {
    let lf = find(buffer, b"\n\n").map(|i| (i, 2));
    let crlf = find(buffer, b"\r\n\r\n").map(|i| (i, 4));
    match (lf, crlf) {
        (Some(a), Some(b)) => Some(if b.0 < a.0 { b } else { a }),
        (a, b) => a.or(b),
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Create a reqwest client with default timeout
pub fn create_client() -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_process_single_event() {
        let mut processor = SseProcessor::new();
        processor.push_chunk(b"data: {\"text\": \"hello\"}\n\n");

        let mut received = Vec::new();
        let drained = processor
            .process_events(|data| {
                received.push(data.to_string());
                Ok(Some("hello".to_string()))
            })
            .unwrap();

        assert_eq!(received, vec!["{\"text\": \"hello\"}"]);
        assert_eq!(drained.texts, vec!["hello"]);
        assert!(!drained.done);
    }

    #[test]
    fn test_process_multiple_events() {
        let mut processor = SseProcessor::new();
        processor.push_chunk(b"data: first\n\ndata: second\n\n");

        let drained = processor
            .process_events(|data| Ok(Some(data.to_string())))
            .unwrap();

        assert_eq!(drained.texts, vec!["first", "second"]);
    }

    #[test]
    fn test_done_ends_processing() {
        let mut processor = SseProcessor::new();
        processor.push_chunk(b"data: hello\n\ndata: [DONE]\n\ndata: late\n\n");

        let mut count = 0;
        let drained = processor
            .process_events(|_| {
                count += 1;
                Ok(Some("x".to_string()))
            })
            .unwrap();

        assert_eq!(count, 1);
        assert!(drained.done);
    }

    #[test]
    fn test_incomplete_event_buffered() {
        let mut processor = SseProcessor::new();
        processor.push_chunk(b"data: partial");

        let mut count = 0;
        processor
            .process_events(|_| {
                count += 1;
                Ok(None)
            })
            .unwrap();

        assert_eq!(count, 0); // Not processed yet

        processor.push_chunk(b"\n\n");
        processor
            .process_events(|_| {
                count += 1;
                Ok(None)
            })
            .unwrap();

        assert_eq!(count, 1); // Now processed
    }

    #[test]
    fn test_multibyte_character_split_across_chunks() {
        let event = "data: héllo\n\n".as_bytes();
        let split = event.iter().position(|&b| b >= 0x80).unwrap() + 1;

        let mut processor = SseProcessor::new();
        processor.push_chunk(&event[..split]);
        let first = processor
            .process_events(|data| Ok(Some(data.to_string())))
            .unwrap();
        assert!(first.texts.is_empty());

        processor.push_chunk(&event[split..]);
        let second = processor
            .process_events(|data| Ok(Some(data.to_string())))
            .unwrap();
        assert_eq!(second.texts, vec!["héllo"]);
    }

    #[test]
    fn test_crlf_separated_events() {
        let mut processor = SseProcessor::new();
        processor.push_chunk(b"data: a\r\n\r\ndata:b\r\n\r\n");

        let drained = processor
            .process_events(|data| Ok(Some(data.to_string())))
            .unwrap();

        assert_eq!(drained.texts, vec!["a", "b"]);
    }

    #[test]
    fn test_non_data_lines_are_ignored() {
        let mut processor = SseProcessor::new();
        processor.push_chunk(b": keep-alive\n\nevent: message\ndata: x\n\n");

        let drained = processor
            .process_events(|data| Ok(Some(data.to_string())))
            .unwrap();

        assert_eq!(drained.texts, vec!["x"]);
    }

    #[test]
    fn test_invalid_utf8_event_is_skipped() {
        let mut processor = SseProcessor::new();
        processor.push_chunk(b"data: \xff\xfe\n\ndata: ok\n\n");

        let drained = processor
            .process_events(|data| Ok(Some(data.to_string())))
            .unwrap();

        assert_eq!(drained.texts, vec!["ok"]);
    }

    #[test]
    fn test_size_limit_exceeded() {
        let mut processor = SseProcessor::new();
        processor.max_size = 10; // Small limit for testing

        processor.push_chunk(b"data: test\n\n");
        let result = processor.process_events(|_| Ok(Some("this is too long".to_string())));

        assert!(matches!(result, Err(Error::ResponseTooLarge(10))));
    }

    #[test]
    fn test_handler_error_propagates() {
        let mut processor = SseProcessor::new();
        processor.push_chunk(b"data: test\n\n");

        let result =
            processor.process_events(|_| Err(Error::InvalidResponse("parse error".to_string())));

        assert!(matches!(result, Err(Error::InvalidResponse(msg)) if msg == "parse error"));
    }
}
