//! Extraction of the first fenced code block from a response.

use super::{non_empty, FragmentFilter};
use once_cell::sync::Lazy;
use regex::Regex;

const FENCE: &str = "```";
const CLOSING_FENCE: &str = "\n```";

static OPENING_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```([A-Za-z0-9.+#_-]*)\n").expect("opening fence pattern"));
static BARE_OPENING_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^```[A-Za-z0-9.+#_-]*$").expect("bare fence pattern"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlockResult {
    /// Block interior, or the whole input when no block was found
    pub text: String,
    /// Language tag; empty when absent or when no block was found
    pub language: String,
}

/// Extracts the first fenced block of a complete response. Without a complete
/// block the whole input comes back with an empty language.
pub fn extract_complete(input: &str) -> CodeBlockResult {
    if let Some(caps) = OPENING_FENCE.captures(input) {
        let interior = &input[caps.get(0).map_or(0, |m| m.end())..];
        let text = if interior.starts_with(FENCE) {
            Some("")
        } else {
            interior.find(CLOSING_FENCE).map(|end| &interior[..end])
        };
        if let Some(text) = text {
            return CodeBlockResult {
                text: text.to_string(),
                language: caps[1].to_string(),
            };
        }
    }

    CodeBlockResult {
        text: input.to_string(),
        language: String::new(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    SearchingOpening,
    /// Inside the block. `at_start` holds until the interior has text that
    /// rules out an immediate closing fence.
    Open { at_start: bool },
    Closed,
}

/// Streaming form of [`extract_complete`]: emits the interior of the first
/// block as it arrives, holding back only what could still be a closing fence.
/// Every piece carries the block's language tag.
#[derive(Debug)]
pub struct CodeBlockExtractor {
    phase: Phase,
    buffer: String,
    language: String,
}

impl CodeBlockExtractor {
    pub fn new() -> Self {
        Self {
            phase: Phase::SearchingOpening,
            buffer: String::new(),
            language: String::new(),
        }
    }

    fn result(&self, text: Option<String>) -> Option<CodeBlockResult> {
        text.map(|text| CodeBlockResult {
            text,
            language: self.language.clone(),
        })
    }

    fn emit_open(&mut self) -> Option<String> {
        let Phase::Open { at_start } = self.phase else {
            return None;
        };

        if at_start {
            if self.buffer.starts_with(FENCE) {
                return self.close(0);
            }
            if FENCE.starts_with(self.buffer.as_str()) {
                return None;
            }
            self.phase = Phase::Open { at_start: false };
        }

        if let Some(end) = self.buffer.find(CLOSING_FENCE) {
            return self.close(end);
        }

        let held = partial_fence_len(&self.buffer);
        let ready = self.buffer.len() - held;
        non_empty(self.buffer.drain(..ready).collect())
    }

    fn close(&mut self, end: usize) -> Option<String> {
        tracing::debug!("code block closed");
        self.phase = Phase::Closed;
        self.buffer.truncate(end);
        non_empty(std::mem::take(&mut self.buffer))
    }
}

impl Default for CodeBlockExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FragmentFilter for CodeBlockExtractor {
    type Output = CodeBlockResult;

    fn push(&mut self, fragment: &str) -> Option<CodeBlockResult> {
        match self.phase {
            Phase::Closed => None,
            Phase::Open { .. } => {
                self.buffer.push_str(fragment);
                let text = self.emit_open();
                self.result(text)
            }
            Phase::SearchingOpening => {
                self.buffer.push_str(fragment);
                let caps = OPENING_FENCE.captures(&self.buffer)?;
                let fence_end = caps.get(0).map_or(0, |m| m.end());
                self.language = caps[1].to_string();
                tracing::debug!(language = %self.language, "code block opened");

                self.buffer.drain(..fence_end);
                self.phase = Phase::Open { at_start: true };
                let text = self.emit_open();
                self.result(text)
            }
        }
    }

    fn finish(&mut self) -> Option<CodeBlockResult> {
        let rest = std::mem::take(&mut self.buffer);
        match self.phase {
            Phase::Closed => None,
            Phase::Open { .. } => self.result(non_empty(rest)),
            Phase::SearchingOpening => {
                if BARE_OPENING_FENCE.is_match(rest.trim()) {
                    tracing::debug!("dropping unterminated opening fence");
                    return None;
                }
                self.result(non_empty(rest))
            }
        }
    }

    fn is_done(&self) -> bool {
        self.phase == Phase::Closed
    }
}

/// Length of the trailing part of `text` that could begin a closing fence.
fn partial_fence_len(text: &str) -> usize {
    (1..CLOSING_FENCE.len())
        .rev()
        .find(|&len| text.ends_with(&CLOSING_FENCE[..len]))
        .unwrap_or(0)
}
