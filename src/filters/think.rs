//! Removal of the leading `<think>...</think>` section reasoning models put
//! in front of their answer.

use super::{non_empty, FragmentFilter};

const OPEN: &str = "<think>";
const CLOSE: &str = "</think>";

/// Strips leading think blocks from a complete response.
///
/// The input is returned unchanged unless, after leading whitespace, it starts
/// with a closed think block. Whitespace after each stripped block goes too.
pub fn strip_complete(input: &str) -> String {
    let mut rest = input;
    loop {
        let Some(body) = rest.trim_start().strip_prefix(OPEN) else {
            break;
        };
        let Some(close) = body.find(CLOSE) else {
            break;
        };
        rest = body[close + CLOSE.len()..].trim_start();
    }
    rest.to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Undecided. `after_block` is set once a block has been stripped, so
    /// leading whitespace is dropped instead of kept.
    Searching { after_block: bool },
    /// Inside a block; the closing marker is searched for from `search_from`.
    Thinking { search_from: usize },
    Emitting,
}

/// Streaming form of [`strip_complete`].
#[derive(Debug)]
pub struct ThinkStripper {
    phase: Phase,
    buffer: String,
}

impl ThinkStripper {
    pub fn new() -> Self {
        Self {
            phase: Phase::Searching { after_block: false },
            buffer: String::new(),
        }
    }

    fn advance(&mut self) -> Option<String> {
        loop {
            match self.phase {
                Phase::Searching { after_block } => {
                    if after_block {
                        let trimmed = self.buffer.trim_start().len();
                        self.buffer.drain(..self.buffer.len() - trimmed);
                    }

                    let trimmed = self.buffer.trim_start();
                    if trimmed.starts_with(OPEN) {
                        let open_end = self.buffer.len() - trimmed.len() + OPEN.len();
                        tracing::debug!("think block opened");
                        self.phase = Phase::Thinking {
                            search_from: open_end,
                        };
                        continue;
                    }
                    if OPEN.starts_with(trimmed) {
                        return None;
                    }

                    self.phase = Phase::Emitting;
                    return non_empty(std::mem::take(&mut self.buffer));
                }
                Phase::Thinking { search_from } => {
                    let Some(offset) = self.buffer[search_from..].find(CLOSE) else {
                        let resume = self.buffer.len().saturating_sub(CLOSE.len() - 1);
                        self.phase = Phase::Thinking {
                            search_from: floor_char_boundary(&self.buffer, resume.max(search_from)),
                        };
                        return None;
                    };

                    let end = search_from + offset + CLOSE.len();
                    tracing::debug!(stripped = end, "think block closed");
                    self.buffer.drain(..end);
                    self.phase = Phase::Searching { after_block: true };
                }
                Phase::Emitting => return non_empty(std::mem::take(&mut self.buffer)),
            }
        }
    }
}

impl Default for ThinkStripper {
    fn default() -> Self {
        Self::new()
    }
}

impl FragmentFilter for ThinkStripper {
    type Output = String;

    fn push(&mut self, fragment: &str) -> Option<String> {
        if self.phase == Phase::Emitting {
            return non_empty(fragment.to_string());
        }
        self.buffer.push_str(fragment);
        self.advance()
    }

    /// An unclosed or undecided block is emitted as-is.
    fn finish(&mut self) -> Option<String> {
        match self.phase {
            Phase::Emitting => None,
            _ => non_empty(std::mem::take(&mut self.buffer)),
        }
    }
}

/// Largest char boundary of `text` at or below `index`.
fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}
