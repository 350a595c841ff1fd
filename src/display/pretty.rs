//! Line-oriented Markdown renderer for streamed model output.
//!
//! Text may arrive in arbitrary pieces; only complete lines are rendered, so
//! the output for any chunking is the same as for the whole text at once.

use super::palette::{Palette, BOLD, ITALIC, RESET};
use super::SyntaxHighlighter;
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::{self, Write};

const RULE_WIDTH: usize = 20;

static FENCE_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*```").expect("fence pattern"));
static FENCE_CLOSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*```\s*$").expect("fence close pattern"));
static FENCE_LANGUAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*```\s*([\w+#.-]+)").expect("fence language pattern"));
static HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(#{1,6}\s+)(.*)$").expect("heading pattern"));
static HORIZONTAL_RULE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:(?:-\s*){3,}|(?:\*\s*){3,}|(?:_\s*){3,})$").expect("rule pattern")
});
static BLOCK_QUOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*)((?:>\s*)+)(.*)$").expect("quote pattern"));
static NUMBERED_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*)(\d+[.)])\s+(.*)$").expect("numbered item pattern"));
static BULLET_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*)([-*+])\s+(.*)$").expect("bullet item pattern"));
static INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`[^`\n]+`").expect("code span pattern"));
static EMPHASIS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\*\*\*([^*]+)\*\*\*|\*\*([^*]+)\*\*|__([^_]+)__|\*([^*]+)\*|_([^_]+)_")
        .expect("emphasis pattern")
});

#[derive(Debug, Clone, PartialEq, Eq)]
enum BlockState {
    Normal,
    InCodeBlock { language: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpanStyle {
    Code,
    Italic,
    Bold,
    BoldItalic,
}

/// An inline span: `start..end` is the whole match, `inner` the text between
/// its delimiters.
#[derive(Debug)]
struct Span<'a> {
    start: usize,
    end: usize,
    inner: &'a str,
    style: SpanStyle,
}

pub struct PrettyPrinter<W: Write> {
    out: W,
    palette: Palette,
    highlighter: SyntaxHighlighter,
    line_buffer: String,
    state: BlockState,
}

impl<W: Write> PrettyPrinter<W> {
    pub fn new(out: W, palette: Palette) -> Self {
        Self::with_highlighter(out, palette, SyntaxHighlighter::new(palette))
    }

    pub fn with_highlighter(out: W, palette: Palette, highlighter: SyntaxHighlighter) -> Self {
        Self {
            out,
            palette,
            highlighter,
            line_buffer: String::new(),
            state: BlockState::Normal,
        }
    }

    /// Renders every line completed by `text`; the remainder stays buffered.
    pub fn print(&mut self, text: &str) -> io::Result<()> {
        self.line_buffer.push_str(text);

        while let Some(newline) = self.line_buffer.find('\n') {
            let line: String = self.line_buffer.drain(..=newline).collect();
            let rendered = self.render_line(&line[..newline]);
            self.out.write_all(rendered.as_bytes())?;
            self.out.write_all(b"\n")?;
        }
        self.out.flush()
    }

    /// Renders a pending partial line, followed by a newline.
    pub fn flush(&mut self) -> io::Result<()> {
        if !self.line_buffer.is_empty() {
            let line = std::mem::take(&mut self.line_buffer);
            let rendered = self.render_line(&line);
            self.out.write_all(rendered.as_bytes())?;
            self.out.write_all(b"\n")?;
        }
        self.out.flush()
    }

    /// Renders any pending partial line, then leaves the terminal in its
    /// default colors.
    pub fn close(&mut self) -> io::Result<()> {
        self.flush()?;
        self.out.write_all(RESET.as_bytes())?;
        self.out.flush()
    }

    fn render_line(&mut self, line: &str) -> String {
        debug_assert!(!line.contains('\n'));
        let line = line.replace('\r', "");

        match &self.state {
            BlockState::Normal => {
                if FENCE_OPEN.is_match(&line) {
                    let language = FENCE_LANGUAGE
                        .captures(&line)
                        .map(|caps| caps[1].to_lowercase())
                        .unwrap_or_default();
                    tracing::trace!(%language, "entering code block");
                    self.state = BlockState::InCodeBlock { language };
                    return self.paint(self.palette.code_block, &line);
                }
                self.render_markdown(&line)
            }
            BlockState::InCodeBlock { language } => {
                if FENCE_CLOSE.is_match(&line) {
                    self.state = BlockState::Normal;
                    return self.paint(self.palette.code_block, &line);
                }
                if self.highlighter.supports(language) {
                    self.highlighter.highlight(&line, language)
                } else {
                    self.paint(self.palette.code_block, &line)
                }
            }
        }
    }

    fn render_markdown(&self, line: &str) -> String {
        let palette = &self.palette;

        if let Some(caps) = HEADING.captures(line) {
            return format!(
                "{}{}",
                self.paint(palette.heading, &caps[1]),
                self.format_inline(&caps[2], palette.heading)
            );
        }

        if HORIZONTAL_RULE.is_match(line) {
            return self.paint(palette.horizontal_rule, &"─".repeat(RULE_WIDTH));
        }

        if let Some(caps) = BLOCK_QUOTE.captures(line) {
            return format!(
                "{}{}{}",
                &caps[1],
                self.paint(palette.block_quote, &caps[2]),
                self.format_inline(&caps[3], palette.text)
            );
        }

        if let Some(caps) = NUMBERED_ITEM
            .captures(line)
            .or_else(|| BULLET_ITEM.captures(line))
        {
            return format!(
                "{}{} {}",
                &caps[1],
                self.paint(palette.list_marker, &caps[2]),
                self.format_inline(&caps[3], palette.text)
            );
        }

        self.format_inline(line, palette.text)
    }

    /// Renders code spans and emphasis in `text`, using `base` for the rest.
    fn format_inline(&self, text: &str, base: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let mut out = String::with_capacity(text.len() * 2);
        let mut last = 0;
        for span in inline_spans(text) {
            if span.start < last {
                continue;
            }
            if span.start > last {
                out.push_str(base);
                out.push_str(&text[last..span.start]);
            }

            match span.style {
                SpanStyle::Code => out.push_str(self.palette.inline_code),
                style => {
                    out.push_str(self.palette.emphasis);
                    if self.palette.bold_supported {
                        if matches!(style, SpanStyle::Bold | SpanStyle::BoldItalic) {
                            out.push_str(BOLD);
                        }
                        if matches!(style, SpanStyle::Italic | SpanStyle::BoldItalic) {
                            out.push_str(ITALIC);
                        }
                    }
                }
            }
            out.push_str(span.inner);
            out.push_str(RESET);
            last = span.end;
        }

        if last < text.len() {
            out.push_str(base);
            out.push_str(&text[last..]);
        }
        out.push_str(RESET);
        out
    }

    fn paint(&self, color: &str, text: &str) -> String {
        format!("{color}{text}{RESET}")
    }
}

/// Code and emphasis spans in `text`, ordered by position. Overlapping spans
/// are left in; the renderer skips any that start inside an earlier one.
fn inline_spans(text: &str) -> Vec<Span<'_>> {
    let mut spans: Vec<Span> = INLINE_CODE
        .find_iter(text)
        .map(|m| Span {
            start: m.start(),
            end: m.end(),
            inner: &text[m.start() + 1..m.end() - 1],
            style: SpanStyle::Code,
        })
        .collect();

    for caps in EMPHASIS.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        let (group, style) = match (1..=5).find_map(|i| caps.get(i).map(|m| (i, m))) {
            Some((1, m)) => (m, SpanStyle::BoldItalic),
            Some((2 | 3, m)) => (m, SpanStyle::Bold),
            Some((_, m)) => (m, SpanStyle::Italic),
            None => continue,
        };

        let underscored = whole.as_str().starts_with('_');
        if underscored && touches_word(text, whole.start(), whole.end()) {
            continue;
        }

        spans.push(Span {
            start: whole.start(),
            end: whole.end(),
            inner: group.as_str(),
            style,
        });
    }

    // Code spans win ties.
    spans.sort_by_key(|span| (span.start, span.style != SpanStyle::Code));
    spans
}

fn touches_word(text: &str, start: usize, end: usize) -> bool {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    text[..start].chars().next_back().is_some_and(is_word)
        || text[end..].chars().next().is_some_and(is_word)
}
