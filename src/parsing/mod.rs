//! Lossless tokenizers for the languages the highlighter understands.
//!
//! Every tokenizer turns a source string into a [`TokenSequence`] whose texts
//! concatenate back to the input. Nothing here can fail: a position no rule
//! recognizes becomes a one-character [`TokenKind::Other`] token.

pub mod bash;
pub mod csharp;
pub mod json;
pub mod powershell;
pub mod python;
pub mod typescript;

use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Operators, punctuation and anything unrecognized
    Other,
    Keyword,
    /// Variable, function and type names (and JSON object keys)
    Identifier,
    /// Strings, numbers and other literal values
    Literal,
    Comment,
    Whitespace,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

pub type TokenSequence = Vec<Token>;

/// A language-specific tokenizer.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, source: &str) -> TokenSequence;
}

/// Cursor over a source string shared by the tokenizers.
///
/// Rules are tried by the caller in priority order; each `try_*` method either
/// consumes a prefix of the remaining input and records a token, or leaves the
/// cursor untouched and returns `false`.
pub(crate) struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    tokens: TokenSequence,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            tokens: Vec::new(),
        }
    }

    pub fn is_done(&self) -> bool {
        self.pos >= self.source.len()
    }

    pub fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    /// The character just before the cursor, if any.
    pub fn prev_char(&self) -> Option<char> {
        self.source[..self.pos].chars().next_back()
    }

    /// Records the next `len` bytes as a token of `kind`.
    pub fn push(&mut self, kind: TokenKind, len: usize) {
        let end = (self.pos + len).min(self.source.len());
        if end == self.pos {
            return;
        }
        self.tokens.push(Token::new(kind, &self.source[self.pos..end]));
        self.pos = end;
    }

    /// Matches an anchored (`^...`) regex against the remaining input.
    pub fn try_regex(&mut self, re: &Regex, kind: TokenKind) -> bool {
        match re.find(self.rest()) {
            Some(m) if m.start() == 0 && !m.is_empty() => {
                self.push(kind, m.end());
                true
            }
            _ => false,
        }
    }

    /// Like [`Lexer::try_regex`], but picks the token kind from the matched text.
    pub fn try_regex_with(&mut self, re: &Regex, classify: impl Fn(&str) -> TokenKind) -> bool {
        match re.find(self.rest()) {
            Some(m) if m.start() == 0 && !m.is_empty() => {
                let kind = classify(m.as_str());
                self.push(kind, m.end());
                true
            }
            _ => false,
        }
    }

    /// Consumes a quoted string starting at the cursor. `escape` is the escape
    /// character honored inside the string, if any. Unterminated strings run to
    /// the end of the input.
    pub fn try_quoted(&mut self, quote: char, escape: Option<char>, kind: TokenKind) -> bool {
        if !self.rest().starts_with(quote) {
            return false;
        }
        let len = quoted_len(self.rest(), quote.len_utf8(), quote, escape);
        self.push(kind, len);
        true
    }

    /// Consumes the rest of the current line (without the newline).
    pub fn push_line(&mut self, kind: TokenKind) {
        let len = self.rest().find('\n').unwrap_or(self.rest().len());
        self.push(kind, len);
    }

    /// Consumes input up to and including `terminator`, or to the end of the
    /// input when the terminator never appears. `skip` bytes at the cursor are
    /// not searched (the opening delimiter).
    pub fn push_until(&mut self, skip: usize, terminator: &str, kind: TokenKind) {
        let rest = self.rest();
        let len = rest
            .get(skip..)
            .and_then(|tail| tail.find(terminator))
            .map(|i| skip + i + terminator.len())
            .unwrap_or(rest.len());
        self.push(kind, len);
    }

    /// Fallback rule: one character of [`TokenKind::Other`].
    pub fn push_other_char(&mut self) {
        if let Some(c) = self.rest().chars().next() {
            self.push(TokenKind::Other, c.len_utf8());
        }
    }

    pub fn finish(self) -> TokenSequence {
        self.tokens
    }
}

/// Byte length of a quoted string whose body starts `open_len` bytes into
/// `text`, including the closing quote when present.
pub(crate) fn quoted_len(text: &str, open_len: usize, quote: char, escape: Option<char>) -> usize {
    let mut chars = text[open_len..].char_indices();
    while let Some((i, c)) = chars.next() {
        if Some(c) == escape {
            chars.next();
            continue;
        }
        if c == quote {
            return open_len + i + c.len_utf8();
        }
    }
    text.len()
}

/// Like [`quoted_len`], for strings that escape the quote by doubling it.
pub(crate) fn doubled_quote_len(text: &str, open_len: usize, quote: char) -> usize {
    let mut i = open_len;
    while let Some(offset) = text[i..].find(quote) {
        let end = i + offset + quote.len_utf8();
        if text[end..].starts_with(quote) {
            i = end + quote.len_utf8();
            continue;
        }
        return end;
    }
    text.len()
}

/// Builds an anchored regex from a pattern literal.
pub(crate) fn anchored(pattern: &str) -> Regex {
    Regex::new(&format!("^(?:{})", pattern)).expect("invalid tokenizer pattern")
}

/// Maps normalized language aliases to tokenizers.
#[derive(Clone, Default)]
pub struct LanguageRegistry {
    tokenizers: HashMap<String, Arc<dyn Tokenizer>>,
}

impl LanguageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in language.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(&["py", "python"], Arc::new(python::PythonTokenizer));
        registry.register(
            &["ts", "typescript", "tsx", "js", "javascript", "jsx"],
            Arc::new(typescript::TypeScriptTokenizer),
        );
        registry.register(&["cs", "csharp", "c#"], Arc::new(csharp::CSharpTokenizer));
        registry.register(&["sh", "bash", "shell", "zsh"], Arc::new(bash::BashTokenizer));
        registry.register(&["json"], Arc::new(json::JsonTokenizer));
        registry.register(
            &["ps1", "ps", "powershell", "pwsh"],
            Arc::new(powershell::PowerShellTokenizer),
        );
        registry
    }

    pub fn register(&mut self, aliases: &[&str], tokenizer: Arc<dyn Tokenizer>) {
        for alias in aliases {
            self.tokenizers.insert(normalize(alias), Arc::clone(&tokenizer));
        }
    }

    pub fn get(&self, language: &str) -> Option<&dyn Tokenizer> {
        self.tokenizers.get(&normalize(language)).map(|t| t.as_ref())
    }
}

fn normalize(language: &str) -> String {
    language.trim().to_lowercase()
}
