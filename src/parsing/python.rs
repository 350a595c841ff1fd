use super::{anchored, quoted_len, Lexer, TokenKind, TokenSequence, Tokenizer};
use once_cell::sync::Lazy;
use regex::Regex;

const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

static WHITESPACE: Lazy<Regex> = Lazy::new(|| anchored(r"[ \t\r\n\f]+"));
static STRING_PREFIX: Lazy<Regex> = Lazy::new(|| anchored(r#"(?i:rb|br|fr|rf|r|b|u|f)?(?:"""|'''|"|')"#));
static NUMBER: Lazy<Regex> = Lazy::new(|| {
    anchored(
        r"0[xX][0-9a-fA-F_]+|0[oO][0-7_]+|0[bB][01_]+|(?:[0-9][0-9_]*(?:\.[0-9_]*)?|\.[0-9][0-9_]*)(?:[eE][+-]?[0-9_]+)?[jJ]?",
    )
});
static IDENTIFIER: Lazy<Regex> = Lazy::new(|| anchored(r"[A-Za-z_][A-Za-z0-9_]*"));

pub struct PythonTokenizer;

impl Tokenizer for PythonTokenizer {
    fn tokenize(&self, source: &str) -> TokenSequence {
        let mut lexer = Lexer::new(source);

        while !lexer.is_done() {
            if lexer.try_regex(&WHITESPACE, TokenKind::Whitespace) {
                continue;
            }

            if lexer.rest().starts_with('#') {
                lexer.push_line(TokenKind::Comment);
                continue;
            }

            if let Some(len) = string_len(lexer.rest()) {
                lexer.push(TokenKind::Literal, len);
                continue;
            }

            if lexer.try_regex(&NUMBER, TokenKind::Literal) {
                continue;
            }

            if lexer.try_regex_with(&IDENTIFIER, classify_word) {
                continue;
            }

            lexer.push_other_char();
        }

        lexer.finish()
    }
}

fn classify_word(word: &str) -> TokenKind {
    if KEYWORDS.contains(&word) {
        TokenKind::Keyword
    } else {
        TokenKind::Identifier
    }
}

/// Length of a (possibly prefixed, possibly triple-quoted) string literal at
/// the start of `text`.
fn string_len(text: &str) -> Option<usize> {
    let open_len = STRING_PREFIX.find(text)?.end();
    let delimiter = text[..open_len].trim_start_matches(|c: char| c.is_ascii_alphabetic());

    if delimiter.len() == 3 {
        let mut chars = text[open_len..].char_indices();
        while let Some((i, c)) = chars.next() {
            if c == '\\' {
                chars.next();
                continue;
            }
            if text[open_len + i..].starts_with(delimiter) {
                return Some(open_len + i + delimiter.len());
            }
        }
        return Some(text.len());
    }

    let quote = delimiter.chars().next()?;
    Some(quoted_len(text, open_len, quote, Some('\\')))
}
