use super::{anchored, doubled_quote_len, Lexer, TokenKind, TokenSequence, Tokenizer};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Language keywords and the common cmdlets, all lowercase; matching is
/// case-insensitive.
const KEYWORDS: &[&str] = &[
    "if", "else", "elseif", "switch", "foreach", "for", "while", "do", "until", "break",
    "continue", "return", "exit", "throw", "try", "catch", "finally", "trap", "function",
    "filter", "param", "begin", "process", "end", "class", "enum", "using", "namespace",
    "global", "local", "private", "script", "static", "hidden",
    // cmdlets
    "get-process", "get-childitem", "get-content", "set-content", "add-content",
    "set-location", "get-location", "write-host", "write-output", "write-error",
    "write-warning", "write-verbose", "write-debug", "read-host", "select-object",
    "where-object", "foreach-object", "sort-object", "group-object", "measure-object",
    "compare-object", "out-file", "out-string", "out-null", "invoke-expression",
    "invoke-command", "invoke-webrequest", "invoke-restmethod", "start-process",
    "stop-process", "get-service", "start-service", "stop-service", "restart-service",
    "new-object", "new-item", "remove-item", "copy-item", "move-item", "rename-item",
    "test-path", "join-path", "split-path", "resolve-path", "push-location", "pop-location",
    "import-module", "export-modulemember", "get-module", "remove-module", "get-command",
    "get-help", "get-member", "convertto-json", "convertfrom-json",
];

static KEYWORD_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| KEYWORDS.iter().copied().collect());

static WHITESPACE: Lazy<Regex> = Lazy::new(|| anchored(r"[ \t\r\n]+"));
static CONSTANT: Lazy<Regex> = Lazy::new(|| anchored(r"(?i)\$(?:true|false|null)\b"));
static VARIABLE: Lazy<Regex> = Lazy::new(|| {
    anchored(
        r"(?i)\$(?:\{[^}]*\}?|(?:env|global|local|script|private|using|variable):[A-Za-z_][A-Za-z0-9_]*|[A-Za-z_][A-Za-z0-9_]*|[0-9]+|[$?^_])",
    )
});
static NUMBER: Lazy<Regex> = Lazy::new(|| {
    anchored(r"(?i)0x[0-9a-f]+l?|(?:[0-9]+(?:\.[0-9]+)?|\.[0-9]+)(?:e[+-]?[0-9]+)?(?:kb|mb|gb|tb|pb|[ldfm])?")
});
static OPERATOR: Lazy<Regex> = Lazy::new(|| {
    anchored(
        r"(?i)-(?:c|i)?(?:eq|ne|lt|le|gt|ge|like|notlike|match|notmatch|contains|notcontains|in|notin|replace|split)\b|-(?:join|and|or|not|xor|band|bor|bnot|bxor|shl|shr|is|isnot|as|f)\b|\+\+|--|\+=|-=|\*=|/=|%=|==|!=|<=|>=|&&|\|\||>>",
    )
});
static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| anchored(r"[A-Za-z_][A-Za-z0-9_]*(?:-[A-Za-z_][A-Za-z0-9_]*)*"));

pub struct PowerShellTokenizer;

impl Tokenizer for PowerShellTokenizer {
    fn tokenize(&self, source: &str) -> TokenSequence {
        let mut lexer = Lexer::new(source);

        while !lexer.is_done() {
            if lexer.try_regex(&WHITESPACE, TokenKind::Whitespace) {
                continue;
            }

            let rest = lexer.rest();
            if rest.starts_with("<#") {
                lexer.push_until(2, "#>", TokenKind::Comment);
                continue;
            }
            if rest.starts_with('#') {
                lexer.push_line(TokenKind::Comment);
                continue;
            }

            if rest.starts_with("@\"") {
                lexer.push_until(2, "\"@", TokenKind::Literal);
                continue;
            }
            if rest.starts_with("@'") {
                lexer.push_until(2, "'@", TokenKind::Literal);
                continue;
            }
            if rest.starts_with('\'') {
                lexer.push(TokenKind::Literal, doubled_quote_len(rest, 1, '\''));
                continue;
            }
            if lexer.try_quoted('"', Some('`'), TokenKind::Literal) {
                continue;
            }

            if lexer.try_regex(&CONSTANT, TokenKind::Literal)
                || lexer.try_regex(&VARIABLE, TokenKind::Identifier)
            {
                continue;
            }

            if lexer.try_regex(&NUMBER, TokenKind::Literal) {
                continue;
            }

            if lexer.try_regex(&OPERATOR, TokenKind::Other) {
                continue;
            }

            if lexer.try_regex_with(&IDENTIFIER, |word| {
                if KEYWORD_SET.contains(word.to_ascii_lowercase().as_str()) {
                    TokenKind::Keyword
                } else {
                    TokenKind::Identifier
                }
            }) {
                continue;
            }

            lexer.push_other_char();
        }

        lexer.finish()
    }
}
