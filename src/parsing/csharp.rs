use super::{anchored, doubled_quote_len, quoted_len, Lexer, TokenKind, TokenSequence, Tokenizer};
use once_cell::sync::Lazy;
use regex::Regex;

const KEYWORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
    "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
    "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
    "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
    "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "record", "ref", "return", "sbyte", "sealed",
    "short", "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw",
    "true", "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using",
    "virtual", "void", "volatile", "while", "yield",
    // contextual
    "add", "async", "await", "dynamic", "get", "global", "init", "nameof", "partial", "remove",
    "set", "value", "var", "when", "where",
];

static WHITESPACE: Lazy<Regex> = Lazy::new(|| anchored(r"[ \t\r\n\f]+"));
static NUMBER: Lazy<Regex> = Lazy::new(|| {
    anchored(
        r"0[xX][0-9a-fA-F_]+[uUlL]*|0[bB][01_]+[uUlL]*|(?:[0-9][0-9_]*(?:\.[0-9][0-9_]*)?|\.[0-9][0-9_]*)(?:[eE][+-]?[0-9]+)?[fFdDmMuUlL]*",
    )
});
static IDENTIFIER: Lazy<Regex> = Lazy::new(|| anchored(r"@?[A-Za-z_][A-Za-z0-9_]*"));
static STRING_PREFIX: Lazy<Regex> = Lazy::new(|| anchored(r#"\$@"|@\$"|@"|\$"|""#));

pub struct CSharpTokenizer;

impl Tokenizer for CSharpTokenizer {
    fn tokenize(&self, source: &str) -> TokenSequence {
        let mut lexer = Lexer::new(source);

        while !lexer.is_done() {
            if lexer.try_regex(&WHITESPACE, TokenKind::Whitespace) {
                continue;
            }

            let rest = lexer.rest();
            if rest.starts_with("//") {
                lexer.push_line(TokenKind::Comment);
                continue;
            }
            if rest.starts_with("/*") {
                lexer.push_until(2, "*/", TokenKind::Comment);
                continue;
            }

            if let Some(len) = string_len(rest) {
                lexer.push(TokenKind::Literal, len);
                continue;
            }
            if lexer.try_quoted('\'', Some('\\'), TokenKind::Literal) {
                continue;
            }

            if lexer.try_regex(&NUMBER, TokenKind::Literal) {
                continue;
            }

            if lexer.try_regex_with(&IDENTIFIER, |word| {
                if KEYWORDS.contains(&word) {
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

/// Length of a regular, interpolated or verbatim string at the start of `text`.
/// Verbatim strings have no escapes except a doubled quote.
fn string_len(text: &str) -> Option<usize> {
    let open_len = STRING_PREFIX.find(text)?.end();
    if !text[..open_len].contains('@') {
        return Some(quoted_len(text, open_len, '"', Some('\\')));
    }

    Some(doubled_quote_len(text, open_len, '"'))
}
