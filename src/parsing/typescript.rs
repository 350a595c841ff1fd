use super::{anchored, Lexer, TokenKind, TokenSequence, Tokenizer};
use once_cell::sync::Lazy;
use regex::Regex;

/// TypeScript keywords; a superset of the JavaScript ones.
const KEYWORDS: &[&str] = &[
    "abstract", "any", "as", "async", "await", "boolean", "break", "case", "catch", "class",
    "const", "constructor", "continue", "debugger", "declare", "default", "delete", "do",
    "else", "enum", "export", "extends", "false", "finally", "for", "from", "function", "get",
    "if", "implements", "import", "in", "instanceof", "interface", "is", "keyof", "let",
    "module", "namespace", "never", "new", "null", "number", "object", "of", "package",
    "private", "protected", "public", "readonly", "require", "return", "set", "static",
    "string", "super", "switch", "symbol", "this", "throw", "true", "try", "type", "typeof",
    "undefined", "unique", "unknown", "var", "void", "while", "with", "yield",
];

static WHITESPACE: Lazy<Regex> = Lazy::new(|| anchored(r"[ \t\r\n\f]+"));
static NUMBER: Lazy<Regex> = Lazy::new(|| {
    anchored(
        r"0[xX][0-9a-fA-F_]+n?|0[oO][0-7_]+n?|0[bB][01_]+n?|(?:[0-9][0-9_]*(?:\.[0-9_]*)?|\.[0-9][0-9_]*)(?:[eE][+-]?[0-9_]+)?n?",
    )
});
static IDENTIFIER: Lazy<Regex> = Lazy::new(|| anchored(r"[A-Za-z_$][A-Za-z0-9_$]*"));

pub struct TypeScriptTokenizer;

impl Tokenizer for TypeScriptTokenizer {
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

            if lexer.try_quoted('`', Some('\\'), TokenKind::Literal)
                || lexer.try_quoted('"', Some('\\'), TokenKind::Literal)
                || lexer.try_quoted('\'', Some('\\'), TokenKind::Literal)
            {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::test_support::{kinds_of, tokens_of};

    #[test]
    fn test_declaration() {
        let tokens = tokens_of(
            &TypeScriptTokenizer,
            "const greeting: string = 'Hello';\nconsole.log(greeting);",
        );
        assert_eq!(kinds_of(&tokens, TokenKind::Keyword), vec!["const", "string"]);
        assert_eq!(
            kinds_of(&tokens, TokenKind::Identifier),
            vec!["greeting", "console", "log", "greeting"]
        );
        assert_eq!(kinds_of(&tokens, TokenKind::Literal), vec!["'Hello'"]);
    }

    #[test]
    fn test_comments() {
        let tokens = tokens_of(&TypeScriptTokenizer, "a // line\n/* block\n */ b");
        assert_eq!(
            kinds_of(&tokens, TokenKind::Comment),
            vec!["// line", "/* block\n */"]
        );
    }

    #[test]
    fn test_template_literal_with_escape() {
        let tokens = tokens_of(&TypeScriptTokenizer, "`a \\` ${b}\nc` + x");
        assert_eq!(kinds_of(&tokens, TokenKind::Literal), vec!["`a \\` ${b}\nc`"]);
    }

    #[test]
    fn test_numbers() {
        let tokens = tokens_of(&TypeScriptTokenizer, "0xff 0o7 0b11 1_000n 6.02e23");
        assert_eq!(
            kinds_of(&tokens, TokenKind::Literal),
            vec!["0xff", "0o7", "0b11", "1_000n", "6.02e23"]
        );
    }

    #[test]
    fn test_dollar_identifiers() {
        let tokens = tokens_of(&TypeScriptTokenizer, "$el = _private$");
        assert_eq!(kinds_of(&tokens, TokenKind::Identifier), vec!["$el", "_private$"]);
    }

    #[test]
    fn test_operators_are_other() {
        let tokens = tokens_of(&TypeScriptTokenizer, "a=>b");
        assert_eq!(kinds_of(&tokens, TokenKind::Other), vec!["=", ">"]);
    }

    #[test]
    fn test_unterminated_block_comment() {
        let tokens = tokens_of(&TypeScriptTokenizer, "x /* never closed");
        assert_eq!(kinds_of(&tokens, TokenKind::Comment), vec!["/* never closed"]);
    }
}
