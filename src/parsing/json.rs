use super::{anchored, quoted_len, Lexer, TokenKind, TokenSequence, Tokenizer};
use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| anchored(r"[ \t\r\n]+"));
static NUMBER: Lazy<Regex> =
    Lazy::new(|| anchored(r"-?(?:0|[1-9][0-9]*)(?:\.[0-9]+)?(?:[eE][+-]?[0-9]+)?"));
static IDENTIFIER: Lazy<Regex> = Lazy::new(|| anchored(r"[A-Za-z_$][A-Za-z0-9_$]*"));

pub struct JsonTokenizer;

impl Tokenizer for JsonTokenizer {
    fn tokenize(&self, source: &str) -> TokenSequence {
        let mut lexer = Lexer::new(source);

        while !lexer.is_done() {
            if lexer.try_regex(&WHITESPACE, TokenKind::Whitespace) {
                continue;
            }

            let rest = lexer.rest();
            if rest.starts_with('"') {
                let len = quoted_len(rest, 1, '"', Some('\\'));
                // Strings followed by a colon are object keys.
                let kind = if rest[len..].trim_start().starts_with(':') {
                    TokenKind::Identifier
                } else {
                    TokenKind::Literal
                };
                lexer.push(kind, len);
                continue;
            }

            if lexer.try_regex(&NUMBER, TokenKind::Literal) {
                continue;
            }

            if lexer.try_regex_with(&IDENTIFIER, |word| match word {
                "true" | "false" | "null" => TokenKind::Keyword,
                _ => TokenKind::Identifier,
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
    use crate::parsing::Token;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_object_keys_are_identifiers() {
        let tokens = tokens_of(&JsonTokenizer, "{\"name\": \"John\", \"age\" : 30}");
        assert_eq!(kinds_of(&tokens, TokenKind::Identifier), vec!["\"name\"", "\"age\""]);
        assert_eq!(kinds_of(&tokens, TokenKind::Literal), vec!["\"John\"", "30"]);
    }

    #[test]
    fn test_key_lookahead_spans_newlines() {
        let tokens = tokens_of(&JsonTokenizer, "{\"key\"\n  : 1}");
        assert_eq!(kinds_of(&tokens, TokenKind::Identifier), vec!["\"key\""]);
    }

    #[test]
    fn test_keywords() {
        let tokens = tokens_of(&JsonTokenizer, "[true, false, null]");
        assert_eq!(kinds_of(&tokens, TokenKind::Keyword), vec!["true", "false", "null"]);
    }

    #[test]
    fn test_numbers() {
        let tokens = tokens_of(&JsonTokenizer, "[-1, 0.5, 1e10, 2.5E-3]");
        assert_eq!(
            kinds_of(&tokens, TokenKind::Literal),
            vec!["-1", "0.5", "1e10", "2.5E-3"]
        );
    }

    #[test]
    fn test_escaped_quotes_inside_strings() {
        let tokens = tokens_of(&JsonTokenizer, r#"{"q": "say \"hi\""}"#);
        assert_eq!(kinds_of(&tokens, TokenKind::Literal), vec![r#""say \"hi\"""#]);
    }

    #[test]
    fn test_punctuation_is_other() {
        let tokens = tokens_of(&JsonTokenizer, "{}");
        assert_eq!(
            tokens,
            vec![Token::new(TokenKind::Other, "{"), Token::new(TokenKind::Other, "}")]
        );
    }

    #[test]
    fn test_unterminated_string() {
        let tokens = tokens_of(&JsonTokenizer, "{\"open");
        assert_eq!(kinds_of(&tokens, TokenKind::Literal), vec!["\"open"]);
    }
}
