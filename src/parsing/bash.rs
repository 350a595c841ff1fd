use super::{anchored, quoted_len, Lexer, TokenKind, TokenSequence, Tokenizer};
use once_cell::sync::Lazy;
use regex::Regex;

/// Reserved words plus the builtins worth calling out.
const KEYWORDS: &[&str] = &[
    "if", "then", "else", "elif", "fi", "case", "esac", "for", "select", "while", "until",
    "do", "done", "in", "function", "time", "declare", "local", "readonly", "export", "alias",
    "unalias", "source", "let", "return", "exit", "exec", "set", "unset", "trap", "break",
    "continue", "eval", "cd", "pwd", "echo", "printf", "read", "shift", "test",
];

static WHITESPACE: Lazy<Regex> = Lazy::new(|| anchored(r"[ \t\r\n]+"));
static HEREDOC: Lazy<Regex> = Lazy::new(|| {
    anchored(r#"<<(-?)[ \t]*(?:'([A-Za-z_][A-Za-z0-9_]*)'|"([A-Za-z_][A-Za-z0-9_]*)"|([A-Za-z_][A-Za-z0-9_]*))"#)
});
static VARIABLE: Lazy<Regex> =
    Lazy::new(|| anchored(r"\$(?:\{[^}]*\}?|[A-Za-z_][A-Za-z0-9_]*|[0-9]|[#?$!@*-])"));
static NUMBER: Lazy<Regex> = Lazy::new(|| anchored(r"[0-9]+(?:\.[0-9]+)?"));
static OPERATOR: Lazy<Regex> = Lazy::new(|| anchored(r"&&|\|\||;;|>>|<<<|<<|&>|\|&|[<>]\("));
static IDENTIFIER: Lazy<Regex> = Lazy::new(|| anchored(r"[A-Za-z_][A-Za-z0-9_]*"));

pub struct BashTokenizer;

impl Tokenizer for BashTokenizer {
    fn tokenize(&self, source: &str) -> TokenSequence {
        let mut lexer = Lexer::new(source);

        while !lexer.is_done() {
            if lexer.try_regex(&WHITESPACE, TokenKind::Whitespace) {
                continue;
            }

            let rest = lexer.rest();
            if rest.starts_with('#') && starts_word(lexer.prev_char()) {
                lexer.push_line(TokenKind::Comment);
                continue;
            }

            if let Some(len) = heredoc_len(rest) {
                lexer.push(TokenKind::Literal, len);
                continue;
            }

            if rest.starts_with("$'") {
                let len = quoted_len(rest, 2, '\'', Some('\\'));
                lexer.push(TokenKind::Literal, len);
                continue;
            }
            if lexer.try_quoted('"', Some('\\'), TokenKind::Literal)
                || lexer.try_quoted('\'', None, TokenKind::Literal)
                || lexer.try_quoted('`', Some('\\'), TokenKind::Literal)
            {
                continue;
            }

            if lexer.try_regex(&VARIABLE, TokenKind::Identifier) {
                continue;
            }

            if lexer.try_regex(&NUMBER, TokenKind::Literal) {
                continue;
            }

            if lexer.try_regex(&OPERATOR, TokenKind::Other) {
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

/// `#` only opens a comment at the start of a word.
fn starts_word(prev: Option<char>) -> bool {
    match prev {
        None => true,
        Some(c) => c.is_whitespace() || matches!(c, ';' | '&' | '|' | '(' | ')'),
    }
}

/// Length of a here-document starting at `text`, through its terminator line.
fn heredoc_len(text: &str) -> Option<usize> {
    let caps = HEREDOC.captures(text)?;
    let strip_tabs = !caps[1].is_empty();
    let word = caps
        .get(2)
        .or_else(|| caps.get(3))
        .or_else(|| caps.get(4))?
        .as_str();

    let Some(body_start) = text.find('\n').map(|i| i + 1) else {
        return Some(text.len());
    };

    let mut line_start = body_start;
    while line_start < text.len() {
        let line_end = text[line_start..]
            .find('\n')
            .map(|i| line_start + i)
            .unwrap_or(text.len());
        let line = &text[line_start..line_end];
        let line = if strip_tabs { line.trim_start_matches('\t') } else { line };
        if line == word {
            return Some(line_end);
        }
        line_start = line_end + 1;
    }
    Some(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::test_support::{kinds_of, tokens_of};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_simple_command() {
        let tokens = tokens_of(&BashTokenizer, "echo \"Hello, $USER\" > out.txt");
        assert_eq!(kinds_of(&tokens, TokenKind::Keyword), vec!["echo"]);
        assert_eq!(kinds_of(&tokens, TokenKind::Literal), vec!["\"Hello, $USER\""]);
        assert_eq!(kinds_of(&tokens, TokenKind::Identifier), vec!["out", "txt"]);
    }

    #[test]
    fn test_variables_are_single_identifiers() {
        let tokens = tokens_of(&BashTokenizer, "cp $1 ${TARGET_DIR} && echo $? $#");
        assert_eq!(
            kinds_of(&tokens, TokenKind::Identifier),
            vec!["cp", "$1", "${TARGET_DIR}", "$?", "$#"]
        );
        assert_eq!(kinds_of(&tokens, TokenKind::Other), vec!["&&"]);
        assert!(kinds_of(&tokens, TokenKind::Comment).is_empty());
    }

    #[test]
    fn test_comments_only_at_word_start() {
        let tokens = tokens_of(&BashTokenizer, "x=a#b # trailing\n# full line");
        assert_eq!(
            kinds_of(&tokens, TokenKind::Comment),
            vec!["# trailing", "# full line"]
        );
    }

    #[test]
    fn test_heredoc_is_one_literal() {
        let source = "cat <<EOF\nline one\n$HOME\nEOF\necho done";
        let tokens = tokens_of(&BashTokenizer, source);
        assert_eq!(
            kinds_of(&tokens, TokenKind::Literal),
            vec!["<<EOF\nline one\n$HOME\nEOF"]
        );
        assert_eq!(kinds_of(&tokens, TokenKind::Keyword), vec!["echo", "done"]);
    }

    #[test]
    fn test_quoted_heredoc_with_tab_stripping() {
        let source = "cat <<-'END'\n\tbody\n\tEND\n";
        let tokens = tokens_of(&BashTokenizer, source);
        assert_eq!(
            kinds_of(&tokens, TokenKind::Literal),
            vec!["<<-'END'\n\tbody\n\tEND"]
        );
    }

    #[test]
    fn test_unterminated_heredoc_runs_to_end() {
        let tokens = tokens_of(&BashTokenizer, "cat <<EOF\nno end");
        assert_eq!(kinds_of(&tokens, TokenKind::Literal), vec!["<<EOF\nno end"]);
    }

    #[test]
    fn test_single_quotes_ignore_backslashes() {
        let tokens = tokens_of(&BashTokenizer, r"echo 'a\' $'b\'c'");
        assert_eq!(kinds_of(&tokens, TokenKind::Literal), vec![r"'a\'", r"$'b\'c'"]);
    }

    #[test]
    fn test_control_flow_keywords() {
        let tokens = tokens_of(&BashTokenizer, "for f in *.txt; do\n  rm \"$f\"\ndone");
        assert_eq!(
            kinds_of(&tokens, TokenKind::Keyword),
            vec!["for", "in", "do", "done"]
        );
    }
}
