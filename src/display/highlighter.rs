use super::palette::{Palette, RESET};
use crate::parsing::{LanguageRegistry, TokenKind};

/// Renders source code with per-token colors.
#[derive(Clone)]
pub struct SyntaxHighlighter {
    registry: LanguageRegistry,
    palette: Palette,
}

impl SyntaxHighlighter {
    pub fn new(palette: Palette) -> Self {
        Self::with_registry(LanguageRegistry::with_defaults(), palette)
    }

    pub fn with_registry(registry: LanguageRegistry, palette: Palette) -> Self {
        Self { registry, palette }
    }

    pub fn supports(&self, language: &str) -> bool {
        self.registry.get(language).is_some()
    }

    /// Highlights `code` as `language`. Unknown languages come back unchanged.
    pub fn highlight(&self, code: &str, language: &str) -> String {
        let Some(tokenizer) = self.registry.get(language) else {
            return code.to_string();
        };

        let mut highlighted = String::with_capacity(code.len() * 2);
        for token in tokenizer.tokenize(code) {
            let color = match token.kind {
                TokenKind::Whitespace => {
                    highlighted.push_str(&token.text);
                    continue;
                }
                TokenKind::Keyword => self.palette.keyword,
                TokenKind::Identifier => self.palette.identifier,
                TokenKind::Literal => self.palette.literal,
                TokenKind::Comment => self.palette.comment,
                TokenKind::Other => self.palette.other,
            };
            highlighted.push_str(color);
            highlighted.push_str(&token.text);
            highlighted.push_str(RESET);
        }
        highlighted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn highlighter() -> SyntaxHighlighter {
        SyntaxHighlighter::new(Palette::basic(true))
    }

    #[test]
    fn test_unknown_language_passthrough() {
        let code = "++++[>++++<-]>.";
        assert_eq!(highlighter().highlight(code, "brainfuck"), code);
    }

    #[test]
    fn test_tokens_are_wrapped_in_their_colors() {
        let palette = Palette::basic(true);
        let highlighted = highlighter().highlight("if x", "PY");
        let expected = format!(
            "{}if{} {}x{}",
            palette.keyword, RESET, palette.identifier, RESET
        );
        assert_eq!(highlighted, expected);
    }

    #[test]
    fn test_whitespace_is_not_wrapped() {
        let highlighted = highlighter().highlight("    ", "ts");
        assert_eq!(highlighted, "    ");
    }

    #[test]
    fn test_other_tokens_use_default_color() {
        let palette = Palette::basic(true);
        let highlighted = highlighter().highlight("{", "json");
        assert_eq!(highlighted, format!("{}{{{}", palette.other, RESET));
    }

    #[test]
    fn test_supports() {
        let h = highlighter();
        assert!(h.supports("bash"));
        assert!(h.supports("C#"));
        assert!(!h.supports("go"));
    }
}
