//! Terminal color palette, detected once at startup and handed to the
//! highlighter and pretty printer.

use std::env;

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const ITALIC: &str = "\x1b[3m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    /// Basic 16-color ANSI
    Basic,
    /// 256-color or true color
    Extended,
}

/// Escape sequences for every styled element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub keyword: &'static str,
    pub identifier: &'static str,
    pub literal: &'static str,
    pub comment: &'static str,
    pub other: &'static str,

    pub heading: &'static str,
    pub code_block: &'static str,
    pub inline_code: &'static str,
    pub block_quote: &'static str,
    pub list_marker: &'static str,
    pub emphasis: &'static str,
    pub horizontal_rule: &'static str,
    pub text: &'static str,

    /// Whether bold/italic escapes render; emphasis falls back to color only.
    pub bold_supported: bool,
}

impl Palette {
    /// Palette for the current terminal, from `COLORTERM`, `TERM` and
    /// `WT_SESSION`.
    pub fn detect() -> Self {
        let colorterm = env::var("COLORTERM").ok();
        let term = env::var("TERM").ok();
        let windows_terminal = env::var_os("WT_SESSION").is_some();

        let mode = detect_mode(colorterm.as_deref(), term.as_deref(), windows_terminal);
        let bold_supported = !cfg!(windows) || windows_terminal;
        tracing::debug!(?mode, bold_supported, "selected color palette");

        Self::for_mode(mode, bold_supported)
    }

    pub fn for_mode(mode: ColorMode, bold_supported: bool) -> Self {
        match mode {
            ColorMode::Basic => Self::basic(bold_supported),
            ColorMode::Extended => Self::extended(bold_supported),
        }
    }

    pub fn basic(bold_supported: bool) -> Self {
        Self {
            keyword: "\x1b[35m",
            identifier: "\x1b[37m",
            literal: "\x1b[32m",
            comment: "\x1b[90m",
            other: "\x1b[36m",
            heading: "\x1b[1m\x1b[33m",
            code_block: "\x1b[36m",
            inline_code: "\x1b[36m",
            block_quote: "\x1b[34m",
            list_marker: "\x1b[34m",
            emphasis: "\x1b[33m\x1b[2m",
            horizontal_rule: "\x1b[33m",
            text: "\x1b[37m",
            bold_supported,
        }
    }

    pub fn extended(bold_supported: bool) -> Self {
        Self {
            keyword: "\x1b[38;5;171m",
            identifier: "\x1b[38;5;252m",
            literal: "\x1b[38;5;114m",
            comment: "\x1b[38;5;245m",
            other: "\x1b[38;5;81m",
            heading: "\x1b[1m\x1b[38;5;220m",
            code_block: "\x1b[38;5;81m",
            inline_code: "\x1b[38;5;81m",
            block_quote: "\x1b[38;5;75m",
            list_marker: "\x1b[38;5;75m",
            emphasis: "\x1b[38;5;222m",
            horizontal_rule: "\x1b[38;5;220m",
            text: "\x1b[38;5;252m",
            bold_supported,
        }
    }
}

fn detect_mode(colorterm: Option<&str>, term: Option<&str>, windows_terminal: bool) -> ColorMode {
    if matches!(colorterm, Some("truecolor") | Some("24bit")) {
        return ColorMode::Extended;
    }
    if term.is_some_and(|t| t.contains("256color")) || windows_terminal {
        return ColorMode::Extended;
    }
    ColorMode::Basic
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_mode() {
        assert_eq!(detect_mode(Some("truecolor"), None, false), ColorMode::Extended);
        assert_eq!(detect_mode(None, Some("xterm-256color"), false), ColorMode::Extended);
        assert_eq!(detect_mode(None, Some("xterm"), true), ColorMode::Extended);
        assert_eq!(detect_mode(None, Some("xterm"), false), ColorMode::Basic);
        assert_eq!(detect_mode(None, None, false), ColorMode::Basic);
    }

    #[test]
    fn test_palettes_differ_by_mode() {
        let basic = Palette::for_mode(ColorMode::Basic, true);
        let extended = Palette::for_mode(ColorMode::Extended, true);
        assert_ne!(basic.keyword, extended.keyword);
        assert!(basic.bold_supported);
        assert!(!Palette::basic(false).bold_supported);
    }
}
