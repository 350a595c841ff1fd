use crate::display::{Palette, PrettyPrinter};
use std::io::{self, Write};

/// Where response text ends up: written as-is, or rendered as Markdown.
pub enum Sink<W: Write> {
    Plain(W),
    Pretty(PrettyPrinter<W>),
}

impl<W: Write> Sink<W> {
    pub fn plain(out: W) -> Self {
        Sink::Plain(out)
    }

    pub fn pretty(out: W, palette: Palette) -> Self {
        Sink::Pretty(PrettyPrinter::new(out, palette))
    }

    pub fn write(&mut self, text: &str) -> io::Result<()> {
        match self {
            Sink::Plain(out) => {
                out.write_all(text.as_bytes())?;
                out.flush()
            }
            Sink::Pretty(printer) => printer.print(text),
        }
    }

    /// Ends the output with a newline and, for pretty output, default colors.
    pub fn finish(&mut self) -> io::Result<()> {
        match self {
            Sink::Plain(out) => {
                out.write_all(b"\n")?;
                out.flush()
            }
            Sink::Pretty(printer) => printer.close(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::palette::RESET;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_sink_appends_newline() {
        let mut out = Vec::new();
        {
            let mut sink = Sink::plain(&mut out);
            sink.write("Hello").unwrap();
            sink.write(", world").unwrap();
            sink.finish().unwrap();
        }
        assert_eq!(String::from_utf8(out).unwrap(), "Hello, world\n");
    }

    #[test]
    fn test_pretty_sink_flushes_and_resets() {
        let palette = Palette::basic(true);
        let mut out = Vec::new();
        {
            let mut sink = Sink::pretty(&mut out, palette);
            sink.write("partial").unwrap();
            sink.finish().unwrap();
        }
        assert_eq!(
            String::from_utf8(out).unwrap(),
            format!("{}partial{RESET}\n{RESET}", palette.text)
        );
    }
}
