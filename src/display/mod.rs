pub mod highlighter;
pub mod palette;
pub mod pretty;

pub use highlighter::SyntaxHighlighter;
pub use palette::Palette;
pub use pretty::PrettyPrinter;
