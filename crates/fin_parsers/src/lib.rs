use fin_core::{ExtractedContent, ParseError, SourceFormat};

pub mod csv;
pub mod pdf;
pub mod registry;
pub mod render;
pub mod spreadsheet;

pub use self::csv::CsvParser;
pub use pdf::PdfParser;
pub use registry::{Capability, FormatRegistry, Route, CAPABILITIES};
pub use render::content_to_context;
pub use spreadsheet::SpreadsheetParser;

/// Turns the raw bytes of one document format into [`ExtractedContent`].
///
/// Parsing is all-or-nothing: an implementation either returns the whole
/// document or an error, never a partial result.
pub trait DocumentParser: Send + Sync {
    /// The format this parser understands
    fn format(&self) -> SourceFormat;

    /// Parse the full document
    fn parse(&self, bytes: &[u8]) -> Result<ExtractedContent, ParseError>;
}

pub mod prelude {
    pub use super::{content_to_context, DocumentParser, FormatRegistry, Route};
    pub use fin_core::{Document, ExtractedContent, ParseError, SourceFormat};
}
