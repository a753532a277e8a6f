use std::sync::Arc;
use fin_core::{Document, ExtractedContent, ParseError, SourceFormat};
use tracing::debug;
use crate::{CsvParser, DocumentParser, PdfParser, SpreadsheetParser};

/// One row of the capability table: the MIME types and extensions that
/// identify a format.
#[derive(Debug)]
pub struct Capability {
    pub format: SourceFormat,
    pub mimes: &'static [&'static str],
    pub extensions: &'static [&'static str],
}

pub const CAPABILITIES: &[Capability] = &[
    Capability {
        format: SourceFormat::Csv,
        mimes: &["text/csv", "application/csv", "text/x-csv"],
        extensions: &["csv"],
    },
    Capability {
        format: SourceFormat::Spreadsheet,
        mimes: &["application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"],
        extensions: &["xlsx"],
    },
    Capability {
        format: SourceFormat::Pdf,
        mimes: &["application/pdf"],
        extensions: &["pdf"],
    },
    Capability {
        format: SourceFormat::Image,
        mimes: &["image/jpeg", "image/png"],
        extensions: &["jpg", "jpeg", "png"],
    },
];

/// Where a document's text comes from.
#[derive(Clone)]
pub enum Route {
    /// Parsed in-process
    Local(Arc<dyn DocumentParser>),
    /// Sent to the backend, which performs OCR
    Remote(SourceFormat),
}

impl Route {
    pub fn format(&self) -> SourceFormat {
        match self {
            Route::Local(parser) => parser.format(),
            Route::Remote(format) => *format,
        }
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Route::Local(parser) => write!(f, "Local({:?})", parser.format()),
            Route::Remote(format) => write!(f, "Remote({:?})", format),
        }
    }
}

struct Entry {
    capability: &'static Capability,
    route: Route,
}

/// Dispatches documents to a parser.
///
/// The declared MIME type is tried first; when it is absent or names no
/// known format, the filename extension decides. Anything else is rejected
/// before any parsing happens.
pub struct FormatRegistry {
    entries: Vec<Entry>,
}

impl FormatRegistry {
    /// Builds the standard table. Images are only routed (to backend OCR)
    /// when `images_enabled` is set; otherwise they are unsupported.
    pub fn new(images_enabled: bool) -> Self {
        let entries = CAPABILITIES
            .iter()
            .filter_map(|capability| {
                let route = match capability.format {
                    SourceFormat::Csv => Route::Local(Arc::new(CsvParser::new())),
                    SourceFormat::Spreadsheet => Route::Local(Arc::new(SpreadsheetParser::new())),
                    SourceFormat::Pdf => Route::Local(Arc::new(PdfParser::new())),
                    SourceFormat::Image if images_enabled => Route::Remote(SourceFormat::Image),
                    SourceFormat::Image => return None,
                };
                Some(Entry { capability, route })
            })
            .collect();
        Self { entries }
    }

    /// Resolves how a document should be handled, without reading its bytes.
    pub fn classify(&self, document: &Document) -> Result<Route, ParseError> {
        let by_mime = document.essence().and_then(|mime| {
            self.entries
                .iter()
                .find(|entry| entry.capability.mimes.contains(&mime.as_str()))
        });
        let entry = by_mime.or_else(|| {
            document.extension().and_then(|ext| {
                self.entries
                    .iter()
                    .find(|entry| entry.capability.extensions.contains(&ext.as_str()))
            })
        });

        match entry {
            Some(entry) => {
                debug!(
                    "📄 {} dispatched as {} ({})",
                    document.filename,
                    entry.capability.format.label(),
                    if by_mime.is_some() { "by MIME type" } else { "by extension" }
                );
                Ok(entry.route.clone())
            }
            None => Err(ParseError::Unsupported {
                filename: document.filename.clone(),
                mime: document.mime.clone().unwrap_or_else(|| "unknown".to_string()),
            }),
        }
    }

    /// Parses a document locally. Formats that are only extracted by the
    /// backend are reported as unsupported here.
    pub fn parse(&self, document: &Document) -> Result<ExtractedContent, ParseError> {
        match self.classify(document)? {
            Route::Local(parser) => parser.parse(&document.bytes),
            Route::Remote(_) => Err(ParseError::Unsupported {
                filename: document.filename.clone(),
                mime: document.mime.clone().unwrap_or_else(|| "unknown".to_string()),
            }),
        }
    }

    /// The canonical MIME type for a format, used when a document arrives
    /// without one.
    pub fn canonical_mime(format: SourceFormat, extension: Option<&str>) -> &'static str {
        let capability = CAPABILITIES.iter().find(|c| c.format == format);
        match (format, extension) {
            (SourceFormat::Image, Some("png")) => "image/png",
            _ => capability.map(|c| c.mimes[0]).unwrap_or("application/octet-stream"),
        }
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new(false)
    }
}
