use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// One row of tabular content. Keys keep header order.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// A file selected for ingestion. Immutable once built.
#[derive(Clone, PartialEq, Eq)]
pub struct Document {
    pub filename: String,
    pub mime: Option<String>,
    pub bytes: Bytes,
}

impl Document {
    pub fn new(filename: impl Into<String>, mime: Option<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            mime: mime.filter(|m| !m.trim().is_empty()),
            bytes: bytes.into(),
        }
    }

    /// Lowercased extension of the filename, without the dot.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
    }

    /// MIME type with parameters stripped, e.g. `text/csv; charset=utf-8` -> `text/csv`.
    pub fn essence(&self) -> Option<String> {
        self.mime
            .as_deref()
            .and_then(|m| m.split(';').next())
            .map(|m| m.trim().to_ascii_lowercase())
            .filter(|m| !m.is_empty())
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("filename", &self.filename)
            .field("mime", &self.mime)
            .field("bytes", &format_args!("<{} bytes>", self.bytes.len()))
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Csv,
    Spreadsheet,
    Pdf,
    Image,
}

impl SourceFormat {
    pub fn label(&self) -> &'static str {
        match self {
            SourceFormat::Csv => "CSV",
            SourceFormat::Spreadsheet => "spreadsheet",
            SourceFormat::Pdf => "PDF",
            SourceFormat::Image => "image",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ExtractedContent {
    Text { format: SourceFormat, text: String },
    /// `columns` is the header in source order, kept even when no data
    /// row follows it.
    Rows {
        format: SourceFormat,
        columns: Vec<String>,
        rows: Vec<Record>,
    },
}

impl ExtractedContent {
    pub fn format(&self) -> SourceFormat {
        match self {
            ExtractedContent::Text { format, .. } | ExtractedContent::Rows { format, .. } => {
                *format
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub message: String,
}

impl ChatTurn {
    pub fn user(message: impl Into<String>) -> Self {
        Self { role: Role::User, message: message.into() }
    }

    pub fn assistant(message: impl Into<String>) -> Self {
        Self { role: Role::Assistant, message: message.into() }
    }
}

/// Status, content type and body exactly as a backend returned them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub id: String,
    pub title: String,
    pub source: String,
    pub date: String,
    pub url: String,
    pub tickers: Vec<String>,
}
