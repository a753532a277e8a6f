use fin_core::{ChatTurn, Document, ParseError};
use fin_gateway::UploadPayload;
use fin_parsers::{content_to_context, FormatRegistry, Route};
use tracing::{error, info, warn};
use crate::prompt::AUTO_ANALYZE_PROMPT;
use crate::session::{ChatSession, SendOutcome};

pub const UPLOAD_FAILED: &str = "Upload failed.";
pub const NO_TEXT_EXTRACTED: &str = "No text extracted.";
pub const PROCESSING_FAILED: &str = "Failed to process file.";
pub const STILL_PENDING: &str = "Still waiting for the previous reply. Try again in a moment.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Rejected before any parsing or network call
    Unsupported(String),
    /// Parsing or the upload failed; nothing was sent for analysis
    Failed(String),
    /// The backend accepted the upload but returned no text
    NoText(String),
    /// Text was extracted but another reply is pending; the context is
    /// unchanged and nothing was sent
    Busy(String),
    /// Text was extracted, stored as chat context and analysed
    Extracted { text: String, reply: ChatTurn },
}

impl IngestOutcome {
    /// The line to show next to the upload control.
    pub fn message(&self) -> &str {
        match self {
            IngestOutcome::Unsupported(message)
            | IngestOutcome::Failed(message)
            | IngestOutcome::NoText(message)
            | IngestOutcome::Busy(message) => message,
            IngestOutcome::Extracted { text, .. } => text,
        }
    }
}

/// Feeds documents into a [`ChatSession`].
///
/// Locally parseable formats never touch the upload endpoint; images go to
/// the backend for OCR when the registry routes them there.
pub struct Ingestor {
    registry: FormatRegistry,
}

impl Ingestor {
    pub fn new(registry: FormatRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &FormatRegistry {
        &self.registry
    }

    pub async fn ingest(&self, session: &ChatSession, document: &Document) -> IngestOutcome {
        let route = match self.registry.classify(document) {
            Ok(route) => route,
            Err(e) => {
                warn!("Rejected {}: {}", document.filename, e);
                return IngestOutcome::Unsupported(unsupported_message(&e));
            }
        };

        match route {
            Route::Local(parser) => {
                let text = parser
                    .parse(&document.bytes)
                    .and_then(|content| content_to_context(&content));
                match text {
                    Ok(text) => {
                        info!(
                            "📄 Parsed {} locally ({} chars)",
                            document.filename,
                            text.len()
                        );
                        Self::analyze_extracted(session, text).await
                    }
                    Err(e) => {
                        warn!("Failed to parse {}: {}", document.filename, e);
                        IngestOutcome::Failed(e.to_string())
                    }
                }
            }
            Route::Remote(_) => match session.backend().upload(document).await {
                Ok(response) => {
                    let payload = UploadPayload::from_body(&response.body);
                    if !response.is_success() {
                        warn!(
                            "Upload of {} returned status {}: {}",
                            document.filename,
                            response.status,
                            payload.raw.as_deref().unwrap_or("<json>")
                        );
                        return IngestOutcome::Failed(
                            payload.error.unwrap_or_else(|| UPLOAD_FAILED.to_string()),
                        );
                    }
                    match payload.extracted_text.filter(|text| !text.is_empty()) {
                        Some(text) => Self::analyze_extracted(session, text).await,
                        None => IngestOutcome::NoText(
                            payload.error.unwrap_or_else(|| NO_TEXT_EXTRACTED.to_string()),
                        ),
                    }
                }
                Err(e) => {
                    error!("Upload of {} failed: {}", document.filename, e);
                    IngestOutcome::Failed(PROCESSING_FAILED.to_string())
                }
            },
        }
    }

    async fn analyze_extracted(session: &ChatSession, text: String) -> IngestOutcome {
        if text.trim().is_empty() {
            return IngestOutcome::NoText(NO_TEXT_EXTRACTED.to_string());
        }
        match session.send_with_context(text.clone(), AUTO_ANALYZE_PROMPT).await {
            SendOutcome::Replied(reply) => IngestOutcome::Extracted { text, reply },
            SendOutcome::Ignored => IngestOutcome::Busy(STILL_PENDING.to_string()),
        }
    }
}

impl Default for Ingestor {
    fn default() -> Self {
        Self::new(FormatRegistry::default())
    }
}

fn unsupported_message(error: &ParseError) -> String {
    match error {
        ParseError::Unsupported { filename, .. } => format!(
            "Unsupported file type: {}. Please upload a PDF, CSV or XLSX file.",
            filename
        ),
        other => other.to_string(),
    }
}
