use async_trait::async_trait;
use crate::types::{Document, RawResponse};
use crate::Result;

/// The AI/OCR service seen from the chat side.
///
/// Implementations return `Ok` for every response the service produced,
/// whatever its status, and `Err` only when no response was obtained.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Send one prompt for analysis
    async fn analyze(&self, prompt: &str) -> Result<RawResponse>;

    /// Send a document for server-side extraction (OCR)
    async fn upload(&self, document: &Document) -> Result<RawResponse>;
}
