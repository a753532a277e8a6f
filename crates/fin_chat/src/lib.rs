pub mod format;
pub mod ingest;
pub mod prompt;
pub mod session;

pub use format::format_reply_lines;
pub use ingest::{IngestOutcome, Ingestor};
pub use prompt::{compose_prompt, AUTO_ANALYZE_PROMPT};
pub use session::{ChatSession, SendOutcome, SessionState};

pub mod prelude {
    pub use super::{ChatSession, IngestOutcome, Ingestor, SendOutcome, SessionState};
    pub use fin_core::{ChatTurn, Role};
}

#[cfg(test)]
pub(crate) mod testing;
