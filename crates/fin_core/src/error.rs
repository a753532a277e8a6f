use thiserror::Error;

/// Reasons a document could not be turned into [`crate::ExtractedContent`].
///
/// These are always resolved locally; a document that fails here never
/// reaches the network.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unsupported file type: {filename} ({mime})")]
    Unsupported { filename: String, mime: String },

    #[error("Malformed document: {0}")]
    Malformed(String),

    #[error("Unreadable document: {0}")]
    Unreadable(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Upstream error ({status}): {detail}")]
    Upstream { status: u16, detail: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// True for connection, timeout and DNS failures, as opposed to a
    /// status code returned by a reachable service.
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Network(_) | Error::Http(_))
    }
}
