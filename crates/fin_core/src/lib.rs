pub mod backend;
pub mod error;
pub mod logging;
pub mod types;

pub use backend::AnalysisBackend;
pub use error::{Error, ParseError};
pub use types::{
    ChatTurn, Document, ExtractedContent, NewsArticle, RawResponse, Record, Role, SourceFormat,
};

pub type Result<T> = std::result::Result<T, Error>;

pub mod prelude {
    pub use super::{
        AnalysisBackend, ChatTurn, Document, Error, ExtractedContent, ParseError, RawResponse,
        Result, Role, SourceFormat,
    };
}
