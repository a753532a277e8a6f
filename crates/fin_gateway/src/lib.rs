pub mod config;
pub mod gateway;
pub mod normalize;

pub use config::BackendConfig;
pub use gateway::{failure_envelope, RequestGateway};
pub use normalize::{extract_insight, AnalysisPayload, PayloadShape, UploadPayload};

pub mod prelude {
    pub use super::{extract_insight, BackendConfig, RequestGateway, UploadPayload};
    pub use fin_core::{Document, Error, RawResponse, Result};
}
