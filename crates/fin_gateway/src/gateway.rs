use std::fmt;
use async_trait::async_trait;
use bytes::Bytes;
use fin_core::{AnalysisBackend, Document, Error, RawResponse, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Serialize;
use tracing::{error, info};
use crate::config::BackendConfig;

const JSON: &str = "application/json";
const OCTET_STREAM: &str = "application/octet-stream";

#[derive(Serialize)]
struct AnalyzeRequest<'a> {
    text: &'a str,
}

/// Transparent proxy to the AI/OCR backend.
///
/// One attempt per call, no retries and no client-side deadline. Every
/// response the backend produces is relayed as-is; only a failure to get a
/// response at all is turned into the 500 envelope by the `forward_*` calls.
pub struct RequestGateway {
    client: Client,
    config: BackendConfig,
}

impl RequestGateway {
    pub fn new(config: BackendConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: BackendConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Rebuilds a multipart body with a single `file` field and posts it.
    /// The multipart content type (and boundary) is left to the form.
    pub async fn send_upload(&self, document: &Document) -> Result<RawResponse> {
        let url = self.config.upload_url();
        let mime = document.mime.as_deref().unwrap_or(OCTET_STREAM);
        let part = || Part::bytes(document.bytes.to_vec()).file_name(document.filename.clone());
        let part = match part().mime_str(mime) {
            Ok(part) => part,
            Err(_) => part().mime_str(OCTET_STREAM).map_err(network_error)?,
        };
        let form = Form::new().part("file", part);

        info!(
            "📤 Forwarding upload {} ({} bytes) to {}",
            document.filename,
            document.bytes.len(),
            url
        );
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(network_error)?;
        relay(response).await
    }

    /// Posts an already-encoded analyze body, keeping the caller's content type.
    pub async fn send_analyze(
        &self,
        body: Bytes,
        content_type: Option<&str>,
    ) -> Result<RawResponse> {
        let url = self.config.analyze_url();
        let content_type = content_type.unwrap_or(JSON);

        info!("🧠 Forwarding analyze request ({} bytes) to {}", body.len(), url);
        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await
            .map_err(network_error)?;
        relay(response).await
    }

    pub async fn forward_upload(&self, document: &Document) -> RawResponse {
        match self.send_upload(document).await {
            Ok(response) => response,
            Err(e) => failure_envelope(&e),
        }
    }

    pub async fn forward_analyze(&self, body: Bytes, content_type: Option<&str>) -> RawResponse {
        match self.send_analyze(body, content_type).await {
            Ok(response) => response,
            Err(e) => failure_envelope(&e),
        }
    }
}

impl fmt::Debug for RequestGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestGateway")
            .field("client", &"<reqwest::Client>")
            .field("config", &self.config)
            .finish()
    }
}

#[async_trait]
impl AnalysisBackend for RequestGateway {
    async fn analyze(&self, prompt: &str) -> Result<RawResponse> {
        let body = serde_json::to_vec(&AnalyzeRequest { text: prompt })?;
        self.send_analyze(Bytes::from(body), Some(JSON)).await
    }

    async fn upload(&self, document: &Document) -> Result<RawResponse> {
        self.send_upload(document).await
    }
}

/// Reads the whole body, which consumes the response and hands the
/// connection back to the pool.
async fn relay(response: reqwest::Response) -> Result<RawResponse> {
    let status = response.status().as_u16();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let body = response.bytes().await.map_err(network_error)?;
    info!("📥 Backend replied {} ({} bytes)", status, body.len());
    Ok(RawResponse {
        status,
        content_type,
        body,
    })
}

fn network_error(e: reqwest::Error) -> Error {
    error!("Backend request failed: {}", e);
    Error::Network(e.to_string())
}

/// The uniform response for a call that never reached the backend.
pub fn failure_envelope(error: &Error) -> RawResponse {
    let body = serde_json::json!({
        "error": "Internal Server Error",
        "details": error.to_string(),
    });
    RawResponse {
        status: 500,
        content_type: Some(JSON.to_string()),
        body: Bytes::from(body.to_string()),
    }
}
