use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use async_trait::async_trait;
use bytes::Bytes;
use fin_core::{AnalysisBackend, Document, Error, RawResponse, Result};
use serde_json::Value;
use tokio::sync::Notify;

#[derive(Clone)]
pub enum Reply {
    Json(u16, Value),
    NetworkDown,
}

impl Reply {
    fn respond(&self) -> Result<RawResponse> {
        match self {
            Reply::Json(status, body) => Ok(RawResponse {
                status: *status,
                content_type: Some("application/json".to_string()),
                body: Bytes::from(body.to_string()),
            }),
            Reply::NetworkDown => Err(Error::Network("connection refused".to_string())),
        }
    }
}

/// Scripted backend that records what it was asked.
pub struct MockBackend {
    analyze_reply: Reply,
    upload_reply: Reply,
    gate: Option<Notify>,
    analyze_calls: AtomicUsize,
    upload_calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockBackend {
    pub fn new(analyze_reply: Reply) -> Self {
        Self {
            analyze_reply,
            upload_reply: Reply::NetworkDown,
            gate: None,
            analyze_calls: AtomicUsize::new(0),
            upload_calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_upload(mut self, reply: Reply) -> Self {
        self.upload_reply = reply;
        self
    }

    /// Analyze calls block until [`MockBackend::release`].
    pub fn gated(mut self) -> Self {
        self.gate = Some(Notify::new());
        self
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    pub fn analyze_calls(&self) -> usize {
        self.analyze_calls.load(Ordering::SeqCst)
    }

    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnalysisBackend for MockBackend {
    async fn analyze(&self, prompt: &str) -> Result<RawResponse> {
        self.analyze_calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.analyze_reply.respond()
    }

    async fn upload(&self, _document: &Document) -> Result<RawResponse> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        self.upload_reply.respond()
    }
}
