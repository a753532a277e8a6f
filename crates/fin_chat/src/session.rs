use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use fin_core::{AnalysisBackend, ChatTurn};
use fin_gateway::extract_insight;
use tracing::{debug, error, warn};
use crate::prompt::compose_prompt;

pub const GREETING: &str = "Hi, I'm your financial assistant. Ask about cash flow, margins, \
    runway, or upload a report (PDF/CSV/XLSX) and I'll analyse it.";
pub const NO_RESPONSE_FALLBACK: &str = "No response from the analysis service.";
pub const NETWORK_FALLBACK: &str = "Failed to connect to the analysis service.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Empty input, or another request was already in flight
    Ignored,
    /// The assistant turn appended for this send
    Replied(ChatTurn),
}

#[derive(Debug, Default)]
struct Transcript {
    turns: Vec<ChatTurn>,
    context: Option<String>,
}

/// An append-only conversation with at most one analyze call in flight.
///
/// Turns are never reordered or edited. While a call is pending every other
/// `send_message` is a no-op, so replies can't interleave.
pub struct ChatSession {
    backend: Arc<dyn AnalysisBackend>,
    transcript: Mutex<Transcript>,
    pending: AtomicBool,
}

/// Clears the pending flag however the send ends, including when its
/// future is dropped mid-flight.
struct PendingGuard<'a>(&'a AtomicBool);

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
        debug!("Chat session back to idle");
    }
}

impl ChatSession {
    pub fn new(backend: Arc<dyn AnalysisBackend>) -> Self {
        Self {
            backend,
            transcript: Mutex::new(Transcript {
                turns: vec![ChatTurn::assistant(GREETING)],
                context: None,
            }),
            pending: AtomicBool::new(false),
        }
    }

    pub fn backend(&self) -> &Arc<dyn AnalysisBackend> {
        &self.backend
    }

    pub fn state(&self) -> SessionState {
        if self.pending.load(Ordering::Acquire) {
            SessionState::Pending
        } else {
            SessionState::Idle
        }
    }

    pub fn turns(&self) -> Vec<ChatTurn> {
        self.transcript().turns.clone()
    }

    pub fn context(&self) -> Option<String> {
        self.transcript().context.clone()
    }

    /// Replaces the document text that later prompts are grounded in.
    pub fn set_context(&self, context: Option<String>) {
        self.transcript().context = context.filter(|c| !c.is_empty());
    }

    pub async fn send_message(&self, text: &str) -> SendOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SendOutcome::Ignored;
        }
        let Some(_pending) = self.begin() else {
            return SendOutcome::Ignored;
        };
        SendOutcome::Replied(self.exchange(text).await)
    }

    /// Replaces the context and sends `text` against it as one step.
    ///
    /// While another reply is pending nothing changes, the context included.
    pub async fn send_with_context(&self, context: String, text: &str) -> SendOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SendOutcome::Ignored;
        }
        let Some(_pending) = self.begin() else {
            return SendOutcome::Ignored;
        };
        self.set_context(Some(context));
        SendOutcome::Replied(self.exchange(text).await)
    }

    fn begin(&self) -> Option<PendingGuard<'_>> {
        if self
            .pending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Ignoring message while a reply is pending");
            return None;
        }
        Some(PendingGuard(&self.pending))
    }

    async fn exchange(&self, text: &str) -> ChatTurn {
        let prompt = {
            let mut transcript = self.transcript();
            transcript.turns.push(ChatTurn::user(text));
            compose_prompt(transcript.context.as_deref(), text)
        };
        debug!("Chat session pending ({} byte prompt)", prompt.len());

        let reply = match self.backend.analyze(&prompt).await {
            Ok(response) => {
                if !response.is_success() {
                    warn!("Analyze call returned status {}", response.status);
                }
                let message = extract_insight(response.status, &response.body);
                if message.trim().is_empty() {
                    NO_RESPONSE_FALLBACK.to_string()
                } else {
                    message
                }
            }
            Err(e) => {
                error!("Analyze call failed: {}", e);
                NETWORK_FALLBACK.to_string()
            }
        };

        let turn = ChatTurn::assistant(reply);
        self.transcript().turns.push(turn.clone());
        turn
    }

    fn transcript(&self) -> MutexGuard<'_, Transcript> {
        self.transcript.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatSession")
            .field("state", &self.state())
            .field("turns", &self.transcript().turns.len())
            .finish()
    }
}
