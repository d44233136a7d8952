//! Backend gateway: the four calls the client makes to the MindCare backend.
//!
//! Every operation is total. Failures are folded into the return value
//! (fallback reply, `None`, or a logged drop) so callers only branch on shape.

pub mod http;

use async_trait::async_trait;

use crate::capture::CaptureFrame;
use crate::models::{ChatReply, EmotionResult, MoodSample, ReplyProvenance, Turn};

pub use http::HttpGateway;

pub const CHAT_FALLBACK_TEXT: &str =
    "I'm currently disconnected from my ML server. Please make sure the MindCare backend is running!";

#[async_trait]
pub trait Backend: Send + Sync {
    /// Posts the prior transcript plus the new user text. Returns the fixed
    /// fallback reply tagged `Error` when the backend cannot answer.
    async fn send_chat_turn(&self, transcript: &[Turn], new_text: &str) -> ChatReply;

    /// `None` means analysis is unavailable.
    async fn analyze_image(&self, frame: CaptureFrame) -> Option<EmotionResult>;

    /// Best effort. Failures are logged, never retried.
    async fn persist_mood(&self, score: u8, label: &str);

    /// `None` on any failure; callers fall back to the default week.
    async fn fetch_mood_history(&self) -> Option<Vec<MoodSample>>;
}

pub fn fallback_reply() -> ChatReply {
    ChatReply {
        text: CHAT_FALLBACK_TEXT.to_string(),
        source: ReplyProvenance::Error,
        confidence: None,
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::sync::Semaphore;

    /// In-memory backend that records every call.
    ///
    /// A gated backend parks each call until the test hands out a permit with
    /// [`FakeBackend::release`], which lets tests observe in-flight states.
    pub struct FakeBackend {
        pub chat_reply: Mutex<ChatReply>,
        pub analysis: Mutex<Option<EmotionResult>>,
        pub history: Mutex<Option<Vec<MoodSample>>>,
        pub chat_calls: Mutex<Vec<(Vec<Turn>, String)>>,
        pub persisted: Mutex<Vec<(u8, String)>>,
        pub analyze_calls: AtomicUsize,
        pub history_calls: AtomicUsize,
        gate: Option<Semaphore>,
    }

    impl FakeBackend {
        pub fn new() -> Self {
            Self {
                chat_reply: Mutex::new(fallback_reply()),
                analysis: Mutex::new(None),
                history: Mutex::new(None),
                chat_calls: Mutex::new(Vec::new()),
                persisted: Mutex::new(Vec::new()),
                analyze_calls: AtomicUsize::new(0),
                history_calls: AtomicUsize::new(0),
                gate: None,
            }
        }

        pub fn gated() -> Self {
            Self {
                gate: Some(Semaphore::new(0)),
                ..Self::new()
            }
        }

        pub fn with_analysis(self, result: EmotionResult) -> Self {
            *self.analysis.lock().unwrap() = Some(result);
            self
        }

        pub fn with_chat_reply(self, reply: ChatReply) -> Self {
            *self.chat_reply.lock().unwrap() = reply;
            self
        }

        pub fn with_history(self, history: Option<Vec<MoodSample>>) -> Self {
            *self.history.lock().unwrap() = history;
            self
        }

        /// Lets one parked call through.
        pub fn release(&self) {
            if let Some(gate) = &self.gate {
                gate.add_permits(1);
            }
        }

        pub fn analyze_count(&self) -> usize {
            self.analyze_calls.load(Ordering::SeqCst)
        }

        pub fn persisted(&self) -> Vec<(u8, String)> {
            self.persisted.lock().unwrap().clone()
        }

        async fn pass_gate(&self) {
            if let Some(gate) = &self.gate {
                gate.acquire().await.unwrap().forget();
            }
        }
    }

    #[async_trait]
    impl Backend for FakeBackend {
        async fn send_chat_turn(&self, transcript: &[Turn], new_text: &str) -> ChatReply {
            self.chat_calls
                .lock()
                .unwrap()
                .push((transcript.to_vec(), new_text.to_string()));
            self.pass_gate().await;
            self.chat_reply.lock().unwrap().clone()
        }

        async fn analyze_image(&self, _frame: CaptureFrame) -> Option<EmotionResult> {
            self.analyze_calls.fetch_add(1, Ordering::SeqCst);
            self.pass_gate().await;
            self.analysis.lock().unwrap().clone()
        }

        async fn persist_mood(&self, score: u8, label: &str) {
            self.persisted.lock().unwrap().push((score, label.to_string()));
        }

        async fn fetch_mood_history(&self) -> Option<Vec<MoodSample>> {
            self.history_calls.fetch_add(1, Ordering::SeqCst);
            self.pass_gate().await;
            self.history.lock().unwrap().clone()
        }
    }
}
