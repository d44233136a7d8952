use serde::Serialize;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::{
    events::{EventEmitter, CHAT_STATE_CHANGED},
    gateway::Backend,
    models::{ReplyProvenance, Turn},
    utils::sync::lock,
};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

pub const GREETING: &str =
    "Namaste. I'm Pandora, your personal AI therapy companion. How are you feeling right now?";

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatSnapshot {
    pub transcript: Vec<Turn>,
    /// A send is outstanding: show the typing indicator, disable input.
    pub pending: bool,
    pub last_source: Option<ReplyProvenance>,
    pub badge: Option<&'static str>,
}

#[derive(Debug)]
struct ChatState {
    transcript: Vec<Turn>,
    pending: bool,
    last_source: Option<ReplyProvenance>,
}

impl ChatState {
    fn snapshot(&self) -> ChatSnapshot {
        ChatSnapshot {
            transcript: self.transcript.clone(),
            pending: self.pending,
            last_source: self.last_source,
            badge: self.last_source.as_ref().map(ReplyProvenance::badge),
        }
    }
}

/// A mounted chat view. Sends are serialized: one outstanding at a time,
/// so replies land in the order their requests were issued.
pub struct ChatSession {
    id: String,
    state: Arc<Mutex<ChatState>>,
    backend: Arc<dyn Backend>,
    events: EventEmitter,
}

impl ChatSession {
    pub fn new(backend: Arc<dyn Backend>, events: EventEmitter) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            state: Arc::new(Mutex::new(ChatState {
                transcript: vec![Turn::assistant(GREETING)],
                pending: false,
                last_source: None,
            })),
            backend,
            events,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn snapshot(&self) -> ChatSnapshot {
        lock(&self.state).snapshot()
    }

    /// Appends the user turn right away and asks the backend for a reply.
    ///
    /// Returns `None` without touching the transcript when `text` is blank or
    /// a send is already outstanding.
    pub fn send_message(&self, text: &str) -> Option<JoinHandle<()>> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let (history, snapshot) = {
            let mut state = lock(&self.state);
            if state.pending {
                log_debug!("Chat {} send ignored: reply still pending", self.id);
                return None;
            }
            let history = state.transcript.clone();
            state.transcript.push(Turn::user(text));
            state.pending = true;
            (history, state.snapshot())
        };
        self.events.emit(CHAT_STATE_CHANGED, &snapshot);

        let weak = Arc::downgrade(&self.state);
        let backend = self.backend.clone();
        let events = self.events.clone();
        let session_id = self.id.clone();
        let text = text.to_string();

        Some(tokio::spawn(async move {
            let reply = backend.send_chat_turn(&history, &text).await;

            let Some(state) = weak.upgrade() else {
                log_debug!("Chat {} closed; discarding reply", session_id);
                return;
            };
            let snapshot = {
                let mut state = lock(&state);
                if !reply.text.is_empty() {
                    state.transcript.push(Turn::assistant(reply.text));
                    state.last_source = Some(reply.source);
                }
                state.pending = false;
                state.snapshot()
            };
            log_info!(
                "Chat {} reply appended ({} turns, source {:?})",
                session_id,
                snapshot.transcript.len(),
                snapshot.last_source
            );
            events.emit(CHAT_STATE_CHANGED, &snapshot);
        }))
    }
}
