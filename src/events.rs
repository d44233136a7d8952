//! State-to-view binding.
//!
//! Controllers publish a named event with a JSON payload whenever their state
//! changes; views subscribe and re-render from the payload. Emitting never
//! blocks and never fails the caller: with no subscribers the event is dropped.

use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 64;

pub const CHAT_STATE_CHANGED: &str = "chat-state-changed";
pub const SCAN_STATE_CHANGED: &str = "scan-state-changed";
pub const CAMERA_STATE_CHANGED: &str = "camera-state-changed";
pub const MOOD_HISTORY_CHANGED: &str = "mood-history-changed";
pub const BREATHING_STATE_CHANGED: &str = "breathing-state-changed";

#[derive(Debug, Clone, PartialEq)]
pub struct AppEvent {
    pub name: &'static str,
    pub payload: Value,
}

#[derive(Clone)]
pub struct EventEmitter {
    tx: broadcast::Sender<AppEvent>,
}

impl EventEmitter {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.tx.subscribe()
    }

    pub fn emit<S: Serialize>(&self, name: &'static str, payload: &S) {
        let payload = match serde_json::to_value(payload) {
            Ok(value) => value,
            Err(err) => {
                log::error!("failed to serialize {} payload: {}", name, err);
                return;
            }
        };
        // Err only means nobody is listening right now.
        let _ = self.tx.send(AppEvent { name, payload });
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::new()
    }
}
