use serde::Serialize;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

use crate::{
    events::{EventEmitter, MOOD_HISTORY_CHANGED},
    gateway::Backend,
    models::{default_mood_history, MoodSample},
    utils::sync::lock,
};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum HistorySource {
    Fallback,
    Backend,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MoodHistorySnapshot {
    pub samples: Vec<MoodSample>,
    pub source: HistorySource,
}

/// Mood trend shown on the dashboard.
///
/// Starts on the built-in week, asks the backend once at mount time, and
/// replaces the whole series only when the backend returns something.
pub struct MoodHistoryView {
    state: Arc<Mutex<MoodHistorySnapshot>>,
}

impl MoodHistoryView {
    /// Mounts the view. The handle resolves once the one history request settles.
    pub fn mount(backend: Arc<dyn Backend>, events: EventEmitter) -> (Self, JoinHandle<()>) {
        let state = Arc::new(Mutex::new(MoodHistorySnapshot {
            samples: default_mood_history(),
            source: HistorySource::Fallback,
        }));

        let weak = Arc::downgrade(&state);
        let handle = tokio::spawn(async move {
            let fetched = backend.fetch_mood_history().await;
            let Some(state) = weak.upgrade() else {
                log::debug!("Mood history view closed before history arrived");
                return;
            };

            match fetched {
                Some(samples) if !samples.is_empty() => {
                    log::info!("Loaded {} mood samples from backend", samples.len());
                    let snapshot = {
                        let mut state = lock(&state);
                        *state = MoodHistorySnapshot {
                            samples,
                            source: HistorySource::Backend,
                        };
                        state.clone()
                    };
                    events.emit(MOOD_HISTORY_CHANGED, &snapshot);
                }
                _ => log::info!("No mood history from backend; keeping default week"),
            }
        });

        (Self { state }, handle)
    }

    pub fn snapshot(&self) -> MoodHistorySnapshot {
        lock(&self.state).clone()
    }
}
