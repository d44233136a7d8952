use std::{sync::Arc, time::Duration};

use anyhow::{anyhow, Result};
use chrono::Utc;
use log::{debug, info};
use serde::Serialize;
use tokio::{sync::Mutex, task::JoinHandle, time};
use tokio_util::sync::CancellationToken;

use super::state::{BreathingState, BreathingStatus};
use crate::events::{EventEmitter, BREATHING_STATE_CHANGED};

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BreathingSnapshot {
    pub state: BreathingState,
    pub elapsed_secs: i64,
}

struct Ticker {
    handle: JoinHandle<()>,
    cancel: CancellationToken,
}

#[derive(Clone)]
pub struct BreathingController {
    state: Arc<Mutex<BreathingState>>,
    ticker: Arc<Mutex<Option<Ticker>>>,
    events: EventEmitter,
    tick_interval: Duration,
    emit_every_tick: bool,
}

impl BreathingController {
    pub fn new(events: EventEmitter) -> Self {
        let debug_mode = std::env::var("MINDCARE_DEBUG")
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Self {
            state: Arc::new(Mutex::new(BreathingState::default())),
            ticker: Arc::new(Mutex::new(None)),
            events,
            tick_interval: Duration::from_secs(1),
            emit_every_tick: debug_mode,
        }
    }

    pub async fn get_snapshot(&self) -> BreathingSnapshot {
        let guard = self.state.lock().await;
        snapshot_of(&guard)
    }

    pub async fn start(&self, phase_secs: u32) -> Result<BreathingSnapshot> {
        {
            let mut state = self.state.lock().await;
            if state.status == BreathingStatus::Running {
                return Err(anyhow!("breathing exercise already running"));
            }
            state.begin(phase_secs, Utc::now());
        }
        info!("Breathing exercise started ({}s phases)", phase_secs.max(1));

        self.spawn_ticker().await;
        let snapshot = self.get_snapshot().await;
        self.events.emit(BREATHING_STATE_CHANGED, &snapshot);
        Ok(snapshot)
    }

    /// Stops the exercise. Stopping an idle exercise is a no-op.
    pub async fn stop(&self) -> BreathingSnapshot {
        self.cancel_ticker().await;
        let snapshot = {
            let mut state = self.state.lock().await;
            if state.status == BreathingStatus::Running {
                info!(
                    "Breathing exercise stopped after {} cycles",
                    state.cycle.completed_cycles
                );
            }
            state.stop();
            snapshot_of(&state)
        };
        self.events.emit(BREATHING_STATE_CHANGED, &snapshot);
        snapshot
    }

    async fn spawn_ticker(&self) {
        let mut ticker_guard = self.ticker.lock().await;
        if let Some(old) = ticker_guard.take() {
            old.cancel.cancel();
            old.handle.abort();
        }

        let state = self.state.clone();
        let events = self.events.clone();
        let tick_interval = self.tick_interval;
        let emit_every_tick = self.emit_every_tick;
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            let mut interval = time::interval(tick_interval);
            // the first tick completes immediately
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = interval.tick() => {}
                    _ = token.cancelled() => {
                        debug!("breathing ticker shutting down");
                        break;
                    }
                }

                let (snapshot, changed) = {
                    let mut guard = state.lock().await;
                    if guard.status != BreathingStatus::Running {
                        break;
                    }
                    let changed = guard.cycle.tick();
                    (snapshot_of(&guard), changed)
                };

                if changed || emit_every_tick {
                    events.emit(BREATHING_STATE_CHANGED, &snapshot);
                }
            }
        });

        *ticker_guard = Some(Ticker { handle, cancel });
    }

    async fn cancel_ticker(&self) {
        if let Some(ticker) = self.ticker.lock().await.take() {
            ticker.cancel.cancel();
            let _ = ticker.handle.await;
        }
    }
}

fn snapshot_of(state: &BreathingState) -> BreathingSnapshot {
    let elapsed_secs = state
        .started_at
        .filter(|_| state.status == BreathingStatus::Running)
        .map(|started| (Utc::now() - started).num_seconds())
        .unwrap_or(0);
    BreathingSnapshot {
        state: state.clone(),
        elapsed_secs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breathing::BreathPhase;

    #[tokio::test(start_paused = true)]
    async fn ticker_rotates_phases_and_emits_changes() {
        let events = EventEmitter::new();
        let mut rx = events.subscribe();
        let controller = BreathingController::new(events);

        let started = controller.start(4).await.unwrap();
        assert_eq!(started.state.status, BreathingStatus::Running);
        assert_eq!(rx.recv().await.unwrap().name, BREATHING_STATE_CHANGED);

        time::sleep(Duration::from_millis(4_500)).await;

        let snapshot = controller.get_snapshot().await;
        assert_eq!(snapshot.state.cycle.phase, BreathPhase::Hold);
        assert_eq!(snapshot.state.cycle.remaining_secs, 4);
        let event = rx.recv().await.unwrap();
        assert_eq!(event.payload["state"]["cycle"]["phase"], "Hold");

        controller.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn second_start_is_refused_until_stopped() {
        let controller = BreathingController::new(EventEmitter::new());
        controller.start(4).await.unwrap();
        assert!(controller.start(4).await.is_err());

        let stopped = controller.stop().await;
        assert_eq!(stopped.state.status, BreathingStatus::Idle);

        time::sleep(Duration::from_secs(10)).await;
        let after = controller.get_snapshot().await;
        assert_eq!(after.state.cycle, stopped.state.cycle);

        assert!(controller.start(2).await.is_ok());
        controller.stop().await;
    }

    #[tokio::test]
    async fn stopping_idle_exercise_is_a_no_op() {
        let controller = BreathingController::new(EventEmitter::new());
        let snapshot = controller.stop().await;
        assert_eq!(snapshot.state.status, BreathingStatus::Idle);
        assert_eq!(snapshot.elapsed_secs, 0);
    }
}
