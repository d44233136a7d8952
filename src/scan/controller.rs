use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::state::{ScanState, ScanStatus, ANALYSIS_FAILED, FRAME_CAPTURE_FAILED};
use crate::{
    capture::{CameraDevice, CameraSnapshot, CameraStatus, CaptureSession},
    events::{EventEmitter, CAMERA_STATE_CHANGED, SCAN_STATE_CHANGED},
    gateway::Backend,
    models::EmotionResult,
    settings::CaptureSettings,
    utils::sync::lock,
};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info};

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScanSnapshot {
    pub status: ScanStatus,
    pub result: Option<EmotionResult>,
    pub error: Option<String>,
    pub mood_score: Option<u8>,
    pub completed_at: Option<DateTime<Utc>>,
    pub camera: CameraSnapshot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanRejection {
    AlreadyScanning,
    CameraNotLive,
}

#[derive(Debug)]
pub enum ScanTrigger {
    /// The guard refused the scan; nothing changed.
    Rejected(ScanRejection),
    /// Entered `Scanning` but the frame could not be taken; the error is set.
    CaptureFailed,
    /// Analysis is in flight. The handle resolves once the result is shown
    /// and the derived mood score has been handed to the backend.
    Started(JoinHandle<()>),
}

/// State owned by a mounted scan view. Response handlers only ever hold a
/// `Weak` to it, so an unmounted view simply stops receiving updates.
struct ScanView {
    capture: Mutex<CaptureSession>,
    state: Mutex<ScanState>,
}

/// The mounted emotion-scan view: camera session plus analysis workflow.
///
/// At most one analysis is outstanding at a time; a scan is only accepted
/// while the camera is live.
pub struct ScanController {
    id: String,
    view: Arc<ScanView>,
    backend: Arc<dyn Backend>,
    events: EventEmitter,
}

impl ScanController {
    /// Mounts the view and starts requesting the camera in the background.
    pub fn mount(
        device: Arc<dyn CameraDevice>,
        settings: CaptureSettings,
        backend: Arc<dyn Backend>,
        events: EventEmitter,
    ) -> Self {
        let controller = Self {
            id: Uuid::new_v4().to_string(),
            view: Arc::new(ScanView {
                capture: Mutex::new(CaptureSession::new(device, settings)),
                state: Mutex::new(ScanState::new()),
            }),
            backend,
            events,
        };
        log_info!("Scan view {} mounted", controller.id);
        controller.start_camera();
        controller
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn snapshot(&self) -> ScanSnapshot {
        snapshot_of(&self.view)
    }

    pub fn camera_status(&self) -> CameraStatus {
        lock(&self.view.capture).status()
    }

    /// Requests the camera. `None` when a request is already running or the
    /// camera is live; the handle resolves once the request settles.
    pub fn start_camera(&self) -> Option<JoinHandle<()>> {
        let (device, settings) = {
            let mut capture = lock(&self.view.capture);
            if !capture.begin_request() {
                return None;
            }
            (capture.device(), capture.settings())
        };
        self.events
            .emit(CAMERA_STATE_CHANGED, &lock(&self.view.capture).snapshot());

        let weak = Arc::downgrade(&self.view);
        let events = self.events.clone();
        Some(tokio::spawn(async move {
            let opened = device.open(&settings).await;
            match weak.upgrade() {
                Some(view) => {
                    let snapshot = {
                        let mut capture = lock(&view.capture);
                        capture.finish_request(opened);
                        capture.snapshot()
                    };
                    events.emit(CAMERA_STATE_CHANGED, &snapshot);
                }
                None => {
                    if let Ok(mut stream) = opened {
                        log_debug!("Scan view gone before camera was granted; releasing");
                        stream.release();
                    }
                }
            }
        }))
    }

    /// Manual retry after a camera failure. Never automatic.
    pub fn retry_camera(&self) -> Option<JoinHandle<()>> {
        if self.camera_status() != CameraStatus::Error {
            return None;
        }
        self.start_camera()
    }

    /// Captures a still and sends it for analysis.
    pub fn trigger_scan(&self) -> ScanTrigger {
        let captured = {
            let mut state = lock(&self.view.state);
            if state.is_scanning() {
                log_debug!("Scan {} ignored: analysis already in flight", self.id);
                return ScanTrigger::Rejected(ScanRejection::AlreadyScanning);
            }
            let mut capture = lock(&self.view.capture);
            if !capture.is_live() {
                log_debug!("Scan {} ignored: camera is {:?}", self.id, capture.status());
                return ScanTrigger::Rejected(ScanRejection::CameraNotLive);
            }
            state.begin();
            capture.capture_frame()
        };
        self.emit_state();

        let frame = match captured {
            Ok(frame) => frame,
            Err(err) => {
                log_error!("Frame capture failed for scan {}: {err:#}", self.id);
                lock(&self.view.state).fail(FRAME_CAPTURE_FAILED);
                self.emit_state();
                return ScanTrigger::CaptureFailed;
            }
        };
        log_info!(
            "Scan {} captured {} byte frame; requesting analysis",
            self.id,
            frame.as_bytes().len()
        );

        let weak = Arc::downgrade(&self.view);
        let backend = self.backend.clone();
        let events = self.events.clone();
        let scan_id = self.id.clone();

        ScanTrigger::Started(tokio::spawn(async move {
            let analysis = backend.analyze_image(frame).await;
            let mood = analysis
                .as_ref()
                .map(|result| (result.mood_score(), result.emotion.clone()));

            match weak.upgrade() {
                Some(view) => {
                    {
                        let mut state = lock(&view.state);
                        match analysis {
                            Some(result) => state.complete(result),
                            None => state.fail(ANALYSIS_FAILED),
                        }
                    }
                    events.emit(SCAN_STATE_CHANGED, &snapshot_of(&view));
                }
                None => {
                    log_debug!("Scan view {} unmounted; discarding analysis response", scan_id);
                }
            }

            // Best effort, after the result is already on screen.
            if let Some((score, label)) = mood {
                log_info!("Scan {} persisting mood {} ({})", scan_id, score, label);
                backend.persist_mood(score, &label).await;
            }
        }))
    }

    /// Tears the view down. The camera is released even if an analysis is
    /// still in flight; its eventual response is discarded.
    pub fn unmount(self) {
        lock(&self.view.capture).stop();
        self.events
            .emit(CAMERA_STATE_CHANGED, &lock(&self.view.capture).snapshot());
        log_info!("Scan view {} unmounted", self.id);
    }

    fn emit_state(&self) {
        self.events.emit(SCAN_STATE_CHANGED, &self.snapshot());
    }
}

fn snapshot_of(view: &ScanView) -> ScanSnapshot {
    let state = lock(&view.state).clone();
    let camera = lock(&view.capture).snapshot();
    ScanSnapshot {
        status: state.status,
        mood_score: state.mood_score(),
        result: state.result,
        error: state.error,
        completed_at: state.completed_at,
        camera,
    }
}
