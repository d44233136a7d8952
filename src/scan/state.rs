use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::EmotionResult;

pub const ANALYSIS_FAILED: &str =
    "Emotion analysis failed. Make sure the MindCare backend is running.";
pub const FRAME_CAPTURE_FAILED: &str = "Could not capture a frame from the camera.";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum ScanStatus {
    #[default]
    Idle,
    Scanning,
}

/// `Idle → Scanning → Idle` with either a result or an error attached.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScanState {
    pub status: ScanStatus,
    pub result: Option<EmotionResult>,
    pub error: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ScanState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_scanning(&self) -> bool {
        self.status == ScanStatus::Scanning
    }

    /// Enters `Scanning`, clearing the previous result and error.
    pub fn begin(&mut self) {
        *self = Self {
            status: ScanStatus::Scanning,
            ..Self::default()
        };
    }

    pub fn complete(&mut self, result: EmotionResult) {
        self.status = ScanStatus::Idle;
        self.result = Some(result);
        self.error = None;
        self.completed_at = Some(Utc::now());
    }

    pub fn fail(&mut self, message: &str) {
        self.status = ScanStatus::Idle;
        self.result = None;
        self.error = Some(message.to_string());
        self.completed_at = Some(Utc::now());
    }

    pub fn mood_score(&self) -> Option<u8> {
        self.result.as_ref().map(EmotionResult::mood_score)
    }
}
