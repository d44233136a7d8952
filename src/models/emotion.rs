use serde::{Deserialize, Serialize};

/// Facial emotion analysis returned by the vision backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmotionResult {
    pub emotion: String,
    /// 0.0 to 1.0
    pub confidence: f64,
    /// 0 to 100
    pub stress_level: f64,
    pub advice: String,
}

impl EmotionResult {
    pub fn mood_score(&self) -> u8 {
        mood_score_from_stress(self.stress_level)
    }

    /// Stress level as a whole percentage for the stress bar.
    pub fn stress_percent(&self) -> u8 {
        clamp_percent(self.stress_level)
    }
}

/// Mood score derived from a stress reading: `100 - stress`, using the same
/// rounding as the stress bar so the two always add up to 100. A NaN reading
/// scores 0.
pub fn mood_score_from_stress(stress_level: f64) -> u8 {
    if stress_level.is_nan() {
        return 0;
    }
    100 - clamp_percent(stress_level)
}

pub(crate) fn clamp_percent(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}
