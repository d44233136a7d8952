use serde::{Deserialize, Deserializer, Serialize};

use super::emotion::clamp_percent;

/// One point on the mood trend chart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoodSample {
    pub day: String,
    #[serde(deserialize_with = "deserialize_score")]
    pub score: u8,
    pub label: String,
}

impl MoodSample {
    pub fn new(day: &str, score: u8, label: &str) -> Self {
        Self {
            day: day.to_string(),
            score: score.min(100),
            label: label.to_string(),
        }
    }
}

// Chart scaling assumes 0..=100, whatever the backend stored.
fn deserialize_score<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    Ok(clamp_percent(raw))
}

/// Week shown until the backend answers, and whenever it has nothing to offer.
pub fn default_mood_history() -> Vec<MoodSample> {
    vec![
        MoodSample::new("Mon", 65, "Stable"),
        MoodSample::new("Tue", 40, "Stressed"),
        MoodSample::new("Wed", 85, "Happy"),
        MoodSample::new("Thu", 70, "Calm"),
        MoodSample::new("Fri", 60, "Tired"),
        MoodSample::new("Sat", 90, "Excellent"),
        MoodSample::new("Sun", 88, "Relaxed"),
    ]
}
