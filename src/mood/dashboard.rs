use serde::Serialize;

use crate::models::MoodSample;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StressSource {
    pub name: &'static str,
    pub value: u8,
}

/// Where stress comes from, as shown on the dashboard breakdown.
pub const STRESS_SOURCES: [StressSource; 4] = [
    StressSource { name: "Work", value: 45 },
    StressSource { name: "Health", value: 20 },
    StressSource { name: "Finance", value: 15 },
    StressSource { name: "Social", value: 20 },
];

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub trend: Vec<MoodSample>,
    pub average_score: f64,
    pub best_day: Option<MoodSample>,
    pub latest: Option<MoodSample>,
    pub stress_sources: Vec<StressSource>,
}

impl DashboardSummary {
    pub fn from_history(trend: Vec<MoodSample>) -> Self {
        let average_score = if trend.is_empty() {
            0.0
        } else {
            trend.iter().map(|s| s.score as f64).sum::<f64>() / trend.len() as f64
        };
        // first of equals wins
        let best_day = trend
            .iter()
            .fold(None::<&MoodSample>, |best, sample| match best {
                Some(b) if b.score >= sample.score => Some(b),
                _ => Some(sample),
            })
            .cloned();

        Self {
            average_score,
            best_day,
            latest: trend.last().cloned(),
            stress_sources: STRESS_SOURCES.to_vec(),
            trend,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::default_mood_history;

    #[test]
    fn summarizes_default_week() {
        let summary = DashboardSummary::from_history(default_mood_history());

        assert!((summary.average_score - 498.0 / 7.0).abs() < 1e-9);
        assert_eq!(summary.best_day.unwrap().day, "Sat");
        assert_eq!(summary.latest.unwrap().day, "Sun");
        assert_eq!(
            summary.stress_sources.iter().map(|s| s.value as u32).sum::<u32>(),
            100
        );
    }

    #[test]
    fn empty_trend_has_no_highlights() {
        let summary = DashboardSummary::from_history(Vec::new());
        assert_eq!(summary.average_score, 0.0);
        assert!(summary.best_day.is_none());
        assert!(summary.latest.is_none());
    }
}
