pub mod commands;
pub mod dashboard;
pub mod history;

pub use dashboard::{DashboardSummary, StressSource};
pub use history::{HistorySource, MoodHistorySnapshot, MoodHistoryView};
