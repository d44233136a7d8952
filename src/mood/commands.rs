use crate::{
    mood::{DashboardSummary, MoodHistorySnapshot},
    AppState, Page,
};

/// Opens the dashboard, which asks the backend for history once per visit.
pub(crate) async fn open_dashboard(state: &AppState) -> Result<MoodHistorySnapshot, String> {
    state.navigate(Page::Dashboard).await;
    get_mood_history(state)
}

pub(crate) fn get_mood_history(state: &AppState) -> Result<MoodHistorySnapshot, String> {
    state.with_history(|history| Ok(history.snapshot()))
}

pub(crate) async fn get_dashboard_summary(state: &AppState) -> Result<DashboardSummary, String> {
    let history = open_dashboard(state).await?;
    Ok(DashboardSummary::from_history(history.samples))
}
