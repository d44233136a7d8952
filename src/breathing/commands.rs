use crate::{breathing::BreathingSnapshot, AppState, Page};

pub(crate) async fn get_breathing_state(state: &AppState) -> Result<BreathingSnapshot, String> {
    Ok(state.breathing.get_snapshot().await)
}

pub(crate) async fn start_breathing(state: &AppState) -> Result<BreathingSnapshot, String> {
    state.navigate(Page::Relief).await;
    let phase_secs = state.settings.snapshot().breathing.phase_secs;
    state
        .breathing
        .start(phase_secs)
        .await
        .map_err(|e| e.to_string())
}

pub(crate) async fn stop_breathing(state: &AppState) -> Result<BreathingSnapshot, String> {
    Ok(state.breathing.stop().await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breathing::BreathingStatus;
    use crate::capture::testing::FakeCamera;
    use crate::gateway::testing::FakeBackend;
    use crate::testing::app_state;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn leaving_relief_page_stops_the_exercise() {
        let (state, _dir) = app_state(
            Arc::new(FakeBackend::new()),
            Arc::new(FakeCamera::default()),
        );

        let started = start_breathing(&state).await.unwrap();
        assert_eq!(started.state.status, BreathingStatus::Running);
        assert_eq!(started.state.cycle.phase_secs, 4);
        assert!(start_breathing(&state).await.is_err());

        state.navigate(Page::Support).await;
        let after = get_breathing_state(&state).await.unwrap();
        assert_eq!(after.state.status, BreathingStatus::Idle);

        let stopped = stop_breathing(&state).await.unwrap();
        assert_eq!(stopped.state.status, BreathingStatus::Idle);
    }
}
