pub mod audio;
pub mod breathing;
pub mod capture;
pub mod chat;
pub mod events;
pub mod gateway;
pub mod models;
pub mod mood;
pub mod scan;
pub mod settings;
pub mod support;
mod terminal;
pub mod utils;

use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use serde::Serialize;

use audio::AudioEngineHandle;
use breathing::BreathingController;
use capture::{CameraDevice, NoCamera, StillImageCamera};
use chat::ChatSession;
use events::EventEmitter;
use gateway::{Backend, HttpGateway};
use models::{SessionContext, User};
use mood::MoodHistoryView;
use scan::ScanController;
use settings::SettingsStore;
use utils::sync::lock;

/// Pages of the client. Exactly one is open at a time; views belonging to the
/// other pages are unmounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Page {
    Home,
    Chat,
    Scan,
    Dashboard,
    Relief,
    Support,
}

/// Views mounted for the open page.
pub(crate) struct Views {
    page: Page,
    chat: Option<ChatSession>,
    scan: Option<ScanController>,
    history: Option<MoodHistoryView>,
}

pub(crate) struct AppState {
    pub(crate) context: SessionContext,
    pub(crate) settings: SettingsStore,
    pub(crate) backend: Arc<dyn Backend>,
    pub(crate) camera: Arc<dyn CameraDevice>,
    pub(crate) events: EventEmitter,
    pub(crate) breathing: BreathingController,
    pub(crate) audio: AudioEngineHandle,
    views: Mutex<Views>,
}

impl AppState {
    pub(crate) fn new(
        settings: SettingsStore,
        backend: Arc<dyn Backend>,
        camera: Arc<dyn CameraDevice>,
    ) -> Self {
        let events = EventEmitter::new();
        Self {
            context: SessionContext::new(settings.user()),
            settings,
            backend,
            camera,
            breathing: BreathingController::new(events.clone()),
            audio: AudioEngineHandle::new(),
            events,
            views: Mutex::new(Views {
                page: Page::Home,
                chat: None,
                scan: None,
                history: None,
            }),
        }
    }

    pub(crate) fn page(&self) -> Page {
        lock(&self.views).page
    }

    /// Opens `page`, unmounting whatever the previous page had mounted.
    /// Opening the page that is already open keeps its views as they are.
    pub(crate) async fn navigate(&self, page: Page) {
        let previous = {
            let mut views = lock(&self.views);
            if views.page == page {
                return;
            }
            let previous = std::mem::replace(&mut views.page, page);

            views.chat = None;
            views.history = None;
            if let Some(scan) = views.scan.take() {
                scan.unmount();
            }

            match page {
                Page::Chat => {
                    views.chat = Some(ChatSession::new(self.backend.clone(), self.events.clone()));
                }
                Page::Scan => {
                    views.scan = Some(ScanController::mount(
                        self.camera.clone(),
                        self.settings.snapshot().capture,
                        self.backend.clone(),
                        self.events.clone(),
                    ));
                }
                Page::Dashboard => {
                    let (history, _loading) =
                        MoodHistoryView::mount(self.backend.clone(), self.events.clone());
                    views.history = Some(history);
                }
                Page::Home | Page::Relief | Page::Support => {}
            }
            previous
        };

        log::info!("Navigated {:?} -> {:?}", previous, page);

        if previous == Page::Relief {
            self.breathing.stop().await;
            if let Err(err) = self.audio.stop() {
                log::warn!("Failed to stop ambient sound: {}", err);
            }
        }
    }

    pub(crate) fn with_chat<T>(
        &self,
        f: impl FnOnce(&ChatSession) -> Result<T, String>,
    ) -> Result<T, String> {
        let views = lock(&self.views);
        let chat = views.chat.as_ref().ok_or("Chat is not open")?;
        f(chat)
    }

    pub(crate) fn with_scan<T>(
        &self,
        f: impl FnOnce(&ScanController) -> Result<T, String>,
    ) -> Result<T, String> {
        let views = lock(&self.views);
        let scan = views.scan.as_ref().ok_or("Emotion scan is not open")?;
        f(scan)
    }

    pub(crate) fn with_history<T>(
        &self,
        f: impl FnOnce(&MoodHistoryView) -> Result<T, String>,
    ) -> Result<T, String> {
        let views = lock(&self.views);
        let history = views.history.as_ref().ok_or("Dashboard is not open")?;
        f(history)
    }
}

pub(crate) fn get_current_user(state: &AppState) -> User {
    state.context.user.clone()
}

fn build_state() -> Result<AppState> {
    let settings = SettingsStore::open_default()?;
    log::info!("Settings loaded from {}", settings.path().display());

    let snapshot = settings.snapshot();
    let context = SessionContext::new(snapshot.user.clone());
    let gateway = HttpGateway::from_settings(&snapshot)?.with_context(context);
    log::info!("Backend gateway at {}", gateway.base_url());

    let camera: Arc<dyn CameraDevice> = match StillImageCamera::from_env() {
        Some(camera) => Arc::new(camera),
        None => {
            log::warn!("MINDCARE_CAMERA_IMAGE not set; emotion scans will report no camera");
            Arc::new(NoCamera)
        }
    };

    Ok(AppState::new(settings, Arc::new(gateway), camera))
}

pub fn run() -> Result<()> {
    utils::logging::init();
    log::info!("MindCare starting up...");

    let state = build_state()?;
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(terminal::run(state))
}


#[cfg(test)]
mod tests {
    use super::testing::app_state;
    use super::*;
    use crate::capture::testing::FakeCamera;
    use crate::capture::CameraStatus;
    use crate::gateway::testing::FakeBackend;

    #[tokio::test]
    async fn leaving_scan_page_releases_camera() {
        let camera = Arc::new(FakeCamera::default());
        let (state, _dir) = app_state(Arc::new(FakeBackend::new()), camera.clone());

        state.navigate(Page::Scan).await;
        while state.with_scan(|scan| Ok(scan.camera_status())).unwrap() == CameraStatus::Requesting
        {
            tokio::task::yield_now().await;
        }

        state.navigate(Page::Chat).await;
        assert_eq!(state.page(), Page::Chat);
        assert_eq!(camera.releases(), 1);
        assert!(state.with_scan(|_| Ok(())).is_err());
    }

    #[tokio::test]
    async fn reopening_current_page_keeps_its_view() {
        let (state, _dir) = app_state(
            Arc::new(FakeBackend::new()),
            Arc::new(FakeCamera::default()),
        );
        state.navigate(Page::Chat).await;
        let first = state.with_chat(|chat| Ok(chat.id().to_string())).unwrap();

        state.navigate(Page::Chat).await;
        let second = state.with_chat(|chat| Ok(chat.id().to_string())).unwrap();
        assert_eq!(first, second);

        state.navigate(Page::Support).await;
        state.navigate(Page::Chat).await;
        let third = state.with_chat(|chat| Ok(chat.id().to_string())).unwrap();
        assert_ne!(first, third);
    }

    #[tokio::test]
    async fn current_user_comes_from_settings() {
        let (state, _dir) = app_state(
            Arc::new(FakeBackend::new()),
            Arc::new(FakeCamera::default()),
        );
        assert_eq!(get_current_user(&state).name, "Alex Johnson");
        assert_eq!(state.page(), Page::Home);
    }
}
