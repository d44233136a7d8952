use anyhow::{Context, Result};
use async_trait::async_trait;
use image::DynamicImage;
use std::path::PathBuf;

use crate::settings::CaptureSettings;

const ENABLE_LOGS: bool = true;

use crate::log_info;

/// Something that can hand out a live camera feed.
#[async_trait]
pub trait CameraDevice: Send + Sync {
    /// Requests access to the camera. May suspend on a permission prompt.
    async fn open(&self, constraints: &CaptureSettings) -> Result<Box<dyn CameraStream>>;
}

/// A live feed. Owned by exactly one capture session.
pub trait CameraStream: Send {
    /// Current image on the feed.
    fn grab(&mut self) -> Result<DynamicImage>;

    /// Stops every underlying track. Called once, on every teardown path.
    fn release(&mut self);
}

/// Camera backed by a still image on disk, served as a live feed.
///
/// Used by the terminal front end, where there is no video surface.
pub struct StillImageCamera {
    path: PathBuf,
}

impl StillImageCamera {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Camera from `MINDCARE_CAMERA_IMAGE`, if set.
    pub fn from_env() -> Option<Self> {
        std::env::var_os("MINDCARE_CAMERA_IMAGE").map(Self::new)
    }
}

#[async_trait]
impl CameraDevice for StillImageCamera {
    async fn open(&self, _constraints: &CaptureSettings) -> Result<Box<dyn CameraStream>> {
        let path = self.path.clone();
        let image = tokio::task::spawn_blocking(move || image::open(&path))
            .await
            .context("camera open worker join failed")?
            .with_context(|| format!("failed to open camera image {}", self.path.display()))?;

        log_info!("Still-image camera opened from {}", self.path.display());
        Ok(Box::new(StillImageStream { image: Some(image) }))
    }
}

struct StillImageStream {
    image: Option<DynamicImage>,
}

impl CameraStream for StillImageStream {
    fn grab(&mut self) -> Result<DynamicImage> {
        self.image
            .clone()
            .context("camera stream already released")
    }

    fn release(&mut self) {
        self.image = None;
    }
}

/// Stand-in for machines without a camera. Every open is refused.
pub struct NoCamera;

#[async_trait]
impl CameraDevice for NoCamera {
    async fn open(&self, _constraints: &CaptureSettings) -> Result<Box<dyn CameraStream>> {
        anyhow::bail!("no camera device configured (set MINDCARE_CAMERA_IMAGE)")
    }
}
