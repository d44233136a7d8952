//! Camera capture session: owns the live feed while the scan view is mounted
//! and turns it into still frames on demand.

pub mod camera;
pub mod frame;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::settings::CaptureSettings;

pub use camera::{CameraDevice, CameraStream, NoCamera, StillImageCamera};
pub use frame::CaptureFrame;

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

pub const CAMERA_ACCESS_ERROR: &str = "Unable to access camera. Please check permissions.";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum CameraStatus {
    #[default]
    Unstarted,
    Requesting,
    Live,
    Error,
    Stopped,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CameraSnapshot {
    pub status: CameraStatus,
    pub error: Option<String>,
}

/// Live camera feed plus its lifecycle state.
///
/// `Unstarted → Requesting → Live → (Error | Stopped)`. The stream is released
/// on `stop` and on drop, so no exit path can leak the camera.
pub struct CaptureSession {
    device: Arc<dyn CameraDevice>,
    settings: CaptureSettings,
    status: CameraStatus,
    stream: Option<Box<dyn CameraStream>>,
    error: Option<String>,
}

impl CaptureSession {
    pub fn new(device: Arc<dyn CameraDevice>, settings: CaptureSettings) -> Self {
        Self {
            device,
            settings,
            status: CameraStatus::Unstarted,
            stream: None,
            error: None,
        }
    }

    pub fn status(&self) -> CameraStatus {
        self.status
    }

    pub fn is_live(&self) -> bool {
        self.status == CameraStatus::Live
    }

    pub fn snapshot(&self) -> CameraSnapshot {
        CameraSnapshot {
            status: self.status,
            error: self.error.clone(),
        }
    }

    pub fn device(&self) -> Arc<dyn CameraDevice> {
        self.device.clone()
    }

    pub fn settings(&self) -> CaptureSettings {
        self.settings
    }

    /// Enters `Requesting`. Only valid from `Unstarted` or, as a retry, from `Error`.
    pub fn begin_request(&mut self) -> bool {
        match self.status {
            CameraStatus::Unstarted | CameraStatus::Error => {
                self.status = CameraStatus::Requesting;
                self.error = None;
                true
            }
            _ => false,
        }
    }

    /// Completes a request started with [`begin_request`](Self::begin_request).
    ///
    /// The stream is bound with a warm-up grab; if that fails it is released
    /// before the session enters `Error`. A stream that arrives after the
    /// session was stopped is released immediately.
    pub fn finish_request(&mut self, opened: Result<Box<dyn CameraStream>>) {
        if self.status != CameraStatus::Requesting {
            if let Ok(mut stream) = opened {
                log_info!("Camera granted after teardown; releasing it");
                stream.release();
            }
            return;
        }

        let bound = opened.and_then(|mut stream| match stream.grab() {
            Ok(_) => Ok(stream),
            Err(err) => {
                stream.release();
                Err(err)
            }
        });

        match bound {
            Ok(stream) => {
                self.stream = Some(stream);
                self.status = CameraStatus::Live;
                self.error = None;
                log_info!("Camera live");
            }
            Err(err) => {
                log_warn!("Camera access error: {err:#}");
                self.status = CameraStatus::Error;
                self.error = Some(CAMERA_ACCESS_ERROR.to_string());
            }
        }
    }

    /// Requests the camera and waits for it.
    pub async fn start(&mut self) -> CameraStatus {
        if self.begin_request() {
            let opened = self.device.open(&self.settings).await;
            self.finish_request(opened);
        }
        self.status
    }

    /// Re-attempts a failed request. Does nothing unless the session is in `Error`.
    pub async fn retry(&mut self) -> CameraStatus {
        if self.status != CameraStatus::Error {
            return self.status;
        }
        self.start().await
    }

    /// Snapshots the feed into an encoded still. Synchronous, no network I/O.
    pub fn capture_frame(&mut self) -> Result<CaptureFrame> {
        if self.status != CameraStatus::Live {
            bail!("camera is not live ({:?})", self.status);
        }
        let Some(stream) = self.stream.as_mut() else {
            bail!("camera is live without a stream");
        };
        let image = stream.grab()?;
        CaptureFrame::encode(&image, &self.settings)
    }

    /// Releases the feed. Idempotent.
    pub fn stop(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.release();
            log_info!("Camera tracks released");
        }
        self.status = CameraStatus::Stopped;
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use async_trait::async_trait;
    use image::{DynamicImage, Rgb, RgbImage};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Fake camera that counts opens and releases.
    #[derive(Default)]
    pub struct FakeCamera {
        pub deny: AtomicBool,
        pub blank_feed: Arc<AtomicBool>,
        pub opens: AtomicUsize,
        pub releases: Arc<AtomicUsize>,
    }

    impl FakeCamera {
        pub fn releases(&self) -> usize {
            self.releases.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CameraDevice for FakeCamera {
        async fn open(&self, _constraints: &CaptureSettings) -> Result<Box<dyn CameraStream>> {
            self.opens.fetch_add(1, Ordering::SeqCst);
            if self.deny.load(Ordering::SeqCst) {
                bail!("permission denied");
            }
            Ok(Box::new(FakeStream {
                blank: self.blank_feed.clone(),
                releases: self.releases.clone(),
            }))
        }
    }

    struct FakeStream {
        blank: Arc<AtomicBool>,
        releases: Arc<AtomicUsize>,
    }

    impl CameraStream for FakeStream {
        fn grab(&mut self) -> Result<DynamicImage> {
            if self.blank.load(Ordering::SeqCst) {
                bail!("no frame on feed");
            }
            Ok(DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 48, Rgb([200, 180, 160]))))
        }

        fn release(&mut self) {
            self.releases.fetch_add(1, Ordering::SeqCst);
        }
    }
}
