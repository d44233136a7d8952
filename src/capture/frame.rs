use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{codecs::jpeg::JpegEncoder, imageops::FilterType, DynamicImage};

use crate::settings::CaptureSettings;

/// A single JPEG still taken from the live feed.
///
/// Handed by value to the analysis request and dropped once it completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureFrame {
    jpeg: Vec<u8>,
    width: u32,
    height: u32,
}

impl CaptureFrame {
    /// Scales `image` to the configured capture size and JPEG-encodes it.
    pub fn encode(image: &DynamicImage, settings: &CaptureSettings) -> Result<Self> {
        let (width, height) = (settings.width.max(1), settings.height.max(1));
        let rgb = if image.width() == width && image.height() == height {
            image.to_rgb8()
        } else {
            image.resize_exact(width, height, FilterType::Triangle).to_rgb8()
        };

        let mut jpeg = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut jpeg, settings.jpeg_quality.clamp(1, 100));
        encoder
            .encode_image(&rgb)
            .context("failed to encode capture frame as JPEG")?;

        Ok(Self { jpeg, width, height })
    }

    pub fn from_jpeg(jpeg: Vec<u8>, width: u32, height: u32) -> Self {
        Self { jpeg, width, height }
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.jpeg)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.jpeg
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
