//! Editor configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default cap on photos per listing.
pub const DEFAULT_MAX_PHOTOS: usize = 20;

/// Default minimum crop edge, in display pixels.
pub const DEFAULT_MIN_CROP_SIZE: f64 = 10.0;

/// Default JPEG quality for exported edits.
pub const DEFAULT_JPEG_QUALITY: u8 = 92;

/// Default max edge of grid thumbnails.
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 256;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("max_photos must be at least 1")]
    NoPhotosAllowed,

    #[error("jpeg_quality must be between 1 and 100, got {0}")]
    InvalidQuality(u8),

    #[error("min_crop_size must be a positive number, got {0}")]
    InvalidMinCropSize(f64),

    #[error("thumbnail_size must be at least 1")]
    InvalidThumbnailSize,
}

/// Tunables for the photo editor. Missing fields take their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub max_photos: usize,
    pub min_crop_size: f64,
    pub jpeg_quality: u8,
    pub thumbnail_size: u32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_photos: DEFAULT_MAX_PHOTOS,
            min_crop_size: DEFAULT_MIN_CROP_SIZE,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            thumbnail_size: DEFAULT_THUMBNAIL_SIZE,
        }
    }
}

impl EditorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_photos == 0 {
            return Err(ConfigError::NoPhotosAllowed);
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConfigError::InvalidQuality(self.jpeg_quality));
        }
        if !self.min_crop_size.is_finite() || self.min_crop_size <= 0.0 {
            return Err(ConfigError::InvalidMinCropSize(self.min_crop_size));
        }
        if self.thumbnail_size == 0 {
            return Err(ConfigError::InvalidThumbnailSize);
        }
        Ok(())
    }
}
