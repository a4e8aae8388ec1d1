//! Renderer/Exporter.
//!
//! Maps a display-space crop selection onto the native pixels of the
//! decoded image and encodes the result as JPEG.
//!
//! # Coordinate spaces
//!
//! The editor shows the photo scaled to fit its container, so a selection of
//! `{50, 50, 100, 100}` on an 800x600 photo drawn at 400x300 really covers
//! native pixels `{100, 100, 200, 200}`. [`to_native_rect`] is the only place
//! that conversion happens.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::DecodedImage;
use crate::encode::{encode_jpeg, EncodeError};
use crate::geometry::CropRegion;
use crate::source::EncodedBlob;
use crate::transform::{crop_pixels, PixelRect};

/// Errors that can occur while exporting an edit.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The on-screen size is zero, negative or not a number.
    #[error("Invalid display size: {width}x{height}")]
    InvalidDisplaySize { width: f64, height: f64 },

    /// The encoder returned no bytes.
    #[error("Export produced no image data")]
    EmptyOutput,

    /// The encoder rejected the cropped pixels.
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Size at which the image is drawn on screen, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplaySize {
    pub width: f64,
    pub height: f64,
}

impl DisplaySize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Display size equal to the natural size (no CSS scaling).
    pub fn natural(image: &DecodedImage) -> Self {
        Self::new(image.width as f64, image.height as f64)
    }

    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Same drawing after a quarter turn.
    pub fn swapped(self) -> Self {
        Self::new(self.height, self.width)
    }
}

/// Convert a display-space region into native pixel space.
///
/// `scale_x = natural_width / display_width` (likewise for y); each edge is
/// scaled and rounded, then the rectangle is clamped into the image with a
/// 1x1 minimum.
pub fn to_native_rect(
    region: &CropRegion,
    natural_width: u32,
    natural_height: u32,
    display: DisplaySize,
) -> Result<PixelRect, ExportError> {
    if !display.is_valid() {
        return Err(ExportError::InvalidDisplaySize {
            width: display.width,
            height: display.height,
        });
    }

    let scale_x = natural_width as f64 / display.width;
    let scale_y = natural_height as f64 / display.height;

    let to_px = |v: f64, scale: f64| -> u32 {
        let scaled = (v * scale).round();
        if scaled.is_finite() && scaled > 0.0 {
            scaled.min(u32::MAX as f64) as u32
        } else {
            0
        }
    };

    let rect = PixelRect::new(
        to_px(region.x, scale_x),
        to_px(region.y, scale_y),
        to_px(region.width, scale_x),
        to_px(region.height, scale_y),
    );
    Ok(rect.clamped_to(natural_width, natural_height))
}

/// Crop `image` to `region` without encoding.
pub fn render_crop(
    image: &DecodedImage,
    display: DisplaySize,
    region: &CropRegion,
) -> Result<DecodedImage, ExportError> {
    let rect = to_native_rect(region, image.width, image.height, display)?;
    Ok(crop_pixels(image, rect))
}

/// Crop `image` to `region` and encode it as JPEG.
///
/// The output has exactly the (rounded) native crop dimensions. Exporting the
/// same image and region twice yields identical bytes.
pub fn export(
    image: &DecodedImage,
    display: DisplaySize,
    region: &CropRegion,
    quality: u8,
) -> Result<EncodedBlob, ExportError> {
    let cropped = render_crop(image, display, region)?;
    let bytes = encode_jpeg(&cropped.pixels, cropped.width, cropped.height, quality)?;

    if bytes.is_empty() {
        return Err(ExportError::EmptyOutput);
    }

    tracing::debug!(
        width = cropped.width,
        height = cropped.height,
        bytes = bytes.len(),
        "exported crop"
    );
    Ok(EncodedBlob::jpeg(bytes))
}
