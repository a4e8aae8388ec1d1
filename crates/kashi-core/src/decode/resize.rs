//! Downscaling for photo grid thumbnails.

use super::{DecodeError, DecodedImage, FilterType};

/// Scale an image so its longest edge is at most `max_edge`, keeping the
/// aspect ratio. Images that already fit are returned unchanged (no upscaling).
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` for a zero `max_edge` or an empty image.
pub fn resize_to_fit(
    image: &DecodedImage,
    max_edge: u32,
    filter: FilterType,
) -> Result<DecodedImage, DecodeError> {
    if max_edge == 0 || image.is_empty() {
        return Err(DecodeError::InvalidFormat);
    }

    if image.width <= max_edge && image.height <= max_edge {
        return Ok(image.clone());
    }

    let (width, height) = fit_dimensions(image.width, image.height, max_edge);
    let rgb_image = image
        .to_rgb_image()
        .ok_or_else(|| DecodeError::CorruptedFile("pixel buffer size mismatch".to_string()))?;

    let resized = image::imageops::resize(&rgb_image, width, height, filter.to_image_filter());
    Ok(DecodedImage::from_rgb_image(resized))
}

/// Thumbnail for the listing photo grid (bilinear, fits a `size` square).
pub fn generate_thumbnail(image: &DecodedImage, size: u32) -> Result<DecodedImage, DecodeError> {
    resize_to_fit(image, size, FilterType::Bilinear)
}

fn fit_dimensions(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    let ratio = width as f64 / height as f64;

    if width >= height {
        let h = (max_edge as f64 / ratio).round() as u32;
        (max_edge, h.max(1))
    } else {
        let w = (max_edge as f64 * ratio).round() as u32;
        (w.max(1), max_edge)
    }
}
