//! Cropping in native pixel space.
//!
//! Takes a rectangle already converted to native pixels (see
//! [`crate::render::to_native_rect`]) and copies that area into a new
//! bitmap. This is the off-screen "draw source rect onto a fresh surface"
//! step of the export, without any scaling.

use serde::{Deserialize, Serialize};

use crate::decode::DecodedImage;

/// Axis-aligned rectangle in native pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle covering a whole `width` x `height` image.
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Clamp into a `width` x `height` image, keeping at least 1x1.
    pub fn clamped_to(self, width: u32, height: u32) -> Self {
        let x = self.x.min(width.saturating_sub(1));
        let y = self.y.min(height.saturating_sub(1));
        let right = x.saturating_add(self.width).min(width);
        let bottom = y.saturating_add(self.height).min(height);

        Self {
            x,
            y,
            width: right.saturating_sub(x).max(1),
            height: bottom.saturating_sub(y).max(1),
        }
    }
}

/// Copy the pixels under `rect` into a new image.
///
/// The rectangle is clamped to the image bounds first, and the output is
/// never smaller than 1x1.
pub fn crop_pixels(image: &DecodedImage, rect: PixelRect) -> DecodedImage {
    let rect = rect.clamped_to(image.width, image.height);

    if rect == PixelRect::full(image.width, image.height) {
        return image.clone();
    }

    let row_bytes = (rect.width * 3) as usize;
    let mut output = Vec::with_capacity(row_bytes * rect.height as usize);

    for y in rect.y..rect.y + rect.height {
        let start = ((y * image.width + rect.x) * 3) as usize;
        output.extend_from_slice(&image.pixels[start..start + row_bytes]);
    }

    DecodedImage {
        width: rect.width,
        height: rect.height,
        pixels: output,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Each pixel's value encodes its position.
    fn test_image(width: u32, height: u32) -> DecodedImage {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                let v = ((y * width + x) % 256) as u8;
                pixels.extend_from_slice(&[v, v, v]);
            }
        }
        DecodedImage::new(width, height, pixels)
    }

    #[test]
    fn test_full_rect_is_copy() {
        let img = test_image(20, 10);
        assert_eq!(crop_pixels(&img, PixelRect::full(20, 10)), img);
    }

    #[test]
    fn test_inner_rect() {
        let img = test_image(10, 10);
        let out = crop_pixels(&img, PixelRect::new(3, 3, 4, 2));

        assert_eq!(out.dimensions(), (4, 2));
        // (3, 3) -> 33
        assert_eq!(out.pixels[0], 33);
        // (3, 4) -> 43
        assert_eq!(out.pixels[(4 * 3) as usize], 43);
    }

    #[test]
    fn test_rect_past_edge_is_clamped() {
        let img = test_image(10, 10);
        let out = crop_pixels(&img, PixelRect::new(8, 8, 50, 50));
        assert_eq!(out.dimensions(), (2, 2));
    }

    #[test]
    fn test_origin_outside_keeps_one_pixel() {
        let img = test_image(10, 10);
        let out = crop_pixels(&img, PixelRect::new(40, 40, 5, 5));
        assert_eq!(out.dimensions(), (1, 1));
        assert_eq!(out.pixels[0], 99);
    }

    #[test]
    fn test_zero_size_becomes_one_pixel() {
        let rect = PixelRect::new(2, 2, 0, 0).clamped_to(10, 10);
        assert_eq!(rect, PixelRect::new(2, 2, 1, 1));
    }
}
