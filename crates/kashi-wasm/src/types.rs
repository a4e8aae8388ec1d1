//! WASM-compatible wrapper types for image data.
//!
//! This module provides JavaScript-friendly types that wrap the core Kashi types,
//! handling the conversion between Rust and JavaScript data representations.

use kashi_core::decode::{DecodedImage, FilterType};
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// A decoded photo for JavaScript.
///
/// # Memory Management
///
/// The pixel data lives in WASM memory. `pixels()` copies it out as a
/// `Uint8Array`; keep the image on the WASM side and only copy when drawing.
#[wasm_bindgen]
pub struct JsDecodedImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsDecodedImage {
    /// Create a new image from dimensions and RGB pixel data (3 bytes per
    /// pixel, row-major).
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> JsDecodedImage {
        JsDecodedImage {
            width,
            height,
            pixels,
        }
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of bytes in the pixel buffer (width * height * 3)
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.pixels.len()
    }

    /// RGB pixel data as a `Uint8Array` copy.
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }

    /// RGBA copy of the pixels, ready for `new ImageData(...)`.
    pub fn rgba_pixels(&self) -> Vec<u8> {
        let mut rgba = Vec::with_capacity(self.pixels.len() / 3 * 4);
        for px in self.pixels.chunks_exact(3) {
            rgba.extend_from_slice(&[px[0], px[1], px[2], 255]);
        }
        rgba
    }

    /// Explicitly free WASM memory. Optional; the finalizer also does it.
    pub fn free(self) {}
}

impl JsDecodedImage {
    pub(crate) fn from_decoded(img: DecodedImage) -> Self {
        Self {
            width: img.width,
            height: img.height,
            pixels: img.pixels,
        }
    }

    /// Convert back to a core image. Clones the pixel data.
    ///
    /// Images built from JavaScript may carry a buffer that does not match
    /// their dimensions; those are rejected here.
    pub(crate) fn to_decoded(&self) -> Result<DecodedImage, JsValue> {
        if !self.has_valid_buffer() {
            return Err(JsValue::from_str(&buffer_mismatch(
                self.width,
                self.height,
                self.pixels.len(),
            )));
        }
        Ok(DecodedImage {
            width: self.width,
            height: self.height,
            pixels: self.pixels.clone(),
        })
    }

    fn has_valid_buffer(&self) -> bool {
        self.pixels.len() == self.width as usize * self.height as usize * 3
    }
}

fn buffer_mismatch(width: u32, height: u32, len: usize) -> String {
    format!("Pixel buffer holds {len} bytes, expected {width}x{height}x3")
}

/// Convert a u8 filter value to the core filter.
///
/// 0 = Nearest, 1 = Bilinear, 2 = Lanczos3. Any other value means Bilinear.
pub(crate) fn filter_from_u8(value: u8) -> FilterType {
    match value {
        0 => FilterType::Nearest,
        2 => FilterType::Lanczos3,
        _ => FilterType::Bilinear,
    }
}

pub(crate) fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

pub(crate) fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(to_js_error)
}

pub(crate) fn from_js<T: DeserializeOwned>(value: JsValue) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(to_js_error)
}
