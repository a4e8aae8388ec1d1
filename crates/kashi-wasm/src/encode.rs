//! JPEG encoding bindings.
//!
//! Edited photos always leave the editor as JPEG.
//!
//! ```typescript
//! import { encode_jpeg_from_image } from '@kashi/wasm';
//!
//! const jpeg = encode_jpeg_from_image(image, 92);
//! const blob = new Blob([jpeg], { type: 'image/jpeg' });
//! ```

use crate::types::{to_js_error, JsDecodedImage};
use kashi_core::encode;
use wasm_bindgen::prelude::*;

/// Encode RGB pixel data (3 bytes per pixel, row-major) to JPEG bytes.
///
/// # Errors
///
/// Returns an error if the pixel data length does not match
/// `width * height * 3` or either dimension is zero.
#[wasm_bindgen]
pub fn encode_jpeg(pixels: &[u8], width: u32, height: u32, quality: u8) -> Result<Vec<u8>, JsValue> {
    encode::encode_jpeg(pixels, width, height, quality).map_err(to_js_error)
}

/// Encode a decoded image to JPEG bytes.
#[wasm_bindgen]
pub fn encode_jpeg_from_image(image: &JsDecodedImage, quality: u8) -> Result<Vec<u8>, JsValue> {
    let decoded = image.to_decoded()?;
    encode::encode_jpeg(&decoded.pixels, decoded.width, decoded.height, quality)
        .map_err(to_js_error)
}
