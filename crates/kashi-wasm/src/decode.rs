//! Image decoding WASM bindings.
//!
//! # Functions
//!
//! - [`load_image`] - Decode a picked photo, checking its MIME type first
//! - [`decode_image`] - Decode image bytes of any supported format
//! - [`resize_to_fit`] - Scale down to a max edge, preserving aspect ratio
//! - [`generate_thumbnail`] - Thumbnail for the photo grid
//!
//! # Example
//!
//! ```typescript
//! import { load_image, generate_thumbnail } from '@kashi/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const image = load_image(bytes, file.type);
//! const thumb = generate_thumbnail(image, 256);
//! ```

use crate::types::{filter_from_u8, to_js_error, JsDecodedImage};
use kashi_core::decode;
use kashi_core::source::{ImageSource, SelectedFile};
use wasm_bindgen::prelude::*;

/// Decode a picked photo.
///
/// EXIF orientation is applied, so the returned dimensions are the ones the
/// photo is displayed at.
///
/// # Errors
///
/// Returns an error if `mime` is set and is not an `image/*` type, or if the
/// bytes are empty, unrecognized or corrupted.
#[wasm_bindgen]
pub fn load_image(bytes: &[u8], mime: &str) -> Result<JsDecodedImage, JsValue> {
    let source = ImageSource::from(SelectedFile::new("", mime, bytes.to_vec()));
    decode::load(&source)
        .map(JsDecodedImage::from_decoded)
        .map_err(to_js_error)
}

/// Decode image bytes (JPEG, PNG, WebP or GIF) without a MIME check.
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8]) -> Result<JsDecodedImage, JsValue> {
    decode::decode_image(bytes)
        .map(JsDecodedImage::from_decoded)
        .map_err(to_js_error)
}

/// Resize an image so its longest edge is at most `max_edge`.
///
/// `filter`: 0=Nearest, 1=Bilinear (default), 2=Lanczos3. Images that
/// already fit are returned unchanged.
#[wasm_bindgen]
pub fn resize_to_fit(
    image: &JsDecodedImage,
    max_edge: u32,
    filter: u8,
) -> Result<JsDecodedImage, JsValue> {
    decode::resize_to_fit(&image.to_decoded()?, max_edge, filter_from_u8(filter))
        .map(JsDecodedImage::from_decoded)
        .map_err(to_js_error)
}

/// Generate a grid thumbnail fitting a `size` x `size` square.
#[wasm_bindgen]
pub fn generate_thumbnail(image: &JsDecodedImage, size: u32) -> Result<JsDecodedImage, JsValue> {
    decode::generate_thumbnail(&image.to_decoded()?, size)
        .map(JsDecodedImage::from_decoded)
        .map_err(to_js_error)
}

/// WASM-specific tests that require JsValue.
///
/// These tests use functions that return `Result<T, JsValue>` and can only
/// run on wasm32 targets. Use `wasm-pack test` to run these.
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn jpeg(width: u32, height: u32) -> Vec<u8> {
        let pixels = vec![128u8; (width * height * 3) as usize];
        kashi_core::encode::encode_jpeg(&pixels, width, height, 90).unwrap()
    }

    #[wasm_bindgen_test]
    fn test_load_image() {
        let image = load_image(&jpeg(40, 20), "image/jpeg").unwrap();
        assert_eq!(image.width(), 40);
        assert_eq!(image.height(), 20);
    }

    #[wasm_bindgen_test]
    fn test_load_image_rejects_non_image() {
        assert!(load_image(&jpeg(4, 4), "application/pdf").is_err());
    }

    #[wasm_bindgen_test]
    fn test_decode_image_invalid() {
        assert!(decode_image(&[0, 1, 2, 3]).is_err());
        assert!(decode_image(&[]).is_err());
    }

    #[wasm_bindgen_test]
    fn test_generate_thumbnail() {
        let img = JsDecodedImage::new(400, 300, vec![128u8; 400 * 300 * 3]);
        let thumb = generate_thumbnail(&img, 100).unwrap();
        assert_eq!(thumb.width(), 100);
        assert_eq!(thumb.height(), 75);
    }

    #[wasm_bindgen_test]
    fn test_resize_to_fit_portrait() {
        let img = JsDecodedImage::new(100, 200, vec![128u8; 100 * 200 * 3]);
        let resized = resize_to_fit(&img, 100, 2).unwrap();
        assert_eq!(resized.width(), 50);
        assert_eq!(resized.height(), 100);
    }
}
