//! Rotation and crop bindings used outside an editor session.

use crate::types::{from_js, to_js, to_js_error, JsDecodedImage};
use kashi_core::geometry::{compute_initial_region, AspectLock, CropRegion};
use kashi_core::render::{self, DisplaySize};
use kashi_core::transform::{apply_rotation, Rotation};
use wasm_bindgen::prelude::*;

/// Rotate an image clockwise by `degrees`, which must be a multiple of 90.
#[wasm_bindgen]
pub fn rotate_image(image: &JsDecodedImage, degrees: u16) -> Result<JsDecodedImage, JsValue> {
    let rotation = Rotation::from_degrees(degrees)
        .ok_or_else(|| JsValue::from_str(&format!("Rotation must be a multiple of 90, got {degrees}")))?;
    Ok(JsDecodedImage::from_decoded(apply_rotation(
        &image.to_decoded()?,
        rotation,
    )))
}

/// Default crop selection `{x, y, width, height}` for an image drawn at
/// `width` x `height`: the full frame, or the largest centered square when
/// the aspect is locked.
#[wasm_bindgen]
pub fn initial_crop_region(width: f64, height: f64, aspect_locked: bool) -> Result<JsValue, JsValue> {
    to_js(&compute_initial_region(
        width,
        height,
        AspectLock::from_locked(aspect_locked),
    ))
}

/// Crop `image` to a selection made on screen and encode it as JPEG.
///
/// `region` is `{x, y, width, height}` in display pixels for an image drawn
/// at `display_width` x `display_height`.
#[wasm_bindgen]
pub fn export_crop(
    image: &JsDecodedImage,
    display_width: f64,
    display_height: f64,
    region: JsValue,
    quality: u8,
) -> Result<Vec<u8>, JsValue> {
    let region: CropRegion = from_js(region)?;
    render::export(
        &image.to_decoded()?,
        DisplaySize::new(display_width, display_height),
        &region,
        quality,
    )
    .map(|blob| blob.bytes)
    .map_err(to_js_error)
}
