//! Kashi WASM - WebAssembly bindings for the Kashi photo pipeline
//!
//! This crate exposes kashi-core to the marketplace web app.
//!
//! # Module Structure
//!
//! - `types` - WASM-compatible wrapper types for image data
//! - `decode` - Photo decoding and thumbnails
//! - `encode` - JPEG encoding
//! - `transform` - Stand-alone rotation, default crop selection and crop export
//! - `editor` - The listing photo set and the crop/rotate editor
//!
//! # Usage
//!
//! ```typescript
//! import init, { load_image, JsPhotoEditor } from '@kashi/wasm';
//!
//! await init();
//!
//! const editor = new JsPhotoEditor(undefined);
//! editor.add_photos(files.map(f => f.name), files.map(f => f.type), buffers);
//! ```

use wasm_bindgen::prelude::*;

mod decode;
mod editor;
mod encode;
mod transform;
mod types;

pub use decode::{decode_image, generate_thumbnail, load_image, resize_to_fit};
pub use editor::JsPhotoEditor;
pub use encode::{encode_jpeg, encode_jpeg_from_image};
pub use transform::{export_crop, initial_crop_region, rotate_image};
pub use types::JsDecodedImage;

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
