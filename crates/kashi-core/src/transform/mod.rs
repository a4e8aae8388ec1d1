//! Transform Engine: quarter-turn rotation and native-space cropping.
//!
//! # Transform Order
//!
//! When a photo is exported from the editor:
//! 1. Rotation is applied to the working surface
//! 2. The crop region (display space, over the rotated surface) is mapped
//!    to native pixels
//! 3. The mapped rectangle is cropped and encoded
//!
//! # Coordinate System
//!
//! - Rotation is clockwise, in 90° steps
//! - Crop rectangles here are in native pixels; display-space regions live in
//!   [`crate::geometry`]
//! - Origin is top-left corner

mod crop;
mod rotation;

pub use crop::{crop_pixels, PixelRect};
pub use rotation::{apply_rotation, Rotation, ROTATION_STEP};
