//! Quarter-turn rotation of the editing surface.
//!
//! The editor only offers a "rotate" button that turns the photo by 90°
//! clockwise per press, so rotation is an exact pixel remap; no
//! interpolation is involved and the pixel count never changes.

use serde::{Deserialize, Serialize};

use crate::decode::DecodedImage;

/// Degrees added per rotate action.
pub const ROTATION_STEP: u16 = 90;

/// Rotation of the editing surface, always one of 0, 90, 180 or 270 degrees
/// clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Rotation(u16);

impl Rotation {
    pub const NONE: Rotation = Rotation(0);

    /// Build from any angle that is a multiple of 90, wrapping into [0, 360).
    pub fn from_degrees(degrees: u16) -> Option<Self> {
        (degrees % ROTATION_STEP == 0).then_some(Rotation(degrees % 360))
    }

    pub fn degrees(self) -> u16 {
        self.0
    }

    /// Next angle after one rotate action (+90°, wrapping at 360°).
    #[must_use]
    pub fn rotate(self) -> Self {
        Rotation((self.0 + ROTATION_STEP) % 360)
    }

    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Whether width and height trade places under this rotation.
    pub fn swaps_dimensions(self) -> bool {
        self.0 == 90 || self.0 == 270
    }

    /// Dimensions of a `width` x `height` image after rotation.
    pub fn rotated_dimensions<T>(self, width: T, height: T) -> (T, T) {
        if self.swaps_dimensions() {
            (height, width)
        } else {
            (width, height)
        }
    }
}

impl TryFrom<u16> for Rotation {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Rotation::from_degrees(value)
            .ok_or_else(|| format!("rotation must be a multiple of {ROTATION_STEP}, got {value}"))
    }
}

impl From<Rotation> for u16 {
    fn from(rotation: Rotation) -> u16 {
        rotation.0
    }
}

/// Rotate an image clockwise by the given quarter-turn rotation.
///
/// Returns a copy for `Rotation::NONE`.
pub fn apply_rotation(image: &DecodedImage, rotation: Rotation) -> DecodedImage {
    if rotation.is_none() {
        return image.clone();
    }

    let (src_w, src_h) = (image.width as usize, image.height as usize);
    let (dst_w, dst_h) = rotation.rotated_dimensions(src_w, src_h);
    let mut output = vec![0u8; image.pixels.len()];

    for src_y in 0..src_h {
        for src_x in 0..src_w {
            let (dst_x, dst_y) = match rotation.degrees() {
                90 => (src_h - 1 - src_y, src_x),
                180 => (src_w - 1 - src_x, src_h - 1 - src_y),
                _ => (src_y, src_w - 1 - src_x),
            };

            let src_idx = (src_y * src_w + src_x) * 3;
            let dst_idx = (dst_y * dst_w + dst_x) * 3;
            output[dst_idx..dst_idx + 3].copy_from_slice(&image.pixels[src_idx..src_idx + 3]);
        }
    }

    DecodedImage {
        width: dst_w as u32,
        height: dst_h as u32,
        pixels: output,
    }
}
