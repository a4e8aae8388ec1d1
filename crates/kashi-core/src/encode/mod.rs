//! Image encoding for edited photos.
//!
//! # Examples
//!
//! ```ignore
//! use kashi_core::encode::encode_jpeg;
//!
//! let pixels = vec![128u8; 100 * 100 * 3];
//! let jpeg_bytes = encode_jpeg(&pixels, 100, 100, 92)?;
//! ```

mod jpeg;

pub use jpeg::{encode_jpeg, EncodeError};
