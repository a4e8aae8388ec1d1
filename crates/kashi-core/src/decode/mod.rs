//! Image Decoder/Loader.
//!
//! Turns a listing photo (a picked file or an edited blob) into a
//! pixel-addressable RGB bitmap with known natural dimensions, and produces
//! thumbnails for the photo grid.
//!
//! # Architecture
//!
//! Loading is synchronous here. In the browser the host decodes off the UI
//! event and hands the result back to the editor session with the ticket it
//! was given, see [`crate::editor::EditorSession::image_loaded`].
//!
//! # Examples
//!
//! ```ignore
//! use kashi_core::decode::load;
//! use kashi_core::source::{ImageSource, SelectedFile};
//!
//! let file = SelectedFile::new("jacket.jpg", "image/jpeg", bytes);
//! let image = load(&ImageSource::from(file))?;
//! println!("Decoded {}x{} image", image.width, image.height);
//! ```

mod load;
mod resize;
mod types;

pub use load::{decode_image, get_orientation, load};
pub use resize::{generate_thumbnail, resize_to_fit};
pub use types::{DecodeError, DecodedImage, FilterType, Orientation};
