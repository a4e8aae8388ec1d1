//! Image loading with EXIF orientation handling.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::DynamicImage;
use image::ImageReader;

use super::{DecodeError, DecodedImage, Orientation};
use crate::source::ImageSource;

/// Load a listing photo into an RGB bitmap.
///
/// Accepts either a picked file or an edited blob. The declared MIME type is
/// checked first (anything that is not `image/*` is rejected, an empty type
/// is allowed through since some platforms do not report one), then the
/// format is guessed from the content.
///
/// # Errors
///
/// - `DecodeError::UnsupportedType` for non-image MIME types
/// - `DecodeError::InvalidFormat` for empty sources
/// - `DecodeError::CorruptedFile` when the bytes cannot be decoded
pub fn load(source: &ImageSource) -> Result<DecodedImage, DecodeError> {
    let mime = source.mime();
    if !mime.is_empty() && !mime.starts_with("image/") {
        return Err(DecodeError::UnsupportedType(mime.to_string()));
    }
    decode_image(source.bytes())
}

/// Decode image bytes, applying EXIF orientation correction.
///
/// # Arguments
///
/// * `bytes` - Encoded image bytes (JPEG, PNG, WebP or GIF)
///
/// # Returns
///
/// A `DecodedImage` with RGB pixel data and correct orientation applied.
pub fn decode_image(bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::InvalidFormat);
    }

    let orientation = get_orientation(bytes);

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat);
    }

    let img = reader
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let oriented_img = apply_orientation(img, orientation);
    Ok(DecodedImage::from_rgb_image(oriented_img.into_rgb8()))
}

/// Extract EXIF orientation from encoded bytes.
///
/// Returns `Orientation::Normal` if no EXIF data is found or orientation
/// cannot be determined.
pub fn get_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);

    match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Orientation::from)
            .unwrap_or_default(),
        Err(_) => Orientation::Normal,
    }
}

/// Apply EXIF orientation transformation to an image.
fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::encode_jpeg;
    use crate::source::{EncodedBlob, SelectedFile};
    use image::ImageFormat;

    fn jpeg_fixture(width: u32, height: u32) -> Vec<u8> {
        let pixels = vec![200u8; (width * height * 3) as usize];
        encode_jpeg(&pixels, width, height, 90).unwrap()
    }

    fn png_fixture(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([10, 20, 30]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn test_load_jpeg_file() {
        let src = ImageSource::from(SelectedFile::new("a.jpg", "image/jpeg", jpeg_fixture(8, 4)));
        let img = load(&src).unwrap();
        assert_eq!(img.dimensions(), (8, 4));
        assert_eq!(img.pixels.len(), 8 * 4 * 3);
    }

    #[test]
    fn test_load_png_file_with_empty_mime() {
        let src = ImageSource::from(SelectedFile::new("a.png", "", png_fixture(3, 5)));
        let img = load(&src).unwrap();
        assert_eq!(img.dimensions(), (3, 5));
        assert_eq!(&img.pixels[0..3], &[10, 20, 30]);
    }

    #[test]
    fn test_load_edited_blob() {
        let src = ImageSource::from(EncodedBlob::jpeg(jpeg_fixture(16, 16)));
        assert_eq!(load(&src).unwrap().dimensions(), (16, 16));
    }

    #[test]
    fn test_load_rejects_non_image_mime() {
        let src = ImageSource::from(SelectedFile::new("a.pdf", "application/pdf", vec![1, 2]));
        assert!(matches!(load(&src), Err(DecodeError::UnsupportedType(_))));
    }

    #[test]
    fn test_decode_garbage() {
        let result = decode_image(&[0x00, 0x01, 0x02, 0x03]);
        assert!(matches!(
            result,
            Err(DecodeError::InvalidFormat) | Err(DecodeError::CorruptedFile(_))
        ));
    }

    #[test]
    fn test_decode_empty_bytes() {
        assert!(matches!(decode_image(&[]), Err(DecodeError::InvalidFormat)));
    }

    #[test]
    fn test_decode_truncated_jpeg() {
        let bytes = jpeg_fixture(32, 32);
        assert!(decode_image(&bytes[..bytes.len() / 3]).is_err());
    }

    #[test]
    fn test_orientation_without_exif() {
        assert_eq!(get_orientation(&jpeg_fixture(2, 2)), Orientation::Normal);
        assert_eq!(get_orientation(&[0x00, 0x01]), Orientation::Normal);
    }

    #[test]
    fn test_apply_orientation_rotate90_swaps_dimensions() {
        let rgb = image::RgbImage::from_raw(2, 1, vec![255, 0, 0, 0, 255, 0]).unwrap();
        let result = apply_orientation(DynamicImage::ImageRgb8(rgb), Orientation::Rotate90CW);
        assert_eq!(result.into_rgb8().dimensions(), (1, 2));
    }

    #[test]
    fn test_apply_orientation_flip_horizontal() {
        let rgb = image::RgbImage::from_raw(2, 1, vec![255, 0, 0, 0, 255, 0]).unwrap();
        let result =
            apply_orientation(DynamicImage::ImageRgb8(rgb), Orientation::FlipHorizontal).into_rgb8();
        assert_eq!(result.get_pixel(0, 0).0, [0, 255, 0]);
        assert_eq!(result.get_pixel(1, 0).0, [255, 0, 0]);
    }
}
