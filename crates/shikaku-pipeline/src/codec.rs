//! In-memory image decoding and encoding.
//!
//! The pipeline never touches the filesystem: collaborators hand in raw
//! upload bytes (PNG, JPEG, GIF, TIFF, BMP, WebP) and receive encoded
//! PNG bytes back. Everything in between operates on pixel buffers.

use image::ImageEncoder;

use crate::types::{GrayImage, PipelineError, RgbImage};

/// Decode raw image bytes into an RGB buffer.
///
/// Alpha channels are flattened; the pipeline works in three channels
/// throughout.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the format is
/// unrecognized or the data is corrupt.
/// Returns [`PipelineError::ImageTooLarge`] if either side exceeds
/// `max_dimension`.
#[must_use = "returns the decoded RGB image"]
pub fn decode_rgb(bytes: &[u8], max_dimension: u32) -> Result<RgbImage, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let img = image::load_from_memory(bytes)?;
    if img.width() > max_dimension || img.height() > max_dimension {
        return Err(PipelineError::ImageTooLarge {
            width: img.width(),
            height: img.height(),
            max: max_dimension,
        });
    }
    Ok(img.to_rgb8())
}

/// Encode an RGB buffer as PNG bytes.
///
/// # Errors
///
/// Returns [`PipelineError::ImageEncode`] if PNG encoding fails.
pub fn encode_png_rgb(image: &RgbImage) -> Result<Vec<u8>, PipelineError> {
    let mut png_bytes = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
    encoder
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(PipelineError::ImageEncode)?;
    Ok(png_bytes)
}

/// Encode a single-channel buffer as PNG bytes.
///
/// # Errors
///
/// Returns [`PipelineError::ImageEncode`] if PNG encoding fails.
pub fn encode_png_gray(image: &GrayImage) -> Result<Vec<u8>, PipelineError> {
    let mut png_bytes = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
    encoder
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::L8,
        )
        .map_err(PipelineError::ImageEncode)?;
    Ok(png_bytes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_returns_error() {
        let result = decode_rgb(&[], 10_000);
        assert!(matches!(result, Err(PipelineError::EmptyInput)));
    }

    #[test]
    fn corrupt_bytes_returns_image_decode_error() {
        let result = decode_rgb(&[0xFF, 0xFE, 0x00, 0x01], 10_000);
        assert!(matches!(result, Err(PipelineError::ImageDecode(_))));
    }

    #[test]
    fn oversized_image_is_rejected() {
        let img = RgbImage::from_pixel(64, 8, image::Rgb([7, 7, 7]));
        let png = encode_png_rgb(&img).unwrap();
        let result = decode_rgb(&png, 32);
        assert!(matches!(
            result,
            Err(PipelineError::ImageTooLarge {
                width: 64,
                height: 8,
                max: 32,
            }),
        ));
    }

    #[test]
    fn rgb_png_round_trip() {
        let img = RgbImage::from_fn(5, 4, |x, y| {
            #[allow(clippy::cast_possible_truncation)]
            image::Rgb([x as u8 * 40, y as u8 * 60, 128])
        });
        let png = encode_png_rgb(&img).unwrap();
        let decoded = decode_rgb(&png, 10_000).unwrap();
        assert_eq!(img, decoded);
    }

    #[test]
    fn gray_png_encodes_single_channel() {
        let img = GrayImage::from_pixel(3, 3, image::Luma([200]));
        let png = encode_png_gray(&img).unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.color(), image::ColorType::L8);
        assert_eq!(decoded.to_luma8(), img);
    }

    #[test]
    fn alpha_is_flattened_to_rgb() {
        let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([10, 20, 30, 255]));
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        encoder
            .write_image(
                img.as_raw(),
                img.width(),
                img.height(),
                image::ExtendedColorType::Rgba8,
            )
            .unwrap();

        let decoded = decode_rgb(&buf, 10_000).unwrap();
        assert_eq!(*decoded.get_pixel(0, 0), image::Rgb([10, 20, 30]));
    }
}
