//! Region extraction and binarization.
//!
//! Applies a coverage mask to the rectified image, reduces the result
//! to single-channel luminance, and thresholds it into a binary scan.
//! The threshold is "strictly greater than zero": the mask has already
//! zeroed everything outside the region of interest, so any non-black
//! residual counts as content.

use image::{Luma, Rgb};

use crate::types::{Dimensions, GrayImage, PipelineError, RgbImage};

/// Zero out every pixel the mask does not cover.
///
/// Pixels where `mask` is 255 keep their source value in every
/// channel; all others become black.
///
/// # Errors
///
/// Returns [`PipelineError::MaskSizeMismatch`] if `mask` and `image`
/// have different dimensions.
pub fn apply_mask(image: &RgbImage, mask: &GrayImage) -> Result<RgbImage, PipelineError> {
    check_dimensions(image, mask)?;
    Ok(RgbImage::from_fn(image.width(), image.height(), |x, y| {
        if mask.get_pixel(x, y).0[0] == 255 {
            *image.get_pixel(x, y)
        } else {
            Rgb([0, 0, 0])
        }
    }))
}

/// Reduce a color image to single-channel luminance.
///
/// Uses the Rec. 601 weighting `0.299*R + 0.587*G + 0.114*B`.
#[must_use = "returns the grayscale image"]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn to_grayscale(image: &RgbImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let Rgb([r, g, b]) = *image.get_pixel(x, y);
        let luma = f64::from(r).mul_add(
            0.299,
            f64::from(g).mul_add(0.587, f64::from(b) * 0.114),
        );
        Luma([luma.round().clamp(0.0, 255.0) as u8])
    })
}

/// Threshold a grayscale image into {0, 255}.
///
/// Intensities strictly greater than `threshold` become 255; all
/// others become 0.
#[must_use = "returns the binarized image"]
pub fn binarize(image: &GrayImage, threshold: u8) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        if image.get_pixel(x, y).0[0] > threshold {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// Mask, grayscale-convert, and binarize in one step.
///
/// This is the pipeline's final stage: output dimensions equal the
/// input's, and every pixel is either 0 or 255.
///
/// # Errors
///
/// Returns [`PipelineError::MaskSizeMismatch`] if `mask` and `image`
/// have different dimensions.
pub fn extract_region(image: &RgbImage, mask: &GrayImage) -> Result<GrayImage, PipelineError> {
    let masked = apply_mask(image, mask)?;
    Ok(binarize(&to_grayscale(&masked), 0))
}

fn check_dimensions(image: &RgbImage, mask: &GrayImage) -> Result<(), PipelineError> {
    if image.dimensions() == mask.dimensions() {
        Ok(())
    } else {
        Err(PipelineError::MaskSizeMismatch {
            image: Dimensions {
                width: image.width(),
                height: image.height(),
            },
            mask: Dimensions {
                width: mask.width(),
                height: mask.height(),
            },
        })
    }
}
