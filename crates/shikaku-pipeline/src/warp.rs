//! Perspective resampling into the rectified canvas.
//!
//! Inverse mapping: every destination pixel is projected through the
//! inverted homography to a (usually fractional) source coordinate and
//! sampled bilinearly. Destination pixels whose source coordinate
//! falls outside the image are filled with black; that is expected at
//! the corners of a non-rectangular photograph, not an error.
//!
//! Destination pixels are mapped at their integer coordinates, and
//! out-of-bounds bilinear taps read as black, so edge pixels blend
//! toward the background exactly as the border of the photograph does.

use image::Rgb;

use crate::homography::Homography;
use crate::types::{Dimensions, PipelineError, Point, RgbImage};

/// Warp `image` through `homography` onto a canvas of `out` pixels.
///
/// Deterministic: identical inputs always produce byte-identical
/// output.
///
/// # Errors
///
/// Returns [`PipelineError::SingularTransform`] if the homography
/// cannot be inverted.
pub fn warp_perspective(
    image: &RgbImage,
    homography: &Homography,
    out: Dimensions,
) -> Result<RgbImage, PipelineError> {
    let inverse = homography.inverse()?;

    // A fresh buffer is zeroed, so unmapped pixels stay black.
    let mut output = RgbImage::new(out.width, out.height);
    for y in 0..out.height {
        for x in 0..out.width {
            let src = inverse.apply(Point::new(f64::from(x), f64::from(y)));
            if src.x.is_finite() && src.y.is_finite() {
                output.put_pixel(x, y, sample_bilinear(image, src.x, src.y));
            }
        }
    }
    Ok(output)
}

/// Read one pixel with black extension outside the image bounds.
fn tap(image: &RgbImage, x: i64, y: i64) -> [f64; 3] {
    if x < 0 || y < 0 || x >= i64::from(image.width()) || y >= i64::from(image.height()) {
        return [0.0; 3];
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let pixel = image.get_pixel(x as u32, y as u32).0;
    [
        f64::from(pixel[0]),
        f64::from(pixel[1]),
        f64::from(pixel[2]),
    ]
}

/// Bilinear sample at a fractional source coordinate.
#[allow(clippy::cast_possible_truncation)]
fn sample_bilinear(image: &RgbImage, x: f64, y: f64) -> Rgb<u8> {
    let fx = x - x.floor();
    let fy = y - y.floor();
    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;

    let p00 = tap(image, x0, y0);
    let p10 = tap(image, x0 + 1, y0);
    let p01 = tap(image, x0, y0 + 1);
    let p11 = tap(image, x0 + 1, y0 + 1);

    let mut channels = [0u8; 3];
    for (c, out) in channels.iter_mut().enumerate() {
        let top = fx.mul_add(p10[c] - p00[c], p00[c]);
        let bottom = fx.mul_add(p11[c] - p01[c], p01[c]);
        let value = fy.mul_add(bottom - top, top);
        *out = value.round().clamp(0.0, 255.0) as u8;
    }
    Rgb(channels)
}
