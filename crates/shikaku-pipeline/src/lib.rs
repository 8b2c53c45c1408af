//! shikaku-pipeline: Pure perspective rectification pipeline (sans-IO).
//!
//! Turns a photographed document into a flat, cropped, binarized scan:
//! corner homography -> perspective warp -> polygon mask -> extraction.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! byte slices and returns encoded bytes or structured data. File and
//! network handling belong to collaborators (see `shikaku-cli` for a
//! file-based driver).
//!
//! Both operations are pure functions of their arguments: nothing is
//! cached or shared between calls, so concurrent requests cannot
//! observe each other's intermediates.

pub mod codec;
pub mod extract;
pub mod homography;
pub mod raster;
pub mod types;
pub mod warp;

pub use homography::Homography;
pub use types::{
    Dimensions, GrayImage, PipelineConfig, PipelineError, Point, Polygon, Quadrilateral,
    RectifyResult, RgbImage,
};

/// Rectify a photographed document given its four corners.
///
/// Decodes `image_bytes`, estimates the homography taking `corners`
/// onto a square of side [`PipelineConfig::output_resolution`], warps
/// the image onto that canvas, and returns the result PNG-encoded.
///
/// # Pipeline steps
///
/// 1. Decode image bytes (size-bounded)
/// 2. Estimate the rectifying homography from the corner quadrilateral
/// 3. Inverse-map every destination pixel with bilinear sampling
/// 4. Encode the rectified canvas as PNG
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`], [`PipelineError::ImageDecode`],
/// or [`PipelineError::ImageTooLarge`] for unusable input bytes;
/// [`PipelineError::SingularTransform`] if the corner geometry admits
/// no stable transform; [`PipelineError::ImageEncode`] if PNG output
/// fails. (Degenerate corners are rejected earlier, when the
/// [`Quadrilateral`] is constructed.)
pub fn rectify(
    image_bytes: &[u8],
    corners: &Quadrilateral,
    config: &PipelineConfig,
) -> Result<RectifyResult, PipelineError> {
    // 1. Decode.
    let image = codec::decode_rgb(image_bytes, config.max_input_dimension)?;

    // 2. Estimate the corner-to-square transform.
    let transform = homography::rectifying_homography(corners, config.output_resolution)?;

    // 3. Resample onto the square output canvas.
    let dimensions = Dimensions {
        width: config.output_resolution,
        height: config.output_resolution,
    };
    let rectified = warp::warp_perspective(&image, &transform, dimensions)?;

    // 4. Encode.
    let png = codec::encode_png_rgb(&rectified)?;
    Ok(RectifyResult { png, dimensions })
}

/// Extract the polygon-masked region of a rectified image as a binary
/// scan.
///
/// Decodes `image_bytes`, rasterizes `polygons` into a coverage mask
/// at the image's own dimensions, zeroes everything outside the mask,
/// converts to luminance, thresholds at zero, and returns the binary
/// result PNG-encoded. An empty polygon list yields an all-black scan.
///
/// Polygons with fewer than three vertices cannot exist: they are
/// rejected with [`PipelineError::InvalidPolygon`] when the
/// [`Polygon`] values are constructed or deserialized.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`], [`PipelineError::ImageDecode`],
/// or [`PipelineError::ImageTooLarge`] for unusable input bytes, and
/// [`PipelineError::ImageEncode`] if PNG output fails.
pub fn extract(image_bytes: &[u8], polygons: &[Polygon]) -> Result<Vec<u8>, PipelineError> {
    // 1. Decode.
    let image = codec::decode_rgb(image_bytes, PipelineConfig::default().max_input_dimension)?;
    let dimensions = Dimensions {
        width: image.width(),
        height: image.height(),
    };

    // 2. Rasterize the polygons at the image's resolution.
    let mask = raster::rasterize_polygons(polygons, dimensions);

    // 3. Mask, grayscale, binarize.
    let binary = extract::extract_region(&image, &mask)?;

    // 4. Encode.
    codec::encode_png_gray(&binary)
}
