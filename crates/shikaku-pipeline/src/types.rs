//! Shared types for the shikaku rectification pipeline.

use serde::{Deserialize, Serialize};

/// Re-export `GrayImage` so downstream crates can reference masks and
/// binarized output without depending on `image` directly.
pub use image::GrayImage;

/// Re-export `RgbImage` so downstream crates can reference decoded and
/// rectified color data without depending on `image` directly.
pub use image::RgbImage;

/// Tolerance below which a cross product is treated as exactly zero
/// when testing corner degeneracy. Near-degenerate (but not exactly
/// degenerate) quadrilaterals are left to the homography solve, which
/// reports them as [`PipelineError::SingularTransform`].
const DEGENERACY_EPSILON: f64 = 1e-9;

/// A 2D point in image coordinates.
///
/// Origin is the top-left corner; x grows rightward, y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (pixels from left edge).
    pub x: f64,
    /// Vertical position (pixels from top edge).
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    ///
    /// Avoids the square root for comparison purposes.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

/// The four clicked corners of a photographed document.
///
/// Ordering convention: top-left, top-right, bottom-right, bottom-left
/// (clockwise, starting at the top-left). The ordering is trusted, not
/// inferred; only degenerate input is rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point>", into = "Vec<Point>")]
pub struct Quadrilateral([Point; 4]);

impl Quadrilateral {
    /// Create a quadrilateral from exactly four corners.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidGeometry`] if any two corners
    /// coincide or any three consecutive corners are collinear. Either
    /// condition leaves the perspective transform underdetermined.
    pub fn try_new(corners: [Point; 4]) -> Result<Self, PipelineError> {
        for i in 0..4 {
            for j in (i + 1)..4 {
                if corners[i].distance_squared(corners[j]) < DEGENERACY_EPSILON {
                    return Err(PipelineError::InvalidGeometry(format!(
                        "corners {i} and {j} coincide at ({}, {})",
                        corners[i].x, corners[i].y,
                    )));
                }
            }
        }

        for i in 0..4 {
            let a = corners[i];
            let b = corners[(i + 1) % 4];
            let c = corners[(i + 2) % 4];
            let cross = (b.x - a.x).mul_add(c.y - a.y, -((b.y - a.y) * (c.x - a.x)));
            if cross.abs() < DEGENERACY_EPSILON {
                return Err(PipelineError::InvalidGeometry(format!(
                    "corners {i}, {}, and {} are collinear",
                    (i + 1) % 4,
                    (i + 2) % 4,
                )));
            }
        }

        Ok(Self(corners))
    }

    /// Create a quadrilateral from a point slice of any length.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidGeometry`] if the slice does not
    /// hold exactly four points, or if the corners are degenerate (see
    /// [`Self::try_new`]).
    pub fn from_points(points: &[Point]) -> Result<Self, PipelineError> {
        let corners: [Point; 4] = points.try_into().map_err(|_| {
            PipelineError::InvalidGeometry(format!(
                "expected exactly 4 corner points, got {}",
                points.len(),
            ))
        })?;
        Self::try_new(corners)
    }

    /// The four corners in their stated order.
    #[must_use]
    pub const fn corners(&self) -> &[Point; 4] {
        &self.0
    }
}

impl TryFrom<Vec<Point>> for Quadrilateral {
    type Error = PipelineError;

    fn try_from(points: Vec<Point>) -> Result<Self, Self::Error> {
        Self::from_points(&points)
    }
}

impl From<Quadrilateral> for Vec<Point> {
    fn from(quad: Quadrilateral) -> Self {
        quad.0.to_vec()
    }
}

/// A closed polygonal region in rectified-image coordinates.
///
/// Vertices may fall outside the canvas; they are clipped implicitly
/// during rasterization. The closing edge from the last vertex back to
/// the first is implied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point>", into = "Vec<Point>")]
pub struct Polygon(Vec<Point>);

impl Polygon {
    /// Create a polygon from its vertices.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidPolygon`] if fewer than three
    /// vertices are supplied.
    pub fn try_new(vertices: Vec<Point>) -> Result<Self, PipelineError> {
        if vertices.len() < 3 {
            return Err(PipelineError::InvalidPolygon {
                got: vertices.len(),
            });
        }
        Ok(Self(vertices))
    }

    /// The polygon's vertices in order.
    #[must_use]
    pub fn vertices(&self) -> &[Point] {
        &self.0
    }
}

impl TryFrom<Vec<Point>> for Polygon {
    type Error = PipelineError;

    fn try_from(points: Vec<Point>) -> Result<Self, Self::Error> {
        Self::try_new(points)
    }
}

impl From<Polygon> for Vec<Point> {
    fn from(polygon: Polygon) -> Self {
        polygon.0
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Configuration for the rectification pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Side length of the square rectified output, in pixels. The
    /// destination corners are scaled so the output canvas is always
    /// `output_resolution x output_resolution` regardless of the
    /// photographed document's apparent size.
    pub output_resolution: u32,

    /// Maximum accepted width or height of an input image. Larger
    /// inputs are rejected with [`PipelineError::ImageTooLarge`] to
    /// bound worst-case latency.
    pub max_input_dimension: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_resolution: 800,
            max_input_dimension: 10_000,
        }
    }
}

/// Result of the rectification operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RectifyResult {
    /// PNG-encoded rectified image.
    pub png: Vec<u8>,
    /// Dimensions of the rectified image (always square).
    pub dimensions: Dimensions,
}

/// Errors that can occur during pipeline processing.
///
/// Every variant is a deterministic function of bad input: none are
/// retried, and none are fatal to a surrounding service.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// Failed to encode the output image.
    #[error("failed to encode image: {0}")]
    ImageEncode(image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// The input image exceeds the configured size bound.
    #[error("input image is {width}x{height}, exceeding the {max} px per-side limit")]
    ImageTooLarge {
        /// Decoded image width.
        width: u32,
        /// Decoded image height.
        height: u32,
        /// The configured per-side limit.
        max: u32,
    },

    /// The corner points do not form a usable quadrilateral.
    #[error("invalid corner geometry: {0}")]
    InvalidGeometry(String),

    /// The homography's linear system has no stable solution.
    #[error("perspective transform is singular; re-pick the corners")]
    SingularTransform,

    /// A polygon has too few vertices to enclose a region.
    #[error("polygon has {got} vertices; at least 3 are required")]
    InvalidPolygon {
        /// Number of vertices supplied.
        got: usize,
    },

    /// A mask's dimensions do not match the image it is applied to.
    #[error("mask dimensions {mask:?} do not match image dimensions {image:?}")]
    MaskSizeMismatch {
        /// Dimensions of the image being masked.
        image: Dimensions,
        /// Dimensions of the mask.
        mask: Dimensions,
    },
}
