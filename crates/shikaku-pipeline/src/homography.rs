//! Homography estimation from four corner correspondences.
//!
//! The user's four clicked corners are mapped onto a perfect square
//! whose side length is derived from the quadrilateral's own edge
//! lengths, then uniformly scaled to the configured output resolution.
//! The transform is solved with the direct linear transform: four
//! correspondences give eight linear equations in the eight unknowns
//! of a 3x3 projective matrix whose bottom-right entry is fixed at 1.

use nalgebra::{Matrix3, SMatrix, SVector};

use crate::types::{PipelineError, Point, Quadrilateral};

/// Denominators below this magnitude are treated as a vanishing
/// homogeneous coordinate (the mapped point is at infinity).
const PROJECTION_EPSILON: f64 = 1e-15;

/// A 3x3 projective transform between image planes.
///
/// Maps homogeneous source coordinates to homogeneous destination
/// coordinates; the bottom-right entry is normalized to 1 by
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Homography(Matrix3<f64>);

impl Homography {
    /// Solve for the transform taking each `src[i]` to `dst[i]`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::SingularTransform`] if the linear
    /// system has no stable solution (near-degenerate correspondences).
    pub fn from_correspondences(
        src: &[Point; 4],
        dst: &[Point; 4],
    ) -> Result<Self, PipelineError> {
        // Rows 2i and 2i+1 encode the x and y constraints of the i-th
        // correspondence, with h33 pinned to 1 and moved to the
        // right-hand side:
        //   [ x  y  1  0  0  0  -u*x  -u*y ] . h = u
        //   [ 0  0  0  x  y  1  -v*x  -v*y ] . h = v
        let mut a = SMatrix::<f64, 8, 8>::zeros();
        let mut b = SVector::<f64, 8>::zeros();
        for i in 0..4 {
            let (x, y) = (src[i].x, src[i].y);
            let (u, v) = (dst[i].x, dst[i].y);

            a[(2 * i, 0)] = x;
            a[(2 * i, 1)] = y;
            a[(2 * i, 2)] = 1.0;
            a[(2 * i, 6)] = -u * x;
            a[(2 * i, 7)] = -u * y;
            b[2 * i] = u;

            a[(2 * i + 1, 3)] = x;
            a[(2 * i + 1, 4)] = y;
            a[(2 * i + 1, 5)] = 1.0;
            a[(2 * i + 1, 6)] = -v * x;
            a[(2 * i + 1, 7)] = -v * y;
            b[2 * i + 1] = v;
        }

        let h = a.lu().solve(&b).ok_or(PipelineError::SingularTransform)?;
        if h.iter().any(|value| !value.is_finite()) {
            return Err(PipelineError::SingularTransform);
        }

        Ok(Self(Matrix3::new(
            h[0], h[1], h[2], //
            h[3], h[4], h[5], //
            h[6], h[7], 1.0,
        )))
    }

    /// Project a point through the transform.
    ///
    /// Returns a NaN point if the homogeneous denominator vanishes
    /// (the source point maps to infinity); callers treat non-finite
    /// results as out of bounds.
    #[must_use]
    pub fn apply(&self, p: Point) -> Point {
        let m = &self.0;
        let w = m[(2, 0)].mul_add(p.x, m[(2, 1)].mul_add(p.y, m[(2, 2)]));
        if w.abs() < PROJECTION_EPSILON {
            return Point::new(f64::NAN, f64::NAN);
        }
        let u = m[(0, 0)].mul_add(p.x, m[(0, 1)].mul_add(p.y, m[(0, 2)]));
        let v = m[(1, 0)].mul_add(p.x, m[(1, 1)].mul_add(p.y, m[(1, 2)]));
        Point::new(u / w, v / w)
    }

    /// The inverse transform (destination back to source).
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::SingularTransform`] if the matrix is
    /// not invertible.
    pub fn inverse(&self) -> Result<Self, PipelineError> {
        self.0
            .try_inverse()
            .map(Self)
            .ok_or(PipelineError::SingularTransform)
    }

    /// The underlying 3x3 matrix.
    #[must_use]
    pub const fn matrix(&self) -> &Matrix3<f64> {
        &self.0
    }
}

/// Side length of the destination square before output scaling.
///
/// The maximum of the quadrilateral's four edge lengths: the larger of
/// the top and bottom edges versus the larger of the left and right
/// edges. The output square is therefore never smaller than the
/// dominant measured dimension, so that dimension is never downsampled.
#[must_use]
pub fn square_side(quad: &Quadrilateral) -> f64 {
    let [tl, tr, br, bl] = *quad.corners();
    let width = tl.distance(tr).max(br.distance(bl));
    let height = tl.distance(bl).max(tr.distance(br));
    width.max(height)
}

/// Estimate the transform that rectifies `quad` onto a square canvas
/// of side `output_resolution`.
///
/// The destination corners are `(0,0)`, `(s-1,0)`, `(s-1,s-1)`,
/// `(0,s-1)` with `s` the [`square_side`], uniformly scaled by
/// `output_resolution / s`. Estimation runs once, directly against the
/// scaled targets.
///
/// # Errors
///
/// Returns [`PipelineError::SingularTransform`] if the corner
/// correspondences are numerically degenerate.
pub fn rectifying_homography(
    quad: &Quadrilateral,
    output_resolution: u32,
) -> Result<Homography, PipelineError> {
    let side = square_side(quad);
    let scale = f64::from(output_resolution) / side;
    let far = (side - 1.0) * scale;

    let dst = [
        Point::new(0.0, 0.0),
        Point::new(far, 0.0),
        Point::new(far, far),
        Point::new(0.0, far),
    ];
    Homography::from_correspondences(quad.corners(), &dst)
}
