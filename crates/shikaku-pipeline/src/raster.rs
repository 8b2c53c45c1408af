//! Polygon mask rasterization.
//!
//! Fills user-drawn polygons into a single-channel {0, 255} coverage
//! mask over the rectified image's dimensions. Filling uses the
//! even-odd rule with a scanline pass per row; multiple polygons are
//! unioned onto the same buffer.
//!
//! Boundary policy: a pixel is covered iff its center lies inside the
//! polygon. Scanline crossings are counted over half-open spans in
//! both axes, so an axis-aligned rectangle covers exactly its
//! left/top-closed, right/bottom-open interior. Vertices outside the
//! canvas clip implicitly; no coordinate validation is needed.

use image::Luma;

use crate::types::{Dimensions, GrayImage, Polygon};

/// Rasterize `polygons` into a mask of `canvas` pixels.
///
/// Each polygon is filled onto an initially all-zero mask; overlapping
/// coverage simply stays 255. An empty polygon list produces an
/// all-zero mask.
#[must_use = "returns the rasterized coverage mask"]
pub fn rasterize_polygons(polygons: &[Polygon], canvas: Dimensions) -> GrayImage {
    let mut mask = GrayImage::new(canvas.width, canvas.height);
    for polygon in polygons {
        fill_polygon(&mut mask, polygon);
    }
    mask
}

/// Fill one polygon onto the mask with even-odd scanline coverage.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn fill_polygon(mask: &mut GrayImage, polygon: &Polygon) {
    let vertices = polygon.vertices();
    let width = f64::from(mask.width());
    let mut crossings: Vec<f64> = Vec::with_capacity(vertices.len());

    for row in 0..mask.height() {
        let scan_y = f64::from(row) + 0.5;

        // Collect x coordinates where edges cross this row's centerline.
        // The half-open test `(a.y <= scan_y) != (b.y <= scan_y)` counts
        // each vertex for exactly one of its two edges.
        crossings.clear();
        for i in 0..vertices.len() {
            let a = vertices[i];
            let b = vertices[(i + 1) % vertices.len()];
            if (a.y <= scan_y) != (b.y <= scan_y) {
                let t = (scan_y - a.y) / (b.y - a.y);
                crossings.push(t.mul_add(b.x - a.x, a.x));
            }
        }
        crossings.sort_by(f64::total_cmp);

        // Even-odd: consecutive crossing pairs bound interior spans.
        for span in crossings.chunks_exact(2) {
            // Pixel centers x + 0.5 inside [span start, span end).
            let start = (span[0] - 0.5).ceil().max(0.0);
            let end = (span[1] - 0.5).ceil().min(width);
            if start >= end {
                continue;
            }
            for x in (start as u32)..(end as u32) {
                mask.put_pixel(x, row, Luma([255]));
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::Point;

    const CANVAS: Dimensions = Dimensions {
        width: 40,
        height: 30,
    };

    fn rectangle(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon {
        Polygon::try_new(vec![
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x1, y1),
            Point::new(x0, y1),
        ])
        .unwrap()
    }

    fn coverage(mask: &GrayImage) -> usize {
        mask.pixels().filter(|p| p.0[0] == 255).count()
    }

    #[test]
    fn empty_polygon_list_yields_zero_mask() {
        let mask = rasterize_polygons(&[], CANVAS);
        assert_eq!(mask.width(), 40);
        assert_eq!(mask.height(), 30);
        assert_eq!(coverage(&mask), 0);
    }

    #[test]
    fn rectangle_covers_exact_half_open_interior() {
        let mask = rasterize_polygons(&[rectangle(10.0, 5.0, 20.0, 12.0)], CANVAS);
        for y in 0..30 {
            for x in 0..40 {
                let expected = (10..20).contains(&x) && (5..12).contains(&y);
                assert_eq!(
                    mask.get_pixel(x, y).0[0] == 255,
                    expected,
                    "pixel ({x}, {y})",
                );
            }
        }
    }

    #[test]
    fn mask_values_are_binary() {
        let mask = rasterize_polygons(&[rectangle(3.5, 2.5, 17.0, 9.0)], CANVAS);
        assert!(mask.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
    }

    #[test]
    fn disjoint_polygons_union() {
        let left = rectangle(2.0, 2.0, 8.0, 8.0);
        let right = rectangle(20.0, 10.0, 30.0, 20.0);

        let combined = rasterize_polygons(&[left.clone(), right.clone()], CANVAS);
        let left_only = rasterize_polygons(&[left], CANVAS);
        let right_only = rasterize_polygons(&[right], CANVAS);

        for (x, y, pixel) in combined.enumerate_pixels() {
            let union =
                left_only.get_pixel(x, y).0[0].max(right_only.get_pixel(x, y).0[0]);
            assert_eq!(pixel.0[0], union, "pixel ({x}, {y})");
        }
    }

    #[test]
    fn overlapping_polygons_do_not_double_count() {
        let a = rectangle(5.0, 5.0, 15.0, 15.0);
        let b = rectangle(10.0, 10.0, 20.0, 20.0);
        let mask = rasterize_polygons(&[a, b], CANVAS);
        assert!(mask.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
        assert_eq!(mask.get_pixel(12, 12).0[0], 255);
    }

    #[test]
    fn vertices_outside_canvas_clip_implicitly() {
        let mask = rasterize_polygons(&[rectangle(-10.0, -10.0, 100.0, 100.0)], CANVAS);
        // The whole canvas is interior.
        assert_eq!(coverage(&mask), 40 * 30);
    }

    #[test]
    fn triangle_contains_centroid_but_not_far_corner() {
        let triangle = Polygon::try_new(vec![
            Point::new(0.0, 0.0),
            Point::new(40.0, 0.0),
            Point::new(20.0, 30.0),
        ])
        .unwrap();
        let mask = rasterize_polygons(&[triangle], CANVAS);
        assert_eq!(mask.get_pixel(20, 10).0[0], 255);
        assert_eq!(mask.get_pixel(0, 29).0[0], 0);
        assert_eq!(mask.get_pixel(39, 29).0[0], 0);
    }

    #[test]
    fn concave_polygon_uses_even_odd_rule() {
        // A "U" shape: the notch between the arms must stay unfilled.
        let u_shape = Polygon::try_new(vec![
            Point::new(5.0, 5.0),
            Point::new(35.0, 5.0),
            Point::new(35.0, 25.0),
            Point::new(25.0, 25.0),
            Point::new(25.0, 10.0),
            Point::new(15.0, 10.0),
            Point::new(15.0, 25.0),
            Point::new(5.0, 25.0),
        ])
        .unwrap();
        let mask = rasterize_polygons(&[u_shape], CANVAS);
        assert_eq!(mask.get_pixel(10, 20).0[0], 255, "left arm");
        assert_eq!(mask.get_pixel(30, 20).0[0], 255, "right arm");
        assert_eq!(mask.get_pixel(20, 20).0[0], 0, "notch");
        assert_eq!(mask.get_pixel(20, 7).0[0], 255, "bridge");
    }
}
