//! Per-shape point builders
//!
//! Every shape is first turned into an outline (flat `[x, y, ...]` points in
//! the shape's local space) and then triangulated the cheapest way its kind
//! allows: a quad for rectangles, a centroid fan for the round shapes and
//! ear clipping for free-form polygons.

use crate::earcut::earcut_into;
use std::f32::consts::FRAC_PI_2;
use tessel_core::Shape;

/// Upper bound on segments per quadrant of a round outline
pub const MAX_QUADRANT_SEGMENTS: usize = 4096;

/// Append the outline of `shape` to `out`
pub fn build_points(shape: &Shape, out: &mut Vec<f32>) {
    match shape {
        Shape::Rectangle(r) => out.extend_from_slice(&[
            r.x,
            r.y,
            r.x + r.width,
            r.y,
            r.x + r.width,
            r.y + r.height,
            r.x,
            r.y + r.height,
        ]),
        Shape::Triangle(t) => out.extend_from_slice(&[t.a.x, t.a.y, t.b.x, t.b.y, t.c.x, t.c.y]),
        // A dangling x without its y is dropped
        Shape::Polygon(p) => out.extend_from_slice(&p.points[..p.points.len() & !1]),
        Shape::Circle(c) => build_rounded(c.center.x, c.center.y, c.radius, c.radius, 0.0, 0.0, out),
        Shape::Ellipse(e) => {
            build_rounded(e.center.x, e.center.y, e.radius_x, e.radius_y, 0.0, 0.0, out)
        }
        Shape::RoundedRectangle(r) => {
            let half_w = r.width / 2.0;
            let half_h = r.height / 2.0;
            let radius = r.radius.min(half_w.min(half_h)).max(0.0);
            build_rounded(
                r.x + half_w,
                r.y + half_h,
                radius,
                radius,
                half_w - radius,
                half_h - radius,
                out,
            );
        }
    }
}

/// Outline of an ellipse stretched by `(dx, dy)` around `(x, y)`
///
/// Covers circles and ellipses (`dx = dy = 0`) and rounded rectangles. The
/// four quadrants are written from both ends at once so that the result is a
/// single ring starting at the right-hand side.
fn build_rounded(x: f32, y: f32, rx: f32, ry: f32, dx: f32, dy: f32, out: &mut Vec<f32>) {
    if !(rx >= 0.0 && ry >= 0.0 && dx >= 0.0 && dy >= 0.0) {
        return;
    }

    let n = ((2.3 * (rx + ry).sqrt()).ceil() as usize).min(MAX_QUADRANT_SEGMENTS);
    let has_dx = dx != 0.0;
    let has_dy = dy != 0.0;
    let m = n * 8 + if has_dx { 4 } else { 0 } + if has_dy { 4 } else { 0 };
    if m == 0 {
        return;
    }

    let base = out.len();
    if n == 0 {
        out.extend_from_slice(&[x + dx, y + dy, x - dx, y + dy, x - dx, y - dy, x + dx, y - dy]);
        return;
    }

    out.resize(base + m, 0.0);
    let p = &mut out[base..];

    let mut j1 = 0;
    let mut j2 = n * 4 + if has_dx { 2 } else { 0 } + 2;
    let mut j3 = j2;
    let mut j4 = m;

    let put = |p: &mut [f32], j: &mut usize, v: f32| {
        p[*j] = v;
        *j += 1;
    };
    let put_back = |p: &mut [f32], j: &mut usize, v: f32| {
        *j -= 1;
        p[*j] = v;
    };

    let x0 = dx + rx;
    let y0 = dy;
    let x1 = x + x0;
    let x2 = x - x0;
    let y1 = y + y0;

    put(p, &mut j1, x1);
    put(p, &mut j1, y1);
    put_back(p, &mut j2, y1);
    put_back(p, &mut j2, x2);

    if has_dy {
        let y2 = y - y0;
        put(p, &mut j3, x2);
        put(p, &mut j3, y2);
        put_back(p, &mut j4, y2);
        put_back(p, &mut j4, x1);
    }

    for i in 1..n {
        let a = FRAC_PI_2 * (i as f32 / n as f32);
        let x0 = dx + a.cos() * rx;
        let y0 = dy + a.sin() * ry;
        let x1 = x + x0;
        let x2 = x - x0;
        let y1 = y + y0;
        let y2 = y - y0;

        put(p, &mut j1, x1);
        put(p, &mut j1, y1);
        put_back(p, &mut j2, y1);
        put_back(p, &mut j2, x2);
        put(p, &mut j3, x2);
        put(p, &mut j3, y2);
        put_back(p, &mut j4, y2);
        put_back(p, &mut j4, x1);
    }

    let x0 = dx;
    let y0 = dy + ry;
    let x1 = x + x0;
    let x2 = x - x0;
    let y1 = y + y0;
    let y2 = y - y0;

    put(p, &mut j1, x1);
    put(p, &mut j1, y1);
    put_back(p, &mut j4, y2);
    put_back(p, &mut j4, x1);

    if has_dx {
        put(p, &mut j1, x2);
        put(p, &mut j1, y1);
        put_back(p, &mut j4, y2);
        put_back(p, &mut j4, x2);
    }
}

/// Triangulate an outline produced by [`build_points`] for `shape`
///
/// `points` are appended to `vertices`; `indices` reference the absolute
/// vertex numbers of `vertices`. Fans (round shapes) add one centroid vertex.
pub fn triangulate(shape: &Shape, points: &[f32], vertices: &mut Vec<f32>, indices: &mut Vec<u32>) {
    if points.len() < 6 {
        return;
    }
    let offset = (vertices.len() / 2) as u32;
    match shape {
        Shape::Rectangle(_) => {
            vertices.extend_from_slice(&points[..8]);
            indices.extend_from_slice(&[offset, offset + 1, offset + 2, offset, offset + 2, offset + 3]);
        }
        Shape::Triangle(_) => {
            vertices.extend_from_slice(&points[..6]);
            indices.extend_from_slice(&[offset, offset + 1, offset + 2]);
        }
        Shape::Polygon(_) => triangulate_with_holes(points, &[], vertices, indices),
        Shape::Circle(_) | Shape::Ellipse(_) | Shape::RoundedRectangle(_) => {
            triangulate_fan(points, vertices, indices)
        }
    }
}

/// Ear-clip `points`, where `holes` are vertex indices at which hole rings start
pub fn triangulate_with_holes(
    points: &[f32],
    holes: &[usize],
    vertices: &mut Vec<f32>,
    indices: &mut Vec<u32>,
) {
    let offset = (vertices.len() / 2) as u32;
    vertices.extend_from_slice(points);
    earcut_into(points, holes, offset, indices);
}

/// Fan around the centroid of a convex outline
fn triangulate_fan(points: &[f32], vertices: &mut Vec<f32>, indices: &mut Vec<u32>) {
    let count = points.len() / 2;
    let (sum_x, sum_y) = points
        .chunks_exact(2)
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p[0], sy + p[1]));

    let center = (vertices.len() / 2) as u32;
    vertices.extend_from_slice(&[sum_x / count as f32, sum_y / count as f32]);

    let mut index = center + 1;
    for (i, p) in points.chunks_exact(2).enumerate() {
        vertices.extend_from_slice(p);
        if i > 0 {
            indices.extend_from_slice(&[index, center, index - 1]);
        }
        index += 1;
    }
    indices.extend_from_slice(&[center + 1, center, index - 1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessel_core::{Circle, Ellipse, Point, Polygon, Rectangle, RoundedRectangle};

    fn area(vertices: &[f32], indices: &[u32]) -> f32 {
        indices
            .chunks_exact(3)
            .map(|t| {
                let p = |i: u32| (vertices[i as usize * 2], vertices[i as usize * 2 + 1]);
                let (a, b, c) = (p(t[0]), p(t[1]), p(t[2]));
                ((b.0 - a.0) * (c.1 - a.1) - (c.0 - a.0) * (b.1 - a.1)).abs() / 2.0
            })
            .sum()
    }

    fn fill(shape: Shape) -> (Vec<f32>, Vec<u32>) {
        let mut points = Vec::new();
        build_points(&shape, &mut points);
        let mut vertices = Vec::new();
        let mut indices = Vec::new();
        triangulate(&shape, &points, &mut vertices, &mut indices);
        (vertices, indices)
    }

    #[test]
    fn test_rectangle_quad() {
        let (vertices, indices) = fill(Rectangle::new(10.0, 20.0, 30.0, 40.0).into());
        assert_eq!(vertices, vec![10.0, 20.0, 40.0, 20.0, 40.0, 60.0, 10.0, 60.0]);
        assert_eq!(indices, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn test_circle_points_lie_on_circle() {
        let shape: Shape = Circle::new(Point::new(5.0, -5.0), 50.0).into();
        let mut points = Vec::new();
        build_points(&shape, &mut points);
        let n = (2.3 * 100f32.sqrt()).ceil() as usize;
        assert_eq!(points.len(), n * 8);
        for p in points.chunks_exact(2) {
            let r = ((p[0] - 5.0).powi(2) + (p[1] + 5.0).powi(2)).sqrt();
            assert!((r - 50.0).abs() < 1e-3);
        }
        // Starts on the right, no duplicated seam
        assert_eq!((points[0], points[1]), (55.0, -5.0));
        let last = points.len() - 2;
        assert_ne!((points[last], points[last + 1]), (points[0], points[1]));
    }

    #[test]
    fn test_circle_fan_area() {
        let (vertices, indices) = fill(Circle::new(Point::ZERO, 10.0).into());
        let expected = std::f32::consts::PI * 100.0;
        let got = area(&vertices, &indices);
        assert!(got < expected && got > expected * 0.98, "area {got}");
        // One triangle per outline point
        assert_eq!(indices.len() / 3, vertices.len() / 2 - 1);
    }

    #[test]
    fn test_rounded_rect_area() {
        let shape: Shape = RoundedRectangle::new(0.0, 0.0, 100.0, 50.0, 10.0).into();
        let (vertices, indices) = fill(shape);
        let expected = 100.0 * 50.0 - (4.0 - std::f32::consts::PI) * 100.0;
        assert!((area(&vertices, &indices) - expected).abs() < 5.0);
        let min_y = vertices.chunks(2).map(|p| p[1]).fold(f32::MAX, f32::min);
        assert!(min_y.abs() < 1e-4);
    }

    #[test]
    fn test_zero_radius_degrades_to_corners() {
        let mut points = Vec::new();
        build_points(&Ellipse::new(Point::new(1.0, 1.0), 0.0, 0.0).into(), &mut points);
        assert!(points.is_empty());

        build_points(
            &RoundedRectangle::new(0.0, 0.0, 10.0, 10.0, 0.0).into(),
            &mut points,
        );
        assert_eq!(points.len(), 8);
    }

    #[test]
    fn test_polygon_uses_ear_clipping() {
        let l_shape = Polygon::new(
            vec![0.0, 0.0, 20.0, 0.0, 20.0, 10.0, 10.0, 10.0, 10.0, 20.0, 0.0, 20.0],
            true,
        );
        let (vertices, indices) = fill(l_shape.into());
        assert_eq!(indices.len(), 4 * 3);
        assert!((area(&vertices, &indices) - 300.0).abs() < 1e-3);
    }

    #[test]
    fn test_offsets_continue_existing_buffers() {
        let shape: Shape = Rectangle::new(0.0, 0.0, 1.0, 1.0).into();
        let mut points = Vec::new();
        build_points(&shape, &mut points);
        let mut vertices = vec![0.0; 10];
        let mut indices = Vec::new();
        triangulate(&shape, &points, &mut vertices, &mut indices);
        assert_eq!(indices, vec![5, 6, 7, 5, 7, 8]);
    }

    #[test]
    fn test_odd_polygon_drops_dangling_coordinate() {
        let dangling = Polygon::new(vec![0.0, 0.0, 10.0, 0.0, 10.0, 10.0, 5.0], true);
        let (vertices, indices) = fill(dangling.into());
        assert_eq!(vertices, vec![0.0, 0.0, 10.0, 0.0, 10.0, 10.0]);
        assert_eq!(indices.len(), 3);
    }

    #[test]
    fn test_huge_radius_is_capped() {
        let mut points = Vec::new();
        build_points(&Circle::new(Point::new(0.0, 0.0), 1e30).into(), &mut points);
        assert_eq!(points.len(), MAX_QUADRANT_SEGMENTS * 8);

        let mut infinite = Vec::new();
        build_points(&Circle::new(Point::new(0.0, 0.0), f32::INFINITY).into(), &mut infinite);
        assert!(infinite.len() <= MAX_QUADRANT_SEGMENTS * 8);
    }
}
