//! Stroke outline triangulation
//!
//! A polyline is expanded into a triangle strip: every corner contributes an
//! inner/outer vertex pair (more for joins and caps), and consecutive vertex
//! triples form the triangles. Degenerate triangles are dropped at the end.

use std::f32::consts::PI;
use tessel_paint::{LineCap, LineJoin, StrokeStyle};

/// Tolerance for treating the first and last points as the same point
const CLOSE_POINT_EPS: f32 = 1e-4;

/// Triangles with twice-area below `CURVE_EPS²` are skipped
const CURVE_EPS: f32 = 1e-4;

/// What `build_line` needs from a stroke style
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineStyle {
    pub width: f32,
    pub alignment: f32,
    pub cap: LineCap,
    pub join: LineJoin,
    pub miter_limit: f32,
}

impl From<&StrokeStyle> for LineStyle {
    fn from(style: &StrokeStyle) -> Self {
        Self {
            width: style.width,
            alignment: style.alignment,
            cap: style.cap,
            join: style.join,
            miter_limit: style.miter_limit,
        }
    }
}

impl Default for LineStyle {
    fn default() -> Self {
        LineStyle::from(&StrokeStyle::default())
    }
}

/// +1 for a positively wound ring, -1 otherwise; short rings count as +1
fn orientation_of(points: &[f32]) -> f32 {
    let m = points.len();
    if m < 6 {
        return 1.0;
    }
    let mut area = 0.0;
    let (mut x1, mut y1) = (points[m - 2], points[m - 1]);
    for pair in points.chunks_exact(2) {
        let (x2, y2) = (pair[0], pair[1]);
        area += (x2 - x1) * (y2 + y1);
        x1 = x2;
        y1 = y2;
    }
    if area < 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// Copy `points` without consecutive duplicates
fn dedupe(points: &[f32]) -> Vec<f32> {
    let mut out: Vec<f32> = Vec::with_capacity(points.len());
    for pair in points.chunks_exact(2) {
        let n = out.len();
        if n >= 2 && out[n - 2] == pair[0] && out[n - 1] == pair[1] {
            continue;
        }
        out.extend_from_slice(pair);
    }
    out
}

/// Unit normal of the segment `(x0, y0) -> (x1, y1)` scaled to `width`
fn scaled_perp(x0: f32, y0: f32, x1: f32, y1: f32, width: f32) -> (f32, f32) {
    let px = -(y0 - y1);
    let py = x0 - x1;
    let dist = (px * px + py * py).sqrt();
    (px / dist * width, py / dist * width)
}

/// Emit the outline of a polyline into `vertices` / `indices`
///
/// `points` is in path space. Indices are absolute vertex numbers of
/// `vertices`. With `flip_alignment` the alignment is mirrored relative to
/// the ring's orientation. Fewer than two distinct points emit nothing.
pub fn build_line(
    points: &[f32],
    style: &LineStyle,
    flip_alignment: bool,
    closed: bool,
    vertices: &mut Vec<f32>,
    indices: &mut Vec<u32>,
) {
    let mut points = dedupe(points);
    if points.len() < 4 || style.width <= 0.0 {
        return;
    }

    let mut alignment = style.alignment;
    if alignment != 0.5 {
        let mut orientation = orientation_of(&points);
        if flip_alignment {
            orientation = -orientation;
        }
        alignment = (alignment - 0.5) * orientation + 0.5;
    }

    let (first_x, first_y) = (points[0], points[1]);
    let n = points.len();
    let (mut last_x, mut last_y) = (points[n - 2], points[n - 1]);
    let closed_path =
        (first_x - last_x).abs() < CLOSE_POINT_EPS && (first_y - last_y).abs() < CLOSE_POINT_EPS;

    if closed {
        if closed_path {
            points.truncate(n - 2);
            if points.len() < 4 {
                return;
            }
            let n = points.len();
            last_x = points[n - 2];
            last_y = points[n - 1];
        }
        // Start and end on a virtual midpoint of the closing edge
        let mid_x = (first_x + last_x) * 0.5;
        let mid_y = (first_y + last_y) * 0.5;
        points.splice(0..0, [mid_x, mid_y]);
        points.extend_from_slice(&[mid_x, mid_y]);
    }

    let length = points.len() / 2;
    let index_start = vertices.len() / 2;

    let width = style.width / 2.0;
    let width_sq = width * width;
    let miter_limit_sq = style.miter_limit * style.miter_limit;

    let inner_weight = (1.0 - alignment) * 2.0;
    let outer_weight = alignment * 2.0;

    let (x0, y0) = (points[0], points[1]);
    let (perp_x, perp_y) = scaled_perp(x0, y0, points[2], points[3], width);

    if !closed {
        match style.cap {
            LineCap::Round => round(
                x0 - perp_x * (inner_weight - outer_weight) * 0.5,
                y0 - perp_y * (inner_weight - outer_weight) * 0.5,
                x0 - perp_x * inner_weight,
                y0 - perp_y * inner_weight,
                x0 + perp_x * outer_weight,
                y0 + perp_y * outer_weight,
                vertices,
                true,
            ),
            LineCap::Square => square(
                x0,
                y0,
                perp_x,
                perp_y,
                inner_weight,
                outer_weight,
                true,
                vertices,
            ),
            LineCap::Butt => {}
        }
    }

    vertices.extend_from_slice(&[
        x0 - perp_x * inner_weight,
        y0 - perp_y * inner_weight,
        x0 + perp_x * outer_weight,
        y0 + perp_y * outer_weight,
    ]);

    for i in 1..length - 1 {
        let (x0, y0) = (points[(i - 1) * 2], points[(i - 1) * 2 + 1]);
        let (x1, y1) = (points[i * 2], points[i * 2 + 1]);
        let (x2, y2) = (points[(i + 1) * 2], points[(i + 1) * 2 + 1]);

        let (perp_x, perp_y) = scaled_perp(x0, y0, x1, y1, width);
        let (perp1_x, perp1_y) = scaled_perp(x1, y1, x2, y2, width);

        let dx0 = x1 - x0;
        let dy0 = y0 - y1;
        let dx1 = x1 - x2;
        let dy1 = y2 - y1;

        // Positive when the internal angle is under 90 degrees
        let dot = dx0 * dx1 + dy0 * dy1;
        let cross = dy0 * dx1 - dy1 * dx0;
        let clockwise = cross < 0.0;

        // Nearly parallel segments
        if cross.abs() < 0.001 * dot.abs() {
            vertices.extend_from_slice(&[
                x1 - perp_x * inner_weight,
                y1 - perp_y * inner_weight,
                x1 + perp_x * outer_weight,
                y1 + perp_y * outer_weight,
            ]);

            // The path doubles back on itself
            if dot >= 0.0 {
                if style.join == LineJoin::Round {
                    round(
                        x1,
                        y1,
                        x1 - perp_x * inner_weight,
                        y1 - perp_y * inner_weight,
                        x1 - perp1_x * inner_weight,
                        y1 - perp1_y * inner_weight,
                        vertices,
                        false,
                    );
                }
                vertices.extend_from_slice(&[
                    x1 - perp1_x * outer_weight,
                    y1 - perp1_y * outer_weight,
                    x1 + perp1_x * inner_weight,
                    y1 + perp1_y * inner_weight,
                ]);
            }
            continue;
        }

        // Miter point: intersection of the two offset edges
        let c1 = (-perp_x + x0) * (-perp_y + y1) - (-perp_x + x1) * (-perp_y + y0);
        let c2 = (-perp1_x + x2) * (-perp1_y + y1) - (-perp1_x + x1) * (-perp1_y + y2);
        let px = (dx0 * c2 - dx1 * c1) / cross;
        let py = (dy1 * c1 - dy0 * c2) / cross;
        let p_dist = (px - x1) * (px - x1) + (py - y1) * (py - y1);

        let imx = x1 + (px - x1) * inner_weight;
        let imy = y1 + (py - y1) * inner_weight;
        let omx = x1 - (px - x1) * outer_weight;
        let omy = y1 - (py - y1) * outer_weight;

        // An inside miter reaching past the shorter segment would spike
        let smaller_inside_segment_sq = (dx0 * dx0 + dy0 * dy0).min(dx1 * dx1 + dy1 * dy1);
        let inside_weight = if clockwise { inner_weight } else { outer_weight };
        let smaller_inside_diagonal_sq =
            smaller_inside_segment_sq + inside_weight * inside_weight * width_sq;
        let inside_miter_ok = p_dist <= smaller_inside_diagonal_sq;

        if inside_miter_ok {
            if style.join == LineJoin::Bevel || p_dist / width_sq > miter_limit_sq {
                if clockwise {
                    vertices.extend_from_slice(&[
                        imx,
                        imy,
                        x1 + perp_x * outer_weight,
                        y1 + perp_y * outer_weight,
                        imx,
                        imy,
                        x1 + perp1_x * outer_weight,
                        y1 + perp1_y * outer_weight,
                    ]);
                } else {
                    vertices.extend_from_slice(&[
                        x1 - perp_x * inner_weight,
                        y1 - perp_y * inner_weight,
                        omx,
                        omy,
                        x1 - perp1_x * inner_weight,
                        y1 - perp1_y * inner_weight,
                        omx,
                        omy,
                    ]);
                }
            } else if style.join == LineJoin::Round {
                if clockwise {
                    vertices.extend_from_slice(&[
                        imx,
                        imy,
                        x1 + perp_x * outer_weight,
                        y1 + perp_y * outer_weight,
                    ]);
                    round(
                        x1,
                        y1,
                        x1 + perp_x * outer_weight,
                        y1 + perp_y * outer_weight,
                        x1 + perp1_x * outer_weight,
                        y1 + perp1_y * outer_weight,
                        vertices,
                        true,
                    );
                    vertices.extend_from_slice(&[
                        imx,
                        imy,
                        x1 + perp1_x * outer_weight,
                        y1 + perp1_y * outer_weight,
                    ]);
                } else {
                    vertices.extend_from_slice(&[
                        x1 - perp_x * inner_weight,
                        y1 - perp_y * inner_weight,
                        omx,
                        omy,
                    ]);
                    round(
                        x1,
                        y1,
                        x1 - perp_x * inner_weight,
                        y1 - perp_y * inner_weight,
                        x1 - perp1_x * inner_weight,
                        y1 - perp1_y * inner_weight,
                        vertices,
                        false,
                    );
                    vertices.extend_from_slice(&[
                        x1 - perp1_x * inner_weight,
                        y1 - perp1_y * inner_weight,
                        omx,
                        omy,
                    ]);
                }
            } else {
                vertices.extend_from_slice(&[imx, imy, omx, omy]);
            }
        } else {
            vertices.extend_from_slice(&[
                x1 - perp_x * inner_weight,
                y1 - perp_y * inner_weight,
                x1 + perp_x * outer_weight,
                y1 + perp_y * outer_weight,
            ]);
            match style.join {
                LineJoin::Round if clockwise => round(
                    x1,
                    y1,
                    x1 + perp_x * outer_weight,
                    y1 + perp_y * outer_weight,
                    x1 + perp1_x * outer_weight,
                    y1 + perp1_y * outer_weight,
                    vertices,
                    true,
                ),
                LineJoin::Round => round(
                    x1,
                    y1,
                    x1 - perp_x * inner_weight,
                    y1 - perp_y * inner_weight,
                    x1 - perp1_x * inner_weight,
                    y1 - perp1_y * inner_weight,
                    vertices,
                    false,
                ),
                LineJoin::Miter if p_dist / width_sq <= miter_limit_sq => {
                    if clockwise {
                        vertices.extend_from_slice(&[omx, omy, omx, omy]);
                    } else {
                        vertices.extend_from_slice(&[imx, imy, imx, imy]);
                    }
                }
                _ => {}
            }
            vertices.extend_from_slice(&[
                x1 - perp1_x * inner_weight,
                y1 - perp1_y * inner_weight,
                x1 + perp1_x * outer_weight,
                y1 + perp1_y * outer_weight,
            ]);
        }
    }

    let (x0, y0) = (points[(length - 2) * 2], points[(length - 2) * 2 + 1]);
    let (x1, y1) = (points[(length - 1) * 2], points[(length - 1) * 2 + 1]);
    let (perp_x, perp_y) = scaled_perp(x0, y0, x1, y1, width);

    vertices.extend_from_slice(&[
        x1 - perp_x * inner_weight,
        y1 - perp_y * inner_weight,
        x1 + perp_x * outer_weight,
        y1 + perp_y * outer_weight,
    ]);

    if !closed {
        match style.cap {
            LineCap::Round => round(
                x1 - perp_x * (inner_weight - outer_weight) * 0.5,
                y1 - perp_y * (inner_weight - outer_weight) * 0.5,
                x1 - perp_x * inner_weight,
                y1 - perp_y * inner_weight,
                x1 + perp_x * outer_weight,
                y1 + perp_y * outer_weight,
                vertices,
                false,
            ),
            LineCap::Square => square(
                x1,
                y1,
                perp_x,
                perp_y,
                inner_weight,
                outer_weight,
                false,
                vertices,
            ),
            LineCap::Butt => {}
        }
    }

    let eps_sq = CURVE_EPS * CURVE_EPS;
    let vertex_end = vertices.len() / 2;
    for i in index_start..vertex_end.saturating_sub(2) {
        let (x0, y0) = (vertices[i * 2], vertices[i * 2 + 1]);
        let (x1, y1) = (vertices[(i + 1) * 2], vertices[(i + 1) * 2 + 1]);
        let (x2, y2) = (vertices[(i + 2) * 2], vertices[(i + 2) * 2 + 1]);

        if (x0 * (y1 - y2) + x1 * (y2 - y0) + x2 * (y0 - y1)).abs() < eps_sq {
            continue;
        }
        indices.extend_from_slice(&[i as u32, i as u32 + 1, i as u32 + 2]);
    }
}

/// Square cap: the end pair pushed out by half the width along the tangent
#[allow(clippy::too_many_arguments)]
fn square(
    x: f32,
    y: f32,
    nx: f32,
    ny: f32,
    inner_weight: f32,
    outer_weight: f32,
    clockwise: bool,
    vertices: &mut Vec<f32>,
) {
    let ix = x - nx * inner_weight;
    let iy = y - ny * inner_weight;
    let ox = x + nx * outer_weight;
    let oy = y + ny * outer_weight;

    let (ex, ey) = if clockwise { (ny, -nx) } else { (-ny, nx) };

    vertices.extend_from_slice(&[ix + ex, iy + ey, ox + ex, oy + ey]);
}

/// Arc fan around `(cx, cy)` from `(sx, sy)` to `(ex, ey)`, interleaved with the center
#[allow(clippy::too_many_arguments)]
fn round(
    cx: f32,
    cy: f32,
    sx: f32,
    sy: f32,
    ex: f32,
    ey: f32,
    vertices: &mut Vec<f32>,
    clockwise: bool,
) {
    let c2p0_x = sx - cx;
    let c2p0_y = sy - cy;

    let mut angle0 = c2p0_x.atan2(c2p0_y);
    let mut angle1 = (ex - cx).atan2(ey - cy);

    if clockwise && angle0 < angle1 {
        angle0 += PI * 2.0;
    } else if !clockwise && angle0 > angle1 {
        angle1 += PI * 2.0;
    }

    let angle_diff = angle1 - angle0;
    let radius = (c2p0_x * c2p0_x + c2p0_y * c2p0_y).sqrt();
    let segments = 15.0 * angle_diff.abs() * radius.sqrt() / PI;
    let seg_count = if segments.is_finite() {
        segments as usize + 1
    } else {
        1
    };
    let angle_inc = angle_diff / seg_count as f32;
    let mut angle = angle0 + angle_inc;

    if clockwise {
        vertices.extend_from_slice(&[cx, cy, sx, sy]);
        for _ in 1..seg_count {
            vertices.extend_from_slice(&[cx, cy, cx + angle.sin() * radius, cy + angle.cos() * radius]);
            angle += angle_inc;
        }
        vertices.extend_from_slice(&[cx, cy, ex, ey]);
    } else {
        vertices.extend_from_slice(&[sx, sy, cx, cy]);
        for _ in 1..seg_count {
            vertices.extend_from_slice(&[cx + angle.sin() * radius, cy + angle.cos() * radius, cx, cy]);
            angle += angle_inc;
        }
        vertices.extend_from_slice(&[ex, ey, cx, cy]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style(width: f32, cap: LineCap, join: LineJoin) -> LineStyle {
        LineStyle {
            width,
            cap,
            join,
            ..LineStyle::default()
        }
    }

    fn triangle_area(vertices: &[f32], indices: &[u32]) -> f32 {
        indices
            .chunks_exact(3)
            .map(|t| {
                let p = |i: u32| (vertices[i as usize * 2], vertices[i as usize * 2 + 1]);
                let (a, b, c) = (p(t[0]), p(t[1]), p(t[2]));
                ((b.0 - a.0) * (c.1 - a.1) - (c.0 - a.0) * (b.1 - a.1)).abs() / 2.0
            })
            .sum()
    }

    #[test]
    fn test_butt_segment_is_a_quad() {
        let mut vertices = Vec::new();
        let mut indices = Vec::new();
        build_line(
            &[0.0, 0.0, 100.0, 0.0],
            &style(10.0, LineCap::Butt, LineJoin::Miter),
            false,
            false,
            &mut vertices,
            &mut indices,
        );
        assert_eq!(vertices.len(), 8);
        assert_eq!(indices, vec![0, 1, 2, 1, 2, 3]);
        assert!((triangle_area(&vertices, &indices) - 1000.0).abs() < 1e-2);
        assert!(vertices.chunks(2).all(|p| p[1].abs() == 5.0));
    }

    #[test]
    fn test_square_cap_extends_by_half_width() {
        let mut vertices = Vec::new();
        let mut indices = Vec::new();
        build_line(
            &[0.0, 0.0, 100.0, 0.0],
            &style(10.0, LineCap::Square, LineJoin::Miter),
            false,
            false,
            &mut vertices,
            &mut indices,
        );
        let min_x = vertices.chunks(2).map(|p| p[0]).fold(f32::MAX, f32::min);
        let max_x = vertices.chunks(2).map(|p| p[0]).fold(f32::MIN, f32::max);
        assert_eq!((min_x, max_x), (-5.0, 105.0));
        assert!((triangle_area(&vertices, &indices) - 1100.0).abs() < 1e-2);
    }

    #[test]
    fn test_alignment_shifts_outline() {
        let mut vertices = Vec::new();
        let mut indices = Vec::new();
        let outside = LineStyle {
            alignment: 0.0,
            ..style(10.0, LineCap::Butt, LineJoin::Miter)
        };
        build_line(&[0.0, 0.0, 100.0, 0.0], &outside, false, false, &mut vertices, &mut indices);
        let ys: Vec<f32> = vertices.chunks(2).map(|p| p[1]).collect();
        // All width on one side of the centerline
        assert!(ys.iter().all(|&y| y == 0.0 || y.abs() == 10.0));
        assert!((triangle_area(&vertices, &indices) - 1000.0).abs() < 1e-2);
    }

    #[test]
    fn test_closed_square_outline_area() {
        let mut vertices = Vec::new();
        let mut indices = Vec::new();
        build_line(
            &[0.0, 0.0, 100.0, 0.0, 100.0, 100.0, 0.0, 100.0],
            &style(2.0, LineCap::Butt, LineJoin::Miter),
            false,
            true,
            &mut vertices,
            &mut indices,
        );
        // Ring between the 101 and 99 squares
        let expected = 102.0 * 102.0 - 98.0 * 98.0;
        assert!((triangle_area(&vertices, &indices) - expected).abs() < 0.5);
    }

    #[test]
    fn test_duplicate_points_do_not_produce_nan() {
        let mut vertices = Vec::new();
        let mut indices = Vec::new();
        build_line(
            &[0.0, 0.0, 0.0, 0.0, 50.0, 0.0, 50.0, 0.0],
            &style(4.0, LineCap::Round, LineJoin::Round),
            false,
            false,
            &mut vertices,
            &mut indices,
        );
        assert!(vertices.iter().all(|v| v.is_finite()));
        assert!(!indices.is_empty());

        let mut vertices = Vec::new();
        build_line(
            &[5.0, 5.0, 5.0, 5.0],
            &style(4.0, LineCap::Round, LineJoin::Round),
            false,
            false,
            &mut vertices,
            &mut indices,
        );
        assert!(vertices.is_empty());
    }

    #[test]
    fn test_bevel_and_round_joins_add_geometry() {
        let points = [0.0, 0.0, 50.0, 0.0, 50.0, 50.0];
        let count = |join| {
            let mut vertices = Vec::new();
            let mut indices = Vec::new();
            build_line(
                &points,
                &style(10.0, LineCap::Butt, join),
                false,
                false,
                &mut vertices,
                &mut indices,
            );
            vertices.len() / 2
        };
        let miter = count(LineJoin::Miter);
        let bevel = count(LineJoin::Bevel);
        let round = count(LineJoin::Round);
        assert_eq!(miter, 6);
        assert_eq!(bevel, 8);
        assert!(round > bevel);
    }
}
