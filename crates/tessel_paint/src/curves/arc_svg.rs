//! SVG elliptical arcs, converted to cubic segments of at most 90 degrees each

use super::{build_adaptive_bezier, DEFAULT_BEZIER_SMOOTHNESS};
use std::f32::consts::{FRAC_PI_2, TAU};
use tessel_core::Point;

/// Handle length for a quarter circle; avoids the tan() rounding at exactly +-90 degrees
const QUARTER_ARC_KAPPA: f32 = 0.551_915_03;

struct ArcCenter {
    center: Point,
    start_angle: f32,
    sweep_angle: f32,
}

fn vector_angle(ux: f32, uy: f32, vx: f32, vy: f32) -> f32 {
    let sign = if ux * vy - uy * vx < 0.0 { -1.0 } else { 1.0 };
    let dot = (ux * vx + uy * vy).clamp(-1.0, 1.0);
    sign * dot.acos()
}

#[allow(clippy::too_many_arguments)]
fn arc_center(
    from: Point,
    to: Point,
    rx: f32,
    ry: f32,
    large_arc: bool,
    sweep: bool,
    sin_phi: f32,
    cos_phi: f32,
    pxp: f32,
    pyp: f32,
) -> ArcCenter {
    let rx_sq = rx * rx;
    let ry_sq = ry * ry;
    let pxp_sq = pxp * pxp;
    let pyp_sq = pyp * pyp;

    let mut radicant = (rx_sq * ry_sq - rx_sq * pyp_sq - ry_sq * pxp_sq).max(0.0);
    radicant /= rx_sq * pyp_sq + ry_sq * pxp_sq;
    radicant = radicant.sqrt() * if large_arc == sweep { -1.0 } else { 1.0 };

    let center_xp = radicant * rx / ry * pyp;
    let center_yp = radicant * -ry / rx * pxp;

    let center = Point::new(
        cos_phi * center_xp - sin_phi * center_yp + (from.x + to.x) / 2.0,
        sin_phi * center_xp + cos_phi * center_yp + (from.y + to.y) / 2.0,
    );

    let vx1 = (pxp - center_xp) / rx;
    let vy1 = (pyp - center_yp) / ry;
    let vx2 = (-pxp - center_xp) / rx;
    let vy2 = (-pyp - center_yp) / ry;

    let start_angle = vector_angle(1.0, 0.0, vx1, vy1);
    let mut sweep_angle = vector_angle(vx1, vy1, vx2, vy2);

    if !sweep && sweep_angle > 0.0 {
        sweep_angle -= TAU;
    }
    if sweep && sweep_angle < 0.0 {
        sweep_angle += TAU;
    }

    ArcCenter {
        center,
        start_angle,
        sweep_angle,
    }
}

/// Control points of a unit-circle cubic from `start` sweeping `sweep` (|sweep| <= 90 degrees)
fn approx_unit_arc(start: f32, sweep: f32) -> [Point; 3] {
    let a = if sweep == FRAC_PI_2 {
        QUARTER_ARC_KAPPA
    } else if sweep == -FRAC_PI_2 {
        -QUARTER_ARC_KAPPA
    } else {
        4.0 / 3.0 * (sweep / 4.0).tan()
    };

    let (y1, x1) = start.sin_cos();
    let (y2, x2) = (start + sweep).sin_cos();

    [
        Point::new(x1 - y1 * a, y1 + x1 * a),
        Point::new(x2 + y2 * a, y2 - x2 * a),
        Point::new(x2, y2),
    ]
}

fn map_to_ellipse(p: Point, rx: f32, ry: f32, cos_phi: f32, sin_phi: f32, center: Point) -> Point {
    let x = p.x * rx;
    let y = p.y * ry;
    Point::new(
        cos_phi * x - sin_phi * y + center.x,
        sin_phi * x + cos_phi * y + center.y,
    )
}

/// Flatten an SVG `A` command from `from` to `to` into `points`
///
/// `rotation` is the ellipse's x-axis rotation in degrees. Zero radii draw a
/// straight line to `to`; coincident endpoints draw nothing.
#[allow(clippy::too_many_arguments)]
pub fn build_arc_to_svg(
    points: &mut Vec<f32>,
    from: Point,
    to: Point,
    rx: f32,
    ry: f32,
    rotation: f32,
    large_arc: bool,
    sweep: bool,
    smoothness: Option<f32>,
) {
    if rx == 0.0 || ry == 0.0 {
        points.extend_from_slice(&[to.x, to.y]);
        return;
    }

    let (sin_phi, cos_phi) = (rotation * TAU / 360.0).sin_cos();

    let pxp = cos_phi * (from.x - to.x) / 2.0 + sin_phi * (from.y - to.y) / 2.0;
    let pyp = -sin_phi * (from.x - to.x) / 2.0 + cos_phi * (from.y - to.y) / 2.0;

    if pxp == 0.0 && pyp == 0.0 {
        return;
    }

    let mut rx = rx.abs();
    let mut ry = ry.abs();

    let lambda = (pxp * pxp) / (rx * rx) + (pyp * pyp) / (ry * ry);
    if lambda > 1.0 {
        let scale = lambda.sqrt();
        rx *= scale;
        ry *= scale;
    }

    let ArcCenter {
        center,
        mut start_angle,
        sweep_angle,
    } = arc_center(from, to, rx, ry, large_arc, sweep, sin_phi, cos_phi, pxp, pyp);

    let mut ratio = sweep_angle.abs() / (TAU / 4.0);
    if (1.0 - ratio).abs() < 1e-7 {
        ratio = 1.0;
    }
    let segments = (ratio.ceil() as usize).max(1);
    let segment_sweep = sweep_angle / segments as f32;
    let smoothness = smoothness.unwrap_or(DEFAULT_BEZIER_SMOOTHNESS);

    let mut last = from;
    for _ in 0..segments {
        let [c1, c2, end] = approx_unit_arc(start_angle, segment_sweep);
        let c1 = map_to_ellipse(c1, rx, ry, cos_phi, sin_phi, center);
        let c2 = map_to_ellipse(c2, rx, ry, cos_phi, sin_phi, center);
        let end = map_to_ellipse(end, rx, ry, cos_phi, sin_phi, center);

        build_adaptive_bezier(points, last, c1, c2, end, smoothness);

        last = end;
        start_angle += segment_sweep;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semicircle_lands_on_end() {
        let mut points = Vec::new();
        build_arc_to_svg(
            &mut points,
            Point::new(0.0, 0.0),
            Point::new(20.0, 0.0),
            10.0,
            10.0,
            0.0,
            false,
            true,
            None,
        );
        let n = points.len();
        assert!((points[n - 2] - 20.0).abs() < 1e-3 && points[n - 1].abs() < 1e-3);
        // Sweep flag set: the arc bulges towards -y, every point on the circle around (10, 0)
        let mut min_y = f32::MAX;
        for p in points.chunks_exact(2) {
            let d = ((p[0] - 10.0).powi(2) + p[1].powi(2)).sqrt();
            assert!((d - 10.0).abs() < 0.05, "distance {d}");
            min_y = min_y.min(p[1]);
        }
        assert!(min_y < -9.0);
    }

    #[test]
    fn test_small_radii_are_scaled_up() {
        let mut points = Vec::new();
        build_arc_to_svg(
            &mut points,
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            1.0,
            1.0,
            0.0,
            false,
            false,
            None,
        );
        let n = points.len();
        assert!((points[n - 2] - 100.0).abs() < 1e-2);
        // Radius grew to 50, so the arc reaches about 50 units off the chord
        let max_y = points.chunks_exact(2).map(|p| p[1]).fold(f32::MIN, f32::max);
        assert!((max_y - 50.0).abs() < 0.5);
    }

    #[test]
    fn test_degenerate_arcs() {
        let mut points = Vec::new();
        let p = Point::new(3.0, 4.0);
        build_arc_to_svg(&mut points, p, p, 5.0, 5.0, 0.0, false, false, None);
        assert!(points.is_empty());

        build_arc_to_svg(&mut points, p, Point::new(9.0, 9.0), 0.0, 5.0, 0.0, false, false, None);
        assert_eq!(points, vec![9.0, 9.0]);
    }
}
