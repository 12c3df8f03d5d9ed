//! Adaptive quadratic Bezier subdivision

use super::{fold_angle, CurveTolerance, FLT_EPSILON, RECURSION_LIMIT};
use tessel_core::Point;

/// Flatten a quadratic Bezier from `start` into `points` (start excluded, end included)
pub fn build_adaptive_quadratic(
    points: &mut Vec<f32>,
    start: Point,
    cp: Point,
    end: Point,
    smoothness: f32,
) {
    build_adaptive_quadratic_with(
        points,
        start,
        cp,
        end,
        &CurveTolerance::from_smoothness(smoothness),
    );
}

pub fn build_adaptive_quadratic_with(
    points: &mut Vec<f32>,
    start: Point,
    cp: Point,
    end: Point,
    tolerance: &CurveTolerance,
) {
    recursive(points, start, cp, end, tolerance, 0);
    points.extend_from_slice(&[end.x, end.y]);
}

fn recursive(
    points: &mut Vec<f32>,
    p1: Point,
    p2: Point,
    p3: Point,
    tol: &CurveTolerance,
    level: u32,
) {
    if level > RECURSION_LIMIT {
        return;
    }

    let p12 = p1.lerp(p2, 0.5);
    let p23 = p2.lerp(p3, 0.5);
    let p123 = p12.lerp(p23, 0.5);

    let dx = p3.x - p1.x;
    let dy = p3.y - p1.y;
    let d = ((p2.x - p3.x) * dy - (p2.y - p3.y) * dx).abs();

    if d > FLT_EPSILON {
        if d * d <= tol.distance_sq * (dx * dx + dy * dy) {
            if !tol.angle_enabled() {
                points.extend_from_slice(&[p123.x, p123.y]);
                return;
            }

            let da = fold_angle((p3.y - p2.y).atan2(p3.x - p2.x) - (p2.y - p1.y).atan2(p2.x - p1.x));
            if da < tol.angle {
                points.extend_from_slice(&[p123.x, p123.y]);
                return;
            }
        }
    } else {
        let mid = p1.lerp(p3, 0.5);
        if (p123 - mid).length_squared() <= tol.distance_sq {
            points.extend_from_slice(&[p123.x, p123.y]);
            return;
        }
    }

    recursive(points, p1, p12, p123, tol, level + 1);
    recursive(points, p123, p23, p3, tol, level + 1);
}
