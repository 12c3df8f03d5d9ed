//! Adaptive cubic Bezier subdivision

use super::{fold_angle, CurveTolerance, FLT_EPSILON, RECURSION_LIMIT};
use tessel_core::Point;

/// Flatten a cubic Bezier from `start` into `points` (start excluded, end included)
pub fn build_adaptive_bezier(
    points: &mut Vec<f32>,
    start: Point,
    cp1: Point,
    cp2: Point,
    end: Point,
    smoothness: f32,
) {
    build_adaptive_bezier_with(
        points,
        start,
        cp1,
        cp2,
        end,
        &CurveTolerance::from_smoothness(smoothness),
    );
}

pub fn build_adaptive_bezier_with(
    points: &mut Vec<f32>,
    start: Point,
    cp1: Point,
    cp2: Point,
    end: Point,
    tolerance: &CurveTolerance,
) {
    recursive(points, start, cp1, cp2, end, tolerance, 0);
    points.extend_from_slice(&[end.x, end.y]);
}

fn push(points: &mut Vec<f32>, p: Point) {
    points.extend_from_slice(&[p.x, p.y]);
}

fn recursive(
    points: &mut Vec<f32>,
    p1: Point,
    p2: Point,
    p3: Point,
    p4: Point,
    tol: &CurveTolerance,
    level: u32,
) {
    if level > RECURSION_LIMIT {
        return;
    }

    let p12 = p1.lerp(p2, 0.5);
    let p23 = p2.lerp(p3, 0.5);
    let p34 = p3.lerp(p4, 0.5);
    let p123 = p12.lerp(p23, 0.5);
    let p234 = p23.lerp(p34, 0.5);
    let p1234 = p123.lerp(p234, 0.5);

    if level > 0 {
        let dx = p4.x - p1.x;
        let dy = p4.y - p1.y;
        let chord_sq = dx * dx + dy * dy;

        let d2 = ((p2.x - p4.x) * dy - (p2.y - p4.y) * dx).abs();
        let d3 = ((p3.x - p4.x) * dy - (p3.y - p4.y) * dx).abs();

        if d2 > FLT_EPSILON && d3 > FLT_EPSILON {
            // Regular case
            if (d2 + d3) * (d2 + d3) <= tol.distance_sq * chord_sq {
                if !tol.angle_enabled() {
                    push(points, p1234);
                    return;
                }

                let a23 = (p3.y - p2.y).atan2(p3.x - p2.x);
                let da1 = fold_angle(a23 - (p2.y - p1.y).atan2(p2.x - p1.x));
                let da2 = fold_angle((p4.y - p3.y).atan2(p4.x - p3.x) - a23);

                if da1 + da2 < tol.angle {
                    push(points, p1234);
                    return;
                }

                if tol.cusp_limit != 0.0 {
                    if da1 > tol.cusp_limit {
                        push(points, p2);
                        return;
                    }
                    if da2 > tol.cusp_limit {
                        push(points, p3);
                        return;
                    }
                }
            }
        } else if d2 > FLT_EPSILON {
            // p1, p3 and p4 are collinear, p2 is significant
            if d2 * d2 <= tol.distance_sq * chord_sq {
                if !tol.angle_enabled() {
                    push(points, p1234);
                    return;
                }

                let da1 = fold_angle(
                    (p3.y - p2.y).atan2(p3.x - p2.x) - (p2.y - p1.y).atan2(p2.x - p1.x),
                );

                if da1 < tol.angle {
                    push(points, p2);
                    push(points, p3);
                    return;
                }

                if tol.cusp_limit != 0.0 && da1 > tol.cusp_limit {
                    push(points, p2);
                    return;
                }
            }
        } else if d3 > FLT_EPSILON {
            // p1, p2 and p4 are collinear, p3 is significant
            if d3 * d3 <= tol.distance_sq * chord_sq {
                if !tol.angle_enabled() {
                    push(points, p1234);
                    return;
                }

                let da1 = fold_angle(
                    (p4.y - p3.y).atan2(p4.x - p3.x) - (p3.y - p2.y).atan2(p3.x - p2.x),
                );

                if da1 < tol.angle {
                    push(points, p2);
                    push(points, p3);
                    return;
                }

                if tol.cusp_limit != 0.0 && da1 > tol.cusp_limit {
                    push(points, p3);
                    return;
                }
            }
        } else if collinear_case(points, p1, p2, p3, p4, chord_sq, tol) {
            return;
        }
    }

    recursive(points, p1, p12, p123, p1234, tol, level + 1);
    recursive(points, p1234, p234, p34, p4, tol, level + 1);
}

/// All four points collinear (or start == end). Returns true when this level is done.
fn collinear_case(
    points: &mut Vec<f32>,
    p1: Point,
    p2: Point,
    p3: Point,
    p4: Point,
    chord_sq: f32,
    tol: &CurveTolerance,
) -> bool {
    let (d2, d3) = if chord_sq == 0.0 {
        ((p2 - p1).length_squared(), (p3 - p4).length_squared())
    } else {
        let chord = p4 - p1;
        let t2 = (p2 - p1).dot(chord) / chord_sq;
        let t3 = (p3 - p1).dot(chord) / chord_sq;

        if t2 > 0.0 && t2 < 1.0 && t3 > 0.0 && t3 < 1.0 {
            // 1---2---3---4: the endpoints alone describe it
            return true;
        }

        let project = |p: Point, t: f32| {
            if t <= 0.0 {
                (p - p1).length_squared()
            } else if t >= 1.0 {
                (p - p4).length_squared()
            } else {
                (p - (p1 + chord * t)).length_squared()
            }
        };
        (project(p2, t2), project(p3, t3))
    };

    if d2 > d3 {
        if d2 < tol.distance_sq {
            push(points, p2);
            return true;
        }
    } else if d3 < tol.distance_sq {
        push(points, p3);
        return true;
    }
    false
}
