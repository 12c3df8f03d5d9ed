//! `arcTo`: an arc tangent to two lines meeting at a corner

use super::build_arc;
use tessel_core::Point;

/// Append an arc of `radius` tangent to `from -> corner` and `corner -> to`
///
/// `from` is the current point. When the two lines are near parallel or the
/// radius is zero the corner itself is appended instead.
pub fn build_arc_to(points: &mut Vec<f32>, from: Point, corner: Point, to: Point, radius: f32) {
    let a1 = from.y - corner.y;
    let b1 = from.x - corner.x;
    let a2 = to.y - corner.y;
    let b2 = to.x - corner.x;
    let mm = (a1 * b2 - b1 * a2).abs();

    if mm < 1.0e-8 || radius == 0.0 {
        let n = points.len();
        let is_last = n >= 2 && points[n - 2] == corner.x && points[n - 1] == corner.y;
        if !is_last {
            points.extend_from_slice(&[corner.x, corner.y]);
        }
        return;
    }

    let dd = a1 * a1 + b1 * b1;
    let cc = a2 * a2 + b2 * b2;
    let tt = a1 * a2 + b1 * b2;
    let k1 = radius * dd.sqrt() / mm;
    let k2 = radius * cc.sqrt() / mm;
    let j1 = k1 * tt / dd;
    let j2 = k2 * tt / cc;
    let cx = k1 * b2 + k2 * b1;
    let cy = k1 * a2 + k2 * a1;
    let px = b1 * (k2 + j1);
    let py = a1 * (k2 + j1);
    let qx = b2 * (k1 + j2);
    let qy = a2 * (k1 + j2);
    let start_angle = (py - cy).atan2(px - cx);
    let end_angle = (qy - cy).atan2(qx - cx);

    build_arc(
        points,
        cx + corner.x,
        cy + corner.y,
        radius,
        start_angle,
        end_angle,
        b1 * a2 > b2 * a1,
        None,
    );
}
