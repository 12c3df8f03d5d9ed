//! Circular arcs

use std::f32::consts::PI;

/// Angular span swept going from `start` to `end` in the given direction
fn arc_span(start: f32, end: f32, counterclockwise: bool) -> f32 {
    let mut span = (start - end).abs();
    if (!counterclockwise && start > end) || (counterclockwise && end > start) {
        span = 2.0 * PI - span;
    }
    span
}

/// Number of chords used for an arc of `radius` spanning `span` radians
pub fn arc_segment_count(radius: f32, span: f32) -> usize {
    let steps = (6.0 * radius.abs().cbrt() * (span / PI)).ceil();
    if steps.is_finite() {
        (steps as usize).max(3)
    } else {
        3
    }
}

/// Flatten a circular arc into `points`, emitting `steps + 1` points from start to end angle
///
/// `steps` of `None` picks a count from the radius and span.
pub fn build_arc(
    points: &mut Vec<f32>,
    cx: f32,
    cy: f32,
    radius: f32,
    start: f32,
    end: f32,
    counterclockwise: bool,
    steps: Option<usize>,
) {
    let span = arc_span(start, end, counterclockwise);
    let steps = steps
        .filter(|&s| s > 0)
        .unwrap_or_else(|| arc_segment_count(radius, span));

    let mut increment = span / steps as f32;
    if counterclockwise {
        increment = -increment;
    }

    points.reserve((steps + 1) * 2);
    let mut angle = start;
    for _ in 0..=steps {
        points.push(cx + angle.cos() * radius);
        points.push(cy + angle.sin() * radius);
        angle += increment;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_circle_point_count() {
        let mut points = Vec::new();
        build_arc(&mut points, 0.0, 0.0, 8.0, 0.0, PI, false, None);
        // 6 * cbrt(8) * 1 = 12 steps
        assert_eq!(points.len() / 2, 13);
        assert!((points[0] - 8.0).abs() < 1e-5);
        let n = points.len();
        assert!((points[n - 2] + 8.0).abs() < 1e-4);
        // Clockwise in screen space passes through +y
        assert!(points[13] > 7.9);
    }

    #[test]
    fn test_direction_flips_increment() {
        let mut cw = Vec::new();
        let mut ccw = Vec::new();
        build_arc(&mut cw, 0.0, 0.0, 10.0, 0.0, PI / 2.0, false, Some(4));
        build_arc(&mut ccw, 0.0, 0.0, 10.0, 0.0, PI / 2.0, true, Some(4));
        assert_eq!(cw.len(), 10);
        assert!(cw[3] > 0.0);
        // Counter-clockwise the long way round passes through -y first
        assert!(ccw[3] < 0.0);
        assert!((ccw[8]).abs() < 1e-4 && (ccw[9] - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_minimum_steps() {
        let mut points = Vec::new();
        build_arc(&mut points, 0.0, 0.0, 0.001, 0.0, 0.1, false, None);
        assert_eq!(points.len() / 2, 4);
    }
}
