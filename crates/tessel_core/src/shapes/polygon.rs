use super::squared_distance_to_segment;
use crate::geometry::{Bounds, Point};
use serde::{Deserialize, Serialize};

/// A polygon or polyline stored as a flat `[x0, y0, x1, y1, ...]` list
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub points: Vec<f32>,
    /// Whether a stroke joins the last point back to the first
    pub closed: bool,
}

impl Polygon {
    pub fn new(points: Vec<f32>, closed: bool) -> Self {
        Self { points, closed }
    }

    pub fn from_points(points: &[Point], closed: bool) -> Self {
        Self {
            points: points.iter().flat_map(|p| [p.x, p.y]).collect(),
            closed,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.points.len() < 2
    }

    pub fn point(&self, index: usize) -> Point {
        Point::new(self.points[index * 2], self.points[index * 2 + 1])
    }

    pub fn first_point(&self) -> Option<Point> {
        (!self.is_empty()).then(|| self.point(0))
    }

    pub fn last_point(&self) -> Option<Point> {
        (!self.is_empty()).then(|| self.point(self.len() - 1))
    }

    pub fn bounds(&self) -> Bounds {
        let mut bounds = Bounds::EMPTY;
        for pair in self.points.chunks_exact(2) {
            bounds.add_point(Point::new(pair[0], pair[1]));
        }
        bounds
    }

    /// Even-odd point containment
    pub fn contains(&self, point: Point) -> bool {
        let n = self.len();
        let mut inside = false;
        let mut j = n.wrapping_sub(1);
        for i in 0..n {
            let pi = self.point(i);
            let pj = self.point(j);
            if (pi.y > point.y) != (pj.y > point.y)
                && point.x < (pj.x - pi.x) * ((point.y - pi.y) / (pj.y - pi.y)) + pi.x
            {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    /// Stroke containment; the side of each edge decides which share of the width applies
    pub fn stroke_contains(&self, point: Point, width: f32, alignment: f32) -> bool {
        let n = self.len();
        if n < 2 {
            return false;
        }
        let width_sq = width * width;
        let right_sq = width_sq * (1.0 - alignment);
        let left_sq = width_sq - right_sq;

        let edges = if self.closed { n } else { n - 1 };
        for i in 0..edges {
            let a = self.point(i);
            let b = self.point((i + 1) % n);
            let distance_sq = squared_distance_to_segment(point, a, b);
            let side = (b - a).cross(point - a);
            let limit = if side < 0.0 { left_sq } else { right_sq };
            if distance_sq <= limit {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polygon_even_odd() {
        let square = Polygon::new(vec![0.0, 0.0, 10.0, 0.0, 10.0, 10.0, 0.0, 10.0], true);
        assert!(square.contains(Point::new(5.0, 5.0)));
        assert!(!square.contains(Point::new(15.0, 5.0)));
        assert_eq!(square.len(), 4);
        assert_eq!(square.bounds(), Bounds::new(0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn test_open_polyline_stroke_skips_closing_edge() {
        let open = Polygon::new(vec![0.0, 0.0, 10.0, 0.0, 10.0, 10.0], false);
        // Near the (absent) closing edge from (10,10) to (0,0)
        assert!(!open.stroke_contains(Point::new(5.0, 5.0), 1.0, 0.5));
        let closed = Polygon { closed: true, ..open };
        assert!(closed.stroke_contains(Point::new(5.0, 5.0), 1.0, 0.5));
    }
}
