use super::squared_distance_to_segment;
use crate::geometry::{Bounds, Point};
use serde::{Deserialize, Serialize};

/// A triangle
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub a: Point,
    pub b: Point,
    pub c: Point,
}

impl Triangle {
    pub const fn new(a: Point, b: Point, c: Point) -> Self {
        Self { a, b, c }
    }

    pub fn bounds(&self) -> Bounds {
        let mut bounds = Bounds::EMPTY;
        bounds.add_point(self.a);
        bounds.add_point(self.b);
        bounds.add_point(self.c);
        bounds
    }

    pub fn contains(&self, point: Point) -> bool {
        let s1 = (self.b - self.a).cross(point - self.a);
        let s2 = (self.c - self.b).cross(point - self.b);
        let s3 = (self.a - self.c).cross(point - self.c);
        let has_neg = s1 < 0.0 || s2 < 0.0 || s3 < 0.0;
        let has_pos = s1 > 0.0 || s2 > 0.0 || s3 > 0.0;
        !(has_neg && has_pos)
    }

    /// Distance test against each edge; alignment is ignored for triangles
    pub fn stroke_contains(&self, point: Point, width: f32, _alignment: f32) -> bool {
        let half_sq = (width / 2.0) * (width / 2.0);
        [(self.a, self.b), (self.b, self.c), (self.c, self.a)]
            .iter()
            .any(|(p, q)| squared_distance_to_segment(point, *p, *q) <= half_sq)
    }
}
