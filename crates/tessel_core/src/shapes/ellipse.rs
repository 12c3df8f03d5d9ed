use crate::geometry::{Bounds, Point};
use serde::{Deserialize, Serialize};

/// An axis-aligned ellipse
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Ellipse {
    pub center: Point,
    pub radius_x: f32,
    pub radius_y: f32,
}

impl Ellipse {
    pub const fn new(center: Point, radius_x: f32, radius_y: f32) -> Self {
        Self {
            center,
            radius_x,
            radius_y,
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(
            self.center.x - self.radius_x,
            self.center.y - self.radius_y,
            self.center.x + self.radius_x,
            self.center.y + self.radius_y,
        )
    }

    pub fn contains(&self, point: Point) -> bool {
        if self.radius_x <= 0.0 || self.radius_y <= 0.0 {
            return false;
        }
        let nx = (point.x - self.center.x) / self.radius_x;
        let ny = (point.y - self.center.y) / self.radius_y;
        nx * nx + ny * ny <= 1.0
    }

    pub fn stroke_contains(&self, point: Point, width: f32, alignment: f32) -> bool {
        if self.radius_x <= 0.0 || self.radius_y <= 0.0 {
            return false;
        }
        let outer = width * (1.0 - alignment);
        let inner = width - outer;

        let inner_h = self.radius_x - inner;
        let inner_v = self.radius_y - inner;
        let outer_h = self.radius_x + outer;
        let outer_v = self.radius_y + outer;

        let dx = point.x - self.center.x;
        let dy = point.y - self.center.y;

        let inside_inner = if inner_h <= 0.0 || inner_v <= 0.0 {
            false
        } else {
            (dx * dx) / (inner_h * inner_h) + (dy * dy) / (inner_v * inner_v) <= 1.0
        };
        let inside_outer = (dx * dx) / (outer_h * outer_h) + (dy * dy) / (outer_v * outer_v) <= 1.0;

        inside_outer && !inside_inner
    }
}
