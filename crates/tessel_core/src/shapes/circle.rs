use crate::geometry::{Bounds, Point};
use serde::{Deserialize, Serialize};

/// A circle
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point,
    pub radius: f32,
}

impl Circle {
    pub const fn new(center: Point, radius: f32) -> Self {
        Self { center, radius }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(
            self.center.x - self.radius,
            self.center.y - self.radius,
            self.center.x + self.radius,
            self.center.y + self.radius,
        )
    }

    pub fn contains(&self, point: Point) -> bool {
        if self.radius <= 0.0 {
            return false;
        }
        (point - self.center).length_squared() <= self.radius * self.radius
    }

    pub fn stroke_contains(&self, point: Point, width: f32, alignment: f32) -> bool {
        if self.radius == 0.0 {
            return false;
        }
        let outer = (1.0 - alignment) * width;
        let inner = width - outer;
        let distance = (point - self.center).length();
        distance <= self.radius + outer && distance > self.radius - inner
    }
}
