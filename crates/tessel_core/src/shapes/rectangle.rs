use crate::geometry::{Bounds, Point};
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rectangle {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    pub fn contains(&self, point: Point) -> bool {
        if self.width <= 0.0 || self.height <= 0.0 {
            return false;
        }
        point.x >= self.x
            && point.x < self.x + self.width
            && point.y >= self.y
            && point.y < self.y + self.height
    }

    pub fn stroke_contains(&self, point: Point, width: f32, alignment: f32) -> bool {
        if self.width <= 0.0 || self.height <= 0.0 {
            return false;
        }
        let outer = width * (1.0 - alignment);
        let inner = width - outer;

        let in_outer = point.x >= self.x - outer
            && point.x <= self.x + self.width + outer
            && point.y >= self.y - outer
            && point.y <= self.y + self.height + outer;
        let in_inner = point.x > self.x + inner
            && point.x < self.x + self.width - inner
            && point.y > self.y + inner
            && point.y < self.y + self.height - inner;

        in_outer && !in_inner
    }
}
