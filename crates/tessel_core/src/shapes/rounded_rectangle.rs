use crate::geometry::{Bounds, Point};
use serde::{Deserialize, Serialize};

/// A rectangle with uniformly rounded corners
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundedRectangle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub radius: f32,
}

impl RoundedRectangle {
    pub const fn new(x: f32, y: f32, width: f32, height: f32, radius: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            radius,
        }
    }

    /// Corner radius clamped to what fits in the rectangle
    pub fn effective_radius(&self) -> f32 {
        self.radius
            .min(self.width.min(self.height) / 2.0)
            .max(0.0)
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    pub fn contains(&self, point: Point) -> bool {
        point_in_rounded_rect(point, self.x, self.y, self.width, self.height, self.radius)
    }

    pub fn stroke_contains(&self, point: Point, width: f32, alignment: f32) -> bool {
        let outer = width * (1.0 - alignment);
        let inner = width - outer;

        let in_outer = point_in_rounded_rect(
            point,
            self.x - outer,
            self.y - outer,
            self.width + outer * 2.0,
            self.height + outer * 2.0,
            self.radius + outer,
        );
        let in_inner = point_in_rounded_rect(
            point,
            self.x + inner,
            self.y + inner,
            self.width - inner * 2.0,
            self.height - inner * 2.0,
            self.radius - inner,
        );

        in_outer && !in_inner
    }
}

fn point_in_rounded_rect(p: Point, x: f32, y: f32, width: f32, height: f32, radius: f32) -> bool {
    if width <= 0.0 || height <= 0.0 {
        return false;
    }
    if p.x < x || p.x > x + width || p.y < y || p.y > y + height {
        return false;
    }
    let r = radius.min(width.min(height) / 2.0).max(0.0);
    if (p.y >= y + r && p.y <= y + height - r) || (p.x >= x + r && p.x <= x + width - r) {
        return true;
    }
    let r2 = r * r;
    let corners = [
        Point::new(x + r, y + r),
        Point::new(x + width - r, y + r),
        Point::new(x + width - r, y + height - r),
        Point::new(x + r, y + height - r),
    ];
    corners.iter().any(|c| (p - *c).length_squared() <= r2)
}
