//! Shape primitives
//!
//! These are the shapes a flattened path decomposes into. Each shape knows its
//! bounds and how to hit-test itself, both for fills (`contains`) and for
//! strokes of a given width and alignment (`stroke_contains`). Hit-testing
//! works on the analytic shape, not on tessellated triangles.

mod circle;
mod ellipse;
mod polygon;
mod rectangle;
mod rounded_rectangle;
mod triangle;

pub use circle::Circle;
pub use ellipse::Ellipse;
pub use polygon::Polygon;
pub use rectangle::Rectangle;
pub use rounded_rectangle::RoundedRectangle;
pub use triangle::Triangle;

use crate::geometry::{Bounds, Point};
use serde::{Deserialize, Serialize};

/// Discriminant of a [`Shape`], used to pick a point builder
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Circle,
    Ellipse,
    Rectangle,
    RoundedRectangle,
    Polygon,
    Triangle,
}

/// Any shape a path can produce
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Circle(Circle),
    Ellipse(Ellipse),
    Rectangle(Rectangle),
    RoundedRectangle(RoundedRectangle),
    Polygon(Polygon),
    Triangle(Triangle),
}

impl Shape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Circle(_) => ShapeKind::Circle,
            Shape::Ellipse(_) => ShapeKind::Ellipse,
            Shape::Rectangle(_) => ShapeKind::Rectangle,
            Shape::RoundedRectangle(_) => ShapeKind::RoundedRectangle,
            Shape::Polygon(_) => ShapeKind::Polygon,
            Shape::Triangle(_) => ShapeKind::Triangle,
        }
    }

    pub fn bounds(&self) -> Bounds {
        match self {
            Shape::Circle(s) => s.bounds(),
            Shape::Ellipse(s) => s.bounds(),
            Shape::Rectangle(s) => s.bounds(),
            Shape::RoundedRectangle(s) => s.bounds(),
            Shape::Polygon(s) => s.bounds(),
            Shape::Triangle(s) => s.bounds(),
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        match self {
            Shape::Circle(s) => s.contains(point),
            Shape::Ellipse(s) => s.contains(point),
            Shape::Rectangle(s) => s.contains(point),
            Shape::RoundedRectangle(s) => s.contains(point),
            Shape::Polygon(s) => s.contains(point),
            Shape::Triangle(s) => s.contains(point),
        }
    }

    /// Whether `point` lies on a stroke of `width` drawn along this shape's outline.
    ///
    /// `alignment` is the fraction of the stroke that lies inside the shape
    /// (1.0 = fully inside, 0.5 = centered, 0.0 = fully outside).
    pub fn stroke_contains(&self, point: Point, width: f32, alignment: f32) -> bool {
        match self {
            Shape::Circle(s) => s.stroke_contains(point, width, alignment),
            Shape::Ellipse(s) => s.stroke_contains(point, width, alignment),
            Shape::Rectangle(s) => s.stroke_contains(point, width, alignment),
            Shape::RoundedRectangle(s) => s.stroke_contains(point, width, alignment),
            Shape::Polygon(s) => s.stroke_contains(point, width, alignment),
            Shape::Triangle(s) => s.stroke_contains(point, width, alignment),
        }
    }

    /// The point a path continues from after drawing this shape
    pub fn anchor(&self) -> Point {
        match self {
            Shape::Circle(s) => s.center,
            Shape::Ellipse(s) => s.center,
            Shape::Rectangle(s) => Point::new(s.x, s.y),
            Shape::RoundedRectangle(s) => Point::new(s.x, s.y),
            Shape::Polygon(s) => s.last_point().unwrap_or(Point::ZERO),
            Shape::Triangle(s) => s.a,
        }
    }

    /// Whether a stroke of this shape joins its last point back to the first
    pub fn is_closed(&self) -> bool {
        match self {
            Shape::Polygon(s) => s.closed,
            _ => true,
        }
    }
}

macro_rules! impl_from_shape {
    ($($ty:ident),*) => {
        $(
            impl From<$ty> for Shape {
                fn from(shape: $ty) -> Self {
                    Shape::$ty(shape)
                }
            }
        )*
    };
}

impl_from_shape!(Circle, Ellipse, Rectangle, RoundedRectangle, Polygon, Triangle);

/// Squared distance from `p` to the segment `a`-`b`
pub(crate) fn squared_distance_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    let t = if len_sq == 0.0 {
        0.0
    } else {
        ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0)
    };
    (p - a.lerp(b, t)).length_squared()
}
