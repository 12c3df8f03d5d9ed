//! Tessel Core
//!
//! Leaf geometry shared by the painting and tessellation crates:
//!
//! - **Geometry**: `Point`, `Size`, `Affine2D`, `Bounds`
//! - **Color**: linear RGBA with premultiplied packing for vertex data
//! - **Textures**: opaque handles plus atlas frames for UV derivation
//! - **Shapes**: circle, ellipse, rectangle, rounded rectangle, polygon and
//!   triangle, each with bounds and fill/stroke hit-testing
//!
//! # Example
//!
//! ```rust
//! use tessel_core::{Affine2D, Point, Rectangle, Shape};
//!
//! let shape = Shape::from(Rectangle::new(0.0, 0.0, 10.0, 10.0));
//! assert!(shape.contains(Point::new(5.0, 5.0)));
//!
//! let moved = Affine2D::translation(20.0, 0.0);
//! assert_eq!(moved.transform_point(Point::new(1.0, 1.0)), Point::new(21.0, 1.0));
//! ```

pub mod color;
pub mod geometry;
pub mod shapes;
pub mod texture;

pub use color::Color;
pub use geometry::{Affine2D, Bounds, Point, Size};
pub use shapes::{
    Circle, Ellipse, Polygon, Rectangle, RoundedRectangle, Shape, ShapeKind, Triangle,
};
pub use texture::{Texture, TextureId, TextureUvs};
