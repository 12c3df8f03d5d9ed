//! Tessel Paint
//!
//! The recording half of the vector pipeline:
//!
//! - **Paths**: `GraphicsPath` records move/line/curve/arc and shape
//!   instructions and lazily resolves them into a `ShapePath`
//! - **Curves**: adaptive bezier and arc flattening into flat point lists
//! - **SVG**: path data parsing onto a `GraphicsPath`
//! - **Contexts**: `GraphicsContext` turns paths plus styles into fill,
//!   stroke and texture instructions
//!
//! # Example
//!
//! ```rust
//! use tessel_core::{Color, Point};
//! use tessel_paint::GraphicsContext;
//!
//! let mut ctx = GraphicsContext::new();
//! ctx.rect(0.0, 0.0, 100.0, 50.0).fill_with(Color::RED);
//! ctx.circle(50.0, 25.0, 10.0).cut();
//!
//! assert!(ctx.contains_point(Point::new(10.0, 10.0)));
//! assert!(!ctx.contains_point(Point::new(50.0, 25.0)));
//! ```

pub mod context;
pub mod curves;
pub mod error;
pub mod path;
pub mod shape_path;
pub mod style;
pub mod svg;

pub use context::{BatchMode, CacheSlot, DrawInstruction, GraphicsContext};
pub use curves::{CurveTolerance, DEFAULT_BEZIER_SMOOTHNESS, MAX_BEZIER_SMOOTHNESS};
pub use error::{PathError, Result};
pub use path::{GraphicsPath, PathInstruction};
pub use shape_path::{ShapePath, ShapePrimitive};
pub use style::{
    resolve_fill_style, resolve_stroke_style, FillInput, FillOptions, FillStyle, LineCap,
    LineJoin, StrokeInput, StrokeOptions, StrokeStyle, TextureSpace,
};
pub use svg::{parse_path_data, SvgCommand};
