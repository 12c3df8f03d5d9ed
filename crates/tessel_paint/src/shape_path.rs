//! Shape paths: the primitives a `GraphicsPath` resolves to
//!
//! A `ShapePath` is rebuilt wholesale by replaying the path's instructions.
//! Free-form segments accumulate into a current polygon that is flushed into a
//! primitive on `move_to`, `close_path`, explicit shapes and at the end.

use crate::curves::{
    build_adaptive_bezier, build_adaptive_quadratic, build_arc, build_arc_to, build_arc_to_svg,
    DEFAULT_BEZIER_SMOOTHNESS,
};
use crate::path::{GraphicsPath, PathInstruction};
use tessel_core::{Affine2D, Bounds, Point, Polygon, Shape};

/// One shape plus the transform it is drawn with
#[derive(Clone, Debug, PartialEq)]
pub struct ShapePrimitive {
    pub shape: Shape,
    pub transform: Option<Affine2D>,
}

impl ShapePrimitive {
    pub fn new(shape: impl Into<Shape>, transform: Option<Affine2D>) -> Self {
        Self {
            shape: shape.into(),
            transform: transform.filter(|t| !t.is_identity()),
        }
    }

    /// Bounds in path space (transform applied)
    pub fn bounds(&self) -> Bounds {
        let local = self.shape.bounds();
        let mut bounds = Bounds::EMPTY;
        bounds.add_bounds(&local, self.transform.as_ref());
        bounds
    }

    /// Map a path-space point into the shape's local space
    pub fn to_local(&self, point: Point) -> Point {
        match &self.transform {
            Some(t) => t.apply_inverse(point),
            None => point,
        }
    }

    /// The point a following segment starts from, in path space
    pub fn anchor(&self) -> Point {
        let anchor = self.shape.anchor();
        match &self.transform {
            Some(t) => t.transform_point(anchor),
            None => anchor,
        }
    }
}

/// Derived, immutable list of shape primitives
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShapePath {
    primitives: Vec<ShapePrimitive>,
}

impl ShapePath {
    /// Replay `path` into primitives
    pub fn build(path: &GraphicsPath) -> Self {
        let mut builder = ShapeBuilder::default();
        builder.replay(path.instructions());
        builder.finish(false);
        Self {
            primitives: builder.primitives,
        }
    }

    pub fn primitives(&self) -> &[ShapePrimitive] {
        &self.primitives
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn bounds(&self) -> Bounds {
        let mut bounds = Bounds::EMPTY;
        for primitive in &self.primitives {
            bounds.add_bounds(&primitive.bounds(), None);
        }
        bounds
    }
}

#[derive(Default)]
struct ShapeBuilder {
    primitives: Vec<ShapePrimitive>,
    current: Option<Polygon>,
}

impl ShapeBuilder {
    fn replay(&mut self, instructions: &[PathInstruction]) {
        for instruction in instructions {
            self.apply(instruction);
        }
    }

    fn apply(&mut self, instruction: &PathInstruction) {
        match instruction {
            PathInstruction::MoveTo(p) => self.start_poly(*p),
            PathInstruction::LineTo(p) => self.line_to(*p),
            PathInstruction::BezierCurveTo {
                cp1,
                cp2,
                end,
                smoothness,
            } => {
                let from = self.ensure_poly(true);
                let points = self.points();
                build_adaptive_bezier(
                    points,
                    from,
                    *cp1,
                    *cp2,
                    *end,
                    smoothness.unwrap_or(DEFAULT_BEZIER_SMOOTHNESS),
                );
            }
            PathInstruction::QuadraticCurveTo {
                cp,
                end,
                smoothness,
            } => {
                let from = self.ensure_poly(true);
                let points = self.points();
                build_adaptive_quadratic(
                    points,
                    from,
                    *cp,
                    *end,
                    smoothness.unwrap_or(DEFAULT_BEZIER_SMOOTHNESS),
                );
            }
            PathInstruction::Arc {
                center,
                radius,
                start_angle,
                end_angle,
                counterclockwise,
            } => {
                self.ensure_poly(false);
                build_arc(
                    self.points(),
                    center.x,
                    center.y,
                    *radius,
                    *start_angle,
                    *end_angle,
                    *counterclockwise,
                    None,
                );
            }
            PathInstruction::ArcTo { corner, to, radius } => {
                let from = self.ensure_poly(true);
                build_arc_to(self.points(), from, *corner, *to, *radius);
            }
            PathInstruction::ArcToSvg {
                rx,
                ry,
                rotation,
                large_arc,
                sweep,
                end,
            } => {
                let from = self.ensure_poly(true);
                build_arc_to_svg(
                    self.points(),
                    from,
                    *end,
                    *rx,
                    *ry,
                    *rotation,
                    *large_arc,
                    *sweep,
                    None,
                );
            }
            PathInstruction::Rect { rect, transform } => self.draw_shape(*rect, *transform),
            PathInstruction::Circle { circle, transform } => self.draw_shape(*circle, *transform),
            PathInstruction::Ellipse { ellipse, transform } => {
                self.draw_shape(*ellipse, *transform)
            }
            PathInstruction::RoundRect { rect, transform } => self.draw_shape(*rect, *transform),
            PathInstruction::Polygon {
                points,
                closed,
                transform,
            } => self.draw_shape(Polygon::new(points.clone(), *closed), *transform),
            PathInstruction::AddPath { path, transform } => self.add_path(path, transform.as_ref()),
            PathInstruction::ClosePath => self.end_poly(true),
        }
    }

    fn points(&mut self) -> &mut Vec<f32> {
        &mut self.current.get_or_insert_with(Polygon::default).points
    }

    fn line_to(&mut self, p: Point) {
        self.ensure_poly(true);
        let points = self.points();
        let n = points.len();
        if n < 2 || points[n - 2] != p.x || points[n - 1] != p.y {
            points.extend_from_slice(&[p.x, p.y]);
        }
    }

    fn add_path(&mut self, path: &GraphicsPath, transform: Option<&Affine2D>) {
        self.end_poly(false);
        match transform.filter(|t| !t.is_identity()) {
            Some(t) => {
                let mut path = path.clone();
                path.transform(t);
                self.replay(path.instructions());
            }
            None => self.replay(path.instructions()),
        }
    }

    fn draw_shape(&mut self, shape: impl Into<Shape>, transform: Option<Affine2D>) {
        self.end_poly(false);
        self.primitives.push(ShapePrimitive::new(shape, transform));
    }

    fn start_poly(&mut self, p: Point) {
        if self.current.is_some() {
            self.end_poly(false);
        }
        self.current = Some(Polygon::new(vec![p.x, p.y], false));
    }

    fn end_poly(&mut self, closed: bool) {
        if let Some(mut polygon) = self.current.take() {
            if polygon.points.len() > 2 {
                polygon.closed = closed;
                self.primitives.push(ShapePrimitive::new(polygon, None));
            }
        }
    }

    /// Make sure a polygon is open and return its last point
    ///
    /// A fresh polygon is seeded with the previous primitive's anchor (or the
    /// origin) when `seed` is set.
    fn ensure_poly(&mut self, seed: bool) -> Point {
        if self.current.is_none() {
            let mut polygon = Polygon::default();
            if seed {
                let start = self
                    .primitives
                    .last()
                    .map(ShapePrimitive::anchor)
                    .unwrap_or(Point::ZERO);
                polygon.points.extend_from_slice(&[start.x, start.y]);
            }
            self.current = Some(polygon);
        }
        self.current
            .as_ref()
            .and_then(Polygon::last_point)
            .unwrap_or(Point::ZERO)
    }

    fn finish(&mut self, closed: bool) {
        self.end_poly(closed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessel_core::{Rectangle, ShapeKind};

    #[test]
    fn test_line_to_dedupes() {
        let mut path = GraphicsPath::new();
        path.move_to(0.0, 0.0)
            .line_to(10.0, 0.0)
            .line_to(10.0, 0.0)
            .line_to(10.0, 10.0);
        let shapes = path.shape_path();
        assert_eq!(shapes.primitives().len(), 1);
        match &shapes.primitives()[0].shape {
            Shape::Polygon(p) => {
                assert_eq!(p.points, vec![0.0, 0.0, 10.0, 0.0, 10.0, 10.0]);
                assert!(!p.closed);
            }
            other => panic!("expected polygon, got {other:?}"),
        }
    }

    #[test]
    fn test_single_point_polygons_are_dropped() {
        let mut path = GraphicsPath::new();
        path.move_to(5.0, 5.0).move_to(1.0, 1.0).line_to(2.0, 2.0).close_path();
        let prims = path.shape_path().primitives().to_vec();
        assert_eq!(prims.len(), 1);
        assert!(prims[0].shape.is_closed());
    }

    #[test]
    fn test_shapes_flush_the_open_polygon() {
        let mut path = GraphicsPath::new();
        path.move_to(0.0, 0.0)
            .line_to(5.0, 0.0)
            .rect(10.0, 10.0, 5.0, 5.0, None)
            .line_to(30.0, 30.0);
        let kinds: Vec<_> = path
            .shape_path()
            .primitives()
            .iter()
            .map(|p| p.shape.kind())
            .collect();
        assert_eq!(
            kinds,
            vec![ShapeKind::Polygon, ShapeKind::Rectangle, ShapeKind::Polygon]
        );
        // The trailing line starts from the rectangle's origin
        match &path.shape_path().primitives()[2].shape {
            Shape::Polygon(p) => assert_eq!(p.points, vec![10.0, 10.0, 30.0, 30.0]),
            other => panic!("expected polygon, got {other:?}"),
        }
    }

    #[test]
    fn test_line_without_move_starts_at_origin() {
        let mut path = GraphicsPath::new();
        path.line_to(4.0, 0.0).line_to(4.0, 4.0);
        match &path.shape_path().primitives()[0].shape {
            Shape::Polygon(p) => assert_eq!(p.points[..2], [0.0, 0.0]),
            other => panic!("expected polygon, got {other:?}"),
        }
    }

    #[test]
    fn test_primitive_bounds_use_transform() {
        let prim = ShapePrimitive::new(
            Rectangle::new(0.0, 0.0, 10.0, 10.0),
            Some(Affine2D::translation(5.0, 0.0)),
        );
        assert_eq!(prim.bounds(), Bounds::new(5.0, 0.0, 15.0, 10.0));
        assert_eq!(prim.anchor(), Point::new(5.0, 0.0));
        assert_eq!(prim.to_local(Point::new(6.0, 1.0)), Point::new(1.0, 1.0));

        let identity = ShapePrimitive::new(Rectangle::default(), Some(Affine2D::IDENTITY));
        assert!(identity.transform.is_none());
    }
}
