//! Path instructions and the `GraphicsPath` that records them

use crate::curves::build_arc_to;
use crate::error::Result;
use crate::shape_path::ShapePath;
use std::cell::OnceCell;
use std::f32::consts::PI;
use tessel_core::{Affine2D, Bounds, Circle, Ellipse, Point, Rectangle, RoundedRectangle};

/// A single recorded drawing instruction
///
/// Coordinates are in path space. Shape instructions carry an optional
/// transform that maps the shape's local space into path space.
#[derive(Clone, Debug, PartialEq)]
pub enum PathInstruction {
    MoveTo(Point),
    LineTo(Point),
    BezierCurveTo {
        cp1: Point,
        cp2: Point,
        end: Point,
        smoothness: Option<f32>,
    },
    QuadraticCurveTo {
        cp: Point,
        end: Point,
        smoothness: Option<f32>,
    },
    Arc {
        center: Point,
        radius: f32,
        start_angle: f32,
        end_angle: f32,
        counterclockwise: bool,
    },
    ArcTo {
        corner: Point,
        to: Point,
        radius: f32,
    },
    ArcToSvg {
        rx: f32,
        ry: f32,
        /// x-axis rotation in degrees
        rotation: f32,
        large_arc: bool,
        sweep: bool,
        end: Point,
    },
    Rect {
        rect: Rectangle,
        transform: Option<Affine2D>,
    },
    Circle {
        circle: Circle,
        transform: Option<Affine2D>,
    },
    Ellipse {
        ellipse: Ellipse,
        transform: Option<Affine2D>,
    },
    RoundRect {
        rect: RoundedRectangle,
        transform: Option<Affine2D>,
    },
    Polygon {
        points: Vec<f32>,
        closed: bool,
        transform: Option<Affine2D>,
    },
    AddPath {
        path: GraphicsPath,
        transform: Option<Affine2D>,
    },
    ClosePath,
}

/// An ordered list of path instructions with a lazily rebuilt `ShapePath`
///
/// Any mutation drops the cached shape path; `shape_path()` rebuilds it on the
/// next read.
#[derive(Clone, Debug, Default)]
pub struct GraphicsPath {
    instructions: Vec<PathInstruction>,
    shape_path: OnceCell<ShapePath>,
}

impl PartialEq for GraphicsPath {
    fn eq(&self, other: &Self) -> bool {
        self.instructions == other.instructions
    }
}

impl GraphicsPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_instructions(instructions: Vec<PathInstruction>) -> Self {
        Self {
            instructions,
            shape_path: OnceCell::new(),
        }
    }

    /// Parse SVG path data (`d` attribute syntax)
    pub fn from_svg(data: &str) -> Result<Self> {
        let mut path = Self::new();
        crate::svg::parse_into(data, &mut path)?;
        Ok(path)
    }

    pub fn instructions(&self) -> &[PathInstruction] {
        &self.instructions
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Whether the cached shape path is stale
    pub fn is_dirty(&self) -> bool {
        self.shape_path.get().is_none()
    }

    /// The derived shape primitives, rebuilt if any instruction changed
    pub fn shape_path(&self) -> &ShapePath {
        self.shape_path.get_or_init(|| ShapePath::build(self))
    }

    pub fn bounds(&self) -> Bounds {
        self.shape_path().bounds()
    }

    pub fn push(&mut self, instruction: PathInstruction) -> &mut Self {
        self.instructions.push(instruction);
        self.invalidate();
        self
    }

    /// Swap out the final instruction; pushes when the path is empty
    pub(crate) fn replace_last(&mut self, instruction: PathInstruction) {
        match self.instructions.last_mut() {
            Some(last) => *last = instruction,
            None => self.instructions.push(instruction),
        }
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.shape_path = OnceCell::new();
    }

    pub fn clear(&mut self) -> &mut Self {
        self.instructions.clear();
        self.invalidate();
        self
    }

    pub fn move_to(&mut self, x: f32, y: f32) -> &mut Self {
        self.push(PathInstruction::MoveTo(Point::new(x, y)))
    }

    pub fn line_to(&mut self, x: f32, y: f32) -> &mut Self {
        self.push(PathInstruction::LineTo(Point::new(x, y)))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn bezier_curve_to(
        &mut self,
        cp1x: f32,
        cp1y: f32,
        cp2x: f32,
        cp2y: f32,
        x: f32,
        y: f32,
        smoothness: Option<f32>,
    ) -> &mut Self {
        self.push(PathInstruction::BezierCurveTo {
            cp1: Point::new(cp1x, cp1y),
            cp2: Point::new(cp2x, cp2y),
            end: Point::new(x, y),
            smoothness,
        })
    }

    /// Cubic whose first control point mirrors the previous cubic's second one (SVG `S`)
    pub fn bezier_curve_to_short(
        &mut self,
        cp2x: f32,
        cp2y: f32,
        x: f32,
        y: f32,
        smoothness: Option<f32>,
    ) -> &mut Self {
        let current = self.get_last_point();
        let cp1 = match self.instructions.last() {
            Some(PathInstruction::BezierCurveTo { cp2, .. }) => current + (current - *cp2),
            _ => current,
        };
        self.bezier_curve_to(cp1.x, cp1.y, cp2x, cp2y, x, y, smoothness)
    }

    pub fn quadratic_curve_to(
        &mut self,
        cpx: f32,
        cpy: f32,
        x: f32,
        y: f32,
        smoothness: Option<f32>,
    ) -> &mut Self {
        self.push(PathInstruction::QuadraticCurveTo {
            cp: Point::new(cpx, cpy),
            end: Point::new(x, y),
            smoothness,
        })
    }

    /// Quadratic whose control point mirrors the previous quadratic's (SVG `T`)
    pub fn quadratic_curve_to_short(&mut self, x: f32, y: f32, smoothness: Option<f32>) -> &mut Self {
        let current = self.get_last_point();
        let cp = match self.instructions.last() {
            Some(PathInstruction::QuadraticCurveTo { cp, .. }) => current + (current - *cp),
            _ => current,
        };
        self.quadratic_curve_to(cp.x, cp.y, x, y, smoothness)
    }

    pub fn arc(
        &mut self,
        cx: f32,
        cy: f32,
        radius: f32,
        start_angle: f32,
        end_angle: f32,
        counterclockwise: bool,
    ) -> &mut Self {
        self.push(PathInstruction::Arc {
            center: Point::new(cx, cy),
            radius,
            start_angle,
            end_angle,
            counterclockwise,
        })
    }

    pub fn arc_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, radius: f32) -> &mut Self {
        self.push(PathInstruction::ArcTo {
            corner: Point::new(x1, y1),
            to: Point::new(x2, y2),
            radius,
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn arc_to_svg(
        &mut self,
        rx: f32,
        ry: f32,
        rotation: f32,
        large_arc: bool,
        sweep: bool,
        x: f32,
        y: f32,
    ) -> &mut Self {
        self.push(PathInstruction::ArcToSvg {
            rx,
            ry,
            rotation,
            large_arc,
            sweep,
            end: Point::new(x, y),
        })
    }

    pub fn rect(&mut self, x: f32, y: f32, w: f32, h: f32, transform: Option<Affine2D>) -> &mut Self {
        self.push(PathInstruction::Rect {
            rect: Rectangle::new(x, y, w, h),
            transform,
        })
    }

    pub fn circle(&mut self, x: f32, y: f32, radius: f32, transform: Option<Affine2D>) -> &mut Self {
        self.push(PathInstruction::Circle {
            circle: Circle::new(Point::new(x, y), radius),
            transform,
        })
    }

    pub fn ellipse(
        &mut self,
        x: f32,
        y: f32,
        radius_x: f32,
        radius_y: f32,
        transform: Option<Affine2D>,
    ) -> &mut Self {
        self.push(PathInstruction::Ellipse {
            ellipse: Ellipse::new(Point::new(x, y), radius_x, radius_y),
            transform,
        })
    }

    pub fn round_rect(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        radius: f32,
        transform: Option<Affine2D>,
    ) -> &mut Self {
        self.push(PathInstruction::RoundRect {
            rect: RoundedRectangle::new(x, y, w, h, radius),
            transform,
        })
    }

    /// Polygon from flat `[x0, y0, x1, y1, ...]` coordinates
    pub fn poly(&mut self, points: Vec<f32>, closed: bool, transform: Option<Affine2D>) -> &mut Self {
        self.push(PathInstruction::Polygon {
            points,
            closed,
            transform,
        })
    }

    /// Regular polygon with its first vertex pointing up (before `rotation`)
    pub fn regular_poly(
        &mut self,
        x: f32,
        y: f32,
        radius: f32,
        sides: u32,
        rotation: f32,
        transform: Option<Affine2D>,
    ) -> &mut Self {
        let sides = sides.max(3);
        let start = -PI / 2.0 + rotation;
        let delta = 2.0 * PI / sides as f32;
        let points = (0..sides)
            .flat_map(|i| {
                let angle = start - i as f32 * delta;
                [x + radius * angle.cos(), y + radius * angle.sin()]
            })
            .collect();
        self.poly(points, true, transform)
    }

    /// Regular polygon whose corners are rounded with quadratic curves
    #[allow(clippy::too_many_arguments)]
    pub fn round_poly(
        &mut self,
        x: f32,
        y: f32,
        radius: f32,
        sides: u32,
        corner: f32,
        rotation: f32,
        smoothness: Option<f32>,
    ) -> &mut Self {
        let sides = sides.max(3);
        if corner <= 0.0 {
            return self.regular_poly(x, y, radius, sides, rotation, None);
        }

        let side_length = radius * (PI / sides as f32).sin() - 0.001;
        let corner = corner.min(side_length);
        let start = -PI / 2.0 + rotation;
        let delta = 2.0 * PI / sides as f32;
        let internal = (sides as f32 - 2.0) * PI / sides as f32 / 2.0;

        for i in 0..sides {
            let angle = i as f32 * delta + start;
            let x0 = x + radius * angle.cos();
            let y0 = y + radius * angle.sin();
            let a1 = angle + PI + internal;
            let a2 = angle - PI - internal;
            let x1 = x0 + corner * a1.cos();
            let y1 = y0 + corner * a1.sin();
            let x3 = x0 + corner * a2.cos();
            let y3 = y0 + corner * a2.sin();

            if i == 0 {
                self.move_to(x1, y1);
            } else {
                self.line_to(x1, y1);
            }
            self.quadratic_curve_to(x0, y0, x3, y3, smoothness);
        }
        self.close_path()
    }

    /// Rectangle with its corners cut off at 45 degrees
    pub fn chamfer_rect(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        chamfer: f32,
        transform: Option<Affine2D>,
    ) -> &mut Self {
        if chamfer <= 0.0 {
            return self.rect(x, y, width, height, transform);
        }

        let chamfer = chamfer.min(width.min(height) / 2.0);
        let right = x + width;
        let bottom = y + height;
        let corners = [
            (x + chamfer, y),
            (right - chamfer, y),
            (right, y + chamfer),
            (right, bottom - chamfer),
            (right - chamfer, bottom),
            (x + chamfer, bottom),
            (x, bottom - chamfer),
            (x, y + chamfer),
        ];

        // A chamfer of half the short side makes neighbouring corners coincide
        let mut points: Vec<f32> = Vec::with_capacity(corners.len() * 2);
        for (px, py) in corners {
            let n = points.len();
            if n >= 2 && points[n - 2] == px && points[n - 1] == py {
                continue;
            }
            points.extend_from_slice(&[px, py]);
        }
        if points.len() >= 4 && points[0] == points[points.len() - 2] && points[1] == points[points.len() - 1] {
            points.truncate(points.len() - 2);
        }

        self.poly(points, true, transform)
    }

    /// Inline another path, optionally transformed
    pub fn add_path(&mut self, path: &GraphicsPath, transform: Option<Affine2D>) -> &mut Self {
        self.push(PathInstruction::AddPath {
            path: path.clone(),
            transform: transform.filter(|t| !t.is_identity()),
        })
    }

    pub fn close_path(&mut self) -> &mut Self {
        self.push(PathInstruction::ClosePath)
    }

    /// Current point after replaying every instruction; trailing `ClosePath`s are ignored
    pub fn get_last_point(&self) -> Point {
        last_point_of(&self.instructions, Point::ZERO)
    }

    /// Rewrite every point-bearing instruction through `matrix`
    ///
    /// Shapes get the matrix composed onto their own transform. Circular arcs
    /// survive only similarity transforms; others are left as-is with a warning.
    pub fn transform(&mut self, matrix: &Affine2D) -> &mut Self {
        if matrix.is_identity() {
            return self;
        }

        for instruction in &mut self.instructions {
            transform_instruction(instruction, matrix);
        }
        self.invalidate();
        self
    }
}

fn compose(matrix: &Affine2D, current: Option<Affine2D>) -> Option<Affine2D> {
    Some(match current {
        Some(t) => matrix.then(&t),
        None => *matrix,
    })
}

pub(crate) fn transform_instruction(instruction: &mut PathInstruction, m: &Affine2D) {
    match instruction {
        PathInstruction::MoveTo(p) | PathInstruction::LineTo(p) => *p = m.transform_point(*p),
        PathInstruction::BezierCurveTo { cp1, cp2, end, .. } => {
            *cp1 = m.transform_point(*cp1);
            *cp2 = m.transform_point(*cp2);
            *end = m.transform_point(*end);
        }
        PathInstruction::QuadraticCurveTo { cp, end, .. } => {
            *cp = m.transform_point(*cp);
            *end = m.transform_point(*end);
        }
        PathInstruction::Arc {
            center,
            radius,
            start_angle,
            end_angle,
            counterclockwise,
        } => match m.uniform_scale() {
            Some(scale) => {
                let phi = m.rotation_angle();
                *center = m.transform_point(*center);
                *radius *= scale;
                if m.determinant() < 0.0 {
                    *start_angle = phi - *start_angle;
                    *end_angle = phi - *end_angle;
                    *counterclockwise = !*counterclockwise;
                } else {
                    *start_angle += phi;
                    *end_angle += phi;
                }
            }
            None => {
                tracing::warn!("arc cannot be represented under a skewed or non-uniform transform; left untransformed");
            }
        },
        PathInstruction::ArcTo { corner, to, radius } => match m.uniform_scale() {
            Some(scale) => {
                *corner = m.transform_point(*corner);
                *to = m.transform_point(*to);
                *radius *= scale;
            }
            None => {
                tracing::warn!("arcTo cannot be represented under a skewed or non-uniform transform; left untransformed");
            }
        },
        PathInstruction::ArcToSvg {
            rx,
            ry,
            rotation,
            sweep,
            end,
            ..
        } => {
            let (new_rx, new_ry, new_rotation) = transform_ellipse_axes(m, *rx, *ry, *rotation);
            *rx = new_rx;
            *ry = new_ry;
            *rotation = new_rotation;
            if m.determinant() < 0.0 {
                *sweep = !*sweep;
            }
            *end = m.transform_point(*end);
        }
        PathInstruction::Rect { transform, .. }
        | PathInstruction::Circle { transform, .. }
        | PathInstruction::Ellipse { transform, .. }
        | PathInstruction::RoundRect { transform, .. }
        | PathInstruction::Polygon { transform, .. }
        | PathInstruction::AddPath { transform, .. } => *transform = compose(m, *transform),
        PathInstruction::ClosePath => {}
    }
}

/// Radii and rotation (degrees) of the ellipse `rx, ry, rotation` after the linear part of `m`
///
/// Closed-form 2x2 SVD of `M * R(rotation) * diag(rx, ry)`.
fn transform_ellipse_axes(m: &Affine2D, rx: f32, ry: f32, rotation: f32) -> (f32, f32, f32) {
    let (sin_r, cos_r) = rotation.to_radians().sin_cos();
    let axis_x = m.transform_vector(Point::new(rx * cos_r, rx * sin_r));
    let axis_y = m.transform_vector(Point::new(-ry * sin_r, ry * cos_r));

    let (m00, m10) = (axis_x.x, axis_x.y);
    let (m01, m11) = (axis_y.x, axis_y.y);

    let e = (m00 + m11) / 2.0;
    let f = (m00 - m11) / 2.0;
    let g = (m10 + m01) / 2.0;
    let h = (m10 - m01) / 2.0;
    let q = (e * e + h * h).sqrt();
    let r = (f * f + g * g).sqrt();
    let a1 = g.atan2(f);
    let a2 = h.atan2(e);

    let phi = (a2 + a1) / 2.0;
    (q + r, (q - r).abs(), phi.to_degrees())
}

/// End point of `instruction` when it starts at `current`
fn end_point(instruction: &PathInstruction, current: Point) -> Point {
    let apply = |t: &Option<Affine2D>, p: Point| match t {
        Some(t) => t.transform_point(p),
        None => p,
    };

    match instruction {
        PathInstruction::MoveTo(p) | PathInstruction::LineTo(p) => *p,
        PathInstruction::BezierCurveTo { end, .. }
        | PathInstruction::QuadraticCurveTo { end, .. }
        | PathInstruction::ArcToSvg { end, .. } => *end,
        PathInstruction::Arc {
            center,
            radius,
            end_angle,
            ..
        } => Point::new(
            center.x + end_angle.cos() * radius,
            center.y + end_angle.sin() * radius,
        ),
        PathInstruction::ArcTo { corner, to, radius } => {
            let mut points = vec![current.x, current.y];
            build_arc_to(&mut points, current, *corner, *to, *radius);
            let n = points.len();
            Point::new(points[n - 2], points[n - 1])
        }
        PathInstruction::Rect { rect, transform } => apply(transform, Point::new(rect.x, rect.y)),
        PathInstruction::RoundRect { rect, transform } => {
            apply(transform, Point::new(rect.x, rect.y))
        }
        PathInstruction::Circle { circle, transform } => apply(transform, circle.center),
        PathInstruction::Ellipse { ellipse, transform } => apply(transform, ellipse.center),
        PathInstruction::Polygon {
            points, transform, ..
        } => match points.len() {
            n if n >= 2 => apply(transform, Point::new(points[n - 2], points[n - 1])),
            _ => current,
        },
        PathInstruction::AddPath { path, transform } => {
            if path.is_empty() {
                current
            } else {
                apply(transform, path.get_last_point())
            }
        }
        PathInstruction::ClosePath => current,
    }
}

fn last_point_of(instructions: &[PathInstruction], start: Point) -> Point {
    instructions
        .iter()
        .fold(start, |current, instruction| end_point(instruction, current))
}
