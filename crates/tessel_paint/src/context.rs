//! Graphics contexts
//!
//! A `GraphicsContext` records draw instructions. Path calls append to an
//! active path with the current transform baked in; `fill()` and `stroke()`
//! snapshot that path with the current style and open a fresh one at the
//! path's last point.

use crate::curves::{build_arc, build_arc_to, DEFAULT_BEZIER_SMOOTHNESS};
use crate::error::Result;
use crate::path::{transform_instruction, GraphicsPath, PathInstruction};
use crate::style::{
    resolve_fill_style, resolve_stroke_style, FillInput, FillStyle, StrokeInput, StrokeStyle,
};
use std::cell::Cell;
use tessel_core::{Affine2D, Bounds, Color, Point, Rectangle, Texture};

/// Whether a context's geometry may be merged into a shared batch
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BatchMode {
    /// Batch small contexts, draw large ones from their own buffers
    #[default]
    Auto,
    Batch,
    NoBatch,
}

/// A recorded draw instruction
#[derive(Clone, Debug, PartialEq)]
pub enum DrawInstruction {
    Fill {
        path: GraphicsPath,
        style: FillStyle,
        hole: Option<GraphicsPath>,
    },
    Stroke {
        path: GraphicsPath,
        style: StrokeStyle,
        hole: Option<GraphicsPath>,
    },
    Texture {
        texture: Texture,
        /// Destination rectangle before `transform`
        rect: Rectangle,
        transform: Affine2D,
        tint: Color,
        alpha: f32,
    },
}

impl DrawInstruction {
    pub fn path(&self) -> Option<&GraphicsPath> {
        match self {
            DrawInstruction::Fill { path, .. } | DrawInstruction::Stroke { path, .. } => Some(path),
            DrawInstruction::Texture { .. } => None,
        }
    }

    pub fn hole(&self) -> Option<&GraphicsPath> {
        match self {
            DrawInstruction::Fill { hole, .. } | DrawInstruction::Stroke { hole, .. } => {
                hole.as_ref()
            }
            DrawInstruction::Texture { .. } => None,
        }
    }

    fn hole_slot(&mut self) -> Option<&mut Option<GraphicsPath>> {
        match self {
            DrawInstruction::Fill { hole, .. } | DrawInstruction::Stroke { hole, .. } => Some(hole),
            DrawInstruction::Texture { .. } => None,
        }
    }

    /// Path-space bounds; strokes are padded by the width on their wider side
    pub fn bounds(&self) -> Bounds {
        match self {
            DrawInstruction::Fill { path, .. } => path.bounds(),
            DrawInstruction::Stroke { path, style, .. } => {
                let mut bounds = path.bounds();
                let alignment = style.alignment.clamp(0.0, 1.0);
                bounds.pad(style.width * alignment.max(1.0 - alignment));
                bounds
            }
            DrawInstruction::Texture {
                rect, transform, ..
            } => {
                let mut bounds = Bounds::EMPTY;
                bounds.add_frame(
                    rect.x,
                    rect.y,
                    rect.x + rect.width,
                    rect.y + rect.height,
                    Some(transform),
                );
                bounds
            }
        }
    }

    pub fn contains_point(&self, point: Point) -> bool {
        match self {
            DrawInstruction::Fill { path, hole, .. } => hit_path(path, hole.as_ref(), point, None),
            DrawInstruction::Stroke { path, style, hole } => hit_path(
                path,
                hole.as_ref(),
                point,
                Some((style.width, style.alignment)),
            ),
            DrawInstruction::Texture {
                rect, transform, ..
            } => transform
                .inverse()
                .is_some_and(|inverse| rect.contains(inverse.transform_point(point))),
        }
    }
}

fn hit_path(
    path: &GraphicsPath,
    hole: Option<&GraphicsPath>,
    point: Point,
    stroke: Option<(f32, f32)>,
) -> bool {
    let hit = path.shape_path().primitives().iter().any(|primitive| {
        let local = primitive.to_local(point);
        match stroke {
            Some((width, alignment)) => primitive.shape.stroke_contains(local, width, alignment),
            None => primitive.shape.contains(local),
        }
    });
    if !hit {
        return false;
    }

    let in_hole = hole.is_some_and(|hole| {
        hole.shape_path()
            .primitives()
            .iter()
            .any(|primitive| primitive.shape.contains(primitive.to_local(point)))
    });
    !in_hole
}

#[derive(Clone, Debug)]
struct SavedState {
    transform: Affine2D,
    fill_style: FillStyle,
    stroke_style: StrokeStyle,
}

/// Location of a context's GPU cache entry: the owning system and the entry within it
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CacheSlot {
    pub system: u64,
    pub entry: u64,
}

/// Records paths and the fills, strokes and textures drawn with them
#[derive(Debug)]
pub struct GraphicsContext {
    instructions: Vec<DrawInstruction>,
    active_path: GraphicsPath,
    transform: Affine2D,
    fill_style: FillStyle,
    stroke_style: StrokeStyle,
    state_stack: Vec<SavedState>,
    /// Path calls since the last fill or stroke
    tick: u32,
    dirty: bool,
    bounds: Cell<Option<Bounds>>,
    batch_mode: BatchMode,
    custom_shader: bool,
    bezier_smoothness: f32,
    cache_slot: Option<CacheSlot>,
}

impl Default for GraphicsContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Clones share no GPU cache entry with the original
impl Clone for GraphicsContext {
    fn clone(&self) -> Self {
        Self {
            instructions: self.instructions.clone(),
            active_path: self.active_path.clone(),
            transform: self.transform,
            fill_style: self.fill_style.clone(),
            stroke_style: self.stroke_style.clone(),
            state_stack: self.state_stack.clone(),
            tick: self.tick,
            dirty: true,
            bounds: Cell::new(None),
            batch_mode: self.batch_mode,
            custom_shader: self.custom_shader,
            bezier_smoothness: self.bezier_smoothness,
            cache_slot: None,
        }
    }
}

impl GraphicsContext {
    pub fn new() -> Self {
        Self {
            instructions: Vec::new(),
            active_path: GraphicsPath::new(),
            transform: Affine2D::IDENTITY,
            fill_style: FillStyle::default(),
            stroke_style: StrokeStyle::default(),
            state_stack: Vec::new(),
            tick: 0,
            dirty: true,
            bounds: Cell::new(None),
            batch_mode: BatchMode::Auto,
            custom_shader: false,
            bezier_smoothness: DEFAULT_BEZIER_SMOOTHNESS,
            cache_slot: None,
        }
    }

    pub fn instructions(&self) -> &[DrawInstruction] {
        &self.instructions
    }

    pub fn active_path(&self) -> &GraphicsPath {
        &self.active_path
    }

    pub fn fill_style(&self) -> &FillStyle {
        &self.fill_style
    }

    pub fn stroke_style(&self) -> &StrokeStyle {
        &self.stroke_style
    }

    pub fn set_fill_style(&mut self, input: impl Into<FillInput>) -> &mut Self {
        self.fill_style = resolve_fill_style(input, &FillStyle::default());
        self
    }

    pub fn set_stroke_style(&mut self, input: impl Into<StrokeInput>) -> &mut Self {
        self.stroke_style = resolve_stroke_style(input, &StrokeStyle::default());
        self
    }

    pub fn batch_mode(&self) -> BatchMode {
        self.batch_mode
    }

    pub fn set_batch_mode(&mut self, mode: BatchMode) -> &mut Self {
        if self.batch_mode != mode {
            self.batch_mode = mode;
            self.on_update();
        }
        self
    }

    /// Contexts drawn with a custom shader are never batched
    pub fn custom_shader(&self) -> bool {
        self.custom_shader
    }

    pub fn set_custom_shader(&mut self, custom: bool) -> &mut Self {
        if self.custom_shader != custom {
            self.custom_shader = custom;
            self.on_update();
        }
        self
    }

    pub fn bezier_smoothness(&self) -> f32 {
        self.bezier_smoothness
    }

    /// Smoothness recorded on curves that don't specify their own
    pub fn set_bezier_smoothness(&mut self, smoothness: f32) -> &mut Self {
        self.bezier_smoothness = smoothness;
        self
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.on_update();
    }

    /// Acknowledge a rebuild of this context's geometry
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Opaque handle of this context's GPU cache entry
    pub fn cache_slot(&self) -> Option<CacheSlot> {
        self.cache_slot
    }

    pub fn set_cache_slot(&mut self, slot: Option<CacheSlot>) {
        self.cache_slot = slot;
    }

    fn on_update(&mut self) {
        self.dirty = true;
        self.bounds.set(None);
    }

    fn push_instruction(&mut self, instruction: DrawInstruction) {
        self.instructions.push(instruction);
        self.on_update();
    }

    /// Remove the most recent draw instruction
    pub fn pop_instruction(&mut self) -> Option<DrawInstruction> {
        let popped = self.instructions.pop();
        if popped.is_some() {
            self.on_update();
        }
        popped
    }

    /// Draw `texture` into `(dx, dy, dw, dh)`; a zero width or height uses the frame size
    pub fn texture(
        &mut self,
        texture: Texture,
        tint: Option<Color>,
        dx: f32,
        dy: f32,
        dw: f32,
        dh: f32,
    ) -> &mut Self {
        let width = if dw != 0.0 { dw } else { texture.frame.width };
        let height = if dh != 0.0 { dh } else { texture.frame.height };
        let tint = tint.unwrap_or(Color::WHITE);
        self.push_instruction(DrawInstruction::Texture {
            texture,
            rect: Rectangle::new(dx, dy, width, height),
            transform: self.transform,
            tint: tint.with_alpha(1.0),
            alpha: self.fill_style.alpha * tint.a,
        });
        self
    }

    pub fn begin_path(&mut self) -> &mut Self {
        self.active_path = GraphicsPath::new();
        self
    }

    /// Fill the active path with the current fill style
    pub fn fill(&mut self) -> &mut Self {
        self.record_fill();
        self
    }

    /// Replace the fill style, then fill
    pub fn fill_with(&mut self, input: impl Into<FillInput>) -> &mut Self {
        self.set_fill_style(input);
        self.record_fill();
        self
    }

    fn record_fill(&mut self) {
        let path = match (self.tick, self.instructions.last()) {
            (0, Some(DrawInstruction::Stroke { path, .. })) => path.clone(),
            _ => self.active_path.clone(),
        };
        self.push_instruction(DrawInstruction::Fill {
            path,
            style: self.fill_style.clone(),
            hole: None,
        });
        self.init_next_path_location();
        self.tick = 0;
    }

    /// Stroke the active path with the current stroke style
    pub fn stroke(&mut self) -> &mut Self {
        self.record_stroke();
        self
    }

    pub fn stroke_with(&mut self, input: impl Into<StrokeInput>) -> &mut Self {
        self.set_stroke_style(input);
        self.record_stroke();
        self
    }

    fn record_stroke(&mut self) {
        let path = match (self.tick, self.instructions.last()) {
            (0, Some(DrawInstruction::Fill { path, .. })) => path.clone(),
            _ => self.active_path.clone(),
        };
        self.push_instruction(DrawInstruction::Stroke {
            path,
            style: self.stroke_style.clone(),
            hole: None,
        });
        self.init_next_path_location();
        self.tick = 0;
    }

    /// Punch the active path out of the most recent fill or stroke
    ///
    /// A fill and stroke sharing one path (drawn back to back) are both cut.
    pub fn cut(&mut self) -> &mut Self {
        let count = self.instructions.len();
        let shared_pair = count >= 2
            && match (&self.instructions[count - 2], &self.instructions[count - 1]) {
                (a @ DrawInstruction::Fill { .. }, b @ DrawInstruction::Stroke { .. })
                | (a @ DrawInstruction::Stroke { .. }, b @ DrawInstruction::Fill { .. }) => {
                    a.path() == b.path()
                }
                _ => false,
            };
        let targets = if shared_pair { 2 } else { 1 };

        let hole_path = self.active_path.clone();
        let mut cut_any = false;
        for instruction in self.instructions.iter_mut().rev().take(targets) {
            if let Some(slot) = instruction.hole_slot() {
                let merged = match slot.take() {
                    Some(mut existing) => {
                        existing.add_path(&hole_path, None);
                        existing
                    }
                    None => hole_path.clone(),
                };
                *slot = Some(merged);
                cut_any = true;
            }
        }

        if cut_any {
            self.on_update();
        } else {
            tracing::debug!("cut() without a preceding fill or stroke");
        }
        self.init_next_path_location();
        self
    }

    fn init_next_path_location(&mut self) {
        let last = self.active_path.get_last_point();
        self.active_path.clear();
        self.active_path.move_to(last.x, last.y);
    }

    fn shape_transform(&self) -> Option<Affine2D> {
        (!self.transform.is_identity()).then_some(self.transform)
    }

    fn map(&self, x: f32, y: f32) -> Point {
        self.transform.transform_point(Point::new(x, y))
    }

    fn push_path(&mut self, mut instruction: PathInstruction) -> &mut Self {
        self.tick += 1;
        transform_instruction(&mut instruction, &self.transform);
        self.active_path.push(instruction);
        self
    }

    /// Append flattened local-space points as line segments
    fn push_polyline(&mut self, points: &[f32]) {
        for (i, pair) in points.chunks_exact(2).enumerate() {
            let p = self.map(pair[0], pair[1]);
            if i == 0 && self.active_path.is_empty() {
                self.active_path.move_to(p.x, p.y);
            } else {
                self.active_path.line_to(p.x, p.y);
            }
        }
    }

    pub fn move_to(&mut self, x: f32, y: f32) -> &mut Self {
        self.tick += 1;
        let p = self.map(x, y);
        let replace = matches!(
            self.active_path.instructions(),
            [PathInstruction::MoveTo(_)]
        );
        if replace {
            self.active_path.replace_last(PathInstruction::MoveTo(p));
        } else {
            self.active_path.push(PathInstruction::MoveTo(p));
        }
        self
    }

    pub fn line_to(&mut self, x: f32, y: f32) -> &mut Self {
        self.push_path(PathInstruction::LineTo(Point::new(x, y)))
    }

    pub fn bezier_curve_to(
        &mut self,
        cp1x: f32,
        cp1y: f32,
        cp2x: f32,
        cp2y: f32,
        x: f32,
        y: f32,
    ) -> &mut Self {
        self.push_path(PathInstruction::BezierCurveTo {
            cp1: Point::new(cp1x, cp1y),
            cp2: Point::new(cp2x, cp2y),
            end: Point::new(x, y),
            smoothness: Some(self.bezier_smoothness),
        })
    }

    pub fn quadratic_curve_to(&mut self, cpx: f32, cpy: f32, x: f32, y: f32) -> &mut Self {
        self.push_path(PathInstruction::QuadraticCurveTo {
            cp: Point::new(cpx, cpy),
            end: Point::new(x, y),
            smoothness: Some(self.bezier_smoothness),
        })
    }

    /// Circular arc; flattened when the transform is not a similarity
    pub fn arc(
        &mut self,
        x: f32,
        y: f32,
        radius: f32,
        start_angle: f32,
        end_angle: f32,
        counterclockwise: bool,
    ) -> &mut Self {
        if self.transform.uniform_scale().is_some() {
            return self.push_path(PathInstruction::Arc {
                center: Point::new(x, y),
                radius,
                start_angle,
                end_angle,
                counterclockwise,
            });
        }

        self.tick += 1;
        let mut points = Vec::new();
        build_arc(
            &mut points,
            x,
            y,
            radius,
            start_angle,
            end_angle,
            counterclockwise,
            None,
        );
        self.push_polyline(&points);
        self
    }

    pub fn arc_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, radius: f32) -> &mut Self {
        if self.transform.uniform_scale().is_some() {
            return self.push_path(PathInstruction::ArcTo {
                corner: Point::new(x1, y1),
                to: Point::new(x2, y2),
                radius,
            });
        }

        let Some(inverse) = self.transform.inverse() else {
            return self;
        };
        self.tick += 1;
        let from = inverse.transform_point(self.active_path.get_last_point());
        let mut points = Vec::new();
        build_arc_to(
            &mut points,
            from,
            Point::new(x1, y1),
            Point::new(x2, y2),
            radius,
        );
        self.push_polyline(&points);
        self
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
        self.push_path(PathInstruction::ArcToSvg {
            rx,
            ry,
            rotation,
            large_arc,
            sweep,
            end: Point::new(x, y),
        })
    }

    pub fn close_path(&mut self) -> &mut Self {
        self.tick += 1;
        self.active_path.close_path();
        self
    }

    pub fn rect(&mut self, x: f32, y: f32, w: f32, h: f32) -> &mut Self {
        self.tick += 1;
        let transform = self.shape_transform();
        self.active_path.rect(x, y, w, h, transform);
        self
    }

    pub fn round_rect(&mut self, x: f32, y: f32, w: f32, h: f32, radius: f32) -> &mut Self {
        self.tick += 1;
        let transform = self.shape_transform();
        self.active_path.round_rect(x, y, w, h, radius, transform);
        self
    }

    pub fn circle(&mut self, x: f32, y: f32, radius: f32) -> &mut Self {
        self.tick += 1;
        let transform = self.shape_transform();
        self.active_path.circle(x, y, radius, transform);
        self
    }

    pub fn ellipse(&mut self, x: f32, y: f32, radius_x: f32, radius_y: f32) -> &mut Self {
        self.tick += 1;
        let transform = self.shape_transform();
        self.active_path.ellipse(x, y, radius_x, radius_y, transform);
        self
    }

    /// Polygon from flat coordinates; `closed` defaults to true in most callers
    pub fn poly(&mut self, points: Vec<f32>, closed: bool) -> &mut Self {
        self.tick += 1;
        let transform = self.shape_transform();
        self.active_path.poly(points, closed, transform);
        self
    }

    pub fn regular_poly(
        &mut self,
        x: f32,
        y: f32,
        radius: f32,
        sides: u32,
        rotation: f32,
    ) -> &mut Self {
        self.tick += 1;
        let transform = self.shape_transform();
        self.active_path
            .regular_poly(x, y, radius, sides, rotation, transform);
        self
    }

    pub fn round_poly(
        &mut self,
        x: f32,
        y: f32,
        radius: f32,
        sides: u32,
        corner: f32,
        rotation: f32,
    ) -> &mut Self {
        let mut shape = GraphicsPath::new();
        shape.round_poly(
            x,
            y,
            radius,
            sides,
            corner,
            rotation,
            Some(self.bezier_smoothness),
        );
        self.path(&shape)
    }

    pub fn chamfer_rect(&mut self, x: f32, y: f32, w: f32, h: f32, chamfer: f32) -> &mut Self {
        self.tick += 1;
        let transform = self.shape_transform();
        self.active_path.chamfer_rect(x, y, w, h, chamfer, transform);
        self
    }

    /// Append a whole path under the current transform
    pub fn path(&mut self, path: &GraphicsPath) -> &mut Self {
        self.tick += 1;
        let transform = self.shape_transform();
        self.active_path.add_path(path, transform);
        self
    }

    /// Append SVG path data under the current transform
    pub fn svg_path(&mut self, data: &str) -> Result<&mut Self> {
        let path = GraphicsPath::from_svg(data)?;
        Ok(self.path(&path))
    }

    pub fn save(&mut self) -> &mut Self {
        self.state_stack.push(SavedState {
            transform: self.transform,
            fill_style: self.fill_style.clone(),
            stroke_style: self.stroke_style.clone(),
        });
        self
    }

    /// Pop the last saved state; a no-op on an empty stack
    pub fn restore(&mut self) -> &mut Self {
        if let Some(state) = self.state_stack.pop() {
            self.transform = state.transform;
            self.fill_style = state.fill_style;
            self.stroke_style = state.stroke_style;
        }
        self
    }

    pub fn get_transform(&self) -> Affine2D {
        self.transform
    }

    pub fn reset_transform(&mut self) -> &mut Self {
        self.transform = Affine2D::IDENTITY;
        self
    }

    pub fn set_transform(&mut self, transform: Affine2D) -> &mut Self {
        self.transform = transform;
        self
    }

    /// Multiply `transform` onto the current matrix; it applies before what is already there
    pub fn transform(&mut self, transform: Affine2D) -> &mut Self {
        self.transform = self.transform.then(&transform);
        self
    }

    pub fn translate(&mut self, x: f32, y: f32) -> &mut Self {
        self.transform(Affine2D::translation(x, y))
    }

    pub fn scale(&mut self, sx: f32, sy: f32) -> &mut Self {
        self.transform(Affine2D::scale(sx, sy))
    }

    pub fn rotate(&mut self, angle: f32) -> &mut Self {
        self.transform(Affine2D::rotation(angle))
    }

    /// Drop every instruction and reset the path, transform and tick
    pub fn clear(&mut self) -> &mut Self {
        self.instructions.clear();
        self.active_path.clear();
        self.transform = Affine2D::IDENTITY;
        self.tick = 0;
        self.on_update();
        self
    }

    /// Union of every instruction's bounds, cached until the next change
    pub fn bounds(&self) -> Bounds {
        if let Some(bounds) = self.bounds.get() {
            return bounds;
        }

        let mut bounds = Bounds::EMPTY;
        for instruction in &self.instructions {
            bounds.add_bounds(&instruction.bounds(), None);
        }
        self.bounds.set(Some(bounds));
        bounds
    }

    /// Whether `point` (in path space) hits any recorded instruction
    pub fn contains_point(&self, point: Point) -> bool {
        if !self.bounds().contains_point(point) {
            return false;
        }
        self.instructions
            .iter()
            .any(|instruction| instruction.contains_point(point))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{StrokeOptions, TextureSpace};
    use tessel_core::{Shape, TextureId};

    #[test]
    fn test_fill_then_stroke_reuses_path() {
        let mut ctx = GraphicsContext::new();
        ctx.rect(0.0, 0.0, 10.0, 10.0).fill_with(Color::RED).stroke();
        assert_eq!(ctx.instructions().len(), 2);
        assert_eq!(ctx.instructions()[0].path(), ctx.instructions()[1].path());
        assert_eq!(ctx.instructions()[0].path().unwrap().instructions().len(), 1);
    }

    #[test]
    fn test_next_path_starts_at_last_point() {
        let mut ctx = GraphicsContext::new();
        ctx.move_to(0.0, 0.0).line_to(30.0, 5.0).stroke();
        assert_eq!(
            ctx.active_path().instructions(),
            &[PathInstruction::MoveTo(Point::new(30.0, 5.0))]
        );

        // A lone move_to is replaced rather than stacked
        ctx.move_to(1.0, 2.0);
        assert_eq!(
            ctx.active_path().instructions(),
            &[PathInstruction::MoveTo(Point::new(1.0, 2.0))]
        );
    }

    #[test]
    fn test_transform_is_baked_into_shapes() {
        let mut ctx = GraphicsContext::new();
        ctx.translate(100.0, 0.0).scale(2.0, 2.0).rect(0.0, 0.0, 10.0, 10.0).fill();
        let bounds = ctx.bounds();
        assert_eq!(
            (bounds.min_x, bounds.min_y, bounds.max_x, bounds.max_y),
            (100.0, 0.0, 120.0, 20.0)
        );
    }

    #[test]
    fn test_line_points_are_transformed() {
        let mut ctx = GraphicsContext::new();
        ctx.translate(5.0, 5.0).move_to(0.0, 0.0).line_to(10.0, 0.0);
        assert_eq!(
            ctx.active_path().instructions()[1],
            PathInstruction::LineTo(Point::new(15.0, 5.0))
        );
    }

    #[test]
    fn test_skewed_arc_is_flattened() {
        let mut ctx = GraphicsContext::new();
        ctx.scale(2.0, 1.0)
            .arc(0.0, 0.0, 10.0, 0.0, std::f32::consts::PI, false);
        let instructions = ctx.active_path().instructions();
        assert!(instructions.len() > 3);
        assert_eq!(instructions[0], PathInstruction::MoveTo(Point::new(20.0, 0.0)));
        assert!(instructions
            .iter()
            .all(|i| !matches!(i, PathInstruction::Arc { .. })));
    }

    #[test]
    fn test_save_restore_round_trip() {
        let mut ctx = GraphicsContext::new();
        ctx.set_fill_style(Color::BLUE).translate(3.0, 4.0).save();
        ctx.set_fill_style(Color::GREEN).rotate(1.0);
        ctx.restore();
        assert_eq!(ctx.get_transform(), Affine2D::translation(3.0, 4.0));
        assert_eq!(ctx.fill_style().color, Color::BLUE);
        // Extra restores are ignored
        ctx.restore().restore();
        assert_eq!(ctx.get_transform(), Affine2D::translation(3.0, 4.0));
    }

    #[test]
    fn test_stroke_bounds_are_padded() {
        let mut ctx = GraphicsContext::new();
        ctx.rect(0.0, 0.0, 10.0, 10.0).stroke_with(StrokeOptions {
            width: Some(4.0),
            ..StrokeOptions::default()
        });
        let bounds = ctx.bounds();
        assert_eq!((bounds.min_x, bounds.max_x), (-2.0, 12.0));
    }

    #[test]
    fn test_one_sided_stroke_bounds_cover_full_width() {
        for alignment in [0.0, 1.0] {
            let mut ctx = GraphicsContext::new();
            ctx.move_to(0.0, 0.0)
                .line_to(100.0, 0.0)
                .stroke_with(StrokeOptions {
                    width: Some(10.0),
                    alignment: Some(alignment),
                    ..StrokeOptions::default()
                });
            let bounds = ctx.bounds();
            assert_eq!((bounds.min_y, bounds.max_y), (-10.0, 10.0), "alignment {alignment}");
        }
    }

    #[test]
    fn test_cut_excludes_hole_from_hit_test() {
        let mut ctx = GraphicsContext::new();
        ctx.rect(0.0, 0.0, 100.0, 100.0).fill();
        ctx.circle(50.0, 50.0, 10.0).cut();
        assert!(ctx.instructions()[0].hole().is_some());
        assert!(ctx.contains_point(Point::new(10.0, 10.0)));
        assert!(!ctx.contains_point(Point::new(50.0, 50.0)));
        assert!(!ctx.contains_point(Point::new(150.0, 50.0)));
    }

    #[test]
    fn test_cut_reaches_shared_fill_and_stroke() {
        let mut ctx = GraphicsContext::new();
        ctx.rect(0.0, 0.0, 100.0, 100.0).fill().stroke();
        ctx.rect(40.0, 40.0, 20.0, 20.0).cut();
        assert!(ctx.instructions().iter().all(|i| i.hole().is_some()));
    }

    #[test]
    fn test_texture_defaults_to_frame_size() {
        let mut ctx = GraphicsContext::new();
        let tex = Texture::new(TextureId(2), 32.0, 16.0);
        ctx.translate(10.0, 10.0)
            .texture(tex, Some(Color::rgba(1.0, 0.0, 0.0, 0.5)), 0.0, 0.0, 0.0, 0.0);
        match &ctx.instructions()[0] {
            DrawInstruction::Texture {
                rect, tint, alpha, ..
            } => {
                assert_eq!((rect.width, rect.height), (32.0, 16.0));
                assert_eq!(*tint, Color::RED);
                assert_eq!(*alpha, 0.5);
            }
            other => panic!("unexpected instruction {other:?}"),
        }
        assert!(ctx.contains_point(Point::new(20.0, 20.0)));
        assert!(!ctx.contains_point(Point::new(5.0, 5.0)));
    }

    #[test]
    fn test_dirty_and_bounds_cache() {
        let mut ctx = GraphicsContext::new();
        ctx.circle(0.0, 0.0, 5.0).fill();
        assert!(ctx.is_dirty());
        ctx.clear_dirty();
        assert_eq!(ctx.bounds().max_x, 5.0);

        ctx.circle(20.0, 0.0, 5.0).fill();
        assert!(ctx.is_dirty());
        assert_eq!(ctx.bounds().max_x, 25.0);

        ctx.clear();
        assert!(ctx.bounds().is_empty());
        assert!(ctx.instructions().is_empty());
    }

    #[test]
    fn test_svg_path_and_round_poly() {
        let mut ctx = GraphicsContext::new();
        ctx.svg_path("M0 0 L10 0 L10 10 Z").unwrap().fill();
        ctx.round_poly(50.0, 50.0, 20.0, 5, 4.0, 0.0).fill();
        assert_eq!(ctx.instructions().len(), 2);
        assert!(ctx.svg_path("M0 0 L").is_err());

        let primitives = ctx.instructions()[0].path().unwrap().shape_path().primitives();
        assert!(matches!(primitives[0].shape, Shape::Polygon(_)));
    }

    #[test]
    fn test_pattern_fill_keeps_global_space() {
        let mut ctx = GraphicsContext::new();
        let tex = Texture::new(TextureId(9), 8.0, 8.0);
        ctx.rect(0.0, 0.0, 64.0, 64.0).fill_with(FillInput::Pattern {
            texture: tex,
            matrix: Affine2D::IDENTITY,
        });
        match &ctx.instructions()[0] {
            DrawInstruction::Fill { style, .. } => {
                assert_eq!(style.texture_space, TextureSpace::Global)
            }
            other => panic!("unexpected instruction {other:?}"),
        }
    }

    #[test]
    fn test_clone_drops_cache_slot() {
        let mut ctx = GraphicsContext::new();
        ctx.set_cache_slot(Some(CacheSlot { system: 1, entry: 42 }));
        ctx.clear_dirty();
        let copy = ctx.clone();
        assert_eq!(copy.cache_slot(), None);
        assert!(copy.is_dirty());
    }
}
