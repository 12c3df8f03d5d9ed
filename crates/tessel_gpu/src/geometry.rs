//! Geometry assembly
//!
//! Replays a context's draw instructions into one shared vertex/uv/index
//! buffer set, emitting a pooled [`BatchRecord`] per drawable range.

use crate::batch::{BatchRecord, RecordKey};
use crate::build::{build_points, triangulate, triangulate_with_holes};
use crate::pool::Pool;
use crate::stroke::{build_line, LineStyle};
use crate::system::ContextKey;
use tessel_core::{Affine2D, Color, Point, Rectangle, Texture};
use tessel_paint::{
    DrawInstruction, FillStyle, GraphicsPath, ShapePath, ShapePrimitive, TextureSpace,
};

/// Tessellated geometry of one context
///
/// `vertices` and `uvs` hold two floats per vertex; `indices` are absolute
/// vertex numbers.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GeometryData {
    pub vertices: Vec<f32>,
    pub uvs: Vec<f32>,
    pub indices: Vec<u32>,
}

impl GeometryData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 2
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Empty the buffers, keeping their capacity
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.uvs.clear();
        self.indices.clear();
    }

    pub fn position(&self, vertex: usize) -> Point {
        Point::new(self.vertices[vertex * 2], self.vertices[vertex * 2 + 1])
    }
}

/// Where newly assembled records go
pub struct RecordSink<'a> {
    pub pool: &'a mut Pool<RecordKey, BatchRecord>,
    pub owner: ContextKey,
    pub out: &'a mut Vec<RecordKey>,
}

impl RecordSink<'_> {
    fn push(&mut self, record: BatchRecord) {
        let key = self.pool.acquire();
        if let Some(slot) = self.pool.get_mut(key) {
            *slot = BatchRecord {
                owner: Some(self.owner),
                ..record
            };
        }
        self.out.push(key);
    }
}

/// Append the geometry of every instruction, in order
pub fn build_context_batches(
    instructions: &[DrawInstruction],
    geometry: &mut GeometryData,
    sink: &mut RecordSink<'_>,
) {
    for instruction in instructions {
        match instruction {
            DrawInstruction::Texture {
                texture,
                rect,
                transform,
                tint,
                alpha,
            } => add_texture_to_geometry(texture, rect, transform, *tint, *alpha, geometry, sink),
            DrawInstruction::Fill { path, style, hole } => {
                add_shape_path_to_geometry(path.shape_path(), style, None, hole.as_ref(), geometry, sink)
            }
            DrawInstruction::Stroke { path, style, hole } => add_shape_path_to_geometry(
                path.shape_path(),
                &style.fill,
                Some((LineStyle::from(style), style.width)),
                hole.as_ref(),
                geometry,
                sink,
            ),
        }
    }
}

fn add_texture_to_geometry(
    texture: &Texture,
    rect: &Rectangle,
    transform: &Affine2D,
    tint: Color,
    alpha: f32,
    geometry: &mut GeometryData,
    sink: &mut RecordSink<'_>,
) {
    let vertex_offset = geometry.vertex_count();
    let index_offset = geometry.index_count();

    let corners = [
        Point::new(rect.x, rect.y),
        Point::new(rect.x + rect.width, rect.y),
        Point::new(rect.x + rect.width, rect.y + rect.height),
        Point::new(rect.x, rect.y + rect.height),
    ];
    for corner in corners {
        let p = transform.transform_point(corner);
        geometry.vertices.extend_from_slice(&[p.x, p.y]);
    }

    let uvs = texture.uvs();
    geometry
        .uvs
        .extend_from_slice(&[uvs.x0, uvs.y0, uvs.x1, uvs.y1, uvs.x2, uvs.y2, uvs.x3, uvs.y3]);

    let o = vertex_offset as u32;
    geometry
        .indices
        .extend_from_slice(&[o, o + 1, o + 2, o, o + 2, o + 3]);

    sink.push(BatchRecord {
        vertex_offset,
        vertex_size: 4,
        index_offset,
        index_size: 6,
        texture: texture.id,
        color: tint,
        alpha,
        ..BatchRecord::default()
    });
}

/// Path-space outline of a primitive
fn primitive_points(primitive: &ShapePrimitive, out: &mut Vec<f32>) {
    let start = out.len();
    build_points(&primitive.shape, out);
    if let Some(transform) = &primitive.transform {
        transform.transform_flat(&mut out[start..]);
    }
}

fn add_shape_path_to_geometry(
    shape_path: &ShapePath,
    style: &FillStyle,
    stroke: Option<(LineStyle, f32)>,
    hole: Option<&GraphicsPath>,
    geometry: &mut GeometryData,
    sink: &mut RecordSink<'_>,
) {
    let primitives = shape_path.primitives();
    let last = primitives.len().saturating_sub(1);

    if stroke.is_none() && hole.is_some() && primitives.len() > 1 {
        tracing::warn!(
            primitives = primitives.len(),
            "hole only cuts the last primitive of a path"
        );
    }

    let mut points = Vec::new();
    for (i, primitive) in primitives.iter().enumerate() {
        points.clear();
        primitive_points(primitive, &mut points);

        let vertex_offset = geometry.vertex_count();
        let index_offset = geometry.index_count();

        match (&stroke, hole) {
            (Some((line, _)), _) => build_line(
                &points,
                line,
                false,
                primitive.shape.is_closed(),
                &mut geometry.vertices,
                &mut geometry.indices,
            ),
            (None, Some(hole)) if i == last => {
                let mut holes = Vec::new();
                for hole_primitive in hole.shape_path().primitives() {
                    holes.push(points.len() / 2);
                    primitive_points(hole_primitive, &mut points);
                }
                triangulate_with_holes(&points, &holes, &mut geometry.vertices, &mut geometry.indices);
            }
            (None, _) => triangulate(
                &primitive.shape,
                &points,
                &mut geometry.vertices,
                &mut geometry.indices,
            ),
        }

        let pad = stroke.as_ref().map_or(0.0, |(_, width)| *width);
        finish_range(primitive, style, pad, vertex_offset, index_offset, geometry, sink);
    }

    // Cut-out rings get their own outline when stroked
    if let (Some((line, width)), Some(hole)) = (&stroke, hole) {
        for hole_primitive in hole.shape_path().primitives() {
            points.clear();
            primitive_points(hole_primitive, &mut points);
            let vertex_offset = geometry.vertex_count();
            let index_offset = geometry.index_count();
            build_line(
                &points,
                line,
                false,
                hole_primitive.shape.is_closed(),
                &mut geometry.vertices,
                &mut geometry.indices,
            );
            finish_range(hole_primitive, style, *width, vertex_offset, index_offset, geometry, sink);
        }
    }
}

/// Fill in uvs for the vertices added since `vertex_offset` and record the range
fn finish_range(
    primitive: &ShapePrimitive,
    style: &FillStyle,
    pad: f32,
    vertex_offset: usize,
    index_offset: usize,
    geometry: &mut GeometryData,
    sink: &mut RecordSink<'_>,
) {
    let vertex_size = geometry.vertex_count() - vertex_offset;
    let index_size = geometry.index_count() - index_offset;

    if style.texture.is_white() {
        build_simple_uvs(&mut geometry.uvs, vertex_size);
    } else {
        let matrix = texture_matrix(style, primitive, pad);
        build_uvs(&geometry.vertices[vertex_offset * 2..], &matrix, &mut geometry.uvs);
    }

    if index_size == 0 {
        return;
    }

    sink.push(BatchRecord {
        vertex_offset,
        vertex_size,
        index_offset,
        index_size,
        texture: style.texture.id,
        color: style.color,
        alpha: style.alpha,
        ..BatchRecord::default()
    });
}

fn build_simple_uvs(uvs: &mut Vec<f32>, vertex_count: usize) {
    uvs.resize(uvs.len() + vertex_count * 2, 0.0);
}

fn build_uvs(vertices: &[f32], matrix: &Affine2D, uvs: &mut Vec<f32>) {
    for pair in vertices.chunks_exact(2) {
        let uv = matrix.transform_point(Point::new(pair[0], pair[1]));
        uvs.extend_from_slice(&[uv.x, uv.y]);
    }
}

/// Map from path space to texture coordinates for a textured fill
///
/// Undoes the primitive transform, then the style's pattern matrix, then
/// normalizes: over the shape's padded local bounds for `Local`, by source
/// pixels for `Global`.
pub fn texture_matrix(style: &FillStyle, primitive: &ShapePrimitive, pad: f32) -> Affine2D {
    let texture = &style.texture;
    let normalize = match style.texture_space {
        TextureSpace::Local => {
            let mut bounds = primitive.shape.bounds();
            bounds.pad(pad);
            let width = non_zero(bounds.width());
            let height = non_zero(bounds.height());
            let uvs = texture.uvs();
            Affine2D::translation(uvs.x0, uvs.y0)
                .then(&Affine2D::scale(uvs.x2 - uvs.x0, uvs.y2 - uvs.y0))
                .then(&Affine2D::scale(1.0 / width, 1.0 / height))
                .then(&Affine2D::translation(-bounds.min_x, -bounds.min_y))
        }
        TextureSpace::Global => Affine2D::scale(
            1.0 / non_zero(texture.source_size.width),
            1.0 / non_zero(texture.source_size.height),
        )
        .then(&Affine2D::translation(texture.frame.x, texture.frame.y)),
    };

    let style_inverse = style
        .matrix
        .and_then(|m| m.inverse())
        .unwrap_or(Affine2D::IDENTITY);
    let shape_inverse = primitive
        .transform
        .and_then(|t| t.inverse())
        .unwrap_or(Affine2D::IDENTITY);

    normalize.then(&style_inverse).then(&shape_inverse)
}

fn non_zero(value: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        1.0
    }
}
