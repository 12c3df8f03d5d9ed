//! Batch merging
//!
//! The batcher copies many records' ranges into one interleaved vertex buffer
//! and one index buffer, and splits the result into draw batches whenever a
//! batch would need more distinct textures than the backend can bind.

use crate::batch::BatchRecord;
use crate::geometry::GeometryData;
use crate::pool::Poolable;
use bytemuck::{Pod, Zeroable};
use smallvec::SmallVec;
use tessel_core::{Affine2D, Point, TextureId};

/// Interleaved vertex as uploaded to the GPU
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct BatchVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
    /// Premultiplied `0xAABBGGRR`
    pub color: u32,
    /// Index into the owning batch's texture list
    pub texture_slot: u32,
}

/// Textures bound by one batch
pub type TextureSet = SmallVec<[TextureId; 16]>;

/// One draw call over a range of the batcher's index buffer
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DrawBatch {
    pub start: usize,
    pub size: usize,
    pub textures: TextureSet,
}

#[derive(Debug)]
pub struct Batcher {
    vertices: Vec<BatchVertex>,
    indices: Vec<u32>,
    batches: Vec<DrawBatch>,
    current: DrawBatch,
    max_textures: usize,
}

impl Default for Batcher {
    fn default() -> Self {
        Self::new(16)
    }
}

impl Batcher {
    pub fn new(max_textures: usize) -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            batches: Vec::new(),
            current: DrawBatch::default(),
            max_textures: max_textures.max(1),
        }
    }

    pub fn max_textures(&self) -> usize {
        self.max_textures
    }

    pub fn set_max_textures(&mut self, max_textures: usize) {
        self.max_textures = max_textures.max(1);
    }

    /// Reserve room for `vertex_count` more vertices
    pub fn ensure_attribute_buffer(&mut self, vertex_count: usize) {
        self.vertices.reserve(vertex_count);
    }

    /// Reserve room for `index_count` more indices
    pub fn ensure_index_buffer(&mut self, index_count: usize) {
        self.indices.reserve(index_count);
    }

    /// Start a new set of batches, keeping buffer capacity
    pub fn begin(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.batches.clear();
        self.current = DrawBatch::default();
    }

    /// Append one record's range of `geometry`
    ///
    /// Positions go through `world` when the record asks for it.
    pub fn add(&mut self, record: &BatchRecord, geometry: &GeometryData, world: &Affine2D) {
        if record.is_empty() {
            return;
        }

        let slot = self.texture_slot(record.texture);
        let color = record.packed_color();
        let base = self.vertices.len() as u32;
        let apply = record.apply_transform && !world.is_identity();

        for vertex in record.vertex_range() {
            let mut position = geometry.position(vertex);
            if apply {
                position = world.transform_point(position);
            }
            let uv = [
                geometry.uvs.get(vertex * 2).copied().unwrap_or(0.0),
                geometry.uvs.get(vertex * 2 + 1).copied().unwrap_or(0.0),
            ];
            self.vertices.push(BatchVertex {
                position: Point::to_array(&position),
                uv,
                color,
                texture_slot: slot,
            });
        }

        let shift = record.vertex_offset as u32;
        self.indices.extend(
            geometry.indices[record.index_range()]
                .iter()
                .map(|&i| i - shift + base),
        );
        self.current.size += record.index_size;
    }

    /// Close the open batch
    pub fn finish(&mut self) {
        self.break_batch();
    }

    pub fn vertices(&self) -> &[BatchVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn batches(&self) -> &[DrawBatch] {
        &self.batches
    }

    /// Vertex buffer as raw bytes
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    fn texture_slot(&mut self, texture: TextureId) -> u32 {
        if let Some(slot) = self.current.textures.iter().position(|&t| t == texture) {
            return slot as u32;
        }
        if self.current.textures.len() >= self.max_textures {
            self.break_batch();
        }
        self.current.textures.push(texture);
        (self.current.textures.len() - 1) as u32
    }

    fn break_batch(&mut self) {
        if self.current.size > 0 {
            let start = self.current.start + self.current.size;
            let done = std::mem::replace(
                &mut self.current,
                DrawBatch {
                    start,
                    ..DrawBatch::default()
                },
            );
            self.batches.push(done);
        } else {
            self.current.textures.clear();
        }
    }
}

impl Poolable for Batcher {
    fn reset(&mut self) {
        self.begin();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessel_core::Color;

    fn quad_geometry(count: usize) -> GeometryData {
        let mut geometry = GeometryData::new();
        for q in 0..count {
            let x = q as f32 * 10.0;
            let o = (q * 4) as u32;
            geometry
                .vertices
                .extend_from_slice(&[x, 0.0, x + 5.0, 0.0, x + 5.0, 5.0, x, 5.0]);
            geometry.uvs.extend_from_slice(&[0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0]);
            geometry
                .indices
                .extend_from_slice(&[o, o + 1, o + 2, o, o + 2, o + 3]);
        }
        geometry
    }

    fn quad_record(q: usize, texture: u64) -> BatchRecord {
        BatchRecord {
            vertex_offset: q * 4,
            vertex_size: 4,
            index_offset: q * 6,
            index_size: 6,
            texture: TextureId(texture),
            color: Color::RED,
            ..BatchRecord::default()
        }
    }

    #[test]
    fn test_shared_texture_is_one_batch() {
        let geometry = quad_geometry(3);
        let mut batcher = Batcher::new(4);
        batcher.begin();
        for q in 0..3 {
            batcher.add(&quad_record(q, 1), &geometry, &Affine2D::IDENTITY);
        }
        batcher.finish();

        assert_eq!(batcher.batches().len(), 1);
        assert_eq!(batcher.batches()[0].size, 18);
        assert_eq!(batcher.vertices().len(), 12);
        assert_eq!(&batcher.indices()[6..12], &[4, 5, 6, 4, 6, 7]);
        assert!(batcher.vertices().iter().all(|v| v.color == 0xFF00_00FF));
    }

    #[test]
    fn test_texture_limit_breaks_batch() {
        let geometry = quad_geometry(3);
        let mut batcher = Batcher::new(2);
        batcher.begin();
        for (q, texture) in [1, 2, 3].into_iter().enumerate() {
            batcher.add(&quad_record(q, texture), &geometry, &Affine2D::IDENTITY);
        }
        batcher.finish();

        let batches = batcher.batches();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].textures.as_slice(), &[TextureId(1), TextureId(2)]);
        assert_eq!((batches[0].start, batches[0].size), (0, 12));
        assert_eq!(batches[1].textures.as_slice(), &[TextureId(3)]);
        assert_eq!((batches[1].start, batches[1].size), (12, 6));
        assert_eq!(batcher.vertices()[8].texture_slot, 0);
        assert_eq!(batcher.vertices()[4].texture_slot, 1);
    }

    #[test]
    fn test_world_transform_applies() {
        let geometry = quad_geometry(1);
        let mut batcher = Batcher::default();
        batcher.begin();
        batcher.add(&quad_record(0, 0), &geometry, &Affine2D::translation(100.0, 0.0));
        let untransformed = BatchRecord {
            apply_transform: false,
            ..quad_record(0, 0)
        };
        batcher.add(&untransformed, &geometry, &Affine2D::translation(100.0, 0.0));
        batcher.finish();

        assert_eq!(batcher.vertices()[0].position, [100.0, 0.0]);
        assert_eq!(batcher.vertices()[4].position, [0.0, 0.0]);
        assert_eq!(
            batcher.vertex_bytes().len(),
            8 * std::mem::size_of::<BatchVertex>()
        );
    }

    #[test]
    fn test_begin_resets_output() {
        let geometry = quad_geometry(1);
        let mut batcher = Batcher::default();
        batcher.begin();
        batcher.add(&quad_record(0, 0), &geometry, &Affine2D::IDENTITY);
        batcher.finish();
        batcher.begin();
        batcher.finish();
        assert!(batcher.batches().is_empty());
        assert!(batcher.vertices().is_empty());
    }
}
