//! Renderer seam
//!
//! A backend implements [`DrawSink`]; [`GraphicsPipe`] feeds it a context's
//! geometry either as one merged upload with a draw per texture group
//! (batchable contexts) or as the raw cached geometry with a draw per record.

use crate::batcher::{BatchVertex, TextureSet};
use crate::geometry::GeometryData;
use crate::system::GraphicsContextSystem;
use smallvec::smallvec;
use tessel_core::{Affine2D, TextureId};
use tessel_paint::GraphicsContext;

/// Buffers handed to the backend before its draw calls
#[derive(Clone, Copy, Debug)]
pub enum GeometryUpload<'a> {
    /// Interleaved, already placed in world space
    Batched {
        vertices: &'a [BatchVertex],
        indices: &'a [u32],
    },
    /// A context's own buffers, drawn under `transform`
    Raw {
        geometry: &'a GeometryData,
        transform: Affine2D,
    },
}

/// One draw over `index_count` indices of the last upload
#[derive(Clone, Debug, PartialEq)]
pub struct DrawCall {
    pub index_start: usize,
    pub index_count: usize,
    pub textures: TextureSet,
    /// Uniform premultiplied color for raw draws; batched vertices carry their own
    pub color: Option<u32>,
}

pub trait DrawSink {
    fn upload(&mut self, upload: &GeometryUpload<'_>);
    fn draw(&mut self, call: &DrawCall);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct GraphicsPipe {
    world_transform: Affine2D,
}

impl GraphicsPipe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_world_transform(world_transform: Affine2D) -> Self {
        Self { world_transform }
    }

    /// Bring `context` up to date and draw it; returns the number of draw calls
    pub fn render(
        &self,
        system: &mut GraphicsContextSystem,
        context: &mut GraphicsContext,
        sink: &mut dyn DrawSink,
    ) -> usize {
        let is_batchable = system.update_gpu_context(context).is_batchable;

        if is_batchable {
            let Some(data) = system.get_context_render_data_with(context, &self.world_transform)
            else {
                return 0;
            };
            let batcher = &data.batcher;
            if batcher.batches().is_empty() {
                return 0;
            }
            sink.upload(&GeometryUpload::Batched {
                vertices: batcher.vertices(),
                indices: batcher.indices(),
            });
            for batch in batcher.batches() {
                sink.draw(&DrawCall {
                    index_start: batch.start,
                    index_count: batch.size,
                    textures: batch.textures.clone(),
                    color: None,
                });
            }
            return batcher.batches().len();
        }

        let Some(entry) = system.get_gpu_context(context) else {
            return 0;
        };
        if entry.geometry.is_empty() {
            return 0;
        }
        sink.upload(&GeometryUpload::Raw {
            geometry: &entry.geometry,
            transform: self.world_transform,
        });
        let mut draws = 0;
        for record in system.records(entry) {
            if record.is_empty() {
                continue;
            }
            let texture: TextureId = record.texture;
            sink.draw(&DrawCall {
                index_start: record.index_offset,
                index_count: record.index_size,
                textures: smallvec![texture],
                color: Some(record.packed_color()),
            });
            draws += 1;
        }
        draws
    }
}

/// Sink that keeps what it was given, for tests and tools
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    pub uploads: usize,
    /// Bytes of the last upload's vertex data
    pub vertex_bytes: Vec<u8>,
    pub indices: Vec<u32>,
    pub draws: Vec<DrawCall>,
}

impl DrawSink for RecordingSink {
    fn upload(&mut self, upload: &GeometryUpload<'_>) {
        self.uploads += 1;
        match upload {
            GeometryUpload::Batched { vertices, indices } => {
                self.vertex_bytes = bytemuck::cast_slice(vertices).to_vec();
                self.indices = indices.to_vec();
            }
            GeometryUpload::Raw { geometry, .. } => {
                self.vertex_bytes = bytemuck::cast_slice(&geometry.vertices).to_vec();
                self.indices = geometry.indices.clone();
            }
        }
    }

    fn draw(&mut self, call: &DrawCall) {
        self.draws.push(call.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessel_core::{Color, Texture};
    use tessel_paint::BatchMode;

    fn scene(system: &GraphicsContextSystem) -> GraphicsContext {
        let mut ctx = system.create_context();
        ctx.rect(0.0, 0.0, 10.0, 10.0).fill_with(Color::RED);
        ctx.rect(20.0, 0.0, 10.0, 10.0).fill_with(Color::GREEN);
        ctx.texture(Texture::new(TextureId(5), 8.0, 8.0), None, 40.0, 0.0, 0.0, 0.0);
        ctx
    }

    #[test]
    fn test_batched_context_merges_draws() {
        let mut system = GraphicsContextSystem::default();
        let mut ctx = scene(&system);
        let mut sink = RecordingSink::default();

        let draws = GraphicsPipe::new().render(&mut system, &mut ctx, &mut sink);
        assert_eq!(draws, 1);
        assert_eq!(sink.uploads, 1);
        assert_eq!(sink.draws[0].index_count, 18);
        assert_eq!(
            sink.draws[0].textures.as_slice(),
            &[TextureId::WHITE, TextureId(5)]
        );
        assert_eq!(
            sink.vertex_bytes.len(),
            12 * std::mem::size_of::<BatchVertex>()
        );
    }

    #[test]
    fn test_standalone_context_draws_per_record() {
        let mut system = GraphicsContextSystem::default();
        let mut ctx = scene(&system);
        ctx.set_batch_mode(BatchMode::NoBatch);
        let mut sink = RecordingSink::default();

        let draws = GraphicsPipe::new().render(&mut system, &mut ctx, &mut sink);
        assert_eq!(draws, 3);
        let starts: Vec<usize> = sink.draws.iter().map(|d| d.index_start).collect();
        assert_eq!(starts, vec![0, 6, 12]);
        assert_eq!(sink.draws[0].color, Some(0xFF00_00FF));
        assert_eq!(sink.vertex_bytes.len(), 12 * 2 * 4);
    }

    #[test]
    fn test_empty_context_draws_nothing() {
        let mut system = GraphicsContextSystem::default();
        let mut ctx = system.create_context();
        let mut sink = RecordingSink::default();
        assert_eq!(GraphicsPipe::new().render(&mut system, &mut ctx, &mut sink), 0);
        assert_eq!(sink.uploads, 0);
    }
}
