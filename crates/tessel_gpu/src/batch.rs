//! Batch records
//!
//! A record is one drawable range of a context's geometry: a shape primitive,
//! a stroke or a texture quad. Records are pooled and addressed by
//! [`RecordKey`].

use crate::pool::Poolable;
use crate::system::ContextKey;
use slotmap::new_key_type;
use tessel_core::{Color, TextureId};

new_key_type! {
    /// Handle to a pooled [`BatchRecord`]
    pub struct RecordKey;
}

#[derive(Clone, Debug, PartialEq)]
pub struct BatchRecord {
    /// First vertex of the range, in vertices (not floats)
    pub vertex_offset: usize,
    pub vertex_size: usize,
    /// First index of the range
    pub index_offset: usize,
    pub index_size: usize,
    pub texture: TextureId,
    pub color: Color,
    pub alpha: f32,
    /// Cache entry whose geometry this record points into
    pub owner: Option<ContextKey>,
    /// Whether the world transform applies when the range is merged
    pub apply_transform: bool,
}

impl Default for BatchRecord {
    fn default() -> Self {
        Self {
            vertex_offset: 0,
            vertex_size: 0,
            index_offset: 0,
            index_size: 0,
            texture: TextureId::WHITE,
            color: Color::WHITE,
            alpha: 1.0,
            owner: None,
            apply_transform: true,
        }
    }
}

impl BatchRecord {
    pub fn vertex_range(&self) -> std::ops::Range<usize> {
        self.vertex_offset..self.vertex_offset + self.vertex_size
    }

    pub fn index_range(&self) -> std::ops::Range<usize> {
        self.index_offset..self.index_offset + self.index_size
    }

    pub fn is_empty(&self) -> bool {
        self.index_size == 0
    }

    /// Premultiplied `0xAABBGGRR` color of the range
    pub fn packed_color(&self) -> u32 {
        self.color.to_premultiplied_abgr(self.alpha)
    }
}

impl Poolable for BatchRecord {
    fn reset(&mut self) {
        *self = BatchRecord::default();
    }
}
