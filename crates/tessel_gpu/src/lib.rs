//! Tessel GPU geometry
//!
//! Turns recorded drawing contexts into GPU-ready buffers:
//!
//! - **Triangulation**: ear clipping with holes (`earcut`), stroke outlines
//!   with joins and caps (`stroke`), per-shape outlines (`build`)
//! - **Assembly**: one vertex/uv/index buffer set per context plus a pooled
//!   `BatchRecord` per drawable range
//! - **Caching**: `GraphicsContextSystem` rebuilds a context only when it is dirty
//! - **Batching**: `Batcher` merges small contexts into few draw calls
//!
//! Submission to an actual GPU is left to a [`DrawSink`] implementation.
//!
//! # Example
//!
//! ```rust
//! use tessel_core::Color;
//! use tessel_gpu::{GraphicsContextSystem, GraphicsPipe, RecordingSink};
//!
//! let mut system = GraphicsContextSystem::default();
//! let mut ctx = system.create_context();
//! ctx.rect(0.0, 0.0, 100.0, 50.0).fill_with(Color::RED);
//!
//! let mut sink = RecordingSink::default();
//! let draws = GraphicsPipe::new().render(&mut system, &mut ctx, &mut sink);
//! assert_eq!(draws, 1);
//! assert_eq!(sink.indices.len(), 6);
//! ```

pub mod batch;
pub mod batcher;
pub mod build;
pub mod config;
pub mod earcut;
pub mod error;
pub mod geometry;
pub mod pipe;
pub mod pool;
pub mod stroke;
pub mod system;

pub use batch::{BatchRecord, RecordKey};
pub use batcher::{BatchVertex, Batcher, DrawBatch, TextureSet};
pub use config::SystemConfig;
pub use earcut::{deviation, earcut, earcut_linear};
pub use error::{ConfigError, Result};
pub use geometry::GeometryData;
pub use pipe::{DrawCall, DrawSink, GeometryUpload, GraphicsPipe, RecordingSink};
pub use pool::{Pool, PoolStats, Poolable};
pub use stroke::{build_line, LineStyle};
pub use system::{
    ContextKey, GpuGraphicsContext, GraphicsContextSystem, RenderData, RenderDataKey,
    AUTO_BATCH_VERTEX_THRESHOLD,
};
