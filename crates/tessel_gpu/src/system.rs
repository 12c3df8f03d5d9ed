//! Per-context GPU geometry cache
//!
//! The system owns one cache entry per drawing context, addressed by the slot
//! the context carries. Entries are rebuilt from scratch whenever their
//! context is dirty and are otherwise left alone, so a frame that changes
//! nothing retessellates nothing.

use crate::batch::{BatchRecord, RecordKey};
use crate::batcher::Batcher;
use crate::config::SystemConfig;
use crate::geometry::{build_context_batches, GeometryData, RecordSink};
use crate::pool::{Pool, PoolStats, Poolable};
use slotmap::{new_key_type, Key, KeyData, SlotMap};
use std::sync::atomic::{AtomicU64, Ordering};
use tessel_core::Affine2D;
use tessel_paint::{BatchMode, CacheSlot, GraphicsContext};

/// Contexts with fewer vertices than this are batched in `BatchMode::Auto`
pub const AUTO_BATCH_VERTEX_THRESHOLD: usize = 400;

/// Distinguishes the slots handed out by different systems
static NEXT_SYSTEM_ID: AtomicU64 = AtomicU64::new(1);

new_key_type! {
    /// Identity of a cache entry, stored in the context's cache slot
    pub struct ContextKey;

    /// Handle to pooled merged render data
    pub struct RenderDataKey;
}

impl ContextKey {
    fn from_entry(entry: u64) -> Self {
        ContextKey::from(KeyData::from_ffi(entry))
    }

    fn to_entry(self) -> u64 {
        self.data().as_ffi()
    }
}

/// Cached geometry of one context
#[derive(Debug, Default)]
pub struct GpuGraphicsContext {
    pub is_batchable: bool,
    pub batches: Vec<RecordKey>,
    pub geometry: GeometryData,
    pub render_data: Option<RenderDataKey>,
}

/// Merged, batcher-ready buffers of a batchable context
#[derive(Debug, Default)]
pub struct RenderData {
    pub batcher: Batcher,
}

impl Poolable for RenderData {
    fn reset(&mut self) {
        self.batcher.reset();
    }
}

#[derive(Debug)]
pub struct GraphicsContextSystem {
    id: u64,
    config: SystemConfig,
    contexts: SlotMap<ContextKey, GpuGraphicsContext>,
    records: Pool<RecordKey, BatchRecord>,
    render_data: Pool<RenderDataKey, RenderData>,
}

impl Default for GraphicsContextSystem {
    fn default() -> Self {
        Self::new(SystemConfig::default())
    }
}

impl GraphicsContextSystem {
    pub fn new(config: SystemConfig) -> Self {
        Self {
            id: NEXT_SYSTEM_ID.fetch_add(1, Ordering::Relaxed),
            config,
            contexts: SlotMap::with_key(),
            records: Pool::new(),
            render_data: Pool::new(),
        }
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    /// A drawing context configured from this system
    pub fn create_context(&self) -> GraphicsContext {
        let mut context = GraphicsContext::new();
        context.set_bezier_smoothness(self.config.effective_smoothness());
        context
    }

    /// Entry key of `context` if its slot was handed out by this system
    fn key_of(&self, context: &GraphicsContext) -> Option<ContextKey> {
        context
            .cache_slot()
            .filter(|slot| slot.system == self.id)
            .map(|slot| ContextKey::from_entry(slot.entry))
    }

    /// Cache entry key for `context`, creating the entry on first use
    ///
    /// A slot another system handed out is replaced; that system's entry is
    /// left alone.
    fn ensure_entry(&mut self, context: &mut GraphicsContext) -> (ContextKey, bool) {
        if let Some(key) = self.key_of(context) {
            if self.contexts.contains_key(key) {
                return (key, false);
            }
        }
        let key = self.contexts.insert(GpuGraphicsContext::default());
        context.set_cache_slot(Some(CacheSlot {
            system: self.id,
            entry: key.to_entry(),
        }));
        (key, true)
    }

    /// Rebuild the context's geometry if it is dirty (or was never built)
    pub fn update_gpu_context(&mut self, context: &mut GraphicsContext) -> &GpuGraphicsContext {
        let key = self.refresh(context);
        &self.contexts[key]
    }

    /// Rebuild when needed; returns the entry key
    fn refresh(&mut self, context: &mut GraphicsContext) -> ContextKey {
        let (key, created) = self.ensure_entry(context);
        if created || context.is_dirty() {
            self.rebuild(key, context);
            context.clear_dirty();
        }
        key
    }

    fn rebuild(&mut self, key: ContextKey, context: &GraphicsContext) {
        let Some(entry) = self.contexts.get_mut(key) else {
            return;
        };

        for record in entry.batches.drain(..) {
            self.records.release(record);
        }
        if let Some(data) = entry.render_data.take() {
            self.render_data.release(data);
        }
        entry.geometry.clear();

        let mut sink = RecordSink {
            pool: &mut self.records,
            owner: key,
            out: &mut entry.batches,
        };
        build_context_batches(context.instructions(), &mut entry.geometry, &mut sink);

        entry.is_batchable = match context.batch_mode() {
            _ if context.custom_shader() => false,
            BatchMode::NoBatch => false,
            BatchMode::Batch => true,
            BatchMode::Auto => entry.geometry.vertex_count() < AUTO_BATCH_VERTEX_THRESHOLD,
        };

        tracing::debug!(
            vertices = entry.geometry.vertex_count(),
            indices = entry.geometry.index_count(),
            batches = entry.batches.len(),
            batchable = entry.is_batchable,
            "rebuilt context geometry"
        );
    }

    /// Cache entry of an already-built context
    pub fn get_gpu_context(&self, context: &GraphicsContext) -> Option<&GpuGraphicsContext> {
        self.contexts.get(self.key_of(context)?)
    }

    /// Merged render data of a batchable context; `None` otherwise
    ///
    /// The context is brought up to date first. Merging happens once per
    /// rebuild; later calls return the same data.
    pub fn get_context_render_data(&mut self, context: &mut GraphicsContext) -> Option<&RenderData> {
        self.get_context_render_data_with(context, &Affine2D::IDENTITY)
    }

    /// As [`get_context_render_data`](Self::get_context_render_data), placing
    /// the geometry with `world` when it is first merged
    pub fn get_context_render_data_with(
        &mut self,
        context: &mut GraphicsContext,
        world: &Affine2D,
    ) -> Option<&RenderData> {
        let key = self.refresh(context);
        let entry = self.contexts.get_mut(key)?;
        if !entry.is_batchable {
            return None;
        }

        if entry.render_data.is_none() {
            let data_key = self.render_data.acquire();
            if let Some(data) = self.render_data.get_mut(data_key) {
                let batcher = &mut data.batcher;
                batcher.set_max_textures(self.config.max_batchable_textures);
                batcher.begin();
                batcher.ensure_attribute_buffer(
                    entry
                        .geometry
                        .vertex_count()
                        .max(self.config.initial_vertex_capacity),
                );
                batcher.ensure_index_buffer(
                    entry
                        .geometry
                        .index_count()
                        .max(self.config.initial_index_capacity),
                );
                for &record_key in &entry.batches {
                    if let Some(record) = self.records.get(record_key) {
                        batcher.add(record, &entry.geometry, world);
                    }
                }
                batcher.finish();
            }
            entry.render_data = Some(data_key);
        }

        entry.render_data.and_then(|k| self.render_data.get(k))
    }

    /// Rebuild every dirty context once; returns how many were rebuilt
    pub fn update_dirty<'a>(
        &mut self,
        contexts: impl IntoIterator<Item = &'a mut GraphicsContext>,
    ) -> usize {
        let mut rebuilt = 0;
        for context in contexts {
            let known = self.get_gpu_context(context).is_some();
            if context.is_dirty() || !known {
                self.refresh(context);
                rebuilt += 1;
            }
        }
        rebuilt
    }

    /// Tear down a context's cache entry, returning its records to the pool
    ///
    /// Returns `false` when the context had no entry in this system.
    pub fn destroy_context(&mut self, context: &mut GraphicsContext) -> bool {
        let Some(key) = self.key_of(context) else {
            return false;
        };
        context.set_cache_slot(None);
        context.mark_dirty();

        let Some(mut entry) = self.contexts.remove(key) else {
            return false;
        };
        for record in entry.batches.drain(..) {
            self.records.release(record);
        }
        if let Some(data) = entry.render_data.take() {
            self.render_data.release(data);
        }
        true
    }

    pub fn record(&self, key: RecordKey) -> Option<&BatchRecord> {
        self.records.get(key)
    }

    /// Records of a cache entry in draw order
    pub fn records<'a>(
        &'a self,
        entry: &'a GpuGraphicsContext,
    ) -> impl Iterator<Item = &'a BatchRecord> + 'a {
        entry.batches.iter().filter_map(|&k| self.records.get(k))
    }

    pub fn context_count(&self) -> usize {
        self.contexts.len()
    }

    pub fn record_pool_stats(&self) -> PoolStats {
        self.records.stats()
    }

    pub fn render_data_pool_stats(&self) -> PoolStats {
        self.render_data.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessel_core::Color;

    fn small_context(system: &GraphicsContextSystem) -> GraphicsContext {
        let mut ctx = system.create_context();
        ctx.rect(0.0, 0.0, 10.0, 10.0).fill_with(Color::RED);
        ctx.circle(30.0, 30.0, 5.0).fill();
        ctx
    }

    #[test]
    fn test_first_update_builds_and_clears_dirty() {
        let mut system = GraphicsContextSystem::default();
        let mut ctx = small_context(&system);
        assert!(ctx.is_dirty());

        let entry = system.update_gpu_context(&mut ctx);
        assert_eq!(entry.batches.len(), 2);
        assert!(entry.is_batchable);
        assert!(!ctx.is_dirty());
        assert!(ctx.cache_slot().is_some());
        assert_eq!(system.context_count(), 1);
    }

    #[test]
    fn test_batch_mode_and_custom_shader() {
        let mut system = GraphicsContextSystem::default();
        let mut ctx = small_context(&system);
        ctx.set_batch_mode(BatchMode::NoBatch);
        assert!(!system.update_gpu_context(&mut ctx).is_batchable);
        assert!(system.get_context_render_data(&mut ctx).is_none());

        ctx.set_batch_mode(BatchMode::Batch);
        assert!(system.update_gpu_context(&mut ctx).is_batchable);

        ctx.set_custom_shader(true);
        assert!(!system.update_gpu_context(&mut ctx).is_batchable);
    }

    #[test]
    fn test_render_data_is_merged_once() {
        let mut system = GraphicsContextSystem::default();
        let mut ctx = small_context(&system);

        let vertices = system
            .get_context_render_data(&mut ctx)
            .map(|data| data.batcher.vertices().len());
        let geometry_vertices = system
            .get_gpu_context(&ctx)
            .map(|entry| entry.geometry.vertex_count());
        assert_eq!(vertices, geometry_vertices);
        assert_eq!(system.render_data_pool_stats().acquired, 1);

        assert!(system.get_context_render_data(&mut ctx).is_some());
        assert_eq!(system.render_data_pool_stats().acquired, 1);

        // A rebuild drops the merged data
        ctx.rect(50.0, 50.0, 5.0, 5.0).fill();
        system.update_gpu_context(&mut ctx);
        assert_eq!(system.render_data_pool_stats().live, 0);
    }

    #[test]
    fn test_stale_slot_self_heals() {
        let mut system = GraphicsContextSystem::default();
        let mut ctx = small_context(&system);
        let stale = CacheSlot {
            system: system.id,
            entry: 0xDEAD_BEEF,
        };
        ctx.set_cache_slot(Some(stale));
        assert!(system.get_gpu_context(&ctx).is_none());

        let entry = system.update_gpu_context(&mut ctx);
        assert_eq!(entry.batches.len(), 2);
        assert_ne!(ctx.cache_slot(), Some(stale));
    }

    #[test]
    fn test_slot_from_another_system_is_not_reused() {
        let mut a = GraphicsContextSystem::default();
        let mut b = GraphicsContextSystem::default();

        let mut square = a.create_context();
        square.rect(0.0, 0.0, 10.0, 10.0).fill();
        assert_eq!(a.update_gpu_context(&mut square).geometry.vertex_count(), 4);

        // Same raw entry key as `square` had in `a`
        let mut disc = b.create_context();
        disc.circle(0.0, 0.0, 20.0).fill();
        let disc_vertices = b.update_gpu_context(&mut disc).geometry.vertex_count();
        assert_ne!(disc_vertices, 4);

        assert!(b.get_gpu_context(&square).is_none());
        assert!(!b.destroy_context(&mut square));
        assert!(square.cache_slot().is_some());

        assert_eq!(b.update_gpu_context(&mut square).geometry.vertex_count(), 4);
        assert_eq!(b.context_count(), 2);
        assert_eq!(
            b.get_gpu_context(&disc).map(|e| e.geometry.vertex_count()),
            Some(disc_vertices)
        );
    }

    #[test]
    fn test_destroy_twice_is_harmless() {
        let mut system = GraphicsContextSystem::default();
        let mut ctx = small_context(&system);
        system.update_gpu_context(&mut ctx);
        assert!(system.destroy_context(&mut ctx));
        assert!(!system.destroy_context(&mut ctx));
        assert_eq!(system.record_pool_stats().live, 0);
        assert!(ctx.is_dirty());
    }

    #[test]
    fn test_update_dirty_counts_rebuilds() {
        let mut system = GraphicsContextSystem::default();
        let mut contexts = vec![small_context(&system), small_context(&system)];
        assert_eq!(system.update_dirty(contexts.iter_mut()), 2);
        assert_eq!(system.update_dirty(contexts.iter_mut()), 0);

        contexts[1].rect(0.0, 0.0, 1.0, 1.0).fill();
        assert_eq!(system.update_dirty(contexts.iter_mut()), 1);
    }
}
