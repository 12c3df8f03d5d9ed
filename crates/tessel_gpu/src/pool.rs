//! Handle-keyed object pools
//!
//! Live objects sit in a `SlotMap`, so a handle is only valid until its
//! object is released; a stale handle can never reach a recycled object.
//! Released objects are reset and kept on a free list for the next acquire.

use slotmap::{Key, SlotMap};

/// Objects that can be recycled by a [`Pool`]
pub trait Poolable: Default {
    /// Drop per-use state while keeping allocations
    fn reset(&mut self);
}

/// Checkout counters of a pool
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Objects currently checked out
    pub live: usize,
    /// Total acquisitions
    pub acquired: u64,
    /// Total releases
    pub released: u64,
}

#[derive(Debug)]
pub struct Pool<K: Key, T: Poolable> {
    live: SlotMap<K, T>,
    free: Vec<T>,
    acquired: u64,
    released: u64,
}

impl<K: Key, T: Poolable> Default for Pool<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key, T: Poolable> Pool<K, T> {
    pub fn new() -> Self {
        Self {
            live: SlotMap::with_key(),
            free: Vec::new(),
            acquired: 0,
            released: 0,
        }
    }

    /// Check out an object, recycling a released one when available
    pub fn acquire(&mut self) -> K {
        let value = self.free.pop().unwrap_or_default();
        self.acquired += 1;
        self.live.insert(value)
    }

    pub fn get(&self, key: K) -> Option<&T> {
        self.live.get(key)
    }

    pub fn get_mut(&mut self, key: K) -> Option<&mut T> {
        self.live.get_mut(key)
    }

    /// Return an object; `false` if the handle was already released
    pub fn release(&mut self, key: K) -> bool {
        match self.live.remove(key) {
            Some(mut value) => {
                value.reset();
                self.free.push(value);
                self.released += 1;
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, key: K) -> bool {
        self.live.contains_key(key)
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            live: self.live.len(),
            acquired: self.acquired,
            released: self.released,
        }
    }

    /// Released objects waiting for reuse
    pub fn free_len(&self) -> usize {
        self.free.len()
    }
}
