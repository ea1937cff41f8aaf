// In: src/buffer/pool.rs

//! The process-wide pool of reusable element storage.
//!
//! Buffers are shelved by element type. Renting pops a retained `Vec<T>` (or
//! allocates a new one); giving back clears it and shelves it again, unless the
//! shelf is full or the buffer has grown too large to be worth keeping.

use hashbrown::HashMap;
use log::{trace, warn};
use parking_lot::Mutex;
use std::any::{type_name, Any, TypeId};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

/// Buffers retained per element type.
pub const DEFAULT_MAX_RETAINED: usize = 8;
/// Buffers whose capacity exceeds this many elements are dropped on return.
pub const DEFAULT_MAX_RETAINED_CAPACITY: usize = 1 << 20;

static GLOBAL_POOL: OnceLock<BufferPool> = OnceLock::new();

/// Counters for diagnostics. All values are cumulative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub rents: u64,
    /// Rents served from a shelved buffer.
    pub hits: u64,
    pub returns: u64,
    /// Returned buffers that were not shelved.
    pub discarded: u64,
}

pub struct BufferPool {
    shelves: Mutex<HashMap<TypeId, Vec<Box<dyn Any + Send>>>>,
    max_retained: usize,
    max_retained_capacity: usize,
    rents: AtomicU64,
    hits: AtomicU64,
    returns: AtomicU64,
    discarded: AtomicU64,
}

impl BufferPool {
    pub fn new(max_retained: usize, max_retained_capacity: usize) -> Self {
        Self {
            shelves: Mutex::new(HashMap::new()),
            max_retained,
            max_retained_capacity,
            rents: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            returns: AtomicU64::new(0),
            discarded: AtomicU64::new(0),
        }
    }

    /// The shared pool, created on first use.
    pub fn global() -> &'static BufferPool {
        GLOBAL_POOL.get_or_init(|| BufferPool::new(DEFAULT_MAX_RETAINED, DEFAULT_MAX_RETAINED_CAPACITY))
    }

    /// Returns an empty buffer with at least `min_capacity` capacity.
    pub fn rent<T: Send + 'static>(&self, min_capacity: usize) -> Vec<T> {
        self.rents.fetch_add(1, Ordering::Relaxed);

        let shelved = {
            let mut shelves = self.shelves.lock();
            shelves.get_mut(&TypeId::of::<T>()).and_then(|shelf| shelf.pop())
        };

        match shelved.map(|boxed| boxed.downcast::<Vec<T>>()) {
            Some(Ok(boxed)) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                let mut buffer = *boxed;
                if buffer.capacity() < min_capacity {
                    buffer.reserve_exact(min_capacity - buffer.len());
                }
                trace!(
                    "pool: reused Vec<{}> with capacity {}",
                    type_name::<T>(),
                    buffer.capacity()
                );
                buffer
            }
            // Shelves are keyed by TypeId, so a failed downcast only means an empty shelf.
            _ => {
                trace!("pool: allocating Vec<{}> with capacity {}", type_name::<T>(), min_capacity);
                Vec::with_capacity(min_capacity)
            }
        }
    }

    /// Clears `buffer` and shelves it for reuse.
    pub fn give_back<T: Send + 'static>(&self, mut buffer: Vec<T>) {
        self.returns.fetch_add(1, Ordering::Relaxed);
        buffer.clear();

        if buffer.capacity() > self.max_retained_capacity {
            warn!(
                "pool: dropping Vec<{}> with capacity {} (retention limit {})",
                type_name::<T>(),
                buffer.capacity(),
                self.max_retained_capacity
            );
            self.discarded.fetch_add(1, Ordering::Relaxed);
            return;
        }

        let mut shelves = self.shelves.lock();
        let shelf = shelves.entry(TypeId::of::<T>()).or_default();
        if shelf.len() < self.max_retained {
            trace!("pool: shelved Vec<{}> ({} on shelf)", type_name::<T>(), shelf.len() + 1);
            shelf.push(Box::new(buffer));
        } else {
            self.discarded.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Number of buffers currently shelved for element type `T`.
    pub fn retained<T: 'static>(&self) -> usize {
        self.shelves
            .lock()
            .get(&TypeId::of::<T>())
            .map_or(0, |shelf| shelf.len())
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            rents: self.rents.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            returns: self.returns.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
        }
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETAINED, DEFAULT_MAX_RETAINED_CAPACITY)
    }
}
