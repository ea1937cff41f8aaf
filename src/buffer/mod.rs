// In: src/buffer/mod.rs

//! The append-only construction buffer used while decoding an array.
//!
//! An `ElementBuffer` is acquired in one of two modes:
//!
//! - **Exact**: the length is known up front. Exactly that capacity is
//!   allocated, appending past it fails with `CapacityExceeded`, and
//!   `finalize` hands back the backing `Vec` without copying. The reservation
//!   of `length * size_of::<T>()` bytes happens on the header alone, before a
//!   single element is read: at the default ceiling a `na_string` header asks
//!   for roughly 48 GiB. Embedders should set `max_serialized_length` to fit
//!   their memory budget.
//! - **Pooled**: the length is unknown. Storage is rented from the shared
//!   `BufferPool` and doubled as needed; `finalize` copies the live prefix into
//!   an exact-size `Vec`.
//!
//! Rented storage goes back to the pool when the buffer is dropped, so an
//! early return on a decode error releases it too.

pub mod pool;

pub use pool::{BufferPool, PoolStats};

use crate::config::DEFAULT_POOLED_CAPACITY;
use crate::error::VecframeError;
use std::mem;

enum Mode {
    Exact { capacity: usize },
    Pooled(&'static BufferPool),
}

pub struct ElementBuffer<T: Send + 'static> {
    storage: Vec<T>,
    mode: Mode,
}

impl<T: Send + 'static> ElementBuffer<T> {
    /// `Some(n)` pre-sizes to exactly `n`; `None` rents from the global pool.
    pub fn acquire(expected: Option<usize>) -> Result<Self, VecframeError> {
        Self::acquire_with(expected, DEFAULT_POOLED_CAPACITY)
    }

    pub fn acquire_with(expected: Option<usize>, pooled_capacity: usize) -> Result<Self, VecframeError> {
        Self::acquire_in(BufferPool::global(), expected, pooled_capacity)
    }

    pub fn acquire_in(
        pool: &'static BufferPool,
        expected: Option<usize>,
        pooled_capacity: usize,
    ) -> Result<Self, VecframeError> {
        match expected {
            Some(capacity) => {
                let mut storage = Vec::new();
                storage
                    .try_reserve_exact(capacity)
                    .map_err(|_| VecframeError::LengthTooLarge {
                        length: capacity as u64,
                        max: isize::MAX as usize / mem::size_of::<T>().max(1),
                    })?;
                Ok(Self {
                    storage,
                    mode: Mode::Exact { capacity },
                })
            }
            None => Ok(Self {
                storage: pool.rent(pooled_capacity.max(1)),
                mode: Mode::Pooled(pool),
            }),
        }
    }

    /// Appends one element. Amortized O(1).
    pub fn append(&mut self, value: T) -> Result<(), VecframeError> {
        match self.mode {
            Mode::Exact { capacity } => {
                if self.storage.len() == capacity {
                    return Err(VecframeError::CapacityExceeded { capacity });
                }
            }
            Mode::Pooled(_) => {
                if self.storage.len() == self.storage.capacity() {
                    let grow_by = self.storage.capacity().max(1);
                    self.storage.reserve_exact(grow_by);
                }
            }
        }
        self.storage.push(value);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.storage.capacity()
    }

    pub fn is_pooled(&self) -> bool {
        matches!(self.mode, Mode::Pooled(_))
    }

    /// Produces the exact-length result. Pooled storage is returned to the pool.
    pub fn finalize(mut self) -> Vec<T> {
        match self.mode {
            Mode::Exact { .. } => mem::take(&mut self.storage),
            Mode::Pooled(_) => self.storage.drain(..).collect(),
        }
    }

    /// Discards the contents and returns any pooled storage.
    pub fn release(self) {}
}

impl<T: Send + 'static> Drop for ElementBuffer<T> {
    fn drop(&mut self) {
        if let Mode::Pooled(pool) = self.mode {
            pool.give_back(mem::take(&mut self.storage));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_pool() -> &'static BufferPool {
        Box::leak(Box::new(BufferPool::default()))
    }

    #[test]
    fn test_exact_mode_is_bounded() {
        let mut buf = ElementBuffer::<i32>::acquire(Some(2)).unwrap();
        assert!(!buf.is_pooled());
        buf.append(1).unwrap();
        buf.append(2).unwrap();
        assert!(matches!(
            buf.append(3),
            Err(VecframeError::CapacityExceeded { capacity: 2 })
        ));
        let values = buf.finalize();
        assert_eq!(values, vec![1, 2]);
        assert_eq!(values.capacity(), 2);
    }

    #[test]
    fn test_exact_mode_zero_length() {
        let mut buf = ElementBuffer::<String>::acquire(Some(0)).unwrap();
        assert!(buf.append("x".to_string()).is_err());
        assert!(buf.finalize().is_empty());
    }

    #[test]
    fn test_pooled_mode_grows_and_returns_storage() {
        let pool = local_pool();
        let mut buf = ElementBuffer::<u64>::acquire_in(pool, None, 2).unwrap();
        assert!(buf.is_pooled());
        for i in 0..9 {
            buf.append(i).unwrap();
        }
        assert!(buf.capacity() >= 9);
        let values = buf.finalize();
        assert_eq!(values, (0..9).collect::<Vec<u64>>());
        assert_eq!(values.len(), values.capacity());
        assert_eq!(pool.retained::<u64>(), 1);
    }

    #[test]
    fn test_pooled_storage_is_returned_on_early_exit() {
        let pool = local_pool();
        let result: Result<(), VecframeError> = (|| {
            let mut buf = ElementBuffer::<u8>::acquire_in(pool, None, 4)?;
            buf.append(1)?;
            Err(VecframeError::malformed("early exit"))
        })();
        assert!(result.is_err());
        assert_eq!(pool.retained::<u8>(), 1);
        assert_eq!(pool.stats().returns, 1);

        let buf = ElementBuffer::<u8>::acquire_in(pool, None, 4).unwrap();
        buf.release();
        assert_eq!(pool.stats().hits, 1);
    }

    #[test]
    fn test_oversized_expected_length_fails_cleanly() {
        let result = ElementBuffer::<u128>::acquire(Some(usize::MAX));
        assert!(matches!(result, Err(VecframeError::LengthTooLarge { .. })));
    }
}
