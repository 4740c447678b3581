//! Per-worker staging buffer for right-operand rows
//!
//! A worker copies the row it is about to dot against into its own
//! cache-line aligned buffer, so the merge-join walks local memory. The
//! buffer is reused for every row the worker processes and never shared.

use aligned_vec::AVec;
use num_traits::Num;
use std::ops::AddAssign;

use crate::matrix::SparseRow;

const ALIGN: usize = 64;

/// Reusable aligned copy of one sparse row
pub struct ScratchRow<T> {
    /// Backing storage (AVec provides alignment)
    entries: AVec<(usize, T)>,
    /// Length of the currently staged row
    size: usize,
    /// Allocated capacity
    capacity: usize,
}

impl<T> ScratchRow<T>
where
    T: Copy + Num + AddAssign,
{
    /// Create a buffer able to hold `initial_capacity` entries without growing
    pub fn new(initial_capacity: usize) -> Self {
        let capacity = initial_capacity.max(1);
        Self {
            entries: Self::zeroed(capacity),
            size: 0,
            capacity,
        }
    }

    fn zeroed(capacity: usize) -> AVec<(usize, T)> {
        AVec::from_iter(ALIGN, (0..capacity).map(|_| (0usize, T::zero())))
    }

    /// Ensure we have room for `required` entries
    fn ensure_capacity(&mut self, required: usize) {
        if required > self.capacity {
            let new_capacity = required.next_power_of_two();
            // Staged contents are transient, nothing to carry over
            self.entries = Self::zeroed(new_capacity);
            self.capacity = new_capacity;
        }
    }

    /// Replace the buffer contents with a copy of `row`
    ///
    /// Returns the staged copy, sized exactly to the row.
    pub fn stage(&mut self, row: &SparseRow<T>) -> &[(usize, T)] {
        let src = row.entries();
        self.ensure_capacity(src.len());
        self.entries[..src.len()].copy_from_slice(src);
        self.size = src.len();
        &self.entries[..self.size]
    }

    /// The currently staged row
    pub fn as_slice(&self) -> &[(usize, T)] {
        &self.entries[..self.size]
    }

    /// Number of entries currently staged
    pub fn len(&self) -> usize {
        self.size
    }

    /// Whether nothing is staged
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Allocated capacity in entries
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
