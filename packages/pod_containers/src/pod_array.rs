use std::fmt;
use std::ops::{Index, IndexMut};

use bytemuck::Pod;
use tracing::debug;

use crate::table::{whole_items, zeroed_block};
use crate::{Error, RandomAccess, Result};

/// A contiguous array of plain-old-data items with caller-driven capacity planning.
///
/// Unlike `Vec`, a `PodArray` never grows on its own. The caller reserves capacity up front via
/// [`with_capacity()`][1], [`set_capacity()`][2], [`allocate()`][3] or [`resize()`][4] and then
/// fills the reserved room. Appending beyond the reserved capacity is reported as
/// [`Error::CapacityExceeded`] instead of triggering a reallocation.
///
/// Items in `[0, len)` are valid. Items in `[len, capacity)` are allocated but their values are
/// unspecified and are never exposed.
///
/// # Address stability
///
/// Any operation that reallocates moves all items. The borrow checker prevents references from
/// being held across such operations; raw pointers obtained from [`as_slice()`][5] must not be
/// retained across them either. If you need addresses that survive growth, use
/// [`BlockVec`][crate::BlockVec].
///
/// # Example
///
/// ```
/// use pod_containers::PodArray;
///
/// let mut vertices = PodArray::<f32>::with_capacity(4, 0).unwrap();
/// vertices.add(1.0).unwrap();
/// vertices.add(2.0).unwrap();
///
/// assert_eq!(vertices.as_slice(), &[1.0, 2.0]);
/// assert_eq!(vertices.capacity(), 4);
/// ```
///
/// [1]: Self::with_capacity
/// [2]: Self::set_capacity
/// [3]: Self::allocate
/// [4]: Self::resize
/// [5]: Self::as_slice
#[derive(Clone)]
pub struct PodArray<T> {
    /// The whole reserved region. Its length is the capacity.
    items: Box<[T]>,

    len: usize,
}

impl<T: Pod> PodArray<T> {
    /// Creates an empty array without reserving any memory.
    ///
    /// # Panics
    ///
    /// Panics if `T` is zero-sized.
    #[must_use]
    pub fn new() -> Self {
        assert!(size_of::<T>() > 0, "PodArray must have non-zero item size");

        Self {
            items: Box::default(),
            len: 0,
        }
    }

    /// Creates an empty array with room for `capacity + extra_tail` items.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailed`] if the memory cannot be obtained.
    ///
    /// # Panics
    ///
    /// Panics if `T` is zero-sized.
    pub fn with_capacity(capacity: usize, extra_tail: usize) -> Result<Self> {
        let mut array = Self::new();
        array.set_capacity(capacity, extra_tail)?;
        Ok(array)
    }

    /// Drops all content and makes sure there is room for at least `capacity` items.
    ///
    /// The array is reallocated to `capacity + extra_tail` items only if `capacity` exceeds the
    /// current capacity. An adequate allocation is never shrunk. The length becomes zero either
    /// way.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailed`] if the memory cannot be obtained. The array is left
    /// empty with its previous allocation.
    pub fn set_capacity(&mut self, capacity: usize, extra_tail: usize) -> Result<()> {
        self.len = 0;

        if capacity > self.capacity() {
            let total = capacity
                .checked_add(extra_tail)
                .ok_or(Error::AllocationFailed { bytes: usize::MAX })?;

            debug!(
                old_capacity = self.capacity(),
                new_capacity = total,
                "reallocating PodArray"
            );

            self.items = zeroed_block(total)?;
        }

        Ok(())
    }

    /// Drops all content and exposes `len` items with unspecified values.
    ///
    /// Capacity is planned as by [`set_capacity()`][Self::set_capacity].
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailed`] if the memory cannot be obtained.
    pub fn allocate(&mut self, len: usize, extra_tail: usize) -> Result<()> {
        self.set_capacity(len, extra_tail)?;
        self.len = len;
        Ok(())
    }

    /// Changes the length, keeping existing content.
    ///
    /// Shrinking only truncates, without touching memory. Growing within the current capacity
    /// exposes the reserved items (with unspecified values). Growing beyond the capacity
    /// reallocates to exactly `new_len` items and copies the existing content over.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailed`] if the memory cannot be obtained. The array is left
    /// unchanged.
    pub fn resize(&mut self, new_len: usize) -> Result<()> {
        if new_len > self.capacity() {
            debug!(
                old_capacity = self.capacity(),
                new_capacity = new_len,
                "reallocating PodArray"
            );

            let mut items = zeroed_block::<T>(new_len)?;
            items
                .get_mut(..self.len)
                .expect("new capacity exceeds old capacity which is at least len")
                .copy_from_slice(self.as_slice());
            self.items = items;
        }

        self.len = new_len;
        Ok(())
    }

    /// Appends an item to the end of the array.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityExceeded`] if no reserved room is left. The array never grows
    /// on its own.
    pub fn add(&mut self, value: T) -> Result<()> {
        let capacity = self.capacity();
        let slot = self
            .items
            .get_mut(self.len)
            .ok_or(Error::CapacityExceeded { capacity })?;

        *slot = value;
        self.len = self.len.wrapping_add(1);
        Ok(())
    }

    /// Exposes `count` more reserved items, typically after writing them through
    /// [`spare_capacity_mut()`][Self::spare_capacity_mut].
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityExceeded`] if fewer than `count` reserved items remain.
    pub fn inc_size(&mut self, count: usize) -> Result<()> {
        let new_len = self
            .len
            .checked_add(count)
            .filter(|&new_len| new_len <= self.capacity())
            .ok_or(Error::CapacityExceeded {
                capacity: self.capacity(),
            })?;

        self.len = new_len;
        Ok(())
    }

    /// The reserved but not yet exposed items, `[len, capacity)`.
    #[must_use]
    pub fn spare_capacity_mut(&mut self) -> &mut [T] {
        self.items
            .get_mut(self.len..)
            .expect("len never exceeds capacity")
    }

    /// Sets every item in `[0, len)` to its all-zero bit pattern.
    pub fn zero(&mut self) {
        self.as_mut_slice().fill(T::zeroed());
    }

    /// The number of items in the array.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the array holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The number of items the array has room for without reallocating.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.items.len()
    }

    /// The number of bytes produced by [`serialize_into()`][Self::serialize_into].
    #[must_use]
    pub fn byte_size(&self) -> usize {
        self.len.saturating_mul(size_of::<T>())
    }

    /// Sets the length to zero, keeping the allocation.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Shortens the array to `len` items. Has no effect if the array is already shorter.
    pub fn truncate(&mut self, len: usize) {
        self.len = self.len.min(len);
    }

    /// Returns the item at `index`, or `None` if it is out of range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    /// Returns the item at `index` for modification, or `None` if it is out of range.
    #[must_use]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.as_mut_slice().get_mut(index)
    }

    /// Returns a copy of the item at `index`, or `None` if it is out of range.
    #[must_use]
    pub fn value_at(&self, index: usize) -> Option<T> {
        self.get(index).copied()
    }

    /// Overwrites the item at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] if `index` is not less than the length.
    pub fn set(&mut self, index: usize, value: T) -> Result<()> {
        let len = self.len;
        let slot = self
            .get_mut(index)
            .ok_or(Error::IndexOutOfBounds { index, len })?;
        *slot = value;
        Ok(())
    }

    /// The items of the array as a contiguous slice.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        self.items
            .get(..self.len)
            .expect("len never exceeds capacity")
    }

    /// The items of the array as a contiguous mutable slice.
    #[must_use]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.items
            .get_mut(..self.len)
            .expect("len never exceeds capacity")
    }

    /// Writes the raw bytes of all items into `target`, returning the number of bytes written.
    ///
    /// The output is the plain concatenation of the item byte representations, without any
    /// header or padding.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferTooSmall`] if `target` is shorter than
    /// [`byte_size()`][Self::byte_size].
    pub fn serialize_into(&self, target: &mut [u8]) -> Result<usize> {
        let bytes: &[u8] = bytemuck::cast_slice(self.as_slice());

        let available = target.len();
        target
            .get_mut(..bytes.len())
            .ok_or(Error::BufferTooSmall {
                required: bytes.len(),
                available,
            })?
            .copy_from_slice(bytes);

        Ok(bytes.len())
    }

    /// Returns the raw bytes of all items, as written by
    /// [`serialize_into()`][Self::serialize_into].
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        bytemuck::cast_slice(self.as_slice()).to_vec()
    }

    /// Replaces the content with items read from raw bytes.
    ///
    /// The length becomes `bytes.len() / size_of::<T>()`; a trailing partial item is ignored.
    /// The input does not need to be aligned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailed`] if the memory cannot be obtained.
    pub fn deserialize(&mut self, bytes: &[u8]) -> Result<()> {
        let len = whole_items::<T>(bytes.len());
        self.allocate(len, 0)?;

        let target: &mut [u8] = bytemuck::cast_slice_mut(self.as_mut_slice());
        let source = bytes
            .get(..target.len())
            .expect("item count was derived from the byte length");
        target.copy_from_slice(source);

        Ok(())
    }
}

impl<T: Pod> Default for PodArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Pod + fmt::Debug> fmt::Debug for PodArray<T> {
    #[cfg_attr(test, mutants::skip)] // No API contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PodArray")
            .field("len", &self.len)
            .field("capacity", &self.capacity())
            .field("items", &self.as_slice())
            .finish()
    }
}

impl<T: Pod> Index<usize> for PodArray<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        let len = self.len;
        self.get(index)
            .unwrap_or_else(|| panic!("index {index} out of bounds in PodArray of length {len}"))
    }
}

impl<T: Pod> IndexMut<usize> for PodArray<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        let len = self.len;
        self.get_mut(index)
            .unwrap_or_else(|| panic!("index {index} out of bounds in PodArray of length {len}"))
    }
}

impl<T: Pod> RandomAccess for PodArray<T> {
    type Item = T;

    fn len(&self) -> usize {
        self.len
    }

    fn at(&self, index: usize) -> &T {
        &self[index]
    }

    fn at_mut(&mut self, index: usize) -> &mut T {
        &mut self[index]
    }

    fn swap_items(&mut self, a: usize, b: usize) {
        self.as_mut_slice().swap(a, b);
    }
}
