//! Light fixed-size containers that plug caller memory or fixed arrays into the generic
//! algorithms of this crate via [`RandomAccess`].

use std::ops::{Index, IndexMut};

use bytemuck::Pod;

use crate::table::zeroed_block;
use crate::{Error, RandomAccess, Result};

/// A borrowed view over caller-owned items, exposing a chosen number of them.
///
/// Useful when the data lives in memory the caller manages (e.g. a mapped buffer) and only a
/// prefix of it holds meaningful items.
///
/// # Example
///
/// ```
/// use pod_containers::{PodArrayAdaptor, quick_sort};
///
/// let mut storage = [9, 4, 7, 0, 0];
/// let mut used = PodArrayAdaptor::new(&mut storage, 3).unwrap();
/// quick_sort(&mut used, |a, b| a < b);
///
/// assert_eq!(storage, [4, 7, 9, 0, 0]);
/// ```
#[derive(Debug)]
pub struct PodArrayAdaptor<'a, T> {
    items: &'a mut [T],
}

impl<'a, T: Pod> PodArrayAdaptor<'a, T> {
    /// Exposes the first `len` items of `storage`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] if `storage` holds fewer than `len` items.
    pub fn new(storage: &'a mut [T], len: usize) -> Result<Self> {
        let available = storage.len();
        let items = storage.get_mut(..len).ok_or(Error::IndexOutOfBounds {
            index: len,
            len: available,
        })?;

        Ok(Self { items })
    }

    /// The number of exposed items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if no items are exposed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns a copy of the item at `index`, or `None` if it is out of range.
    #[must_use]
    pub fn value_at(&self, index: usize) -> Option<T> {
        self.items.get(index).copied()
    }
}

impl<T: Pod> RandomAccess for PodArrayAdaptor<'_, T> {
    type Item = T;

    fn len(&self) -> usize {
        self.items.len()
    }

    fn at(&self, index: usize) -> &T {
        self.items.at(index)
    }

    fn at_mut(&mut self, index: usize) -> &mut T {
        self.items.at_mut(index)
    }

    fn swap_items(&mut self, a: usize, b: usize) {
        self.items.swap(a, b);
    }
}

/// A fixed-size array of `N` items stored inline.
///
/// # Example
///
/// ```
/// use pod_containers::PodAutoArray;
///
/// let corners = PodAutoArray::<f64, 4>::from_slice(&[0.0, 1.0, 1.0, 0.0]).unwrap();
/// assert_eq!(corners[1], 1.0);
/// assert_eq!(PodAutoArray::<f64, 4>::len(), 4);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PodAutoArray<T, const N: usize> {
    items: [T; N],
}

impl<T: Pod, const N: usize> PodAutoArray<T, N> {
    /// Creates an array with every item set to its all-zero bit pattern.
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: [T::zeroed(); N],
        }
    }

    /// Creates an array by copying exactly `N` items from `source`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LengthMismatch`] if `source` does not hold exactly `N` items.
    pub fn from_slice(source: &[T]) -> Result<Self> {
        let items = <[T; N]>::try_from(source).map_err(|_mismatch| Error::LengthMismatch {
            expected: N,
            actual: source.len(),
        })?;

        Ok(Self { items })
    }

    /// Overwrites all items by copying exactly `N` items from `source`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LengthMismatch`] if `source` does not hold exactly `N` items.
    pub fn copy_from(&mut self, source: &[T]) -> Result<()> {
        *self = Self::from_slice(source)?;
        Ok(())
    }

    /// The number of items, which is always `N`.
    #[must_use]
    pub const fn len() -> usize {
        N
    }

    /// The items as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// The items as a mutable slice.
    #[must_use]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.items
    }
}

impl<T: Pod, const N: usize> Default for PodAutoArray<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Pod, const N: usize> Index<usize> for PodAutoArray<T, N> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        self.items.at(index)
    }
}

impl<T: Pod, const N: usize> IndexMut<usize> for PodAutoArray<T, N> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        self.items.at_mut(index)
    }
}

impl<T: Pod, const N: usize> RandomAccess for PodAutoArray<T, N> {
    type Item = T;

    fn len(&self) -> usize {
        N
    }

    fn at(&self, index: usize) -> &T {
        self.items.at(index)
    }

    fn at_mut(&mut self, index: usize) -> &mut T {
        self.items.at_mut(index)
    }
}

/// A heap-allocated array whose size is fixed until explicitly changed.
///
/// Resizing discards the content; use [`PodArray`][crate::PodArray] when content must survive
/// growth.
#[derive(Clone, Debug)]
pub struct PodHeapArray<T> {
    items: Box<[T]>,
}

impl<T: Pod> PodHeapArray<T> {
    /// Creates an array of `len` zeroed items.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailed`] if the memory cannot be obtained.
    pub fn new(len: usize) -> Result<Self> {
        Ok(Self {
            items: zeroed_block(len)?,
        })
    }

    /// Replaces the content with `len` zeroed items.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailed`] if the memory cannot be obtained. The array keeps
    /// its previous content in that case.
    pub fn resize(&mut self, len: usize) -> Result<()> {
        self.items = zeroed_block(len)?;
        Ok(())
    }

    /// The number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the array holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The items as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// The items as a mutable slice.
    #[must_use]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.items
    }
}

impl<T: Pod> Index<usize> for PodHeapArray<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        self.items.at(index)
    }
}

impl<T: Pod> IndexMut<usize> for PodHeapArray<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        self.items.at_mut(index)
    }
}

impl<T: Pod> RandomAccess for PodHeapArray<T> {
    type Item = T;

    fn len(&self) -> usize {
        self.items.len()
    }

    fn at(&self, index: usize) -> &T {
        self.items.at(index)
    }

    fn at_mut(&mut self, index: usize) -> &mut T {
        self.items.at_mut(index)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    #![allow(
        clippy::indexing_slicing,
        reason = "we do not need to worry about these things when writing test code"
    )]

    use super::*;

    #[test]
    fn adaptor_exposes_prefix() {
        let mut storage = [1_u32, 2, 3, 4];
        let mut adaptor = PodArrayAdaptor::new(&mut storage, 2).unwrap();

        assert_eq!(adaptor.len(), 2);
        assert_eq!(adaptor.value_at(1), Some(2));
        assert_eq!(adaptor.value_at(2), None);

        adaptor.set_item(0, 10);
        assert_eq!(storage, [10, 2, 3, 4]);
    }

    #[test]
    fn adaptor_rejects_oversized_len() {
        let mut storage = [1_u32, 2];
        let result = PodArrayAdaptor::new(&mut storage, 3);

        assert!(matches!(
            result,
            Err(Error::IndexOutOfBounds { index: 3, len: 2 })
        ));
    }

    #[test]
    fn auto_array_from_slice() {
        let array = PodAutoArray::<u8, 3>::from_slice(&[1, 2, 3]).unwrap();
        assert_eq!(array.as_slice(), &[1, 2, 3]);

        let mismatch = PodAutoArray::<u8, 3>::from_slice(&[1, 2]);
        assert_eq!(
            mismatch,
            Err(Error::LengthMismatch {
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn auto_array_defaults_to_zero() {
        let mut array = PodAutoArray::<i16, 2>::default();
        assert_eq!(array.as_slice(), &[0, 0]);

        array.copy_from(&[5, 6]).unwrap();
        array[0] = 7;
        assert_eq!(array.as_slice(), &[7, 6]);
        assert_eq!(RandomAccess::len(&array), 2);
    }

    #[test]
    fn heap_array_resize_discards_content() {
        let mut array = PodHeapArray::<u64>::new(2).unwrap();
        array[1] = 9;

        array.resize(4).unwrap();

        assert_eq!(array.len(), 4);
        assert_eq!(array.as_slice(), &[0, 0, 0, 0]);
    }

    #[test]
    fn heap_array_clone_is_deep() {
        let mut array = PodHeapArray::<u64>::new(1).unwrap();
        array[0] = 1;

        let mut copy = array.clone();
        copy[0] = 2;

        assert_eq!(array[0], 1);
        assert_eq!(copy[0], 2);
    }
}
