/// An indexable container with a logical length, the only capability required by
/// [`quick_sort()`][crate::quick_sort] and [`remove_duplicates()`][crate::remove_duplicates].
///
/// Implemented for slices, `Vec` and every container in this crate, so the algorithms work the
/// same way over contiguous and block-structured storage.
///
/// # Example
///
/// ```
/// use pod_containers::{BlockVec, RandomAccess};
///
/// let mut points = BlockVec::<u32, 2>::new();
/// points.extend_from_slice(&[3, 1, 2]).unwrap();
///
/// points.swap_items(0, 1);
/// assert_eq!(*points.at(0), 1);
/// assert_eq!(RandomAccess::len(&points), 3);
/// ```
pub trait RandomAccess {
    /// The type of the items in the container.
    type Item: Copy;

    /// The logical number of items in the container.
    fn len(&self) -> usize;

    /// Returns `true` if the container holds no items.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a shared reference to the item at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not less than [`len()`][Self::len].
    fn at(&self, index: usize) -> &Self::Item;

    /// Returns an exclusive reference to the item at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not less than [`len()`][Self::len].
    fn at_mut(&mut self, index: usize) -> &mut Self::Item;

    /// Overwrites the item at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not less than [`len()`][Self::len].
    fn set_item(&mut self, index: usize, value: Self::Item) {
        *self.at_mut(index) = value;
    }

    /// Exchanges the items at indexes `a` and `b`.
    ///
    /// # Panics
    ///
    /// Panics if either index is not less than [`len()`][Self::len].
    fn swap_items(&mut self, a: usize, b: usize) {
        let first = *self.at(a);
        let second = *self.at(b);
        self.set_item(a, second);
        self.set_item(b, first);
    }
}

impl<T: Copy> RandomAccess for [T] {
    type Item = T;

    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    #[expect(clippy::indexing_slicing, reason = "panicking on out of range is the contract")]
    fn at(&self, index: usize) -> &T {
        &self[index]
    }

    #[expect(clippy::indexing_slicing, reason = "panicking on out of range is the contract")]
    fn at_mut(&mut self, index: usize) -> &mut T {
        &mut self[index]
    }

    fn swap_items(&mut self, a: usize, b: usize) {
        self.swap(a, b);
    }
}

impl<T: Copy> RandomAccess for Vec<T> {
    type Item = T;

    fn len(&self) -> usize {
        Self::len(self)
    }

    fn at(&self, index: usize) -> &T {
        self.as_slice().at(index)
    }

    fn at_mut(&mut self, index: usize) -> &mut T {
        self.as_mut_slice().at_mut(index)
    }

    fn swap_items(&mut self, a: usize, b: usize) {
        self.swap(a, b);
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn slice_access() {
        let mut values = [1, 2, 3];
        let slice: &mut [i32] = &mut values;

        assert_eq!(<[i32] as RandomAccess>::len(slice), 3);
        assert!(!<[i32] as RandomAccess>::is_empty(slice));

        slice.set_item(1, 20);
        slice.swap_items(0, 2);

        assert_eq!(values, [3, 20, 1]);
    }

    #[test]
    fn vec_access() {
        let mut values = vec![5_u8, 6];
        values.swap_items(0, 1);
        *values.at_mut(0) += 1;

        assert_eq!(values, vec![7, 5]);
    }

    #[test]
    #[should_panic]
    fn out_of_range_panics() {
        let values = vec![1_u16];
        _ = values.at(1);
    }
}
