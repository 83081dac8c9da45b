use std::fmt;
use std::marker::PhantomData;
use std::num::NonZero;

use bytemuck::Pod;

use crate::BlockVec;

/// Builder for creating an instance of [`BlockVec`].
///
/// You only need to use this builder if you want to customize how the block table grows.
/// The default configuration used by [`BlockVec::new()`][1] grows the table by one block size
/// worth of entries at a time.
///
/// # Examples
///
/// ```
/// use pod_containers::BlockVec;
///
/// let sequence = BlockVec::<u32, 4>::builder().table_increment(256).build();
/// assert_eq!(sequence.table_increment(), 256);
/// ```
///
/// [1]: BlockVec::new
#[must_use]
pub struct BlockVecBuilder<T, const SHIFT: u32 = 6> {
    table_increment: Option<NonZero<usize>>,

    _item: PhantomData<T>,
}

impl<T, const SHIFT: u32> fmt::Debug for BlockVecBuilder<T, SHIFT> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockVecBuilder")
            .field(
                "item_type",
                &format_args!("{}", std::any::type_name::<T>()),
            )
            .field("shift", &SHIFT)
            .field("table_increment", &self.table_increment)
            .finish()
    }
}

impl<T: Pod, const SHIFT: u32> BlockVecBuilder<T, SHIFT> {
    pub(crate) fn new() -> Self {
        Self {
            table_increment: None,
            _item: PhantomData,
        }
    }

    /// Sets how many entries the block table grows by whenever it is full.
    ///
    /// Larger increments mean fewer reallocations of the table at the cost of some unused
    /// table entries. Reallocating the table never moves items.
    ///
    /// # Panics
    ///
    /// Panics if `increment` is zero.
    pub fn table_increment(mut self, increment: usize) -> Self {
        self.table_increment = Some(
            NonZero::new(increment).expect("BlockVec table increment must be non-zero"),
        );
        self
    }

    /// Builds the sequence with the specified configuration.
    ///
    /// # Panics
    ///
    /// Panics if `T` is zero-sized.
    #[must_use]
    pub fn build(self) -> BlockVec<T, SHIFT> {
        BlockVec::new_inner(self.table_increment)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn default_increment_is_block_size() {
        let sequence = BlockVec::<u8, 5>::builder().build();
        assert_eq!(sequence.table_increment(), 32);
    }

    #[test]
    fn custom_increment() {
        let sequence = BlockVec::<u8, 5>::builder().table_increment(7).build();
        assert_eq!(sequence.table_increment(), 7);
    }

    #[test]
    #[should_panic]
    fn zero_increment_panics() {
        _ = BlockVec::<u8, 5>::builder().table_increment(0);
    }

    #[test]
    fn debug_names_item_type() {
        let builder = BlockVec::<u16, 3>::builder();
        let text = format!("{builder:?}");

        assert!(text.contains("u16"));
        assert!(text.contains("shift: 3"));
    }
}
