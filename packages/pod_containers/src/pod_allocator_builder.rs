use std::num::NonZero;

use crate::PodAllocator;

/// Builder for creating an instance of [`PodAllocator`].
///
/// # Examples
///
/// ```
/// use pod_containers::PodAllocator;
///
/// let allocator = PodAllocator::builder().block_size(1024).build();
/// assert_eq!(allocator.block_size(), 1024);
/// assert_eq!(
///     allocator.table_increment(),
///     PodAllocator::DEFAULT_TABLE_INCREMENT
/// );
/// ```
#[derive(Debug)]
#[must_use]
pub struct PodAllocatorBuilder {
    block_size: NonZero<usize>,
    table_increment: NonZero<usize>,
}

impl PodAllocatorBuilder {
    pub(crate) fn new() -> Self {
        Self {
            block_size: NonZero::new(PodAllocator::DEFAULT_BLOCK_SIZE)
                .expect("default block size is non-zero"),
            table_increment: NonZero::new(PodAllocator::DEFAULT_TABLE_INCREMENT)
                .expect("default table increment is non-zero"),
        }
    }

    /// Sets the size of a regular block, in bytes.
    ///
    /// Requests larger than this get a dedicated block of their own.
    ///
    /// # Panics
    ///
    /// Panics if `block_size` is zero.
    pub fn block_size(mut self, block_size: usize) -> Self {
        self.block_size =
            NonZero::new(block_size).expect("PodAllocator block size must be non-zero");
        self
    }

    /// Sets how many entries the block table grows by whenever it is full.
    ///
    /// # Panics
    ///
    /// Panics if `increment` is zero.
    pub fn table_increment(mut self, increment: usize) -> Self {
        self.table_increment =
            NonZero::new(increment).expect("PodAllocator table increment must be non-zero");
        self
    }

    /// Builds the allocator with the specified configuration.
    #[must_use]
    pub fn build(self) -> PodAllocator {
        PodAllocator::new_inner(self.block_size, self.table_increment)
    }
}
