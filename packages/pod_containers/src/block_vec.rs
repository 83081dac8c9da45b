use std::fmt;
use std::num::NonZero;
use std::ops::{Index, IndexMut};

use bytemuck::Pod;
use tracing::{debug, trace};

use crate::table::{reserve_table_slot, whole_items, zeroed_block};
use crate::{BlockVecBuilder, Error, RandomAccess, Result};

/// A growable sequence of plain-old-data items stored in fixed-size blocks, guaranteeing that
/// items never move in memory once written.
///
/// The sequence is assembled from blocks of `1 << SHIFT` items. Index `i` lives in block
/// `i >> SHIFT` at offset `i & (BLOCK_SIZE - 1)`. Growth only ever appends new blocks; an
/// allocated block is never reallocated. The table that tracks the blocks is itself a growable
/// array, but reallocating it moves block handles, not item data.
///
/// This makes the sequence suitable for incrementally built datasets (e.g. vertex storage for
/// geometry) where pointers into earlier items must stay valid while more items are added.
///
/// # Growth of the block table
///
/// The block table grows by a fixed increment, by default equal to [`BLOCK_SIZE`][1]. Use
/// [`builder()`][2] to choose a different increment.
///
/// # Contiguous runs
///
/// Items are only contiguous within a block. [`allocate_contiguous_run()`][3] reserves a run of
/// items that is guaranteed to lie within one block, so the caller can treat it as a slice.
///
/// # Example
///
/// ```
/// use pod_containers::BlockVec;
///
/// let mut points = BlockVec::<[f32; 2], 4>::new();
/// points.add([0.0, 0.0]).unwrap();
/// points.add([1.0, 0.0]).unwrap();
/// points.add([1.0, 1.0]).unwrap();
///
/// // Closed-contour access wraps around.
/// assert_eq!(points.next(2), Some(&[0.0, 0.0]));
/// assert_eq!(points.prev(0), Some(&[1.0, 1.0]));
/// ```
///
/// [1]: Self::BLOCK_SIZE
/// [2]: Self::builder
/// [3]: Self::allocate_contiguous_run
pub struct BlockVec<T, const SHIFT: u32 = 6> {
    /// Every block holds exactly `BLOCK_SIZE` items. Blocks beyond the one containing the last
    /// item may exist if the sequence was truncated without releasing memory.
    blocks: Vec<Box<[T]>>,

    len: usize,

    table_increment: NonZero<usize>,
}

impl<T: Pod, const SHIFT: u32> BlockVec<T, SHIFT> {
    /// Number of bits of an index that address an item within a block.
    pub const BLOCK_SHIFT: u32 = SHIFT;

    /// Number of items in one block.
    pub const BLOCK_SIZE: usize = {
        assert!(SHIFT <= 24, "BlockVec block shift must be at most 24");
        1 << SHIFT
    };

    /// Mask that extracts the offset within a block from an index.
    pub const BLOCK_MASK: usize = Self::BLOCK_SIZE - 1;

    /// Creates an empty sequence with the default configuration.
    ///
    /// No memory is allocated until the first item is added.
    ///
    /// # Panics
    ///
    /// Panics if `T` is zero-sized.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts building a sequence with a custom configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use pod_containers::BlockVec;
    ///
    /// let sequence = BlockVec::<u32, 8>::builder().table_increment(4).build();
    /// assert_eq!(sequence.table_increment(), 4);
    /// ```
    pub fn builder() -> BlockVecBuilder<T, SHIFT> {
        BlockVecBuilder::new()
    }

    #[must_use]
    pub(crate) fn new_inner(table_increment: Option<NonZero<usize>>) -> Self {
        assert!(size_of::<T>() > 0, "BlockVec must have non-zero item size");

        let table_increment = table_increment.unwrap_or(
            NonZero::new(Self::BLOCK_SIZE).expect("block size is a power of two, never zero"),
        );

        Self {
            blocks: Vec::new(),
            len: 0,
            table_increment,
        }
    }

    /// The number of items in the sequence.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the sequence holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The number of blocks currently allocated.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// The number of blocks the block table can track before it needs to grow.
    #[must_use]
    pub fn table_capacity(&self) -> usize {
        self.blocks.capacity()
    }

    /// The number of entries the block table grows by when it is full.
    #[must_use]
    pub fn table_increment(&self) -> usize {
        self.table_increment.get()
    }

    /// Splits an index into its block index and the offset within that block.
    #[must_use]
    pub const fn locate(index: usize) -> (usize, usize) {
        (index >> SHIFT, index & Self::BLOCK_MASK)
    }

    /// Appends an item, allocating a new block first if the last block is full.
    ///
    /// Previously added items are never moved.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailed`] if a new block or a larger block table cannot be
    /// allocated. The sequence is unchanged in that case.
    pub fn add(&mut self, value: T) -> Result<()> {
        *self.tail_slot()? = value;
        self.len = self.len.wrapping_add(1);
        Ok(())
    }

    /// Appends all items from a slice.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailed`] if memory runs out. Items appended before the
    /// failure remain in the sequence.
    pub fn extend_from_slice(&mut self, values: &[T]) -> Result<()> {
        values.iter().try_for_each(|&value| self.add(value))
    }

    /// Appends all items produced by an iterator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailed`] if memory runs out. Items appended before the
    /// failure remain in the sequence.
    pub fn add_iter(&mut self, values: impl IntoIterator<Item = T>) -> Result<()> {
        values.into_iter().try_for_each(|value| self.add(value))
    }

    /// Removes the last item, if any. Memory is retained.
    pub fn remove_last(&mut self) {
        self.len = self.len.saturating_sub(1);
    }

    /// Replaces the last item, or appends the item if the sequence is empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailed`] if the sequence was empty and memory runs out.
    pub fn modify_last(&mut self, value: T) -> Result<()> {
        self.remove_last();
        self.add(value)
    }

    /// Reserves `count` consecutive items that are guaranteed to lie within a single block,
    /// returning the index of the first one.
    ///
    /// If the last block does not have `count` free items left, its remainder is skipped: those
    /// items become part of the sequence with unspecified values, and the run starts at the
    /// beginning of the next block. The reserved items have unspecified values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RunExceedsBlock`] if `count` is not less than [`BLOCK_SIZE`][1], as
    /// such a run can never fit in one block. Returns [`Error::AllocationFailed`] if a new
    /// block cannot be allocated. The sequence is unchanged in both cases.
    ///
    /// # Example
    ///
    /// ```
    /// use pod_containers::BlockVec;
    ///
    /// let mut sequence = BlockVec::<u16, 3>::new();
    /// sequence.extend_from_slice(&[1, 2, 3, 4, 5, 6]).unwrap();
    ///
    /// // Only 2 items are left in the first block of 8, so the run starts in the second block.
    /// let start = sequence.allocate_contiguous_run(3).unwrap();
    /// assert_eq!(start, 8);
    /// assert_eq!(sequence.len(), 11);
    /// ```
    ///
    /// [1]: Self::BLOCK_SIZE
    pub fn allocate_contiguous_run(&mut self, count: usize) -> Result<usize> {
        if count >= Self::BLOCK_SIZE {
            return Err(Error::RunExceedsBlock {
                requested: count,
                block_size: Self::BLOCK_SIZE,
            });
        }

        let (_, offset) = Self::locate(self.len);
        let rest = Self::BLOCK_SIZE.wrapping_sub(offset);

        let start = if count <= rest {
            self.len
        } else {
            trace!(skipped = rest, "contiguous run skips to the next block");
            self.len.checked_add(rest).ok_or(Error::AllocationFailed {
                bytes: size_of::<T>(),
            })?
        };

        self.ensure_block_for(start)?;

        // Cannot overflow: start is at most one block past len and count is less than a block.
        self.len = start.wrapping_add(count);
        Ok(start)
    }

    /// Returns `count` items starting at `start` as one slice, or `None` if the range is not
    /// within the length or does not lie within a single block.
    ///
    /// Runs reserved by [`allocate_contiguous_run()`][Self::allocate_contiguous_run] always
    /// satisfy these conditions.
    #[must_use]
    pub fn run_mut(&mut self, start: usize, count: usize) -> Option<&mut [T]> {
        let end = start.checked_add(count)?;
        if end > self.len {
            return None;
        }

        let (block, offset) = Self::locate(start);
        self.blocks.get_mut(block)?.get_mut(offset..offset.checked_add(count)?)
    }

    /// Truncates the sequence to `len` items and releases every block that is no longer needed
    /// to hold them.
    ///
    /// Has no effect if the sequence is not longer than `len`.
    pub fn free_tail(&mut self, len: usize) {
        if len >= self.len {
            return;
        }

        let keep = len.div_ceil(Self::BLOCK_SIZE);
        if self.blocks.len() > keep {
            debug!(
                released = self.blocks.len().wrapping_sub(keep),
                retained = keep,
                "releasing BlockVec blocks"
            );

            self.blocks.truncate(keep);
        }

        self.len = len;
    }

    /// Removes all items and releases all memory, including the block table.
    pub fn free_all(&mut self) {
        if !self.blocks.is_empty() {
            debug!(released = self.blocks.len(), "releasing all BlockVec blocks");
        }

        self.blocks = Vec::new();
        self.len = 0;
    }

    /// Removes all items, retaining the allocated blocks for reuse.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Shortens the sequence to `len` items, retaining the allocated blocks. Has no effect if
    /// the sequence is already shorter.
    pub fn truncate(&mut self, len: usize) {
        self.len = self.len.min(len);
    }

    /// Returns the item at `index`, or `None` if it is out of range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len {
            return None;
        }

        let (block, offset) = Self::locate(index);
        self.blocks.get(block)?.get(offset)
    }

    /// Returns the item at `index` for modification, or `None` if it is out of range.
    #[must_use]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index >= self.len {
            return None;
        }

        let (block, offset) = Self::locate(index);
        self.blocks.get_mut(block)?.get_mut(offset)
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

    /// Returns the item at `index`, for symmetry with [`prev()`][1] and [`next()`][2].
    ///
    /// [1]: Self::prev
    /// [2]: Self::next
    #[must_use]
    pub fn curr(&self, index: usize) -> Option<&T> {
        self.get(index)
    }

    /// Returns the item before `index`, treating the sequence as a ring: the item before the
    /// first is the last.
    ///
    /// Returns `None` if the sequence is empty.
    #[must_use]
    pub fn prev(&self, index: usize) -> Option<&T> {
        let len = self.len;
        let position = index.checked_rem(len)?;

        // Equivalent to (index + len - 1) % len without overflow.
        let previous = position.checked_sub(1).unwrap_or(len.wrapping_sub(1));
        self.get(previous)
    }

    /// Returns the item after `index`, treating the sequence as a ring: the item after the last
    /// is the first.
    ///
    /// Returns `None` if the sequence is empty.
    #[must_use]
    pub fn next(&self, index: usize) -> Option<&T> {
        let len = self.len;
        let position = index.checked_rem(len)?;

        // position < len so the increment cannot overflow.
        self.get(position.wrapping_add(1).checked_rem(len)?)
    }

    /// Returns the last item, or `None` if the sequence is empty.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.get(self.len.checked_sub(1)?)
    }

    /// Returns the last item for modification, or `None` if the sequence is empty.
    #[must_use]
    pub fn last_mut(&mut self) -> Option<&mut T> {
        self.get_mut(self.len.checked_sub(1)?)
    }

    /// Returns the whole block with index `block`, including items beyond the length of the
    /// sequence (whose values are unspecified), or `None` if no such block is allocated.
    #[must_use]
    pub fn block(&self, block: usize) -> Option<&[T]> {
        self.blocks.get(block).map(|block| &**block)
    }

    /// Iterates over the items in index order.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.blocks.iter().flat_map(|block| block.iter()).take(self.len)
    }

    /// The number of bytes produced by [`serialize_into()`][Self::serialize_into].
    #[must_use]
    pub fn byte_size(&self) -> usize {
        self.len.saturating_mul(size_of::<T>())
    }

    /// Writes the raw bytes of all items in index order into `target`, returning the number of
    /// bytes written.
    ///
    /// The output is the plain concatenation of the item byte representations, without any
    /// header or padding, exactly as for a contiguous array of the same items.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferTooSmall`] if `target` is shorter than
    /// [`byte_size()`][Self::byte_size].
    pub fn serialize_into(&self, target: &mut [u8]) -> Result<usize> {
        let required = self.byte_size();
        let available = target.len();

        let mut target = target
            .get_mut(..required)
            .ok_or(Error::BufferTooSmall {
                required,
                available,
            })?;

        for items in self.filled_blocks() {
            let bytes: &[u8] = bytemuck::cast_slice(items);
            let (head, tail) = target.split_at_mut(bytes.len());
            head.copy_from_slice(bytes);
            target = tail;
        }

        Ok(required)
    }

    /// Returns the raw bytes of all items, as written by
    /// [`serialize_into()`][Self::serialize_into].
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.byte_size());

        for items in self.filled_blocks() {
            bytes.extend_from_slice(bytemuck::cast_slice(items));
        }

        bytes
    }

    /// Replaces the content with items read from raw bytes.
    ///
    /// Already allocated blocks are reused. The length becomes `bytes.len() / size_of::<T>()`;
    /// a trailing partial item is ignored. The input does not need to be aligned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailed`] if memory runs out. The items decoded before the
    /// failure remain in the sequence.
    pub fn deserialize(&mut self, bytes: &[u8]) -> Result<()> {
        self.clear();
        self.deserialize_at(0, T::zeroed(), bytes)
    }

    /// Writes items read from raw bytes starting at index `start`, replacing existing items and
    /// appending the rest.
    ///
    /// If the sequence is shorter than `start`, it is first padded up to `start` with copies
    /// of `fill`. This supports reconstructing a sequence out of order or with gaps. A trailing
    /// partial item in `bytes` is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailed`] if memory runs out. Items written before the failure
    /// remain in the sequence.
    ///
    /// # Example
    ///
    /// ```
    /// use pod_containers::BlockVec;
    ///
    /// let mut sequence = BlockVec::<u8, 2>::new();
    /// sequence.deserialize_at(2, 0xFF, &[7, 8]).unwrap();
    /// sequence.deserialize_at(1, 0xFF, &[5]).unwrap();
    ///
    /// assert_eq!(sequence.to_bytes(), vec![0xFF, 5, 7, 8]);
    /// ```
    pub fn deserialize_at(&mut self, start: usize, fill: T, bytes: &[u8]) -> Result<()> {
        while self.len < start {
            self.add(fill)?;
        }

        let count = whole_items::<T>(bytes.len());
        trace!(start, count, "deserializing into BlockVec");

        for (index, chunk) in (start..).zip(bytes.chunks_exact(size_of::<T>())) {
            if index >= self.len {
                // Items are written in order, so this is always the slot right after the end.
                self.ensure_block_for(self.len)?;
                self.len = self.len.wrapping_add(1);
            }

            let slot = self
                .get_mut(index)
                .expect("index is within the length after the append above");
            bytemuck::bytes_of_mut(slot).copy_from_slice(chunk);
        }

        Ok(())
    }

    /// The first `len` items, one slice per block.
    fn filled_blocks(&self) -> impl Iterator<Item = &[T]> + '_ {
        let mut remaining = self.len;

        self.blocks.iter().map_while(move |block| {
            if remaining == 0 {
                return None;
            }

            let count = remaining.min(Self::BLOCK_SIZE);
            remaining = remaining.wrapping_sub(count);
            block.get(..count)
        })
    }

    /// Returns the storage slot at index `len`, allocating a block for it if needed.
    /// The caller decides whether to count the slot as part of the sequence.
    fn tail_slot(&mut self) -> Result<&mut T> {
        self.ensure_block_for(self.len)?;

        let (block, offset) = Self::locate(self.len);
        Ok(self
            .blocks
            .get_mut(block)
            .and_then(|block| block.get_mut(offset))
            .expect("block was ensured above and offset is masked to the block size"))
    }

    /// Allocates blocks until the block holding `index` exists.
    fn ensure_block_for(&mut self, index: usize) -> Result<()> {
        let (needed, _) = Self::locate(index);

        while self.blocks.len() <= needed {
            reserve_table_slot(&mut self.blocks, self.table_increment)?;

            let block = zeroed_block::<T>(Self::BLOCK_SIZE)?;
            self.blocks.push(block);

            trace!(
                block_index = self.blocks.len().wrapping_sub(1),
                block_size = Self::BLOCK_SIZE,
                "allocated BlockVec block"
            );
        }

        Ok(())
    }
}

impl<T: Pod, const SHIFT: u32> Default for BlockVec<T, SHIFT> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Pod, const SHIFT: u32> Clone for BlockVec<T, SHIFT> {
    /// Deep-copies every allocated block. The copy has a block table of the same capacity.
    fn clone(&self) -> Self {
        let mut blocks = Vec::with_capacity(self.blocks.capacity());
        blocks.extend(self.blocks.iter().cloned());

        Self {
            blocks,
            len: self.len,
            table_increment: self.table_increment,
        }
    }
}

impl<T: Pod + fmt::Debug, const SHIFT: u32> fmt::Debug for BlockVec<T, SHIFT> {
    #[cfg_attr(test, mutants::skip)] // No API contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockVec")
            .field("len", &self.len)
            .field("block_size", &Self::BLOCK_SIZE)
            .field("block_count", &self.blocks.len())
            .field("table_increment", &self.table_increment)
            .field("items", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

impl<T: Pod, const SHIFT: u32> Index<usize> for BlockVec<T, SHIFT> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        let len = self.len;
        self.get(index)
            .unwrap_or_else(|| panic!("index {index} out of bounds in BlockVec of length {len}"))
    }
}

impl<T: Pod, const SHIFT: u32> IndexMut<usize> for BlockVec<T, SHIFT> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        let len = self.len;
        self.get_mut(index)
            .unwrap_or_else(|| panic!("index {index} out of bounds in BlockVec of length {len}"))
    }
}

impl<T: Pod, const SHIFT: u32> RandomAccess for BlockVec<T, SHIFT> {
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
}
