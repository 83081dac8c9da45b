use std::alloc::{Layout, alloc_zeroed, dealloc};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::num::NonZero;
use std::ptr::NonNull;
use std::slice;

use bytemuck::Pod;
use tracing::{debug, trace};

use crate::table::reserve_table_slot;
use crate::{Error, PodAllocatorBuilder, Result};

/// A pooled bump allocator for plain-old-data, handing out byte spans carved from large blocks.
///
/// Memory is obtained from the system allocator in blocks of a configured size and handed out
/// by advancing a cursor through the current block. There is no per-allocation bookkeeping:
/// allocations are never released individually, only all at once via [`reset()`][1] or when the
/// allocator is dropped. This makes the allocator a good fit for caches and scratch data with
/// many small, similarly-lived allocations.
///
/// A request that does not fit in the rest of the current block causes a new block to be
/// acquired; the remainder of the old block is abandoned. A request larger than the block size
/// gets a dedicated block sized exactly for it (plus alignment slack).
///
/// Allocation takes `&self`, so many allocations can be alive at the same time. Releasing memory
/// takes `&mut self`, so the borrow checker guarantees no allocation outlives its block.
///
/// All handed out memory is zero-initialized.
///
/// # Thread safety
///
/// The allocator is thread-mobile ([`Send`]) but not thread-safe (not [`Sync`]).
///
/// # Example
///
/// ```
/// use pod_containers::PodAllocator;
///
/// let allocator = PodAllocator::new(4096);
///
/// let header = allocator.allocate(12, 4).unwrap();
/// let payload = allocator.allocate_slice::<u64>(8).unwrap();
///
/// header[0] = 1;
/// payload[7] = 42;
///
/// assert_eq!(header.as_ptr() as usize % 4, 0);
/// assert_eq!(allocator.block_count(), 1);
/// ```
///
/// [1]: Self::reset
pub struct PodAllocator {
    /// The last block is the one the cursor points into.
    blocks: RefCell<Vec<RawBlock>>,

    /// Number of bytes of the last block that have been handed out (including padding).
    used_in_current: Cell<usize>,

    block_size: NonZero<usize>,
    table_increment: NonZero<usize>,
}

impl PodAllocator {
    /// Block size used when none is specified, in bytes.
    pub const DEFAULT_BLOCK_SIZE: usize = 16384 - 16;

    /// Block table growth increment used when none is specified.
    pub const DEFAULT_TABLE_INCREMENT: usize = 256 - 8;

    /// Creates an allocator that acquires memory in blocks of `block_size` bytes.
    ///
    /// No memory is acquired until the first allocation.
    ///
    /// # Panics
    ///
    /// Panics if `block_size` is zero.
    #[must_use]
    pub fn new(block_size: usize) -> Self {
        Self::builder().block_size(block_size).build()
    }

    /// Starts building an allocator with a custom configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use pod_containers::PodAllocator;
    ///
    /// let allocator = PodAllocator::builder()
    ///     .block_size(64 * 1024)
    ///     .table_increment(16)
    ///     .build();
    ///
    /// assert_eq!(allocator.block_size(), 64 * 1024);
    /// ```
    pub fn builder() -> PodAllocatorBuilder {
        PodAllocatorBuilder::new()
    }

    #[must_use]
    pub(crate) fn new_inner(block_size: NonZero<usize>, table_increment: NonZero<usize>) -> Self {
        Self {
            blocks: RefCell::new(Vec::new()),
            used_in_current: Cell::new(0),
            block_size,
            table_increment,
        }
    }

    /// Allocates `size` zeroed bytes aligned to `alignment`.
    ///
    /// A zero-size request returns an empty slice without acquiring any memory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAlignment`] if `alignment` is not a power of two.
    /// Returns [`Error::AllocationFailed`] if a new block is needed and cannot be obtained.
    #[allow(
        clippy::mut_from_ref,
        reason = "every allocation is a distinct region that is never handed out twice"
    )]
    pub fn allocate(&self, size: usize, alignment: usize) -> Result<&mut [u8]> {
        if !alignment.is_power_of_two() {
            return Err(Error::InvalidAlignment { alignment });
        }

        if size == 0 {
            return Ok(&mut []);
        }

        let ptr = match self.carve(size, alignment) {
            Some(ptr) => ptr,
            None => {
                // The slack guarantees the request fits however the new block is aligned.
                let needed = size
                    .checked_add(alignment.wrapping_sub(1))
                    .ok_or(Error::AllocationFailed { bytes: usize::MAX })?;
                self.acquire_block(needed)?;

                self.carve(size, alignment)
                    .expect("a fresh block always fits the request plus alignment slack")
            }
        };

        // SAFETY: `carve()` returned a pointer to `size` bytes inside a block we own. The bytes
        // were zero-initialized when the block was allocated. The cursor has moved past them, so
        // no other allocation will ever overlap them. The block is only freed by `reset()` or
        // `drop()`, both of which require exclusive access and thus that this borrow has ended.
        Ok(unsafe { slice::from_raw_parts_mut(ptr.as_ptr(), size) })
    }

    /// Allocates `len` zeroed items of type `T`, correctly aligned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailed`] if a new block is needed and cannot be obtained.
    #[allow(
        clippy::mut_from_ref,
        reason = "every allocation is a distinct region that is never handed out twice"
    )]
    pub fn allocate_slice<T: Pod>(&self, len: usize) -> Result<&mut [T]> {
        let bytes = size_of::<T>()
            .checked_mul(len)
            .ok_or(Error::AllocationFailed { bytes: usize::MAX })?;

        if bytes == 0 {
            return Ok(&mut []);
        }

        let raw = self.allocate(bytes, align_of::<T>())?;
        Ok(bytemuck::cast_slice_mut(raw))
    }

    /// Allocates room for one `T`, initialized to `value`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailed`] if a new block is needed and cannot be obtained.
    ///
    /// # Panics
    ///
    /// Panics if `T` is zero-sized.
    #[allow(
        clippy::mut_from_ref,
        reason = "every allocation is a distinct region that is never handed out twice"
    )]
    pub fn allocate_value<T: Pod>(&self, value: T) -> Result<&mut T> {
        assert!(size_of::<T>() > 0, "cannot allocate a zero-sized value");

        let slots = self.allocate_slice::<T>(1)?;
        let slot = slots.first_mut().expect("we allocated exactly one item");
        *slot = value;
        Ok(slot)
    }

    /// Releases all blocks at once. Subsequent allocations start from scratch.
    pub fn reset(&mut self) {
        let blocks = self.blocks.get_mut();

        if !blocks.is_empty() {
            debug!(
                released_blocks = blocks.len(),
                released_bytes = blocks.iter().map(RawBlock::size).sum::<usize>(),
                "resetting PodAllocator"
            );
        }

        *blocks = Vec::new();
        self.used_in_current.set(0);
    }

    /// The size of a regular block, in bytes.
    #[must_use]
    pub fn block_size(&self) -> usize {
        self.block_size.get()
    }

    /// The number of entries the block table grows by when it is full.
    #[must_use]
    pub fn table_increment(&self) -> usize {
        self.table_increment.get()
    }

    /// The number of blocks currently owned.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks.borrow().len()
    }

    /// The number of blocks the block table can track before it needs to grow.
    #[must_use]
    pub fn table_capacity(&self) -> usize {
        self.blocks.borrow().capacity()
    }

    /// The total size of all owned blocks, in bytes.
    #[must_use]
    pub fn allocated_bytes(&self) -> usize {
        self.blocks.borrow().iter().map(RawBlock::size).sum()
    }

    /// The number of bytes left in the current block, ignoring alignment.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.blocks
            .borrow()
            .last()
            .map_or(0, |block| block.size().saturating_sub(self.used_in_current.get()))
    }

    /// Advances the cursor of the current block past an aligned region of `size` bytes and
    /// returns its start, or returns `None` if the current block cannot fit it.
    fn carve(&self, size: usize, alignment: usize) -> Option<NonNull<u8>> {
        let blocks = self.blocks.borrow();
        let block = blocks.last()?;

        let used = self.used_in_current.get();

        // We align the actual address, not the offset, as blocks are only byte-aligned.
        let cursor_addr = block.ptr.addr().get().wrapping_add(used);
        let padding = cursor_addr.wrapping_neg() & alignment.wrapping_sub(1);

        let start = used.checked_add(padding)?;
        let end = start.checked_add(size)?;
        if end > block.size() {
            return None;
        }

        self.used_in_current.set(end);

        // SAFETY: `start < end <= block.size()`, so the result stays inside the block.
        Some(unsafe { block.ptr.add(start) })
    }

    /// Acquires a new block that fits at least `min_size` bytes and makes it current.
    fn acquire_block(&self, min_size: usize) -> Result<()> {
        let size = min_size.max(self.block_size.get());

        let mut blocks = self.blocks.borrow_mut();
        reserve_table_slot(&mut blocks, self.table_increment)?;

        let block = RawBlock::new(size)?;
        blocks.push(block);
        self.used_in_current.set(0);

        trace!(
            block_index = blocks.len().wrapping_sub(1),
            size,
            dedicated = size > self.block_size.get(),
            "acquired PodAllocator block"
        );

        Ok(())
    }
}

impl fmt::Debug for PodAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PodAllocator")
            .field("block_size", &self.block_size)
            .field("table_increment", &self.table_increment)
            .field("block_count", &self.block_count())
            .field("allocated_bytes", &self.allocated_bytes())
            .field("remaining", &self.remaining())
            .finish()
    }
}

/// One zero-initialized, byte-aligned heap block, freed on drop.
struct RawBlock {
    ptr: NonNull<u8>,
    layout: Layout,
}

impl RawBlock {
    fn new(size: usize) -> Result<Self> {
        let layout =
            Layout::from_size_align(size, 1).map_err(|_overflow| Error::AllocationFailed {
                bytes: size,
            })?;

        // SAFETY: The layout is not zero-sized because callers always request at least the
        // non-zero block size.
        let ptr = unsafe { alloc_zeroed(layout) };

        let ptr = NonNull::new(ptr).ok_or(Error::AllocationFailed { bytes: size })?;

        Ok(Self { ptr, layout })
    }

    fn size(&self) -> usize {
        self.layout.size()
    }
}

impl Drop for RawBlock {
    fn drop(&mut self) {
        // SAFETY: The pointer was allocated in `new()` with exactly this layout and is freed
        // only here, once.
        unsafe {
            dealloc(self.ptr.as_ptr(), self.layout);
        }
    }
}

// SAFETY: A block is plain heap memory exclusively owned by its allocator. Nothing about it is
// tied to the thread that allocated it.
unsafe impl Send for RawBlock {}
