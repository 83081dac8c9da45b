//! Memory acquisition shared by the block-based containers.
//!
//! Both [`BlockVec`][crate::BlockVec] and [`PodAllocator`][crate::PodAllocator] keep a table of
//! owned blocks. The table is the only thing that is ever reallocated as they grow: it holds
//! block handles, so moving it never moves the memory the blocks point to.

use std::collections::TryReserveError;
use std::num::NonZero;

use bytemuck::Pod;
use tracing::trace;

use crate::{Error, Result};

/// Makes room for at least one more entry in a block table, growing its capacity by exactly
/// `increment` entries when it is full.
///
/// Growing by a fixed increment (instead of the usual doubling) gives the owner control over
/// how often the table is reallocated.
pub(crate) fn reserve_table_slot<E>(table: &mut Vec<E>, increment: NonZero<usize>) -> Result<()> {
    if table.len() < table.capacity() {
        return Ok(());
    }

    let old_capacity = table.capacity();

    table
        .try_reserve_exact(increment.get())
        .map_err(allocation_failed(
            increment.get().saturating_mul(size_of::<E>()),
        ))?;

    trace!(
        old_capacity,
        new_capacity = table.capacity(),
        "grew block table"
    );

    Ok(())
}

/// Allocates a zero-initialized block of `len` items, surfacing allocator failure as an error.
pub(crate) fn zeroed_block<T: Pod>(len: usize) -> Result<Box<[T]>> {
    bytemuck::allocation::try_zeroed_slice_box(len).map_err(|()| Error::AllocationFailed {
        bytes: len.saturating_mul(size_of::<T>()),
    })
}

/// Number of whole items of type `T` contained in `byte_len` bytes. A trailing partial item
/// is not counted.
pub(crate) fn whole_items<T>(byte_len: usize) -> usize {
    byte_len
        .checked_div(size_of::<T>())
        .expect("item size is checked to be non-zero when a container is created")
}

/// Maps a reservation failure to our error type, reporting the size of the attempted growth.
fn allocation_failed(bytes: usize) -> impl FnOnce(TryReserveError) -> Error {
    move |_cause| Error::AllocationFailed { bytes }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn increment(value: usize) -> NonZero<usize> {
        NonZero::new(value).unwrap()
    }

    #[test]
    fn table_grows_by_increment_only_when_full() {
        let mut table: Vec<u64> = Vec::new();

        reserve_table_slot(&mut table, increment(4)).unwrap();
        assert!(table.capacity() >= 4);
        let capacity = table.capacity();

        for value in 0..capacity {
            reserve_table_slot(&mut table, increment(4)).unwrap();
            table.push(value as u64);
        }

        // Every push above fit into the existing capacity.
        assert_eq!(table.capacity(), capacity);

        reserve_table_slot(&mut table, increment(4)).unwrap();
        assert!(table.capacity() >= capacity + 4);
    }

    #[test]
    fn zeroed_block_is_zeroed() {
        let block = zeroed_block::<u32>(16).unwrap();
        assert_eq!(block.len(), 16);
        assert!(block.iter().all(|&v| v == 0));
    }

    #[test]
    fn whole_items_drops_partial_tail() {
        assert_eq!(whole_items::<u32>(0), 0);
        assert_eq!(whole_items::<u32>(3), 0);
        assert_eq!(whole_items::<u32>(8), 2);
        assert_eq!(whole_items::<u32>(11), 2);
    }
}
