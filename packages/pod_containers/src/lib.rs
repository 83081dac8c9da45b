#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Containers, a pooled allocator and sorting primitives for plain-old-data items.
//!
//! All containers in this crate store items that are [`bytemuck::Pod`]: they have no destructors,
//! can be copied bit for bit and any bit pattern (including all zeroes) is a valid value. This
//! allows the containers to skip per-item construction and destruction entirely and to convert
//! their content to and from raw bytes without any encoding step.
//!
//! # Key Features
//!
//! - [`PodArray`] - a contiguous array with explicit capacity management. It never grows on its
//!   own, so appends are predictable and never reallocate behind your back.
//! - [`BlockVec`] - a growable sequence stored in fixed-size blocks. Growing never moves existing
//!   items, so addresses of items stay valid for as long as the items exist.
//! - [`PodAllocator`] - a bump allocator handing out aligned byte spans from large blocks, releasing
//!   everything at once.
//! - [`quick_sort()`] and [`remove_duplicates()`] - generic algorithms over any container that
//!   implements [`RandomAccess`], including the non-contiguous [`BlockVec`].
//! - [`PodArrayAdaptor`], [`PodAutoArray`] and [`PodHeapArray`] - light fixed-size containers for
//!   use with the algorithms.
//! - Byte serialization of [`PodArray`] and [`BlockVec`], as a raw concatenation of item bytes.
//!
//! # Example
//!
//! ```
//! use pod_containers::{BlockVec, quick_sort, remove_duplicates};
//!
//! // Blocks of 2^4 = 16 items.
//! let mut distances = BlockVec::<u32, 4>::new();
//! distances.extend_from_slice(&[30, 10, 20, 10, 30, 40]).unwrap();
//!
//! quick_sort(&mut distances, |a, b| a < b);
//! let unique = remove_duplicates(&mut distances, |a, b| a == b);
//! distances.truncate(unique);
//!
//! assert_eq!(distances.to_bytes().len(), 4 * size_of::<u32>());
//! assert_eq!(distances.value_at(3), Some(40));
//! ```
//!
//! # Thread safety
//!
//! The containers are [`Send`] and [`Sync`] if their items are. [`PodAllocator`] is [`Send`] but
//! not [`Sync`].

mod adaptors;
mod block_vec;
mod block_vec_builder;
mod dedup;
mod error;
mod pod_allocator;
mod pod_allocator_builder;
mod pod_array;
mod random_access;
mod sort;
mod table;

pub use adaptors::*;
pub use block_vec::*;
pub use block_vec_builder::*;
pub use dedup::*;
pub use error::*;
pub use pod_allocator::*;
pub use pod_allocator_builder::*;
pub use pod_array::*;
pub use random_access::*;
pub use sort::*;
