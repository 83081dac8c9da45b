use thiserror::Error;

/// Errors that can occur when operating on the containers and the allocator in this crate.
#[derive(Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// The system allocator could not provide the memory needed to grow a container.
    #[error("failed to allocate {bytes} bytes")]
    AllocationFailed {
        /// The size of the allocation that failed.
        bytes: usize,
    },

    /// An index was outside the logical length of a container.
    #[error("index {index} is out of bounds for a container of length {len}")]
    IndexOutOfBounds {
        /// The index that was requested.
        index: usize,

        /// The logical length of the container at the time of the request.
        len: usize,
    },

    /// An append was attempted on a contiguous array that has no reserved room left.
    ///
    /// Contiguous arrays never grow on their own; the caller must reserve room in advance.
    #[error("cannot add beyond the reserved capacity of {capacity} items")]
    CapacityExceeded {
        /// The reserved capacity of the array.
        capacity: usize,
    },

    /// A contiguous run was requested that can never fit inside a single block.
    #[error("a contiguous run of {requested} items cannot fit in blocks of {block_size} items")]
    RunExceedsBlock {
        /// The number of items requested for the run.
        requested: usize,

        /// The number of items in one block.
        block_size: usize,
    },

    /// A serialization target buffer is shorter than the serialized form.
    #[error("buffer of {available} bytes is too small, {required} bytes are required")]
    BufferTooSmall {
        /// The number of bytes the serialized form occupies.
        required: usize,

        /// The number of bytes available in the target buffer.
        available: usize,
    },

    /// An allocation was requested with an alignment that is not a power of two.
    #[error("alignment {alignment} is not a power of two")]
    InvalidAlignment {
        /// The rejected alignment.
        alignment: usize,
    },

    /// A fixed-size container was constructed from input of the wrong length.
    #[error("expected exactly {expected} items but got {actual}")]
    LengthMismatch {
        /// The length the container requires.
        expected: usize,

        /// The length that was provided.
        actual: usize,
    },
}

/// A specialized `Result` type for container operations, returning the crate's
/// [`Error`] type as the error value.
pub type Result<T> = std::result::Result<T, Error>;
