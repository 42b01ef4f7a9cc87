use thiserror::Error;

/// Error kinds reported by `DynArray` operations
///
/// Every value is delivered to the array's observer at the moment it is detected.
/// Fallible mutators also return it as `Err`; search operations return their
/// sentinel (`None`, `false` or an empty array) instead.
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum DynArrayError {
    /// The allocator could not provide the requested number of slots
    #[error("Allocation failure: could not allocate {requested} elements")]
    AllocationFailure {
        /// Number of element slots requested
        requested: usize,
    },
    /// Index or range end is outside `[0, length)`
    #[error("Index out of range: index {index} is beyond array length {length}")]
    IndexOutOfRange {
        /// Index (or range end) that was accessed
        index: usize,
        /// Number of elements in the array
        length: usize,
    },
    /// Requested capacity cannot hold the current elements
    #[error("Invalid capacity: requested {requested} but the array holds {count} elements")]
    InvalidCapacity {
        /// Capacity that was requested
        requested: usize,
        /// Number of elements in the array
        count: usize,
    },
}

impl DynArrayError {
    /// Stable upper-case name of the error kind, without the context values.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            DynArrayError::AllocationFailure { .. } => "ALLOCATION_FAILURE",
            DynArrayError::IndexOutOfRange { .. } => "INDEX_OUT_OF_RANGE",
            DynArrayError::InvalidCapacity { .. } => "INVALID_CAPACITY",
        }
    }
}
