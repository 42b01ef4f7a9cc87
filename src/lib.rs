#![no_std]

//! `DynArray`: a random access dynamic array with a pluggable allocator.
//!
//! `DynArray` keeps its elements in one contiguous buffer obtained from an
//! [`Allocator`], grows by doubling, and offers a search-oriented API on top of
//! the usual append/index/clear surface: linear and binary search, filtering,
//! mapping into a new array, range extraction and index lookups.
//!
//! This crate is `no_std` compatible and only needs the `alloc` crate.
//!
//! # Error Reporting
//!
//! Failures never unwind. Each detected error is handed synchronously to the
//! array's observer callback, and the operation returns a sentinel: `Err` for
//! mutators, `None` for lookups, `false` for binary search, or an empty array
//! for operations that build a new one.
//!
//! ```
//! use core::cell::Cell;
//! use dynarray::{DynArray, DynArrayError, ErrorContext};
//!
//! fn remember(error: DynArrayError, context: ErrorContext) {
//!     // SAFETY: the context was created from a live `Cell` below
//!     let last = unsafe { context.cast::<Cell<Option<DynArrayError>>>() };
//!     last.set(Some(error));
//! }
//!
//! let last_error = Cell::new(None);
//! let mut array = DynArray::new();
//! array.set_observer(remember, ErrorContext::new(&last_error));
//!
//! array.add(1).unwrap();
//! array.add(2).unwrap();
//! array.add(3).unwrap();
//!
//! assert_eq!(array.get(3), None);
//! assert_eq!(
//!     last_error.get(),
//!     Some(DynArrayError::IndexOutOfRange { index: 3, length: 3 })
//! );
//! ```
//!
//! # Capacity and Growth
//!
//! The first `add` allocates [`MIN_GROWTH_CAPACITY`] slots and each later growth
//! doubles the capacity. `set_capacity` sets an exact capacity.
//!
//! ```
//! # use dynarray::DynArray;
//! let mut array = DynArray::new();
//! array.add_range([1, 2, 3]).unwrap();
//! assert_eq!(array.capacity(), 8);
//!
//! assert!(array.set_capacity(1).is_err());
//! array.set_capacity(10).unwrap();
//! assert_eq!(array.capacity(), 10);
//! assert_eq!(array.as_slice(), &[1, 2, 3]);
//! ```
//!
//! # Searching
//!
//! ```
//! # use dynarray::DynArray;
//! let array: DynArray<i32> = [1, 2, 3, 4, 5].into_iter().collect();
//!
//! assert_eq!(array.find_index_in(2, 3, |x| x % 2 == 1), Some(2));
//! assert_eq!(array.find_last_index_in(2, 3, |x| x % 2 == 1), Some(4));
//! assert!(array.binary_search(&4));
//!
//! let odds = array.find_all(|x| x % 2 == 1);
//! assert_eq!(odds.as_slice(), &[1, 3, 5]);
//!
//! let halves: DynArray<f32> = array.map_to(|&x| x as f32 / 2.0);
//! assert_eq!(halves[1], 1.0);
//! ```
//!
//! # Zombies
//!
//! Copying an array allocates. If that allocation fails the copy becomes a
//! "zombie": it reads as empty, never allocates again and is safe to drop.
//! Check [`DynArray::is_alive`] after `clone` or `copy_from`.

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

mod allocator;
mod core;
mod error;
mod iter;
mod observer;
mod search;

// Re-export public types and traits
pub use crate::allocator::{Allocator, Global};
pub use crate::core::{DynArray, MIN_GROWTH_CAPACITY};
pub use crate::error::DynArrayError;
pub use crate::iter::{Iter, IterMut};
pub use crate::observer::{ErrorCallback, ErrorContext, Observer};
