//! Scanning, searching and extraction over a `DynArray`.
//!
//! Index-returning searches use `None` where a C API would return -1. Out of range
//! arguments are reported to the observer and also yield `None` (or `false`, or an
//! empty array), so the caller sees the same sentinel either way and can tell the
//! cases apart through the observer.

use core::cmp::Ordering;
use core::ops::Range;

use crate::allocator::Allocator;
use crate::core::DynArray;
use crate::error::DynArrayError;

impl<T, A: Allocator<T>> DynArray<T, A> {
    /// Validates the half-open range `[start, start + count)`.
    ///
    /// `start` must be a valid index, so any range on an empty array is rejected.
    fn checked_range(&self, start: usize, count: usize) -> Option<Range<usize>> {
        let length = self.len();
        if start >= length {
            self.report(DynArrayError::IndexOutOfRange {
                index: start,
                length,
            });
            return None;
        }
        match start.checked_add(count) {
            Some(end) if end <= length => Some(start..end),
            end => {
                self.report(DynArrayError::IndexOutOfRange {
                    index: end.unwrap_or(usize::MAX),
                    length,
                });
                None
            }
        }
    }

    /// Returns `true` if any element satisfies `predicate`.
    pub fn exists<P>(&self, predicate: P) -> bool
    where
        P: FnMut(&T) -> bool,
    {
        self.iter().any(predicate)
    }

    /// Returns the first element satisfying `predicate`.
    pub fn find<P>(&self, mut predicate: P) -> Option<&T>
    where
        P: FnMut(&T) -> bool,
    {
        self.iter().find(|elem| predicate(elem))
    }

    /// Mutable twin of [`DynArray::find`].
    pub fn find_mut<P>(&mut self, mut predicate: P) -> Option<&mut T>
    where
        P: FnMut(&T) -> bool,
    {
        self.iter_mut().find(|elem| predicate(elem))
    }

    /// Returns the last element satisfying `predicate`.
    pub fn find_last<P>(&self, mut predicate: P) -> Option<&T>
    where
        P: FnMut(&T) -> bool,
    {
        self.iter().rev().find(|elem| predicate(elem))
    }

    /// Calls `action` on every element in order.
    pub fn for_each<F>(&mut self, action: F)
    where
        F: FnMut(&mut T),
    {
        self.iter_mut().for_each(action);
    }

    /// Index of the first element in `[start, start + count)` satisfying `predicate`.
    ///
    /// Reports `IndexOutOfRange` and returns `None` unless `start < len` and
    /// `start + count <= len`.
    pub fn find_index_in<P>(&self, start: usize, count: usize, predicate: P) -> Option<usize>
    where
        P: FnMut(&T) -> bool,
    {
        let range = self.checked_range(start, count)?;
        self.as_slice()[range]
            .iter()
            .position(predicate)
            .map(|offset| start + offset)
    }

    /// Index of the first element from `start` to the end satisfying `predicate`.
    pub fn find_index_from<P>(&self, start: usize, predicate: P) -> Option<usize>
    where
        P: FnMut(&T) -> bool,
    {
        self.find_index_in(start, self.len().saturating_sub(start), predicate)
    }

    /// Index of the first element satisfying `predicate`.
    ///
    /// Searching an empty array is not an error: it returns `None` without
    /// notifying the observer.
    pub fn find_index<P>(&self, predicate: P) -> Option<usize>
    where
        P: FnMut(&T) -> bool,
    {
        if self.is_empty() {
            return None;
        }
        self.find_index_in(0, self.len(), predicate)
    }

    /// Index of the last element in `[start, start + count)` satisfying `predicate`.
    ///
    /// Range rules are the same as for [`DynArray::find_index_in`].
    pub fn find_last_index_in<P>(&self, start: usize, count: usize, predicate: P) -> Option<usize>
    where
        P: FnMut(&T) -> bool,
    {
        let range = self.checked_range(start, count)?;
        self.as_slice()[range]
            .iter()
            .rposition(predicate)
            .map(|offset| start + offset)
    }

    pub fn find_last_index_from<P>(&self, start: usize, predicate: P) -> Option<usize>
    where
        P: FnMut(&T) -> bool,
    {
        self.find_last_index_in(start, self.len().saturating_sub(start), predicate)
    }

    /// Index of the last element satisfying `predicate`. An empty array yields
    /// `None` without an error.
    pub fn find_last_index<P>(&self, predicate: P) -> Option<usize>
    where
        P: FnMut(&T) -> bool,
    {
        if self.is_empty() {
            return None;
        }
        self.find_last_index_in(0, self.len(), predicate)
    }

    /// Linear search using `eq(candidate, elem)` as the equality test.
    pub fn contains_by<E>(&self, elem: &T, mut eq: E) -> bool
    where
        E: FnMut(&T, &T) -> bool,
    {
        self.exists(|candidate| eq(candidate, elem))
    }

    /// Binary search over `[start, start + length)` using `compare(elem, candidate)`.
    ///
    /// The range must already be ordered by `compare`; otherwise the result is
    /// unspecified, though the search always terminates. Reports `IndexOutOfRange`
    /// and returns `false` if `length` is zero or the range leaves `[0, len)`.
    pub fn binary_search_in_by<C>(
        &self,
        start: usize,
        length: usize,
        elem: &T,
        mut compare: C,
    ) -> bool
    where
        C: FnMut(&T, &T) -> Ordering,
    {
        let count = self.len();
        let right = start.checked_add(length).and_then(|end| end.checked_sub(1));
        let (mut left, mut right) = match right {
            Some(right) if length > 0 && start < count && right < count => (start, right),
            _ => {
                let index = if start >= count {
                    start
                } else {
                    right.unwrap_or(usize::MAX)
                };
                self.report(DynArrayError::IndexOutOfRange {
                    index,
                    length: count,
                });
                return false;
            }
        };

        let elems = self.as_slice();
        while left <= right {
            let mid = left + (right - left) / 2;
            match compare(elem, &elems[mid]) {
                Ordering::Equal => return true,
                Ordering::Less => {
                    if mid == left {
                        break;
                    }
                    right = mid - 1;
                }
                Ordering::Greater => left = mid + 1,
            }
        }
        false
    }

    /// Binary search over the whole array using `compare(elem, candidate)`.
    ///
    /// An empty array has no valid range, so this reports `IndexOutOfRange`.
    pub fn binary_search_by<C>(&self, elem: &T, compare: C) -> bool
    where
        C: FnMut(&T, &T) -> Ordering,
    {
        self.binary_search_in_by(0, self.len(), elem, compare)
    }
}

impl<T: PartialEq, A: Allocator<T>> DynArray<T, A> {
    /// Returns `true` if an element equal to `elem` is present.
    pub fn contains(&self, elem: &T) -> bool {
        self.contains_by(elem, T::eq)
    }

    /// Index of the first element equal to `elem`. An empty array yields `None`
    /// without an error.
    pub fn index_of(&self, elem: &T) -> Option<usize> {
        self.find_index(|candidate| candidate == elem)
    }

    pub fn index_of_from(&self, elem: &T, start: usize) -> Option<usize> {
        self.find_index_from(start, |candidate| candidate == elem)
    }

    /// Index of the first element equal to `elem` in `[start, start + count)`.
    pub fn index_of_in(&self, elem: &T, start: usize, count: usize) -> Option<usize> {
        self.find_index_in(start, count, |candidate| candidate == elem)
    }

    pub fn last_index_of(&self, elem: &T) -> Option<usize> {
        self.find_last_index(|candidate| candidate == elem)
    }

    pub fn last_index_of_from(&self, elem: &T, start: usize) -> Option<usize> {
        self.find_last_index_from(start, |candidate| candidate == elem)
    }

    pub fn last_index_of_in(&self, elem: &T, start: usize, count: usize) -> Option<usize> {
        self.find_last_index_in(start, count, |candidate| candidate == elem)
    }
}

impl<T: Ord, A: Allocator<T>> DynArray<T, A> {
    /// Binary search using the natural order of `T`. See [`DynArray::binary_search_by`].
    pub fn binary_search(&self, elem: &T) -> bool {
        self.binary_search_by(elem, T::cmp)
    }

    pub fn binary_search_in(&self, start: usize, length: usize, elem: &T) -> bool {
        self.binary_search_in_by(start, length, elem, T::cmp)
    }
}

impl<T: Clone, A: Allocator<T>> DynArray<T, A> {
    /// Clones every element into `out`, starting at `out[start_offset]`.
    ///
    /// # Panics
    ///
    /// Panics if `out` is shorter than `start_offset + len`.
    pub fn copy_to(&self, out: &mut [T], start_offset: usize) {
        out[start_offset..start_offset + self.len()].clone_from_slice(self.as_slice());
    }

    /// Copies the elements satisfying `predicate` into a new array using the
    /// same allocator. See [`DynArray::find_all_in`].
    #[must_use]
    pub fn find_all<P>(&self, predicate: P) -> Self
    where
        P: FnMut(&T) -> bool,
    {
        self.find_all_in(predicate, self.allocator().clone())
    }

    /// Copies the elements satisfying `predicate`, in order, into a new array
    /// allocated through `allocator`.
    ///
    /// The result inherits this array's observer. If an append fails the error
    /// has already been reported and an empty array is returned.
    #[must_use]
    pub fn find_all_in<P>(&self, mut predicate: P, allocator: A) -> Self
    where
        P: FnMut(&T) -> bool,
    {
        let mut matches = Self::new_in(allocator).with_observer(self.observer_pair());
        for elem in self.iter().filter(|elem| predicate(elem)) {
            if matches.add(elem.clone()).is_err() {
                matches.release();
                break;
            }
        }
        matches
    }

    /// Copies `[start, start + count)` into a new array with exactly `count` slots.
    ///
    /// Reports `IndexOutOfRange` and returns an empty array if the range is
    /// invalid (same rules as [`DynArray::find_index_in`]). An allocation failure
    /// also yields an empty array.
    #[must_use]
    pub fn get_range(&self, start: usize, count: usize) -> Self {
        let mut range_array =
            Self::new_in(self.allocator().clone()).with_observer(self.observer_pair());
        let Some(range) = self.checked_range(start, count) else {
            return range_array;
        };
        if range_array.set_capacity(count).is_err() {
            return range_array;
        }
        for elem in &self.as_slice()[range] {
            // SAFETY: capacity is exactly `count` and the range holds `count` elements
            unsafe { range_array.push_unchecked(elem.clone()) };
        }
        range_array
    }
}

impl<T, A: Allocator<T>> DynArray<T, A> {
    /// Converts every element into a new array whose allocator is `UA::default()`.
    /// See [`DynArray::map_to_in`].
    #[must_use]
    pub fn map_to<U, UA, F>(&self, converter: F) -> DynArray<U, UA>
    where
        UA: Allocator<U> + Default,
        F: FnMut(&T) -> U,
    {
        self.map_to_in(converter, UA::default())
    }

    /// Converts every element with `converter` into a new array allocated through
    /// `allocator`.
    ///
    /// The new array reserves as many slots as this array's capacity (not its
    /// length) and inherits its observer. If that allocation fails the failure
    /// is reported and an empty array is returned.
    #[must_use]
    pub fn map_to_in<U, UA, F>(&self, mut converter: F, allocator: UA) -> DynArray<U, UA>
    where
        UA: Allocator<U>,
        F: FnMut(&T) -> U,
    {
        let mut mapped = DynArray::new_in(allocator).with_observer(self.observer_pair());
        if mapped.set_capacity(self.capacity()).is_err() {
            return mapped;
        }
        for elem in self.iter() {
            // SAFETY: capacity >= self.capacity() >= self.len()
            unsafe { mapped.push_unchecked(converter(elem)) };
        }
        mapped
    }
}
