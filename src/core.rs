use core::fmt;
use core::marker::PhantomData;
use core::ops::{Index, IndexMut};
use core::ptr::{self, NonNull};

use crate::allocator::{Allocator, Global};
use crate::error::DynArrayError;
use crate::iter::{Iter, IterMut};
use crate::observer::{ErrorCallback, ErrorContext, Observer};

/// Capacity of the first buffer allocated by `add`. Later growth doubles it.
pub const MIN_GROWTH_CAPACITY: usize = 8;

/// A heap-backed random access array with a pluggable allocator
///
/// Elements live in `[0, len)` of a buffer holding `capacity` slots. All memory
/// traffic goes through `A`, and every detected misuse or allocation failure is
/// reported to the installed observer.
pub struct DynArray<T, A: Allocator<T> = Global> {
    buffer: Option<NonNull<T>>,
    count: usize,
    capacity: usize,
    allocator: A,
    alive: bool,
    observer: Observer,
    _marker: PhantomData<T>,
}

// SAFETY: the array owns its buffer exclusively, like `Vec<T>`
unsafe impl<T: Send, A: Allocator<T> + Send> Send for DynArray<T, A> {}
// SAFETY: shared access only hands out `&T`
unsafe impl<T: Sync, A: Allocator<T> + Sync> Sync for DynArray<T, A> {}

impl<T> DynArray<T, Global> {
    /// Creates an empty array on the global heap.
    #[must_use]
    pub fn new() -> Self {
        Self::new_in(Global)
    }
}

impl<T, A: Allocator<T>> DynArray<T, A> {
    /// Creates an empty array that allocates through `allocator`.
    ///
    /// Nothing is allocated until the first element is added.
    #[must_use]
    pub fn new_in(allocator: A) -> Self {
        Self {
            buffer: None,
            count: 0,
            capacity: 0,
            allocator,
            alive: true,
            observer: Observer::default(),
            _marker: PhantomData,
        }
    }

    /// Creates an empty array with exactly `capacity` slots.
    ///
    /// If the allocation fails the array stays alive and empty with zero capacity.
    /// No observer is installed yet, so the failure is not reported anywhere:
    /// compare [`DynArray::capacity`] with the request to detect it.
    #[must_use]
    pub fn with_capacity_in(capacity: usize, allocator: A) -> Self {
        let mut array = Self::new_in(allocator);
        let _ = array.set_capacity(capacity);
        array
    }

    pub(crate) fn with_observer(mut self, observer: Observer) -> Self {
        self.observer = observer;
        self
    }

    /// Returns `false` if a copy failed to allocate and left this array a zombie.
    ///
    /// A zombie reads as empty and never allocates again, but is safe to drop.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Number of initialized elements. Same as [`DynArray::len`].
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn allocator(&self) -> &A {
        &self.allocator
    }

    /// Installs the error sink. The callback receives `context` unchanged.
    pub fn set_observer(&mut self, callback: ErrorCallback, context: ErrorContext) {
        self.observer = Observer::new(callback, context);
    }

    #[must_use]
    pub fn observer(&self) -> ErrorCallback {
        self.observer.callback()
    }

    #[must_use]
    pub fn context(&self) -> ErrorContext {
        self.observer.context()
    }

    pub(crate) fn observer_pair(&self) -> Observer {
        self.observer
    }

    pub(crate) fn report(&self, error: DynArrayError) -> DynArrayError {
        self.observer.notify(error);
        error
    }

    fn buffer_ptr(&self) -> *mut T {
        self.buffer.map_or(NonNull::dangling().as_ptr(), NonNull::as_ptr)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: slots [0, count) are initialized; an absent buffer implies count == 0
        unsafe { core::slice::from_raw_parts(self.buffer_ptr(), self.count) }
    }

    #[must_use]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: see as_slice; &mut self guarantees exclusivity
        unsafe { core::slice::from_raw_parts_mut(self.buffer_ptr(), self.count) }
    }

    /// Gets the element at `index`.
    ///
    /// Returns `None` and reports `IndexOutOfRange` if `index >= len`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.count {
            self.report(DynArrayError::IndexOutOfRange {
                index,
                length: self.count,
            });
            return None;
        }
        self.as_slice().get(index)
    }

    /// Gets a mutable reference to the element at `index`.
    ///
    /// Returns `None` and reports `IndexOutOfRange` if `index >= len`.
    pub fn at(&mut self, index: usize) -> Option<&mut T> {
        if index >= self.count {
            self.report(DynArrayError::IndexOutOfRange {
                index,
                length: self.count,
            });
            return None;
        }
        self.as_mut_slice().get_mut(index)
    }

    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.as_slice().first()
    }

    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.as_slice().last()
    }

    /// Returns an iterator over the elements in insertion order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.as_slice())
    }

    /// Returns an iterator handing out mutable references in insertion order.
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut::new(self.as_mut_slice())
    }

    /// Changes the capacity to exactly `capacity` slots.
    ///
    /// A capacity of zero releases the buffer.
    ///
    /// # Errors
    ///
    /// - `DynArrayError::InvalidCapacity` if `capacity` is less than `len`
    /// - `DynArrayError::AllocationFailure` if the allocator fails, or the array is a zombie
    ///
    /// On error the array is left untouched.
    pub fn set_capacity(&mut self, capacity: usize) -> Result<(), DynArrayError> {
        if capacity < self.count {
            return Err(self.report(DynArrayError::InvalidCapacity {
                requested: capacity,
                count: self.count,
            }));
        }
        if capacity == self.capacity {
            return Ok(());
        }
        if !self.alive {
            return Err(self.report(DynArrayError::AllocationFailure {
                requested: capacity,
            }));
        }
        self.resize_buffer(capacity)
    }

    fn resize_buffer(&mut self, capacity: usize) -> Result<(), DynArrayError> {
        if capacity == 0 {
            if let Some(buffer) = self.buffer.take() {
                // SAFETY: buffer came from this allocator with `self.capacity` slots
                unsafe { self.allocator.deallocate(buffer, self.capacity) };
            }
            log::trace!("dynarray released buffer of {} slots", self.capacity);
            self.capacity = 0;
            return Ok(());
        }

        // SAFETY: buffer (if any) came from this allocator with `self.capacity` slots
        let resized = unsafe {
            self.allocator
                .reallocate(self.buffer, self.capacity, capacity)
        };
        let Some(buffer) = resized else {
            return Err(self.report(DynArrayError::AllocationFailure {
                requested: capacity,
            }));
        };

        log::trace!(
            "dynarray capacity changed from {} to {}",
            self.capacity,
            capacity
        );
        self.buffer = Some(buffer);
        self.capacity = capacity;
        Ok(())
    }

    fn ensure_capacity(&mut self, required: usize) -> Result<(), DynArrayError> {
        if self.capacity >= required {
            return Ok(());
        }
        if !self.alive {
            return Err(self.report(DynArrayError::AllocationFailure {
                requested: required,
            }));
        }
        let Some(capacity) = grown_capacity(self.capacity, required) else {
            return Err(self.report(DynArrayError::AllocationFailure {
                requested: required,
            }));
        };
        self.resize_buffer(capacity)
    }

    /// Writes `elem` into the first free slot.
    ///
    /// # Safety
    ///
    /// `len` must be less than `capacity`.
    pub(crate) unsafe fn push_unchecked(&mut self, elem: T) {
        // SAFETY: caller guarantees slot `count` is inside the buffer
        unsafe { self.buffer_ptr().add(self.count).write(elem) };
        self.count += 1;
    }

    /// Appends an element, growing the buffer when it is full.
    ///
    /// The first allocation holds [`MIN_GROWTH_CAPACITY`] slots and each later
    /// growth doubles the capacity.
    ///
    /// # Errors
    ///
    /// Returns `DynArrayError::AllocationFailure` if the buffer could not grow. The
    /// array is left untouched and `elem` is dropped.
    pub fn add(&mut self, elem: T) -> Result<(), DynArrayError> {
        let Some(required) = self.count.checked_add(1) else {
            return Err(self.report(DynArrayError::AllocationFailure {
                requested: usize::MAX,
            }));
        };
        self.ensure_capacity(required)?;
        // SAFETY: ensure_capacity made room for one more element
        unsafe { self.push_unchecked(elem) };
        Ok(())
    }

    /// Appends every element of `elems` in order.
    ///
    /// # Errors
    ///
    /// Stops at the first element that cannot be added and returns its error.
    /// Elements appended before the failure stay in the array.
    pub fn add_range<I>(&mut self, elems: I) -> Result<(), DynArrayError>
    where
        I: IntoIterator<Item = T>,
    {
        for elem in elems {
            self.add(elem)?;
        }
        Ok(())
    }

    /// Drops all elements in insertion order. The buffer and capacity are kept.
    pub fn clear(&mut self) {
        let count = self.count;
        self.count = 0;
        // SAFETY: the first `count` slots were initialized and are no longer reachable
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.buffer_ptr(), count));
        }
    }

    /// Drops all elements and hands the buffer back to the allocator.
    pub(crate) fn release(&mut self) {
        self.clear();
        if let Some(buffer) = self.buffer.take() {
            // SAFETY: buffer came from this allocator with `self.capacity` slots
            unsafe { self.allocator.deallocate(buffer, self.capacity) };
        }
        self.capacity = 0;
    }

    /// Moves the contents out, leaving this array alive and empty.
    ///
    /// The returned array takes over the buffer, count, capacity, liveness and
    /// observer. Nothing is allocated or copied. The allocator is cloned, so both
    /// arrays keep one and the donor can allocate again.
    #[must_use]
    pub fn take(&mut self) -> Self {
        let taken = Self {
            buffer: self.buffer.take(),
            count: self.count,
            capacity: self.capacity,
            allocator: self.allocator.clone(),
            alive: self.alive,
            observer: self.observer,
            _marker: PhantomData,
        };
        self.count = 0;
        self.capacity = 0;
        self.alive = true;
        taken
    }

    /// Releases the current contents, then takes over `donor`'s contents.
    ///
    /// `donor` is left alive and empty.
    pub fn move_from(&mut self, donor: &mut Self) -> &mut Self {
        self.release();
        *self = donor.take();
        self
    }
}

impl<T: Clone, A: Allocator<T>> DynArray<T, A> {
    /// Fills an array without a buffer with clones of `source`.
    fn clone_elements_from(&mut self, source: &Self) {
        let count = source.count;
        if count == 0 {
            return;
        }
        if !self.alive {
            self.report(DynArrayError::AllocationFailure { requested: count });
            return;
        }

        let Some(buffer) = self.allocator.allocate(count) else {
            self.alive = false;
            log::warn!("dynarray copy of {count} elements failed to allocate, array is a zombie");
            self.report(DynArrayError::AllocationFailure { requested: count });
            return;
        };

        self.buffer = Some(buffer);
        self.capacity = count;
        for elem in source.as_slice() {
            // SAFETY: the buffer has `count` slots and we write at most `count` elements
            unsafe { self.push_unchecked(elem.clone()) };
        }
    }

    /// Replaces the contents with a deep copy of `source`.
    ///
    /// The allocator and observer are copied too. If the new buffer cannot be
    /// allocated the array becomes a zombie; check [`DynArray::is_alive`].
    /// A zombie stays a zombie: copying a non-empty `source` into it reports
    /// `AllocationFailure` and leaves it empty.
    pub fn copy_from(&mut self, source: &Self) -> &mut Self {
        self.release();
        self.allocator = source.allocator.clone();
        self.observer = source.observer;
        self.clone_elements_from(source);
        self
    }
}

/// Doubles from `max(current, MIN_GROWTH_CAPACITY)` until `required` fits.
fn grown_capacity(current: usize, required: usize) -> Option<usize> {
    let mut capacity = current.max(MIN_GROWTH_CAPACITY);
    while capacity < required {
        capacity = capacity.checked_mul(2)?;
    }
    Some(capacity)
}

impl<T, A: Allocator<T>> Drop for DynArray<T, A> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T: Clone, A: Allocator<T>> Clone for DynArray<T, A> {
    /// Deep copy with exactly `len` slots. On allocation failure the copy is a zombie.
    fn clone(&self) -> Self {
        let mut array = Self::new_in(self.allocator.clone()).with_observer(self.observer);
        array.clone_elements_from(self);
        array
    }

    fn clone_from(&mut self, source: &Self) {
        self.copy_from(source);
    }
}

impl<T, A: Allocator<T> + Default> Default for DynArray<T, A> {
    fn default() -> Self {
        Self::new_in(A::default())
    }
}

impl<T: fmt::Debug, A: Allocator<T>> fmt::Debug for DynArray<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq, A: Allocator<T>, B: Allocator<T>> PartialEq<DynArray<T, B>> for DynArray<T, A> {
    fn eq(&self, other: &DynArray<T, B>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq, A: Allocator<T>> Eq for DynArray<T, A> {}

impl<T, A: Allocator<T>> Index<usize> for DynArray<T, A> {
    type Output = T;

    /// # Panics
    ///
    /// Panics after reporting `IndexOutOfRange` if `index >= len`.
    #[track_caller]
    fn index(&self, index: usize) -> &T {
        match self.get(index) {
            Some(elem) => elem,
            None => panic!(
                "Index {} out of bounds for array of length {}",
                index, self.count
            ),
        }
    }
}

impl<T, A: Allocator<T>> IndexMut<usize> for DynArray<T, A> {
    /// # Panics
    ///
    /// Panics after reporting `IndexOutOfRange` if `index >= len`.
    #[track_caller]
    fn index_mut(&mut self, index: usize) -> &mut T {
        let length = self.count;
        match self.at(index) {
            Some(elem) => elem,
            None => panic!("Index {index} out of bounds for array of length {length}"),
        }
    }
}

impl<T, A: Allocator<T>> Extend<T> for DynArray<T, A> {
    /// Appends until the first allocation failure, which goes to the observer.
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let _ = self.add_range(iter);
    }
}

impl<T, A: Allocator<T> + Default> FromIterator<T> for DynArray<T, A> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut array = Self::default();
        array.extend(iter);
        array
    }
}
