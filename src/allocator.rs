use core::alloc::Layout;
use core::ptr::NonNull;

/// Memory capability used by `DynArray` for all buffer traffic.
///
/// Sizes are expressed in elements of `T`, not bytes. Failure is reported by
/// returning `None`; an allocator must never panic or abort on exhaustion.
///
/// An instance is held by value inside every array and cloned when the array is
/// copied, so clones must be able to free each other's buffers.
///
/// # Safety
///
/// Implementations must return buffers that are valid and properly aligned for
/// at least the requested number of `T`, and must keep them valid until they are
/// passed back to `reallocate` or `deallocate`.
pub unsafe trait Allocator<T>: Clone {
    /// Allocates storage for `capacity` elements. `capacity` is never zero.
    fn allocate(&mut self, capacity: usize) -> Option<NonNull<T>>;

    /// Resizes `buffer` from `old_capacity` to `new_capacity` elements, possibly
    /// moving it. The first `min(old_capacity, new_capacity)` elements are preserved.
    ///
    /// A `None` buffer behaves like [`Allocator::allocate`]. On failure the original
    /// buffer is left untouched.
    ///
    /// # Safety
    ///
    /// `buffer` must come from this allocator (or a clone of it) with exactly
    /// `old_capacity` slots. `new_capacity` is never zero.
    unsafe fn reallocate(
        &mut self,
        buffer: Option<NonNull<T>>,
        old_capacity: usize,
        new_capacity: usize,
    ) -> Option<NonNull<T>>;

    /// Releases `buffer`.
    ///
    /// # Safety
    ///
    /// `buffer` must come from this allocator (or a clone of it) with exactly
    /// `capacity` slots, and must not be used afterwards.
    unsafe fn deallocate(&mut self, buffer: NonNull<T>, capacity: usize);
}

/// The global heap, through `alloc::alloc`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Global;

// SAFETY: buffers come straight from the global allocator with `Layout::array::<T>`,
// and zero-sized layouts are served by dangling pointers that are never freed.
unsafe impl<T> Allocator<T> for Global {
    fn allocate(&mut self, capacity: usize) -> Option<NonNull<T>> {
        let layout = Layout::array::<T>(capacity).ok()?;
        if layout.size() == 0 {
            return Some(NonNull::dangling());
        }
        // SAFETY: layout has a non-zero size
        NonNull::new(unsafe { alloc::alloc::alloc(layout) }.cast::<T>())
    }

    unsafe fn reallocate(
        &mut self,
        buffer: Option<NonNull<T>>,
        old_capacity: usize,
        new_capacity: usize,
    ) -> Option<NonNull<T>> {
        let Some(buffer) = buffer else {
            return self.allocate(new_capacity);
        };
        let old_layout = Layout::array::<T>(old_capacity).ok()?;
        let new_layout = Layout::array::<T>(new_capacity).ok()?;

        if old_layout.size() == 0 {
            return self.allocate(new_capacity);
        }
        if new_layout.size() == 0 {
            // SAFETY: buffer was allocated with old_layout
            unsafe { alloc::alloc::dealloc(buffer.as_ptr().cast::<u8>(), old_layout) };
            return Some(NonNull::dangling());
        }

        // SAFETY: buffer was allocated with old_layout, the new size is non-zero and
        // Layout::array already rejected sizes overflowing isize
        let raw = unsafe {
            alloc::alloc::realloc(buffer.as_ptr().cast::<u8>(), old_layout, new_layout.size())
        };
        NonNull::new(raw.cast::<T>())
    }

    unsafe fn deallocate(&mut self, buffer: NonNull<T>, capacity: usize) {
        if let Ok(layout) = Layout::array::<T>(capacity) {
            if layout.size() != 0 {
                // SAFETY: caller guarantees buffer was allocated here with this layout
                unsafe { alloc::alloc::dealloc(buffer.as_ptr().cast::<u8>(), layout) };
            }
        }
    }
}
