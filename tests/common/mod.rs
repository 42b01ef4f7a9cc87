#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::ptr::NonNull;
use std::rc::Rc;

use dynarray::{Allocator, DynArray, DynArrayError, ErrorContext, Global};

thread_local! {
    static ERRORS: RefCell<Vec<DynArrayError>> = const { RefCell::new(Vec::new()) };
}

/// Observer callback that appends every error to a per-thread log.
pub fn record_error(error: DynArrayError, _context: ErrorContext) {
    ERRORS.with(|errors| errors.borrow_mut().push(error));
}

/// Drains the per-thread error log.
pub fn take_errors() -> Vec<DynArrayError> {
    ERRORS.with(|errors| std::mem::take(&mut *errors.borrow_mut()))
}

/// Empty array on the global heap whose errors go to the per-thread log.
pub fn watched<T>() -> DynArray<T> {
    take_errors();
    let mut array = DynArray::new();
    array.set_observer(record_error, ErrorContext::NULL);
    array
}

pub fn watched_from<T>(elems: &[T]) -> DynArray<T>
where
    T: Clone,
{
    let mut array = watched();
    array.add_range(elems.iter().cloned()).unwrap();
    array
}

pub fn watched_in<T>(allocator: TestAlloc) -> DynArray<T, TestAlloc> {
    take_errors();
    let mut array = DynArray::new_in(allocator);
    array.set_observer(record_error, ErrorContext::NULL);
    array
}

#[derive(Default)]
pub struct AllocStats {
    /// Remaining successful allocate/reallocate calls, `None` for unlimited
    pub budget: Cell<Option<usize>>,
    pub allocations: Cell<usize>,
    pub reallocations: Cell<usize>,
    pub deallocations: Cell<usize>,
    pub failures: Cell<usize>,
    /// Buffers handed out and not yet released
    pub live_buffers: Cell<isize>,
}

/// Global-heap allocator with a shared budget and call counters.
///
/// Clones share the same statistics.
#[derive(Clone, Default)]
pub struct TestAlloc {
    pub stats: Rc<AllocStats>,
}

impl TestAlloc {
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Allows `calls` more successful allocate/reallocate calls.
    pub fn with_budget(calls: usize) -> Self {
        let alloc = Self::default();
        alloc.set_budget(Some(calls));
        alloc
    }

    pub fn set_budget(&self, calls: Option<usize>) {
        self.stats.budget.set(calls);
    }

    fn permit(&self) -> bool {
        match self.stats.budget.get() {
            None => true,
            Some(0) => {
                self.stats.failures.set(self.stats.failures.get() + 1);
                false
            }
            Some(left) => {
                self.stats.budget.set(Some(left - 1));
                true
            }
        }
    }
}

unsafe impl<T> Allocator<T> for TestAlloc {
    fn allocate(&mut self, capacity: usize) -> Option<NonNull<T>> {
        if !self.permit() {
            return None;
        }
        let buffer = <Global as Allocator<T>>::allocate(&mut Global, capacity)?;
        self.stats.allocations.set(self.stats.allocations.get() + 1);
        self.stats.live_buffers.set(self.stats.live_buffers.get() + 1);
        Some(buffer)
    }

    unsafe fn reallocate(
        &mut self,
        buffer: Option<NonNull<T>>,
        old_capacity: usize,
        new_capacity: usize,
    ) -> Option<NonNull<T>> {
        if buffer.is_none() {
            return <Self as Allocator<T>>::allocate(self, new_capacity);
        }
        if !self.permit() {
            return None;
        }
        let resized = unsafe {
            <Global as Allocator<T>>::reallocate(&mut Global, buffer, old_capacity, new_capacity)
        }?;
        self.stats.reallocations.set(self.stats.reallocations.get() + 1);
        Some(resized)
    }

    unsafe fn deallocate(&mut self, buffer: NonNull<T>, capacity: usize) {
        unsafe { <Global as Allocator<T>>::deallocate(&mut Global, buffer, capacity) };
        self.stats.deallocations.set(self.stats.deallocations.get() + 1);
        self.stats.live_buffers.set(self.stats.live_buffers.get() - 1);
    }
}

/// Element that logs its id when dropped.
#[derive(Clone, Debug)]
pub struct Tracked {
    pub id: u32,
    dropped: Rc<RefCell<Vec<u32>>>,
}

impl Tracked {
    pub fn new(id: u32, dropped: &Rc<RefCell<Vec<u32>>>) -> Self {
        Self {
            id,
            dropped: Rc::clone(dropped),
        }
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.dropped.borrow_mut().push(self.id);
    }
}
