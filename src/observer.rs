use core::fmt;

use crate::error::DynArrayError;

/// Signature of an error sink.
///
/// The callback runs synchronously inside the operation that detected the error.
/// It must not mutate or drop the array that invoked it.
pub type ErrorCallback = fn(DynArrayError, ErrorContext);

/// Opaque pointer handed back to the error callback unchanged.
///
/// The array never dereferences it. Turning it back into a reference is the
/// callback's business and requires `unsafe`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ErrorContext(*const ());

// SAFETY: the token is never dereferenced by this crate. Reading through it needs
// `ErrorContext::cast`, whose caller takes over the aliasing and thread obligations.
unsafe impl Send for ErrorContext {}
// SAFETY: see `Send`.
unsafe impl Sync for ErrorContext {}

impl ErrorContext {
    /// Context that carries nothing.
    pub const NULL: ErrorContext = ErrorContext(core::ptr::null());

    /// Wraps a reference to caller-owned state.
    #[must_use]
    pub fn new<T>(state: &T) -> Self {
        ErrorContext(core::ptr::from_ref(state).cast())
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }

    /// Recovers the reference passed to [`ErrorContext::new`].
    ///
    /// # Safety
    ///
    /// The context must have been created from a `&T` that is still alive, and
    /// must not be null.
    #[must_use]
    pub unsafe fn cast<'a, T>(self) -> &'a T {
        // SAFETY: upheld by the caller
        unsafe { &*self.0.cast::<T>() }
    }
}

impl fmt::Debug for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ErrorContext({:p})", self.0)
    }
}

fn ignore_error(_error: DynArrayError, _context: ErrorContext) {}

/// Callback plus context pair installed on an array.
#[derive(Clone, Copy)]
pub struct Observer {
    callback: ErrorCallback,
    context: ErrorContext,
}

impl Observer {
    #[must_use]
    pub fn new(callback: ErrorCallback, context: ErrorContext) -> Self {
        Self { callback, context }
    }

    #[must_use]
    pub fn callback(&self) -> ErrorCallback {
        self.callback
    }

    #[must_use]
    pub fn context(&self) -> ErrorContext {
        self.context
    }

    pub(crate) fn notify(&self, error: DynArrayError) {
        log::debug!("dynarray {}: {}", error.kind_name(), error);
        (self.callback)(error, self.context);
    }
}

impl Default for Observer {
    fn default() -> Self {
        Self::new(ignore_error, ErrorContext::NULL)
    }
}

impl fmt::Debug for Observer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observer")
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}
