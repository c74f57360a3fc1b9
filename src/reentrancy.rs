//! Debug-only reentrancy check.
//!
//! The caller-supplied hash function is user code that runs inside probe
//! loops, and it can reach the store again through `Rc<RefCell<...>>` or
//! similar. None of the store's entry points nest legitimately, so in debug
//! builds re-entering while an operation is active panics immediately. In
//! release builds the check compiles to a no-op.

use core::cell::Cell;
use core::marker::PhantomData;

/// Per-store flag. Guard entry points with
/// `let _g = self.reentrancy.enter();`.
#[derive(Debug)]
pub(crate) struct ReentryCheck {
    #[cfg(debug_assertions)]
    active: Cell<bool>,
    // The store is single-threaded; keep this marker !Send + !Sync.
    _nosend: PhantomData<*mut ()>,
}

impl ReentryCheck {
    pub(crate) const fn new() -> Self {
        ReentryCheck {
            #[cfg(debug_assertions)]
            active: Cell::new(false),
            _nosend: PhantomData,
        }
    }

    #[inline]
    pub(crate) fn enter(&self) -> ReentryGuard<'_> {
        #[cfg(debug_assertions)]
        {
            assert!(
                !self.active.replace(true),
                "reentrant call into HashStore (hash function re-entered the store?)"
            );
        }
        ReentryGuard {
            #[cfg(debug_assertions)]
            check: self,
            #[cfg(not(debug_assertions))]
            _lt: PhantomData,
        }
    }
}

/// RAII guard returned by `ReentryCheck::enter`.
pub(crate) struct ReentryGuard<'a> {
    #[cfg(debug_assertions)]
    check: &'a ReentryCheck,
    #[cfg(not(debug_assertions))]
    _lt: PhantomData<&'a ()>,
}

impl Drop for ReentryGuard<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        self.check.active.set(false);
    }
}
