//! Debug-only reentrancy check.
//!
//! Probing calls user code through `K: Hash` and `K: Eq`. If that code
//! reaches back into the same map (only possible through raw pointers or
//! interior mutability) the slot table may be observed mid-update. In debug
//! builds the check panics and names both operations; in release builds it
//! compiles to nothing.

use core::cell::Cell;
use core::marker::PhantomData;

/// Per-map tracker of the public operation currently running, if any.
#[derive(Debug)]
pub(crate) struct ReentrancyCheck {
    #[cfg(debug_assertions)]
    active: Cell<Option<&'static str>>,
    // Same auto traits in every profile: Send, !Sync.
    _not_sync: PhantomData<Cell<()>>,
}

impl ReentrancyCheck {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            active: Cell::new(None),
            _not_sync: PhantomData,
        }
    }

    /// Marks `op` as running until the returned guard is dropped.
    #[inline]
    pub(crate) fn enter(&self, op: &'static str) -> OperationGuard<'_> {
        #[cfg(debug_assertions)]
        {
            if let Some(outer) = self.active.get() {
                panic!("reentrant call to `{op}` while `{outer}` is probing the map");
            }
            self.active.set(Some(op));
            return OperationGuard { owner: self };
        }

        #[cfg(not(debug_assertions))]
        {
            let _ = op;
            return OperationGuard {
                _owner: PhantomData,
            };
        }
    }
}

// A clone is a new map; nothing is running on it yet.
impl Clone for ReentrancyCheck {
    fn clone(&self) -> Self {
        Self::new()
    }
}

pub(crate) struct OperationGuard<'a> {
    #[cfg(debug_assertions)]
    owner: &'a ReentrancyCheck,
    #[cfg(not(debug_assertions))]
    _owner: PhantomData<&'a ReentrancyCheck>,
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        self.owner.active.set(None);
    }
}
