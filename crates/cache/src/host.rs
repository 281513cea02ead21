//! Host-supplied collaborators that the cache consults but does not own

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Source of the host's "suspend cache additions" flag.
///
/// Only `add` consults it; `set` and `replace` always write.
pub trait WriteSuspension: Send + Sync {
    fn writes_suspended(&self) -> bool;
}

/// Default source: additions are never suspended.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverSuspended;

impl WriteSuspension for NeverSuspended {
    fn writes_suspended(&self) -> bool {
        false
    }
}

impl WriteSuspension for AtomicBool {
    fn writes_suspended(&self) -> bool {
        self.load(Ordering::Acquire)
    }
}

impl<T: WriteSuspension + ?Sized> WriteSuspension for Arc<T> {
    fn writes_suspended(&self) -> bool {
        (**self).writes_suspended()
    }
}
