// Scoped native handles
//
// Pairs a handle with the function that releases it. Used while a
// multi-step construction is in progress: every handle acquired so far is
// released if a later step returns early, and `into_inner` commits the
// handle to its long-lived owner once the whole sequence has succeeded.

use std::fmt;
use std::ops::{Deref, DerefMut};

/// Owns `value` and calls `release(value)` exactly once when dropped.
///
/// Moving a `Guarded` moves the ownership with it; the moved-from binding is
/// statically unusable, so there is no "empty" state to observe. The guard is
/// not `Clone`, so a handle can never be released twice.
pub struct Guarded<T, F>
where
    F: FnOnce(T),
{
    // `None` only after `into_inner` has taken the contents.
    slot: Option<(T, F)>,
}

impl<T, F> Guarded<T, F>
where
    F: FnOnce(T),
{
    pub fn new(value: T, release: F) -> Self {
        Self {
            slot: Some((value, release)),
        }
    }

    /// Disarm the guard and return the handle without releasing it.
    pub fn into_inner(mut self) -> T {
        match self.slot.take() {
            Some((value, _release)) => value,
            None => unreachable!("guard emptied before into_inner"),
        }
    }
}

impl<T, F> Deref for Guarded<T, F>
where
    F: FnOnce(T),
{
    type Target = T;

    fn deref(&self) -> &T {
        match &self.slot {
            Some((value, _)) => value,
            None => unreachable!("guard emptied before deref"),
        }
    }
}

impl<T, F> DerefMut for Guarded<T, F>
where
    F: FnOnce(T),
{
    fn deref_mut(&mut self) -> &mut T {
        match &mut self.slot {
            Some((value, _)) => value,
            None => unreachable!("guard emptied before deref"),
        }
    }
}

impl<T, F> Drop for Guarded<T, F>
where
    F: FnOnce(T),
{
    fn drop(&mut self) {
        if let Some((value, release)) = self.slot.take() {
            release(value);
        }
    }
}

impl<T: fmt::Debug, F> fmt::Debug for Guarded<T, F>
where
    F: FnOnce(T),
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Guarded").field(&**self).finish()
    }
}
