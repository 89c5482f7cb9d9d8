//! One-way `Uninitialized -> Populated` cache used by the registry and the
//! per-driver device lists.

use parking_lot::Mutex;
use std::sync::Arc;

enum CacheState<T: ?Sized> {
    Uninitialized,
    Populated(Arc<T>),
}

pub(crate) struct PopulateOnce<T: ?Sized> {
    state: Mutex<CacheState<T>>,
}

impl<T: ?Sized> PopulateOnce<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(CacheState::Uninitialized),
        }
    }

    /// Returns the cached value, running `populate` first if the cache is
    /// still empty.
    ///
    /// The lock is held while `populate` runs, so concurrent first callers
    /// wait for a single population instead of racing. A failed population
    /// leaves the cache uninitialized and the next call tries again.
    pub fn get_or_try_populate<E, F>(&self, populate: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Result<Arc<T>, E>,
    {
        let mut state = self.state.lock();
        if let CacheState::Populated(value) = &*state {
            return Ok(Arc::clone(value));
        }

        let value = populate()?;
        *state = CacheState::Populated(Arc::clone(&value));
        Ok(value)
    }

    pub fn is_populated(&self) -> bool {
        matches!(&*self.state.lock(), CacheState::Populated(_))
    }
}

impl<T: ?Sized> Default for PopulateOnce<T> {
    fn default() -> Self {
        Self::new()
    }
}
