//! Exactly-once initialization shared by all instances of a provider kind.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, OnceLock, PoisonError};

/// Runs a fallible initializer at most once successfully and hands every
/// caller the same value.
///
/// Concurrent callers block until the running initializer finishes and then
/// observe its value instead of running their own. A failed initializer
/// leaves the guard empty, so the next caller tries again.
///
/// The guard is an ordinary value: a provider kind owns one behind an `Arc`
/// and passes it to every constructor that needs the shared state.
pub struct InitGuard<T> {
    value: OnceLock<T>,
    init_lock: Mutex<()>,
    runs: AtomicUsize,
}

impl<T> InitGuard<T> {
    pub const fn new() -> Self {
        Self {
            value: OnceLock::new(),
            init_lock: Mutex::new(()),
            runs: AtomicUsize::new(0),
        }
    }

    /// Returns the stored value, running `init` first if nothing is stored.
    ///
    /// # Errors
    /// Returns the initializer's error; the guard stays uninitialized.
    pub fn get_or_try_init<E>(&self, init: impl FnOnce() -> Result<T, E>) -> Result<&T, E> {
        if let Some(value) = self.value.get() {
            return Ok(value);
        }

        // A panic inside a previous initializer leaves nothing stored, so the
        // poisoned lock carries no broken state.
        let _lock = self
            .init_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(value) = self.value.get() {
            return Ok(value);
        }

        self.runs.fetch_add(1, Ordering::SeqCst);
        let value = init()?;
        Ok(self.value.get_or_init(|| value))
    }

    /// The stored value, if initialization already succeeded
    pub fn get(&self) -> Option<&T> {
        self.value.get()
    }

    pub fn is_initialized(&self) -> bool {
        self.value.get().is_some()
    }

    /// Number of times an initializer was started (successful or not)
    pub fn init_attempts(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

impl<T> Default for InitGuard<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for InitGuard<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InitGuard")
            .field("initialized", &self.is_initialized())
            .field("init_attempts", &self.init_attempts())
            .finish()
    }
}
