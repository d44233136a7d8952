use std::sync::{Mutex, MutexGuard, PoisonError};

/// Locks a view-state mutex, recovering the guard if a previous holder panicked.
///
/// View state is plain data; a panic mid-update leaves it readable, and the
/// next state transition overwrites whatever was half-written.
pub fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
