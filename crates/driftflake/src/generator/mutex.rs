#[cfg(feature = "parking-lot")]
pub(crate) use parking_lot::{Mutex, MutexGuard};
#[cfg(not(feature = "parking-lot"))]
pub(crate) use std::sync::{Mutex, MutexGuard};

#[cfg(feature = "cache-padded")]
pub(crate) type StateCell<T> = crossbeam_utils::CachePadded<Mutex<T>>;
#[cfg(not(feature = "cache-padded"))]
pub(crate) type StateCell<T> = Mutex<T>;

pub(crate) fn new_cell<T>(value: T) -> StateCell<T> {
    #[cfg(feature = "cache-padded")]
    {
        crossbeam_utils::CachePadded::new(Mutex::new(value))
    }
    #[cfg(not(feature = "cache-padded"))]
    {
        Mutex::new(value)
    }
}

/// Locks the generator state.
///
/// A `std` mutex is poisoned when a thread panics while holding it. Nothing
/// between lock and unlock can panic halfway through a state update, so the
/// guarded state is always consistent and the poison flag is ignored.
pub(crate) fn lock<T>(cell: &StateCell<T>) -> MutexGuard<'_, T> {
    #[cfg(feature = "parking-lot")]
    {
        cell.lock()
    }
    #[cfg(not(feature = "parking-lot"))]
    {
        cell.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
