//! Lock policies for sinks
//!
//! Every sink keeps its mutable state (file handle, size counter, rotation
//! deadline) behind a lock chosen by a type parameter:
//!
//! - [`MultiThreaded`]: `parking_lot::Mutex`, the sink is `Sync` and can be
//!   shared across threads behind an `Arc`.
//! - [`SingleThreaded`]: [`NullLock`], no mutual exclusion. The sink is `Send`
//!   but not `Sync`, so the compiler rejects sharing it between threads.
//!
//! The guard is held for the whole of `accept` and `flush`, rotation included.
//! Neither lock is re-entrant.

use std::cell::{RefCell, RefMut};
use std::ops::DerefMut;

use parking_lot::{Mutex, MutexGuard};

/// A lock wrapping sink state
pub trait SinkLock<T> {
    /// Scoped guard, released on drop
    type Guard<'a>: DerefMut<Target = T>
    where
        Self: 'a;

    /// Wrap the initial state
    fn new(value: T) -> Self;

    /// Acquire the lock for the duration of the returned guard
    fn lock(&self) -> Self::Guard<'_>;
}

/// Selects the lock type a sink uses for its state
pub trait LockPolicy: 'static {
    /// Lock type for state `T`
    type Lock<T>: SinkLock<T>;
}

/// Real mutual exclusion (safe for concurrent callers)
#[derive(Debug, Clone, Copy, Default)]
pub struct MultiThreaded;

impl LockPolicy for MultiThreaded {
    type Lock<T> = Mutex<T>;
}

/// No-op locking for sinks driven by a single thread
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleThreaded;

impl LockPolicy for SingleThreaded {
    type Lock<T> = NullLock<T>;
}

impl<T> SinkLock<T> for Mutex<T> {
    type Guard<'a>
        = MutexGuard<'a, T>
    where
        Self: 'a;

    #[inline]
    fn new(value: T) -> Self {
        Mutex::new(value)
    }

    #[inline]
    fn lock(&self) -> Self::Guard<'_> {
        Mutex::lock(self)
    }
}

/// Lock that performs no synchronization
///
/// Wraps a `RefCell`, which keeps it `!Sync`. The borrow flag is still
/// checked: acquiring the lock while a guard is alive panics. A sink holds
/// its guard across calls into user code ([`Clock`], [`FilenameCalculator`]),
/// so those must not call back into the same sink. With [`MultiThreaded`]
/// the same re-entry deadlocks instead.
///
/// [`Clock`]: crate::daily::Clock
/// [`FilenameCalculator`]: crate::daily::FilenameCalculator
#[derive(Debug)]
pub struct NullLock<T> {
    cell: RefCell<T>,
}

impl<T> SinkLock<T> for NullLock<T> {
    type Guard<'a>
        = RefMut<'a, T>
    where
        Self: 'a;

    #[inline]
    fn new(value: T) -> Self {
        Self {
            cell: RefCell::new(value),
        }
    }

    #[inline]
    fn lock(&self) -> Self::Guard<'_> {
        self.cell.borrow_mut()
    }
}

#[cfg(test)]
#[path = "lock_test.rs"]
mod lock_test;
