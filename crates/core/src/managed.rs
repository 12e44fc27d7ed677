//! Managed payloads: the backend memory interface
//!
//! Shared-ownership payloads (owned text, arrays, closures, records, data
//! constructors, foreign objects) are held through [`Managed<T>`]. The value
//! type only ever copies (`Clone`), moves, and drops a `Managed`, and builds new
//! ones through [`make_managed`]; it never learns which strategy is active.
//!
//! # Strategies
//!
//! Selected at build time:
//! - default: `std::rc::Rc`, non-atomic counts (single-threaded evaluation)
//! - `atomic-refcount` feature: `std::sync::Arc`
//!
//! Under both, a copy adds exactly one to the count and a drop removes one;
//! the payload is released once, when the count reaches zero.
//!
//! The feature selects the counting strategy only. A `Managed` is `Send` and
//! `Sync` exactly when its `Backing` is, so a payload that is itself not
//! thread-safe (a `RefCell`, an unbounded `dyn` trait object) stays on its
//! thread under either strategy.
//!
//! Every payload is wrapped in [`Tracked`] so that creation and release are
//! reported to [`memory_stats`](crate::memory_stats).

use crate::memory_stats;
use std::fmt;
use std::ops::Deref;

#[cfg(not(feature = "atomic-refcount"))]
#[doc(hidden)]
pub type Backing<T> = std::rc::Rc<T>;

#[cfg(feature = "atomic-refcount")]
#[doc(hidden)]
pub type Backing<T> = std::sync::Arc<T>;

/// Payload wrapper that reports its own creation and release
#[doc(hidden)]
pub struct Tracked<T: ?Sized> {
    value: T,
}

impl<T> Tracked<T> {
    #[doc(hidden)]
    pub fn new(value: T) -> Self {
        memory_stats::record_allocation();
        Tracked { value }
    }
}

impl<T: ?Sized> Drop for Tracked<T> {
    fn drop(&mut self) {
        memory_stats::record_release();
    }
}

/// Shared-ownership handle to a backend-managed payload
pub struct Managed<T: ?Sized> {
    inner: Backing<Tracked<T>>,
}

/// Wrap a freshly constructed payload
pub fn make_managed<T>(value: T) -> Managed<T> {
    Managed {
        inner: Backing::new(Tracked::new(value)),
    }
}

/// Wrap a payload behind an unsized type (usually a trait object)
///
/// ```ignore
/// let f: Managed<dyn Fn() -> i32> = make_managed_unsized!(|| 7 => dyn Fn() -> i32);
/// ```
#[macro_export]
macro_rules! make_managed_unsized {
    ($value:expr => $target:ty) => {{
        let inner: $crate::managed::Backing<$crate::managed::Tracked<$target>> =
            $crate::managed::Backing::new($crate::managed::Tracked::new($value));
        $crate::managed::Managed::from_backing(inner)
    }};
}

impl<T: ?Sized> Managed<T> {
    #[doc(hidden)]
    pub fn from_backing(inner: Backing<Tracked<T>>) -> Self {
        Managed { inner }
    }

    /// Number of live handles sharing this payload
    pub fn strong_count(this: &Self) -> usize {
        Backing::strong_count(&this.inner)
    }

    /// True when both handles share one payload
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Backing::ptr_eq(&this.inner, &other.inner)
    }

    /// Address of the payload (stable for the payload's lifetime)
    pub fn as_ptr(this: &Self) -> *const () {
        &this.inner.value as *const T as *const ()
    }
}

impl<T: ?Sized> Clone for Managed<T> {
    fn clone(&self) -> Self {
        Managed {
            inner: Backing::clone(&self.inner),
        }
    }
}

impl<T: ?Sized> Deref for Managed<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner.value
    }
}

impl<T: ?Sized> AsRef<T> for Managed<T> {
    fn as_ref(&self) -> &T {
        &self.inner.value
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for Managed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (**self).fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct DropCounter(Rc<Cell<u32>>);

    impl Drop for DropCounter {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn test_clone_increments_count() {
        let a = make_managed(String::from("shared"));
        assert_eq!(Managed::strong_count(&a), 1);

        let b = a.clone();
        assert_eq!(Managed::strong_count(&a), 2);
        assert!(Managed::ptr_eq(&a, &b));

        drop(b);
        assert_eq!(Managed::strong_count(&a), 1);
    }

    #[test]
    fn test_move_keeps_count() {
        let a = make_managed(vec![1, 2, 3]);
        let moved = a;
        assert_eq!(Managed::strong_count(&moved), 1);
        assert_eq!(*moved, vec![1, 2, 3]);
    }

    #[test]
    fn test_payload_released_exactly_once() {
        let drops = Rc::new(Cell::new(0));
        let a = make_managed(DropCounter(drops.clone()));
        let copies: Vec<_> = (0..5).map(|_| a.clone()).collect();
        assert_eq!(Managed::strong_count(&a), 6);

        drop(copies);
        assert_eq!(drops.get(), 0);

        drop(a);
        assert_eq!(drops.get(), 1);
    }

    #[test]
    fn test_unsized_payload() {
        let f: Managed<dyn Fn(i32) -> i32> = make_managed_unsized!(|x: i32| x * 2 => dyn Fn(i32) -> i32);
        assert_eq!(f(21), 42);

        let g = f.clone();
        assert_eq!(Managed::as_ptr(&f), Managed::as_ptr(&g));
    }

    #[cfg(feature = "atomic-refcount")]
    #[test]
    fn test_atomic_backing_follows_payload() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Managed<String>>();
        assert_send_sync::<Managed<Vec<u64>>>();
    }

    #[cfg(feature = "memory-stats")]
    #[test]
    fn test_stats_track_release() {
        let before = memory_stats::thread_stats();
        {
            let a = make_managed(42u64);
            let _b = a.clone();
            let mid = memory_stats::thread_stats().since(&before);
            assert_eq!(mid.allocated, 1);
            assert_eq!(mid.released, 0);
        }
        let delta = memory_stats::thread_stats().since(&before);
        assert_eq!(delta.allocated, 1);
        assert_eq!(delta.released, 1);
    }
}
