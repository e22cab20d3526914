use std::ops::{Deref, DerefMut};
use std::sync::Mutex;

////////////////////////////////////////////////////////////////////////////////
//
// Pool
//
////////////////////////////////////////////////////////////////////////////////

/// Cheap clear invoked on every borrow.
pub trait Reset {
    fn reset(&mut self);
}

/// Object pool for per-task scratch resources.
///
/// A mutex-guarded free list; steady-state borrow/return is a stack
/// pop/push, and construction runs only on pool exhaustion. Borrowed items
/// return on guard drop.
pub struct Pool<T: Reset> {
    free: Mutex<Vec<T>>,
    make: Box<dyn Fn() -> T + Send + Sync>,
}

impl<T: Reset> Pool<T> {
    pub fn new<F>(make: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Pool {
            free: Mutex::new(vec![]),
            make: Box::new(make),
        }
    }

    pub fn borrow(&self) -> PoolGuard<'_, T> {
        let popped = self.free.lock().unwrap().pop();
        let mut item = popped.unwrap_or_else(|| (self.make)());
        item.reset();
        PoolGuard {
            pool: self,
            item: Some(item),
        }
    }

    pub fn idle_count(&self) -> usize {
        self.free.lock().unwrap().len()
    }
}

pub struct PoolGuard<'a, T: Reset> {
    pool: &'a Pool<T>,
    item: Option<T>,
}

impl<T: Reset> Deref for PoolGuard<'_, T> {
    type Target = T;
    fn deref(&self) -> &T {
        self.item.as_ref().unwrap()
    }
}

impl<T: Reset> DerefMut for PoolGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.item.as_mut().unwrap()
    }
}

impl<T: Reset> Drop for PoolGuard<'_, T> {
    fn drop(&mut self) {
        let item = self.item.take().unwrap();
        self.pool.free.lock().unwrap().push(item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering::SeqCst};
    use std::sync::Arc;

    struct Scratch(Vec<u32>);

    impl Reset for Scratch {
        fn reset(&mut self) {
            self.0.clear();
        }
    }

    #[test]
    fn test_grows_only_on_exhaustion() {
        let made = Arc::new(AtomicUsize::new(0));
        let made2 = made.clone();
        let pool = Pool::new(move || {
            made2.fetch_add(1, SeqCst);
            Scratch(vec![])
        });

        {
            let _a = pool.borrow();
            let _b = pool.borrow();
            assert_eq!(made.load(SeqCst), 2);
        }
        assert_eq!(pool.idle_count(), 2);

        // Returned items are reused, not reconstructed
        let c = pool.borrow();
        assert_eq!(made.load(SeqCst), 2);
        drop(c);
    }

    #[test]
    fn test_reset_on_borrow() {
        let pool = Pool::new(|| Scratch(vec![]));
        {
            let mut a = pool.borrow();
            a.0.push(7);
        }
        let b = pool.borrow();
        assert!(b.0.is_empty());
    }
}
