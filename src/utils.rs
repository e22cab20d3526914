use itertools::Itertools;
use std::time::{Duration, Instant};

//------------------------------------------------------------------------------
//
// Traits
//
//------------------------------------------------------------------------------

pub trait IsOrdered: Iterator {
    /// Equivalent of `Iterator::is_sorted()` in the nightly build.
    ///
    /// Replace with `std`'s implementation when it become stable.
    /// Note that renaming this with `is_sorted` raises a warning of
    /// "unstable_name_collisions". This can be suppressed only by callers.
    fn is_ordered(self) -> bool
    where
        Self: Sized,
        Self::Item: Clone + Ord,
    {
        self.tuple_windows().all(|(x, y)| x <= y)
    }
}

impl<I: Iterator> IsOrdered for I {}

//------------------------------------------------------------------------------
//
// Misc.
//
//------------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct Timer {
    duration: Duration,
    start: Instant,
}

impl Timer {
    pub fn started(duration: Duration) -> Self {
        Timer {
            duration,
            start: Instant::now(),
        }
    }

    pub fn is_over(&self) -> bool {
        self.duration <= self.start.elapsed()
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

//------------------------------------------------------------------------------
//
// Tests
//
//------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_ordered() {
        assert!([0, 1, 1, 4].iter().is_ordered());
        assert!(![1, 0, 2].iter().is_ordered());
        assert!(std::iter::empty::<u32>().is_ordered());
    }

    #[test]
    fn test_timer() {
        let t = Timer::started(Duration::from_secs(3600));
        assert!(!t.is_over());
        let t = Timer::started(Duration::ZERO);
        assert!(t.is_over());
    }
}
