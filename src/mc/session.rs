use crate::graph::Vertex;
use crate::utils::Timer;
use log::debug;
use serde::Serialize;
use std::sync::atomic::Ordering::SeqCst;
use std::sync::atomic::{AtomicBool, AtomicUsize};
use std::sync::Mutex;

////////////////////////////////////////////////////////////////////////////////
//
// SearchSession
//
////////////////////////////////////////////////////////////////////////////////

/// Shared state of one solver run.
///
/// The incumbent is the only cross-task mutable state of the search; its
/// size is mirrored in an atomic so bound checks never take the lock. All
/// other search state is task-private.
pub struct SearchSession {
    best: Mutex<Vec<Vertex>>,
    best_len: AtomicUsize,
    timed_out: AtomicBool,
    timer: Timer,
}

impl SearchSession {
    pub fn new(timer: Timer) -> Self {
        SearchSession {
            best: Mutex::new(vec![]),
            best_len: AtomicUsize::new(0),
            timed_out: AtomicBool::new(false),
            timer,
        }
    }

    /// Current incumbent size. May be stale by the time it is used, which
    /// only ever weakens pruning, never correctness.
    pub fn best_len(&self) -> usize {
        self.best_len.load(SeqCst)
    }

    /// Installs `clique` as the incumbent iff it is still strictly larger.
    ///
    /// The re-check under the lock is required: another worker may have
    /// installed a larger clique since the caller sized its candidate.
    pub fn try_improve(&self, clique: &[Vertex]) -> bool {
        let mut best = self.best.lock().unwrap();
        if clique.len() > best.len() {
            best.clear();
            best.extend_from_slice(clique);
            self.best_len.store(best.len(), SeqCst);
            debug!("incumbent improved to {}", best.len());
            true
        } else {
            false
        }
    }

    pub fn best_clique(&self) -> Vec<Vertex> {
        self.best.lock().unwrap().clone()
    }

    pub fn deadline_passed(&self) -> bool {
        if self.timer.is_over() {
            self.timed_out.store(true, SeqCst);
            true
        } else {
            false
        }
    }

    pub fn timed_out(&self) -> bool {
        self.timed_out.load(SeqCst)
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.timer.elapsed()
    }
}

////////////////////////////////////////////////////////////////////////////////
//
// SearchStats
//
////////////////////////////////////////////////////////////////////////////////

/// Per-task diagnostic counters, merged at task completion.
///
/// Instrumentation only; no correctness contract.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    pub nodes: u64,
    pub pruned_bound: u64,
    pub pruned_color: u64,
    pub pruned_filter: u64,
    pub filter_conflicts: u64,
    pub filter_removed: u64,
    pub improvements: u64,
    pub tasks_run: u64,
    pub tasks_split: u64,
}

impl SearchStats {
    pub fn merge(&mut self, other: &SearchStats) {
        self.nodes += other.nodes;
        self.pruned_bound += other.pruned_bound;
        self.pruned_color += other.pruned_color;
        self.pruned_filter += other.pruned_filter;
        self.filter_conflicts += other.filter_conflicts;
        self.filter_removed += other.filter_removed;
        self.improvements += other.improvements;
        self.tasks_run += other.tasks_run;
        self.tasks_split += other.tasks_split;
    }
}
