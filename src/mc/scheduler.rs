use super::pool::Pool;
use super::search::{base_bounds, SearchState, Task, TaskSink};
use super::session::{SearchSession, SearchStats};
use crate::graph::Graph;
use crossbeam_channel::Sender;
use log::{debug, trace};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::atomic::Ordering::Relaxed;
use std::sync::atomic::AtomicUsize;
use std::sync::{Condvar, Mutex};
use std::thread;

////////////////////////////////////////////////////////////////////////////////
//
// TaskQueue
//
////////////////////////////////////////////////////////////////////////////////

struct QueuedTask {
    depth: usize,
    seq: u64,
    task: Task,
}

impl PartialEq for QueuedTask {
    fn eq(&self, other: &Self) -> bool {
        self.depth == other.depth && self.seq == other.seq
    }
}

impl Eq for QueuedTask {}

impl PartialOrd for QueuedTask {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedTask {
    /// Deeper tasks first; FIFO by submission sequence among equals.
    fn cmp(&self, other: &Self) -> Ordering {
        self.depth
            .cmp(&other.depth)
            .then(other.seq.cmp(&self.seq))
    }
}

struct QueueInner {
    heap: BinaryHeap<QueuedTask>,
    seq: u64,
    in_flight: usize,
    shutdown: bool,
}

/// Depth-ordered task queue shared by the worker set.
///
/// Completion requires the queue to be empty *and* no task to be mid-flight;
/// a task not yet returned may still submit splits.
pub struct TaskQueue {
    inner: Mutex<QueueInner>,
    available: Condvar,
    idle: Condvar,
    approx_len: AtomicUsize,
}

impl TaskQueue {
    pub fn new() -> Self {
        TaskQueue {
            inner: Mutex::new(QueueInner {
                heap: BinaryHeap::new(),
                seq: 0,
                in_flight: 0,
                shutdown: false,
            }),
            available: Condvar::new(),
            idle: Condvar::new(),
            approx_len: AtomicUsize::new(0),
        }
    }

    pub fn push(&self, task: Task) {
        let mut q = self.inner.lock().unwrap();
        let seq = q.seq;
        q.seq += 1;
        q.heap.push(QueuedTask {
            depth: task.depth(),
            seq,
            task,
        });
        self.approx_len.store(q.heap.len(), Relaxed);
        self.available.notify_one();
    }

    /// Blocks for the next task; `None` once shut down with nothing queued.
    fn next(&self) -> Option<Task> {
        let mut q = self.inner.lock().unwrap();
        loop {
            if let Some(qt) = q.heap.pop() {
                q.in_flight += 1;
                self.approx_len.store(q.heap.len(), Relaxed);
                return Some(qt.task);
            }
            if q.shutdown {
                return None;
            }
            q = self.available.wait(q).unwrap();
        }
    }

    fn task_done(&self) {
        let mut q = self.inner.lock().unwrap();
        q.in_flight -= 1;
        if q.heap.is_empty() && q.in_flight == 0 {
            self.idle.notify_all();
        }
    }

    /// Blocks until the queue is drained and every worker is between tasks.
    pub fn wait_idle(&self) {
        let mut q = self.inner.lock().unwrap();
        while !(q.heap.is_empty() && q.in_flight == 0) {
            q = self.idle.wait(q).unwrap();
        }
    }

    pub fn shutdown(&self) {
        let mut q = self.inner.lock().unwrap();
        q.shutdown = true;
        self.available.notify_all();
    }

    pub fn approx_empty(&self) -> bool {
        self.approx_len.load(Relaxed) == 0
    }
}

struct WorkerSink<'a> {
    queue: &'a TaskQueue,
    parallel: bool,
}

impl TaskSink for WorkerSink<'_> {
    fn starved(&self) -> bool {
        self.parallel && self.queue.approx_empty()
    }

    fn submit(&self, task: Task) {
        self.queue.push(task);
    }
}

////////////////////////////////////////////////////////////////////////////////
//
// Worker pool
//
////////////////////////////////////////////////////////////////////////////////

fn worker(
    g: &Graph,
    session: &SearchSession,
    base_u: &[u32],
    queue: &TaskQueue,
    pool: &Pool<SearchState>,
    parallel: bool,
    results: Sender<SearchStats>,
) {
    let sink = WorkerSink { queue, parallel };
    let mut local = SearchStats::default();

    while let Some(task) = queue.next() {
        trace!("task at depth {} picked up", task.depth());
        let mut state = pool.borrow();
        state.run_task(g, session, &sink, &task, base_u);
        local.merge(&state.stats);
        queue.task_done();
    }

    // Diagnostic counters are task-local and merged once per worker
    results.send(local).ok();
}

/// Explores the whole search tree of `g` with `workers` threads.
///
/// The initial task is the entire root loop; running workers split their
/// remaining branch windows whenever the queue runs dry. Teardown drains
/// the queue and joins every worker before the pooled scratch is released.
pub fn run(
    g: &Graph,
    session: &SearchSession,
    workers: usize,
) -> SearchStats {
    let workers = workers.max(1);
    let n = g.num_vertices();
    let base_u = base_bounds(g);
    let queue = TaskQueue::new();
    let pool: Pool<SearchState> = Pool::new(move || SearchState::new(n));
    let (tx, rx) = crossbeam_channel::unbounded();

    thread::scope(|sc| {
        for _ in 0..workers {
            let tx = tx.clone();
            let (queue, pool, base_u) = (&queue, &pool, &base_u);
            sc.spawn(move || {
                worker(g, session, base_u, queue, pool, workers > 1, tx)
            });
        }

        queue.push(Task::root(g));
        queue.wait_idle();
        queue.shutdown();
    });
    drop(tx);

    let mut stats = SearchStats::default();
    for s in rx.try_iter() {
        stats.merge(&s);
    }
    debug!(
        "search finished: nodes = {}, tasks = {} ({} split)",
        stats.nodes, stats.tasks_run, stats.tasks_split,
    );
    stats
}

////////////////////////////////////////////////////////////////////////////////
//
// Tests
//
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{check_clique, Vertex};
    use crate::mc::vertex_set::VertexSet;
    use crate::utils::Timer;
    use std::time::Duration;

    fn dummy_task(depth: usize, mark: Vertex) -> Task {
        Task {
            prefix: vec![0; depth],
            branch: VertexSet::from_vertices(8, [mark]),
            below: VertexSet::empty(8),
        }
    }

    #[test]
    fn test_queue_orders_by_depth_then_fifo() {
        let q = TaskQueue::new();
        q.push(dummy_task(0, 0));
        q.push(dummy_task(2, 1));
        q.push(dummy_task(0, 2));
        q.push(dummy_task(2, 3));

        // Deeper first; FIFO by submission among equal depths
        let marks: Vec<Vertex> = (0..4)
            .map(|_| q.next().unwrap().branch.first().unwrap())
            .collect();
        assert_eq!(marks, vec![1, 3, 0, 2]);

        for _ in 0..4 {
            q.task_done();
        }
        q.wait_idle();
        q.shutdown();
        assert!(q.next().is_none());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        // Two disjoint triangles plus a pendant edge
        let g = Graph::from_edges(
            8,
            [
                (0, 1),
                (0, 2),
                (1, 2),
                (3, 4),
                (3, 5),
                (4, 5),
                (5, 6),
                (6, 7),
            ],
        );

        let mut sizes = vec![];
        for workers in [1, 4] {
            let session =
                SearchSession::new(Timer::started(Duration::from_secs(60)));
            let stats = run(&g, &session, workers);
            let best: Vec<Vertex> = session.best_clique();
            assert!(check_clique(&g, &best).is_ok());
            assert!(stats.nodes > 0);
            sizes.push(best.len());
        }
        assert_eq!(sizes, vec![3, 3]);
    }
}
