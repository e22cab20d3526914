use super::coloring::{is_independent, ColorClasses};
use super::filter::{ConflictFilter, Filtering};
use super::pool::Reset;
use super::session::{SearchSession, SearchStats};
use super::vertex_set::VertexSet;
use crate::graph::{Graph, Vertex};
use log::trace;

////////////////////////////////////////////////////////////////////////////////
//
// Task
//
////////////////////////////////////////////////////////////////////////////////

/// A self-contained subtree of the search.
///
/// `branch` holds the branching roots of the window; `below` holds every
/// live candidate smaller than the window. Subtrees are keyed by their
/// maximum extension vertex, so disjoint windows over the same `prefix`
/// partition the remaining work exactly.
pub struct Task {
    pub prefix: Vec<Vertex>,
    pub branch: VertexSet,
    pub below: VertexSet,
}

impl Task {
    pub fn depth(&self) -> usize {
        self.prefix.len()
    }

    /// The root task: every vertex is a branching root.
    pub fn root(g: &Graph) -> Task {
        let n = g.num_vertices();
        Task {
            prefix: vec![],
            branch: VertexSet::full(n),
            below: VertexSet::empty(n),
        }
    }
}

/// Receiver for split-off subtrees.
pub trait TaskSink {
    /// True when idle capacity exists and a split would be consumed soon.
    fn starved(&self) -> bool;
    fn submit(&self, task: Task);
}

/// Sink of the purely sequential walk; never asks for splits.
pub struct NoSplit;

impl TaskSink for NoSplit {
    fn starved(&self) -> bool {
        false
    }
    fn submit(&self, _: Task) {
        unreachable!("sequential walk never splits");
    }
}

////////////////////////////////////////////////////////////////////////////////
//
// SearchState
//
////////////////////////////////////////////////////////////////////////////////

enum Walk {
    Improved,
    Exhausted,
    Aborted,
}

struct Level {
    branch: VertexSet,
    pruned: VertexSet,
    fresh: VertexSet,
}

impl Level {
    fn new(n: usize) -> Self {
        Level {
            branch: VertexSet::empty(n),
            pruned: VertexSet::empty(n),
            fresh: VertexSet::empty(n),
        }
    }
}

/// Private scratch of one search task.
///
/// The level arena is sized once to the vertex count (recursion depth never
/// exceeds it), so nothing reallocates during the search. `u[v]` bounds the
/// largest clique that ends at `v` within the task's candidate prefix; it
/// only ever tightens.
pub struct SearchState {
    k: Vec<Vertex>,
    u: Vec<u32>,
    levels: Vec<Level>,
    colors: ColorClasses,
    filter: ConflictFilter,
    pub stats: SearchStats,
}

impl SearchState {
    pub fn new(n: usize) -> Self {
        SearchState {
            k: Vec::with_capacity(n),
            u: vec![0; n],
            levels: (0..=n).map(|_| Level::new(n)).collect(),
            colors: ColorClasses::new(n),
            filter: ConflictFilter::new(n),
            stats: SearchStats::default(),
        }
    }

    fn prepare(&mut self, task: &Task, base_u: &[u32]) {
        self.k.clear();
        self.k.extend_from_slice(&task.prefix);
        self.u.copy_from_slice(base_u);
        self.levels[0].branch.copy_from(&task.branch);
        self.levels[0].pruned.copy_from(&task.below);
        self.stats = SearchStats::default();
    }

    /// Runs `task` to exhaustion, restarting its subtree after every
    /// incumbent improvement. Pruned siblings stay pruned across restarts
    /// because the incumbent is monotone.
    pub fn run_task(
        &mut self,
        g: &Graph,
        session: &SearchSession,
        sink: &dyn TaskSink,
        task: &Task,
        base_u: &[u32],
    ) {
        self.prepare(task, base_u);
        self.stats.tasks_run += 1;
        loop {
            match self.walk(g, session, sink, 0) {
                Walk::Improved => continue,
                Walk::Exhausted | Walk::Aborted => break,
            }
        }
        debug_assert_eq!(self.k.len(), task.prefix.len());
    }

    fn move_to_pruned(&mut self, depth: usize, bi: Vertex) {
        let lv = &mut self.levels[depth];
        lv.branch.remove(bi);
        lv.pruned.insert(bi);
    }

    /// `fresh = pruned ∩ N(bi) ∩ {< bi}` — every live candidate below `bi`
    /// is in the pruned set by the time `bi` branches. Returns the refined
    /// per-vertex bound computed from the same window.
    fn refresh_window(&mut self, g: &Graph, depth: usize, bi: Vertex) -> u32 {
        let lv = &mut self.levels[depth];
        lv.pruned
            .intersection_before_into(g.neighbor_set(bi), bi, &mut lv.fresh);

        let mut best = 0;
        for p in lv.fresh.iter() {
            best = best.max(self.u[p as usize]);
        }
        let refined = best + 1;

        // Only the task root sees its whole candidate prefix; deeper values
        // are node-local and must not be stored.
        if depth == 0 && refined < self.u[bi as usize] {
            self.u[bi as usize] = refined;
        }
        refined.min(self.u[bi as usize])
    }

    fn tighten_u(&mut self, depth: usize, bi: Vertex, bound: u32) {
        if depth == 0 && bound < self.u[bi as usize] {
            self.u[bi as usize] = bound;
        }
    }

    /// Hands the upper half of the remaining window to an idle worker.
    fn try_split(
        &mut self,
        sink: &dyn TaskSink,
        depth: usize,
        cursor: Vertex,
    ) {
        let lv = &mut self.levels[depth];
        let m = lv.branch.count();
        if m < 3 {
            return; // current root plus at least two splittable siblings
        }
        let rest = m - 1;
        let keep = rest - rest / 2;
        let Some(s) = lv.branch.iter_from(cursor).nth(keep) else {
            return;
        };

        let mut branch = lv.branch.clone();
        branch.remove_before(s);
        let mut below = lv.branch.clone();
        below.remove_from(s);
        below.union_with(&lv.pruned);
        lv.branch.remove_from(s);

        trace!("split window from {s} at depth {}", self.k.len());
        sink.submit(Task {
            prefix: self.k.clone(),
            branch,
            below,
        });
        self.stats.tasks_split += 1;
    }

    fn walk(
        &mut self,
        g: &Graph,
        session: &SearchSession,
        sink: &dyn TaskSink,
        depth: usize,
    ) -> Walk {
        self.stats.nodes += 1;
        let mut cursor: Vertex = 0;

        loop {
            if session.deadline_passed() {
                return Walk::Aborted;
            }

            let Some(bi) = self.levels[depth].branch.first_from(cursor)
            else {
                return Walk::Exhausted;
            };
            cursor = bi + 1;

            if sink.starved() {
                self.try_split(sink, depth, cursor);
            }

            let mut kmax = session.best_len();
            let klen = self.k.len();

            if self.u[bi as usize] as usize + klen <= kmax {
                self.stats.pruned_bound += 1;
                self.move_to_pruned(depth, bi);
                continue;
            }

            let refined = self.refresh_window(g, depth, bi);
            if refined as usize + klen <= kmax {
                self.stats.pruned_bound += 1;
                self.move_to_pruned(depth, bi);
                continue;
            }

            if self.levels[depth].fresh.is_empty() {
                // Leaf: one vertex is added per call, so an improvement is
                // complete here and reported upward immediately.
                if klen + 1 > kmax {
                    self.k.push(bi);
                    let improved = session.try_improve(&self.k);
                    self.k.pop();
                    if improved {
                        self.stats.improvements += 1;
                        return Walk::Improved;
                    }
                }
                self.move_to_pruned(depth, bi);
                continue;
            }

            // k-partite detection: an independent candidate window can
            // contribute at most one vertex, so no coloring is needed
            if is_independent(g, &self.levels[depth].fresh) {
                if klen + 2 > kmax {
                    self.k.push(bi);
                    let w = self.levels[depth].fresh.first().unwrap();
                    self.k.push(w);
                    let improved = session.try_improve(&self.k);
                    self.k.pop();
                    self.k.pop();
                    if improved {
                        self.stats.improvements += 1;
                        return Walk::Improved;
                    }
                }
                self.tighten_u(depth, bi, 2);
                self.move_to_pruned(depth, bi);
                continue;
            }

            if klen + 1 > kmax {
                // `bi` plus any live neighbor already beats the incumbent
                self.k.push(bi);
                let improved = session.try_improve(&self.k);
                self.k.pop();
                if improved {
                    self.stats.improvements += 1;
                    return Walk::Improved;
                }
                kmax = session.best_len();
            }

            let need = kmax - klen;
            let t = {
                let lv = &self.levels[depth];
                self.colors.partition(g, &lv.fresh)
            };

            if t < need {
                self.stats.pruned_color += 1;
                self.tighten_u(depth, bi, t as u32 + 1);
                self.move_to_pruned(depth, bi);
                continue;
            }

            let verdict = if t == need {
                let (colors, filter) = (&mut self.colors, &mut self.filter);
                filter.filt_sat(
                    g,
                    colors,
                    &mut self.levels[depth].fresh,
                    need,
                    &mut self.stats,
                )
            } else {
                self.filter.satcol(g, &self.colors, need, &mut self.stats)
            };

            if verdict == Filtering::Pruned {
                self.stats.pruned_filter += 1;
                self.tighten_u(depth, bi, need as u32);
                self.move_to_pruned(depth, bi);
                continue;
            }

            // Recurse on the filtered window
            {
                let (lo, hi) = self.levels.split_at_mut(depth + 1);
                hi[0].branch.copy_from(&lo[depth].fresh);
                hi[0].pruned.clear();
            }
            self.k.push(bi);
            let r = self.walk(g, session, sink, depth + 1);
            self.k.pop();

            match r {
                Walk::Improved => return Walk::Improved,
                Walk::Aborted => return Walk::Aborted,
                Walk::Exhausted => self.move_to_pruned(depth, bi),
            }
        }
    }
}

impl Reset for SearchState {
    fn reset(&mut self) {
        // `prepare` overwrites the rest per task
        self.k.clear();
        self.stats = SearchStats::default();
    }
}

/// Baseline per-vertex bounds: a clique ending at `v` cannot exceed the
/// windowed degree of `v`, nor `v + 1`.
pub fn base_bounds(g: &Graph) -> Vec<u32> {
    g.vertices()
        .map(|v| {
            let below = g.neighbor_set(v).count_before(v) as u32;
            (below + 1).min(v + 1)
        })
        .collect()
}

////////////////////////////////////////////////////////////////////////////////
//
// Tests
//
////////////////////////////////////////////////////////////////////////////////
