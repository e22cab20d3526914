use super::coloring::ColorClasses;
use super::session::SearchStats;
use super::vertex_set::VertexSet;
use crate::graph::{Graph, Vertex};
use crate::utils::IsOrdered;
use fixedbitset::FixedBitSet;
use log::trace;

////////////////////////////////////////////////////////////////////////////////
//
// ConflictFilter
//
////////////////////////////////////////////////////////////////////////////////

/// Verdict of a filtering pass over one search node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Filtering {
    /// The node cannot reach the claimed bound; do not recurse.
    Pruned,
    /// The node survives; the candidate set may have been shrunk.
    Kept,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ClassState {
    Active,
    /// The class's contribution is decided (its remaining member is forced).
    Fixed,
    /// The class was spent by an earlier conflict of this node.
    Consumed,
}

/// A recorded position in the undo stacks. Everything pushed after the
/// checkpoint is undone by `rollback`.
#[derive(Clone, Copy, Debug)]
struct Checkpoint {
    reduced: usize,
    passive: usize,
    fixed: usize,
}

/// Incremental unit propagation over the color classes of one search node.
///
/// Each class is a one-contributor constraint: a clique extension that
/// reaches the claimed bound must take exactly one vertex from every class.
/// Forcing the sole remaining member of a class removes its non-neighbors
/// from every other active class; cascades that empty a class, or force two
/// non-adjacent vertices, are conflicts. All mutation runs through
/// append-only stacks so that any attempt rolls back to an exact prior
/// state.
pub struct ConflictFilter {
    universe: usize,
    n_loaded: usize,
    members: Vec<VertexSet>,
    count: Vec<u32>,
    state: Vec<ClassState>,
    class_of: Vec<u32>,
    /// Vertices forced in the current transaction stack.
    forced_set: VertexSet,
    /// Processed node ids; ids `>= universe` are the synthetic per-class
    /// nodes recording that a class constraint is settled.
    processed: FixedBitSet,
    /// Member removals, replayed in reverse to restore counts.
    reduced_stack: Vec<(u32, Vertex)>,
    /// Classes deactivated (fixed) since the pass began.
    passive_stack: Vec<u32>,
    /// Node ids marked processed, real and synthetic.
    fixed_stack: Vec<u32>,
    queue: Vec<Vertex>,
    victims: VertexSet,
    snapshot: VertexSet,
    involved: Vec<u32>,
}

impl ConflictFilter {
    pub fn new(n: usize) -> Self {
        ConflictFilter {
            universe: n,
            n_loaded: 0,
            members: vec![],
            count: vec![],
            state: vec![],
            class_of: vec![0; n],
            forced_set: VertexSet::empty(n),
            processed: FixedBitSet::with_capacity(2 * n),
            reduced_stack: vec![],
            passive_stack: vec![],
            fixed_stack: vec![],
            queue: vec![],
            victims: VertexSet::empty(n),
            snapshot: VertexSet::empty(n),
            involved: vec![],
        }
    }

    /// Loads classes `0..k` of `coloring` as the active constraint set.
    fn load(&mut self, coloring: &ColorClasses, k: usize) {
        debug_assert!(k <= coloring.len());

        while self.members.len() < k {
            self.members.push(VertexSet::empty(self.universe));
            self.count.push(0);
            self.state.push(ClassState::Active);
        }

        self.n_loaded = k;
        for c in 0..k {
            self.members[c].copy_from(coloring.class(c));
            let cnt = self.members[c].count();
            debug_assert!(cnt > 0, "loaded an empty color class");
            self.count[c] = cnt as u32;
            self.state[c] = ClassState::Active;
            for v in self.members[c].iter() {
                self.class_of[v as usize] = c as u32;
            }
        }

        self.forced_set.clear();
        self.processed.clear();
        self.reduced_stack.clear();
        self.passive_stack.clear();
        self.fixed_stack.clear();
        self.queue.clear();
    }

    fn begin(&self) -> Checkpoint {
        Checkpoint {
            reduced: self.reduced_stack.len(),
            passive: self.passive_stack.len(),
            fixed: self.fixed_stack.len(),
        }
    }

    /// Replays every mutation after `cp` in reverse.
    fn rollback(&mut self, cp: Checkpoint) {
        assert!(
            cp.reduced <= self.reduced_stack.len()
                && cp.passive <= self.passive_stack.len()
                && cp.fixed <= self.fixed_stack.len(),
            "rollback below a recorded checkpoint"
        );

        while self.reduced_stack.len() > cp.reduced {
            let (c, u) = self.reduced_stack.pop().unwrap();
            self.members[c as usize].insert(u);
            self.count[c as usize] += 1;
        }
        while self.passive_stack.len() > cp.passive {
            let c = self.passive_stack.pop().unwrap() as usize;
            debug_assert_eq!(self.state[c], ClassState::Fixed);
            self.state[c] = ClassState::Active;
        }
        while self.fixed_stack.len() > cp.fixed {
            let id = self.fixed_stack.pop().unwrap() as usize;
            self.processed.set(id, false);
            if id < self.universe {
                self.forced_set.remove(id as Vertex);
            }
        }
        self.queue.clear();
    }

    /// Marks `v` as forced and settles its class. Fails if `v` is not
    /// adjacent to every previously forced vertex.
    fn commit(&mut self, g: &Graph, v: Vertex) -> Result<(), usize> {
        debug_assert!(!self.processed.contains(v as usize));

        let c = self.class_of[v as usize] as usize;
        if !self.forced_set.is_subset(g.neighbor_set(v)) {
            return Err(c);
        }

        assert_eq!(
            self.state[c],
            ClassState::Active,
            "class {c} settled twice in one propagation pass"
        );
        self.state[c] = ClassState::Fixed;
        self.passive_stack.push(c as u32);
        self.processed.insert(self.universe + c);
        self.fixed_stack.push((self.universe + c) as u32);

        self.processed.insert(v as usize);
        self.fixed_stack.push(v);
        self.forced_set.insert(v);
        Ok(())
    }

    /// Forces `v` and unit-propagates to exhaustion.
    ///
    /// On conflict, returns the class at fault; the caller owns the
    /// rollback.
    fn force(&mut self, g: &Graph, v: Vertex) -> Result<(), usize> {
        self.commit(g, v)?;
        self.queue.push(v);

        while let Some(w) = self.queue.pop() {
            for c in 0..self.n_loaded {
                if self.state[c] != ClassState::Active {
                    continue;
                }

                self.members[c]
                    .difference_into(g.neighbor_set(w), &mut self.victims);
                if self.victims.is_empty() {
                    continue;
                }

                while let Some(u) = self.victims.first() {
                    self.victims.remove(u);
                    self.members[c].remove(u);
                    self.count[c] -= 1;
                    self.reduced_stack.push((c as u32, u));
                }

                match self.count[c] {
                    0 => return Err(c),
                    1 => {
                        let last = self.members[c].first().unwrap();
                        debug_assert!(
                            !self.processed.contains(last as usize)
                        );
                        self.commit(g, last)?;
                        self.queue.push(last);
                    }
                    _ => (),
                }
            }
        }

        Ok(())
    }

    /// Commits the propagation of every initial singleton class.
    fn saturate(&mut self, g: &Graph) -> Result<(), usize> {
        for c in 0..self.n_loaded {
            if self.state[c] == ClassState::Active && self.count[c] == 1 {
                let v = self.members[c].first().unwrap();
                self.force(g, v)?;
            }
        }
        Ok(())
    }

    /// Collects the classes settled after `cp` plus the class at fault into
    /// `self.involved`, deduplicated.
    fn collect_involved(&mut self, cp: Checkpoint, fault: usize) {
        self.involved.clear();
        self.involved
            .extend_from_slice(&self.passive_stack[cp.passive..]);
        self.involved.push(fault as u32);
        self.involved.sort_unstable();
        self.involved.dedup();
    }

    fn consume_involved(&mut self) {
        debug_assert!(self.involved.iter().is_ordered());
        for i in 0..self.involved.len() {
            let c = self.involved[i] as usize;
            assert_eq!(
                self.state[c],
                ClassState::Active,
                "class {c} consumed by two conflicts"
            );
            self.state[c] = ClassState::Consumed;
        }
    }

    /// Searches for one conflict among the active classes: saturate the
    /// singletons, then run the failed-vertex test on two-member classes.
    /// Always restores the pre-call member state; only `Consumed` marks
    /// survive (applied by the caller).
    fn find_conflict(&mut self, g: &Graph) -> bool {
        let cp = self.begin();

        if let Err(fault) = self.saturate(g) {
            self.collect_involved(cp, fault);
            self.rollback(cp);
            return true;
        }

        for c in 0..self.n_loaded {
            if self.state[c] != ClassState::Active || self.count[c] != 2 {
                continue;
            }
            let a = self.members[c].first().unwrap();
            let b = self.members[c].last().unwrap();

            let cpa = self.begin();
            let ra = self.force(g, a);
            let mut involved_a = vec![];
            if let Err(fault) = ra {
                self.collect_involved(cpa, fault);
                involved_a = self.involved.clone();
            }
            self.rollback(cpa);
            if involved_a.is_empty() {
                continue;
            }

            let cpb = self.begin();
            let rb = self.force(g, b);
            if let Err(fault) = rb {
                // Both members fail: the class cannot contribute at all.
                // The group spans everything settled since the pass began
                // (the saturated singletons drove both contradictions).
                self.collect_involved(cp, fault);
                self.involved.extend_from_slice(&involved_a);
                self.involved.push(c as u32);
                self.involved.sort_unstable();
                self.involved.dedup();
                self.rollback(cpb);
                self.rollback(cp);
                return true;
            }
            self.rollback(cpb);
        }

        self.rollback(cp);
        false
    }

    //--------------------------------------------------------------------------
    // Entry points
    //--------------------------------------------------------------------------

    /// Bound reduction for a loose coloring (`coloring.len() > need`).
    ///
    /// Counts disjoint conflicts, each consuming its involved classes; the
    /// node prunes when the surviving class count drops below `need`. A
    /// `Kept` verdict leaves the candidate set untouched.
    pub fn satcol(
        &mut self,
        g: &Graph,
        coloring: &ColorClasses,
        need: usize,
        stats: &mut SearchStats,
    ) -> Filtering {
        let t = coloring.len();
        debug_assert!(t >= need);
        self.load(coloring, t);

        let mut conflicts = 0;
        while t - conflicts >= need && self.find_conflict(g) {
            self.consume_involved();
            conflicts += 1;
            stats.filter_conflicts += 1;
            trace!(
                "satcol conflict {}: involved {:?}",
                conflicts,
                self.involved,
            );
        }

        if t - conflicts < need {
            Filtering::Pruned
        } else {
            Filtering::Kept
        }
    }

    /// Failed-vertex elimination for a tight coloring
    /// (`coloring.len() == need`).
    ///
    /// Probes every member of the top class; a probe conflict proves the
    /// member infeasible at the claimed bound and removes it from `cand`
    /// physically. Surviving members are then reseated into lower classes
    /// where legal; a drained top class drops the bound below `need` and
    /// prunes the node.
    pub fn filt_sat(
        &mut self,
        g: &Graph,
        coloring: &mut ColorClasses,
        cand: &mut VertexSet,
        need: usize,
        stats: &mut SearchStats,
    ) -> Filtering {
        debug_assert_eq!(coloring.len(), need);
        debug_assert!(need >= 1);
        self.load(coloring, need);

        // Base propagation is committed once; every probe stacks on top of
        // it instead of re-deriving it.
        if self.saturate(g).is_err() {
            stats.filter_conflicts += 1;
            return Filtering::Pruned;
        }

        let top = need - 1;
        let mut top_remaining = self.count[top] as usize;

        self.snapshot.copy_from(&self.members[top]);
        while let Some(v) = self.snapshot.first() {
            self.snapshot.remove(v);
            if self.processed.contains(v as usize) {
                continue;
            }

            let cp = self.begin();
            let conflicted = self.force(g, v).is_err();
            self.rollback(cp);

            if conflicted {
                trace!("failed vertex {v} removed from the candidate set");
                self.members[top].remove(v);
                self.count[top] -= 1;
                coloring.expel(v);
                cand.remove(v);
                stats.filter_removed += 1;
                top_remaining -= 1;
                if top_remaining == 0 {
                    return Filtering::Pruned;
                }
            }
        }

        // FiltCOL: rebuild a valid coloring for the reduced set.
        self.snapshot.copy_from(&self.members[top]);
        while let Some(v) = self.snapshot.first() {
            self.snapshot.remove(v);
            if coloring.try_reseat(g, v, top) {
                self.members[top].remove(v);
                self.count[top] -= 1;
                top_remaining -= 1;
                if top_remaining == 0 {
                    return Filtering::Pruned;
                }
            }
        }

        Filtering::Kept
    }
}

////////////////////////////////////////////////////////////////////////////////
//
// Tests
//
////////////////////////////////////////////////////////////////////////////////
