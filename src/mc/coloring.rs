use super::vertex_set::VertexSet;
use crate::graph::{Graph, Vertex};

////////////////////////////////////////////////////////////////////////////////
//
// ColorClasses
//
////////////////////////////////////////////////////////////////////////////////

/// Per-task scratch for the greedy coloring bound.
///
/// A candidate set is partitioned into independent-set color classes; no
/// clique can take two vertices from one class, so the class count bounds
/// the size of any clique extension inside the set. Class storage grows to
/// the high-water mark of one task and is reused across search nodes.
pub struct ColorClasses {
    classes: Vec<VertexSet>,
    color_of: Vec<u32>,
    n_classes: usize,
    remaining: VertexSet,
    pool: VertexSet,
    universe: usize,
}

impl ColorClasses {
    pub fn new(n: usize) -> Self {
        ColorClasses {
            classes: vec![],
            color_of: vec![0; n],
            n_classes: 0,
            remaining: VertexSet::empty(n),
            pool: VertexSet::empty(n),
            universe: n,
        }
    }

    pub fn len(&self) -> usize {
        self.n_classes
    }

    pub fn class(&self, c: usize) -> &VertexSet {
        debug_assert!(c < self.n_classes);
        &self.classes[c]
    }

    pub fn color_of(&self, v: Vertex) -> u32 {
        self.color_of[v as usize]
    }

    /// Greedy sequential coloring of `cand`.
    ///
    /// Repeatedly extracts a maximal independent subset of the remaining
    /// candidates: scan ascending, keep a member, drop its neighbors from
    /// the pool. Returns the number of classes formed; the classes
    /// partition `cand` exactly.
    pub fn partition(&mut self, g: &Graph, cand: &VertexSet) -> usize {
        debug_assert_eq!(g.num_vertices(), self.universe);

        self.n_classes = 0;
        self.remaining.copy_from(cand);

        while !self.remaining.is_empty() {
            if self.classes.len() == self.n_classes {
                self.classes.push(VertexSet::empty(self.universe));
            }
            let class = &mut self.classes[self.n_classes];
            class.clear();

            self.pool.copy_from(&self.remaining);
            while let Some(v) = self.pool.first() {
                class.insert(v);
                self.color_of[v as usize] = self.n_classes as u32;
                self.pool.remove(v);
                self.pool.difference_with(g.neighbor_set(v));
            }

            self.remaining.difference_with(class);
            self.n_classes += 1;
        }

        self.n_classes
    }

    /// Moves `v` into the lowest class `< below` that has no neighbor of
    /// `v`, if any. Used to rebuild a valid coloring after the conflict
    /// filter removed vertices.
    pub fn try_reseat(&mut self, g: &Graph, v: Vertex, below: usize) -> bool {
        debug_assert!(below <= self.n_classes);
        debug_assert!(self.classes[self.color_of[v as usize] as usize]
            .contains(v));

        for c in 0..below {
            if !self.classes[c].intersects(g.neighbor_set(v)) {
                let old = self.color_of[v as usize] as usize;
                self.classes[old].remove(v);
                self.classes[c].insert(v);
                self.color_of[v as usize] = c as u32;
                return true;
            }
        }
        false
    }

    /// Drops `v` from its class. The caller is responsible for removing it
    /// from the candidate set as well.
    pub fn expel(&mut self, v: Vertex) {
        let c = self.color_of[v as usize] as usize;
        debug_assert!(self.classes[c].contains(v));
        self.classes[c].remove(v);
    }
}

/// The k-partite detection: is the whole of `set` one color class?
pub fn is_independent(g: &Graph, set: &VertexSet) -> bool {
    set.iter().all(|v| !set.intersects(g.neighbor_set(v)))
}

////////////////////////////////////////////////////////////////////////////////
//
// Tests
//
////////////////////////////////////////////////////////////////////////////////
