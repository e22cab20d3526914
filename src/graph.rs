use crate::mc::VertexSet;
use rayon::prelude::*;
use std::borrow::Borrow;
use std::ops::Range;

pub type VInt = u32;
pub type Vertex = VInt;
pub type Edge = (Vertex, Vertex);

/// Simple undirected graph with bit-parallel adjacency.
///
/// `order` maps the graph's internal vertex ids (used for all search-time
/// computation) back to the ids the graph was originally constructed with;
/// a freshly built graph carries the identity. Reordered and complemented
/// graphs keep composing with it so that reported results always land in the
/// original numbering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Graph {
    adjacency: Vec<VertexSet>,
    order: Vec<Vertex>,
    n_edges: usize,
}

impl Graph {
    /// Make a graph from an edge list.
    ///
    /// Endpoints must lie in `0..n`. Loop edges are removed and duplicate
    /// edges are merged.
    pub fn from_edges<E>(n: usize, edges: E) -> Graph
    where
        E: IntoIterator,
        E::Item: Borrow<Edge>,
    {
        let mut adjacency = vec![VertexSet::empty(n); n];
        for e in edges {
            let &(s, t) = e.borrow();
            if (s as usize) >= n || (t as usize) >= n {
                panic!("Edge ({s}, {t}) is out of range for {n} vertices");
            }
            if s == t {
                continue; // Remove loops
            }
            adjacency[s as usize].insert(t);
            adjacency[t as usize].insert(s);
        }

        let degree_sum: usize = adjacency.iter().map(|a| a.count()).sum();

        Graph {
            adjacency,
            order: (0..n as Vertex).collect(),
            n_edges: degree_sum / 2,
        }
    }

    pub fn num_vertices(&self) -> usize {
        self.adjacency.len()
    }

    /// Returns the number of undirected edges.
    pub fn num_edges(&self) -> usize {
        self.n_edges
    }

    pub fn vertices(&self) -> Range<Vertex> {
        0..(self.adjacency.len() as Vertex)
    }

    pub fn degree(&self, v: Vertex) -> usize {
        self.adjacency[v as usize].count()
    }

    pub fn neighbor_set(&self, v: Vertex) -> &VertexSet {
        &self.adjacency[v as usize]
    }

    pub fn density(&self) -> f64 {
        let n = self.num_vertices();
        if n < 2 {
            return 0.0;
        }
        2.0 * self.n_edges as f64 / (n as f64 * (n - 1) as f64)
    }

    /// Toggles every adjacency bit except self-loops.
    ///
    /// A maximum independent set of `self` is a maximum clique of the
    /// complement, so independent-set mode runs the clique search here.
    pub fn complement(&self) -> Graph {
        let n = self.num_vertices();
        let adjacency: Vec<VertexSet> = self
            .adjacency
            .par_iter()
            .enumerate()
            .map(|(v, nbrs)| {
                let mut row = nbrs.clone();
                row.invert();
                row.remove(v as Vertex);
                row
            })
            .collect();

        Graph {
            adjacency,
            order: self.order.clone(),
            n_edges: n * n.saturating_sub(1) / 2 - self.n_edges,
        }
    }

    /// Produces a new Graph whose internal id `i` corresponds to `order[i]`
    /// of `self`. The stored permutation is composed, so results still
    /// translate to the ids `self` was built with.
    pub fn change_order(&self, order: &[Vertex]) -> Graph {
        let n = self.num_vertices();
        assert_eq!(order.len(), n, "Ordering must cover every vertex");

        // inverse permutation: old internal id -> new internal id
        let mut inv = vec![Vertex::MAX; n];
        for (i, &v) in order.iter().enumerate() {
            assert!(
                (v as usize) < n && inv[v as usize] == Vertex::MAX,
                "Ordering is not a permutation at position {i} (vertex {v})"
            );
            inv[v as usize] = i as Vertex;
        }

        let adjacency: Vec<VertexSet> = order
            .par_iter()
            .map(|&old| {
                let mut row = VertexSet::empty(n);
                for u in self.adjacency[old as usize].iter() {
                    row.insert(inv[u as usize]);
                }
                row
            })
            .collect();

        Graph {
            adjacency,
            order: order
                .iter()
                .map(|&v| self.order[v as usize])
                .collect(),
            n_edges: self.n_edges,
        }
    }

    pub fn original_id(&self, v: Vertex) -> Vertex {
        self.order[v as usize]
    }

    /// Maps internal ids to the original numbering, ascending.
    pub fn convert_back(&self, vs: &[Vertex]) -> Vec<Vertex> {
        let mut out: Vec<Vertex> =
            vs.iter().map(|&v| self.order[v as usize]).collect();
        out.sort_unstable();
        out
    }

    pub fn convert_back_set(&self, vs: &VertexSet) -> Vec<Vertex> {
        let mut out: Vec<Vertex> =
            vs.iter().map(|v| self.order[v as usize]).collect();
        out.sort_unstable();
        out
    }
}

/// Checks that `vs` names pairwise-adjacent, distinct internal vertices.
pub fn check_clique(g: &Graph, vs: &[Vertex]) -> Result<(), String> {
    for (i, &v) in vs.iter().enumerate() {
        if (v as usize) >= g.num_vertices() {
            return Err(format!("Vertex {v} is out of range"));
        }
        for &u in &vs[(i + 1)..] {
            if u == v {
                return Err(format!("Vertex {v} appears twice"));
            }
            if !g.neighbor_set(v).contains(u) {
                return Err(format!("Vertices {v} and {u} are not adjacent"));
            }
        }
    }
    Ok(())
}
