use crate::graph::{Graph, Vertex};
use clap::ValueEnum;
use derive_more::Display;
use serde::Serialize;

//------------------------------------------------------------------------------
//
// Ordering selection
//
//------------------------------------------------------------------------------

/// Vertex-reordering heuristic applied before the search.
///
/// Correctness never depends on the choice; only the pruning strength of
/// the windowed bounds does.
#[derive(
    Clone, Copy, Debug, Display, PartialEq, Eq, Serialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OrderingMethod {
    /// Keep the input numbering.
    #[display(fmt = "natural")]
    Natural,
    /// Ascending degree, so dense vertices branch late with rich windows.
    #[display(fmt = "degree")]
    Degree,
    /// Reverse of the min-degree elimination order; every vertex then has
    /// at most the degeneracy many neighbors before it.
    #[display(fmt = "degeneracy")]
    Degeneracy,
}

/// `order[i]` is the vertex of `g` to place at internal position `i`.
pub fn vertex_order(g: &Graph, method: OrderingMethod) -> Vec<Vertex> {
    match method {
        OrderingMethod::Natural => g.vertices().collect(),
        OrderingMethod::Degree => {
            let mut vs: Vec<Vertex> = g.vertices().collect();
            vs.sort_by_key(|&v| (g.degree(v), v));
            vs
        }
        OrderingMethod::Degeneracy => {
            let mut ord = degeneracy_order(g);
            ord.reverse();
            ord
        }
    }
}

//------------------------------------------------------------------------------
//
// k-core decomposition
//
//------------------------------------------------------------------------------

//
// Bin-bucket core decomposition [Batagelj and Zaversnik, CoRR'03];
// returns the removal order, minimum remaining degree first.
//
pub fn degeneracy_order(g: &Graph) -> Vec<Vertex> {
    let n = g.num_vertices();
    if n == 0 {
        return vec![];
    }

    let mut deg: Vec<usize> =
        (0..n).map(|v| g.degree(v as Vertex)).collect();
    let md = *deg.iter().max().unwrap();

    // bin[d] = first index of the degree-d section of `vert`
    let mut bin = vec![0usize; md + 1];
    for &d in &deg {
        bin[d] += 1;
    }
    let mut start = 0;
    for b in bin.iter_mut() {
        let count = *b;
        *b = start;
        start += count;
    }

    let mut vert = vec![0 as Vertex; n];
    let mut pos = vec![0usize; n];
    {
        let mut next = bin.clone();
        for v in 0..n {
            pos[v] = next[deg[v]];
            vert[pos[v]] = v as Vertex;
            next[deg[v]] += 1;
        }
    }

    for i in 0..n {
        let v = vert[i] as usize;
        for u in g.neighbor_set(v as Vertex).iter() {
            let u = u as usize;
            if deg[u] > deg[v] {
                let du = deg[u];
                let pu = pos[u];
                let pw = bin[du];
                let w = vert[pw] as usize;
                if u != w {
                    vert.swap(pu, pw);
                    pos.swap(u, w);
                }
                bin[du] += 1;
                deg[u] -= 1;
            }
        }
    }

    vert
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;

    fn assert_permutation(order: &[Vertex], n: usize) {
        assert_eq!(order.len(), n);
        assert_eq!(order.iter().unique().count(), n);
        assert!(order.iter().all(|&v| (v as usize) < n));
    }

    #[test]
    fn test_natural_and_degree() {
        //    v0
        //   /  \
        //  v1--v2--v3
        let g = Graph::from_edges(4, [(0, 1), (0, 2), (1, 2), (2, 3)]);
        assert_eq!(
            vertex_order(&g, OrderingMethod::Natural),
            vec![0, 1, 2, 3]
        );
        // Degrees: 2, 2, 3, 1
        assert_eq!(
            vertex_order(&g, OrderingMethod::Degree),
            vec![3, 0, 1, 2]
        );
    }

    #[test]
    fn test_degeneracy_prefix_property() {
        // Triangle with a pendant: degeneracy 2
        let g = Graph::from_edges(4, [(0, 1), (0, 2), (1, 2), (2, 3)]);
        let ord = vertex_order(&g, OrderingMethod::Degeneracy);
        assert_permutation(&ord, 4);

        // In the reordered graph every vertex has at most two earlier
        // neighbors
        let h = g.change_order(&ord);
        for v in h.vertices() {
            assert!(h.neighbor_set(v).count_before(v) <= 2);
        }
        // The pendant vertex is eliminated first, so it lands last
        assert_eq!(*ord.last().unwrap(), 3);
    }

    #[test]
    fn test_degeneracy_with_isolated_vertices() {
        let g = Graph::from_edges(5, [(1, 2), (2, 3), (3, 1)]);
        let removal = degeneracy_order(&g);
        assert_permutation(&removal, 5);
        // Isolated vertices leave before the triangle
        let late: Vec<Vertex> = removal[2..].to_vec();
        assert_eq!(late.iter().sorted().cloned().collect_vec(), vec![1, 2, 3]);
    }

    #[test]
    fn test_star_degeneracy() {
        // Star K_{1,3}: 1-degenerate
        let g = Graph::from_edges(4, [(0, 1), (0, 2), (0, 3)]);
        let ord = vertex_order(&g, OrderingMethod::Degeneracy);
        let h = g.change_order(&ord);
        for v in h.vertices() {
            assert!(h.neighbor_set(v).count_before(v) <= 1);
        }
    }
}
