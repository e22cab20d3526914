use maxclq::graph::{check_clique, Edge, Graph, Vertex};
use maxclq::mc::{MaxClique, OrderingMethod, SearchOptions, Solution};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn solve(g: &Graph, workers: usize) -> Solution {
    let opt = SearchOptions {
        parallelism: workers,
        ..Default::default()
    };
    MaxClique::new(g, opt).solve()
}

fn random_graph(n: usize, p: f64, rng: &mut StdRng) -> Graph {
    let mut edges: Vec<Edge> = vec![];
    for s in 0..n as Vertex {
        for t in (s + 1)..n as Vertex {
            if rng.gen_bool(p) {
                edges.push((s, t));
            }
        }
    }
    Graph::from_edges(n, edges)
}

/// Exact reference by subset dynamic programming; usable up to ~20
/// vertices.
fn brute_force_size(g: &Graph) -> usize {
    let n = g.num_vertices();
    assert!(n <= 20);
    let adj: Vec<u32> = (0..n as Vertex)
        .map(|v| {
            g.neighbor_set(v)
                .iter()
                .fold(0u32, |m, u| m | (1 << u))
        })
        .collect();

    // is_clique[mask] = is_clique[mask \ {v}] && (mask \ {v}) ⊆ N(v)
    let mut is_clique = vec![false; 1 << n];
    let mut best = 0;
    is_clique[0] = true;
    for mask in 1u32..(1 << n) {
        let v = mask.trailing_zeros() as usize;
        let rest = mask & (mask - 1);
        if is_clique[rest as usize] && (rest & !adj[v]) == 0 {
            is_clique[mask as usize] = true;
            best = best.max(mask.count_ones() as usize);
        }
    }
    best
}

#[test]
fn complete_graph_k5() {
    let mut edges = vec![];
    for s in 0..5 {
        for t in (s + 1)..5 {
            edges.push((s, t));
        }
    }
    let g = Graph::from_edges(5, edges);
    let sol = solve(&g, 1);
    assert_eq!(sol.size, 5);
    assert_eq!(sol.clique, vec![0, 1, 2, 3, 4]);
    assert!(sol.proven);
}

#[test]
fn path_graph_p4() {
    let g = Graph::from_edges(4, [(0, 1), (1, 2), (2, 3)]);
    let sol = solve(&g, 1);
    assert_eq!(sol.size, 2);
    assert!(check_clique(&g, &sol.clique).is_ok());
}

#[test]
fn two_disjoint_triangles() {
    let g = Graph::from_edges(
        6,
        [(0, 1), (0, 2), (1, 2), (3, 4), (3, 5), (4, 5)],
    );
    let sol = solve(&g, 1);
    assert_eq!(sol.size, 3);
    assert!(check_clique(&g, &sol.clique).is_ok());
}

#[test]
fn five_cycle_both_modes() {
    let g = Graph::from_edges(5, [(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)]);
    // C5 is self-complementary: clique number 2 directly and as an
    // independent set of the original
    assert_eq!(solve(&g, 1).size, 2);
    assert_eq!(solve(&g.complement(), 1).size, 2);
}

#[test]
fn thread_counts_agree_on_size() {
    let mut rng = StdRng::seed_from_u64(11);
    let g = random_graph(40, 0.5, &mut rng);

    let seq = solve(&g, 1);
    let par = solve(&g, 4);
    assert!(check_clique(&g, &seq.clique).is_ok());
    assert!(check_clique(&g, &par.clique).is_ok());
    assert_eq!(seq.size, par.size);
    assert!(seq.proven && par.proven);
}

#[test]
fn matches_brute_force_on_random_graphs() {
    let mut rng = StdRng::seed_from_u64(5);
    let orderings = [
        OrderingMethod::Natural,
        OrderingMethod::Degree,
        OrderingMethod::Degeneracy,
    ];

    for round in 0..30 {
        let n = 8 + (round % 7);
        let p = [0.2, 0.5, 0.8][round % 3];
        let g = random_graph(n, p, &mut rng);
        let expect = brute_force_size(&g);

        let opt = SearchOptions {
            ordering: orderings[round % orderings.len()],
            parallelism: 1 + (round % 2) * 3,
            ..Default::default()
        };
        let sol = MaxClique::new(&g, opt).solve();

        assert_eq!(
            sol.size, expect,
            "size mismatch on round {round} (n = {n}, p = {p})"
        );
        assert_eq!(sol.size, sol.clique.len());
        assert!(check_clique(&g, &sol.clique).is_ok());
        assert!(sol.proven);
    }
}

#[test]
fn independent_set_mode_matches_brute_force() {
    let mut rng = StdRng::seed_from_u64(17);
    for round in 0..10 {
        let g = random_graph(10 + round % 4, 0.5, &mut rng);
        let c = g.complement();
        let sol = solve(&c, 1);
        // The clique on the complement is an independent set of `g`
        assert_eq!(sol.size, brute_force_size(&c));
        for (i, &v) in sol.clique.iter().enumerate() {
            for &u in &sol.clique[(i + 1)..] {
                assert!(!g.neighbor_set(v).contains(u));
            }
        }
    }
}

#[test]
fn dense_random_graph_is_proven() {
    let mut rng = StdRng::seed_from_u64(23);
    let g = random_graph(50, 0.9, &mut rng);
    let sol = solve(&g, 4);
    assert!(sol.proven);
    assert!(check_clique(&g, &sol.clique).is_ok());
    // A 0.9-dense graph on 50 vertices has a large clique
    assert!(sol.size >= 10);
}
