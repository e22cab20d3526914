use criterion::{black_box, criterion_group, criterion_main, Criterion};
use maxclq::graph::{Edge, Graph, Vertex};
use maxclq::mc::{MaxClique, SearchOptions};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_graph(n: usize, p: f64, seed: u64) -> Graph {
    let mut rng = StdRng::seed_from_u64(seed);
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

fn bench_search(c: &mut Criterion) {
    let sparse = random_graph(120, 0.3, 7);
    let dense = random_graph(60, 0.7, 7);

    c.bench_function("clique_n120_p30", |b| {
        b.iter(|| {
            let sol =
                MaxClique::new(black_box(&sparse), SearchOptions::default())
                    .solve();
            black_box(sol.size)
        })
    });

    c.bench_function("clique_n60_p70", |b| {
        b.iter(|| {
            let sol =
                MaxClique::new(black_box(&dense), SearchOptions::default())
                    .solve();
            black_box(sol.size)
        })
    });

    let mut par = c.benchmark_group("parallel");
    for workers in [1usize, 4] {
        par.bench_function(format!("n60_p70_w{workers}"), |b| {
            let opt = SearchOptions {
                parallelism: workers,
                ..Default::default()
            };
            b.iter(|| {
                black_box(MaxClique::new(&dense, opt.clone()).solve().size)
            })
        });
    }
    par.finish();
}

criterion_group!(benches, bench_search);
criterion_main!(benches);
