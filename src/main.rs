use clap::Parser;
use env_logger::{Builder, Env};
use itertools::Itertools;
use maxclq::file::read_dimacs_graph;
use maxclq::mc::{MaxClique, OrderingMethod, SearchOptions};
use serde::Serialize;
use std::io::Write;
use std::time::Duration;

/// Exact maximum-clique solver with coloring and propagation bounds
#[derive(Parser, Debug, Serialize)]
#[command(author, version, about)]
struct Args {
    /// Search a maximum independent set instead (clique on the complement)
    #[arg(short, long, default_value_t = false)]
    independent_set: bool,

    /// Vertex-reordering heuristic
    #[arg(short, long, value_enum, default_value = "degeneracy")]
    ordering: OrderingMethod,

    /// Wall-clock limit in seconds ('0' disables the limit)
    #[arg(short, long, default_value_t = 0)]
    timeout: u64,

    /// Number of worker threads
    #[arg(short, long, default_value_t = SearchOptions::default().parallelism)]
    parallelism: usize,

    /// Print detailed search counters
    #[arg(long, default_value_t = SearchOptions::default().probe)]
    probe: bool,

    /// Graph file in DIMACS clique format
    graph: String,
}

fn init_logger() {
    Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = buf.timestamp_micros();
            writeln!(
                buf,
                "[{} {:?} {} {}] {}",
                ts,
                std::thread::current().id(),
                record.level(),
                record.module_path().unwrap_or(""),
                record.args()
            )
        })
        .init();
}

fn main() {
    init_logger();

    let args = Args::parse();

    println!("---");
    println!("command: {}", std::env::args().join(" "));
    serde_yaml::to_writer(std::io::stdout(), &args).unwrap();

    let g = read_dimacs_graph(&args.graph);
    let g = if args.independent_set {
        g.complement()
    } else {
        g
    };

    let opt = SearchOptions {
        ordering: args.ordering,
        timeout: if args.timeout == 0 {
            Duration::from_secs(u64::MAX)
        } else {
            Duration::from_secs(args.timeout)
        },
        parallelism: args.parallelism,
        probe: args.probe,
    };

    let sol = MaxClique::new(&g, opt).solve();

    println!("result:");
    println!("  size: {}", sol.size);
    println!("  proven: {}", sol.proven);
    println!("  members: [{}]", sol.clique.iter().join(", "));
    println!("  search_sec: {}", sol.search_secs);

    if args.probe {
        let probe = serde_yaml::to_string(&sol.stats).unwrap();
        println!("probe:");
        for line in probe.lines() {
            println!("  {line}");
        }
    }
}
