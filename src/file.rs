use crate::graph::{Edge, Graph};
use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::path::Path;

pub fn open<P: AsRef<Path>>(path: P) -> File {
    File::open(&path)
        .unwrap_or_else(|_| panic!("Cannot open: {}", path.as_ref().display()))
}

/// Reads a graph in DIMACS clique/coloring text format.
///
/// `c` lines are comments, `p edge <n> <m>` (or `p col ...`) declares the
/// vertex count, and `e <u> <v>` lines carry 1-based endpoints. Malformed
/// input is fatal with the offending line number.
pub fn read_dimacs_graph<P: AsRef<Path>>(path: P) -> Graph {
    let name = path.as_ref().display().to_string();
    parse_dimacs(BufReader::new(open(&path)), &name)
}

fn parse_dimacs<R: BufRead>(r: R, name: &str) -> Graph {
    let mut n: Option<usize> = None;
    let mut edges: Vec<Edge> = vec![];

    for (i, line) in r.lines().enumerate() {
        let lineno = i + 1;
        let line =
            line.unwrap_or_else(|_| panic!("Cannot read '{name}'"));
        let s = line.trim();
        if s.is_empty() {
            continue;
        }

        let mut tokens = s.split_whitespace();
        match tokens.next().unwrap() {
            "c" => (),
            "p" => {
                if n.is_some() {
                    panic!("Duplicate problem line at line {lineno} of '{name}'");
                }
                let _format = tokens.next().unwrap_or_else(|| {
                    panic!("Malformed problem line at line {lineno} of '{name}'")
                });
                let nv: usize = tokens
                    .next()
                    .and_then(|x| x.parse().ok())
                    .unwrap_or_else(|| {
                        panic!(
                            "Cannot parse the vertex count at line {lineno} \
                            of '{name}'"
                        )
                    });
                n = Some(nv);
            }
            "e" => {
                let nv = n.unwrap_or_else(|| {
                    panic!(
                        "Edge before the problem line at line {lineno} of \
                        '{name}'"
                    )
                });
                let mut endpoint = || -> usize {
                    tokens
                        .next()
                        .and_then(|x| x.parse().ok())
                        .unwrap_or_else(|| {
                            panic!(
                                "Cannot parse an edge endpoint at line \
                                {lineno} of '{name}'"
                            )
                        })
                };
                let (u, v) = (endpoint(), endpoint());
                if u == 0 || u > nv || v == 0 || v > nv {
                    panic!(
                        "Edge endpoint out of 1..={nv} at line {lineno} of \
                        '{name}'"
                    );
                }
                edges.push(((u - 1) as u32, (v - 1) as u32));
            }
            _ => panic!("Unrecognized line {lineno} of '{name}'"),
        }
    }

    let n =
        n.unwrap_or_else(|| panic!("Missing problem line in '{name}'"));
    Graph::from_edges(n, edges)
}
