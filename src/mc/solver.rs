use super::options::SearchOptions;
use super::ordering::vertex_order;
use super::scheduler;
use super::session::{SearchSession, SearchStats};
use crate::graph::{check_clique, Graph, Vertex};
use crate::utils::Timer;
use log::{debug, info};

////////////////////////////////////////////////////////////////////////////////
//
// MaxClique
//
////////////////////////////////////////////////////////////////////////////////

/// Result of one solver run, reported in the original vertex numbering.
#[derive(Clone, Debug)]
pub struct Solution {
    pub clique: Vec<Vertex>,
    pub size: usize,
    /// False iff the wall clock expired: the clique is the best found, not
    /// a certified optimum.
    pub proven: bool,
    pub stats: SearchStats,
    pub search_secs: f64,
}

/// Facade tying preprocessing, the search session, and the worker pool
/// together for one graph.
pub struct MaxClique<'a> {
    g: &'a Graph,
    opt: SearchOptions,
}

impl<'a> MaxClique<'a> {
    pub fn new(g: &'a Graph, opt: SearchOptions) -> Self {
        MaxClique { g, opt }
    }

    pub fn solve(&self) -> Solution {
        debug!("reordering vertices: {}", self.opt.ordering);
        let order = vertex_order(self.g, self.opt.ordering);
        let h = self.g.change_order(&order);

        let session = SearchSession::new(Timer::started(self.opt.timeout));
        let stats = scheduler::run(&h, &session, self.opt.parallelism);

        let internal = session.best_clique();
        debug_assert!(check_clique(&h, &internal).is_ok());
        let clique = h.convert_back(&internal);
        let proven = !session.timed_out();

        info!(
            "clique of size {} found ({}, {} nodes)",
            clique.len(),
            if proven { "proven" } else { "time limit" },
            stats.nodes,
        );

        Solution {
            size: clique.len(),
            clique,
            proven,
            stats,
            search_secs: session.elapsed().as_secs_f64(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Edge;
    use crate::mc::OrderingMethod;

    fn solve_with(g: &Graph, ordering: OrderingMethod) -> Solution {
        let opt = SearchOptions {
            ordering,
            ..Default::default()
        };
        MaxClique::new(g, opt).solve()
    }

    #[test]
    fn test_reports_original_ids_under_any_ordering() {
        // The only triangle is {2, 4, 5}
        let g = Graph::from_edges(
            6,
            [(0, 2), (2, 4), (2, 5), (4, 5), (1, 3)],
        );
        for ordering in [
            OrderingMethod::Natural,
            OrderingMethod::Degree,
            OrderingMethod::Degeneracy,
        ] {
            let sol = solve_with(&g, ordering);
            assert_eq!(sol.size, 3);
            assert_eq!(sol.clique, vec![2, 4, 5]);
            assert!(sol.proven);
        }
    }

    #[test]
    fn test_independent_set_via_complement() {
        // C5 is self-complementary: both modes answer 2
        let c5: Vec<Edge> =
            vec![(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)];
        let g = Graph::from_edges(5, &c5);
        assert_eq!(solve_with(&g, OrderingMethod::Degeneracy).size, 2);
        assert_eq!(
            solve_with(&g.complement(), OrderingMethod::Degeneracy).size,
            2
        );
    }

    #[test]
    fn test_zero_timeout_is_unproven() {
        let g = Graph::from_edges(3, [(0, 1), (1, 2), (2, 0)]);
        let opt = SearchOptions {
            timeout: std::time::Duration::ZERO,
            ..Default::default()
        };
        let sol = MaxClique::new(&g, opt).solve();
        assert!(!sol.proven);
        assert!(sol.size <= 3);
    }
}
