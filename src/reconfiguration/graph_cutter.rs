//! ## Graph cutter
//!
//! Turns a rating graph plus a safe-path witness into a list of [`Cut`]s:
//! local branching restrictions that, once enforced as precedence
//! constraints, prune the unsafe completions below a node while keeping
//! at least one safe one open.
//!
//! DFS from the root, visiting each node once (the rating graph is a DAG
//! but merges make sharing possible, so revisits are skipped rather than
//! re-processed). At every visited node with outgoing edges, a child
//! whose rating is strictly below the largest sibling rating *and* which
//! the feasibility overlay marks infeasible is a forbidden candidate; a
//! child reached by the safe path, or with rating `1.0`, is safe; anyone
//! else is merely allowed. A cut is only emitted for nodes the safe path
//! actually visits — cuts elsewhere in the DFS would have no anchor job
//! to hang a new precedence constraint off of.
//!
//! Open question (tie-break when two safe paths would disagree on which
//! job is "the" safe one at a node): resolved by taking whichever safe
//! path was supplied — this cutter only ever sees one at a time, so there
//! is no tie to break; callers wanting a different witness re-run with
//! [`crate::reconfiguration::feasibility_graph::FeasibilityGraph::try_to_find_random_safe_path`].

use crate::ids::JobIndex;
use crate::reconfiguration::feasibility_graph::FeasibilityGraph;
use crate::reconfiguration::rating_graph::{RatingGraph, RatingNodeIndex};
use crate::reconfiguration::sub_graph::SafePath;

/// `safe ∪ allowed ∪ forbidden == successors(node)`, pairwise disjoint.
#[derive(Clone, Debug)]
pub struct Cut {
    pub node: RatingNodeIndex,
    pub safe_jobs: Vec<JobIndex>,
    pub allowed_jobs: Vec<JobIndex>,
    pub forbidden_jobs: Vec<JobIndex>,
}

fn child_rating(rating_graph: &RatingGraph, child: RatingNodeIndex) -> f32 {
    if rating_graph.nodes[child.0].is_bottom() {
        0.0
    } else {
        rating_graph.nodes[child.0].rating()
    }
}

/// Derives cuts from `rating_graph` (sorted by parent) and `feasibility`,
/// anchored at the nodes `safe_path` visits.
pub fn cut_rating_graph(rating_graph: &RatingGraph, feasibility: &FeasibilityGraph, safe_path: &SafePath) -> Vec<Cut> {
    let mut visited = vec![false; rating_graph.nodes.len()];
    let mut cuts = Vec::new();
    let mut stack = vec![rating_graph.root()];

    while let Some(node) = stack.pop() {
        if visited[node.0] {
            continue;
        }
        visited[node.0] = true;

        let edges: Vec<_> = rating_graph.edges_from(node).copied().collect();
        if edges.is_empty() {
            continue;
        }

        let max_child_rating = edges.iter().map(|e| child_rating(rating_graph, e.child)).fold(0.0f32, f32::max);
        let safe_taken = safe_path.taken_job_at(node);

        let mut safe_jobs = Vec::new();
        let mut forbidden_jobs = Vec::new();
        let mut allowed_jobs = Vec::new();

        for edge in &edges {
            stack.push(edge.child);

            let rating = child_rating(rating_graph, edge.child);
            let is_safe = Some(edge.taken_job) == safe_taken || rating >= 1.0;
            if is_safe {
                safe_jobs.push(edge.taken_job);
                continue;
            }

            let is_forbidden = rating < max_child_rating && !feasibility.is_node_feasible(edge.child);
            if is_forbidden {
                forbidden_jobs.push(edge.taken_job);
            } else {
                allowed_jobs.push(edge.taken_job);
            }
        }

        if safe_path.contains_node(node) {
            safe_jobs.sort_by_key(|j| j.value());
            safe_jobs.dedup();
            cuts.push(Cut { node, safe_jobs, allowed_jobs, forbidden_jobs });
        }
    }

    cuts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feasibility::simple_bounds::SimpleBounds;
    use crate::ids::JobId;
    use crate::interval::Interval;
    use crate::oracle::explore;
    use crate::problem::{Job, Problem};
    use crate::reconfiguration::rating_graph::RatingGraphAgent;
    use crate::time::DiscreteTime as D;

    fn job(task: u64, jid: u64, r: u64, c: u64, d: u64) -> Job<D> {
        Job::new(JobId::new(task, jid), Interval::new(D(r), D(r)), Interval::new(D(c), D(c)), D(d), 0)
    }

    #[test]
    fn cuts_cover_only_strictly_worse_infeasible_children() {
        // Job 2 is long and, once dispatched before the others, blows the
        // deadline of whichever short job is still pending: at least one
        // branch out of the root should rate strictly worse and end up
        // forbidden rather than safe.
        let problem = Problem::new(
            vec![job(0, 0, 0, 2, 6), job(0, 1, 0, 2, 6), job(0, 2, 0, 5, 6)],
            vec![],
            vec![],
            1,
        );
        let bounds = SimpleBounds::compute(&problem);
        let mut agent = RatingGraphAgent::new();
        explore(&problem, &bounds, &mut agent);
        let mut rating_graph = agent.into_graph();
        rating_graph.compute_ratings();

        let fg = FeasibilityGraph::forward(&rating_graph, &problem, &bounds).backward(&rating_graph);
        assert!(fg.is_node_feasible(rating_graph.root()), "some dispatch order must avoid the deadline miss");

        let safe_path = fg.create_safe_path(&rating_graph);
        let cuts = cut_rating_graph(&rating_graph, &fg, &safe_path);

        assert!(!cuts.is_empty());
        let root_cut = cuts.iter().find(|c| c.node == rating_graph.root()).unwrap();
        assert!(!root_cut.safe_jobs.is_empty());
        for &forbidden in &root_cut.forbidden_jobs {
            assert!(!root_cut.safe_jobs.contains(&forbidden));
            assert!(!root_cut.allowed_jobs.contains(&forbidden));
        }
    }
}
