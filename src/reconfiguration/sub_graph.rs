//! ## Safe path
//!
//! A depth-first witness over a [`FeasibilityGraph`](super::feasibility_graph::FeasibilityGraph)-annotated
//! [`RatingGraph`](super::rating_graph::RatingGraph): one `(node, taken
//! job)` hop per level from the root to a feasible leaf, every edge of
//! which the overlay certified admits a deadline-safe completion. The
//! graph cutter walks this to decide, for each node it touches, which job
//! is "the" safe one to anchor a cut on.

use crate::ids::JobIndex;
use crate::reconfiguration::rating_graph::RatingNodeIndex;

#[derive(Clone, Debug, Default)]
pub struct SafePath {
    hops: Vec<(RatingNodeIndex, JobIndex)>,
}

impl SafePath {
    pub fn new(hops: Vec<(RatingNodeIndex, JobIndex)>) -> Self {
        Self { hops }
    }

    pub fn hops(&self) -> &[(RatingNodeIndex, JobIndex)] {
        &self.hops
    }

    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }

    /// The job this path takes out of `node`, if the path visits it.
    pub fn taken_job_at(&self, node: RatingNodeIndex) -> Option<JobIndex> {
        self.hops.iter().find(|(n, _)| *n == node).map(|(_, j)| *j)
    }

    pub fn contains_node(&self, node: RatingNodeIndex) -> bool {
        self.hops.iter().any(|(n, _)| *n == node)
    }

    /// The dispatch order this path witnesses, for
    /// [`crate::feasibility::ordering_generator::enforce_safe_job_ordering`].
    pub fn job_ordering(&self) -> Vec<JobIndex> {
        self.hops.iter().map(|(_, j)| *j).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taken_job_at_looks_up_by_node() {
        let path = SafePath::new(vec![
            (RatingNodeIndex(0), JobIndex(2)),
            (RatingNodeIndex(1), JobIndex(0)),
        ]);
        assert_eq!(path.taken_job_at(RatingNodeIndex(1)), Some(JobIndex(0)));
        assert_eq!(path.taken_job_at(RatingNodeIndex(5)), None);
        assert_eq!(path.job_ordering(), vec![JobIndex(2), JobIndex(0)]);
    }
}
