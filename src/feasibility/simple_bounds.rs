//! ## Simple bounds
//!
//! #### Model:
//! - Earliest pessimistic start `e[i]`: longest path in the precedence DAG
//!   using `r_max` as the source weight, Kahn-ordered topological
//!   traversal.
//! - Latest safe start `l[i]`: backward propagation from `d[i] - c_max(i)`.
//! - Cycle detection via DFS with a recursion-stack marker, producing a
//!   witness chain; infeasibility witnessed by a greedy backward chain.
//!
//! All of this is linear in `|jobs| + |precedence|`.

use crate::error::FeasibilityError;
use crate::ids::JobIndex;
use crate::problem::{Problem, SignalAt};
use crate::time::TimeValue;

#[derive(Clone, Debug)]
pub struct SimpleBounds<T> {
    earliest_pessimistic_start: Vec<T>,
    latest_safe_start: Vec<T>,
    maximum_suspensions: Vec<T>,
    has_precedence_cycle: bool,
    definitely_infeasible: bool,
    problematic_chain: Vec<JobIndex>,
}

struct Edge<T> {
    to: JobIndex,
    max_suspension: T,
    signal_at: SignalAt,
}

impl<T: TimeValue> SimpleBounds<T> {
    pub fn earliest_pessimistic_start(&self, job: JobIndex) -> T {
        self.earliest_pessimistic_start[job.0]
    }

    pub fn latest_safe_start(&self, job: JobIndex) -> T {
        self.latest_safe_start[job.0]
    }

    pub fn maximum_suspension(&self, job: JobIndex) -> T {
        self.maximum_suspensions[job.0]
    }

    pub fn has_precedence_cycle(&self) -> bool {
        self.has_precedence_cycle
    }

    pub fn definitely_infeasible(&self) -> bool {
        self.definitely_infeasible
    }

    pub fn problematic_chain(&self) -> &[JobIndex] {
        &self.problematic_chain
    }

    /// Computes simple bounds for `problem`. Always returns a value (the
    /// `has_precedence_cycle`/`definitely_infeasible` flags and
    /// `problematic_chain` report the outcome); use [`Self::into_result`]
    /// to turn that into the error-taxonomy shape.
    pub fn compute(problem: &Problem<T>) -> Self {
        let n = problem.num_jobs();
        let mut successors: Vec<Vec<Edge<T>>> = (0..n).map(|_| Vec::new()).collect();
        let mut predecessors: Vec<Vec<JobIndex>> = (0..n).map(|_| Vec::new()).collect();
        let mut in_degree = vec![0usize; n];

        for pc in problem.precedence() {
            let from = pc.from_index().0;
            let to = pc.to_index().0;
            successors[from].push(Edge {
                to: pc.to_index(),
                max_suspension: pc.max_suspension(),
                signal_at: pc.signal_at(),
            });
            predecessors[to].push(pc.from_index());
            in_degree[to] += 1;
        }

        let mut maximum_suspensions = vec![T::zero(); n];
        for (i, edges) in successors.iter().enumerate() {
            for edge in edges {
                maximum_suspensions[i] = maximum_suspensions[i].max(edge.max_suspension);
            }
        }

        let (topo_order, has_cycle) = kahn_topological_order(&successors, in_degree.clone(), n);

        let mut earliest = vec![T::zero(); n];
        for job in problem.workload() {
            earliest[job.index().0] = job.latest_arrival();
        }

        if !has_cycle {
            for &JobIndex(i) in &topo_order {
                for edge in &successors[i] {
                    let completion_cost = match edge.signal_at {
                        SignalAt::Completion => problem.job(JobIndex(i)).max_cost(),
                        SignalAt::Start => T::zero(),
                    };
                    let candidate = earliest[i].saturating_add(edge.max_suspension).saturating_add(completion_cost);
                    let k = edge.to.0;
                    earliest[k] = earliest[k].max(candidate);
                }
            }
        }

        let mut latest = vec![T::zero(); n];
        for job in problem.workload() {
            latest[job.index().0] = job.deadline().saturating_sub(job.max_cost());
        }

        if !has_cycle {
            for &JobIndex(i) in topo_order.iter().rev() {
                for edge in &successors[i] {
                    let completion_cost = match edge.signal_at {
                        SignalAt::Completion => problem.job(JobIndex(i)).max_cost(),
                        SignalAt::Start => T::zero(),
                    };
                    let k = edge.to.0;
                    let bound = latest[k].saturating_sub(edge.max_suspension).saturating_sub(completion_cost);
                    latest[i] = latest[i].min(bound);
                }
            }
        }

        let problematic_chain = if has_cycle {
            find_cycle_witness(&successors, n)
        } else {
            Vec::new()
        };

        let mut definitely_infeasible = false;
        let mut infeasibility_chain = Vec::new();
        if !has_cycle {
            for job in problem.workload() {
                let i = job.index().0;
                if earliest[i].saturating_add(job.max_cost()) > job.deadline() {
                    definitely_infeasible = true;
                    infeasibility_chain = build_critical_chain(JobIndex(i), &earliest, &predecessors, problem);
                    break;
                }
            }
        }

        let problematic_chain = if has_cycle { problematic_chain } else { infeasibility_chain };

        Self {
            earliest_pessimistic_start: earliest,
            latest_safe_start: latest,
            maximum_suspensions,
            has_precedence_cycle: has_cycle,
            definitely_infeasible,
            problematic_chain,
        }
    }

    /// Turns [`Self::compute`]'s best-effort result into the error
    /// taxonomy: `PrecedenceCycle`/`InfeasibleBounds` errors carry the
    /// witness chain, otherwise `Ok` carries the bounds.
    pub fn into_result(self) -> Result<Self, FeasibilityError> {
        if self.has_precedence_cycle {
            Err(FeasibilityError::PrecedenceCycle(self.problematic_chain.clone()))
        } else if self.definitely_infeasible {
            Err(FeasibilityError::InfeasibleBounds(self.problematic_chain.clone()))
        } else {
            Ok(self)
        }
    }
}

fn kahn_topological_order<T>(
    successors: &[Vec<Edge<T>>],
    mut in_degree: Vec<usize>,
    n: usize,
) -> (Vec<JobIndex>, bool) {
    let mut queue: std::collections::VecDeque<usize> =
        (0..n).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(n);

    while let Some(i) = queue.pop_front() {
        order.push(JobIndex(i));
        for edge in &successors[i] {
            let k = edge.to.0;
            in_degree[k] -= 1;
            if in_degree[k] == 0 {
                queue.push_back(k);
            }
        }
    }

    let has_cycle = order.len() != n;
    (order, has_cycle)
}

/// DFS with a recursion-stack marker to extract one witness cycle,
/// returned as `[j, ..., j]` with the repeated index closing the loop.
fn find_cycle_witness<T>(successors: &[Vec<Edge<T>>], n: usize) -> Vec<JobIndex> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        OnStack,
        Done,
    }

    let mut mark = vec![Mark::Unvisited; n];
    let mut stack_path = Vec::new();

    fn visit<T>(
        i: usize,
        successors: &[Vec<Edge<T>>],
        mark: &mut [Mark],
        stack_path: &mut Vec<JobIndex>,
    ) -> Option<Vec<JobIndex>> {
        mark[i] = Mark::OnStack;
        stack_path.push(JobIndex(i));

        for edge in &successors[i] {
            let k = edge.to.0;
            match mark[k] {
                Mark::OnStack => {
                    let start = stack_path.iter().position(|&j| j == JobIndex(k)).unwrap();
                    let mut witness: Vec<JobIndex> = stack_path[start..].to_vec();
                    witness.push(JobIndex(k));
                    return Some(witness);
                }
                Mark::Unvisited => {
                    if let Some(witness) = visit(k, successors, mark, stack_path) {
                        return Some(witness);
                    }
                }
                Mark::Done => {}
            }
        }

        stack_path.pop();
        mark[i] = Mark::Done;
        None
    }

    for i in 0..n {
        if mark[i] == Mark::Unvisited {
            if let Some(witness) = visit(i, successors, &mut mark, &mut stack_path) {
                return witness;
            }
        }
    }

    Vec::new()
}

/// Greedy backward walk from `start`, at each step picking a predecessor
/// whose bound attains the current earliest-start value.
fn build_critical_chain<T: TimeValue>(
    start: JobIndex,
    earliest: &[T],
    predecessors: &[Vec<JobIndex>],
    problem: &Problem<T>,
) -> Vec<JobIndex> {
    let mut chain = vec![start];
    let mut current = start;

    loop {
        let preds = &predecessors[current.0];
        let mut next = None;
        for &p in preds {
            for pc in problem.predecessors_of(current) {
                if pc.from_index() != p {
                    continue;
                }
                let completion_cost = match pc.signal_at() {
                    SignalAt::Completion => problem.job(p).max_cost(),
                    SignalAt::Start => T::zero(),
                };
                let candidate = earliest[p.0].saturating_add(pc.max_suspension()).saturating_add(completion_cost);
                if candidate == earliest[current.0] {
                    next = Some(p);
                }
            }
        }

        match next {
            Some(p) => {
                chain.push(p);
                current = p;
            }
            None => break,
        }
    }

    chain.reverse();
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::JobId;
    use crate::interval::Interval;
    use crate::problem::{Job, PrecedenceConstraint};
    use crate::time::DiscreteTime as D;

    fn job(task: u64, jid: u64, r: u64, c: u64, d: u64) -> Job<D> {
        Job::new(JobId::new(task, jid), Interval::new(D(r), D(r)), Interval::new(D(c), D(c)), D(d), 0)
    }

    #[test]
    fn single_job_bounds() {
        let problem = Problem::new(vec![job(0, 0, 3, 10, 15)], vec![], vec![], 1);
        let bounds = SimpleBounds::compute(&problem);
        assert_eq!(bounds.earliest_pessimistic_start(JobIndex(0)), D(3));
        assert_eq!(bounds.latest_safe_start(JobIndex(0)), D(5));
        assert!(!bounds.definitely_infeasible());
    }

    #[test]
    fn single_job_infeasible_when_arrival_plus_cost_exceeds_deadline() {
        let problem = Problem::new(vec![job(0, 0, 10, 10, 15)], vec![], vec![], 1);
        let bounds = SimpleBounds::compute(&problem);
        assert!(bounds.definitely_infeasible());
        assert_eq!(bounds.problematic_chain(), &[JobIndex(0)]);
    }

    #[test]
    fn self_loop_detected_as_cycle() {
        let problem = Problem::new(
            vec![job(0, 0, 0, 1, 5)],
            vec![PrecedenceConstraint::dispatch_ordering(JobId::new(0, 0), JobId::new(0, 0))],
            vec![],
            1,
        );
        let bounds = SimpleBounds::compute(&problem);
        assert!(bounds.has_precedence_cycle());
        assert_eq!(bounds.problematic_chain(), &[JobIndex(0), JobIndex(0)]);
    }

    #[test]
    fn monotonicity_across_a_completion_edge() {
        let problem = Problem::new(
            vec![job(0, 0, 0, 5, 20), job(0, 1, 0, 3, 20)],
            vec![PrecedenceConstraint::new(
                JobId::new(0, 0),
                JobId::new(0, 1),
                Interval::new(D(2), D(2)),
                SignalAt::Completion,
            )],
            vec![],
            1,
        );
        let bounds = SimpleBounds::compute(&problem);
        let e0 = bounds.earliest_pessimistic_start(JobIndex(0));
        let e1 = bounds.earliest_pessimistic_start(JobIndex(1));
        assert!(e1 >= e0.saturating_add(D(5)).saturating_add(D(2)));

        let l0 = bounds.latest_safe_start(JobIndex(0));
        let l1 = bounds.latest_safe_start(JobIndex(1));
        assert!(l0 <= l1.saturating_sub(D(2)).saturating_sub(D(5)));
    }
}
