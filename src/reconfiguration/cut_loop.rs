//! ## Reconfiguration manager — cut loop
//!
//! Drives a problem from "possibly unschedulable" to "schedulable, with a
//! minimized set of appended precedence constraints witnessing it" in four
//! states: `Probing` (build a rating graph), `Refining` (consume cuts
//! against an adaptive budget), `Exhausted` (from-scratch safe-ordering
//! fallback), `Done` (hand off to the minimizers).

use crate::error::ReconfigurationError;
use crate::feasibility::ordering_generator::{enforce_safe_job_ordering, search_for_safe_job_ordering};
use crate::feasibility::simple_bounds::SimpleBounds;
use crate::feasibility::{interval_test, load_test};
use crate::oracle::is_schedulable;
use crate::problem::Problem;
use crate::reconfiguration::cut_enforcer::{enforce_cuts, enforce_cuts_with_path};
use crate::reconfiguration::feasibility_graph::FeasibilityGraph;
use crate::reconfiguration::graph_cutter::cut_rating_graph;
use crate::reconfiguration::options::Options;
use crate::reconfiguration::rating_graph::build_rating_graph;
use crate::reconfiguration::tail_minimizer::TailMinimizer;
use crate::reconfiguration::trial_minimizer::TrialMinimizer;
use crate::reconfiguration::transitivity_minimizer::TransitivityMinimizer;
use crate::time::TimeValue;
use std::time::Instant;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CutLoopState {
    Probing,
    Refining,
    Exhausted,
    Done,
}

/// Outcome of [`reconfigure`]: the state the loop finished in plus a
/// record of how it got there, for the CLI's one-line output record.
#[derive(Clone, Debug)]
pub struct ReconfigurationReport {
    pub final_state: CutLoopState,
    pub iterations: u32,
    pub cuts_enforced: usize,
    pub timed_out: bool,
}

fn exceeded_timeout(start: Instant, options: &Options) -> bool {
    match options.timeout {
        Some(budget) => start.elapsed() >= budget,
        None => false,
    }
}

/// Runs the cut loop to completion (or until the timeout / fallback fires),
/// mutating `problem` in place by appending precedence constraints.
///
/// Does not run the minimizers — call [`minimize`] afterward if a minimal
/// constraint set is wanted.
pub fn reconfigure<T: TimeValue>(
    problem: &mut Problem<T>,
    options: &Options,
) -> Result<ReconfigurationReport, ReconfigurationError> {
    let start = Instant::now();
    let bounds = SimpleBounds::compute(problem).into_result()?;

    let load_result = load_test(problem, &bounds);
    if load_result.infeasible {
        return Err(ReconfigurationError::Feasibility(crate::error::FeasibilityError::NecessaryTestFailure(
            anyhow::anyhow!(
                "load test infeasible at t={:?}: minimum {:?} > maximum {:?}",
                load_result.witness_time,
                load_result.minimum_executed_load,
                load_result.maximum_executed_load
            ),
        )));
    }
    let interval_result = interval_test(problem, &bounds);
    if interval_result.infeasible {
        return Err(ReconfigurationError::Feasibility(crate::error::FeasibilityError::NecessaryTestFailure(
            anyhow::anyhow!(
                "interval test infeasible over [{:?}, {:?}]: jobs {:?}",
                interval_result.critical_start,
                interval_result.critical_end,
                interval_result.critical_jobs
            ),
        )));
    }

    if options.dry_rating {
        let rating_graph = build_rating_graph(problem, &bounds);
        let final_state = if rating_graph.nodes[rating_graph.root().0].rating() == 1.0 {
            CutLoopState::Done
        } else {
            CutLoopState::Probing
        };
        return Ok(ReconfigurationReport { final_state, iterations: 0, cuts_enforced: 0, timed_out: false });
    }

    let mut state = CutLoopState::Probing;
    let mut max_cuts_this_iter = options.max_cuts_per_iter.max(1);
    let mut previous_rating = 0.0f32;
    let mut iterations = 0u32;
    let mut cuts_enforced = 0usize;
    let mut timed_out = false;

    loop {
        if exceeded_timeout(start, options) {
            timed_out = true;
            state = CutLoopState::Exhausted;
        }

        match state {
            CutLoopState::Probing => {
                iterations += 1;
                let rating_graph = build_rating_graph(problem, &bounds);
                let root_rating = rating_graph.nodes[rating_graph.root().0].rating();
                if root_rating == 1.0 {
                    state = CutLoopState::Done;
                    continue;
                }

                let feasibility = FeasibilityGraph::forward(&rating_graph, problem, &bounds).backward(&rating_graph);
                if !feasibility.is_node_feasible(rating_graph.root()) {
                    state = CutLoopState::Exhausted;
                    continue;
                }

                let safe_path = feasibility.create_safe_path(&rating_graph);
                let cuts = cut_rating_graph(&rating_graph, &feasibility, &safe_path);
                if cuts.iter().any(|c| c.safe_jobs.is_empty()) {
                    state = CutLoopState::Exhausted;
                    continue;
                }

                let before = problem.appended_precedence().len();
                if options.enforce_safe_path {
                    enforce_cuts_with_path(problem, &bounds, &cuts, &safe_path, max_cuts_this_iter);
                } else {
                    enforce_cuts(problem, &bounds, &cuts, max_cuts_this_iter);
                }
                cuts_enforced += problem.appended_precedence().len() - before;

                if is_schedulable(problem, &bounds) {
                    state = CutLoopState::Done;
                    continue;
                }

                previous_rating = root_rating;
                state = CutLoopState::Refining;
            }

            CutLoopState::Refining => {
                // Re-rate after the cuts just enforced: an increase means
                // the cuts narrowed the state space toward a safe
                // completion even though it isn't schedulable yet.
                let rating_graph = build_rating_graph(problem, &bounds);
                let new_rating = rating_graph.nodes[rating_graph.root().0].rating();
                if new_rating > previous_rating {
                    max_cuts_this_iter = max_cuts_this_iter.saturating_mul(2);
                    state = CutLoopState::Probing;
                } else {
                    max_cuts_this_iter /= 2;
                    if max_cuts_this_iter == 0 {
                        state = CutLoopState::Exhausted;
                    } else {
                        state = CutLoopState::Probing;
                    }
                }
            }

            CutLoopState::Exhausted => {
                let safe_ordering = search_for_safe_job_ordering(problem, &bounds, options.skip_chance.max(1))
                    .map_err(ReconfigurationError::from)?;
                let before = problem.appended_precedence().len();
                enforce_safe_job_ordering(problem, &safe_ordering);
                cuts_enforced += problem.appended_precedence().len() - before;
                state = CutLoopState::Done;
            }

            CutLoopState::Done => break,
        }
    }

    if !is_schedulable(problem, &bounds) {
        return Err(ReconfigurationError::SchedulabilityFailure);
    }

    Ok(ReconfigurationReport { final_state: state, iterations, cuts_enforced, timed_out })
}

/// Shrinks the appended constraint set `reconfigure` left behind, without
/// changing schedulability: transitivity first (cheap, single-threaded),
/// then randomized trial removal (parallel if `options.num_threads > 1`).
pub fn minimize<T: TimeValue>(problem: &mut Problem<T>, options: &Options) -> Result<(), ReconfigurationError> {
    TransitivityMinimizer::minimize(problem);
    TrialMinimizer::minimize(problem, options.num_threads);

    let bounds = SimpleBounds::compute(problem).into_result()?;
    if !is_schedulable(problem, &bounds) {
        return Err(ReconfigurationError::SchedulabilityFailure);
    }
    Ok(())
}

/// Minimizes while preserving a particular safe-ordering prefix, using
/// [`TailMinimizer`] instead of [`TrialMinimizer`].
pub fn minimize_preserving_prefix<T: TimeValue>(problem: &mut Problem<T>) -> Result<(), ReconfigurationError> {
    TransitivityMinimizer::minimize(problem);
    TailMinimizer::minimize(problem);

    let bounds = SimpleBounds::compute(problem).into_result()?;
    if !is_schedulable(problem, &bounds) {
        return Err(ReconfigurationError::SchedulabilityFailure);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::JobId;
    use crate::interval::Interval;
    use crate::problem::Job;
    use crate::time::DiscreteTime as D;

    fn job(task: u64, jid: u64, r: u64, c: u64, d: u64) -> Job<D> {
        Job::new(JobId::new(task, jid), Interval::new(D(r), D(r)), Interval::new(D(c), D(c)), D(d), 0)
    }

    #[test]
    fn already_schedulable_problem_finishes_in_one_probe_with_no_cuts() {
        let mut problem = Problem::new(vec![job(0, 0, 0, 3, 10), job(0, 1, 0, 3, 10)], vec![], vec![], 1);
        let options = Options::default();
        let report = reconfigure(&mut problem, &options).unwrap();
        assert_eq!(report.final_state, CutLoopState::Done);
        assert_eq!(problem.appended_precedence().len(), 0);
    }

    #[test]
    fn tight_pair_gets_repaired_and_stays_schedulable() {
        // Two short jobs whose deadlines only admit one interleaving order;
        // the cut loop (or its from-scratch fallback) must find it.
        let mut problem = Problem::new(vec![job(0, 0, 0, 5, 20), job(0, 1, 0, 3, 8)], vec![], vec![], 1);
        let options = Options::default();
        let report = reconfigure(&mut problem, &options).unwrap();
        assert_eq!(report.final_state, CutLoopState::Done);

        let bounds = SimpleBounds::compute(&problem);
        assert!(is_schedulable(&problem, &bounds));
    }

    #[test]
    fn reconfigure_then_minimize_keeps_problem_schedulable() {
        let mut problem = Problem::new(vec![job(0, 0, 0, 5, 20), job(0, 1, 0, 3, 8)], vec![], vec![], 1);
        let options = Options::default();
        reconfigure(&mut problem, &options).unwrap();
        minimize(&mut problem, &options).unwrap();

        let bounds = SimpleBounds::compute(&problem);
        assert!(is_schedulable(&problem, &bounds));
    }

    #[test]
    fn enforce_safe_path_option_also_appends_pairwise_safe_ordering() {
        let mut problem = Problem::new(vec![job(0, 0, 0, 2, 6), job(0, 1, 0, 2, 6), job(0, 2, 0, 5, 6)], vec![], vec![], 1);
        let options = Options { enforce_safe_path: true, ..Options::default() };
        let report = reconfigure(&mut problem, &options).unwrap();
        assert_eq!(report.final_state, CutLoopState::Done);

        let bounds = SimpleBounds::compute(&problem);
        assert!(is_schedulable(&problem, &bounds));
    }

    #[test]
    fn definitely_infeasible_problem_is_rejected_up_front() {
        let mut problem = Problem::new(vec![job(0, 0, 10, 10, 15)], vec![], vec![], 1);
        let options = Options::default();
        let result = reconfigure(&mut problem, &options);
        assert!(matches!(result, Err(ReconfigurationError::Feasibility(_))));
    }
}
