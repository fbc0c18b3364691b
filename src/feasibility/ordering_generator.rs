//! ## Ordering generator
//!
//! Builds a concrete dispatch order from scratch using a least-slack-first
//! heuristic: at each step, prefer the undispatched job with the least
//! slack (`latest_safe_start`) that is still dispatchable, breaking ties
//! toward a job that finishes sooner when doing so doesn't delay the
//! least-slack job. [`search_for_safe_job_ordering`] retries with
//! increasing randomization (a per-step chance to skip the greedy choice)
//! if the deterministic pass fails to find a deadline-respecting order.

use crate::error::FeasibilityError;
use crate::feasibility::active_node::ActiveNode;
use crate::feasibility::simple_bounds::SimpleBounds;
use crate::ids::JobIndex;
use crate::index_set::IndexSet;
use crate::problem::{PrecedenceConstraint, Problem};
use crate::time::TimeValue;
use rand::Rng;

struct OrderingGenerator<'a, T> {
    problem: &'a Problem<T>,
    bounds: &'a SimpleBounds<T>,
    skip_chance: u32,

    node: ActiveNode<T>,
    dispatched: IndexSet,

    slack_job_index: usize,
    jobs_by_slack: Vec<JobIndex>,
    finish_job_index: usize,
    jobs_by_finish_time: Vec<JobIndex>,
    remaining_predecessors: Vec<u32>,

    failed: bool,
}

impl<'a, T: TimeValue> OrderingGenerator<'a, T> {
    fn new(problem: &'a Problem<T>, bounds: &'a SimpleBounds<T>, skip_chance: u32) -> Self {
        assert!(skip_chance < 100);
        let n = problem.num_jobs();

        let mut jobs_by_slack: Vec<JobIndex> = (0..n).map(JobIndex).collect();
        jobs_by_slack.sort_by_key(|&j| bounds.latest_safe_start(j));

        let mut jobs_by_finish_time: Vec<JobIndex> = (0..n).map(JobIndex).collect();
        jobs_by_finish_time
            .sort_by_key(|&j| bounds.earliest_pessimistic_start(j).saturating_add(problem.job(j).max_cost()));

        let mut remaining_predecessors = vec![0u32; n];
        for pc in problem.precedence() {
            remaining_predecessors[pc.to_index().0] += 1;
        }

        Self {
            problem,
            bounds,
            skip_chance,
            node: ActiveNode::root(problem),
            dispatched: IndexSet::new(n),
            slack_job_index: 0,
            jobs_by_slack,
            finish_job_index: 0,
            jobs_by_finish_time,
            remaining_predecessors,
            failed: false,
        }
    }

    fn has_failed(&self) -> bool {
        self.failed
    }

    fn has_finished(&self) -> bool {
        self.failed || self.slack_job_index >= self.jobs_by_slack.len()
    }

    fn update_slack_job_index(&mut self) {
        while self.slack_job_index < self.jobs_by_slack.len()
            && self.dispatched.contains(self.jobs_by_slack[self.slack_job_index])
        {
            self.slack_job_index += 1;
        }
    }

    /// Whether `job` could be dispatched right now without pushing the
    /// current least-slack job (or, if `job` itself is that job, the
    /// *next* least-slack job) past its safe start deadline.
    fn can_dispatch(&self, job: JobIndex) -> bool {
        if self.remaining_predecessors[job.0] > 0 {
            return false;
        }
        if self.dispatched.contains(job) {
            return false;
        }

        if job == self.jobs_by_slack[self.slack_job_index] {
            let mut next_slack_index = self.slack_job_index + 1;
            while next_slack_index < self.problem.num_jobs()
                && self.dispatched.contains(self.jobs_by_slack[next_slack_index])
            {
                next_slack_index += 1;
            }
            if next_slack_index < self.problem.num_jobs() {
                let predicted = match self.node.predict_next_start_time(self.problem, job) {
                    Ok(t) => t,
                    Err(_) => return false,
                };
                if predicted > self.bounds.latest_safe_start(self.jobs_by_slack[next_slack_index]) {
                    return false;
                }
            }
        } else {
            let predicted = match self.node.predict_start_time(self.problem, job) {
                Ok(t) => t,
                Err(_) => return false,
            };
            if predicted > self.bounds.latest_safe_start(self.jobs_by_slack[self.slack_job_index]) {
                return false;
            }
        }

        true
    }

    fn choose_next_job(&mut self, rng: &mut impl Rng) -> Result<JobIndex, FeasibilityError> {
        self.update_slack_job_index();
        assert!(self.slack_job_index < self.jobs_by_slack.len());

        let current_slack_job = self.jobs_by_slack[self.slack_job_index];
        if self.node.core_availability().next_start_time() > self.bounds.latest_safe_start(current_slack_job) {
            self.failed = true;
            return Ok(current_slack_job);
        }

        let mut valid_slack_index = self.slack_job_index;
        while !self.can_dispatch(self.jobs_by_slack[valid_slack_index]) {
            valid_slack_index += 1;
            if valid_slack_index == self.problem.num_jobs() {
                self.failed = true;
                return Ok(self.jobs_by_slack[self.slack_job_index]);
            }
        }

        let mut candidate_slack_index = valid_slack_index;
        while candidate_slack_index < self.problem.num_jobs() {
            if self.can_dispatch(self.jobs_by_slack[candidate_slack_index])
                && rng.gen_range(0..100) >= self.skip_chance
            {
                break;
            }
            candidate_slack_index += 1;
        }
        if candidate_slack_index == self.problem.num_jobs() {
            candidate_slack_index = valid_slack_index;
        }

        let mut next_job = self.jobs_by_slack[candidate_slack_index];
        let next_start_time = self.node.predict_start_time(self.problem, next_job)?;

        while self.finish_job_index < self.problem.num_jobs()
            && self.dispatched.contains(self.jobs_by_finish_time[self.finish_job_index])
        {
            self.finish_job_index += 1;
        }
        let mut candidate_finish_index = self.finish_job_index;
        while candidate_finish_index < self.problem.num_jobs()
            && !self.can_dispatch(self.jobs_by_finish_time[candidate_finish_index])
        {
            candidate_finish_index += 1;
        }

        if candidate_finish_index < self.problem.num_jobs() {
            let quick_job = self.jobs_by_finish_time[candidate_finish_index];
            let quick_start = self.node.predict_start_time(self.problem, quick_job)?;
            if quick_start.saturating_add(self.problem.job(quick_job).max_cost()) <= next_start_time {
                next_job = quick_job;
            }
        }

        self.dispatched.add(next_job);
        self.node.schedule(self.problem, self.bounds, next_job)?;

        for successor in self.problem.successors_of(next_job) {
            let to = successor.to_index().0;
            assert!(self.remaining_predecessors[to] > 0);
            self.remaining_predecessors[to] -= 1;
        }

        self.update_slack_job_index();
        Ok(next_job)
    }
}

/// Searches for a dispatch order that respects every job's safe start
/// deadline, first deterministically (least-slack-first), then with
/// increasing randomization if that fails. Loops until a safe ordering is
/// found — callers that need a bound should wrap this in a timeout.
pub fn search_for_safe_job_ordering<T: TimeValue>(
    problem: &Problem<T>,
    bounds: &SimpleBounds<T>,
    skip_chance: u32,
) -> Result<Vec<JobIndex>, FeasibilityError> {
    let mut rng = rand::thread_rng();
    let mut result = Vec::with_capacity(problem.num_jobs());

    {
        let mut generator = OrderingGenerator::new(problem, bounds, 0);
        while !generator.has_finished() {
            result.push(generator.choose_next_job(&mut rng)?);
        }
        if !generator.has_failed() {
            return Ok(result);
        }
    }

    assert!(skip_chance > 0, "least-slack-first failed and no randomized retry budget was given");
    let mut high_score = 0;
    loop {
        result.clear();
        let mut generator = OrderingGenerator::new(problem, bounds, skip_chance);
        while !generator.has_finished() {
            result.push(generator.choose_next_job(&mut rng)?);
        }
        if !generator.has_failed() {
            return Ok(result);
        }
        if result.len() > high_score {
            high_score = result.len();
            log::debug!("safe ordering search stalled after {high_score}/{} jobs", problem.num_jobs());
        }
    }
}

/// Appends a zero-suspension, signal-at-start precedence chain enforcing
/// `safe_ordering` as the dispatch order.
pub fn enforce_safe_job_ordering<T: TimeValue>(problem: &mut Problem<T>, safe_ordering: &[JobIndex]) {
    for window in safe_ordering.windows(2) {
        let from = problem.job(window[0]).id;
        let to = problem.job(window[1]).id;
        problem.append_precedence(PrecedenceConstraint::dispatch_ordering(from, to));
    }
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
    fn least_slack_first_succeeds_on_the_classic_counterexample() {
        // Two jobs with equal arrival, one long-slack and one short-slack:
        // always dispatching the least-slack job first keeps both on time.
        let problem = Problem::new(vec![job(0, 0, 0, 5, 20), job(0, 1, 0, 3, 8)], vec![], vec![], 1);
        let bounds = SimpleBounds::compute(&problem);
        let ordering = search_for_safe_job_ordering(&problem, &bounds, 10).unwrap();
        assert_eq!(ordering, vec![JobIndex(1), JobIndex(0)]);
    }

    #[test]
    fn enforce_appends_a_dispatch_chain() {
        let mut problem = Problem::new(vec![job(0, 0, 0, 5, 20), job(0, 1, 0, 3, 8)], vec![], vec![], 1);
        enforce_safe_job_ordering(&mut problem, &[JobIndex(1), JobIndex(0)]);
        assert_eq!(problem.appended_precedence().len(), 1);
        assert!(problem.has_appended_edge(JobIndex(1), JobIndex(0)));
    }
}
