//! ## Active node
//!
//! #### Model:
//! Simulates one concrete dispatch prefix: a set of completed jobs, the
//! jobs still running, and per-processor core availability. Used both by
//! the from-scratch ordering generator and by the feasibility graph's
//! forward pass.

use crate::error::FeasibilityError;
use crate::feasibility::core_availability::CoreAvailability;
use crate::feasibility::simple_bounds::SimpleBounds;
use crate::ids::JobIndex;
use crate::index_set::IndexSet;
use crate::problem::{Problem, SignalAt};
use crate::time::TimeValue;
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunningJob<T> {
    pub index: JobIndex,
    pub started_at: T,
    pub finishes_at: T,
}

#[derive(Clone, Debug)]
pub struct ActiveNode<T> {
    completed: IndexSet,
    running: Vec<RunningJob<T>>,
    core_avail: CoreAvailability<T>,
    missed_deadline: bool,
}

impl<T: TimeValue> ActiveNode<T> {
    pub fn root(problem: &Problem<T>) -> Self {
        Self {
            completed: IndexSet::new(problem.num_jobs()),
            running: Vec::new(),
            core_avail: CoreAvailability::idle(problem.num_processors()),
            missed_deadline: false,
        }
    }

    pub fn missed_deadline(&self) -> bool {
        self.missed_deadline
    }

    pub fn completed(&self) -> &IndexSet {
        &self.completed
    }

    pub fn running(&self) -> &[RunningJob<T>] {
        &self.running
    }

    pub fn core_availability(&self) -> &CoreAvailability<T> {
        &self.core_avail
    }

    pub fn is_dispatched(&self, job: JobIndex) -> bool {
        self.completed.contains(job) || self.running.iter().any(|r| r.index == job)
    }

    pub fn all_dispatched(&self, problem: &Problem<T>) -> bool {
        problem.workload().iter().all(|j| self.is_dispatched(j.index()))
    }

    fn running_of(&self, job: JobIndex) -> Option<&RunningJob<T>> {
        self.running.iter().find(|r| r.index == job)
    }

    /// The time `job` would become ready to run, given the state of its
    /// predecessors in this node. Fails with [`FeasibilityError::OutOfOrderDispatch`]
    /// if a predecessor is neither finished nor running.
    fn ready_time(&self, problem: &Problem<T>, job: JobIndex) -> Result<T, FeasibilityError> {
        let mut ready = problem.job(job).latest_arrival();

        for pc in problem.predecessors_of(job) {
            let pred = pc.from_index();
            if self.completed.contains(pred) {
                continue;
            }

            if let Some(running) = self.running_of(pred) {
                let candidate = match pc.signal_at() {
                    SignalAt::Completion => running.finishes_at,
                    SignalAt::Start => running.started_at,
                };
                ready = ready.max(candidate.saturating_add(pc.max_suspension()));
            } else {
                return Err(FeasibilityError::OutOfOrderDispatch(anyhow::format_err!(
                    "predecessor {pred} of job {job} is neither finished nor running"
                )));
            }
        }

        Ok(ready)
    }

    /// Predicts the start time of `job` without mutating the node (step 2
    /// of `schedule`, read-only).
    pub fn predict_start_time(&self, problem: &Problem<T>, job: JobIndex) -> Result<T, FeasibilityError> {
        let ready = self.ready_time(problem, job)?;
        Ok(ready.max(self.core_avail.next_start_time()))
    }

    /// Predicts the start time of whatever job would be dispatched *after*
    /// `job`, by hypothetically reserving a core for `job` and reading the
    /// resulting next-free time. Used by the ordering generator's
    /// work-conserving tie-break and the feasibility overlay's look-ahead.
    pub fn predict_next_start_time(&self, problem: &Problem<T>, job: JobIndex) -> Result<T, FeasibilityError> {
        let start = self.predict_start_time(problem, job)?;
        let mut hypothetical = self.core_avail.clone();
        hypothetical.schedule(start, problem.job(job).max_cost());
        Ok(hypothetical.next_start_time())
    }

    /// Dispatches `job` onto this node: computes its ready/start time,
    /// reserves a core, retires any running jobs that are now provably
    /// finished, marks `missed_deadline` if the start is past the job's
    /// latest safe start, and appends it to the running list.
    pub fn schedule(
        &mut self,
        problem: &Problem<T>,
        bounds: &SimpleBounds<T>,
        job: JobIndex,
    ) -> Result<(), FeasibilityError> {
        let ready = self.ready_time(problem, job)?;
        let start = ready.max(self.core_avail.next_start_time());

        if start > bounds.latest_safe_start(job) {
            self.missed_deadline = true;
        }

        self.core_avail.schedule(start, problem.job(job).max_cost());

        let mut still_running = Vec::with_capacity(self.running.len());
        for running in self.running.drain(..) {
            let max_susp = bounds.maximum_suspension(running.index);
            if running.finishes_at.saturating_add(max_susp) <= start {
                self.completed.add(running.index);
            } else {
                still_running.push(running);
            }
        }
        self.running = still_running;

        self.running.push(RunningJob {
            index: job,
            started_at: start,
            finishes_at: start.saturating_add(problem.job(job).max_cost()),
        });

        Ok(())
    }

    /// A deep, independent copy of this node.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Pessimistic union of two scenarios that dispatched the same set of
    /// jobs along different paths. Panics on a dispatched-set mismatch —
    /// that is a fatal invariant violation, not a data condition.
    pub fn merge(&self, other: &Self) -> Self {
        let self_dispatched: HashMap<JobIndex, bool> = self
            .completed
            .iter()
            .map(|i| (i, true))
            .chain(self.running.iter().map(|r| (r.index, false)))
            .collect();
        let other_dispatched: HashMap<JobIndex, bool> = other
            .completed
            .iter()
            .map(|i| (i, true))
            .chain(other.running.iter().map(|r| (r.index, false)))
            .collect();

        assert_eq!(
            self_dispatched.keys().collect::<std::collections::HashSet<_>>(),
            other_dispatched.keys().collect::<std::collections::HashSet<_>>(),
            "cannot merge active nodes with different dispatched job sets"
        );

        let self_running: HashMap<JobIndex, RunningJob<T>> =
            self.running.iter().map(|r| (r.index, *r)).collect();
        let other_running: HashMap<JobIndex, RunningJob<T>> =
            other.running.iter().map(|r| (r.index, *r)).collect();

        let mut completed = IndexSet::new(self.completed.universe_size());
        let mut running = Vec::new();

        for (&idx, &self_finished) in &self_dispatched {
            let other_finished = other_dispatched[&idx];
            match (self_finished, other_finished) {
                (true, true) => completed.add(idx),
                (true, false) => running.push(other_running[&idx]),
                (false, true) => running.push(self_running[&idx]),
                (false, false) => {
                    let a = self_running[&idx];
                    let b = other_running[&idx];
                    running.push(RunningJob {
                        index: idx,
                        started_at: a.started_at.max(b.started_at),
                        finishes_at: a.finishes_at.max(b.finishes_at),
                    });
                }
            }
        }

        Self {
            completed,
            running,
            core_avail: self.core_avail.merge(&other.core_avail),
            missed_deadline: self.missed_deadline || other.missed_deadline,
        }
    }
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
    fn good_single_core_dispatch() {
        let problem = Problem::new(vec![job(0, 0, 0, 5, 10), job(0, 1, 0, 3, 20)], vec![], vec![], 1);
        let bounds = SimpleBounds::compute(&problem);
        let mut node = ActiveNode::root(&problem);

        node.schedule(&problem, &bounds, JobIndex(0)).unwrap();
        assert!(!node.missed_deadline());
        node.schedule(&problem, &bounds, JobIndex(1)).unwrap();
        assert!(!node.missed_deadline());
        assert_eq!(node.core_availability().next_start_time(), D(8));
    }

    #[test]
    fn missed_deadline_is_flagged_not_fatal() {
        let problem = Problem::new(vec![job(0, 0, 0, 5, 10), job(0, 1, 0, 10, 11)], vec![], vec![], 1);
        let bounds = SimpleBounds::compute(&problem);
        let mut node = ActiveNode::root(&problem);
        node.schedule(&problem, &bounds, JobIndex(0)).unwrap();
        node.schedule(&problem, &bounds, JobIndex(1)).unwrap();
        assert!(node.missed_deadline());
    }

    #[test]
    fn out_of_order_dispatch_on_unresolved_predecessor() {
        let problem = Problem::new(
            vec![job(0, 0, 0, 5, 10), job(0, 1, 0, 3, 20)],
            vec![PrecedenceConstraint::dispatch_ordering(JobId::new(0, 0), JobId::new(0, 1))],
            vec![],
            1,
        );
        let bounds = SimpleBounds::compute(&problem);
        let mut node = ActiveNode::root(&problem);
        let result = node.schedule(&problem, &bounds, JobIndex(1));
        assert!(matches!(result, Err(FeasibilityError::OutOfOrderDispatch(_))));
    }

    #[test]
    fn merge_demotes_finished_to_running_pessimistically() {
        let problem = Problem::new(vec![job(0, 0, 0, 5, 20), job(0, 1, 0, 3, 20)], vec![], vec![], 2);
        let bounds = SimpleBounds::compute(&problem);

        let mut a = ActiveNode::root(&problem);
        a.schedule(&problem, &bounds, JobIndex(0)).unwrap();
        a.schedule(&problem, &bounds, JobIndex(1)).unwrap();

        let mut b = ActiveNode::root(&problem);
        b.schedule(&problem, &bounds, JobIndex(1)).unwrap();
        b.schedule(&problem, &bounds, JobIndex(0)).unwrap();

        let merged = a.merge(&b);
        assert_eq!(merged.running().len() + merged.completed().size(), 2);
    }
}
