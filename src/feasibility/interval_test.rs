//! ## Interval test
//!
//! For every job's own `[earliest_pessimistic_start, latest_safe_start +
//! max_cost]` window, finds every other job whose window overlaps it (via
//! the interval tree) and sums each overlapping job's worst-case load
//! *inside* that window. If the packing test proves those loads cannot
//! fit on `m` processors within the window, the problem is infeasible.

use crate::feasibility::interval_tree::{FInterval, IntervalTree};
use crate::feasibility::packing::is_certainly_unpackable;
use crate::feasibility::simple_bounds::SimpleBounds;
use crate::ids::JobIndex;
use crate::problem::Problem;
use crate::time::TimeValue;

/// Outcome of the interval test: whether it proved infeasibility, and (if
/// so) the critical window and per-job loads that witnessed it.
#[derive(Clone, Debug)]
pub struct IntervalTestResult<T> {
    pub infeasible: bool,
    pub critical_start: T,
    pub critical_end: T,
    pub critical_loads: Vec<T>,
    pub critical_jobs: Vec<JobIndex>,
}

pub fn interval_test<T: TimeValue>(problem: &Problem<T>, bounds: &SimpleBounds<T>) -> IntervalTestResult<T> {
    let mut tree_intervals = Vec::with_capacity(problem.num_jobs());
    for job in problem.workload() {
        let index = job.index();
        tree_intervals.push(FInterval {
            job_index: index,
            start: bounds.earliest_pessimistic_start(index),
            end: bounds.latest_safe_start(index).saturating_add(job.max_cost()),
        });
    }
    let tree = IntervalTree::build(tree_intervals);

    for job in problem.workload() {
        let index = job.index();
        let start_time = bounds.earliest_pessimistic_start(index);
        let end_time = bounds.latest_safe_start(index).saturating_add(job.max_cost());

        let relevant = tree.query(&FInterval { job_index: index, start: start_time, end: end_time });

        let mut required_loads = Vec::new();
        let mut corresponding_jobs = Vec::new();
        for interval in &relevant {
            let mut non_overlapping_time = T::zero();
            if interval.start < start_time {
                non_overlapping_time = start_time.saturating_sub(interval.start);
            }
            if interval.end > end_time {
                non_overlapping_time = non_overlapping_time.max(interval.end.saturating_sub(end_time));
            }

            let exec_time = problem.job(interval.job_index).max_cost();
            if exec_time > non_overlapping_time {
                let load_for_job = exec_time
                    .saturating_sub(non_overlapping_time)
                    .min(end_time.saturating_sub(start_time));
                required_loads.push(load_for_job);
                corresponding_jobs.push(interval.job_index);
            }
        }

        let mut loads_for_packing = required_loads.clone();
        if is_certainly_unpackable(
            problem.num_processors(),
            end_time.saturating_sub(start_time),
            &mut loads_for_packing,
        ) {
            return IntervalTestResult {
                infeasible: true,
                critical_start: start_time,
                critical_end: end_time,
                critical_loads: required_loads,
                critical_jobs: corresponding_jobs,
            };
        }
    }

    IntervalTestResult {
        infeasible: false,
        critical_start: T::zero(),
        critical_end: T::zero(),
        critical_loads: Vec::new(),
        critical_jobs: Vec::new(),
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
    fn feasible_disjoint_windows() {
        let problem = Problem::new(vec![job(0, 0, 0, 3, 5), job(0, 1, 10, 3, 15)], vec![], vec![], 1);
        let bounds = SimpleBounds::compute(&problem);
        assert!(!interval_test(&problem, &bounds).infeasible);
    }

    #[test]
    fn five_jobs_cumulative_load_over_small_window_is_infeasible() {
        // Five jobs each costing 3 (cumulative load 15), all confined to a
        // window of 10 on a single processor: cannot fit.
        let jobs: Vec<_> = (0..5).map(|i| job(0, i, 0, 3, 10)).collect();
        let problem = Problem::new(jobs, vec![], vec![], 1);
        let bounds = SimpleBounds::compute(&problem);
        assert!(interval_test(&problem, &bounds).infeasible);
    }
}
