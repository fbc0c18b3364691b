//! ## Trial minimizer
//!
//! Randomized batch removal of appended precedence constraints: pick a
//! random subset, check the oracle still finds the problem schedulable
//! without them, commit if so. Batch size doubles on a committed success
//! and halves on failure, terminating once a dead-countdown of consecutive
//! failures at the minimum batch size (1) is reached.
//!
//! Thread-safe via a single mutex around the shared problem snapshot: each
//! worker clones the problem under the lock, does its (expensive) oracle
//! work lock-free, then re-acquires the lock to commit — but only if the
//! snapshot it started from is still current, otherwise it discards the
//! result and retries against the now-current snapshot.

use crate::feasibility::simple_bounds::SimpleBounds;
use crate::oracle::is_schedulable;
use crate::problem::Problem;
use crate::time::TimeValue;
use rand::seq::SliceRandom;
use std::sync::Mutex;
use std::thread;

const DEAD_COUNTDOWN: u32 = 20;

pub struct TrialMinimizer;

impl TrialMinimizer {
    /// Runs with `num_threads` workers (`1` runs single-threaded, inline,
    /// with no locking overhead).
    pub fn minimize<T: TimeValue>(problem: &mut Problem<T>, num_threads: usize) {
        if problem.appended_precedence().is_empty() {
            return;
        }

        let shared = Mutex::new(problem.clone());
        let dead_countdown = Mutex::new(0u32);
        let threads = num_threads.max(1);

        thread::scope(|scope| {
            for _ in 0..threads {
                scope.spawn(|| worker_loop(&shared, &dead_countdown));
            }
        });

        *problem = shared.into_inner().expect("mutex not poisoned");
    }
}

fn worker_loop<T: TimeValue>(shared: &Mutex<Problem<T>>, dead_countdown: &Mutex<u32>) {
    let mut rng = rand::thread_rng();
    let mut batch_size: usize = 1;

    loop {
        if *dead_countdown.lock().expect("mutex not poisoned") >= DEAD_COUNTDOWN {
            return;
        }

        let (mut candidate, started_from_len, original_count) = {
            let guard = shared.lock().expect("mutex not poisoned");
            (guard.clone(), guard.precedence().len(), guard.original_precedence_count())
        };

        let appended_count = started_from_len - original_count;
        if appended_count == 0 {
            return;
        }

        let batch = batch_size.min(appended_count);
        let mut appended_indices: Vec<usize> = (original_count..started_from_len).collect();
        appended_indices.shuffle(&mut rng);
        let mut removal_indices = appended_indices[..batch].to_vec();

        candidate.remove_appended_constraints(removal_indices.clone());
        removal_indices.sort_unstable();

        let bounds = match SimpleBounds::compute(&candidate).into_result() {
            Ok(bounds) => bounds,
            Err(_) => {
                record_failure(dead_countdown, &mut batch_size);
                continue;
            }
        };
        let schedulable = is_schedulable(&candidate, &bounds);

        if !schedulable {
            record_failure(dead_countdown, &mut batch_size);
            continue;
        }

        let mut guard = shared.lock().expect("mutex not poisoned");
        if guard.precedence().len() != started_from_len {
            // Stale snapshot: someone else committed a removal first, the
            // absolute indices we computed against no longer line up.
            continue;
        }
        guard.remove_appended_constraints(removal_indices);
        drop(guard);

        *dead_countdown.lock().expect("mutex not poisoned") = 0;
        batch_size = batch_size.saturating_mul(2);
    }
}

fn record_failure(dead_countdown: &Mutex<u32>, batch_size: &mut usize) {
    *batch_size = (*batch_size / 2).max(1);
    if *batch_size == 1 {
        *dead_countdown.lock().expect("mutex not poisoned") += 1;
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
    fn removes_unnecessary_appended_constraints_single_threaded() {
        // Two fully independent jobs: an appended ordering constraint
        // between them is never required for schedulability, so the
        // minimizer should be able to drop it.
        let mut problem = Problem::new(vec![job(0, 0, 0, 2, 20), job(0, 1, 0, 2, 20)], vec![], vec![], 1);
        problem.append_precedence(PrecedenceConstraint::dispatch_ordering(JobId::new(0, 0), JobId::new(0, 1)));
        assert_eq!(problem.appended_precedence().len(), 1);

        TrialMinimizer::minimize(&mut problem, 1);

        assert_eq!(problem.appended_precedence().len(), 0);
        let bounds = SimpleBounds::compute(&problem);
        assert!(is_schedulable(&problem, &bounds));
    }

    #[test]
    fn keeps_problem_schedulable_with_multiple_workers() {
        let mut problem = Problem::new(
            vec![job(0, 0, 0, 2, 20), job(0, 1, 0, 2, 20), job(0, 2, 0, 2, 20)],
            vec![],
            vec![],
            1,
        );
        problem.append_precedence(PrecedenceConstraint::dispatch_ordering(JobId::new(0, 0), JobId::new(0, 1)));
        problem.append_precedence(PrecedenceConstraint::dispatch_ordering(JobId::new(0, 1), JobId::new(0, 2)));

        TrialMinimizer::minimize(&mut problem, 4);

        let bounds = SimpleBounds::compute(&problem);
        assert!(is_schedulable(&problem, &bounds));
    }

    #[test]
    fn empty_appended_set_is_a_no_op() {
        let mut problem = Problem::new(vec![job(0, 0, 0, 2, 20)], vec![], vec![], 1);
        TrialMinimizer::minimize(&mut problem, 2);
        assert!(problem.appended_precedence().is_empty());
    }
}
