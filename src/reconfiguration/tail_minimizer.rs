//! ## Tail minimizer
//!
//! Shrinks the appended constraint set by removing *suffix* windows rather
//! than a random subset: used after a from-scratch safe-ordering
//! enforcement, where the appended chain encodes a total order and
//! dropping an interior link would silently change the meaning of every
//! link after it. Binary-shrinks the window size so the longest schedulable
//! prefix survives while the rest is dropped in as few oracle calls as
//! possible.

use crate::feasibility::simple_bounds::SimpleBounds;
use crate::oracle::is_schedulable;
use crate::problem::Problem;
use crate::time::TimeValue;

pub struct TailMinimizer;

impl TailMinimizer {
    pub fn minimize<T: TimeValue>(problem: &mut Problem<T>) {
        let appended_len = problem.appended_precedence().len();
        if appended_len == 0 {
            return;
        }

        let mut window = appended_len;
        while window > 0 {
            let keep = appended_len.saturating_sub(window);
            let original_count = problem.original_precedence_count();
            let candidate_cut = original_count + keep;

            let mut candidate = problem.clone();
            let tail_indices: Vec<usize> = (candidate_cut..problem.precedence().len()).collect();
            candidate.remove_appended_constraints(tail_indices);

            let bounds = match SimpleBounds::compute(&candidate).into_result() {
                Ok(bounds) => bounds,
                Err(_) => {
                    window /= 2;
                    continue;
                }
            };

            if is_schedulable(&candidate, &bounds) {
                *problem = candidate;
                return;
            }

            window /= 2;
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
    fn drops_an_unneeded_tail_constraint() {
        // Three independent jobs: a full dispatch-order chain is
        // overkill, so shrinking should drop at least the last link.
        let mut problem = Problem::new(
            vec![job(0, 0, 0, 2, 30), job(0, 1, 0, 2, 30), job(0, 2, 0, 2, 30)],
            vec![],
            vec![],
            1,
        );
        problem.append_precedence(PrecedenceConstraint::dispatch_ordering(JobId::new(0, 0), JobId::new(0, 1)));
        problem.append_precedence(PrecedenceConstraint::dispatch_ordering(JobId::new(0, 1), JobId::new(0, 2)));

        TailMinimizer::minimize(&mut problem);

        let bounds = SimpleBounds::compute(&problem);
        assert!(is_schedulable(&problem, &bounds));
        assert!(problem.appended_precedence().len() <= 2);
    }

    #[test]
    fn empty_appended_set_is_a_no_op() {
        let mut problem = Problem::new(vec![job(0, 0, 0, 2, 20)], vec![], vec![], 1);
        TailMinimizer::minimize(&mut problem);
        assert!(problem.appended_precedence().is_empty());
    }
}
