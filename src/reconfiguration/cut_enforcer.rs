//! ## Cut enforcement
//!
//! Materializes [`Cut`]s as new precedence constraints: for each cut,
//! anchor on whichever safe job has the smallest earliest-pessimistic
//! start, and forbid every forbidden job from racing ahead of it by
//! appending a zero-suspension, signal-at-start ordering constraint
//! `anchor -> forbidden` (idempotent — an already-appended edge is never
//! duplicated).

use crate::feasibility::ordering_generator::enforce_safe_job_ordering;
use crate::feasibility::simple_bounds::SimpleBounds;
use crate::problem::{PrecedenceConstraint, Problem};
use crate::reconfiguration::graph_cutter::Cut;
use crate::reconfiguration::sub_graph::SafePath;
use crate::time::TimeValue;

/// Enforces at most `max_cuts` cuts (the reconfiguration manager's
/// adaptive per-iteration budget) from `cuts`, in order.
pub fn enforce_cuts<T: TimeValue>(problem: &mut Problem<T>, bounds: &SimpleBounds<T>, cuts: &[Cut], max_cuts: usize) {
    for cut in cuts.iter().take(max_cuts) {
        if cut.safe_jobs.is_empty() {
            // Unfixable by cutting; the caller is expected to have
            // checked for this and escalated before calling enforce_cuts.
            continue;
        }

        let mut safe_sorted = cut.safe_jobs.clone();
        safe_sorted.sort_by_key(|&j| bounds.earliest_pessimistic_start(j));
        let anchor = safe_sorted[0];
        let anchor_id = problem.job(anchor).id;

        for &forbidden in &cut.forbidden_jobs {
            if !problem.has_appended_edge(anchor, forbidden) {
                let forbidden_id = problem.job(forbidden).id;
                problem.append_precedence(PrecedenceConstraint::dispatch_ordering(anchor_id, forbidden_id));
            }
        }
    }
}

/// [`enforce_cuts`] plus the pairwise ordering constraints implied by
/// `safe_path`, for when the cuts alone don't yet make the problem
/// schedulable.
pub fn enforce_cuts_with_path<T: TimeValue>(
    problem: &mut Problem<T>,
    bounds: &SimpleBounds<T>,
    cuts: &[Cut],
    safe_path: &SafePath,
    max_cuts: usize,
) {
    enforce_cuts(problem, bounds, cuts, max_cuts);
    enforce_safe_job_ordering(problem, &safe_path.job_ordering());
}
