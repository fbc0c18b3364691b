//! ## Options
//!
//! The one piece of configuration the reconfiguration manager and
//! minimizers thread through explicitly — there is no global mutable
//! state anywhere in this crate (spec §9's "Global mutable state"
//! guidance).

use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Options {
    /// Worker count for [`crate::reconfiguration::trial_minimizer::TrialMinimizer`].
    /// `1` runs it single-threaded.
    pub num_threads: usize,
    /// Wall-clock budget for the cut loop; `None` means no timeout.
    pub timeout: Option<Duration>,
    /// Starting per-iteration cut budget; adapted (doubled on progress,
    /// halved on stall) as the cut loop runs.
    pub max_cuts_per_iter: usize,
    /// Per-step probability (0..100) that the ordering generator skips
    /// its greedy least-slack choice during randomized retries.
    pub skip_chance: u32,
    /// When set, only the rating graph and feasibility overlay are
    /// built and reported on — no cuts are enforced and the problem is
    /// left untouched. Useful for diagnosing *why* a problem is
    /// unschedulable without committing to a repair.
    pub dry_rating: bool,
    /// When set, the cut loop also enforces the safe path's pairwise
    /// ordering alongside each round of cuts (see
    /// [`crate::reconfiguration::cut_enforcer::enforce_cuts_with_path`]).
    pub enforce_safe_path: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            num_threads: 1,
            timeout: None,
            max_cuts_per_iter: 8,
            skip_chance: 10,
            dry_rating: false,
            enforce_safe_path: false,
        }
    }
}
