//! Error taxonomy for the feasibility and reconfiguration core.
//!
//! Mirrors the two-layer shape used elsewhere in this crate for result
//! types: a `kind` enum carries an optional [`anyhow::Error`] payload for
//! the human-readable cause, while callers match on the kind to decide
//! recovery (fatal vs. retry vs. escalate), per the error taxonomy table.

use crate::ids::JobIndex;

/// Errors raised while propagating bounds or running the necessary
/// feasibility tests over a single problem snapshot.
#[derive(Debug)]
pub enum FeasibilityError {
    /// The precedence graph has a cycle; carries a witness chain of job
    /// indices `[j, ..., j]` closing the loop.
    PrecedenceCycle(Vec<JobIndex>),
    /// Simple bounds prove the problem cannot be scheduled; carries the
    /// critical backward chain ending at the job that misses its deadline.
    InfeasibleBounds(Vec<JobIndex>),
    /// The load test or interval test proved infeasibility; carries a
    /// human-readable witness (critical load, interval, etc).
    NecessaryTestFailure(anyhow::Error),
    /// An active-node dispatch step observed a predecessor that was
    /// neither finished nor running. This is a programmer error in the
    /// caller (e.g. a precedence graph not validated for acyclicity
    /// before simulation), not a property of the problem.
    OutOfOrderDispatch(anyhow::Error),
}

impl std::fmt::Display for FeasibilityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use FeasibilityError::*;
        match self {
            PrecedenceCycle(chain) =>
                write!(f, "precedence cycle detected, witness: {chain:?}"),
            InfeasibleBounds(chain) =>
                write!(f, "simple bounds are infeasible, critical chain: {chain:?}"),
            NecessaryTestFailure(err) =>
                write!(f, "necessary feasibility test failed: {err}"),
            OutOfOrderDispatch(err) =>
                write!(f, "out-of-order dispatch (invariant violation): {err}"),
        }
    }
}

impl std::error::Error for FeasibilityError {}

/// Errors raised while searching for a safe dispatch ordering or while
/// repairing a problem by appending precedence constraints.
#[derive(Debug)]
pub enum ReconfigurationError {
    /// The ordering generator could not complete a safe prefix even with
    /// randomized restarts; signals the caller to retry with a different
    /// skip-chance or fall back to another strategy.
    SafeSearchFailure(anyhow::Error),
    /// The graph cutter produced a cut with empty `safe_jobs`: no local
    /// cut can repair this branch, escalate to from-scratch enforcement.
    UnfixableCut { node: crate::reconfiguration::rating_graph::RatingNodeIndex },
    /// An oracle invocation (rating-graph build, schedulability check)
    /// exceeded the configured timeout; partial progress is preserved.
    OracleTimeout,
    /// The oracle reports the problem is still not schedulable after the
    /// cut loop claims to have finished; an invariant has been violated.
    SchedulabilityFailure,
    /// Wraps a [`FeasibilityError`] surfaced while re-validating bounds
    /// after appending constraints.
    Feasibility(FeasibilityError),
}

impl std::fmt::Display for ReconfigurationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use ReconfigurationError::*;
        match self {
            SafeSearchFailure(err) =>
                write!(f, "safe ordering search failed: {err}"),
            UnfixableCut { node } =>
                write!(f, "cut at node {node:?} has no safe jobs, not fixable by cutting"),
            OracleTimeout =>
                write!(f, "oracle invocation timed out"),
            SchedulabilityFailure =>
                write!(f, "problem remains unschedulable after reconfiguration (invariant violated)"),
            Feasibility(err) =>
                write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ReconfigurationError {}

impl From<FeasibilityError> for ReconfigurationError {
    fn from(err: FeasibilityError) -> Self {
        ReconfigurationError::Feasibility(err)
    }
}
