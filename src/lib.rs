//! Non-preemptive multiprocessor fixed-priority feasibility analysis and
//! automatic reconfiguration: given a workload that may miss deadlines,
//! find the minimal set of extra precedence constraints that makes it
//! schedulable.
//!
//! - [`problem`]: the workload/precedence/abort model.
//! - [`feasibility`]: simple bounds, necessary tests, active-node dispatch
//!   simulation, and from-scratch safe-ordering search.
//! - [`oracle`]: the schedulability state-space explorer and its visitor
//!   interface.
//! - [`reconfiguration`]: the rating graph, feasibility overlay, graph
//!   cutter, cut enforcement, the cut-loop manager, and the minimizers.

pub mod error;
pub mod feasibility;
pub mod ids;
pub mod index_set;
pub mod interval;
pub mod oracle;
pub mod problem;
pub mod reconfiguration;
pub mod time;

pub mod prelude {
    pub use super::error::{FeasibilityError, ReconfigurationError};
    pub use super::feasibility::prelude::*;
    pub use super::ids::{JobId, JobIndex};
    pub use super::index_set::IndexSet;
    pub use super::interval::Interval;
    pub use super::oracle::{explore, is_schedulable, DispatchAgent, NullAgent};
    pub use super::problem::{AbortAction, Job, PrecedenceConstraint, Problem, SignalAt};
    pub use super::reconfiguration::prelude::*;
    pub use super::time::{DenseTime, DiscreteTime, TimeValue};
}
