//! ## Feasibility analysis
//!
//! Leaf-to-root: core availability, simple bounds, the two necessary
//! feasibility tests (load, interval, backed by packing and an interval
//! tree), the active-node dispatch simulator, and the from-scratch
//! ordering generator built on top of it.

pub mod active_node;
pub mod core_availability;
pub mod interval_test;
pub mod interval_tree;
pub mod ordering_generator;
pub mod packing;
pub mod simple_bounds;

pub mod prelude {
    pub use super::active_node::{ActiveNode, RunningJob};
    pub use super::core_availability::CoreAvailability;
    pub use super::interval_test::interval_test;
    pub use super::load_test::load_test;
    pub use super::ordering_generator::{enforce_safe_job_ordering, search_for_safe_job_ordering};
    pub use super::packing::is_certainly_unpackable;
    pub use super::simple_bounds::SimpleBounds;
}
