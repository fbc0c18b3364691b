//! ## Schedulability oracle
//!
//! The core treats state-space exploration as a collaborator: it neither
//! owns nor reimplements the schedulability analysis engine, it only
//! consumes the stream of events a traversal emits. [`DispatchAgent`] is
//! that visitor interface — the same shape as the rating graph's
//! attachment protocol, so a rating-graph build, a plain schedulability
//! check, and any other observer are all just different agents over the
//! same [`explore`] traversal.
//!
//! [`explore`] itself is a thin, single-threaded reference explorer: a
//! breadth-first walk of the non-preemptive dispatch state space, merging
//! states that agree on completed jobs, running jobs and core
//! availability. It exists to give the rating graph, feasibility overlay
//! and cut loop something concrete to run against; a production engine
//! would plug in here as a different, presumably parallel, agent.

use crate::feasibility::active_node::ActiveNode;
use crate::feasibility::simple_bounds::SimpleBounds;
use crate::ids::JobIndex;
use crate::problem::Problem;
use crate::time::TimeValue;

/// Visitor interface over a dispatch state-space traversal. Every node
/// carries an `Attachment` the agent controls; the traversal never
/// inspects it beyond cloning it across the events below.
pub trait DispatchAgent<T> {
    type Attachment: Clone;

    fn create_initial_attachment(&mut self) -> Self::Attachment;

    fn create_next_attachment(&mut self, parent: &Self::Attachment, next_job: JobIndex) -> Self::Attachment;

    fn merge_attachments(&mut self, destination: &mut Self::Attachment, parent: &Self::Attachment, next_job: JobIndex);

    fn missed_deadline(&mut self, failed: &Self::Attachment, late_job: JobIndex);

    fn mark_as_leaf_node(&mut self, leaf: &Self::Attachment);

    /// Whether two states reached by the same taken job should be fused.
    /// Default: always merge. The rating-graph agent overrides this to
    /// keep deadline-missing branches from merging into healthy ones.
    fn allow_merge(&mut self, _parent: &Self::Attachment, _taken_job: JobIndex, _destination: &Self::Attachment) -> bool {
        true
    }
}

/// The simplest agent: answers *is-schedulable?* and nothing else.
#[derive(Default)]
pub struct NullAgent;

impl<T> DispatchAgent<T> for NullAgent {
    type Attachment = ();

    fn create_initial_attachment(&mut self) {}
    fn create_next_attachment(&mut self, _parent: &(), _next_job: JobIndex) {}
    fn merge_attachments(&mut self, _destination: &mut (), _parent: &(), _next_job: JobIndex) {}
    fn missed_deadline(&mut self, _failed: &(), _late_job: JobIndex) {}
    fn mark_as_leaf_node(&mut self, _leaf: &()) {}
}

/// Convenience entry point: runs [`explore`] with [`NullAgent`] and
/// reports only the yes/no answer.
pub fn is_schedulable<T: TimeValue>(problem: &Problem<T>, bounds: &SimpleBounds<T>) -> bool {
    explore(problem, bounds, &mut NullAgent)
}

struct Frame<T, A> {
    node: ActiveNode<T>,
    attachment: A,
}

fn states_equivalent<T: TimeValue>(a: &ActiveNode<T>, b: &ActiveNode<T>) -> bool {
    if a.completed() != b.completed() {
        return false;
    }
    if a.core_availability() != b.core_availability() {
        return false;
    }
    let mut running_a = a.running().to_vec();
    let mut running_b = b.running().to_vec();
    running_a.sort_by_key(|r| r.index.0);
    running_b.sort_by_key(|r| r.index.0);
    running_a == running_b
}

/// Breadth-first traversal of the non-preemptive dispatch state space,
/// layered by number of jobs dispatched so far (every path dispatches
/// exactly one job per hop, so all states in a layer are the same depth).
/// Returns whether at least one reachable completion dispatches every job
/// without missing a deadline.
pub fn explore<T: TimeValue, A: DispatchAgent<T>>(problem: &Problem<T>, bounds: &SimpleBounds<T>, agent: &mut A) -> bool {
    let mut schedulable = false;
    let mut frontier = vec![Frame {
        node: ActiveNode::root(problem),
        attachment: agent.create_initial_attachment(),
    }];

    while !frontier.is_empty() {
        let mut next_frontier: Vec<Frame<T, A::Attachment>> = Vec::new();

        for frame in frontier {
            if frame.node.all_dispatched(problem) {
                agent.mark_as_leaf_node(&frame.attachment);
                schedulable = true;
                continue;
            }

            for job in problem.workload() {
                let job_index = job.index();
                if frame.node.is_dispatched(job_index) {
                    continue;
                }
                if frame.node.predict_start_time(problem, job_index).is_err() {
                    continue;
                }

                let mut child = frame.node.copy();
                child
                    .schedule(problem, bounds, job_index)
                    .expect("readiness was already checked via predict_start_time");

                if child.missed_deadline() {
                    let attachment = agent.create_next_attachment(&frame.attachment, job_index);
                    agent.missed_deadline(&attachment, job_index);
                    continue;
                }

                let existing = next_frontier.iter_mut().find(|f| states_equivalent(&f.node, &child));
                match existing {
                    Some(existing) if agent.allow_merge(&frame.attachment, job_index, &existing.attachment) => {
                        existing.node = existing.node.merge(&child);
                        agent.merge_attachments(&mut existing.attachment, &frame.attachment, job_index);
                    }
                    _ => {
                        let attachment = agent.create_next_attachment(&frame.attachment, job_index);
                        next_frontier.push(Frame { node: child, attachment });
                    }
                }
            }
        }

        frontier = next_frontier;
    }

    schedulable
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
    fn two_independent_jobs_on_one_core_are_schedulable() {
        let problem = Problem::new(vec![job(0, 0, 0, 3, 10), job(0, 1, 0, 3, 10)], vec![], vec![], 1);
        let bounds = SimpleBounds::compute(&problem);
        assert!(is_schedulable(&problem, &bounds));
    }

    #[test]
    fn tight_deadlines_on_one_core_are_unschedulable() {
        let problem = Problem::new(vec![job(0, 0, 0, 8, 10), job(0, 1, 0, 8, 10)], vec![], vec![], 1);
        let bounds = SimpleBounds::compute(&problem);
        assert!(!is_schedulable(&problem, &bounds));
    }
}
