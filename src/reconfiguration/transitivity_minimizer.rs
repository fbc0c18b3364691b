//! ## Transitivity minimizer
//!
//! Removes an appended precedence constraint `from -> to` whenever `to`
//! is already reachable from `from` through *other* appended constraints:
//! the ordering it enforces is implied transitively, so dropping it
//! can't turn a schedulable problem back into an unschedulable one.
//! Originals (everything below [`Problem::original_precedence_count`])
//! are never touched.

use crate::ids::JobIndex;
use crate::problem::Problem;
use crate::time::TimeValue;
use std::collections::VecDeque;

pub struct TransitivityMinimizer;

impl TransitivityMinimizer {
    pub fn minimize<T: TimeValue>(problem: &mut Problem<T>) {
        let original_count = problem.original_precedence_count();
        let appended: Vec<(usize, JobIndex, JobIndex)> = problem
            .precedence()
            .iter()
            .enumerate()
            .skip(original_count)
            .map(|(i, pc)| (i, pc.from_index(), pc.to_index()))
            .collect();

        let redundant: Vec<usize> = appended
            .iter()
            .filter(|&&(index, from, to)| reachable_via_others(problem.num_jobs(), &appended, index, from, to))
            .map(|&(index, _, _)| index)
            .collect();

        problem.remove_appended_constraints(redundant);
    }
}

/// BFS over every appended edge except `exclude_index`, from `from`,
/// looking for `to`.
fn reachable_via_others(
    num_jobs: usize,
    appended: &[(usize, JobIndex, JobIndex)],
    exclude_index: usize,
    from: JobIndex,
    to: JobIndex,
) -> bool {
    let mut adjacency: Vec<Vec<JobIndex>> = vec![Vec::new(); num_jobs];
    for &(index, f, t) in appended {
        if index != exclude_index {
            adjacency[f.value()].push(t);
        }
    }

    let mut visited = vec![false; num_jobs];
    let mut queue = VecDeque::new();
    queue.push_back(from);
    visited[from.value()] = true;

    while let Some(current) = queue.pop_front() {
        for &next in &adjacency[current.value()] {
            if next == to {
                return true;
            }
            if !visited[next.value()] {
                visited[next.value()] = true;
                queue.push_back(next);
            }
        }
    }

    false
}
