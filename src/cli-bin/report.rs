//! Builds the spec's one-line schedulability output record:
//! `name, schedulable?(0/1), #jobs, #nodes, #states, #edges, max-width,
//! cpu-time, memory-kiB, timeout?, #cpus`.

use reconf_engine::prelude::*;
use std::time::Duration;

pub struct OutputRecord {
    pub name: String,
    pub schedulable: bool,
    pub num_jobs: usize,
    pub num_nodes: usize,
    pub num_states: usize,
    pub num_edges: usize,
    pub max_width: usize,
    pub cpu_time: Duration,
    pub memory_kib: u64,
    pub timed_out: bool,
    pub num_cpus: u32,
}

impl std::fmt::Display for OutputRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}, {}, {}, {}, {}, {}, {}, {:.3}, {}, {}, {}",
            self.name,
            self.schedulable as u8,
            self.num_jobs,
            self.num_nodes,
            self.num_states,
            self.num_edges,
            self.max_width,
            self.cpu_time.as_secs_f64(),
            self.memory_kib,
            self.timed_out as u8,
            self.num_cpus,
        )
    }
}

/// Widest per-depth layer of `graph`, computed by a single BFS from the
/// root — the rating graph is already topologically ordered (parent index
/// `<` child index), so a plain forward sweep assigns depths correctly.
pub fn max_frontier_width(graph: &RatingGraph) -> usize {
    let mut depth = vec![0usize; graph.nodes.len()];
    let mut width_by_depth: Vec<usize> = vec![1];

    let mut graph = graph.clone();
    graph.sort_by_parent();
    for edge in &graph.edges {
        let d = depth[edge.parent.0] + 1;
        depth[edge.child.0] = d;
        if d >= width_by_depth.len() {
            width_by_depth.push(0);
        }
        width_by_depth[d] += 1;
    }

    width_by_depth.into_iter().max().unwrap_or(0)
}

/// Resident set size, in KiB, read from `/proc/self/status` (Linux only).
/// Returns `0` if unavailable — the value is diagnostic, not load-bearing.
pub fn current_memory_kib() -> u64 {
    let Ok(status) = std::fs::read_to_string("/proc/self/status") else { return 0 };
    status
        .lines()
        .find(|line| line.starts_with("VmRSS:"))
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|kib| kib.parse().ok())
        .unwrap_or(0)
}
