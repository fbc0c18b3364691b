//! ## Interval tree
//!
//! A static, centered interval tree built once and queried many times,
//! used by the interval test to find all per-job windows overlapping a
//! given one. Splits a node's `middle` bucket once it holds 50+ entries,
//! around the median interval's midpoint, pushing fully-left/fully-right
//! intervals down into `before`/`after` and keeping the rest at this
//! level. Queries walk an explicit stack rather than recursing.

use crate::ids::JobIndex;
use crate::time::TimeValue;

const SPLIT_THRESHOLD: usize = 50;

#[derive(Clone, Copy, Debug)]
pub struct FInterval<T> {
    pub job_index: JobIndex,
    pub start: T,
    pub end: T,
}

#[derive(Debug)]
pub struct IntervalTree<T> {
    split_time: Option<T>,
    middle: Vec<FInterval<T>>,
    before: Option<Box<IntervalTree<T>>>,
    after: Option<Box<IntervalTree<T>>>,
}

impl<T: TimeValue> Default for IntervalTree<T> {
    fn default() -> Self {
        Self {
            split_time: None,
            middle: Vec::new(),
            before: None,
            after: None,
        }
    }
}

impl<T: TimeValue> IntervalTree<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a tree from a batch of intervals in one shot.
    pub fn build(intervals: Vec<FInterval<T>>) -> Self {
        let mut tree = Self::new();
        for interval in intervals {
            tree.insert(interval);
        }
        tree.split();
        tree
    }

    pub fn insert(&mut self, interval: FInterval<T>) {
        assert!(self.before.is_none() && self.after.is_none(), "cannot insert after splitting");
        self.middle.push(interval);
    }

    pub fn split(&mut self) {
        assert!(self.before.is_none() && self.after.is_none());
        if self.middle.len() < SPLIT_THRESHOLD {
            return;
        }

        self.middle.sort_by(|a, b| {
            a.start.saturating_add(a.end).cmp(&b.start.saturating_add(b.end))
        });
        let median = &self.middle[self.middle.len() / 2];
        let split_time = median.start.midpoint(median.end);
        self.split_time = Some(split_time);

        let mut before = Box::new(Self::new());
        let mut after = Box::new(Self::new());
        let mut kept = Vec::new();

        for interval in self.middle.drain(..) {
            if interval.end <= split_time {
                before.insert(interval);
            } else if interval.start >= split_time {
                after.insert(interval);
            } else {
                kept.push(interval);
            }
        }

        self.middle = kept;
        before.split();
        after.split();
        self.before = Some(before);
        self.after = Some(after);
    }

    /// All stored intervals that overlap `query` (open-interval test,
    /// matching the source's `start < end && end > start`).
    pub fn query(&self, query: &FInterval<T>) -> Vec<FInterval<T>> {
        let mut output = Vec::new();
        let mut stack: Vec<&IntervalTree<T>> = Vec::new();

        if let (Some(before), Some(split_time)) = (&self.before, self.split_time) {
            if query.start < split_time {
                stack.push(before);
            }
        }
        if let (Some(after), Some(split_time)) = (&self.after, self.split_time) {
            if query.end > split_time {
                stack.push(after);
            }
        }
        for candidate in &self.middle {
            if candidate.start < query.end && candidate.end > query.start {
                output.push(*candidate);
            }
        }

        while let Some(node) = stack.pop() {
            if let (Some(before), Some(split_time)) = (&node.before, node.split_time) {
                if query.start < split_time {
                    stack.push(before);
                }
            }
            if let (Some(after), Some(split_time)) = (&node.after, node.split_time) {
                if query.end > split_time {
                    stack.push(after);
                }
            }
            for candidate in &node.middle {
                if candidate.start < query.end && candidate.end > query.start {
                    output.push(*candidate);
                }
            }
        }

        output
    }
}
