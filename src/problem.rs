//! ## Problem model
//!
//! #### Model:
//! - [`Job`]: arrival/cost windows, deadline, priority, optional
//!   min-parallelism, resolved [`JobIndex`].
//! - [`PrecedenceConstraint`]: a directed, possibly-suspending dependency
//!   between two jobs, tagged with the event ([`SignalAt`]) the
//!   successor's ready time is computed from.
//! - [`AbortAction`]: carried on the problem for passthrough only; the
//!   core never interprets it.
//! - [`Problem`]: the immutable workload plus the precedence list, which
//!   is the only part ever mutated after construction — and only by
//!   appending.

use crate::ids::{JobId, JobIndex};
use crate::interval::Interval;
use crate::time::TimeValue;
use std::collections::HashMap;

/// Which event on the predecessor releases the successor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum SignalAt {
    /// The successor becomes ready `s_max` after the predecessor *finishes*.
    Completion,
    /// The successor becomes ready `s_max` after the predecessor *starts*.
    Start,
}

#[derive(Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Job<T> {
    pub id: JobId,
    arrival: Interval<T>,
    cost: Interval<T>,
    deadline: T,
    /// Lower value means higher priority.
    pub priority: u32,
    /// `1` unless this is a gang/parallel job.
    pub min_parallelism: u32,
    #[serde(skip)]
    index: JobIndex,
}

impl<T: TimeValue> Job<T> {
    pub fn new(
        id: JobId,
        arrival: Interval<T>,
        cost: Interval<T>,
        deadline: T,
        priority: u32,
    ) -> Self {
        assert!(cost.max() <= deadline, "cost_max must not exceed the deadline");
        assert!(!deadline.is_infinite(), "deadline must be finite");
        Self {
            id,
            arrival,
            cost,
            deadline,
            priority,
            min_parallelism: 1,
            index: JobIndex(0),
        }
    }

    pub fn with_min_parallelism(mut self, min_parallelism: u32) -> Self {
        self.min_parallelism = min_parallelism;
        self
    }

    pub fn arrival(&self) -> Interval<T> {
        self.arrival
    }

    pub fn cost(&self) -> Interval<T> {
        self.cost
    }

    pub fn earliest_arrival(&self) -> T {
        self.arrival.min()
    }

    pub fn latest_arrival(&self) -> T {
        self.arrival.max()
    }

    pub fn min_cost(&self) -> T {
        self.cost.min()
    }

    pub fn max_cost(&self) -> T {
        self.cost.max()
    }

    pub fn deadline(&self) -> T {
        self.deadline
    }

    pub fn index(&self) -> JobIndex {
        self.index
    }
}

#[derive(Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct PrecedenceConstraint<T> {
    from: JobId,
    to: JobId,
    #[serde(skip)]
    from_index: JobIndex,
    #[serde(skip)]
    to_index: JobIndex,
    suspension: Interval<T>,
    signal_at: SignalAt,
}

impl<T: TimeValue> PrecedenceConstraint<T> {
    pub fn new(from: JobId, to: JobId, suspension: Interval<T>, signal_at: SignalAt) -> Self {
        Self {
            from,
            to,
            from_index: JobIndex(0),
            to_index: JobIndex(0),
            suspension,
            signal_at,
        }
    }

    /// A zero-suspension, signal-at-Start dispatch-ordering constraint —
    /// the kind the cut enforcer and ordering generator append.
    pub fn dispatch_ordering(from: JobId, to: JobId) -> Self {
        Self::new(from, to, Interval::new(T::zero(), T::zero()), SignalAt::Start)
    }

    pub fn from_id(&self) -> JobId {
        self.from
    }

    pub fn to_id(&self) -> JobId {
        self.to
    }

    pub fn from_index(&self) -> JobIndex {
        self.from_index
    }

    pub fn to_index(&self) -> JobIndex {
        self.to_index
    }

    pub fn min_suspension(&self) -> T {
        self.suspension.from()
    }

    pub fn max_suspension(&self) -> T {
        self.suspension.until()
    }

    pub fn signal_at(&self) -> SignalAt {
        self.signal_at
    }
}

#[derive(Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct AbortAction<T> {
    pub job: JobId,
    pub window: Interval<T>,
}

#[derive(Clone, Debug)]
pub struct Problem<T> {
    workload: Vec<Job<T>>,
    precedence: Vec<PrecedenceConstraint<T>>,
    aborts: Vec<AbortAction<T>>,
    num_processors: u32,
    /// Number of precedence constraints present right after construction;
    /// everything at index `>= original_precedence_count` was appended
    /// during reconfiguration and is a candidate for minimization.
    original_precedence_count: usize,
}

/// On-disk shape of a [`Problem`]: just the parsed-from-source parts.
/// `Problem` itself isn't `Serialize`/`Deserialize` directly, because
/// `original_precedence_count` isn't data to round-trip — a freshly
/// loaded problem always treats every precedence constraint it carries
/// as original, which is exactly what routing a load through
/// [`Problem::new`] gives for free.
#[derive(serde::Serialize, serde::Deserialize)]
struct ProblemFile<T> {
    workload: Vec<Job<T>>,
    precedence: Vec<PrecedenceConstraint<T>>,
    aborts: Vec<AbortAction<T>>,
    num_processors: u32,
}

impl<T: TimeValue> Problem<T> {
    /// Builds a problem, assigning dense indices to jobs in workload order
    /// and resolving every precedence constraint's job ids to indices.
    ///
    /// Panics (a caller bug, not a data error) if a constraint references
    /// an unknown [`JobId`] or a suspension interval is malformed.
    pub fn new(
        workload: Vec<Job<T>>,
        mut precedence: Vec<PrecedenceConstraint<T>>,
        aborts: Vec<AbortAction<T>>,
        num_processors: u32,
    ) -> Self {
        assert!(num_processors >= 1, "a problem needs at least one processor");

        let mut id_to_index = HashMap::with_capacity(workload.len());
        let mut workload = workload;
        for (i, job) in workload.iter_mut().enumerate() {
            job.index = JobIndex(i);
            let previous = id_to_index.insert(job.id, JobIndex(i));
            assert!(previous.is_none(), "duplicate job id {:?}", job.id);
        }

        for prec in precedence.iter_mut() {
            assert!(
                prec.min_suspension() <= prec.max_suspension(),
                "precedence suspension interval must be well-formed"
            );
            prec.from_index = *id_to_index
                .get(&prec.from)
                .unwrap_or_else(|| panic!("unknown job id {:?} in precedence constraint", prec.from));
            prec.to_index = *id_to_index
                .get(&prec.to)
                .unwrap_or_else(|| panic!("unknown job id {:?} in precedence constraint", prec.to));
        }

        let original_precedence_count = precedence.len();
        Self {
            workload,
            precedence,
            aborts,
            num_processors,
            original_precedence_count,
        }
    }

    pub fn workload(&self) -> &[Job<T>] {
        &self.workload
    }

    pub fn job(&self, index: JobIndex) -> &Job<T> {
        &self.workload[index.0]
    }

    pub fn precedence(&self) -> &[PrecedenceConstraint<T>] {
        &self.precedence
    }

    pub fn aborts(&self) -> &[AbortAction<T>] {
        &self.aborts
    }

    pub fn num_processors(&self) -> u32 {
        self.num_processors
    }

    pub fn num_jobs(&self) -> usize {
        self.workload.len()
    }

    pub fn original_precedence_count(&self) -> usize {
        self.original_precedence_count
    }

    /// Predecessors of `job`, grouped for active-node dispatch.
    pub fn predecessors_of(&self, job: JobIndex) -> impl Iterator<Item = &PrecedenceConstraint<T>> {
        self.precedence.iter().filter(move |pc| pc.to_index == job)
    }

    /// Successors of `job`.
    pub fn successors_of(&self, job: JobIndex) -> impl Iterator<Item = &PrecedenceConstraint<T>> {
        self.precedence.iter().filter(move |pc| pc.from_index == job)
    }

    /// Appends a new precedence constraint, resolving its ids to indices.
    /// The only mutation a `Problem` ever undergoes after construction.
    pub fn append_precedence(&mut self, mut prec: PrecedenceConstraint<T>) {
        let from_index = self
            .workload
            .iter()
            .find(|j| j.id == prec.from)
            .unwrap_or_else(|| panic!("unknown job id {:?}", prec.from))
            .index;
        let to_index = self
            .workload
            .iter()
            .find(|j| j.id == prec.to)
            .unwrap_or_else(|| panic!("unknown job id {:?}", prec.to))
            .index;
        prec.from_index = from_index;
        prec.to_index = to_index;
        self.precedence.push(prec);
    }

    /// Whether `self.precedence` already contains an appended constraint
    /// `from -> to` (used by the cut enforcer to stay idempotent).
    pub fn has_appended_edge(&self, from: JobIndex, to: JobIndex) -> bool {
        self.precedence[self.original_precedence_count..]
            .iter()
            .any(|pc| pc.from_index == from && pc.to_index == to)
    }

    /// Appended precedence constraints, i.e. everything past the original
    /// slice — the candidates the minimizers operate on.
    pub fn appended_precedence(&self) -> &[PrecedenceConstraint<T>] {
        &self.precedence[self.original_precedence_count..]
    }

    /// Removes appended constraints by their absolute index in
    /// `self.precedence` (all indices must be `>= original_precedence_count`).
    pub fn remove_appended_constraints(&mut self, mut indices: Vec<usize>) {
        indices.sort_unstable();
        indices.dedup();
        for index in indices.into_iter().rev() {
            assert!(index >= self.original_precedence_count, "cannot remove an original constraint");
            self.precedence.remove(index);
        }
    }

    /// Serializes the workload, precedence and aborts (but not the
    /// appended/original split) to pretty JSON — the `dump_problem` half
    /// of the dump/reparse round-trip.
    pub fn dump_to_json(&self) -> serde_json::Result<String>
    where
        T: serde::Serialize,
    {
        let file = ProblemFile {
            workload: self.workload.clone(),
            precedence: self.precedence.clone(),
            aborts: self.aborts.clone(),
            num_processors: self.num_processors,
        };
        serde_json::to_string_pretty(&file)
    }

    /// Loads a problem from JSON in the shape [`Self::dump_to_json`]
    /// produces, reassigning indices exactly as [`Self::new`] would for
    /// freshly parsed sources.
    pub fn load_from_json(data: &str) -> serde_json::Result<Self>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        let file: ProblemFile<T> = serde_json::from_str(data)?;
        Ok(Self::new(file.workload, file.precedence, file.aborts, file.num_processors))
    }
}
