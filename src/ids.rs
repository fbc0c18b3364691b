//! Job identity: the externally-facing [`JobId`] pair and the dense,
//! load-time-assigned [`JobIndex`] ordinal that the rest of the core
//! operates on.

/// External identity of a job: a `(task_id, job_id)` pair, unique within a
/// problem. Never used as an array index — see [`JobIndex`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct JobId {
    pub task_id: u64,
    pub job_id: u64,
}

impl JobId {
    pub fn new(task_id: u64, job_id: u64) -> Self {
        Self { task_id, job_id }
    }
}

/// Dense `0..N` ordinal assigned to a job once, at problem-load time.
/// External [`JobId`]s are mapped to a `JobIndex` exactly once; every
/// subsequent algorithm indexes workload vectors directly by this value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JobIndex(pub usize);

impl JobIndex {
    pub fn value(self) -> usize {
        self.0
    }
}

impl From<usize> for JobIndex {
    fn from(value: usize) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for JobIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
