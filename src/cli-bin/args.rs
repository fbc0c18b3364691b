const DEFAULT_AFTER_HELP: &str = "Refer to the crate's documentation for further help";

#[derive(clap::Parser, Debug)]
#[command(after_help = DEFAULT_AFTER_HELP)]
pub struct Args {
    /// Problem file, in the JSON shape `Problem::dump_to_json` produces.
    #[arg(value_name = "PROBLEM FILE")]
    pub problem_file: String,

    /// Time representation to parse the problem with.
    #[arg(short = 't', long = "time", value_name = "TIME KIND", default_value = "discrete")]
    pub time_kind: TimeKind,

    /// Only build the rating graph and feasibility overlay; never append
    /// repair constraints.
    #[arg(long = "dry-rating", default_value = "false", action = clap::ArgAction::SetTrue)]
    pub dry_rating: bool,

    /// Worker count for the randomized trial minimizer.
    #[arg(long = "threads", value_name = "N", default_value = "1")]
    pub num_threads: usize,

    /// Wall-clock budget for the cut loop, in milliseconds; unset means no timeout.
    #[arg(long = "timeout-ms", value_name = "MILLIS")]
    pub timeout_ms: Option<u64>,

    /// Starting per-iteration cut budget.
    #[arg(long = "max-cuts", value_name = "N", default_value = "8")]
    pub max_cuts_per_iter: usize,

    /// Per-step probability (0..100) that the ordering generator skips its
    /// greedy choice during randomized retries.
    #[arg(long = "skip-chance", value_name = "0..100", default_value = "10")]
    pub skip_chance: u32,

    /// Also enforce the chosen safe path's pairwise ordering alongside
    /// each round of cuts, instead of relying on the cuts alone.
    #[arg(long = "enforce-safe-path", default_value = "false", action = clap::ArgAction::SetTrue)]
    pub enforce_safe_path: bool,

    /// Exit code as analysis result instead of printing the output record.
    ///
    /// A zero exit code means the problem is schedulable, a one means it
    /// is not, any other code means an error occurred.
    #[arg(short = 'q', default_value = "false", action = clap::ArgAction::SetTrue)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TimeKind {
    Discrete,
    Dense,
}
