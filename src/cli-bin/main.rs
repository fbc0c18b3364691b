mod args;
mod report;
mod validate;

use args::{Args, TimeKind};
use reconf_engine::prelude::*;
use report::OutputRecord;
use std::time::{Duration, Instant};
use validate::validate_raw;

fn main() {
    let args = <Args as clap::Parser>::parse();
    let exit_code = match run(&args) {
        Ok(record) => {
            if args.quiet {
                record.schedulable as i32
            } else {
                println!("{record}");
                0
            }
        }
        Err(err) => {
            if !args.quiet {
                eprintln!("{err}");
            }
            err.exit_code()
        }
    };
    std::process::exit(exit_code);
}

enum CliError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Validation(validate::ValidationError),
    Internal(anyhow::Error),
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            CliError::Io(_) | CliError::Parse(_) => 1,
            CliError::Validation(err) => err.exit_code(),
            CliError::Internal(_) => 2,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Parse(err) => write!(f, "parse error: {err}"),
            CliError::Validation(err) => write!(f, "{err}"),
            CliError::Internal(err) => write!(f, "{err}"),
        }
    }
}

fn run(args: &Args) -> Result<OutputRecord, CliError> {
    let data = std::fs::read_to_string(&args.problem_file).map_err(CliError::Io)?;
    validate_raw(&data).map_err(CliError::Validation)?;

    match args.time_kind {
        TimeKind::Discrete => run_with_time::<DiscreteTime>(args, &data),
        TimeKind::Dense => run_with_time::<DenseTime>(args, &data),
    }
}

fn run_with_time<T>(args: &Args, data: &str) -> Result<OutputRecord, CliError>
where
    T: TimeValue + serde::Serialize + for<'de> serde::Deserialize<'de>,
{
    let mut problem: Problem<T> = Problem::load_from_json(data).map_err(CliError::Parse)?;
    let num_jobs = problem.num_jobs();
    let num_cpus = problem.num_processors();

    let options = Options {
        num_threads: args.num_threads,
        timeout: args.timeout_ms.map(Duration::from_millis),
        max_cuts_per_iter: args.max_cuts_per_iter,
        skip_chance: args.skip_chance,
        dry_rating: args.dry_rating,
        enforce_safe_path: args.enforce_safe_path,
    };

    let start = Instant::now();
    let report = reconfigure(&mut problem, &options);
    let (schedulable, timed_out) = match &report {
        Ok(report) => (report.final_state == CutLoopState::Done, report.timed_out),
        Err(ReconfigurationError::SchedulabilityFailure) => (false, false),
        Err(err) => return Err(CliError::Internal(anyhow::anyhow!("{err}"))),
    };

    if schedulable && !options.dry_rating {
        minimize(&mut problem, &options).map_err(|err| CliError::Internal(anyhow::anyhow!("{err}")))?;
    }

    let bounds = SimpleBounds::compute(&problem)
        .into_result()
        .map_err(|err| CliError::Internal(anyhow::anyhow!("{err}")))?;
    let rating_graph = build_rating_graph(&problem, &bounds);

    Ok(OutputRecord {
        name: args.problem_file.clone(),
        schedulable,
        num_jobs,
        num_nodes: rating_graph.nodes.len(),
        num_states: rating_graph.nodes.len(),
        num_edges: rating_graph.edges.len(),
        max_width: report::max_frontier_width(&rating_graph),
        cpu_time: start.elapsed(),
        memory_kib: report::current_memory_kib(),
        timed_out,
        num_cpus,
    })
}
