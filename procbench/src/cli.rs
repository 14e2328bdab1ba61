use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    /// Comma-separated table, one row per benchmark size (default).
    Csv,
    /// Human-readable per-size blocks with units.
    HumanReadable,
    /// One JSON object per row (NDJSON) to stdout.
    Json,
}

#[derive(Debug, Parser)]
#[command(
    name = "procbench",
    author,
    version,
    about = "Resource-profiling harness for comparing external programs",
    long_about = "procbench launches already-compiled programs against a sequence of benchmark \
inputs, polls each child's OS-reported memory and CPU counters until it exits, and prints one \
aggregated row per input size.\n\nA suite file lists the target programs, the input template, \
and the trial counts; CLI flags override suite values.",
    after_help = "Examples:\n  procbench run suite.yaml\n  procbench run suite.yaml --iterations 100 --output human-readable\n  procbench run suite.yaml --poll-interval 500us --trial-timeout 30s > results.csv\n  procbench init bench/"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a benchmark suite
    #[command(
        long_about = "Run every target in the suite against every benchmark size, measuring each \
size with N sequential trials, and stream one output row per size to stdout."
    )]
    Run(RunArgs),

    /// Scaffold a commented sample suite file
    Init(InitArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Path to the suite file (.yaml)
    pub suite: PathBuf,

    /// Override trials per benchmark size
    #[arg(long)]
    pub iterations: Option<u32>,

    /// Override the highest benchmark size (sizes run 1..=N)
    #[arg(long)]
    pub max_size: Option<u64>,

    /// Minimum measured trials below which a row is reported as unmeasured
    #[arg(long)]
    pub min_measured: Option<u32>,

    /// Sleep between polls once the tight window has passed (0 = busy-poll)
    #[arg(long, value_parser = humantime::parse_duration)]
    pub poll_interval: Option<Duration>,

    /// How long to busy-poll each trial before switching to the poll interval
    #[arg(long, value_parser = humantime::parse_duration)]
    pub poll_tight_for: Option<Duration>,

    /// Kill any trial that runs longer than this
    #[arg(long, value_parser = humantime::parse_duration)]
    pub trial_timeout: Option<Duration>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    pub output: OutputFormat,
}

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Target directory (created if missing)
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// Overwrite an existing suite file
    #[arg(long)]
    pub force: bool,
}
