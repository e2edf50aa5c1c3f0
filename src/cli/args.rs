use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lane_pipeline")]
#[command(about = "Lane-parallel event processing with asynchronous data product retrieval")]
#[command(version)]
pub struct Cli {
    /// Increase log verbosity (-v: debug, -vv: trace). RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the pipeline over a synthetic event source
    Run(RunArgs),
}

#[derive(clap::Args, Clone, Debug)]
pub struct RunArgs {
    /// Number of concurrent lanes (defaults to the CPU count)
    #[arg(short, long)]
    pub lanes: Option<usize>,

    /// Number of runtime worker threads (defaults to the CPU count)
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Number of events provided by the source (unbounded when omitted)
    #[arg(short, long)]
    pub events: Option<u64>,

    /// Waiter scale factor in microseconds per byte (negative disables waiters)
    #[arg(short, long, default_value_t = -1.0, allow_negative_numbers = true)]
    pub scale: f64,

    /// Data products as name:type:size, comma separated
    #[arg(short, long, default_value = "EventAuxiliary:aux:32,tracks.hits:f32:1024,calo:u16:4096")]
    pub products: String,

    /// Seek delay applied to every event, in microseconds
    #[arg(long, default_value_t = 0)]
    pub seek_delay_us: u64,

    /// Output sink to use
    #[arg(short, long, value_enum, default_value_t = OutputerKind::Null)]
    pub outputer: OutputerKind,

    /// Output file path for the json outputer
    #[arg(long, default_value = "events.jsonl")]
    pub output: PathBuf,

    /// Exercise the per-product readiness hook of the output sink
    #[arg(long)]
    pub product_ready: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputerKind {
    Null,
    Memory,
    Json,
}
