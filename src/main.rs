use anyhow::Result;
use clap::Parser;
use lane_pipeline::cli::{build_config, execute_run, Cli, Commands};
use lane_pipeline::processing::PipelineConfig;
use lane_pipeline::PipelineError;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => {
            let config = build_config(&args, cli.verbose);
            init_tracing(config.verbosity());

            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(config.num_threads().max(1))
                .thread_name("lane-worker")
                .enable_all()
                .build()
                .map_err(PipelineError::runtime)?;

            if let Err(error) = runtime.block_on(execute_run(args, config)) {
                eprintln!("❌ Error: {error:#}");
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

/// RUST_LOG が設定されていればそれを優先し、なければ -v の回数で決める
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("lane_pipeline={default_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
