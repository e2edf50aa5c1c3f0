use crate::cli::args::{OutputerKind, RunArgs};
use crate::core::ProcessingSummary;
use crate::engine::ProcessingEngine;
use crate::output::{
    JsonLinesOutputer, MemoryOutputer, NullOutputer, Outputer, DEFAULT_RECORD_LIMIT,
};
use crate::processing::{ConsoleProgressReporter, DefaultPipelineConfig, PipelineConfig};
use crate::source::{ProductSpec, SharedSource, TestProductsSource};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;

/// Build the pipeline configuration from command line arguments
pub fn build_config(args: &RunArgs, verbosity: u8) -> DefaultPipelineConfig {
    let mut config = DefaultPipelineConfig::default()
        .with_max_events(args.events)
        .with_scale_factor(args.scale)
        .with_verbosity(verbosity);
    if let Some(lanes) = args.lanes {
        config = config.with_lanes(lanes);
    }
    if let Some(threads) = args.threads {
        config = config.with_threads(threads);
    }
    config
}

/// Execute run command on the current tokio runtime
pub async fn execute_run(args: RunArgs, config: DefaultPipelineConfig) -> Result<ProcessingSummary> {
    config.validate().context("Invalid pipeline configuration")?;

    let source = build_source(&args, &config)?;
    let outputer = build_outputer(&args, config.num_lanes());

    println!("🚀 Lane pipeline");
    println!("⚙️  Settings:");
    println!("   - Lanes: {}", config.num_lanes());
    println!("   - Threads: {}", config.num_threads());
    println!("   - Products: {}", source.data_products(0).len());
    println!("   - Outputer: {:?}", args.outputer);
    if args.outputer == OutputerKind::Json {
        println!("📄 Output file: {}", args.output.display());
    }

    let engine = ProcessingEngine::new(source, outputer, config, ConsoleProgressReporter::new());
    let summary = engine.run().await.context("Pipeline run failed")?;

    Ok(summary)
}

fn build_source(args: &RunArgs, config: &DefaultPipelineConfig) -> Result<Arc<dyn SharedSource>> {
    let products = ProductSpec::parse_list(&args.products)
        .with_context(|| format!("Invalid product list: {}", args.products))?;

    let mut builder = TestProductsSource::builder(config.num_lanes())
        .products(products)
        .seek_delay(Duration::from_micros(args.seek_delay_us));
    if let Some(events) = config.max_events() {
        builder = builder.max_events(events);
    }

    Ok(Arc::new(builder.build()?))
}

fn build_outputer(args: &RunArgs, num_lanes: usize) -> Arc<dyn Outputer> {
    match args.outputer {
        OutputerKind::Null => Arc::new(NullOutputer::new().with_product_ready(args.product_ready)),
        OutputerKind::Memory => Arc::new(
            MemoryOutputer::bounded(num_lanes, DEFAULT_RECORD_LIMIT)
                .with_product_ready(args.product_ready),
        ),
        OutputerKind::Json => Arc::new(JsonLinesOutputer::new(&args.output, num_lanes)),
    }
}
