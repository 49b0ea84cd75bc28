use ecommerce_report::cli::Args;
use ecommerce_report::output::OutputWriter;
use ecommerce_report::{build_report, create_source, display_report, DatasetCache, TimeWindow};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let num_threads = std::thread::available_parallelism()
        .map(|x| x.get())
        .unwrap_or(4);
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .thread_name(|i| format!("rayon-worker-{}", i))
        .build_global()
        .context("Failed to initialize Rayon thread pool")?;

    let args = Args::parse();
    let config = args.into_config()?;

    info!("Starting e-commerce report with config: {:?}", config);

    let source = create_source(&config.data, &config)?;
    let datasets = DatasetCache::new();
    let dataset = datasets
        .get_or_load(source.as_ref())
        .await
        .context("Failed to load dataset")?;

    let window = TimeWindow::resolve(config.start, config.end, &dataset.orders)
        .context("The orders table is empty; pass both --start and --end")?;

    let report = build_report(&dataset, window, config.top_n);

    display_report(&report);

    let paths = OutputWriter::new().write_report(&config, &report)?;
    if !paths.is_empty() {
        info!("Exported {} files to {}", paths.len(), config.output_dir.display());
    }

    Ok(())
}
