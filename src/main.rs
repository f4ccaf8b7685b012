//! tilecut - split large images into a grid of independent TIFF tiles.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tilecut::{
    config::Cli, naming::base_name, sink::TiffDirectorySink, source::DecodedImageSource,
    TilingPipeline,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = cli.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let source = match DecodedImageSource::open(&cli.input) {
        Ok(source) => source,
        Err(e) => {
            error!("Cannot read input {}: {}", cli.input.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let base = base_name(&cli.input);
    let sink = match TiffDirectorySink::create(&cli.output_dir, base).await {
        Ok(sink) => sink,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    info!(
        input = %cli.input.display(),
        output = %cli.output_dir.display(),
        tile_width = cli.tile_width,
        tile_height = cli.tile_height,
        overlap = cli.overlap,
        policy = ?cli.policy(),
        "starting tiling run"
    );

    let pipeline = TilingPipeline::new(source, sink, cli.tile_request())
        .with_max_in_flight(cli.jobs);

    match pipeline.run().await {
        Ok(summary) => {
            info!(
                "Wrote {} tile(s) across {} plane(s) in {} series",
                summary.tiles_written, summary.planes, summary.series
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose { "tilecut=debug" } else { "tilecut=info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
