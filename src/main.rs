//! Ghost GeoTIFF - writes a tiled GeoTIFF with a GDAL ghost header.
//!
//! This binary plans the file, streams it to disk and optionally reads it
//! back to check the result.

use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ghost_geotiff::{config::Config, validate_container, FileLayout, GeoTiffWriter};

fn main() -> ExitCode {
    let config = Config::parse();

    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let options = match config.write_options() {
        Ok(options) => options,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let writer = match GeoTiffWriter::new(options) {
        Ok(writer) => writer,
        Err(e) => {
            error!("Failed to plan file: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if config.print_layout {
        return print_layout(writer.layout());
    }

    let geometry = writer.geometry();
    info!(
        "Writing {}x{} image in {}x{} tiles to {}",
        geometry.width,
        geometry.height,
        geometry.tile_width,
        geometry.tile_height,
        config.output.display()
    );

    let mut pixels = config.pixel_source();
    let summary = match writer.write_file(&config.output, &mut pixels) {
        Ok(summary) => summary,
        Err(e) => {
            error!("Failed to write {}: {}", config.output.display(), e);
            return ExitCode::FAILURE;
        }
    };

    info!(
        "Wrote {} bytes ({} tiles of {} bytes)",
        summary.total_bytes, summary.num_tiles, summary.tile_byte_size
    );

    if config.verify && !verify_file(&config.output, writer.layout()) {
        return ExitCode::FAILURE;
    }

    info!("Created '{}' successfully.", config.output.display());
    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "ghost_geotiff=debug"
    } else {
        "ghost_geotiff=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Print the planned layout as JSON.
fn print_layout(layout: &FileLayout) -> ExitCode {
    match serde_json::to_string_pretty(layout) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Failed to serialize layout: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Read the written file back and check it against the plan.
fn verify_file(path: &Path, layout: &FileLayout) -> bool {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("Failed to read back {}: {}", path.display(), e);
            return false;
        }
    };

    let result = validate_container(&bytes, layout);
    for warning in &result.warnings {
        warn!("{}", warning);
    }

    if !result.is_valid {
        for e in &result.errors {
            error!("Verification failed: {}", e);
        }
        return false;
    }

    info!("Verified {} against its layout", path.display());
    true
}
