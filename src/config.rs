//! Command-line configuration.
//!
//! The short flags are nonstandard: `-h` is the tile height (help is
//! long-form only), `-v` is the overlap, and `-o` is the output directory.
//! Skip and pad are mutually exclusive and collapse into the closed
//! [`EdgePolicy`] before any tiling starts.

use std::path::PathBuf;

use clap::Parser;

use crate::error::ConfigError;
use crate::grid::{EdgePolicy, TileRequest};
use crate::pipeline::DEFAULT_MAX_IN_FLIGHT;

/// Default nominal tile width in pixels.
pub const DEFAULT_TILE_WIDTH: u32 = 1024;

/// Default nominal tile height in pixels.
pub const DEFAULT_TILE_HEIGHT: u32 = 1024;

/// Default overlap between adjacent tiles in pixels.
pub const DEFAULT_OVERLAP: u32 = 0;

/// tilecut - split large images into a grid of independent TIFF tiles.
///
/// Reads an input image, partitions every plane of every series into
/// rectangular tiles, and writes each tile as its own TIFF file named
/// `{base}_xoff{X}_yoff{Y}_series{S}_index{I}.tif`.
#[derive(Parser, Debug, Clone)]
#[command(name = "tilecut")]
#[command(author, version, about, long_about = None)]
#[command(disable_help_flag = true)]
pub struct Cli {
    /// Location of the input image file.
    #[arg(short = 'i', long = "input", env = "TILECUT_INPUT")]
    pub input: PathBuf,

    /// Directory the tiled images are written to (created if missing).
    #[arg(short = 'o', long = "output-dir", env = "TILECUT_OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Width of each tile in pixels.
    #[arg(short = 'w', long = "width", default_value_t = DEFAULT_TILE_WIDTH)]
    pub tile_width: u32,

    /// Height of each tile in pixels.
    #[arg(short = 'h', long = "height", default_value_t = DEFAULT_TILE_HEIGHT)]
    pub tile_height: u32,

    /// Pixels shared between adjacent tiles.
    #[arg(short = 'v', long = "overlap", default_value_t = DEFAULT_OVERLAP)]
    pub overlap: u32,

    /// Drop edge tiles smaller than the requested size instead of
    /// shrinking the grid to fit.
    #[arg(short = 's', long = "skip", conflicts_with = "pad")]
    pub skip: bool,

    /// Zero-pad edge tiles up to the requested size instead of shrinking
    /// the grid to fit.
    #[arg(short = 'p', long = "pad")]
    pub pad: bool,

    /// Maximum number of tiles processed concurrently.
    #[arg(long = "jobs", default_value_t = DEFAULT_MAX_IN_FLIGHT)]
    pub jobs: usize,

    /// Enable verbose logging (debug level).
    #[arg(long, default_value_t = false)]
    pub verbose: bool,

    /// Print help.
    #[arg(long, action = clap::ArgAction::Help)]
    pub help: Option<bool>,
}

impl Cli {
    /// The edge policy selected by the skip/pad flags.
    pub fn policy(&self) -> EdgePolicy {
        match (self.skip, self.pad) {
            (true, _) => EdgePolicy::Skip,
            (_, true) => EdgePolicy::Pad,
            _ => EdgePolicy::Fit,
        }
    }

    /// The tile request described by this command line.
    pub fn tile_request(&self) -> TileRequest {
        TileRequest::new(self.tile_width, self.tile_height)
            .with_overlap(self.overlap)
            .with_policy(self.policy())
    }

    /// Validate the configuration before any tile is processed.
    ///
    /// clap already rejects `-s -p` at parse time; this re-checks it for
    /// configurations built programmatically, and applies the tile-request
    /// invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.skip && self.pad {
            return Err(ConfigError::ConflictingPolicies);
        }
        self.tile_request().validate()
    }
}

// =============================================================================
// Tests
// =============================================================================
