//! # tilecut
//!
//! Splits large multi-series images into a grid of smaller rectangular
//! tiles, writing each tile as an independent TIFF file with enough copied
//! metadata (pixel type, byte order, channel identity) to be interpreted
//! on its own.
//!
//! ## How tiling works
//!
//! Given an image and a nominal tile size, the grid planner computes the
//! ordered set of tile rectangles; edge tiles that do not divide evenly
//! are handled by one of three policies:
//!
//! - **Fit** (default): shrink the effective tile size so the grid covers
//!   the image exactly
//! - **Skip**: keep the nominal size and drop truncated edge tiles
//! - **Pad**: keep the nominal size and zero-pad truncated edge tiles
//!
//! An optional overlap shares pixels between adjacent tiles by reducing
//! the stride between tile origins.
//!
//! ## Architecture
//!
//! - [`grid`] - pure tile-grid planning, no I/O
//! - [`compose`] - placement of fetched pixels and zero padding into
//!   output buffers
//! - [`source`] - image source trait and the decoded in-memory source
//! - [`sink`] - tile sink trait and the TIFF directory sink
//! - [`mod@format`] - baseline TIFF writing and verification
//! - [`pipeline`] - series/plane/tile orchestration with bounded fan-out
//! - [`meta`] - pixel metadata and per-tile metadata derivation
//! - [`naming`] - the `{base}_xoff{X}_yoff{Y}_series{S}_index{I}.tif` key
//! - [`config`] - CLI surface
//!
//! ## Example
//!
//! ```rust,no_run
//! use tilecut::{
//!     DecodedImageSource, EdgePolicy, TileRequest, TiffDirectorySink, TilingPipeline,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = DecodedImageSource::open("scan.png".as_ref())?;
//!     let sink = TiffDirectorySink::create("tiles", "scan").await?;
//!     let request = TileRequest::new(512, 512).with_policy(EdgePolicy::Pad);
//!
//!     let summary = TilingPipeline::new(source, sink, request).run().await?;
//!     println!("wrote {} tiles", summary.tiles_written);
//!     Ok(())
//! }
//! ```

pub mod compose;
pub mod config;
pub mod error;
pub mod format;
pub mod grid;
pub mod meta;
pub mod naming;
pub mod pipeline;
pub mod sink;
pub mod source;

// Re-export commonly used types
pub use compose::TileCompositor;
pub use config::{Cli, DEFAULT_OVERLAP, DEFAULT_TILE_HEIGHT, DEFAULT_TILE_WIDTH};
pub use error::{ComposeError, ConfigError, SinkError, SourceError, TiffError, TileError};
pub use format::{encode_tile, read_baseline, BaselineTiff, ByteOrder};
pub use grid::{EdgePolicy, ImageGeometry, TileDescriptor, TileGrid, TileRequest};
pub use meta::{ChannelInfo, PixelType, PlaneMetadata, TileMetadata};
pub use naming::{base_name, parse_tile_file_name, tile_file_name, PlaneIdentity, TileIdentity};
pub use pipeline::{RunSummary, TilingPipeline, DEFAULT_MAX_IN_FLIGHT};
pub use sink::{TiffDirectorySink, TileSink};
pub use source::{DecodedImageSource, ImageSource};
