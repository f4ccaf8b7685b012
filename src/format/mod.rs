//! Output container formats.
//!
//! Tiles are written as baseline, strip-organized, uncompressed TIFF files
//! so every tile is readable on its own with any TIFF tooling.

pub mod tiff;

pub use tiff::{encode_tile, read_baseline, BaselineTiff, ByteOrder};
