//! Image source collaborators.
//!
//! An [`ImageSource`] exposes the structure of the input (series, planes,
//! per-series geometry and pixel metadata) and a rectangular region read.
//! The tiling pipeline never asks for pixels outside a plane's bounds and
//! never needs a whole plane at once, so sources are free to stream, cache
//! or hold everything decoded in memory.

mod decoded;

pub use decoded::DecodedImageSource;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::SourceError;
use crate::grid::ImageGeometry;
use crate::meta::PlaneMetadata;

/// Read-side collaborator of the tiling pipeline.
///
/// All planes of one series share the same geometry and pixel metadata, so
/// both are queried per series, not per plane. Region reads return raw
/// row-major sample bytes for exactly the requested sub-rectangle.
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Number of independent series in the input.
    fn series_count(&self) -> u32;

    /// Number of 2D planes in the given series.
    fn plane_count(&self, series: u32) -> Result<u32, SourceError>;

    /// Plane dimensions of the given series.
    fn geometry(&self, series: u32) -> Result<ImageGeometry, SourceError>;

    /// Pixel metadata of the given series.
    fn metadata(&self, series: u32) -> Result<PlaneMetadata, SourceError>;

    /// Read the raw samples of a sub-rectangle of one plane.
    ///
    /// The rectangle must lie fully inside the plane. Returns
    /// `w * h * bytes_per_pixel` bytes in row-major order.
    async fn read_region(
        &self,
        series: u32,
        plane: u32,
        x: u32,
        y: u32,
        w: u32,
        h: u32,
    ) -> Result<Bytes, SourceError>;

    /// Whether independent region reads may run concurrently.
    ///
    /// Sources backed by a single non-reentrant decoder return false and
    /// the pipeline serializes tile reads behind them.
    fn supports_concurrent_reads(&self) -> bool {
        false
    }
}
