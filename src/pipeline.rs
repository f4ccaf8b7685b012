//! Tiling pipeline orchestration.
//!
//! Connects the pure planner and compositor to the source and sink
//! collaborators: for each series the grid is planned exactly once (the
//! geometry is constant across a series' planes), then every emitted tile
//! of every plane is fetched, composed and written.
//!
//! Tiles are independent once the grid exists, so when the source supports
//! concurrent region reads the per-tile work is fanned out over a bounded
//! set of in-flight tasks. Any tile failure aborts the run; tiles already
//! written stay on disk.

use std::sync::Arc;

use tokio::task::{JoinError, JoinSet};
use tracing::{debug, info};

use crate::compose::TileCompositor;
use crate::error::TileError;
use crate::grid::{TileDescriptor, TileGrid, TileRequest};
use crate::meta::{PlaneMetadata, TileMetadata};
use crate::naming::TileIdentity;
use crate::sink::TileSink;
use crate::source::ImageSource;

/// Default bound on concurrently processed tiles.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 8;

// =============================================================================
// Run Summary
// =============================================================================

/// Counters for one completed tiling run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    /// Series processed
    pub series: u32,

    /// Planes processed across all series
    pub planes: u32,

    /// Tiles written to the sink
    pub tiles_written: u64,

    /// Tiles dropped by the skip policy
    pub tiles_skipped: u64,
}

// =============================================================================
// Tiling Pipeline
// =============================================================================

/// Drives one tiling run from an [`ImageSource`] into a [`TileSink`].
pub struct TilingPipeline<S, K> {
    source: Arc<S>,
    sink: Arc<K>,
    request: TileRequest,
    max_in_flight: usize,
}

impl<S, K> TilingPipeline<S, K>
where
    S: ImageSource + 'static,
    K: TileSink + 'static,
{
    pub fn new(source: S, sink: K, request: TileRequest) -> Self {
        Self {
            source: Arc::new(source),
            sink: Arc::new(sink),
            request,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }

    /// Bound the number of tiles processed concurrently.
    ///
    /// Only takes effect when the source supports concurrent reads; a
    /// bound of 1 forces sequential processing either way.
    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight.max(1);
        self
    }

    /// Run the full tiling: every emitted tile of every plane of every
    /// series.
    ///
    /// # Errors
    ///
    /// Fails fast: the first configuration, read, compose or write error
    /// aborts the run. No tile is retried and no partial output is
    /// cleaned up.
    pub async fn run(&self) -> Result<RunSummary, TileError> {
        self.request.validate()?;

        let mut summary = RunSummary::default();
        for series in 0..self.source.series_count() {
            let geometry = self
                .source
                .geometry(series)
                .map_err(|source| TileError::SeriesMetadata { series, source })?;
            let plane_meta = Arc::new(
                self.source
                    .metadata(series)
                    .map_err(|source| TileError::SeriesMetadata { series, source })?,
            );
            let plane_count = self
                .source
                .plane_count(series)
                .map_err(|source| TileError::SeriesMetadata { series, source })?;

            // One grid per series, shared read-only by every plane.
            let grid = TileGrid::plan(geometry, self.request)?;
            let compositor = TileCompositor::new(plane_meta.bytes_per_pixel());
            info!(
                series,
                width = geometry.width,
                height = geometry.height,
                n_horiz = grid.n_horiz(),
                n_vert = grid.n_vert(),
                eff_width = grid.effective_width(),
                eff_height = grid.effective_height(),
                "planned tile grid"
            );

            for plane in 0..plane_count {
                self.process_plane(series, plane, &grid, compositor, &plane_meta)
                    .await?;
                summary.tiles_written += grid.emitted_count() as u64;
                summary.tiles_skipped += (grid.len() - grid.emitted_count()) as u64;
                summary.planes += 1;
            }
            summary.series += 1;
        }

        info!(
            series = summary.series,
            planes = summary.planes,
            written = summary.tiles_written,
            skipped = summary.tiles_skipped,
            "tiling run complete"
        );
        Ok(summary)
    }

    async fn process_plane(
        &self,
        series: u32,
        plane: u32,
        grid: &TileGrid,
        compositor: TileCompositor,
        plane_meta: &Arc<PlaneMetadata>,
    ) -> Result<(), TileError> {
        if self.source.supports_concurrent_reads() && self.max_in_flight > 1 {
            let mut tasks: JoinSet<Result<(), TileError>> = JoinSet::new();
            for descriptor in grid.emitted() {
                if tasks.len() >= self.max_in_flight {
                    if let Some(joined) = tasks.join_next().await {
                        check_joined(joined)?;
                    }
                }
                let source = Arc::clone(&self.source);
                let sink = Arc::clone(&self.sink);
                let plane_meta = Arc::clone(plane_meta);
                let descriptor = *descriptor;
                tasks.spawn(async move {
                    process_tile(source, sink, compositor, plane_meta, series, plane, descriptor)
                        .await
                });
            }
            while let Some(joined) = tasks.join_next().await {
                check_joined(joined)?;
            }
        } else {
            for descriptor in grid.emitted() {
                process_tile(
                    Arc::clone(&self.source),
                    Arc::clone(&self.sink),
                    compositor,
                    Arc::clone(plane_meta),
                    series,
                    plane,
                    *descriptor,
                )
                .await?;
            }
        }
        Ok(())
    }
}

fn check_joined(joined: Result<Result<(), TileError>, JoinError>) -> Result<(), TileError> {
    joined.map_err(|e| TileError::Worker(e.to_string()))?
}

/// Fetch, compose and write one tile.
async fn process_tile<S, K>(
    source: Arc<S>,
    sink: Arc<K>,
    compositor: TileCompositor,
    plane_meta: Arc<PlaneMetadata>,
    series: u32,
    plane: u32,
    descriptor: TileDescriptor,
) -> Result<(), TileError>
where
    S: ImageSource,
    K: TileSink,
{
    let (x, y, w, h) = compositor.fetch_rect(&descriptor);
    let region = source
        .read_region(series, plane, x, y, w, h)
        .await
        .map_err(|source| TileError::SourceRead {
            series,
            plane,
            x,
            y,
            source,
        })?;

    let buffer = compositor
        .compose(&descriptor, &region)
        .map_err(|source| TileError::Compose {
            series,
            plane,
            x,
            y,
            source,
        })?;

    let metadata = TileMetadata::for_tile(
        &plane_meta,
        descriptor.output_width(),
        descriptor.output_height(),
    );
    let id = TileIdentity {
        x_origin: descriptor.x_origin,
        y_origin: descriptor.y_origin,
        series,
        plane,
    };
    sink.write_tile(&id, &metadata, &buffer)
        .await
        .map_err(|source| TileError::SinkWrite {
            series,
            plane,
            x,
            y,
            source,
        })?;

    debug!(
        series,
        plane,
        x,
        y,
        width = metadata.width,
        height = metadata.height,
        "wrote tile"
    );
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
