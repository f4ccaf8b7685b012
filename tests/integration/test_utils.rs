//! Shared helpers for the integration tests.

use async_trait::async_trait;
use bytes::Bytes;

use tilecut::error::SourceError;
use tilecut::grid::ImageGeometry;
use tilecut::meta::{PixelType, PlaneMetadata};
use tilecut::pipeline::RunSummary;
use tilecut::sink::TiffDirectorySink;
use tilecut::source::ImageSource;
use tilecut::{TileRequest, TilingPipeline};

/// Deterministic sample value so tiles can be checked byte-for-byte.
pub fn pixel(series: u32, plane: u32, x: u32, y: u32) -> u8 {
    (x * 31 + y * 7 + series * 13 + plane * 3) as u8
}

/// In-memory multi-series source with synthesized pixel data.
pub struct MemSource {
    layout: Vec<(ImageGeometry, u32)>,
}

impl MemSource {
    /// One series with one plane.
    pub fn single(width: u32, height: u32) -> Self {
        Self::with_layout(vec![(width, height, 1)])
    }

    /// Arbitrary `(width, height, plane_count)` per series.
    pub fn with_layout(layout: Vec<(u32, u32, u32)>) -> Self {
        Self {
            layout: layout
                .into_iter()
                .map(|(w, h, planes)| (ImageGeometry::new(w, h), planes))
                .collect(),
        }
    }
}

#[async_trait]
impl ImageSource for MemSource {
    fn series_count(&self) -> u32 {
        self.layout.len() as u32
    }

    fn plane_count(&self, series: u32) -> Result<u32, SourceError> {
        Ok(self.layout[series as usize].1)
    }

    fn geometry(&self, series: u32) -> Result<ImageGeometry, SourceError> {
        Ok(self.layout[series as usize].0)
    }

    fn metadata(&self, _series: u32) -> Result<PlaneMetadata, SourceError> {
        Ok(PlaneMetadata::grayscale(PixelType::UInt8))
    }

    async fn read_region(
        &self,
        series: u32,
        plane: u32,
        x: u32,
        y: u32,
        w: u32,
        h: u32,
    ) -> Result<Bytes, SourceError> {
        let geometry = self.layout[series as usize].0;
        assert!(
            x + w <= geometry.width && y + h <= geometry.height,
            "pipeline requested out-of-bounds region {w}x{h}+{x}+{y}"
        );
        let mut out = Vec::with_capacity((w * h) as usize);
        for row in y..y + h {
            for col in x..x + w {
                out.push(pixel(series, plane, col, row));
            }
        }
        Ok(Bytes::from(out))
    }

    fn supports_concurrent_reads(&self) -> bool {
        true
    }
}

/// Run a full pipeline from `source` into `dir` with base name "test".
pub async fn run_into_dir(
    source: MemSource,
    request: TileRequest,
    dir: &std::path::Path,
) -> RunSummary {
    let sink = TiffDirectorySink::create(dir, "test").await.unwrap();
    TilingPipeline::new(source, sink, request)
        .run()
        .await
        .unwrap()
}

/// All tile files in `dir`, as `(parsed identity, file bytes)`.
pub fn read_tiles(dir: &std::path::Path) -> Vec<(tilecut::TileIdentity, Vec<u8>)> {
    let mut tiles = Vec::new();
    for entry in std::fs::read_dir(dir).unwrap() {
        let entry = entry.unwrap();
        let name = entry.file_name().to_string_lossy().into_owned();
        let id = tilecut::parse_tile_file_name(&name)
            .unwrap_or_else(|| panic!("unexpected file in output dir: {name}"));
        tiles.push((id, std::fs::read(entry.path()).unwrap()));
    }
    tiles
}
