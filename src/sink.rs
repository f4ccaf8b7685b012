//! Tile sink collaborators.
//!
//! A [`TileSink`] persists one composed tile buffer together with its
//! derived metadata. The shipped implementation writes each tile as an
//! independent baseline TIFF file into an output directory; tests swap in
//! in-memory sinks.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::error::{ConfigError, SinkError};
use crate::format::tiff::encode_tile;
use crate::meta::TileMetadata;
use crate::naming::{tile_file_name, TileIdentity};

/// Write-side collaborator of the tiling pipeline.
///
/// One call per emitted tile. Implementations must tolerate concurrent
/// calls for distinct tiles; identities are unique per run, so distinct
/// calls never target the same output.
#[async_trait]
pub trait TileSink: Send + Sync {
    /// Persist one tile.
    ///
    /// `buffer` holds exactly `metadata.buffer_len()` row-major sample
    /// bytes, padding included.
    async fn write_tile(
        &self,
        id: &TileIdentity,
        metadata: &TileMetadata,
        buffer: &[u8],
    ) -> Result<(), SinkError>;
}

// =============================================================================
// TIFF Directory Sink
// =============================================================================

/// Writes each tile as `{base}_xoff{X}_yoff{Y}_series{S}_index{I}.tif`
/// inside one output directory.
pub struct TiffDirectorySink {
    dir: PathBuf,
    base: String,
}

impl TiffDirectorySink {
    /// Create the sink, creating the output directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::OutputDirUnavailable`] when the directory
    /// cannot be created; this aborts the run before any tile is processed.
    pub async fn create(dir: impl Into<PathBuf>, base: impl Into<String>) -> Result<Self, ConfigError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| ConfigError::OutputDirUnavailable {
                path: dir.display().to_string(),
                message: e.to_string(),
            })?;
        Ok(Self {
            dir,
            base: base.into(),
        })
    }

    /// Path the given tile will be written to.
    pub fn tile_path(&self, id: &TileIdentity) -> PathBuf {
        self.dir.join(tile_file_name(&self.base, id))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl TileSink for TiffDirectorySink {
    async fn write_tile(
        &self,
        id: &TileIdentity,
        metadata: &TileMetadata,
        buffer: &[u8],
    ) -> Result<(), SinkError> {
        let file = encode_tile(metadata, buffer).map_err(|e| SinkError::Encode(e.to_string()))?;
        let path = self.tile_path(id);
        tokio::fs::write(&path, file)
            .await
            .map_err(|e| SinkError::Io(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), bytes = buffer.len(), "wrote tile file");
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
