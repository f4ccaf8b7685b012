//! Tile grid planning.
//!
//! This module computes, for one image plane, the exact set of tile
//! rectangles to emit: their origins, their clipped sizes, and how edge
//! tiles are handled under the requested [`EdgePolicy`]. Planning is pure
//! arithmetic over the image and tile geometry; it performs no I/O and
//! does not depend on pixel content, so a grid is computed once per series
//! and reused for every plane of that series.
//!
//! # Grid math
//!
//! Tile counts come from the stride between tile origins:
//!
//! ```text
//! n_horiz = ceil(image_width  / (nominal_width  - overlap))
//! n_vert  = ceil(image_height / (nominal_height - overlap))
//! ```
//!
//! Under [`EdgePolicy::Fit`] the tile size is then recomputed so that
//! `n_horiz` tiles spaced by `eff_width - overlap` cover the image exactly,
//! with no pixels left over to pad or drop. Under `Skip` and `Pad` the
//! nominal size is kept and edge tiles are dropped or zero-padded instead.

use crate::error::ConfigError;

// =============================================================================
// Edge Policy
// =============================================================================

/// How tiles that touch the right/bottom image edge are handled.
///
/// The skip and pad behaviors are mutually exclusive by construction; the
/// invalid "skip and pad" combination is unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgePolicy {
    /// Shrink the effective tile size so the grid covers the image exactly.
    #[default]
    Fit,

    /// Keep the nominal tile size and drop any tile that would be clipped.
    Skip,

    /// Keep the nominal tile size and zero-pad clipped edge tiles back to it.
    Pad,
}

// =============================================================================
// Image Geometry
// =============================================================================

/// Dimensions of one plane of one series, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageGeometry {
    pub width: u32,
    pub height: u32,
}

impl ImageGeometry {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

// =============================================================================
// Tile Request
// =============================================================================

/// The user-requested tiling: nominal tile size, overlap and edge policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRequest {
    /// Requested tile width before edge-policy adjustment
    pub nominal_width: u32,

    /// Requested tile height before edge-policy adjustment
    pub nominal_height: u32,

    /// Pixels shared between adjacent tiles in each direction
    pub overlap: u32,

    /// Edge tile handling
    pub policy: EdgePolicy,
}

impl TileRequest {
    /// Create a request with no overlap and the default [`EdgePolicy::Fit`].
    pub fn new(nominal_width: u32, nominal_height: u32) -> Self {
        Self {
            nominal_width,
            nominal_height,
            overlap: 0,
            policy: EdgePolicy::Fit,
        }
    }

    pub fn with_overlap(mut self, overlap: u32) -> Self {
        self.overlap = overlap;
        self
    }

    pub fn with_policy(mut self, policy: EdgePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Validate the request.
    ///
    /// Rejects zero tile dimensions and any overlap that is not strictly
    /// smaller than both tile dimensions. With `overlap >= nominal` the
    /// stride between origins would be zero or negative and the grid would
    /// never terminate, so this must fail before any grid is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.nominal_width == 0 || self.nominal_height == 0 {
            return Err(ConfigError::ZeroTileDimension {
                nominal_width: self.nominal_width,
                nominal_height: self.nominal_height,
            });
        }
        if self.overlap >= self.nominal_width || self.overlap >= self.nominal_height {
            return Err(ConfigError::OverlapTooLarge {
                overlap: self.overlap,
                nominal_width: self.nominal_width,
                nominal_height: self.nominal_height,
            });
        }
        Ok(())
    }
}

// =============================================================================
// Tile Descriptor
// =============================================================================

/// Geometry of a single planned tile.
///
/// `actual_width`/`actual_height` is the pixel span clipped to the image
/// bounds; `pad_width`/`pad_height` is the zero fill needed to restore the
/// nominal size (nonzero only under [`EdgePolicy::Pad`] on edge tiles).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileDescriptor {
    /// Grid column, 0-indexed from the left
    pub x_index: u32,

    /// Grid row, 0-indexed from the top
    pub y_index: u32,

    /// Left edge of the source rectangle, in pixels
    pub x_origin: u32,

    /// Top edge of the source rectangle, in pixels
    pub y_origin: u32,

    /// Source span clipped to the image bounds
    pub actual_width: u32,
    pub actual_height: u32,

    /// Zero columns appended on the right under the pad policy
    pub pad_width: u32,

    /// Zero rows appended at the bottom under the pad policy
    pub pad_height: u32,

    /// Whether this tile is written; false only for truncated edge tiles
    /// under the skip policy
    pub emit: bool,
}

impl TileDescriptor {
    /// Width of the output buffer, including any zero padding.
    #[inline]
    pub fn output_width(&self) -> u32 {
        self.actual_width + self.pad_width
    }

    /// Height of the output buffer, including any zero padding.
    #[inline]
    pub fn output_height(&self) -> u32 {
        self.actual_height + self.pad_height
    }

    /// Whether the output buffer contains any zero padding.
    #[inline]
    pub fn is_padded(&self) -> bool {
        self.pad_width > 0 || self.pad_height > 0
    }
}

// =============================================================================
// Tile Grid
// =============================================================================

/// The planned grid for one `(ImageGeometry, TileRequest)` pair.
///
/// Descriptors are stored in output enumeration order: the x index is the
/// outer loop, so all tiles of column 0 come before column 1. The grid is
/// immutable once planned.
#[derive(Debug, Clone)]
pub struct TileGrid {
    request: TileRequest,
    n_horiz: u32,
    n_vert: u32,
    eff_width: u32,
    eff_height: u32,
    tiles: Vec<TileDescriptor>,
}

impl TileGrid {
    /// Plan the tile grid for one plane geometry.
    ///
    /// Pure and deterministic: the same geometry and request always produce
    /// the same grid.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the request is invalid (zero tile size or
    /// `overlap >= nominal` in either dimension) or the image is empty.
    pub fn plan(geometry: ImageGeometry, request: TileRequest) -> Result<Self, ConfigError> {
        request.validate()?;
        if geometry.width == 0 || geometry.height == 0 {
            return Err(ConfigError::EmptyImage {
                width: geometry.width,
                height: geometry.height,
            });
        }

        let stride_w = request.nominal_width - request.overlap;
        let stride_h = request.nominal_height - request.overlap;
        let n_horiz = geometry.width.div_ceil(stride_w);
        let n_vert = geometry.height.div_ceil(stride_h);

        // Fit recomputes the tile size so n tiles spaced by eff - overlap
        // cover the image exactly; Skip and Pad keep the nominal size.
        let (eff_width, eff_height) = match request.policy {
            EdgePolicy::Fit => (
                fit_size(geometry.width, request.overlap, n_horiz),
                fit_size(geometry.height, request.overlap, n_vert),
            ),
            EdgePolicy::Skip | EdgePolicy::Pad => {
                (request.nominal_width, request.nominal_height)
            }
        };

        let mut tiles = Vec::with_capacity(n_horiz as usize * n_vert as usize);
        for x_index in 0..n_horiz {
            let x_origin = (eff_width - request.overlap) * x_index;
            let x_end = geometry.width.min(x_origin.saturating_add(eff_width));
            let actual_width = x_end - x_origin;

            for y_index in 0..n_vert {
                let y_origin = (eff_height - request.overlap) * y_index;
                let y_end = geometry.height.min(y_origin.saturating_add(eff_height));
                let actual_height = y_end - y_origin;

                let emit = !(request.policy == EdgePolicy::Skip
                    && (actual_width < request.nominal_width
                        || actual_height < request.nominal_height));

                let (pad_width, pad_height) = match request.policy {
                    EdgePolicy::Pad => (
                        request.nominal_width.saturating_sub(actual_width),
                        request.nominal_height.saturating_sub(actual_height),
                    ),
                    _ => (0, 0),
                };

                tiles.push(TileDescriptor {
                    x_index,
                    y_index,
                    x_origin,
                    y_origin,
                    actual_width,
                    actual_height,
                    pad_width,
                    pad_height,
                    emit,
                });
            }
        }

        Ok(Self {
            request,
            n_horiz,
            n_vert,
            eff_width,
            eff_height,
            tiles,
        })
    }

    /// The request this grid was planned from.
    pub fn request(&self) -> TileRequest {
        self.request
    }

    /// Number of grid columns.
    pub fn n_horiz(&self) -> u32 {
        self.n_horiz
    }

    /// Number of grid rows.
    pub fn n_vert(&self) -> u32 {
        self.n_vert
    }

    /// Effective tile width used to step the grid.
    pub fn effective_width(&self) -> u32 {
        self.eff_width
    }

    /// Effective tile height used to step the grid.
    pub fn effective_height(&self) -> u32 {
        self.eff_height
    }

    /// Total number of planned tiles, including non-emitted ones.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Descriptor at the given grid position.
    pub fn get(&self, x_index: u32, y_index: u32) -> Option<&TileDescriptor> {
        if x_index >= self.n_horiz || y_index >= self.n_vert {
            return None;
        }
        self.tiles
            .get(x_index as usize * self.n_vert as usize + y_index as usize)
    }

    /// All planned tiles, in output enumeration order (x outer, y inner).
    pub fn iter(&self) -> impl Iterator<Item = &TileDescriptor> {
        self.tiles.iter()
    }

    /// Only the tiles that will be written.
    pub fn emitted(&self) -> impl Iterator<Item = &TileDescriptor> {
        self.tiles.iter().filter(|t| t.emit)
    }

    /// Number of tiles that will be written.
    pub fn emitted_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.emit).count()
    }
}

/// Effective tile size under fit: the smallest size whose stride covers the
/// image dimension in `n` steps.
///
/// The numerator is computed in u64; `dim + overlap * (n - 1)` can exceed
/// u32 when the stride is tiny relative to the image. The result is floored
/// at `overlap + 1` so the stride stays positive for dimensions smaller
/// than the overlap (such dimensions always plan as a single clipped tile).
fn fit_size(dim: u32, overlap: u32, n: u32) -> u32 {
    let numerator = dim as u64 + overlap as u64 * (n as u64 - 1);
    let eff = numerator.div_ceil(n as u64) as u32;
    eff.max(overlap + 1)
}

// =============================================================================
// Tests
// =============================================================================
