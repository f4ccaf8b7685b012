//! Tile buffer composition.
//!
//! The compositor turns a fetched source region into the final output
//! buffer for one tile. For unpadded tiles this is a passthrough; for
//! padded edge tiles the region is copied row by row into a zero-initialized
//! buffer of the nominal size, so the right-edge columns, bottom rows and
//! the corner between them come out zero without any ordering concerns.
//!
//! Pixels are treated as opaque fixed-size samples: the compositor only
//! needs the byte count per pixel position, never the pixel type.

use bytes::Bytes;

use crate::error::ComposeError;
use crate::grid::TileDescriptor;

/// Composes output tile buffers from fetched source regions.
///
/// Stateless apart from the sample stride, so one compositor per series is
/// shared across planes and tiles.
#[derive(Debug, Clone, Copy)]
pub struct TileCompositor {
    bytes_per_pixel: usize,
}

impl TileCompositor {
    /// Create a compositor for the given sample stride (bytes per pixel
    /// position, i.e. bytes per sample times samples per pixel).
    pub fn new(bytes_per_pixel: usize) -> Self {
        Self { bytes_per_pixel }
    }

    /// The rectangle to fetch from the source for this tile.
    ///
    /// Always the clipped span `(x_origin, y_origin, actual_width,
    /// actual_height)`; the source is never asked for pixels outside the
    /// image bounds, padding is synthesized here instead.
    pub fn fetch_rect(&self, descriptor: &TileDescriptor) -> (u32, u32, u32, u32) {
        (
            descriptor.x_origin,
            descriptor.y_origin,
            descriptor.actual_width,
            descriptor.actual_height,
        )
    }

    /// Compose the output buffer for one tile from its fetched region.
    ///
    /// `region` must hold exactly `actual_width * actual_height` samples in
    /// row-major order, as returned by a source region read of
    /// [`Self::fetch_rect`].
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::RegionSizeMismatch`] if the region length
    /// does not match the descriptor. A short read must not silently
    /// produce a misaligned tile.
    pub fn compose(
        &self,
        descriptor: &TileDescriptor,
        region: &[u8],
    ) -> Result<Bytes, ComposeError> {
        let row_len = descriptor.actual_width as usize * self.bytes_per_pixel;
        let expected = row_len * descriptor.actual_height as usize;
        if region.len() != expected {
            return Err(ComposeError::RegionSizeMismatch {
                expected,
                actual: region.len(),
            });
        }

        if !descriptor.is_padded() {
            return Ok(Bytes::copy_from_slice(region));
        }

        let out_row_len = descriptor.output_width() as usize * self.bytes_per_pixel;
        let mut out = vec![0u8; out_row_len * descriptor.output_height() as usize];
        for row in 0..descriptor.actual_height as usize {
            let src = &region[row * row_len..(row + 1) * row_len];
            out[row * out_row_len..row * out_row_len + row_len].copy_from_slice(src);
        }

        Ok(Bytes::from(out))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(
        actual_width: u32,
        actual_height: u32,
        pad_width: u32,
        pad_height: u32,
    ) -> TileDescriptor {
        TileDescriptor {
            x_index: 0,
            y_index: 0,
            x_origin: 0,
            y_origin: 0,
            actual_width,
            actual_height,
            pad_width,
            pad_height,
            emit: true,
        }
    }

    #[test]
    fn test_unpadded_tile_is_passthrough() {
        let compositor = TileCompositor::new(1);
        let desc = descriptor(3, 2, 0, 0);
        let region = [1, 2, 3, 4, 5, 6];

        let out = compositor.compose(&desc, &region).unwrap();
        assert_eq!(&out[..], &region);
    }

    #[test]
    fn test_right_pad_zero_columns() {
        let compositor = TileCompositor::new(1);
        let desc = descriptor(3, 2, 2, 0);
        let region = [1, 2, 3, 4, 5, 6];

        let out = compositor.compose(&desc, &region).unwrap();
        assert_eq!(&out[..], &[1, 2, 3, 0, 0, 4, 5, 6, 0, 0]);
    }

    #[test]
    fn test_bottom_pad_zero_rows() {
        let compositor = TileCompositor::new(1);
        let desc = descriptor(3, 2, 0, 2);
        let region = [1, 2, 3, 4, 5, 6];

        let out = compositor.compose(&desc, &region).unwrap();
        assert_eq!(&out[..], &[1, 2, 3, 4, 5, 6, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_corner_pad_is_zero() {
        let compositor = TileCompositor::new(1);
        let desc = descriptor(2, 1, 1, 1);
        let region = [7, 8];

        let out = compositor.compose(&desc, &region).unwrap();
        // 3x2 output: real pixels top-left, right column, bottom row and
        // the shared corner all zero.
        assert_eq!(&out[..], &[7, 8, 0, 0, 0, 0]);
    }

    #[test]
    fn test_multi_byte_samples() {
        let compositor = TileCompositor::new(2);
        let desc = descriptor(2, 2, 1, 0);
        let region = [0xAA, 0xBB, 0xCC, 0xDD, 0x11, 0x22, 0x33, 0x44];

        let out = compositor.compose(&desc, &region).unwrap();
        assert_eq!(
            &out[..],
            &[0xAA, 0xBB, 0xCC, 0xDD, 0, 0, 0x11, 0x22, 0x33, 0x44, 0, 0]
        );
    }

    #[test]
    fn test_pad_buffer_matches_nominal_size() {
        let compositor = TileCompositor::new(3);
        let desc = descriptor(6, 1, 6, 6);

        let out = compositor.compose(&desc, &vec![9u8; 6 * 3]).unwrap();
        assert_eq!(out.len(), 12 * 7 * 3);
        // Everything beyond the first row's real pixels is zero.
        assert!(out[6 * 3..12 * 3].iter().all(|&b| b == 0));
        assert!(out[12 * 3..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_region_size_mismatch_rejected() {
        let compositor = TileCompositor::new(1);
        let desc = descriptor(3, 2, 0, 0);

        let result = compositor.compose(&desc, &[1, 2, 3]);
        assert!(matches!(
            result,
            Err(ComposeError::RegionSizeMismatch {
                expected: 6,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_fetch_rect_is_clipped_span() {
        let compositor = TileCompositor::new(1);
        let mut desc = descriptor(6, 1, 6, 6);
        desc.x_origin = 24;
        desc.y_origin = 14;
        assert_eq!(compositor.fetch_rect(&desc), (24, 14, 6, 1));
    }
}
