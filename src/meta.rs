//! Pixel and plane metadata.
//!
//! Each output tile must be independently interpretable, so the pixel type,
//! byte order and channel identity of the source plane are copied into a
//! fresh [`TileMetadata`] per tile, with the spatial dimensions overridden
//! to the tile's output size and the depth/time extents fixed to 1. Building
//! a new value per tile (instead of mutating one shared writer state) keeps
//! concurrent tile processing free of aliasing.

// =============================================================================
// Pixel Type
// =============================================================================

/// Storage type of a single sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelType {
    UInt8,
    Int8,
    UInt16,
    Int16,
    UInt32,
    Int32,
    Float32,
    Float64,
}

impl PixelType {
    /// Storage size of one sample in bytes.
    #[inline]
    pub const fn bytes_per_sample(self) -> usize {
        match self {
            PixelType::UInt8 | PixelType::Int8 => 1,
            PixelType::UInt16 | PixelType::Int16 => 2,
            PixelType::UInt32 | PixelType::Int32 | PixelType::Float32 => 4,
            PixelType::Float64 => 8,
        }
    }

    /// Storage size of one sample in bits.
    #[inline]
    pub const fn bits_per_sample(self) -> u16 {
        (self.bytes_per_sample() * 8) as u16
    }

    pub const fn is_signed(self) -> bool {
        matches!(self, PixelType::Int8 | PixelType::Int16 | PixelType::Int32)
    }

    pub const fn is_float(self) -> bool {
        matches!(self, PixelType::Float32 | PixelType::Float64)
    }

    pub const fn name(self) -> &'static str {
        match self {
            PixelType::UInt8 => "uint8",
            PixelType::Int8 => "int8",
            PixelType::UInt16 => "uint16",
            PixelType::Int16 => "int16",
            PixelType::UInt32 => "uint32",
            PixelType::Int32 => "int32",
            PixelType::Float32 => "float32",
            PixelType::Float64 => "float64",
        }
    }
}

// =============================================================================
// Channels
// =============================================================================

/// Identity of one channel of a plane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    /// Stable channel identifier, copied verbatim to each tile
    pub id: String,

    /// Human-readable channel name, if the source has one
    pub name: Option<String>,

    /// Interleaved samples this channel contributes per pixel position
    /// (e.g. 3 for an RGB channel)
    pub samples_per_pixel: u32,
}

impl ChannelInfo {
    pub fn new(id: impl Into<String>, samples_per_pixel: u32) -> Self {
        Self {
            id: id.into(),
            name: None,
            samples_per_pixel,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

// =============================================================================
// Plane Metadata
// =============================================================================

/// Pixel-level metadata of one series, constant across its planes.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneMetadata {
    pub pixel_type: PixelType,

    /// Significant bits per sample when smaller than the storage size
    pub significant_bits: Option<u16>,

    /// Byte order of multi-byte samples in the raw buffers
    pub big_endian: bool,

    /// Channels in sample interleaving order
    pub channels: Vec<ChannelInfo>,
}

impl PlaneMetadata {
    /// Single-channel metadata with native byte order.
    pub fn grayscale(pixel_type: PixelType) -> Self {
        Self {
            pixel_type,
            significant_bits: None,
            big_endian: cfg!(target_endian = "big"),
            channels: vec![ChannelInfo::new("Channel:0", 1)],
        }
    }

    /// Total interleaved samples per pixel position across all channels.
    pub fn samples_per_pixel(&self) -> u32 {
        self.channels.iter().map(|c| c.samples_per_pixel).sum()
    }

    /// Bytes per pixel position: the opaque sample unit the grid planner
    /// and compositor work in.
    pub fn bytes_per_pixel(&self) -> usize {
        self.pixel_type.bytes_per_sample() * self.samples_per_pixel() as usize
    }
}

// =============================================================================
// Tile Metadata
// =============================================================================

/// Metadata for one output tile.
///
/// Copies the source plane's pixel metadata unchanged and overrides the
/// spatial dimensions with the tile's output (post-pad) size. Depth and
/// time extents are always 1: each plane index is an independent flat 2D
/// unit, volumetric semantics are not reconstructed.
#[derive(Debug, Clone, PartialEq)]
pub struct TileMetadata {
    /// Output width of the tile, after any zero padding
    pub width: u32,

    /// Output height of the tile, after any zero padding
    pub height: u32,

    /// Depth extent, always 1
    pub size_z: u32,

    /// Time extent, always 1
    pub size_t: u32,

    /// Pixel metadata copied from the source plane
    pub plane: PlaneMetadata,
}

impl TileMetadata {
    /// Derive tile metadata from the source plane metadata and the tile's
    /// output dimensions.
    pub fn for_tile(plane: &PlaneMetadata, width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            size_z: 1,
            size_t: 1,
            plane: plane.clone(),
        }
    }

    /// Expected byte length of the tile's sample buffer.
    pub fn buffer_len(&self) -> usize {
        self.width as usize * self.height as usize * self.plane.bytes_per_pixel()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_type_sizes() {
        assert_eq!(PixelType::UInt8.bytes_per_sample(), 1);
        assert_eq!(PixelType::Int16.bytes_per_sample(), 2);
        assert_eq!(PixelType::Float32.bytes_per_sample(), 4);
        assert_eq!(PixelType::Float64.bytes_per_sample(), 8);
        assert_eq!(PixelType::UInt16.bits_per_sample(), 16);
    }

    #[test]
    fn test_pixel_type_classes() {
        assert!(PixelType::Int8.is_signed());
        assert!(!PixelType::UInt8.is_signed());
        assert!(PixelType::Float32.is_float());
        assert!(!PixelType::Int32.is_float());
    }

    #[test]
    fn test_bytes_per_pixel_sums_channels() {
        let meta = PlaneMetadata {
            pixel_type: PixelType::UInt16,
            significant_bits: Some(12),
            big_endian: false,
            channels: vec![
                ChannelInfo::new("Channel:0", 3).with_name("RGB"),
                ChannelInfo::new("Channel:1", 1).with_name("Alpha"),
            ],
        };
        assert_eq!(meta.samples_per_pixel(), 4);
        assert_eq!(meta.bytes_per_pixel(), 8);
    }

    #[test]
    fn test_tile_metadata_overrides_dimensions() {
        let plane = PlaneMetadata::grayscale(PixelType::UInt8);
        let meta = TileMetadata::for_tile(&plane, 12, 7);

        assert_eq!(meta.width, 12);
        assert_eq!(meta.height, 7);
        assert_eq!(meta.size_z, 1);
        assert_eq!(meta.size_t, 1);
        assert_eq!(meta.plane, plane);
        assert_eq!(meta.buffer_len(), 84);
    }

    #[test]
    fn test_for_tile_copies_instead_of_aliasing() {
        let plane = PlaneMetadata::grayscale(PixelType::UInt8);
        let a = TileMetadata::for_tile(&plane, 10, 10);
        let mut b = TileMetadata::for_tile(&plane, 4, 4);
        b.plane.channels[0].name = Some("mutated".to_string());
        assert_eq!(a.plane.channels[0].name, None);
    }
}
