//! In-memory image source backed by the `image` crate.
//!
//! Decodes the whole input once and serves region reads by slicing rows
//! out of the decoded buffer. Formats the `image` crate covers carry a
//! single series with a single plane; multi-series inputs come from other
//! [`ImageSource`](super::ImageSource) implementations.

use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use image::{ColorType, DynamicImage};
use tracing::debug;

use crate::error::SourceError;
use crate::grid::ImageGeometry;
use crate::meta::{ChannelInfo, PixelType, PlaneMetadata};
use crate::source::ImageSource;

/// A fully decoded single-plane image held in memory.
///
/// Region reads are pure slicing, so concurrent reads are supported.
pub struct DecodedImageSource {
    geometry: ImageGeometry,
    metadata: PlaneMetadata,
    bytes_per_pixel: usize,
    data: Bytes,
}

impl DecodedImageSource {
    /// Decode an image file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Decode`] when the file cannot be opened or
    /// decoded, and [`SourceError::UnsupportedLayout`] for pixel layouts
    /// with no sample mapping.
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let img = image::open(path).map_err(|e| SourceError::Decode(e.to_string()))?;
        let source = Self::from_dynamic(&img)?;
        debug!(
            path = %path.display(),
            width = source.geometry.width,
            height = source.geometry.height,
            pixel_type = source.metadata.pixel_type.name(),
            "decoded input image"
        );
        Ok(source)
    }

    /// Build a source from an already decoded image.
    pub fn from_dynamic(img: &DynamicImage) -> Result<Self, SourceError> {
        let (pixel_type, channels) = map_color(img.color())?;
        let metadata = PlaneMetadata {
            pixel_type,
            significant_bits: None,
            // Decoded buffers hold native-endian samples.
            big_endian: cfg!(target_endian = "big"),
            channels,
        };
        let bytes_per_pixel = metadata.bytes_per_pixel();
        let geometry = ImageGeometry::new(img.width(), img.height());

        let data = img.as_bytes();
        let expected = geometry.width as usize * geometry.height as usize * bytes_per_pixel;
        if data.len() != expected {
            return Err(SourceError::UnsupportedLayout(format!(
                "decoded buffer is {} bytes, expected {}",
                data.len(),
                expected
            )));
        }

        Ok(Self {
            geometry,
            metadata,
            bytes_per_pixel,
            data: Bytes::copy_from_slice(data),
        })
    }

    /// Build a source from raw row-major samples, mainly for tests and for
    /// callers that decode with their own tooling.
    pub fn from_raw(
        geometry: ImageGeometry,
        metadata: PlaneMetadata,
        data: impl Into<Bytes>,
    ) -> Result<Self, SourceError> {
        let data = data.into();
        let bytes_per_pixel = metadata.bytes_per_pixel();
        let expected = geometry.width as usize * geometry.height as usize * bytes_per_pixel;
        if data.len() != expected {
            return Err(SourceError::UnsupportedLayout(format!(
                "raw buffer is {} bytes, expected {}",
                data.len(),
                expected
            )));
        }
        Ok(Self {
            geometry,
            metadata,
            bytes_per_pixel,
            data,
        })
    }

    fn check_plane(&self, series: u32, plane: u32) -> Result<(), SourceError> {
        if series != 0 {
            return Err(SourceError::SeriesOutOfRange { series, count: 1 });
        }
        if plane != 0 {
            return Err(SourceError::PlaneOutOfRange {
                series,
                plane,
                count: 1,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ImageSource for DecodedImageSource {
    fn series_count(&self) -> u32 {
        1
    }

    fn plane_count(&self, series: u32) -> Result<u32, SourceError> {
        self.check_plane(series, 0)?;
        Ok(1)
    }

    fn geometry(&self, series: u32) -> Result<ImageGeometry, SourceError> {
        self.check_plane(series, 0)?;
        Ok(self.geometry)
    }

    fn metadata(&self, series: u32) -> Result<PlaneMetadata, SourceError> {
        self.check_plane(series, 0)?;
        Ok(self.metadata.clone())
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
        self.check_plane(series, plane)?;
        if x + w > self.geometry.width || y + h > self.geometry.height {
            return Err(SourceError::RegionOutOfBounds {
                x,
                y,
                w,
                h,
                width: self.geometry.width,
                height: self.geometry.height,
            });
        }

        let stride = self.geometry.width as usize * self.bytes_per_pixel;
        let row_len = w as usize * self.bytes_per_pixel;

        // Full-width reads are a contiguous slice of the decoded buffer.
        if w == self.geometry.width {
            let start = y as usize * stride;
            return Ok(self.data.slice(start..start + h as usize * stride));
        }

        let mut out = Vec::with_capacity(row_len * h as usize);
        for row in y..y + h {
            let start = row as usize * stride + x as usize * self.bytes_per_pixel;
            out.extend_from_slice(&self.data[start..start + row_len]);
        }
        Ok(Bytes::from(out))
    }

    fn supports_concurrent_reads(&self) -> bool {
        true
    }
}

/// Map a decoded color layout to a pixel type and channel list.
fn map_color(color: ColorType) -> Result<(PixelType, Vec<ChannelInfo>), SourceError> {
    let gray = |pt| (pt, vec![ChannelInfo::new("Channel:0", 1).with_name("Gray")]);
    let gray_alpha = |pt| {
        (
            pt,
            vec![
                ChannelInfo::new("Channel:0", 1).with_name("Gray"),
                ChannelInfo::new("Channel:1", 1).with_name("Alpha"),
            ],
        )
    };
    let rgb = |pt| (pt, vec![ChannelInfo::new("Channel:0", 3).with_name("RGB")]);
    let rgba = |pt| {
        (
            pt,
            vec![
                ChannelInfo::new("Channel:0", 3).with_name("RGB"),
                ChannelInfo::new("Channel:1", 1).with_name("Alpha"),
            ],
        )
    };

    match color {
        ColorType::L8 => Ok(gray(PixelType::UInt8)),
        ColorType::L16 => Ok(gray(PixelType::UInt16)),
        ColorType::La8 => Ok(gray_alpha(PixelType::UInt8)),
        ColorType::La16 => Ok(gray_alpha(PixelType::UInt16)),
        ColorType::Rgb8 => Ok(rgb(PixelType::UInt8)),
        ColorType::Rgb16 => Ok(rgb(PixelType::UInt16)),
        ColorType::Rgb32F => Ok(rgb(PixelType::Float32)),
        ColorType::Rgba8 => Ok(rgba(PixelType::UInt8)),
        ColorType::Rgba16 => Ok(rgba(PixelType::UInt16)),
        ColorType::Rgba32F => Ok(rgba(PixelType::Float32)),
        other => Err(SourceError::UnsupportedLayout(format!("{other:?}"))),
    }
}

// =============================================================================
// Tests
// =============================================================================
