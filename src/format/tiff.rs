//! Baseline TIFF writing and verification.
//!
//! Each tile becomes a minimal classic TIFF: one IFD, one strip, no
//! compression. The file is written in the byte order of the source
//! samples (II or MM), so multi-byte pixel data passes through untouched
//! and the header declares how to read it. Channel names, when present,
//! are carried in the ImageDescription tag.
//!
//! [`read_baseline`] is the matching consumer-side reader: it parses the
//! subset this writer produces, and exists mainly so tests and downstream
//! tools can verify tiles without a full TIFF stack.

use crate::error::TiffError;
use crate::meta::TileMetadata;

// =============================================================================
// Byte Order
// =============================================================================

/// TIFF byte order, declared by the first two header bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// "II" - little-endian
    Little,

    /// "MM" - big-endian
    Big,
}

impl ByteOrder {
    fn put_u16(self, buf: &mut Vec<u8>, value: u16) {
        match self {
            ByteOrder::Little => buf.extend_from_slice(&value.to_le_bytes()),
            ByteOrder::Big => buf.extend_from_slice(&value.to_be_bytes()),
        }
    }

    fn put_u32(self, buf: &mut Vec<u8>, value: u32) {
        match self {
            ByteOrder::Little => buf.extend_from_slice(&value.to_le_bytes()),
            ByteOrder::Big => buf.extend_from_slice(&value.to_be_bytes()),
        }
    }

    fn read_u16(self, data: &[u8], pos: usize) -> Result<u16, TiffError> {
        let bytes = take(data, pos, 2)?;
        let bytes = [bytes[0], bytes[1]];
        Ok(match self {
            ByteOrder::Little => u16::from_le_bytes(bytes),
            ByteOrder::Big => u16::from_be_bytes(bytes),
        })
    }

    fn read_u32(self, data: &[u8], pos: usize) -> Result<u32, TiffError> {
        let bytes = take(data, pos, 4)?;
        let bytes = [bytes[0], bytes[1], bytes[2], bytes[3]];
        Ok(match self {
            ByteOrder::Little => u32::from_le_bytes(bytes),
            ByteOrder::Big => u32::from_be_bytes(bytes),
        })
    }
}

fn take(data: &[u8], pos: usize, len: usize) -> Result<&[u8], TiffError> {
    data.get(pos..pos + len).ok_or(TiffError::Truncated {
        required: pos + len,
        actual: data.len(),
    })
}

// =============================================================================
// Tags and Field Types
// =============================================================================

/// Tags this writer emits, in required ascending order.
mod tag {
    pub const IMAGE_WIDTH: u16 = 256;
    pub const IMAGE_LENGTH: u16 = 257;
    pub const BITS_PER_SAMPLE: u16 = 258;
    pub const COMPRESSION: u16 = 259;
    pub const PHOTOMETRIC: u16 = 262;
    pub const IMAGE_DESCRIPTION: u16 = 270;
    pub const STRIP_OFFSETS: u16 = 273;
    pub const SAMPLES_PER_PIXEL: u16 = 277;
    pub const ROWS_PER_STRIP: u16 = 278;
    pub const STRIP_BYTE_COUNTS: u16 = 279;
    pub const SAMPLE_FORMAT: u16 = 339;
}

mod field_type {
    pub const ASCII: u16 = 2;
    pub const SHORT: u16 = 3;
    pub const LONG: u16 = 4;
}

const TIFF_VERSION: u16 = 42;
const HEADER_SIZE: usize = 8;
const ENTRY_SIZE: usize = 12;

/// Photometric interpretation: grayscale below three samples, RGB from
/// three up (extra samples are alpha/auxiliary).
const PHOTOMETRIC_BLACK_IS_ZERO: u16 = 1;
const PHOTOMETRIC_RGB: u16 = 2;

const COMPRESSION_NONE: u16 = 1;

const SAMPLE_FORMAT_UINT: u16 = 1;
const SAMPLE_FORMAT_INT: u16 = 2;
const SAMPLE_FORMAT_FLOAT: u16 = 3;

// =============================================================================
// Writer
// =============================================================================

struct IfdEntry {
    tag: u16,
    field_type: u16,
    count: u32,
    /// Value bytes, already in the target byte order
    payload: Vec<u8>,
}

/// Encode one tile as a complete baseline TIFF file.
///
/// `samples` is the row-major tile buffer, already in the byte order the
/// metadata declares; its length must match the metadata exactly.
///
/// # Errors
///
/// Returns [`TiffError::SampleMismatch`] when the buffer length does not
/// match `width * height * bytes_per_pixel`.
pub fn encode_tile(meta: &TileMetadata, samples: &[u8]) -> Result<Vec<u8>, TiffError> {
    if samples.len() != meta.buffer_len() {
        return Err(TiffError::SampleMismatch {
            message: format!(
                "expected {} bytes for a {}x{} tile, got {}",
                meta.buffer_len(),
                meta.width,
                meta.height,
                samples.len()
            ),
        });
    }

    let order = if meta.plane.big_endian {
        ByteOrder::Big
    } else {
        ByteOrder::Little
    };
    let spp = meta.plane.samples_per_pixel();
    let bits = meta.plane.pixel_type.bits_per_sample();
    let photometric = if spp >= 3 {
        PHOTOMETRIC_RGB
    } else {
        PHOTOMETRIC_BLACK_IS_ZERO
    };
    let sample_format = if meta.plane.pixel_type.is_float() {
        SAMPLE_FORMAT_FLOAT
    } else if meta.plane.pixel_type.is_signed() {
        SAMPLE_FORMAT_INT
    } else {
        SAMPLE_FORMAT_UINT
    };

    let mut entries = Vec::new();
    entries.push(long_entry(order, tag::IMAGE_WIDTH, meta.width));
    entries.push(long_entry(order, tag::IMAGE_LENGTH, meta.height));
    entries.push(short_array_entry(
        order,
        tag::BITS_PER_SAMPLE,
        &vec![bits; spp as usize],
    ));
    entries.push(short_entry(order, tag::COMPRESSION, COMPRESSION_NONE));
    entries.push(short_entry(order, tag::PHOTOMETRIC, photometric));
    if let Some(description) = channel_description(meta) {
        entries.push(ascii_entry(tag::IMAGE_DESCRIPTION, &description));
    }
    // Strip offset is patched once the layout is known.
    let strip_offsets_index = entries.len();
    entries.push(long_entry(order, tag::STRIP_OFFSETS, 0));
    entries.push(short_entry(order, tag::SAMPLES_PER_PIXEL, spp as u16));
    entries.push(long_entry(order, tag::ROWS_PER_STRIP, meta.height));
    entries.push(long_entry(
        order,
        tag::STRIP_BYTE_COUNTS,
        samples.len() as u32,
    ));
    entries.push(short_array_entry(
        order,
        tag::SAMPLE_FORMAT,
        &vec![sample_format; spp as usize],
    ));

    // Layout: header | IFD | out-of-line values | strip data.
    let ifd_len = 2 + entries.len() * ENTRY_SIZE + 4;
    let external_base = HEADER_SIZE + ifd_len;
    let mut external: Vec<u8> = Vec::new();
    let mut value_slots: Vec<[u8; 4]> = Vec::with_capacity(entries.len());
    for entry in &entries {
        if entry.payload.len() <= 4 {
            let mut slot = [0u8; 4];
            slot[..entry.payload.len()].copy_from_slice(&entry.payload);
            value_slots.push(slot);
        } else {
            if external.len() % 2 != 0 {
                external.push(0);
            }
            let offset = (external_base + external.len()) as u32;
            let mut slot = Vec::new();
            order.put_u32(&mut slot, offset);
            value_slots.push([slot[0], slot[1], slot[2], slot[3]]);
            external.extend_from_slice(&entry.payload);
        }
    }
    if external.len() % 2 != 0 {
        external.push(0);
    }

    let data_offset = (external_base + external.len()) as u32;
    let mut patched = Vec::new();
    order.put_u32(&mut patched, data_offset);
    value_slots[strip_offsets_index] = [patched[0], patched[1], patched[2], patched[3]];

    let mut out = Vec::with_capacity(data_offset as usize + samples.len());
    match order {
        ByteOrder::Little => out.extend_from_slice(b"II"),
        ByteOrder::Big => out.extend_from_slice(b"MM"),
    }
    order.put_u16(&mut out, TIFF_VERSION);
    order.put_u32(&mut out, HEADER_SIZE as u32);

    order.put_u16(&mut out, entries.len() as u16);
    for (entry, slot) in entries.iter().zip(&value_slots) {
        order.put_u16(&mut out, entry.tag);
        order.put_u16(&mut out, entry.field_type);
        order.put_u32(&mut out, entry.count);
        out.extend_from_slice(slot);
    }
    // No further IFDs.
    order.put_u32(&mut out, 0);

    out.extend_from_slice(&external);
    out.extend_from_slice(samples);
    Ok(out)
}

fn short_entry(order: ByteOrder, tag: u16, value: u16) -> IfdEntry {
    let mut payload = Vec::new();
    order.put_u16(&mut payload, value);
    IfdEntry {
        tag,
        field_type: field_type::SHORT,
        count: 1,
        payload,
    }
}

fn short_array_entry(order: ByteOrder, tag: u16, values: &[u16]) -> IfdEntry {
    let mut payload = Vec::new();
    for &value in values {
        order.put_u16(&mut payload, value);
    }
    IfdEntry {
        tag,
        field_type: field_type::SHORT,
        count: values.len() as u32,
        payload,
    }
}

fn long_entry(order: ByteOrder, tag: u16, value: u32) -> IfdEntry {
    let mut payload = Vec::new();
    order.put_u32(&mut payload, value);
    IfdEntry {
        tag,
        field_type: field_type::LONG,
        count: 1,
        payload,
    }
}

fn ascii_entry(tag: u16, text: &str) -> IfdEntry {
    let mut payload = text.as_bytes().to_vec();
    payload.push(0);
    IfdEntry {
        tag,
        field_type: field_type::ASCII,
        count: payload.len() as u32,
        payload,
    }
}

/// ImageDescription payload carrying the channel names, when any exist.
fn channel_description(meta: &TileMetadata) -> Option<String> {
    if meta.plane.channels.iter().all(|c| c.name.is_none()) {
        return None;
    }
    let names: Vec<&str> = meta
        .plane
        .channels
        .iter()
        .map(|c| c.name.as_deref().unwrap_or(""))
        .collect();
    Some(format!("channels={}", names.join(",")))
}

// =============================================================================
// Reader
// =============================================================================

/// Decoded view of a baseline TIFF written by [`encode_tile`].
#[derive(Debug, Clone)]
pub struct BaselineTiff {
    pub big_endian: bool,
    pub width: u32,
    pub height: u32,
    pub bits_per_sample: u16,
    pub samples_per_pixel: u16,
    pub sample_format: u16,
    pub description: Option<String>,
    /// Raw strip data, concatenated in row order
    pub samples: Vec<u8>,
}

/// Parse a baseline strip-organized TIFF.
///
/// Supports the single-IFD, uncompressed subset produced by [`encode_tile`];
/// anything else (compressed data, tiled organization) is rejected as
/// [`TiffError::Unsupported`].
pub fn read_baseline(data: &[u8]) -> Result<BaselineTiff, TiffError> {
    let magic = take(data, 0, 2)?;
    let order = if magic == b"II" {
        ByteOrder::Little
    } else if magic == b"MM" {
        ByteOrder::Big
    } else {
        return Err(TiffError::InvalidMagic(u16::from_be_bytes([
            magic[0], magic[1],
        ])));
    };
    let version = order.read_u16(data, 2)?;
    if version != TIFF_VERSION {
        return Err(TiffError::InvalidVersion(version));
    }

    let ifd_offset = order.read_u32(data, 4)? as usize;
    let entry_count = order.read_u16(data, ifd_offset)? as usize;

    let mut width = None;
    let mut height = None;
    let mut bits = None;
    let mut spp = 1u16;
    let mut sample_format = SAMPLE_FORMAT_UINT;
    let mut compression = COMPRESSION_NONE;
    let mut description = None;
    let mut strip_offsets = None;
    let mut strip_byte_counts = None;

    for index in 0..entry_count {
        let pos = ifd_offset + 2 + index * ENTRY_SIZE;
        let tag = order.read_u16(data, pos)?;
        let field_type = order.read_u16(data, pos + 2)?;
        let count = order.read_u32(data, pos + 4)?;

        match tag {
            tag::IMAGE_WIDTH => width = Some(entry_values(data, order, field_type, count, pos)?[0]),
            tag::IMAGE_LENGTH => {
                height = Some(entry_values(data, order, field_type, count, pos)?[0])
            }
            tag::BITS_PER_SAMPLE => {
                let values = entry_values(data, order, field_type, count, pos)?;
                if values.windows(2).any(|w| w[0] != w[1]) {
                    return Err(TiffError::Unsupported(
                        "heterogeneous bits per sample".to_string(),
                    ));
                }
                bits = Some(values[0] as u16);
            }
            tag::COMPRESSION => {
                compression = entry_values(data, order, field_type, count, pos)?[0] as u16
            }
            tag::IMAGE_DESCRIPTION => {
                let bytes = entry_bytes(data, order, field_type, count, pos)?;
                let text: Vec<u8> = bytes.iter().copied().take_while(|&b| b != 0).collect();
                description = Some(String::from_utf8_lossy(&text).into_owned());
            }
            tag::STRIP_OFFSETS => {
                strip_offsets = Some(entry_values(data, order, field_type, count, pos)?)
            }
            tag::SAMPLES_PER_PIXEL => {
                spp = entry_values(data, order, field_type, count, pos)?[0] as u16
            }
            tag::STRIP_BYTE_COUNTS => {
                strip_byte_counts = Some(entry_values(data, order, field_type, count, pos)?)
            }
            tag::SAMPLE_FORMAT => {
                sample_format = entry_values(data, order, field_type, count, pos)?[0] as u16
            }
            _ => {}
        }
    }

    if compression != COMPRESSION_NONE {
        return Err(TiffError::Unsupported(format!(
            "compression {compression}"
        )));
    }

    let width = width.ok_or(TiffError::MissingTag("ImageWidth"))?;
    let height = height.ok_or(TiffError::MissingTag("ImageLength"))?;
    let bits_per_sample = bits.ok_or(TiffError::MissingTag("BitsPerSample"))?;
    let offsets = strip_offsets.ok_or(TiffError::MissingTag("StripOffsets"))?;
    let counts = strip_byte_counts.ok_or(TiffError::MissingTag("StripByteCounts"))?;
    if offsets.len() != counts.len() {
        return Err(TiffError::Unsupported(
            "strip offset/count length mismatch".to_string(),
        ));
    }

    let mut samples = Vec::new();
    for (&offset, &count) in offsets.iter().zip(&counts) {
        samples.extend_from_slice(take(data, offset as usize, count as usize)?);
    }

    Ok(BaselineTiff {
        big_endian: order == ByteOrder::Big,
        width,
        height,
        bits_per_sample,
        samples_per_pixel: spp,
        sample_format,
        description,
        samples,
    })
}

/// Read an entry's values as u32s, following the inline-vs-offset rule.
fn entry_values(
    data: &[u8],
    order: ByteOrder,
    field_type: u16,
    count: u32,
    entry_pos: usize,
) -> Result<Vec<u32>, TiffError> {
    let size = match field_type {
        field_type::SHORT => 2,
        field_type::LONG => 4,
        other => {
            return Err(TiffError::Unsupported(format!(
                "field type {other} for a numeric tag"
            )))
        }
    };
    let pos = value_pos(data, order, size, count, entry_pos)?;
    let mut values = Vec::with_capacity(count as usize);
    for index in 0..count as usize {
        let at = pos + index * size;
        values.push(match size {
            2 => order.read_u16(data, at)? as u32,
            _ => order.read_u32(data, at)?,
        });
    }
    Ok(values)
}

/// Read an entry's raw bytes (ASCII/byte-like payloads).
fn entry_bytes(
    data: &[u8],
    order: ByteOrder,
    _field_type: u16,
    count: u32,
    entry_pos: usize,
) -> Result<Vec<u8>, TiffError> {
    let pos = value_pos(data, order, 1, count, entry_pos)?;
    Ok(take(data, pos, count as usize)?.to_vec())
}

/// Position of an entry's value: inline in the 4-byte value field when it
/// fits, behind an offset otherwise.
fn value_pos(
    data: &[u8],
    order: ByteOrder,
    size: usize,
    count: u32,
    entry_pos: usize,
) -> Result<usize, TiffError> {
    let total = size * count as usize;
    if total <= 4 {
        Ok(entry_pos + 8)
    } else {
        Ok(order.read_u32(data, entry_pos + 8)? as usize)
    }
}

// =============================================================================
// Tests
// =============================================================================
