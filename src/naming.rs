//! Tile naming.
//!
//! Every emitted tile is keyed by `(x_origin, y_origin, series, plane)`.
//! Distinct tiles always differ in at least one of the four coordinates, so
//! embedding the key in the filename makes each output uniquely addressable
//! and lets a consumer reconstruct tile placement without re-deriving the
//! grid. The pattern is `{base}_xoff{X}_yoff{Y}_series{S}_index{I}.tif`.

use std::path::Path;

/// Position of one plane within the input: which series, which plane index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaneIdentity {
    pub series: u32,
    pub plane: u32,
}

/// Unique key of one emitted tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileIdentity {
    pub x_origin: u32,
    pub y_origin: u32,
    pub series: u32,
    pub plane: u32,
}

impl TileIdentity {
    pub fn new(x_origin: u32, y_origin: u32, identity: PlaneIdentity) -> Self {
        Self {
            x_origin,
            y_origin,
            series: identity.series,
            plane: identity.plane,
        }
    }
}

/// Build the output filename for a tile.
pub fn tile_file_name(base: &str, id: &TileIdentity) -> String {
    format!(
        "{}_xoff{}_yoff{}_series{}_index{}.tif",
        base, id.x_origin, id.y_origin, id.series, id.plane
    )
}

/// Recover the tile key from an output filename.
///
/// Returns `None` if the name does not follow the tile pattern. The base
/// name may itself contain underscores or digits; the four tagged fields
/// are matched from the right.
pub fn parse_tile_file_name(name: &str) -> Option<TileIdentity> {
    let stem = name.strip_suffix(".tif")?;
    let (rest, plane) = split_tagged(stem, "_index")?;
    let (rest, series) = split_tagged(rest, "_series")?;
    let (rest, y_origin) = split_tagged(rest, "_yoff")?;
    let (_, x_origin) = split_tagged(rest, "_xoff")?;
    Some(TileIdentity {
        x_origin,
        y_origin,
        series,
        plane,
    })
}

/// Split `text` at the last occurrence of `tag` and parse what follows as a
/// number. The trailing field must be purely numeric.
fn split_tagged<'a>(text: &'a str, tag: &str) -> Option<(&'a str, u32)> {
    let at = text.rfind(tag)?;
    let value = &text[at + tag.len()..];
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((&text[..at], value.parse().ok()?))
}

/// Base name for tiles derived from an input path: the file name without
/// its final extension.
pub fn base_name(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "tile".to_string())
}

// =============================================================================
// Tests
// =============================================================================
