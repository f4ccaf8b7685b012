use thiserror::Error;

/// Configuration errors detected before any tile is processed
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Tile overlap must be strictly smaller than the tile dimensions,
    /// otherwise the grid stride is zero or negative and never advances
    #[error(
        "overlap {overlap} must be smaller than the tile size {nominal_width}x{nominal_height}"
    )]
    OverlapTooLarge {
        overlap: u32,
        nominal_width: u32,
        nominal_height: u32,
    },

    /// Nominal tile dimensions must be positive
    #[error("tile size must be positive, got {nominal_width}x{nominal_height}")]
    ZeroTileDimension {
        nominal_width: u32,
        nominal_height: u32,
    },

    /// Image dimensions must be positive
    #[error("image dimensions must be positive, got {width}x{height}")]
    EmptyImage { width: u32, height: u32 },

    /// The skip and pad edge policies are mutually exclusive
    #[error("the skip and pad flags cannot be combined")]
    ConflictingPolicies,

    /// Input file cannot be opened or decoded
    #[error("cannot read input {path}: {message}")]
    UnreadableInput { path: String, message: String },

    /// Output directory cannot be created
    #[error("cannot create output directory {path}: {message}")]
    OutputDirUnavailable { path: String, message: String },
}

/// Errors raised by an image source collaborator
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// Series index exceeds the number of series in the input
    #[error("series {series} out of range: input has {count} series")]
    SeriesOutOfRange { series: u32, count: u32 },

    /// Plane index exceeds the number of planes in the series
    #[error("plane {plane} out of range: series {series} has {count} planes")]
    PlaneOutOfRange { series: u32, plane: u32, count: u32 },

    /// Requested region extends beyond the plane bounds
    #[error(
        "region {w}x{h}+{x}+{y} out of bounds for a {width}x{height} plane"
    )]
    RegionOutOfBounds {
        x: u32,
        y: u32,
        w: u32,
        h: u32,
        width: u32,
        height: u32,
    },

    /// Input could not be decoded
    #[error("decode error: {0}")]
    Decode(String),

    /// The pixel layout of the input is not supported
    #[error("unsupported pixel layout: {0}")]
    UnsupportedLayout(String),

    /// I/O error while reading the input
    #[error("I/O error: {0}")]
    Io(String),
}

/// Errors raised by a tile sink collaborator
#[derive(Debug, Clone, Error)]
pub enum SinkError {
    /// Tile could not be encoded into the output container
    #[error("encode error: {0}")]
    Encode(String),

    /// I/O error while writing the output file
    #[error("I/O error: {0}")]
    Io(String),
}

/// Errors raised while composing an output tile buffer
#[derive(Debug, Clone, Error)]
pub enum ComposeError {
    /// The fetched region does not match the descriptor's pixel span
    #[error("region size mismatch: expected {expected} bytes, got {actual}")]
    RegionSizeMismatch { expected: usize, actual: usize },
}

/// Errors raised while parsing or building a TIFF container
#[derive(Debug, Clone, Error)]
pub enum TiffError {
    /// Invalid TIFF magic bytes (not II or MM)
    #[error("invalid TIFF magic bytes: expected 0x4949 (II) or 0x4D4D (MM), got 0x{0:04X}")]
    InvalidMagic(u16),

    /// Invalid TIFF version number
    #[error("invalid TIFF version: expected 42, got {0}")]
    InvalidVersion(u16),

    /// File ends before the structure it declares
    #[error("truncated TIFF: need {required} bytes, got {actual}")]
    Truncated { required: usize, actual: usize },

    /// Required tag is missing from the IFD
    #[error("missing required tag: {0}")]
    MissingTag(&'static str),

    /// Sample buffer does not match the declared dimensions
    #[error("sample buffer mismatch: {message}")]
    SampleMismatch { message: String },

    /// Structure the reader does not support
    #[error("unsupported TIFF structure: {0}")]
    Unsupported(String),
}

/// Top-level error for a tiling run.
///
/// Every variant carries enough context (series, plane, tile origin) to
/// locate the offending tile. Any error aborts the run; tiles already
/// written stay on disk.
#[derive(Debug, Error)]
pub enum TileError {
    /// Invalid configuration, rejected before any tile is processed
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Series structure or metadata could not be read
    #[error("cannot read structure of series {series}: {source}")]
    SeriesMetadata {
        series: u32,
        #[source]
        source: SourceError,
    },

    /// A region read failed; fatal to the whole run
    #[error("read failed for series {series} plane {plane} tile at ({x}, {y}): {source}")]
    SourceRead {
        series: u32,
        plane: u32,
        x: u32,
        y: u32,
        #[source]
        source: SourceError,
    },

    /// A tile write failed; fatal to the whole run
    #[error("write failed for series {series} plane {plane} tile at ({x}, {y}): {source}")]
    SinkWrite {
        series: u32,
        plane: u32,
        x: u32,
        y: u32,
        #[source]
        source: SinkError,
    },

    /// The fetched region could not be composed into a tile buffer
    #[error("compose failed for series {series} plane {plane} tile at ({x}, {y}): {source}")]
    Compose {
        series: u32,
        plane: u32,
        x: u32,
        y: u32,
        #[source]
        source: ComposeError,
    },

    /// A worker task panicked or was cancelled
    #[error("tile worker failed: {0}")]
    Worker(String),
}
