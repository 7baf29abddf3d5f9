use thiserror::Error;

/// Errors raised by the output sink.
#[derive(Debug, Clone, Error)]
pub enum IoError {
    /// The output destination could not be created
    #[error("Unable to open output '{path}': {message}")]
    SinkOpen { path: String, message: String },

    /// A write was rejected partway through the file
    #[error("Write failed at offset {offset}: {message}")]
    Write { offset: u64, message: String },

    /// Buffered bytes could not be flushed to the destination
    #[error("Flush failed: {message}")]
    Flush { message: String },
}

/// Errors produced while planning the file layout.
///
/// All of these are raised before the first byte is written, except
/// `RegionMisplaced` which guards the emit phase against drift.
#[derive(Debug, Clone, Error)]
pub enum LayoutError {
    /// A computed offset does not fit in a 32-bit TIFF offset
    #[error("Layout overflow: {region} does not fit in a 32-bit offset")]
    Overflow { region: &'static str },

    /// Image or tile geometry is not representable
    #[error("Invalid geometry: {message}")]
    InvalidGeometry { message: String },

    /// The encoder reached a region at a position other than the planned one
    #[error("Region {region} planned at offset {expected} but emitted at {actual}")]
    RegionMisplaced {
        region: &'static str,
        expected: u64,
        actual: u64,
    },
}

/// Errors related to the tag table.
#[derive(Debug, Clone, Error)]
pub enum TagError {
    /// Tags were not inserted in strictly increasing order
    #[error("Tags must be strictly increasing: {current} follows {previous}")]
    Unsorted { previous: u16, current: u16 },

    /// A directory must hold at least one entry
    #[error("Tag table is empty")]
    Empty,

    /// More entries than the 16-bit entry count can describe
    #[error("Too many tags: {0}")]
    TooMany(usize),

    /// Inline storage chosen for a value that needs an offset, or vice versa
    #[error("Tag {tag}: {bytes}-byte value stored {storage}")]
    StorageMismatch {
        tag: u16,
        bytes: u64,
        storage: &'static str,
    },
}

/// Errors in the georeferencing key directory.
#[derive(Debug, Clone, Error)]
pub enum GeoKeyError {
    /// Keys were not supplied in strictly increasing order
    #[error("GeoKeys must be strictly increasing: {current} follows {previous}")]
    Unsorted { previous: u16, current: u16 },

    /// A key points past the end of the double parameter block
    #[error("GeoKey {key} references double index {index}, but only {len} doubles exist")]
    DoubleIndexOutOfRange { key: u16, index: u16, len: usize },

    /// A key points past the end of the ASCII parameter block
    #[error("GeoKey {key} references ASCII bytes {offset}..{offset}+{count}, but block is {len} bytes")]
    AsciiRangeOutOfBounds {
        key: u16,
        offset: u16,
        count: u16,
        len: usize,
    },

    /// A key uses a location that is neither inline nor a parameter tag
    #[error("GeoKey {key} has unknown location {location}")]
    UnknownLocation { key: u16, location: u16 },

    /// The directory cannot hold this many keys
    #[error("Too many GeoKeys: {0}")]
    TooManyKeys(usize),

    /// A parameter block grew past what a 16-bit offset or count can address
    #[error("GeoKey {key}: parameter offset or count exceeds 65535")]
    ParamOverflow { key: u16 },

    /// The model transformation is not a 4x4 matrix
    #[error("ModelTransformation must hold 16 values, got {0}")]
    TransformationLength(usize),

    /// The ASCII parameter block contains non-ASCII characters
    #[error("GeoASCIIParams must be pure ASCII")]
    NonAscii,
}

/// Errors from the pixel source and tile payloads.
#[derive(Debug, Clone, Error)]
pub enum TileError {
    /// The payload buffer could not be allocated
    #[error("Failed to allocate {bytes} bytes for tile data")]
    Allocation { bytes: usize },

    /// The pixel source returned a payload of the wrong length
    #[error("Tile {tile} payload is {actual} bytes, expected {expected}")]
    SizeMismatch {
        tile: u32,
        expected: usize,
        actual: usize,
    },

    /// The pixel source ran out of tiles
    #[error("Pixel source exhausted after {produced} tiles")]
    Exhausted { produced: u32 },
}

/// Top-level error for writing a container.
#[derive(Debug, Clone, Error)]
pub enum WriterError {
    /// Output sink failure
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// Layout planning failure
    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    /// Tag table failure
    #[error("Tag error: {0}")]
    Tag(#[from] TagError),

    /// GeoKey directory failure
    #[error("GeoKey error: {0}")]
    GeoKey(#[from] GeoKeyError),

    /// Pixel source failure
    #[error("Tile error: {0}")]
    Tile(#[from] TileError),
}

/// Errors that can occur when reading a written TIFF back
#[derive(Debug, Clone, Error)]
pub enum TiffError {
    /// Invalid TIFF magic bytes (not II or MM)
    #[error("Invalid TIFF magic bytes: expected 0x4949 (II) or 0x4D4D (MM), got 0x{0:04X}")]
    InvalidMagic(u16),

    /// Invalid TIFF version number
    #[error("Invalid TIFF version: expected 42 (TIFF), got {0}")]
    InvalidVersion(u16),

    /// BigTIFF files are recognised but not read
    #[error("BigTIFF is not supported")]
    BigTiffUnsupported,

    /// File is too small to contain the requested structure
    #[error("File too small: need at least {required} bytes, got {actual}")]
    FileTooSmall { required: u64, actual: u64 },

    /// Invalid IFD offset (points outside file or to invalid location)
    #[error("Invalid IFD offset: {0}")]
    InvalidIfdOffset(u64),

    /// A value offset points outside the file
    #[error("Value for tag {tag} at offset {offset} ({len} bytes) exceeds file size {size}")]
    ValueOutOfBounds {
        tag: u16,
        offset: u64,
        len: u64,
        size: u64,
    },

    /// Required tag is missing from IFD
    #[error("Missing required tag: {0}")]
    MissingTag(&'static str),

    /// Tag has unexpected type or count
    #[error("Invalid tag value for {tag}: {message}")]
    InvalidTagValue { tag: &'static str, message: String },

    /// Unknown field type in IFD entry
    #[error("Unknown field type: {0}")]
    UnknownFieldType(u16),

    /// The file parses but disagrees with the layout it was written from
    #[error("File does not match its layout: {0}")]
    LayoutMismatch(String),
}
