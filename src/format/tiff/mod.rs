//! Classic TIFF structure: tags, directories, layout planning and read-back.
//!
//! # Key Concepts
//!
//! - **Byte order**: files written here are always little-endian ("II").
//!   The read-back parser honours whatever order a header declares.
//!
//! - **IFD (Image File Directory)**: a count, sorted 12-byte entries and a
//!   pointer to the next directory. Only one directory is written, so the
//!   pointer is always zero.
//!
//! - **Inline vs offset values**: a value is stored in the entry itself
//!   exactly when `type size x count <= 4`; otherwise the entry holds the
//!   absolute offset of a region the layout planner reserved.

mod directory;
mod layout;
mod parser;
mod tags;
mod validation;
mod values;

pub use directory::{
    directory_size, DirectoryEntry, EntryValue, TagTable, TagTableBuilder, IFD_ENTRY_SIZE,
};
pub use layout::{
    BlockSizes, FileLayout, ImageGeometry, Region, RegionKind, TIFF_HEADER_SIZE,
    TILE_DIMENSION_MULTIPLE,
};
pub use parser::{ByteOrder, Ifd, IfdEntry, TiffHeader, VERSION_TIFF};
pub use tags::{Compression, FieldType, Photometric, TiffTag};
pub use validation::{validate_container, ValidationError, ValidationResult};
pub use values::ValueReader;
