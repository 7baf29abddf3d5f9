//! # Ghost GeoTIFF
//!
//! A one-shot writer for tiled, georeferenced GeoTIFF files carrying a GDAL
//! "ghost" header.
//!
//! The whole file is planned before a single byte is written: every region
//! has a known offset and length, the directory's pointers are bound to those
//! offsets, and the writer then streams the regions in order while checking
//! its position against the plan.
//!
//! ## Architecture
//!
//! - [`io`] - Little-endian encoder, output sink and read helpers
//! - [`mod@format`] - TIFF layout, tag table, GeoKeys, ghost header and read-back validation
//! - [`tile`] - Pixel sources that supply tile payloads
//! - [`writer`] - Container assembly
//! - [`config`] - CLI configuration
//!
//! ## File Layout
//!
//! ```text
//! header (8) | ghost header | directory | tile offsets | tile byte counts |
//! transformation | geo keys | geo doubles | geo ascii | tile data
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use ghost_geotiff::{GeoTiffWriter, RandomPixelSource, WriteOptions};
//!
//! let writer = GeoTiffWriter::new(WriteOptions::default()).unwrap();
//! let mut pixels = RandomPixelSource::new(writer.geometry(), Some(42));
//! let summary = writer.write_file("moon.tif", &mut pixels).unwrap();
//!
//! assert_eq!(summary.total_bytes, 1_049_926);
//! ```

pub mod config;
pub mod error;
pub mod format;
pub mod io;
pub mod tile;
pub mod writer;

// Re-export commonly used types
pub use config::{Config, PixelPattern};
pub use error::{GeoKeyError, IoError, LayoutError, TagError, TiffError, TileError, WriterError};
pub use format::tiff::{
    validate_container, BlockSizes, ByteOrder, Compression, DirectoryEntry, FieldType, FileLayout,
    Ifd, IfdEntry, ImageGeometry, Photometric, Region, RegionKind, TagTable, TagTableBuilder,
    TiffHeader, TiffTag, ValidationError, ValidationResult, ValueReader, TIFF_HEADER_SIZE,
};
pub use format::{GeoBlocks, GeoKeyDirectoryBuilder, GeoKeyEntry, GeoReference, GhostHeader};
pub use io::{FileSink, LeEncoder};
pub use tile::{ConstantPixelSource, GradientPixelSource, PixelSource, RandomPixelSource};
pub use writer::{GeoTiffWriter, WriteOptions, WriteSummary, NUM_TAGS};
