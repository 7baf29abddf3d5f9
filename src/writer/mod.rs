//! GeoTIFF writer.
//!
//! Planning and emitting are separate steps:
//!
//! ```text
//! WriteOptions ──► GeoTiffWriter::new ──► FileLayout + TagTable
//!                                             │
//!                        PixelSource ──► write_to / write_file / to_bytes
//! ```
//!
//! # Example
//!
//! ```
//! use ghost_geotiff::tile::GradientPixelSource;
//! use ghost_geotiff::writer::{GeoTiffWriter, WriteOptions};
//!
//! let writer = GeoTiffWriter::new(WriteOptions::default()).unwrap();
//! let mut pixels = GradientPixelSource::new(writer.geometry());
//! let (bytes, summary) = writer.to_bytes(&mut pixels).unwrap();
//!
//! assert_eq!(bytes.len() as u64, summary.total_bytes);
//! assert_eq!(summary.pixel_data_offset, 1350);
//! ```

mod assembler;

use serde::Serialize;

use crate::format::geokey::GeoReference;
use crate::format::ghost::GhostHeader;
use crate::format::tiff::ImageGeometry;

pub use assembler::{GeoTiffWriter, NUM_TAGS};

/// Inputs for planning a file.
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    pub geometry: ImageGeometry,
    pub georef: GeoReference,
    pub ghost: GhostHeader,
}

/// What was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WriteSummary {
    /// Total file size in bytes
    pub total_bytes: u64,

    pub num_tiles: u32,

    pub tile_byte_size: u32,

    /// Offset of the directory (8 + ghost header length)
    pub directory_offset: u32,

    /// Offset of the first tile's payload
    pub pixel_data_offset: u32,

    /// False when the ghost header's declared size disagrees with its text
    pub ghost_header_consistent: bool,
}
