//! Test utilities for integration tests.
//!
//! Helpers for building writers, producing files in memory and reading their
//! directories back.

use bytes::Bytes;

use ghost_geotiff::error::TileError;
use ghost_geotiff::format::tiff::{ByteOrder, Ifd, IfdEntry, TiffHeader, TiffTag, ValueReader};
use ghost_geotiff::tile::{GradientPixelSource, PixelSource};
use ghost_geotiff::writer::{GeoTiffWriter, WriteOptions, WriteSummary};
use ghost_geotiff::{GhostHeader, ImageGeometry};

// =============================================================================
// Writers
// =============================================================================

/// The default 1024x1024 writer.
pub fn reference_writer() -> GeoTiffWriter {
    GeoTiffWriter::new(WriteOptions::default()).unwrap()
}

/// A 64x32 image in 16x16 tiles (8 tiles of 256 bytes).
pub fn small_geometry() -> ImageGeometry {
    ImageGeometry {
        width: 64,
        height: 32,
        tile_width: 16,
        tile_height: 16,
        bits_per_sample: 8,
        samples_per_pixel: 1,
    }
}

pub fn small_writer(ghost: GhostHeader) -> GeoTiffWriter {
    GeoTiffWriter::new(WriteOptions {
        geometry: small_geometry(),
        ghost,
        ..Default::default()
    })
    .unwrap()
}

/// Write `writer`'s file with gradient pixels.
pub fn write_gradient(writer: &GeoTiffWriter) -> (Bytes, WriteSummary) {
    let mut pixels = GradientPixelSource::new(writer.geometry());
    writer.to_bytes(&mut pixels).unwrap()
}

// =============================================================================
// Read-back
// =============================================================================

/// Parse the header and the first directory of a written file.
pub fn read_directory(file: &[u8]) -> Ifd {
    let header = TiffHeader::parse(file, file.len() as u64).unwrap();
    assert_eq!(header.byte_order, ByteOrder::LittleEndian);
    Ifd::parse(file, header.first_ifd_offset, header.byte_order).unwrap()
}

pub fn entry(ifd: &Ifd, tag: TiffTag) -> &IfdEntry {
    ifd.require(tag).unwrap()
}

pub fn read_u32s(file: &[u8], ifd: &Ifd, tag: TiffTag) -> Vec<u32> {
    ValueReader::new(file, ByteOrder::LittleEndian)
        .read_u32_array(entry(ifd, tag))
        .unwrap()
}

pub fn read_u16_le(file: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([file[at], file[at + 1]])
}

pub fn read_u32_le(file: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([file[at], file[at + 1], file[at + 2], file[at + 3]])
}

// =============================================================================
// Pixel Sources
// =============================================================================

/// Produces a fixed number of good tiles, then fails.
pub struct FailingPixelSource {
    tile_len: usize,
    remaining: u32,
}

impl FailingPixelSource {
    pub fn new(geometry: &ImageGeometry, good_tiles: u32) -> Self {
        Self {
            tile_len: geometry.tile_byte_size() as usize,
            remaining: good_tiles,
        }
    }
}

impl PixelSource for FailingPixelSource {
    fn next_tile_payload(&mut self) -> Result<Bytes, TileError> {
        if self.remaining == 0 {
            return Err(TileError::Allocation {
                bytes: self.tile_len,
            });
        }
        self.remaining -= 1;
        Ok(Bytes::from(vec![0u8; self.tile_len]))
    }
}
