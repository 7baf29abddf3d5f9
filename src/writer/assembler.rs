//! Container assembly.
//!
//! [`GeoTiffWriter::new`] does all of the planning: it validates the
//! georeference, sizes the blocks, places every region and binds the tag
//! table to the planned offsets. Writing is then a single forward pass that
//! checks the encoder position against the plan at every region boundary.

use std::io::Write;
use std::path::Path;

use bytes::Bytes;
use tracing::{debug, info};

use crate::error::{LayoutError, TagError, TileError, WriterError};
use crate::format::geokey::GeoBlocks;
use crate::format::ghost::GhostHeader;
use crate::format::tiff::{
    BlockSizes, Compression, DirectoryEntry, EntryValue, FieldType, FileLayout, ImageGeometry,
    Photometric, RegionKind, TagTable, TagTableBuilder, TiffTag, VERSION_TIFF,
};
use crate::io::{FileSink, LeEncoder};
use crate::tile::PixelSource;

use super::{WriteOptions, WriteSummary};

/// Number of directory entries every file carries.
pub const NUM_TAGS: u16 = 14;

/// Little-endian byte order mark.
const BYTE_ORDER_MARK: &[u8; 2] = b"II";

// =============================================================================
// GeoTiffWriter
// =============================================================================

/// A fully planned single-image GeoTIFF.
#[derive(Debug, Clone)]
pub struct GeoTiffWriter {
    geometry: ImageGeometry,
    ghost: GhostHeader,
    blocks: GeoBlocks,
    layout: FileLayout,
    tags: TagTable,
    ghost_consistent: bool,
}

impl GeoTiffWriter {
    /// Plan a file.
    ///
    /// Nothing is written; every error a layout can have surfaces here.
    ///
    /// # Errors
    /// - `GeoKey` if the georeference is malformed
    /// - `Layout` if the geometry is invalid or an offset overflows 32 bits
    /// - `Tag` if the tag table is inconsistent
    pub fn new(options: WriteOptions) -> Result<Self, WriterError> {
        let WriteOptions {
            geometry,
            georef,
            ghost,
        } = options;

        let blocks = georef.build()?;
        let ghost_consistent = ghost.warn_if_inconsistent().is_consistent();

        let sizes = BlockSizes {
            ghost_header: ghost.len() as u64,
            transformation: blocks.transformation_len(),
            geo_keys: blocks.key_directory_len(),
            geo_doubles: blocks.doubles_len(),
            geo_ascii: blocks.ascii_len(),
        };

        let layout = FileLayout::plan(geometry, NUM_TAGS, sizes)?;
        layout.verify()?;

        for region in layout.regions() {
            debug!(
                region = region.kind.name(),
                start = region.start,
                length = region.length,
                "planned region"
            );
        }

        let tags = build_tag_table(&layout, &blocks)?;
        if tags.encoded_size() != u64::from(layout.directory_size) {
            return Err(LayoutError::RegionMisplaced {
                region: RegionKind::Directory.name(),
                expected: u64::from(layout.directory_size),
                actual: tags.encoded_size(),
            }
            .into());
        }

        Ok(Self {
            geometry,
            ghost,
            blocks,
            layout,
            tags,
            ghost_consistent,
        })
    }

    pub fn layout(&self) -> &FileLayout {
        &self.layout
    }

    pub fn tag_table(&self) -> &TagTable {
        &self.tags
    }

    pub fn geometry(&self) -> &ImageGeometry {
        &self.geometry
    }

    /// Stream the file into `sink`, pulling tile payloads from `pixels`.
    ///
    /// The sink is flushed but not closed. On error the sink holds a
    /// partial file; discarding it is the caller's job.
    pub fn write_to<W, S>(&self, sink: &mut W, pixels: &mut S) -> Result<WriteSummary, WriterError>
    where
        W: Write + ?Sized,
        S: PixelSource + ?Sized,
    {
        let mut enc = LeEncoder::new(sink);
        let layout = &self.layout;

        // Header
        enc.write_bytes(BYTE_ORDER_MARK)?;
        enc.write_u16(VERSION_TIFF)?;
        enc.write_u32(layout.directory_offset)?;

        expect_region(&enc, RegionKind::GhostHeader, 8)?;
        enc.write_bytes(self.ghost.as_bytes())?;

        expect_region(&enc, RegionKind::Directory, layout.directory_offset)?;
        self.tags.encode(&mut enc)?;

        expect_region(&enc, RegionKind::TileOffsets, layout.tile_offsets_offset)?;
        enc.write_u32_slice(&layout.tile_offsets())?;

        expect_region(&enc, RegionKind::TileByteCounts, layout.tile_byte_counts_offset)?;
        enc.write_u32_slice(&layout.tile_byte_counts())?;

        expect_region(&enc, RegionKind::ModelTransformation, layout.transformation_offset)?;
        enc.write_f64_slice(&self.blocks.transformation)?;

        expect_region(&enc, RegionKind::GeoKeyDirectory, layout.geo_key_offset)?;
        enc.write_u16_slice(&self.blocks.key_directory)?;

        expect_region(&enc, RegionKind::GeoDoubleParams, layout.geo_double_offset)?;
        enc.write_f64_slice(&self.blocks.doubles)?;

        expect_region(&enc, RegionKind::GeoAsciiParams, layout.geo_ascii_offset)?;
        enc.write_bytes(&self.blocks.ascii)?;

        expect_region(&enc, RegionKind::TileData, layout.pixel_data_offset)?;
        let expected = layout.tile_byte_size as usize;
        for tile in 0..layout.num_tiles {
            let payload = pixels.next_tile_payload()?;
            if payload.len() != expected {
                return Err(TileError::SizeMismatch {
                    tile,
                    expected,
                    actual: payload.len(),
                }
                .into());
            }
            enc.write_bytes(&payload)?;
        }

        if enc.position() != layout.total_size {
            return Err(LayoutError::RegionMisplaced {
                region: "end_of_file",
                expected: layout.total_size,
                actual: enc.position(),
            }
            .into());
        }
        enc.flush()?;

        let summary = WriteSummary {
            total_bytes: enc.position(),
            num_tiles: layout.num_tiles,
            tile_byte_size: layout.tile_byte_size,
            directory_offset: layout.directory_offset,
            pixel_data_offset: layout.pixel_data_offset,
            ghost_header_consistent: self.ghost_consistent,
        };
        info!(
            bytes = summary.total_bytes,
            tiles = summary.num_tiles,
            directory = summary.directory_offset,
            pixel_data = summary.pixel_data_offset,
            "wrote GeoTIFF"
        );
        Ok(summary)
    }

    /// Write the file to `path`.
    ///
    /// A partially written file is removed if any step fails.
    pub fn write_file<S>(
        &self,
        path: impl AsRef<Path>,
        pixels: &mut S,
    ) -> Result<WriteSummary, WriterError>
    where
        S: PixelSource + ?Sized,
    {
        let mut sink = FileSink::create(path)?;
        let summary = self.write_to(&mut sink, pixels)?;
        sink.finish()?;
        Ok(summary)
    }

    /// Write the file into memory.
    pub fn to_bytes<S>(&self, pixels: &mut S) -> Result<(Bytes, WriteSummary), WriterError>
    where
        S: PixelSource + ?Sized,
    {
        // plan() bounds the total size to 32 bits
        let len = self.layout.total_size as usize;
        let mut buf = Vec::new();
        buf.try_reserve_exact(len)
            .map_err(|_| TileError::Allocation { bytes: len })?;

        let summary = self.write_to(&mut buf, pixels)?;
        Ok((Bytes::from(buf), summary))
    }
}

/// Fail if the encoder is not at the planned start of `region`.
fn expect_region<W: Write>(
    enc: &LeEncoder<W>,
    region: RegionKind,
    planned: u32,
) -> Result<(), LayoutError> {
    if enc.position() != u64::from(planned) {
        return Err(LayoutError::RegionMisplaced {
            region: region.name(),
            expected: u64::from(planned),
            actual: enc.position(),
        });
    }
    debug!(region = region.name(), offset = planned, "emitting region");
    Ok(())
}

// =============================================================================
// Tag Table
// =============================================================================

/// Entry for a block whose data was placed at `offset`.
///
/// Blocks small enough to fit the value field are stored inline instead,
/// using the first bytes of `encoded`.
fn block_entry(
    tag: TiffTag,
    field_type: FieldType,
    count: u32,
    offset: u32,
    encoded: &[u8],
) -> DirectoryEntry {
    if !field_type.fits_inline(count) {
        return DirectoryEntry::offset(tag, field_type, count, offset);
    }

    let mut raw = [0u8; 4];
    let used = encoded.len().min(4);
    raw[..used].copy_from_slice(&encoded[..used]);
    DirectoryEntry {
        tag: tag.as_u16(),
        field_type,
        count,
        value: EntryValue::Inline(u32::from_le_bytes(raw)),
    }
}

/// Bind every tag to the geometry or to a planned offset.
///
/// Tags are pushed in ascending ID order.
fn build_tag_table(layout: &FileLayout, blocks: &GeoBlocks) -> Result<TagTable, TagError> {
    let g = &layout.geometry;

    // Block lengths were bounded to 32 bits when the layout was planned
    let key_count = blocks.key_directory.len() as u32;
    let double_count = blocks.doubles.len() as u32;
    let ascii_count = blocks.ascii.len() as u32;

    let first_tile = layout.tile_offset(0).to_le_bytes();
    let tile_size = layout.tile_byte_size.to_le_bytes();
    let first_double = blocks
        .doubles
        .first()
        .map(|d| d.to_le_bytes().to_vec())
        .unwrap_or_default();

    let mut builder = TagTableBuilder::new();
    builder
        .push(DirectoryEntry::short_or_long(TiffTag::ImageWidth, g.width))
        .push(DirectoryEntry::short_or_long(TiffTag::ImageLength, g.height))
        .push(DirectoryEntry::short(TiffTag::BitsPerSample, g.bits_per_sample))
        .push(DirectoryEntry::short(
            TiffTag::Compression,
            Compression::None.as_u16(),
        ))
        .push(DirectoryEntry::short(
            TiffTag::PhotometricInterpretation,
            Photometric::MinIsBlack.as_u16(),
        ))
        .push(DirectoryEntry::short(
            TiffTag::SamplesPerPixel,
            g.samples_per_pixel,
        ))
        .push(DirectoryEntry::long(TiffTag::TileWidth, g.tile_width))
        .push(DirectoryEntry::long(TiffTag::TileLength, g.tile_height))
        .push(block_entry(
            TiffTag::TileOffsets,
            FieldType::Long,
            layout.num_tiles,
            layout.tile_offsets_offset,
            &first_tile,
        ))
        .push(block_entry(
            TiffTag::TileByteCounts,
            FieldType::Long,
            layout.num_tiles,
            layout.tile_byte_counts_offset,
            &tile_size,
        ))
        .push(block_entry(
            TiffTag::ModelTransformation,
            FieldType::Double,
            blocks.transformation.len() as u32,
            layout.transformation_offset,
            &[],
        ))
        .push(block_entry(
            TiffTag::GeoKeyDirectory,
            FieldType::Short,
            key_count,
            layout.geo_key_offset,
            &[],
        ))
        .push(block_entry(
            TiffTag::GeoDoubleParams,
            FieldType::Double,
            double_count,
            layout.geo_double_offset,
            &first_double,
        ))
        .push(block_entry(
            TiffTag::GeoAsciiParams,
            FieldType::Ascii,
            ascii_count,
            layout.geo_ascii_offset,
            &blocks.ascii,
        ));

    builder.finalize()
}

// =============================================================================
// Tests
// =============================================================================
