//! Layout integration tests.
//!
//! Tests verify:
//! - Every region of the reference file lands at its documented offset
//! - Directory pointers agree with the planned regions
//! - Dropping the ghost header moves the directory to offset 8

use ghost_geotiff::format::tiff::{FieldType, RegionKind, TiffTag};
use ghost_geotiff::GhostHeader;

use super::test_utils::{
    entry, read_directory, read_u16_le, read_u32_le, read_u32s, reference_writer, small_writer,
    write_gradient,
};

// =============================================================================
// Reference Layout
// =============================================================================

#[test]
fn test_reference_region_offsets() {
    let writer = reference_writer();
    let layout = writer.layout();

    assert_eq!(layout.region(RegionKind::GhostHeader).start, 8);
    assert_eq!(layout.region(RegionKind::GhostHeader).length, 182);
    assert_eq!(layout.directory_offset, 190);
    assert_eq!(layout.directory_size, 174);
    assert_eq!(layout.tile_offsets_offset, 364);
    assert_eq!(layout.tile_byte_counts_offset, 620);
    assert_eq!(layout.transformation_offset, 876);
    assert_eq!(layout.geo_key_offset, 1004);
    assert_eq!(layout.geo_double_offset, 1156);
    assert_eq!(layout.geo_ascii_offset, 1204);
    assert_eq!(layout.pixel_data_offset, 1350);
    assert_eq!(layout.total_size, 1_049_926);
}

#[test]
fn test_reference_file_size_matches_plan() {
    let writer = reference_writer();
    let (bytes, summary) = write_gradient(&writer);

    assert_eq!(bytes.len(), 1_049_926);
    assert_eq!(summary.total_bytes, 1_049_926);
    assert_eq!(summary.num_tiles, 64);
    assert_eq!(summary.tile_byte_size, 16384);
    assert!(!summary.ghost_header_consistent);
}

#[test]
fn test_regions_tile_the_file() {
    let writer = reference_writer();
    let regions = writer.layout().regions();

    assert_eq!(regions.first().unwrap().start, 0);
    for pair in regions.windows(2) {
        assert_eq!(pair[0].end(), pair[1].start, "{:?}", pair[1].kind);
    }
    assert_eq!(regions.last().unwrap().end(), writer.layout().total_size);
}

// =============================================================================
// Header and Directory
// =============================================================================

#[test]
fn test_header_bytes() {
    let (bytes, _) = write_gradient(&reference_writer());

    assert_eq!(&bytes[0..2], b"II");
    assert_eq!(read_u16_le(&bytes, 2), 42);
    assert_eq!(read_u32_le(&bytes, 4), 190);
    assert!(bytes[8..190].starts_with(b"GDAL_STRUCTURAL_METADATA_SIZE="));
}

#[test]
fn test_directory_entries_ascending() {
    let (bytes, _) = write_gradient(&reference_writer());
    let ifd = read_directory(&bytes);

    assert_eq!(ifd.offset, 190);
    assert_eq!(ifd.entries.len(), 14);
    assert_eq!(ifd.next_ifd_offset, 0);

    let ids: Vec<u16> = ifd.entries.iter().map(|e| e.tag_id).collect();
    assert_eq!(
        ids,
        vec![256, 257, 258, 259, 262, 277, 322, 323, 324, 325, 34264, 34735, 34736, 34737]
    );
}

#[test]
fn test_directory_pointers_match_regions() {
    let writer = reference_writer();
    let (bytes, _) = write_gradient(&writer);
    let ifd = read_directory(&bytes);
    let le = ghost_geotiff::ByteOrder::LittleEndian;

    let offsets = entry(&ifd, TiffTag::TileOffsets);
    assert_eq!(offsets.field_type, Some(FieldType::Long));
    assert_eq!(offsets.count, 64);
    assert_eq!(offsets.value_offset(le), 364);

    assert_eq!(entry(&ifd, TiffTag::TileByteCounts).value_offset(le), 620);

    let transform = entry(&ifd, TiffTag::ModelTransformation);
    assert_eq!(transform.field_type, Some(FieldType::Double));
    assert_eq!(transform.count, 16);
    assert_eq!(transform.value_offset(le), 876);

    let keys = entry(&ifd, TiffTag::GeoKeyDirectory);
    assert_eq!(keys.field_type, Some(FieldType::Short));
    assert_eq!(keys.count, 76);
    assert_eq!(keys.value_offset(le), 1004);

    let doubles = entry(&ifd, TiffTag::GeoDoubleParams);
    assert_eq!(doubles.count, 6);
    assert_eq!(doubles.value_offset(le), 1156);

    let ascii = entry(&ifd, TiffTag::GeoAsciiParams);
    assert_eq!(ascii.field_type, Some(FieldType::Ascii));
    assert_eq!(ascii.count, 146);
    assert_eq!(ascii.value_offset(le), 1204);
}

#[test]
fn test_tile_index_arrays() {
    let (bytes, _) = write_gradient(&reference_writer());
    let ifd = read_directory(&bytes);

    let offsets = read_u32s(&bytes, &ifd, TiffTag::TileOffsets);
    let counts = read_u32s(&bytes, &ifd, TiffTag::TileByteCounts);

    assert_eq!(offsets.len(), 64);
    assert_eq!(offsets[0], 1350);
    assert_eq!(offsets[1], 1350 + 16384);
    assert_eq!(offsets[63], 1350 + 63 * 16384);
    assert!(counts.iter().all(|&c| c == 16384));
}

#[test]
fn test_scalar_tags() {
    let (bytes, _) = write_gradient(&reference_writer());
    let ifd = read_directory(&bytes);
    let le = ghost_geotiff::ByteOrder::LittleEndian;

    let value = |tag| entry(&ifd, tag).inline_u32(le).unwrap();
    assert_eq!(value(TiffTag::ImageWidth), 1024);
    assert_eq!(value(TiffTag::ImageLength), 1024);
    assert_eq!(value(TiffTag::BitsPerSample), 8);
    assert_eq!(value(TiffTag::Compression), 1);
    assert_eq!(value(TiffTag::PhotometricInterpretation), 1);
    assert_eq!(value(TiffTag::SamplesPerPixel), 1);
    assert_eq!(value(TiffTag::TileWidth), 128);
    assert_eq!(value(TiffTag::TileLength), 128);
}

// =============================================================================
// Ghost Header Variants
// =============================================================================

#[test]
fn test_no_ghost_header_starts_directory_at_eight() {
    let writer = small_writer(GhostHeader::none());
    let (bytes, summary) = write_gradient(&writer);

    assert_eq!(read_u32_le(&bytes, 4), 8);
    assert_eq!(summary.directory_offset, 8);
    assert!(summary.ghost_header_consistent);
    assert_eq!(read_directory(&bytes).offset, 8);
}

#[test]
fn test_ghost_header_shifts_everything_by_its_length() {
    let with = small_writer(GhostHeader::gdal_default());
    let without = small_writer(GhostHeader::none());

    let shift = with.layout().pixel_data_offset - without.layout().pixel_data_offset;
    assert_eq!(shift, 182);
    assert_eq!(with.layout().total_size - without.layout().total_size, 182);
}
