//! Writer integration tests.
//!
//! Tests verify:
//! - Files written to disk match the in-memory output
//! - Failed writes leave no file behind
//! - Seeded and deterministic sources produce identical files
//! - GeoTIFF blocks hold the configured georeference

use ghost_geotiff::format::tiff::{ByteOrder, TiffTag, ValueReader};
use ghost_geotiff::tile::{ConstantPixelSource, GradientPixelSource, RandomPixelSource};
use ghost_geotiff::writer::{GeoTiffWriter, WriteOptions};
use ghost_geotiff::{
    GeoKeyDirectoryBuilder, GeoReference, GhostHeader, ImageGeometry, WriterError,
};

use super::test_utils::{
    entry, read_directory, reference_writer, small_geometry, small_writer, write_gradient,
    FailingPixelSource,
};

// =============================================================================
// File Output
// =============================================================================

#[test]
fn test_write_file_matches_memory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("moon.tif");
    let writer = reference_writer();

    let mut pixels = GradientPixelSource::new(writer.geometry());
    let summary = writer.write_file(&path, &mut pixels).unwrap();

    let on_disk = std::fs::read(&path).unwrap();
    let (in_memory, _) = write_gradient(&writer);

    assert_eq!(summary.total_bytes, 1_049_926);
    assert_eq!(on_disk.len(), 1_049_926);
    assert_eq!(on_disk, in_memory.to_vec());
}

#[test]
fn test_failed_write_removes_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("partial.tif");
    let writer = small_writer(GhostHeader::gdal_default());

    let mut pixels = FailingPixelSource::new(writer.geometry(), 3);
    let result = writer.write_file(&path, &mut pixels);

    assert!(matches!(result, Err(WriterError::Tile(_))));
    assert!(!path.exists());
}

#[test]
fn test_write_file_bad_directory() {
    let writer = small_writer(GhostHeader::none());
    let mut pixels = GradientPixelSource::new(writer.geometry());

    let result = writer.write_file("/nonexistent/dir/out.tif", &mut pixels);
    assert!(matches!(result, Err(WriterError::Io(_))));
}

// =============================================================================
// Determinism
// =============================================================================

#[test]
fn test_seeded_random_is_reproducible() {
    let writer = small_writer(GhostHeader::gdal_default());
    let write = |seed| {
        let mut pixels = RandomPixelSource::new(writer.geometry(), Some(seed));
        writer.to_bytes(&mut pixels).unwrap().0
    };

    let a = write(42);
    let b = write(42);
    let c = write(43);

    assert_eq!(a, b);
    assert_ne!(a, c);

    // Only the pixel data depends on the seed
    let pixel_start = writer.layout().pixel_data_offset as usize;
    assert_eq!(a[..pixel_start], c[..pixel_start]);
}

#[test]
fn test_writer_is_reusable() {
    let writer = small_writer(GhostHeader::gdal_default());
    let (first, _) = write_gradient(&writer);
    let (second, _) = write_gradient(&writer);
    assert_eq!(first, second);
}

#[test]
fn test_gradient_pixels_in_first_tile() {
    let writer = small_writer(GhostHeader::none());
    let (bytes, _) = write_gradient(&writer);
    let start = writer.layout().pixel_data_offset as usize;

    // Row 0 of tile 0 is 0..16, row 1 starts at 1
    assert_eq!(&bytes[start..start + 4], &[0, 1, 2, 3]);
    assert_eq!(bytes[start + 16], 1);

    // Tile 1 starts at x = 16
    assert_eq!(bytes[start + 256], 16);
}

#[test]
fn test_constant_pixels() {
    let writer = small_writer(GhostHeader::none());
    let mut pixels = ConstantPixelSource::new(writer.geometry(), 0x5A);
    let (bytes, _) = writer.to_bytes(&mut pixels).unwrap();

    let start = writer.layout().pixel_data_offset as usize;
    assert!(bytes[start..].iter().all(|&b| b == 0x5A));
}

// =============================================================================
// Geometry Variants
// =============================================================================

#[test]
fn test_sixteen_bit_samples() {
    let geometry = ImageGeometry {
        bits_per_sample: 16,
        ..small_geometry()
    };
    let writer = GeoTiffWriter::new(WriteOptions {
        geometry,
        ..Default::default()
    })
    .unwrap();

    let (bytes, summary) = write_gradient(&writer);
    assert_eq!(summary.tile_byte_size, 512);
    assert_eq!(summary.num_tiles, 8);

    let ifd = read_directory(&bytes);
    let bits = entry(&ifd, TiffTag::BitsPerSample)
        .inline_u32(ByteOrder::LittleEndian)
        .unwrap();
    assert_eq!(bits, 16);
}

#[test]
fn test_single_tile_image() {
    let geometry = ImageGeometry {
        width: 16,
        height: 16,
        ..small_geometry()
    };
    let writer = GeoTiffWriter::new(WriteOptions {
        geometry,
        ghost: GhostHeader::none(),
        ..Default::default()
    })
    .unwrap();

    let (bytes, summary) = write_gradient(&writer);
    assert_eq!(summary.num_tiles, 1);
    assert_eq!(bytes.len() as u64, writer.layout().total_size);

    // One LONG fits in the entry itself
    let ifd = read_directory(&bytes);
    let offsets = entry(&ifd, TiffTag::TileOffsets);
    assert!(offsets.is_inline);
    assert_eq!(
        offsets.value_offset(ByteOrder::LittleEndian),
        u64::from(writer.layout().pixel_data_offset)
    );
}

#[test]
fn test_invalid_geometry_rejected() {
    let geometry = ImageGeometry {
        width: 1000,
        ..ImageGeometry::default()
    };
    let result = GeoTiffWriter::new(WriteOptions {
        geometry,
        ..Default::default()
    });
    assert!(matches!(result, Err(WriterError::Layout(_))));
}

#[test]
fn test_offset_overflow_rejected() {
    let geometry = ImageGeometry {
        width: 65536,
        height: 65536,
        tile_width: 256,
        tile_height: 256,
        ..ImageGeometry::default()
    };
    let result = GeoTiffWriter::new(WriteOptions {
        geometry,
        ..Default::default()
    });
    assert!(matches!(result, Err(WriterError::Layout(_))));
}

// =============================================================================
// Georeference Blocks
// =============================================================================

#[test]
fn test_reference_geo_blocks() {
    let (bytes, _) = write_gradient(&reference_writer());
    let ifd = read_directory(&bytes);
    let reader = ValueReader::new(&bytes, ByteOrder::LittleEndian);
    let georef = GeoReference::moon_2000();

    let transform = reader
        .read_f64_array(entry(&ifd, TiffTag::ModelTransformation))
        .unwrap();
    assert_eq!(transform, georef.transformation);

    let keys = reader
        .read_u16_array(entry(&ifd, TiffTag::GeoKeyDirectory))
        .unwrap();
    assert_eq!(&keys[..4], &[1, 1, 0, 18]);
    assert_eq!(keys.len(), 76);

    // GeogCitation keeps its stored count
    let citation = keys.chunks_exact(4).find(|k| k[0] == 3073).unwrap();
    assert_eq!(citation, &[3073, 34737, 20, 117]);

    let doubles = reader
        .read_f64_array(entry(&ifd, TiffTag::GeoDoubleParams))
        .unwrap();
    assert_eq!(doubles, vec![1737400.0, 1737400.0, 0.0, 0.0, 0.0, 0.0]);

    let ascii = reader
        .read_string(entry(&ifd, TiffTag::GeoAsciiParams))
        .unwrap();
    assert_eq!(ascii.len(), 146);
    assert_eq!(ascii, georef.ascii);
}

#[test]
fn test_custom_georeference() {
    let georef = GeoKeyDirectoryBuilder::new()
        .short(1024, 2)
        .short(1025, 1)
        .ascii(1026, "Mars equirectangular")
        .double(2057, 3396190.0)
        .build(vec![
            1.0, 0.0, 0.0, 0.0, //
            0.0, -1.0, 0.0, 0.0, //
            0.0, 0.0, 0.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ])
        .unwrap();

    let writer = GeoTiffWriter::new(WriteOptions {
        geometry: small_geometry(),
        georef: georef.clone(),
        ghost: GhostHeader::none(),
    })
    .unwrap();
    let (bytes, _) = write_gradient(&writer);

    let ifd = read_directory(&bytes);
    let reader = ValueReader::new(&bytes, ByteOrder::LittleEndian);

    let keys = reader
        .read_u16_array(entry(&ifd, TiffTag::GeoKeyDirectory))
        .unwrap();
    assert_eq!(&keys[..4], &[1, 1, 0, 4]);
    assert_eq!(entry(&ifd, TiffTag::GeoDoubleParams).count, 1);

    let ascii = reader
        .read_string(entry(&ifd, TiffTag::GeoAsciiParams))
        .unwrap();
    assert_eq!(ascii, "Mars equirectangular|");
}

#[test]
fn test_bad_georeference_rejected() {
    let mut georef = GeoReference::moon_2000();
    georef.transformation.pop();

    let result = GeoTiffWriter::new(WriteOptions {
        georef,
        ..Default::default()
    });
    assert!(matches!(result, Err(WriterError::GeoKey(_))));
}
