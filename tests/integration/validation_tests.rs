//! Read-back validation tests.
//!
//! Tests verify:
//! - Written files pass validation against their own layout
//! - Corrupting any part of the container is reported
//! - The inconsistent ghost header is a warning, not an error

use ghost_geotiff::format::tiff::{validate_container, ValidationError, ValidationResult};
use ghost_geotiff::{FileLayout, GhostHeader, TiffError};

use super::test_utils::{reference_writer, small_writer, write_gradient};

/// Write the reference file, apply `corrupt`, and validate.
fn validate_corrupted(corrupt: impl FnOnce(&mut Vec<u8>)) -> ValidationResult {
    let writer = reference_writer();
    let (bytes, _) = write_gradient(&writer);
    let mut bytes = bytes.to_vec();
    corrupt(&mut bytes);
    validate_container(&bytes, writer.layout())
}

fn has_error(result: &ValidationResult, pred: impl Fn(&ValidationError) -> bool) -> bool {
    result.errors.iter().any(pred)
}

// =============================================================================
// Valid Files
// =============================================================================

#[test]
fn test_reference_file_validates() {
    let result = validate_corrupted(|_| {});

    assert!(result.is_valid, "unexpected errors: {:?}", result.errors);
    assert!(result.errors.is_empty());
    assert_eq!(result.warnings.len(), 1);
    assert!(result.warnings[0].contains("140"));
}

#[test]
fn test_no_ghost_header_validates_cleanly() {
    let writer = small_writer(GhostHeader::none());
    let (bytes, _) = write_gradient(&writer);
    let result = validate_container(&bytes, writer.layout());

    assert!(result.is_valid);
    assert!(result.warnings.is_empty());
    assert!(result.into_result().is_ok());
}

#[test]
fn test_consistent_custom_ghost_header() {
    let ghost = GhostHeader::from_text("GDAL_STRUCTURAL_METADATA_SIZE=000010 bytes\n0123456789");
    let writer = small_writer(ghost);
    let (bytes, summary) = write_gradient(&writer);

    assert!(summary.ghost_header_consistent);
    let result = validate_container(&bytes, writer.layout());
    assert!(result.is_valid);
    assert!(result.warnings.is_empty());
}

// =============================================================================
// Corrupted Files
// =============================================================================

#[test]
fn test_truncated_file() {
    let result = validate_corrupted(|b| b.truncate(b.len() - 100));
    assert!(!result.is_valid);
    assert!(has_error(&result, |e| matches!(
        e,
        ValidationError::FileSize {
            expected: 1_049_926,
            ..
        }
    )));
}

#[test]
fn test_bad_magic() {
    let result = validate_corrupted(|b| b[0] = b'X');
    assert!(has_error(&result, |e| matches!(
        e,
        ValidationError::Unreadable(TiffError::InvalidMagic(_))
    )));
}

#[test]
fn test_wrong_directory_pointer() {
    let result = validate_corrupted(|b| b[4..8].copy_from_slice(&8u32.to_le_bytes()));
    assert!(has_error(&result, |e| matches!(
        e,
        ValidationError::DirectoryOffset {
            expected: 190,
            actual: 8
        }
    )));
}

#[test]
fn test_nonzero_next_directory() {
    // Directory at 190: 2-byte count, 14 entries of 12 bytes, then the pointer
    let next_at = 190 + 2 + 14 * 12;
    let result = validate_corrupted(|b| b[next_at..next_at + 4].copy_from_slice(&1u32.to_le_bytes()));
    assert!(has_error(&result, |e| matches!(
        e,
        ValidationError::NextIfdNonZero(1)
    )));
}

#[test]
fn test_unsorted_entries() {
    // Swap ImageWidth and ImageLength
    let result = validate_corrupted(|b| {
        let (first, second) = b[192..216].split_at_mut(12);
        first.swap_with_slice(second);
    });
    assert!(has_error(&result, |e| matches!(
        e,
        ValidationError::UnsortedTags {
            previous: 257,
            current: 256
        }
    )));
}

#[test]
fn test_wrong_tile_offset() {
    let at = 364 + 5 * 4;
    let result = validate_corrupted(|b| b[at..at + 4].copy_from_slice(&7u32.to_le_bytes()));
    assert!(has_error(&result, |e| matches!(
        e,
        ValidationError::TileOffset {
            tile: 5,
            actual: 7,
            ..
        }
    )));
}

#[test]
fn test_wrong_tile_byte_count() {
    let at = 620;
    let result = validate_corrupted(|b| b[at..at + 4].copy_from_slice(&1u32.to_le_bytes()));
    assert!(has_error(&result, |e| matches!(
        e,
        ValidationError::TileByteCount {
            tile: 0,
            expected: 16384,
            actual: 1
        }
    )));
}

#[test]
fn test_geokey_record_count() {
    // Fourth short of the key directory header
    let at = 1004 + 6;
    let result = validate_corrupted(|b| b[at..at + 2].copy_from_slice(&17u16.to_le_bytes()));
    assert!(has_error(&result, |e| matches!(
        e,
        ValidationError::GeoKeyHeader { records: 18, .. }
    )));
}

#[test]
fn test_geokeys_out_of_order() {
    // Key ID of the second record
    let at = 1004 + 8 + 8;
    let result = validate_corrupted(|b| b[at..at + 2].copy_from_slice(&1000u16.to_le_bytes()));
    assert!(has_error(&result, |e| matches!(
        e,
        ValidationError::GeoKeys(_)
    )));
}

#[test]
fn test_layout_mismatch() {
    // A file validated against another file's plan
    let small = small_writer(GhostHeader::none());
    let (bytes, _) = write_gradient(&small);
    let reference: FileLayout = reference_writer().layout().clone();

    let result = validate_container(&bytes, &reference);
    assert!(!result.is_valid);
    assert!(result.into_result().is_err());
}
