//! Read-back validation of written containers.
//!
//! A written file is parsed again and every structural field is compared
//! with the [`FileLayout`] it was planned from. This is what `--verify` runs
//! and what the round-trip tests rely on.
//!
//! # Checks
//!
//! - File size equals the planned total
//! - The header points at the planned directory offset
//! - Tags are strictly increasing and the next-directory pointer is zero
//! - Scalar tags match the geometry
//! - Every out-of-line entry points at its planned region with the planned count
//! - `tile_offset[i] = pixel_data_start + i * tile_byte_size`
//! - Every tile byte count equals `tile_byte_size`
//! - The GeoKey directory references stay inside the parameter blocks
//!
//! A ghost header whose declared size disagrees with its contents is a
//! warning, not an error.

use thiserror::Error;

use crate::error::{GeoKeyError, TiffError};
use crate::format::geokey::{GeoKeyEntry, GeoReference};
use crate::format::ghost::GhostHeader;

use super::layout::FileLayout;
use super::parser::{ByteOrder, Ifd, TiffHeader};
use super::tags::{Compression, FieldType, Photometric, TiffTag};
use super::values::ValueReader;

// =============================================================================
// Validation Result
// =============================================================================

/// Result of validating a written file against its layout.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether the file matches the layout
    pub is_valid: bool,

    /// List of validation errors (empty if valid)
    pub errors: Vec<ValidationError>,

    /// List of validation warnings (non-fatal issues)
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Create a successful validation result.
    pub fn ok() -> Self {
        ValidationResult {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Create a failed validation result with a single error.
    pub fn error(error: ValidationError) -> Self {
        ValidationResult {
            is_valid: false,
            errors: vec![error],
            warnings: Vec::new(),
        }
    }

    /// Add an error to the result.
    pub fn add_error(&mut self, error: ValidationError) {
        self.is_valid = false;
        self.errors.push(error);
    }

    /// Add a warning to the result.
    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    /// Convert to a TiffError if invalid.
    ///
    /// Returns the first error as a TiffError, or Ok(()) if valid.
    pub fn into_result(self) -> Result<(), TiffError> {
        match self.errors.into_iter().next() {
            Some(error) => Err(error.into()),
            None => Ok(()),
        }
    }
}

/// A specific validation error.
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    /// The file could not be parsed at all
    #[error(transparent)]
    Unreadable(#[from] TiffError),

    #[error("file is {actual} bytes, layout planned {expected}")]
    FileSize { expected: u64, actual: u64 },

    #[error("directory at offset {actual}, layout planned {expected}")]
    DirectoryOffset { expected: u64, actual: u64 },

    #[error("tags not strictly increasing: {current} follows {previous}")]
    UnsortedTags { previous: u16, current: u16 },

    #[error("directory has {actual} entries, expected {expected}")]
    EntryCount { expected: usize, actual: usize },

    #[error("next-directory pointer is {0}, expected 0")]
    NextIfdNonZero(u64),

    #[error("missing required tag: {0}")]
    MissingTag(&'static str),

    /// A scalar tag holds the wrong value
    #[error("{tag} is {actual}, expected {expected}")]
    UnexpectedValue {
        tag: &'static str,
        expected: u32,
        actual: u32,
    },

    /// An entry has the wrong field type
    #[error("{tag} has field type {actual:?}, expected {expected:?}")]
    FieldType {
        tag: &'static str,
        expected: FieldType,
        actual: Option<FieldType>,
    },

    /// An out-of-line entry does not point at its planned region
    #[error("{tag} points at offset {actual}, layout planned {expected}")]
    RegionOffset {
        tag: &'static str,
        expected: u64,
        actual: u64,
    },

    #[error("{tag} count is {actual}, expected {expected}")]
    CountMismatch {
        tag: &'static str,
        expected: u32,
        actual: u32,
    },

    #[error("tile {tile} offset is {actual}, expected {expected}")]
    TileOffset { tile: u32, expected: u32, actual: u32 },

    #[error("tile {tile} byte count is {actual}, expected {expected}")]
    TileByteCount { tile: u32, expected: u32, actual: u32 },

    #[error("GeoKey directory header {actual:?} does not describe {records} records")]
    GeoKeyHeader { actual: Vec<u16>, records: usize },

    #[error(transparent)]
    GeoKeys(#[from] GeoKeyError),
}

impl From<ValidationError> for TiffError {
    fn from(error: ValidationError) -> Self {
        match error {
            ValidationError::Unreadable(e) => e,
            ValidationError::MissingTag(tag) => TiffError::MissingTag(tag),
            other => TiffError::LayoutMismatch(other.to_string()),
        }
    }
}

// =============================================================================
// Container Validation
// =============================================================================

/// Validate a complete file held in memory against its planned layout.
pub fn validate_container(file: &[u8], layout: &FileLayout) -> ValidationResult {
    let mut result = ValidationResult::ok();
    let file_size = file.len() as u64;

    if file_size != layout.total_size {
        result.add_error(ValidationError::FileSize {
            expected: layout.total_size,
            actual: file_size,
        });
    }

    let header = match TiffHeader::parse(file, file_size) {
        Ok(header) => header,
        Err(e) => {
            result.add_error(e.into());
            return result;
        }
    };

    if header.byte_order != ByteOrder::LittleEndian {
        result.add_warning("file is big-endian; writer output is little-endian".to_string());
    }

    if header.first_ifd_offset != u64::from(layout.directory_offset) {
        result.add_error(ValidationError::DirectoryOffset {
            expected: u64::from(layout.directory_offset),
            actual: header.first_ifd_offset,
        });
    }

    check_ghost_header(&mut result, file, header.first_ifd_offset);

    let ifd = match Ifd::parse(file, header.first_ifd_offset, header.byte_order) {
        Ok(ifd) => ifd,
        Err(e) => {
            result.add_error(e.into());
            return result;
        }
    };

    check_directory(&mut result, &ifd, layout);

    let reader = ValueReader::new(file, header.byte_order);
    check_scalars(&mut result, &ifd, &reader, layout);
    check_tile_index(&mut result, &ifd, &reader, layout);
    check_georeference(&mut result, &ifd, &reader, layout);

    result
}

/// Inspect the bytes between the TIFF header and the directory.
fn check_ghost_header(result: &mut ValidationResult, file: &[u8], directory_offset: u64) {
    let end = (directory_offset as usize).min(file.len());
    if end <= 8 {
        return;
    }

    let ghost = GhostHeader::from_text(String::from_utf8_lossy(&file[8..end]));
    let inspection = ghost.inspect();
    if let (false, Some(declared)) = (inspection.is_consistent(), inspection.declared) {
        result.add_warning(format!(
            "ghost header declares {} bytes but {} follow its first line",
            declared, inspection.actual
        ));
    }
}

fn check_directory(result: &mut ValidationResult, ifd: &Ifd, layout: &FileLayout) {
    if ifd.next_ifd_offset != 0 {
        result.add_error(ValidationError::NextIfdNonZero(ifd.next_ifd_offset));
    }

    if ifd.entries.len() != usize::from(layout.num_tags) {
        result.add_error(ValidationError::EntryCount {
            expected: usize::from(layout.num_tags),
            actual: ifd.entries.len(),
        });
    }

    for pair in ifd.entries.windows(2) {
        if pair[1].tag_id <= pair[0].tag_id {
            result.add_error(ValidationError::UnsortedTags {
                previous: pair[0].tag_id,
                current: pair[1].tag_id,
            });
        }
    }
}

fn check_scalars(
    result: &mut ValidationResult,
    ifd: &Ifd,
    reader: &ValueReader<'_>,
    layout: &FileLayout,
) {
    let geometry = &layout.geometry;
    let expected = [
        (TiffTag::ImageWidth, geometry.width),
        (TiffTag::ImageLength, geometry.height),
        (TiffTag::BitsPerSample, u32::from(geometry.bits_per_sample)),
        (TiffTag::Compression, u32::from(Compression::None.as_u16())),
        (
            TiffTag::PhotometricInterpretation,
            u32::from(Photometric::MinIsBlack.as_u16()),
        ),
        (
            TiffTag::SamplesPerPixel,
            u32::from(geometry.samples_per_pixel),
        ),
        (TiffTag::TileWidth, geometry.tile_width),
        (TiffTag::TileLength, geometry.tile_height),
    ];

    for (tag, expected) in expected {
        let Some(entry) = ifd.get(tag) else {
            result.add_error(ValidationError::MissingTag(tag.name()));
            continue;
        };
        match reader.read_u32(entry) {
            Ok(actual) if actual == expected => {}
            Ok(actual) => result.add_error(ValidationError::UnexpectedValue {
                tag: tag.name(),
                expected,
                actual,
            }),
            Err(e) => result.add_error(e.into()),
        }
    }
}

/// Check that an entry has the expected type and count and, when stored
/// out of line, points at `planned`.
///
/// Returns false if the entry is missing or has the wrong type.
fn check_entry(
    result: &mut ValidationResult,
    ifd: &Ifd,
    byte_order: ByteOrder,
    tag: TiffTag,
    field_type: FieldType,
    count: u32,
    planned: u32,
) -> bool {
    let Some(entry) = ifd.get(tag) else {
        result.add_error(ValidationError::MissingTag(tag.name()));
        return false;
    };

    if entry.field_type != Some(field_type) {
        result.add_error(ValidationError::FieldType {
            tag: tag.name(),
            expected: field_type,
            actual: entry.field_type,
        });
        return false;
    }

    if entry.count != count {
        result.add_error(ValidationError::CountMismatch {
            tag: tag.name(),
            expected: count,
            actual: entry.count,
        });
    }

    if !entry.is_inline && entry.value_offset(byte_order) != u64::from(planned) {
        result.add_error(ValidationError::RegionOffset {
            tag: tag.name(),
            expected: u64::from(planned),
            actual: entry.value_offset(byte_order),
        });
    }
    true
}

fn check_tile_index(
    result: &mut ValidationResult,
    ifd: &Ifd,
    reader: &ValueReader<'_>,
    layout: &FileLayout,
) {
    let order = reader.byte_order();

    if check_entry(
        result,
        ifd,
        order,
        TiffTag::TileOffsets,
        FieldType::Long,
        layout.num_tiles,
        layout.tile_offsets_offset,
    ) {
        if let Some(entry) = ifd.get(TiffTag::TileOffsets) {
            match reader.read_u32_array(entry) {
                Ok(offsets) => {
                    for (tile, &actual) in (0u32..).zip(offsets.iter()) {
                        let expected = layout.tile_offset(tile);
                        if actual != expected {
                            result.add_error(ValidationError::TileOffset {
                                tile,
                                expected,
                                actual,
                            });
                        }
                    }
                }
                Err(e) => result.add_error(e.into()),
            }
        }
    }

    if check_entry(
        result,
        ifd,
        order,
        TiffTag::TileByteCounts,
        FieldType::Long,
        layout.num_tiles,
        layout.tile_byte_counts_offset,
    ) {
        if let Some(entry) = ifd.get(TiffTag::TileByteCounts) {
            match reader.read_u32_array(entry) {
                Ok(counts) => {
                    for (tile, &actual) in (0u32..).zip(counts.iter()) {
                        if actual != layout.tile_byte_size {
                            result.add_error(ValidationError::TileByteCount {
                                tile,
                                expected: layout.tile_byte_size,
                                actual,
                            });
                        }
                    }
                }
                Err(e) => result.add_error(e.into()),
            }
        }
    }
}

fn check_georeference(
    result: &mut ValidationResult,
    ifd: &Ifd,
    reader: &ValueReader<'_>,
    layout: &FileLayout,
) {
    let order = reader.byte_order();
    let sizes = &layout.sizes;

    let transformation_ok = check_entry(
        result,
        ifd,
        order,
        TiffTag::ModelTransformation,
        FieldType::Double,
        (sizes.transformation / 8) as u32,
        layout.transformation_offset,
    );
    let keys_ok = check_entry(
        result,
        ifd,
        order,
        TiffTag::GeoKeyDirectory,
        FieldType::Short,
        (sizes.geo_keys / 2) as u32,
        layout.geo_key_offset,
    );
    let doubles_ok = check_entry(
        result,
        ifd,
        order,
        TiffTag::GeoDoubleParams,
        FieldType::Double,
        (sizes.geo_doubles / 8) as u32,
        layout.geo_double_offset,
    );
    let ascii_ok = check_entry(
        result,
        ifd,
        order,
        TiffTag::GeoAsciiParams,
        FieldType::Ascii,
        sizes.geo_ascii as u32,
        layout.geo_ascii_offset,
    );

    if !(transformation_ok && keys_ok && doubles_ok && ascii_ok) {
        return;
    }

    match read_georeference(ifd, reader) {
        Ok(Some(georef)) => {
            if let Err(e) = georef.build() {
                result.add_error(e.into());
            }
        }
        Ok(None) => {}
        Err(e) => result.add_error(e),
    }
}

/// Rebuild a GeoReference from the four georeferencing tags.
///
/// Returns None if any of the tags is absent.
fn read_georeference(
    ifd: &Ifd,
    reader: &ValueReader<'_>,
) -> Result<Option<GeoReference>, ValidationError> {
    let (Some(transformation), Some(keys), Some(doubles), Some(ascii)) = (
        ifd.get(TiffTag::ModelTransformation),
        ifd.get(TiffTag::GeoKeyDirectory),
        ifd.get(TiffTag::GeoDoubleParams),
        ifd.get(TiffTag::GeoAsciiParams),
    ) else {
        return Ok(None);
    };

    let directory = reader.read_u16_array(keys)?;
    let records = directory.len().saturating_sub(4) / 4;
    if directory.len() < 4
        || directory.len() % 4 != 0
        || usize::from(directory[3]) != records
    {
        return Err(ValidationError::GeoKeyHeader {
            actual: directory.iter().take(4).copied().collect(),
            records,
        });
    }

    let keys = directory[4..]
        .chunks_exact(4)
        .map(|r| GeoKeyEntry {
            key_id: r[0],
            location: r[1],
            count: r[2],
            value_or_offset: r[3],
        })
        .collect();

    Ok(Some(GeoReference {
        transformation: reader.read_f64_array(transformation)?,
        keys,
        doubles: reader.read_f64_array(doubles)?,
        ascii: reader.read_string(ascii)?,
    }))
}

// =============================================================================
// Tests
// =============================================================================
