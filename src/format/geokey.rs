//! GeoTIFF georeferencing blocks.
//!
//! Georeferencing is carried by four tags:
//!
//! - `ModelTransformation` (34264): a 4x4 raster-to-model matrix, 16 doubles
//! - `GeoKeyDirectory` (34735): a header `(1, 1, 0, N)` followed by N
//!   four-short key records
//! - `GeoDoubleParams` (34736): doubles referenced by index from the keys
//! - `GeoAsciiParams` (34737): `|`-separated strings referenced by byte
//!   offset and count from the keys
//!
//! A key record is `(key_id, location, count, value_or_offset)`. Location 0
//! means the value is the last field itself; otherwise location names the
//! parameter tag the value lives in and the last field is an index into it.

use serde::{Deserialize, Serialize};

use crate::error::GeoKeyError;

use super::tiff::TiffTag;

/// KeyDirectoryVersion, KeyRevision and MinorRevision of the header record.
pub const KEY_DIRECTORY_HEADER: [u16; 3] = [1, 1, 0];

/// Location value for keys stored inline in the directory.
pub const LOCATION_INLINE: u16 = 0;

/// Location value for keys stored in the double parameter block.
pub const LOCATION_DOUBLE: u16 = TiffTag::GeoDoubleParams.as_u16();

/// Location value for keys stored in the ASCII parameter block.
pub const LOCATION_ASCII: u16 = TiffTag::GeoAsciiParams.as_u16();

/// Number of values in a ModelTransformation matrix.
pub const TRANSFORMATION_LEN: usize = 16;

/// Separator terminating each string in the ASCII parameter block.
pub const ASCII_SEPARATOR: char = '|';

// =============================================================================
// GeoKeyEntry
// =============================================================================

/// One key record of the GeoKey directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoKeyEntry {
    pub key_id: u16,
    pub location: u16,
    pub count: u16,
    pub value_or_offset: u16,
}

impl GeoKeyEntry {
    /// A key whose SHORT value is stored in the record itself.
    pub const fn inline(key_id: u16, value: u16) -> Self {
        Self {
            key_id,
            location: LOCATION_INLINE,
            count: 1,
            value_or_offset: value,
        }
    }

    /// A key referencing `count` doubles starting at `index`.
    pub const fn double(key_id: u16, index: u16, count: u16) -> Self {
        Self {
            key_id,
            location: LOCATION_DOUBLE,
            count,
            value_or_offset: index,
        }
    }

    /// A key referencing `count` ASCII bytes starting at `offset`.
    pub const fn ascii(key_id: u16, offset: u16, count: u16) -> Self {
        Self {
            key_id,
            location: LOCATION_ASCII,
            count,
            value_or_offset: offset,
        }
    }

    /// The record as written into the directory.
    #[inline]
    pub const fn to_shorts(self) -> [u16; 4] {
        [self.key_id, self.location, self.count, self.value_or_offset]
    }

    /// Check the record against the parameter blocks it references.
    fn check_references(&self, doubles: usize, ascii: usize) -> Result<(), GeoKeyError> {
        let end = usize::from(self.value_or_offset) + usize::from(self.count);
        match self.location {
            LOCATION_INLINE => Ok(()),
            LOCATION_DOUBLE if end <= doubles => Ok(()),
            LOCATION_DOUBLE => Err(GeoKeyError::DoubleIndexOutOfRange {
                key: self.key_id,
                index: self.value_or_offset,
                len: doubles,
            }),
            LOCATION_ASCII if end <= ascii => Ok(()),
            LOCATION_ASCII => Err(GeoKeyError::AsciiRangeOutOfBounds {
                key: self.key_id,
                offset: self.value_or_offset,
                count: self.count,
                len: ascii,
            }),
            location => Err(GeoKeyError::UnknownLocation {
                key: self.key_id,
                location,
            }),
        }
    }
}

// =============================================================================
// GeoReference
// =============================================================================

/// Everything needed to georeference the raster.
///
/// This is the form accepted from configuration files; [`GeoReference::build`]
/// validates it into encodable [`GeoBlocks`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoReference {
    /// Row-major 4x4 raster-to-model matrix
    pub transformation: Vec<f64>,

    /// Key records, ascending by key ID
    pub keys: Vec<GeoKeyEntry>,

    /// GeoDoubleParams contents
    pub doubles: Vec<f64>,

    /// GeoAsciiParams contents, without a NUL terminator
    pub ascii: String,
}

impl Default for GeoReference {
    fn default() -> Self {
        Self::moon_2000()
    }
}

impl GeoReference {
    /// Lunar simple-cylindrical projection on the Moon 2000 sphere.
    ///
    /// The key table is kept exactly as the reference product writes it,
    /// including ProjectedCSTypeGeoKey citation count 20 at offset 117.
    pub fn moon_2000() -> Self {
        Self {
            transformation: vec![
                118.4505876, 0.0, 0.0, -5458203.076608, //
                0.0, -118.4505876, 0.0, 2729101.538304, //
                0.0, 0.0, 0.0, 0.0, //
                0.0, 0.0, 0.0, 1.0,
            ],
            keys: vec![
                GeoKeyEntry::inline(1024, 1),
                GeoKeyEntry::inline(1025, 1),
                GeoKeyEntry::inline(2048, 32767),
                GeoKeyEntry::ascii(2049, 0, 117),
                GeoKeyEntry::inline(2050, 32767),
                GeoKeyEntry::inline(2054, 9102),
                GeoKeyEntry::inline(2056, 32767),
                GeoKeyEntry::double(2057, 0, 1),
                GeoKeyEntry::double(2058, 1, 1),
                GeoKeyEntry::double(2061, 2, 1),
                GeoKeyEntry::inline(3072, 32767),
                GeoKeyEntry::ascii(3073, 117, 20),
                GeoKeyEntry::inline(3074, 32767),
                GeoKeyEntry::inline(3075, 12),
                GeoKeyEntry::inline(3076, 9001),
                GeoKeyEntry::double(3078, 3, 1),
                GeoKeyEntry::double(3082, 4, 1),
                GeoKeyEntry::double(3084, 5, 1),
            ],
            doubles: vec![1737400.0, 1737400.0, 0.0, 0.0, 0.0, 0.0],
            ascii: "GCS Name = Moon 2000|Datum = D_Moon_2000|Ellipsoid = Moon_2000_IAU_IAG|\
                    Primem = Reference_Meridian|AUnits = Decimal_Degree|SimpleCylindrical Moon|"
                .to_string(),
        }
    }

    /// Validate the reference and lay it out as encodable blocks.
    ///
    /// # Errors
    /// - `TransformationLength` unless the matrix has 16 values
    /// - `TooManyKeys` if the directory would not fit its 16-bit count
    /// - `Unsorted` unless key IDs are strictly increasing
    /// - `DoubleIndexOutOfRange`, `AsciiRangeOutOfBounds` or
    ///   `UnknownLocation` for a bad parameter reference
    /// - `NonAscii` if the ASCII block holds non-ASCII characters
    pub fn build(&self) -> Result<GeoBlocks, GeoKeyError> {
        let transformation: [f64; TRANSFORMATION_LEN] = self
            .transformation
            .as_slice()
            .try_into()
            .map_err(|_| GeoKeyError::TransformationLength(self.transformation.len()))?;

        let key_count = u16::try_from(self.keys.len())
            .ok()
            .filter(|&n| n <= (u16::MAX - 4) / 4)
            .ok_or(GeoKeyError::TooManyKeys(self.keys.len()))?;

        for pair in self.keys.windows(2) {
            if pair[1].key_id <= pair[0].key_id {
                return Err(GeoKeyError::Unsorted {
                    previous: pair[0].key_id,
                    current: pair[1].key_id,
                });
            }
        }

        if !self.ascii.is_ascii() {
            return Err(GeoKeyError::NonAscii);
        }

        for key in &self.keys {
            key.check_references(self.doubles.len(), self.ascii.len())?;
        }

        let mut key_directory = Vec::with_capacity(4 + 4 * self.keys.len());
        key_directory.extend_from_slice(&KEY_DIRECTORY_HEADER);
        key_directory.push(key_count);
        for key in &self.keys {
            key_directory.extend_from_slice(&key.to_shorts());
        }

        Ok(GeoBlocks {
            transformation,
            key_directory,
            doubles: self.doubles.clone(),
            ascii: self.ascii.clone().into_bytes(),
        })
    }
}

// =============================================================================
// GeoBlocks
// =============================================================================

/// Validated georeferencing payloads, ready to encode.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoBlocks {
    pub transformation: [f64; TRANSFORMATION_LEN],

    /// Header record followed by the key records
    pub key_directory: Vec<u16>,

    pub doubles: Vec<f64>,

    /// ASCII bytes; the tag count is this length, no terminator is added
    pub ascii: Vec<u8>,
}

impl GeoBlocks {
    pub fn transformation_len(&self) -> u64 {
        (TRANSFORMATION_LEN * 8) as u64
    }

    pub fn key_directory_len(&self) -> u64 {
        self.key_directory.len() as u64 * 2
    }

    pub fn doubles_len(&self) -> u64 {
        self.doubles.len() as u64 * 8
    }

    pub fn ascii_len(&self) -> u64 {
        self.ascii.len() as u64
    }

    /// Number of key records, from the directory header.
    pub fn key_count(&self) -> u16 {
        self.key_directory.get(3).copied().unwrap_or(0)
    }
}

// =============================================================================
// GeoKeyDirectoryBuilder
// =============================================================================

#[derive(Debug, Clone)]
enum PendingValue {
    Short(u16),
    Doubles(Vec<f64>),
    Ascii(String),
}

/// Builds a [`GeoReference`] from typed key values.
///
/// Double and ASCII values are appended to their parameter blocks in the
/// order the keys are added, and each key's index or offset is resolved at
/// [`build`](GeoKeyDirectoryBuilder::build) time. ASCII values are
/// terminated with `|` and the key's count includes the separator.
///
/// ```
/// use ghost_geotiff::format::GeoKeyDirectoryBuilder;
///
/// let georef = GeoKeyDirectoryBuilder::new()
///     .short(1024, 1)
///     .ascii(1026, "Moon")
///     .double(2057, 1737400.0)
///     .build(vec![0.0; 16])
///     .unwrap();
///
/// assert_eq!(georef.ascii, "Moon|");
/// assert_eq!(georef.keys[1].count, 5);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GeoKeyDirectoryBuilder {
    keys: Vec<(u16, PendingValue)>,
}

impl GeoKeyDirectoryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key stored inline.
    pub fn short(mut self, key_id: u16, value: u16) -> Self {
        self.keys.push((key_id, PendingValue::Short(value)));
        self
    }

    /// Add a key referencing one double.
    pub fn double(self, key_id: u16, value: f64) -> Self {
        self.doubles(key_id, &[value])
    }

    /// Add a key referencing several consecutive doubles.
    pub fn doubles(mut self, key_id: u16, values: &[f64]) -> Self {
        self.keys
            .push((key_id, PendingValue::Doubles(values.to_vec())));
        self
    }

    /// Add a key referencing a string in the ASCII block.
    pub fn ascii(mut self, key_id: u16, value: &str) -> Self {
        self.keys
            .push((key_id, PendingValue::Ascii(value.to_string())));
        self
    }

    /// Resolve parameter references and validate the result.
    ///
    /// # Errors
    /// `ParamOverflow` if a parameter index or count exceeds 16 bits, plus
    /// everything [`GeoReference::build`] checks.
    pub fn build(self, transformation: Vec<f64>) -> Result<GeoReference, GeoKeyError> {
        let mut keys = Vec::with_capacity(self.keys.len());
        let mut doubles = Vec::new();
        let mut ascii = String::new();

        for (key_id, value) in self.keys {
            let overflow = || GeoKeyError::ParamOverflow { key: key_id };
            let entry = match value {
                PendingValue::Short(v) => GeoKeyEntry::inline(key_id, v),
                PendingValue::Doubles(values) => {
                    let index = u16::try_from(doubles.len()).map_err(|_| overflow())?;
                    let count = u16::try_from(values.len()).map_err(|_| overflow())?;
                    doubles.extend(values);
                    GeoKeyEntry::double(key_id, index, count)
                }
                PendingValue::Ascii(text) => {
                    let offset = u16::try_from(ascii.len()).map_err(|_| overflow())?;
                    let count = u16::try_from(text.len() + 1).map_err(|_| overflow())?;
                    ascii.push_str(&text);
                    ascii.push(ASCII_SEPARATOR);
                    GeoKeyEntry::ascii(key_id, offset, count)
                }
            };
            keys.push(entry);
        }

        let georef = GeoReference {
            transformation,
            keys,
            doubles,
            ascii,
        };
        georef.build()?;
        Ok(georef)
    }
}

// =============================================================================
// Tests
// =============================================================================
