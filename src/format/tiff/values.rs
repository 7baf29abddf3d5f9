//! TIFF tag value reading.
//!
//! Values are stored either inline in the IFD entry (for small values) or at
//! an offset in the file. [`ValueReader`] resolves both against an in-memory
//! copy of the file and bounds-checks every out-of-line read.

use crate::error::TiffError;

use super::parser::{ByteOrder, IfdEntry};
use super::tags::{FieldType, TiffTag};

// =============================================================================
// ValueReader
// =============================================================================

/// Reads tag values from a whole file held in memory.
pub struct ValueReader<'a> {
    file: &'a [u8],
    byte_order: ByteOrder,
}

fn tag_name(entry: &IfdEntry) -> &'static str {
    entry.tag().map_or("unknown", TiffTag::name)
}

fn unexpected_type(entry: &IfdEntry, expected: &str) -> TiffError {
    TiffError::InvalidTagValue {
        tag: tag_name(entry),
        message: format!("expected {}, got {:?}", expected, entry.field_type),
    }
}

impl<'a> ValueReader<'a> {
    /// Create a new ValueReader.
    pub fn new(file: &'a [u8], byte_order: ByteOrder) -> Self {
        Self { file, byte_order }
    }

    /// Get the byte order.
    #[inline]
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Raw bytes of an entry's value.
    ///
    /// For inline values, returns the used prefix of the value field.
    /// For offset values, borrows the bytes from the file.
    ///
    /// # Errors
    /// - `UnknownFieldType` if the entry's type is not recognised
    /// - `ValueOutOfBounds` if the value extends past the end of the file
    pub fn read_bytes<'e>(&self, entry: &'e IfdEntry) -> Result<&'e [u8], TiffError>
    where
        'a: 'e,
    {
        let size = entry
            .value_byte_size()
            .ok_or(TiffError::UnknownFieldType(entry.field_type_raw))?;

        if entry.is_inline {
            return Ok(&entry.value_offset_bytes[..size as usize]);
        }

        let offset = entry.value_offset(self.byte_order);
        let file_size = self.file.len() as u64;
        if offset + size > file_size {
            return Err(TiffError::ValueOutOfBounds {
                tag: entry.tag_id,
                offset,
                len: size,
                size: file_size,
            });
        }
        Ok(&self.file[offset as usize..(offset + size) as usize])
    }

    /// Read a single SHORT or LONG value.
    pub fn read_u32(&self, entry: &IfdEntry) -> Result<u32, TiffError> {
        if let Some(value) = entry.inline_u32(self.byte_order) {
            return Ok(value);
        }
        if entry.count != 1 {
            return Err(TiffError::InvalidTagValue {
                tag: tag_name(entry),
                message: format!("expected count 1, got {}", entry.count),
            });
        }
        Err(unexpected_type(entry, "Short or Long"))
    }

    /// Read an array of SHORT or LONG values widened to u32.
    ///
    /// This is the read path for TileOffsets and TileByteCounts.
    pub fn read_u32_array(&self, entry: &IfdEntry) -> Result<Vec<u32>, TiffError> {
        let bytes = self.read_bytes(entry)?;
        let order = self.byte_order;

        match entry.field_type {
            Some(FieldType::Short) => Ok(bytes
                .chunks_exact(2)
                .map(|c| u32::from(order.read_u16(c)))
                .collect()),
            Some(FieldType::Long) => Ok(bytes.chunks_exact(4).map(|c| order.read_u32(c)).collect()),
            _ => Err(unexpected_type(entry, "Short or Long array")),
        }
    }

    /// Read an array of SHORT values.
    pub fn read_u16_array(&self, entry: &IfdEntry) -> Result<Vec<u16>, TiffError> {
        if entry.field_type != Some(FieldType::Short) {
            return Err(unexpected_type(entry, "Short array"));
        }
        let bytes = self.read_bytes(entry)?;
        Ok(bytes
            .chunks_exact(2)
            .map(|c| self.byte_order.read_u16(c))
            .collect())
    }

    /// Read an array of DOUBLE values.
    pub fn read_f64_array(&self, entry: &IfdEntry) -> Result<Vec<f64>, TiffError> {
        if entry.field_type != Some(FieldType::Double) {
            return Err(unexpected_type(entry, "Double array"));
        }
        let bytes = self.read_bytes(entry)?;
        Ok(bytes
            .chunks_exact(8)
            .map(|c| self.byte_order.read_f64(c))
            .collect())
    }

    /// Read an ASCII value.
    ///
    /// Everything up to the first NUL (or the whole value if there is none)
    /// is returned, since a count that excludes the terminator is accepted.
    pub fn read_string(&self, entry: &IfdEntry) -> Result<String, TiffError> {
        if entry.field_type != Some(FieldType::Ascii) {
            return Err(unexpected_type(entry, "Ascii"));
        }

        let bytes = self.read_bytes(entry)?;
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
    }
}

// =============================================================================
// Tests
// =============================================================================
