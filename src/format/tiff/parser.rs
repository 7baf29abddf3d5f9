//! TIFF header and directory parsing.
//!
//! The read-back side of the crate. A written file is parsed from an
//! in-memory slice and checked against the layout that produced it.
//!
//! # TIFF Header Structure
//!
//! ```text
//! Bytes 0-1: Byte order (0x4949 = little-endian "II", 0x4D4D = big-endian "MM")
//! Bytes 2-3: Version (42 = 0x002A)
//! Bytes 4-7: Offset to first IFD (4 bytes)
//! ```
//!
//! BigTIFF (version 43) is recognised and rejected.

use crate::error::TiffError;
use crate::io::{read_f64_be, read_f64_le, read_u16_be, read_u16_le, read_u32_be, read_u32_le};

use super::directory::{IFD_COUNT_SIZE, IFD_ENTRY_SIZE, IFD_NEXT_OFFSET_SIZE};
use super::tags::{FieldType, TiffTag};

// =============================================================================
// Constants
// =============================================================================

/// Magic bytes indicating little-endian byte order ("II" for Intel)
const BYTE_ORDER_LITTLE_ENDIAN: u16 = 0x4949;

/// Magic bytes indicating big-endian byte order ("MM" for Motorola)
const BYTE_ORDER_BIG_ENDIAN: u16 = 0x4D4D;

/// Version number for classic TIFF
pub const VERSION_TIFF: u16 = 42;

/// Version number for BigTIFF
const VERSION_BIGTIFF: u16 = 43;

/// Size of classic TIFF header in bytes
pub const TIFF_HEADER_SIZE: usize = 8;

// =============================================================================
// ByteOrder
// =============================================================================

/// Byte order (endianness) of a TIFF file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Little-endian ("II" = Intel)
    LittleEndian,
    /// Big-endian ("MM" = Motorola)
    BigEndian,
}

impl ByteOrder {
    /// Read a u16 from a byte slice using this byte order.
    #[inline]
    pub fn read_u16(self, bytes: &[u8]) -> u16 {
        match self {
            ByteOrder::LittleEndian => read_u16_le(bytes),
            ByteOrder::BigEndian => read_u16_be(bytes),
        }
    }

    /// Read a u32 from a byte slice using this byte order.
    #[inline]
    pub fn read_u32(self, bytes: &[u8]) -> u32 {
        match self {
            ByteOrder::LittleEndian => read_u32_le(bytes),
            ByteOrder::BigEndian => read_u32_be(bytes),
        }
    }

    /// Read a double from a byte slice using this byte order.
    #[inline]
    pub fn read_f64(self, bytes: &[u8]) -> f64 {
        match self {
            ByteOrder::LittleEndian => read_f64_le(bytes),
            ByteOrder::BigEndian => read_f64_be(bytes),
        }
    }
}

// =============================================================================
// TiffHeader
// =============================================================================

/// Parsed TIFF file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TiffHeader {
    /// Byte order for all multi-byte values in the file
    pub byte_order: ByteOrder,

    /// Offset to the first IFD in the file
    pub first_ifd_offset: u64,
}

impl TiffHeader {
    /// Parse a TIFF header from raw bytes.
    ///
    /// # Arguments
    /// * `bytes` - Raw header bytes (at least 8)
    /// * `file_size` - Total file size (used to validate IFD offset)
    ///
    /// # Errors
    /// - `FileTooSmall` if there aren't enough bytes for the header
    /// - `InvalidMagic` if byte order bytes are not II or MM
    /// - `BigTiffUnsupported` for version 43
    /// - `InvalidVersion` for any other version than 42
    /// - `InvalidIfdOffset` if the first IFD offset is outside the file
    pub fn parse(bytes: &[u8], file_size: u64) -> Result<Self, TiffError> {
        if bytes.len() < TIFF_HEADER_SIZE {
            return Err(TiffError::FileTooSmall {
                required: TIFF_HEADER_SIZE as u64,
                actual: bytes.len() as u64,
            });
        }

        // Read as little-endian; we're matching fixed byte patterns
        let magic = u16::from_le_bytes([bytes[0], bytes[1]]);
        let byte_order = match magic {
            BYTE_ORDER_LITTLE_ENDIAN => ByteOrder::LittleEndian,
            BYTE_ORDER_BIG_ENDIAN => ByteOrder::BigEndian,
            _ => return Err(TiffError::InvalidMagic(magic)),
        };

        let version = byte_order.read_u16(&bytes[2..4]);
        match version {
            VERSION_TIFF => {}
            VERSION_BIGTIFF => return Err(TiffError::BigTiffUnsupported),
            _ => return Err(TiffError::InvalidVersion(version)),
        }

        let first_ifd_offset = u64::from(byte_order.read_u32(&bytes[4..8]));
        if first_ifd_offset < TIFF_HEADER_SIZE as u64 || first_ifd_offset >= file_size {
            return Err(TiffError::InvalidIfdOffset(first_ifd_offset));
        }

        Ok(TiffHeader {
            byte_order,
            first_ifd_offset,
        })
    }
}

// =============================================================================
// IfdEntry
// =============================================================================

/// A directory entry as read from the file.
#[derive(Debug, Clone, PartialEq)]
pub struct IfdEntry {
    /// Numeric tag ID
    pub tag_id: u16,

    /// Field type, if recognised
    pub field_type: Option<FieldType>,

    /// Raw field type code
    pub field_type_raw: u16,

    /// Number of elements
    pub count: u32,

    /// The 4-byte value/offset field exactly as stored
    pub value_offset_bytes: [u8; 4],

    /// Whether the value fits in the value field
    pub is_inline: bool,
}

impl IfdEntry {
    /// Parse one 12-byte entry.
    fn parse(bytes: &[u8], byte_order: ByteOrder) -> Self {
        let tag_id = byte_order.read_u16(&bytes[0..2]);
        let field_type_raw = byte_order.read_u16(&bytes[2..4]);
        let field_type = FieldType::from_u16(field_type_raw);
        let count = byte_order.read_u32(&bytes[4..8]);
        let value_offset_bytes = [bytes[8], bytes[9], bytes[10], bytes[11]];
        let is_inline = field_type.is_some_and(|t| t.fits_inline(count));

        Self {
            tag_id,
            field_type,
            field_type_raw,
            count,
            value_offset_bytes,
            is_inline,
        }
    }

    /// The tag, if it is one this crate writes.
    pub fn tag(&self) -> Option<TiffTag> {
        TiffTag::from_u16(self.tag_id)
    }

    /// Size of the value in bytes, or None for unknown field types.
    pub fn value_byte_size(&self) -> Option<u64> {
        self.field_type.map(|t| t.byte_len(self.count))
    }

    /// The value field interpreted as an offset.
    #[inline]
    pub fn value_offset(&self, byte_order: ByteOrder) -> u64 {
        u64::from(byte_order.read_u32(&self.value_offset_bytes))
    }

    /// Inline scalar SHORT or LONG value.
    ///
    /// Returns None if the value is not inline, not a single element, or not
    /// an integer type.
    pub fn inline_u32(&self, byte_order: ByteOrder) -> Option<u32> {
        if !self.is_inline || self.count != 1 {
            return None;
        }
        match self.field_type? {
            FieldType::Short => Some(u32::from(byte_order.read_u16(&self.value_offset_bytes))),
            FieldType::Long => Some(byte_order.read_u32(&self.value_offset_bytes)),
            _ => None,
        }
    }
}

// =============================================================================
// Ifd
// =============================================================================

/// A parsed Image File Directory.
#[derive(Debug, Clone, PartialEq)]
pub struct Ifd {
    /// Offset of the directory in the file
    pub offset: u64,

    /// Entries in file order
    pub entries: Vec<IfdEntry>,

    /// Offset of the next directory (0 if none)
    pub next_ifd_offset: u64,
}

impl Ifd {
    /// Parse the directory at `offset` from the whole file.
    ///
    /// # Errors
    /// - `InvalidIfdOffset` if the offset is outside the file
    /// - `FileTooSmall` if the entries or next pointer run past the end
    pub fn parse(file: &[u8], offset: u64, byte_order: ByteOrder) -> Result<Self, TiffError> {
        let size = file.len() as u64;
        let count_end = offset + IFD_COUNT_SIZE;
        if count_end > size {
            return Err(TiffError::InvalidIfdOffset(offset));
        }

        let start = offset as usize;
        let count = u64::from(byte_order.read_u16(&file[start..]));
        let end = count_end + count * IFD_ENTRY_SIZE + IFD_NEXT_OFFSET_SIZE;
        if end > size {
            return Err(TiffError::FileTooSmall {
                required: end,
                actual: size,
            });
        }

        let entries_start = count_end as usize;
        let entries = (0..count as usize)
            .map(|i| {
                let at = entries_start + i * IFD_ENTRY_SIZE as usize;
                IfdEntry::parse(&file[at..at + IFD_ENTRY_SIZE as usize], byte_order)
            })
            .collect();

        let next_at = (end - IFD_NEXT_OFFSET_SIZE) as usize;
        let next_ifd_offset = u64::from(byte_order.read_u32(&file[next_at..]));

        Ok(Self {
            offset,
            entries,
            next_ifd_offset,
        })
    }

    /// Look up an entry by tag.
    pub fn get(&self, tag: TiffTag) -> Option<&IfdEntry> {
        self.entries.iter().find(|e| e.tag_id == tag.as_u16())
    }

    /// Look up a required entry.
    pub fn require(&self, tag: TiffTag) -> Result<&IfdEntry, TiffError> {
        self.get(tag).ok_or(TiffError::MissingTag(tag.name()))
    }

    /// Encoded size of the directory.
    pub fn byte_size(&self) -> u64 {
        IFD_COUNT_SIZE + self.entries.len() as u64 * IFD_ENTRY_SIZE + IFD_NEXT_OFFSET_SIZE
    }
}

// =============================================================================
// Tests
// =============================================================================
