//! Directory entries and the tag table.
//!
//! A classic TIFF IFD is a 2-byte entry count, `count` fixed-width 12-byte
//! entries, and a 4-byte pointer to the next IFD:
//!
//! ```text
//! Entry: u16 tag | u16 field type | u32 count | u32 value-or-offset
//! ```
//!
//! The value field holds the value itself when `type x count` fits in four
//! bytes, and an absolute file offset to out-of-line data otherwise.

use std::io::Write;

use crate::error::{IoError, TagError};
use crate::io::LeEncoder;

use super::tags::{FieldType, TiffTag};

/// Size of one classic TIFF directory entry in bytes.
pub const IFD_ENTRY_SIZE: u64 = 12;

/// Size of the entry-count field at the start of a directory.
pub const IFD_COUNT_SIZE: u64 = 2;

/// Size of the next-directory pointer at the end of a directory.
pub const IFD_NEXT_OFFSET_SIZE: u64 = 4;

/// Encoded size of a directory with `num_entries` entries.
#[inline]
pub const fn directory_size(num_entries: u64) -> u64 {
    IFD_COUNT_SIZE + num_entries * IFD_ENTRY_SIZE + IFD_NEXT_OFFSET_SIZE
}

// =============================================================================
// DirectoryEntry
// =============================================================================

/// Contents of the 4-byte value field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryValue {
    /// The value itself, left-justified in little-endian order
    Inline(u32),

    /// Absolute file offset of the out-of-line data
    Offset(u32),
}

impl EntryValue {
    /// The raw 32-bit field as written to the file.
    #[inline]
    pub const fn raw(self) -> u32 {
        match self {
            EntryValue::Inline(v) | EntryValue::Offset(v) => v,
        }
    }
}

/// One typed directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Numeric tag ID
    pub tag: u16,

    /// Field type of each element
    pub field_type: FieldType,

    /// Number of elements (for ASCII: number of bytes)
    pub count: u32,

    /// Inline value or offset
    pub value: EntryValue,
}

impl DirectoryEntry {
    /// A single inline SHORT.
    pub fn short(tag: TiffTag, value: u16) -> Self {
        Self {
            tag: tag.as_u16(),
            field_type: FieldType::Short,
            count: 1,
            value: EntryValue::Inline(u32::from(value)),
        }
    }

    /// A single inline LONG.
    pub fn long(tag: TiffTag, value: u32) -> Self {
        Self {
            tag: tag.as_u16(),
            field_type: FieldType::Long,
            count: 1,
            value: EntryValue::Inline(value),
        }
    }

    /// SHORT when the value fits in 16 bits, LONG otherwise.
    ///
    /// TIFF readers accept either type for the dimension tags.
    pub fn short_or_long(tag: TiffTag, value: u32) -> Self {
        match u16::try_from(value) {
            Ok(short) => Self::short(tag, short),
            Err(_) => Self::long(tag, value),
        }
    }

    /// An entry whose data lives elsewhere in the file.
    pub fn offset(tag: TiffTag, field_type: FieldType, count: u32, offset: u32) -> Self {
        Self {
            tag: tag.as_u16(),
            field_type,
            count,
            value: EntryValue::Offset(offset),
        }
    }

    /// Whether the value is stored inline.
    #[inline]
    pub fn is_inline(&self) -> bool {
        matches!(self.value, EntryValue::Inline(_))
    }

    /// Encoded size of the entry's data in bytes.
    #[inline]
    pub fn value_byte_len(&self) -> u64 {
        self.field_type.byte_len(self.count)
    }

    /// Out-of-line offset, if any.
    #[inline]
    pub fn data_offset(&self) -> Option<u32> {
        match self.value {
            EntryValue::Offset(offset) => Some(offset),
            EntryValue::Inline(_) => None,
        }
    }

    /// Check that inline storage is used exactly when the value fits.
    fn check_storage(&self) -> Result<(), TagError> {
        let fits = self.field_type.fits_inline(self.count);
        match (fits, self.is_inline()) {
            (true, true) | (false, false) => Ok(()),
            (false, true) => Err(TagError::StorageMismatch {
                tag: self.tag,
                bytes: self.value_byte_len(),
                storage: "inline",
            }),
            (true, false) => Err(TagError::StorageMismatch {
                tag: self.tag,
                bytes: self.value_byte_len(),
                storage: "out of line",
            }),
        }
    }

    /// Write the 12-byte entry.
    pub fn encode<W: Write>(&self, enc: &mut LeEncoder<W>) -> Result<(), IoError> {
        enc.write_u16(self.tag)?;
        enc.write_u16(self.field_type.as_u16())?;
        enc.write_u32(self.count)?;
        enc.write_u32(self.value.raw())
    }
}

// =============================================================================
// TagTable
// =============================================================================

/// Collects directory entries in insertion order.
///
/// Callers must add tags in ascending numeric order; [`finalize`] rejects
/// anything else.
///
/// [`finalize`]: TagTableBuilder::finalize
#[derive(Debug, Default, Clone)]
pub struct TagTableBuilder {
    entries: Vec<DirectoryEntry>,
}

impl TagTableBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a prepared entry.
    pub fn push(&mut self, entry: DirectoryEntry) -> &mut Self {
        self.entries.push(entry);
        self
    }

    /// Append an entry from its raw parts.
    pub fn add(
        &mut self,
        tag: TiffTag,
        field_type: FieldType,
        count: u32,
        value: EntryValue,
    ) -> &mut Self {
        self.push(DirectoryEntry {
            tag: tag.as_u16(),
            field_type,
            count,
            value,
        })
    }

    /// Number of entries added so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries have been added.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Validate ordering and storage, producing the immutable table.
    ///
    /// # Errors
    /// - `Empty` if no entries were added
    /// - `TooMany` if the count does not fit the 16-bit count field
    /// - `Unsorted` if tag IDs are not strictly increasing
    /// - `StorageMismatch` if an entry's inline/offset choice is wrong
    pub fn finalize(self) -> Result<TagTable, TagError> {
        if self.entries.is_empty() {
            return Err(TagError::Empty);
        }
        if self.entries.len() > usize::from(u16::MAX) {
            return Err(TagError::TooMany(self.entries.len()));
        }

        for pair in self.entries.windows(2) {
            if pair[1].tag <= pair[0].tag {
                return Err(TagError::Unsorted {
                    previous: pair[0].tag,
                    current: pair[1].tag,
                });
            }
        }

        for entry in &self.entries {
            entry.check_storage()?;
        }

        Ok(TagTable {
            entries: self.entries,
        })
    }
}

/// An ordered, validated set of directory entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagTable {
    entries: Vec<DirectoryEntry>,
}

impl TagTable {
    /// Entries in file order.
    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false for a finalized table.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry by tag.
    pub fn get(&self, tag: TiffTag) -> Option<&DirectoryEntry> {
        self.entries.iter().find(|e| e.tag == tag.as_u16())
    }

    /// Encoded size of the whole directory.
    pub fn encoded_size(&self) -> u64 {
        directory_size(self.entries.len() as u64)
    }

    /// Write count, entries and a zero next-directory pointer.
    pub fn encode<W: Write>(&self, enc: &mut LeEncoder<W>) -> Result<(), IoError> {
        // finalize() bounds the length to u16::MAX
        enc.write_u16(self.entries.len() as u16)?;
        for entry in &self.entries {
            entry.encode(enc)?;
        }
        enc.write_u32(0)
    }
}

// =============================================================================
// Tests
// =============================================================================
