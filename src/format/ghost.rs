//! GDAL ghost header.
//!
//! An ASCII block between the TIFF header and the first directory that
//! GDAL reads as structural hints for cloud-optimized files. It is written
//! verbatim with no terminator.
//!
//! The first line declares the size of the rest of the block:
//!
//! ```text
//! GDAL_STRUCTURAL_METADATA_SIZE=000140 bytes
//! ```
//!
//! The stock text declares 140 bytes while 139 follow the first line. The
//! mismatch is reported by [`GhostHeader::inspect`] and logged, and the text
//! is still written unchanged.

use tracing::warn;

/// Prefix of the size declaration line.
const SIZE_PREFIX: &str = "GDAL_STRUCTURAL_METADATA_SIZE=";

/// Suffix of the size declaration line.
const SIZE_SUFFIX: &str = " bytes";

const GDAL_DEFAULT: &str = "GDAL_STRUCTURAL_METADATA_SIZE=000140 bytes\n\
                            LAYOUT=IFDS_BEFORE_DATA\n\
                            BLOCK_ORDER=ROW_MAJOR\n\
                            BLOCK_LEADER=SIZE_AS_UINT4\n\
                            BLOCK_TRAILER=LAST_4_BYTES_REPEATED\n\
                            KNOWN_INCOMPATIBLE_EDITION=NO ";

/// The opaque preamble written after the TIFF header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GhostHeader {
    text: String,
}

/// Declared versus actual size of a ghost header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GhostInspection {
    /// Value of the size field, if the first line has one
    pub declared: Option<usize>,

    /// Bytes following the first line
    pub actual: usize,
}

impl GhostInspection {
    /// True when there is no declaration or it matches the payload.
    pub fn is_consistent(&self) -> bool {
        self.declared.map_or(true, |d| d == self.actual)
    }
}

impl Default for GhostHeader {
    fn default() -> Self {
        Self::gdal_default()
    }
}

impl GhostHeader {
    /// The stock GDAL text.
    pub fn gdal_default() -> Self {
        Self {
            text: GDAL_DEFAULT.to_string(),
        }
    }

    /// No ghost header; the directory follows the TIFF header directly.
    pub fn none() -> Self {
        Self {
            text: String::new(),
        }
    }

    /// Arbitrary text, written unchanged.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length in bytes as written.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Parse the size declared on the first line.
    pub fn declared_size(&self) -> Option<usize> {
        let first_line = self.text.lines().next()?;
        first_line
            .strip_prefix(SIZE_PREFIX)?
            .strip_suffix(SIZE_SUFFIX)?
            .parse()
            .ok()
    }

    /// Bytes after the first newline.
    pub fn payload_len(&self) -> usize {
        self.text
            .find('\n')
            .map_or(0, |newline| self.text.len() - newline - 1)
    }

    pub fn inspect(&self) -> GhostInspection {
        GhostInspection {
            declared: self.declared_size(),
            actual: self.payload_len(),
        }
    }

    /// Log a warning if the declared size disagrees with the payload.
    ///
    /// Returns the inspection either way.
    pub fn warn_if_inconsistent(&self) -> GhostInspection {
        let inspection = self.inspect();
        if !inspection.is_consistent() {
            warn!(
                declared = ?inspection.declared,
                actual = inspection.actual as u64,
                "ghost header declared size does not match its contents; writing it unchanged"
            );
        }
        inspection
    }
}
