//! Layout planning.
//!
//! The writer works in two phases: first every region of the file is placed
//! here, then the assembler streams the regions in the same order. Nothing in
//! this module touches I/O, so an impossible layout is rejected before the
//! first byte is written.
//!
//! # File Layout
//!
//! ```text
//! 0      header              "II", 42, directory offset
//! 8      ghost header        ASCII, no terminator
//! D      directory           count, entries, next = 0
//!        tile offsets        NUM_TILES x u32
//!        tile byte counts    NUM_TILES x u32
//!        transformation      16 x f64
//!        geo keys            (4 + 4N) x u16
//!        geo doubles         M x f64
//!        geo ascii           bytes, no terminator
//! P      tile data           NUM_TILES x tile_byte_size
//! ```
//!
//! Each region starts where the previous one ends.

use serde::Serialize;

use crate::error::LayoutError;

use super::directory::directory_size;

/// Size of the classic TIFF header: byte order, magic, directory pointer.
pub const TIFF_HEADER_SIZE: u64 = 8;

/// Tile dimensions must be multiples of this (TIFF 6.0, section 15).
pub const TILE_DIMENSION_MULTIPLE: u32 = 16;

// =============================================================================
// ImageGeometry
// =============================================================================

/// Raster and tile dimensions.
///
/// The image is partitioned exhaustively into equal tiles; partial edge
/// tiles are not supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImageGeometry {
    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,

    /// Tile width in pixels
    pub tile_width: u32,

    /// Tile height in pixels
    pub tile_height: u32,

    /// Bits per sample
    pub bits_per_sample: u16,

    /// Samples per pixel
    pub samples_per_pixel: u16,
}

impl Default for ImageGeometry {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 1024,
            tile_width: 128,
            tile_height: 128,
            bits_per_sample: 8,
            samples_per_pixel: 1,
        }
    }
}

impl ImageGeometry {
    /// Check that the geometry describes a whole number of equal tiles.
    ///
    /// # Errors
    /// Returns `InvalidGeometry` for zero dimensions, tiles that do not
    /// divide the image, tile sizes that are not multiples of 16, a bit
    /// depth that is not a whole number of bytes, or more than one sample
    /// per pixel.
    pub fn validate(&self) -> Result<(), LayoutError> {
        let invalid = |message: String| Err(LayoutError::InvalidGeometry { message });

        if self.width == 0 || self.height == 0 {
            return invalid(format!(
                "image dimensions must be non-zero, got {}x{}",
                self.width, self.height
            ));
        }
        if self.tile_width == 0 || self.tile_height == 0 {
            return invalid(format!(
                "tile dimensions must be non-zero, got {}x{}",
                self.tile_width, self.tile_height
            ));
        }
        if self.tile_width % TILE_DIMENSION_MULTIPLE != 0
            || self.tile_height % TILE_DIMENSION_MULTIPLE != 0
        {
            return invalid(format!(
                "tile dimensions must be multiples of {}, got {}x{}",
                TILE_DIMENSION_MULTIPLE, self.tile_width, self.tile_height
            ));
        }
        if self.width % self.tile_width != 0 || self.height % self.tile_height != 0 {
            return invalid(format!(
                "image {}x{} is not an exact multiple of tile {}x{}",
                self.width, self.height, self.tile_width, self.tile_height
            ));
        }
        if self.bits_per_sample == 0 || self.bits_per_sample % 8 != 0 {
            return invalid(format!(
                "bits per sample must be a non-zero multiple of 8, got {}",
                self.bits_per_sample
            ));
        }
        if self.samples_per_pixel != 1 {
            return invalid(format!(
                "only single-sample grayscale is supported, got {} samples per pixel",
                self.samples_per_pixel
            ));
        }
        Ok(())
    }

    /// Number of tiles in X direction.
    #[inline]
    pub fn tiles_across(&self) -> u32 {
        self.width / self.tile_width
    }

    /// Number of tiles in Y direction.
    #[inline]
    pub fn tiles_down(&self) -> u32 {
        self.height / self.tile_height
    }

    /// Total number of tiles.
    #[inline]
    pub fn num_tiles(&self) -> u64 {
        u64::from(self.tiles_across()) * u64::from(self.tiles_down())
    }

    /// Bytes in one uncompressed tile payload.
    #[inline]
    pub fn tile_byte_size(&self) -> u64 {
        u64::from(self.tile_width)
            * u64::from(self.tile_height)
            * u64::from(self.samples_per_pixel)
            * u64::from(self.bits_per_sample / 8)
    }

    /// Row-major tile index for a tile coordinate.
    ///
    /// Returns None if the coordinates are out of bounds.
    pub fn tile_index(&self, tile_x: u32, tile_y: u32) -> Option<u32> {
        if tile_x >= self.tiles_across() || tile_y >= self.tiles_down() {
            return None;
        }
        Some(tile_y * self.tiles_across() + tile_x)
    }
}

// =============================================================================
// Regions
// =============================================================================

/// The named byte regions of the file, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionKind {
    Header,
    GhostHeader,
    Directory,
    TileOffsets,
    TileByteCounts,
    ModelTransformation,
    GeoKeyDirectory,
    GeoDoubleParams,
    GeoAsciiParams,
    TileData,
}

impl RegionKind {
    pub const fn name(self) -> &'static str {
        match self {
            RegionKind::Header => "header",
            RegionKind::GhostHeader => "ghost_header",
            RegionKind::Directory => "directory",
            RegionKind::TileOffsets => "tile_offsets",
            RegionKind::TileByteCounts => "tile_byte_counts",
            RegionKind::ModelTransformation => "model_transformation",
            RegionKind::GeoKeyDirectory => "geo_key_directory",
            RegionKind::GeoDoubleParams => "geo_double_params",
            RegionKind::GeoAsciiParams => "geo_ascii_params",
            RegionKind::TileData => "tile_data",
        }
    }
}

/// A contiguous span of the output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Region {
    pub kind: RegionKind,
    pub start: u64,
    pub length: u64,
}

impl Region {
    /// First byte past the region.
    #[inline]
    pub fn end(&self) -> u64 {
        self.start + self.length
    }
}

/// Byte lengths of the variable-size blocks.
///
/// These are computed from the encoded blocks before planning starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BlockSizes {
    pub ghost_header: u64,
    pub transformation: u64,
    pub geo_keys: u64,
    pub geo_doubles: u64,
    pub geo_ascii: u64,
}

// =============================================================================
// FileLayout
// =============================================================================

/// Absolute offsets of every region in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileLayout {
    pub geometry: ImageGeometry,
    pub num_tags: u16,
    pub num_tiles: u32,
    pub tile_byte_size: u32,
    pub sizes: BlockSizes,

    pub directory_offset: u32,
    pub directory_size: u32,
    pub tile_offsets_offset: u32,
    pub tile_byte_counts_offset: u32,
    pub transformation_offset: u32,
    pub geo_key_offset: u32,
    pub geo_double_offset: u32,
    pub geo_ascii_offset: u32,
    pub pixel_data_offset: u32,

    /// Final file size in bytes
    pub total_size: u64,
}

/// Narrow a planned offset to the 32-bit field it will be written into.
fn to_offset(value: u64, region: RegionKind) -> Result<u32, LayoutError> {
    u32::try_from(value).map_err(|_| LayoutError::Overflow {
        region: region.name(),
    })
}

impl FileLayout {
    /// Place every region of the file.
    ///
    /// Each offset is the end of the previous region; see the module docs
    /// for the order.
    ///
    /// # Errors
    /// - `InvalidGeometry` if the geometry fails [`ImageGeometry::validate`]
    /// - `Overflow` if any offset, count or the file size exceeds 32 bits
    pub fn plan(
        geometry: ImageGeometry,
        num_tags: u16,
        sizes: BlockSizes,
    ) -> Result<Self, LayoutError> {
        geometry.validate()?;

        let num_tiles = to_offset(geometry.num_tiles(), RegionKind::TileOffsets)?;
        let tile_byte_size = to_offset(geometry.tile_byte_size(), RegionKind::TileData)?;
        let index_len = u64::from(num_tiles) * 4;

        let directory_offset = TIFF_HEADER_SIZE + sizes.ghost_header;
        let dir_size = directory_size(u64::from(num_tags));
        let tile_offsets = directory_offset + dir_size;
        let tile_byte_counts = tile_offsets + index_len;
        let transformation = tile_byte_counts + index_len;
        let geo_keys = transformation + sizes.transformation;
        let geo_doubles = geo_keys + sizes.geo_keys;
        let geo_ascii = geo_doubles + sizes.geo_doubles;
        let pixel_data = geo_ascii + sizes.geo_ascii;

        let pixel_len = u64::from(num_tiles) * u64::from(tile_byte_size);
        let total_size = pixel_data + pixel_len;

        // The last tile's offset is the largest value written into the file.
        let last_tile = pixel_data + pixel_len.saturating_sub(u64::from(tile_byte_size));
        to_offset(last_tile, RegionKind::TileData)?;
        to_offset(total_size, RegionKind::TileData)?;

        Ok(Self {
            geometry,
            num_tags,
            num_tiles,
            tile_byte_size,
            sizes,
            directory_offset: to_offset(directory_offset, RegionKind::Directory)?,
            directory_size: to_offset(dir_size, RegionKind::Directory)?,
            tile_offsets_offset: to_offset(tile_offsets, RegionKind::TileOffsets)?,
            tile_byte_counts_offset: to_offset(tile_byte_counts, RegionKind::TileByteCounts)?,
            transformation_offset: to_offset(transformation, RegionKind::ModelTransformation)?,
            geo_key_offset: to_offset(geo_keys, RegionKind::GeoKeyDirectory)?,
            geo_double_offset: to_offset(geo_doubles, RegionKind::GeoDoubleParams)?,
            geo_ascii_offset: to_offset(geo_ascii, RegionKind::GeoAsciiParams)?,
            pixel_data_offset: to_offset(pixel_data, RegionKind::TileData)?,
            total_size,
        })
    }

    /// Offset of tile `index` in row-major order.
    #[inline]
    pub fn tile_offset(&self, index: u32) -> u32 {
        // plan() proved the last tile offset fits in 32 bits
        self.pixel_data_offset + index * self.tile_byte_size
    }

    /// The tile offset array, one entry per tile.
    pub fn tile_offsets(&self) -> Vec<u32> {
        (0..self.num_tiles).map(|i| self.tile_offset(i)).collect()
    }

    /// The tile byte count array, one entry per tile.
    pub fn tile_byte_counts(&self) -> Vec<u32> {
        vec![self.tile_byte_size; self.num_tiles as usize]
    }

    /// All regions in file order.
    pub fn regions(&self) -> Vec<Region> {
        let index_len = u64::from(self.num_tiles) * 4;
        let region = |kind, start: u32, length| Region {
            kind,
            start: u64::from(start),
            length,
        };

        vec![
            Region {
                kind: RegionKind::Header,
                start: 0,
                length: TIFF_HEADER_SIZE,
            },
            Region {
                kind: RegionKind::GhostHeader,
                start: TIFF_HEADER_SIZE,
                length: self.sizes.ghost_header,
            },
            region(
                RegionKind::Directory,
                self.directory_offset,
                u64::from(self.directory_size),
            ),
            region(RegionKind::TileOffsets, self.tile_offsets_offset, index_len),
            region(
                RegionKind::TileByteCounts,
                self.tile_byte_counts_offset,
                index_len,
            ),
            region(
                RegionKind::ModelTransformation,
                self.transformation_offset,
                self.sizes.transformation,
            ),
            region(
                RegionKind::GeoKeyDirectory,
                self.geo_key_offset,
                self.sizes.geo_keys,
            ),
            region(
                RegionKind::GeoDoubleParams,
                self.geo_double_offset,
                self.sizes.geo_doubles,
            ),
            region(
                RegionKind::GeoAsciiParams,
                self.geo_ascii_offset,
                self.sizes.geo_ascii,
            ),
            region(
                RegionKind::TileData,
                self.pixel_data_offset,
                u64::from(self.num_tiles) * u64::from(self.tile_byte_size),
            ),
        ]
    }

    /// Look up one region.
    pub fn region(&self, kind: RegionKind) -> Region {
        self.regions()
            .into_iter()
            .find(|r| r.kind == kind)
            .unwrap_or(Region {
                kind,
                start: 0,
                length: 0,
            })
    }

    /// Check that the regions tile the file with no gap or overlap.
    ///
    /// Run before any I/O; a failure here means the planner itself drifted.
    pub fn verify(&self) -> Result<(), LayoutError> {
        let mut cursor = 0u64;
        for region in self.regions() {
            if region.start != cursor {
                return Err(LayoutError::RegionMisplaced {
                    region: region.kind.name(),
                    expected: cursor,
                    actual: region.start,
                });
            }
            cursor = region.end();
        }

        if cursor != self.total_size {
            return Err(LayoutError::RegionMisplaced {
                region: "end_of_file",
                expected: self.total_size,
                actual: cursor,
            });
        }
        if u64::from(self.directory_size) != directory_size(u64::from(self.num_tags)) {
            return Err(LayoutError::RegionMisplaced {
                region: RegionKind::Directory.name(),
                expected: directory_size(u64::from(self.num_tags)),
                actual: u64::from(self.directory_size),
            });
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
