//! Pixel sources.
//!
//! A [`PixelSource`] hands the assembler one uncompressed payload per tile,
//! in row-major tile order. Every payload must be exactly
//! `tile_width * tile_height * samples_per_pixel * bytes_per_sample` bytes;
//! the assembler rejects anything else.
//!
//! Samples wider than a byte are written little-endian, matching the file's
//! byte order.

use bytes::Bytes;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::error::TileError;
use crate::format::tiff::ImageGeometry;

/// Supplies tile payloads in row-major order.
pub trait PixelSource {
    /// Produce the next tile's payload.
    ///
    /// # Errors
    /// - `Allocation` if the payload buffer cannot be reserved
    /// - `Exhausted` once every tile has been produced
    fn next_tile_payload(&mut self) -> Result<Bytes, TileError>;
}

impl<P: PixelSource + ?Sized> PixelSource for Box<P> {
    fn next_tile_payload(&mut self) -> Result<Bytes, TileError> {
        (**self).next_tile_payload()
    }
}

/// Reserve a zeroed payload buffer, reporting failure instead of aborting.
fn alloc_payload(len: usize) -> Result<Vec<u8>, TileError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| TileError::Allocation { bytes: len })?;
    buf.resize(len, 0);
    Ok(buf)
}

/// Tile bookkeeping shared by all sources.
#[derive(Debug, Clone, Copy)]
struct TileCursor {
    geometry: ImageGeometry,
    tile_len: usize,
    num_tiles: u64,
    produced: u64,
}

impl TileCursor {
    fn new(geometry: &ImageGeometry) -> Self {
        Self {
            geometry: *geometry,
            // The planner bounds tile sizes to 32 bits
            tile_len: geometry.tile_byte_size() as usize,
            num_tiles: geometry.num_tiles(),
            produced: 0,
        }
    }

    /// Claim the next tile index.
    fn advance(&mut self) -> Result<u64, TileError> {
        if self.produced >= self.num_tiles {
            return Err(TileError::Exhausted {
                produced: self.produced as u32,
            });
        }
        let index = self.produced;
        self.produced += 1;
        Ok(index)
    }
}

// =============================================================================
// RandomPixelSource
// =============================================================================

/// Uniformly random bytes.
///
/// Seeded sources are deterministic; unseeded ones draw from OS entropy.
#[derive(Debug)]
pub struct RandomPixelSource {
    cursor: TileCursor,
    rng: StdRng,
}

impl RandomPixelSource {
    pub fn new(geometry: &ImageGeometry, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self {
            cursor: TileCursor::new(geometry),
            rng,
        }
    }
}

impl PixelSource for RandomPixelSource {
    fn next_tile_payload(&mut self) -> Result<Bytes, TileError> {
        self.cursor.advance()?;
        let mut buf = alloc_payload(self.cursor.tile_len)?;
        self.rng.fill_bytes(&mut buf);
        Ok(Bytes::from(buf))
    }
}

// =============================================================================
// GradientPixelSource
// =============================================================================

/// Diagonal ramp: each sample is `x + y` in image coordinates, truncated to
/// the sample width.
#[derive(Debug, Clone)]
pub struct GradientPixelSource {
    cursor: TileCursor,
}

impl GradientPixelSource {
    pub fn new(geometry: &ImageGeometry) -> Self {
        Self {
            cursor: TileCursor::new(geometry),
        }
    }
}

impl PixelSource for GradientPixelSource {
    fn next_tile_payload(&mut self) -> Result<Bytes, TileError> {
        let index = self.cursor.advance()?;
        let g = &self.cursor.geometry;
        let mut buf = alloc_payload(self.cursor.tile_len)?;

        let across = u64::from(g.tiles_across());
        let origin_x = (index % across) * u64::from(g.tile_width);
        let origin_y = (index / across) * u64::from(g.tile_height);
        let sample_len = usize::from(g.bits_per_sample / 8);
        let pixel_len = sample_len * usize::from(g.samples_per_pixel);

        for (i, pixel) in buf.chunks_exact_mut(pixel_len).enumerate() {
            let x = origin_x + (i as u64 % u64::from(g.tile_width));
            let y = origin_y + (i as u64 / u64::from(g.tile_width));
            let value = (x + y).to_le_bytes();
            for sample in pixel.chunks_exact_mut(sample_len) {
                sample.copy_from_slice(&value[..sample_len]);
            }
        }

        Ok(Bytes::from(buf))
    }
}

// =============================================================================
// ConstantPixelSource
// =============================================================================

/// Every byte set to one value.
#[derive(Debug, Clone)]
pub struct ConstantPixelSource {
    cursor: TileCursor,
    fill: u8,
}

impl ConstantPixelSource {
    pub fn new(geometry: &ImageGeometry, fill: u8) -> Self {
        Self {
            cursor: TileCursor::new(geometry),
            fill,
        }
    }
}

impl PixelSource for ConstantPixelSource {
    fn next_tile_payload(&mut self) -> Result<Bytes, TileError> {
        self.cursor.advance()?;
        let mut buf = alloc_payload(self.cursor.tile_len)?;
        buf.fill(self.fill);
        Ok(Bytes::from(buf))
    }
}

// =============================================================================
// Tests
// =============================================================================
