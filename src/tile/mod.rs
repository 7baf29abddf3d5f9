//! Tile payload generation.
//!
//! # Components
//!
//! - [`PixelSource`]: yields one uncompressed payload per tile, row-major
//! - [`RandomPixelSource`]: uniform random bytes, optionally seeded
//! - [`GradientPixelSource`]: deterministic `x + y` ramp
//! - [`ConstantPixelSource`]: a single fill value
//!
//! # Example
//!
//! ```
//! use ghost_geotiff::format::tiff::ImageGeometry;
//! use ghost_geotiff::tile::{PixelSource, RandomPixelSource};
//!
//! let geometry = ImageGeometry::default();
//! let mut source = RandomPixelSource::new(&geometry, Some(7));
//!
//! let payload = source.next_tile_payload().unwrap();
//! assert_eq!(payload.len() as u64, geometry.tile_byte_size());
//! ```

mod source;

pub use source::{ConstantPixelSource, GradientPixelSource, PixelSource, RandomPixelSource};
