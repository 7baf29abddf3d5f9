//! File format building blocks.
//!
//! - [`tiff`]: classic TIFF tags, directory encoding, layout planning and the
//!   read-back validator
//! - [`geokey`]: GeoTIFF georeferencing blocks
//! - [`ghost`]: the GDAL ghost header preamble

pub mod geokey;
pub mod ghost;
pub mod tiff;

pub use geokey::{GeoBlocks, GeoKeyDirectoryBuilder, GeoKeyEntry, GeoReference};
pub use ghost::{GhostHeader, GhostInspection};
