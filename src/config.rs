//! Configuration for the `ghost-geotiff` binary.
//!
//! Every option can be given on the command line or through an environment
//! variable with the `GEOTIFF_` prefix. The defaults reproduce the reference
//! product: a 1024x1024 8-bit lunar raster in 128x128 tiles.
//!
//! # Example
//!
//! ```ignore
//! use ghost_geotiff::config::Config;
//!
//! let config = Config::parse();
//! config.validate()?;
//! let options = config.write_options()?;
//! ```
//!
//! # Environment Variables
//!
//! - `GEOTIFF_OUTPUT` - Output path (default: moon.tif)
//! - `GEOTIFF_WIDTH`, `GEOTIFF_HEIGHT` - Image size in pixels (default: 1024)
//! - `GEOTIFF_TILE_WIDTH`, `GEOTIFF_TILE_HEIGHT` - Tile size (default: 128)
//! - `GEOTIFF_BITS_PER_SAMPLE` - 8, 16 or 32 (default: 8)
//! - `GEOTIFF_SAMPLES_PER_PIXEL` - Must be 1
//! - `GEOTIFF_GEOREF` - JSON file with a custom georeference
//! - `GEOTIFF_SEED` - Seed for the random pixel source
//! - `GEOTIFF_PIXELS` - random, gradient or constant (default: random)
//! - `GEOTIFF_FILL` - Fill byte for the constant source (default: 0)

use std::fs;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::format::geokey::GeoReference;
use crate::format::ghost::GhostHeader;
use crate::format::tiff::{ImageGeometry, TILE_DIMENSION_MULTIPLE};
use crate::tile::{ConstantPixelSource, GradientPixelSource, PixelSource, RandomPixelSource};
use crate::writer::WriteOptions;

// =============================================================================
// Default Values
// =============================================================================

/// Default output path.
pub const DEFAULT_OUTPUT: &str = "moon.tif";

/// Default image width and height.
pub const DEFAULT_IMAGE_SIZE: u32 = 1024;

/// Default tile width and height.
pub const DEFAULT_TILE_SIZE: u32 = 128;

/// Default bits per sample.
pub const DEFAULT_BITS_PER_SAMPLE: u16 = 8;

/// Supported bits per sample.
pub const SUPPORTED_BITS_PER_SAMPLE: [u16; 3] = [8, 16, 32];

// =============================================================================
// CLI Arguments
// =============================================================================

/// How tile pixels are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PixelPattern {
    /// Uniform random bytes
    Random,
    /// Diagonal ramp, x + y
    Gradient,
    /// Every byte set to --fill
    Constant,
}

/// Ghost GeoTIFF - writes a tiled, georeferenced GeoTIFF with a GDAL ghost header.
#[derive(Parser, Debug, Clone)]
#[command(name = "ghost-geotiff")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    // =========================================================================
    // Output
    // =========================================================================
    /// Path of the file to write.
    #[arg(short, long, default_value = DEFAULT_OUTPUT, env = "GEOTIFF_OUTPUT")]
    pub output: PathBuf,

    // =========================================================================
    // Geometry
    // =========================================================================
    /// Image width in pixels.
    #[arg(long, default_value_t = DEFAULT_IMAGE_SIZE, env = "GEOTIFF_WIDTH")]
    pub width: u32,

    /// Image height in pixels.
    #[arg(long, default_value_t = DEFAULT_IMAGE_SIZE, env = "GEOTIFF_HEIGHT")]
    pub height: u32,

    /// Tile width in pixels (multiple of 16, divides the width).
    #[arg(long, default_value_t = DEFAULT_TILE_SIZE, env = "GEOTIFF_TILE_WIDTH")]
    pub tile_width: u32,

    /// Tile height in pixels (multiple of 16, divides the height).
    #[arg(long, default_value_t = DEFAULT_TILE_SIZE, env = "GEOTIFF_TILE_HEIGHT")]
    pub tile_height: u32,

    /// Bits per sample: 8, 16 or 32.
    #[arg(long, default_value_t = DEFAULT_BITS_PER_SAMPLE, env = "GEOTIFF_BITS_PER_SAMPLE")]
    pub bits_per_sample: u16,

    /// Samples per pixel. Only single-sample grayscale is written.
    #[arg(long, default_value_t = 1, env = "GEOTIFF_SAMPLES_PER_PIXEL")]
    pub samples_per_pixel: u16,

    // =========================================================================
    // Georeferencing
    // =========================================================================
    /// JSON file holding a GeoReference (transformation, keys, doubles, ascii).
    ///
    /// If not specified, the built-in Moon 2000 simple-cylindrical reference is used.
    #[arg(long, env = "GEOTIFF_GEOREF")]
    pub georef: Option<PathBuf>,

    /// Omit the GDAL ghost header; the directory then starts at offset 8.
    #[arg(long, default_value_t = false)]
    pub no_ghost_header: bool,

    // =========================================================================
    // Pixels
    // =========================================================================
    /// Pixel generator.
    #[arg(long, value_enum, default_value_t = PixelPattern::Random, env = "GEOTIFF_PIXELS")]
    pub pixels: PixelPattern,

    /// Seed for the random generator. Unseeded runs use OS entropy.
    #[arg(long, env = "GEOTIFF_SEED")]
    pub seed: Option<u64>,

    /// Fill byte for the constant generator.
    #[arg(long, default_value_t = 0, env = "GEOTIFF_FILL")]
    pub fill: u8,

    // =========================================================================
    // Actions
    // =========================================================================
    /// Read the written file back and check it against the planned layout.
    #[arg(long, default_value_t = false)]
    pub verify: bool,

    /// Print the planned layout as JSON and exit without writing.
    #[arg(long, default_value_t = false)]
    pub print_layout: bool,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err("width and height must be greater than 0".to_string());
        }
        if self.tile_width == 0 || self.tile_height == 0 {
            return Err("tile_width and tile_height must be greater than 0".to_string());
        }

        if self.tile_width % TILE_DIMENSION_MULTIPLE != 0
            || self.tile_height % TILE_DIMENSION_MULTIPLE != 0
        {
            return Err(format!(
                "tile_width and tile_height must be multiples of {}",
                TILE_DIMENSION_MULTIPLE
            ));
        }

        if self.width % self.tile_width != 0 || self.height % self.tile_height != 0 {
            return Err(format!(
                "image {}x{} must be an exact multiple of the tile size {}x{}",
                self.width, self.height, self.tile_width, self.tile_height
            ));
        }

        if !SUPPORTED_BITS_PER_SAMPLE.contains(&self.bits_per_sample) {
            return Err(format!(
                "bits_per_sample must be one of 8, 16 or 32, got {}",
                self.bits_per_sample
            ));
        }

        if self.samples_per_pixel != 1 {
            return Err("samples_per_pixel must be 1".to_string());
        }

        if self.seed.is_some() && self.pixels != PixelPattern::Random {
            return Err("--seed only applies to --pixels random".to_string());
        }

        Ok(())
    }

    /// Image geometry from the CLI options.
    pub fn geometry(&self) -> ImageGeometry {
        ImageGeometry {
            width: self.width,
            height: self.height,
            tile_width: self.tile_width,
            tile_height: self.tile_height,
            bits_per_sample: self.bits_per_sample,
            samples_per_pixel: self.samples_per_pixel,
        }
    }

    /// Load the georeference file, or the built-in reference.
    pub fn georeference(&self) -> Result<GeoReference, String> {
        let Some(path) = &self.georef else {
            return Ok(GeoReference::moon_2000());
        };

        let text = fs::read_to_string(path)
            .map_err(|e| format!("cannot read georeference {}: {}", path.display(), e))?;
        serde_json::from_str(&text)
            .map_err(|e| format!("invalid georeference {}: {}", path.display(), e))
    }

    pub fn ghost_header(&self) -> GhostHeader {
        if self.no_ghost_header {
            GhostHeader::none()
        } else {
            GhostHeader::gdal_default()
        }
    }

    /// Everything the writer needs to plan the file.
    pub fn write_options(&self) -> Result<WriteOptions, String> {
        Ok(WriteOptions {
            geometry: self.geometry(),
            georef: self.georeference()?,
            ghost: self.ghost_header(),
        })
    }

    /// The selected pixel generator.
    pub fn pixel_source(&self) -> Box<dyn PixelSource> {
        let geometry = self.geometry();
        match self.pixels {
            PixelPattern::Random => Box::new(RandomPixelSource::new(&geometry, self.seed)),
            PixelPattern::Gradient => Box::new(GradientPixelSource::new(&geometry)),
            PixelPattern::Constant => Box::new(ConstantPixelSource::new(&geometry, self.fill)),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn test_config() -> Config {
        Config {
            output: PathBuf::from("out.tif"),
            width: 1024,
            height: 1024,
            tile_width: 128,
            tile_height: 128,
            bits_per_sample: 8,
            samples_per_pixel: 1,
            georef: None,
            no_ghost_header: false,
            pixels: PixelPattern::Random,
            seed: Some(7),
            fill: 0,
            verify: false,
            print_layout: false,
            verbose: false,
        }
    }

    #[test]
    fn test_valid_config() {
        let config = test_config();
        assert!(config.validate().is_ok());
        assert_eq!(config.geometry(), ImageGeometry::default());
    }

    #[test]
    fn test_defaults_from_cli() {
        let config = Config::parse_from(["ghost-geotiff"]);
        assert_eq!(config.output, PathBuf::from(DEFAULT_OUTPUT));
        assert_eq!(config.geometry(), ImageGeometry::default());
        assert_eq!(config.pixels, PixelPattern::Random);
        assert!(!config.no_ghost_header);
    }

    #[test]
    fn test_cli_overrides() {
        let config = Config::parse_from([
            "ghost-geotiff",
            "-o",
            "x.tif",
            "--width",
            "512",
            "--tile-width",
            "256",
            "--pixels",
            "constant",
            "--fill",
            "9",
            "--no-ghost-header",
        ]);
        assert_eq!(config.output, PathBuf::from("x.tif"));
        assert_eq!(config.width, 512);
        assert_eq!(config.tile_width, 256);
        assert_eq!(config.pixels, PixelPattern::Constant);
        assert_eq!(config.fill, 9);
        assert!(config.ghost_header().is_empty());
    }

    #[test]
    fn test_zero_dimensions() {
        let mut config = test_config();
        config.width = 0;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("width"));

        let mut config = test_config();
        config.tile_height = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_tiles_rejected() {
        let mut config = test_config();
        config.width = 1000;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("exact multiple"));
    }

    #[test]
    fn test_tile_multiple_of_sixteen() {
        let mut config = test_config();
        config.width = 1000;
        config.tile_width = 100;
        assert!(config.validate().unwrap_err().contains("multiples of 16"));
    }

    #[test]
    fn test_invalid_bits_per_sample() {
        let mut config = test_config();
        config.bits_per_sample = 12;
        assert!(config.validate().is_err());

        let mut config = test_config();
        config.bits_per_sample = 32;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_samples_per_pixel() {
        let mut config = test_config();
        config.samples_per_pixel = 3;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_seed_requires_random() {
        let mut config = test_config();
        config.pixels = PixelPattern::Gradient;
        assert!(config.validate().is_err());

        config.seed = None;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_georeference_default() {
        let config = test_config();
        assert_eq!(config.georeference().unwrap(), GeoReference::moon_2000());
    }

    #[test]
    fn test_georeference_from_file() {
        let mut georef = GeoReference::moon_2000();
        georef.doubles[0] = 3396190.0;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(&georef).unwrap().as_bytes())
            .unwrap();

        let mut config = test_config();
        config.georef = Some(file.path().to_path_buf());
        assert_eq!(config.georeference().unwrap(), georef);
    }

    #[test]
    fn test_georeference_bad_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"not json").unwrap();

        let mut config = test_config();
        config.georef = Some(file.path().to_path_buf());
        assert!(config.georeference().unwrap_err().contains("invalid georeference"));

        config.georef = Some(PathBuf::from("/nonexistent/georef.json"));
        assert!(config.georeference().unwrap_err().contains("cannot read"));
    }

    #[test]
    fn test_pixel_source_selection() {
        let mut config = test_config();
        config.pixels = PixelPattern::Constant;
        config.seed = None;
        config.fill = 5;

        let mut source = config.pixel_source();
        let payload = source.next_tile_payload().unwrap();
        assert_eq!(payload.len(), 16384);
        assert!(payload.iter().all(|&b| b == 5));
    }
}
