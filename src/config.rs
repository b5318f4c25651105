//! Configuration structures for the scan_treads inspection pipeline.
//!
//! All tunable parameters are grouped into logical sections and threaded
//! explicitly into every component — there is no ambient configuration state.
//!
//! # Configuration Loading
//!
//! Configuration can be loaded from JSON files or constructed programmatically:
//!
//! ```no_run
//! use scan_treads::PipelineConfig;
//! use std::path::Path;
//!
//! // Load from file
//! let config = PipelineConfig::from_json_file(Path::new("config.json"))?;
//!
//! // Or use defaults
//! let config = PipelineConfig::default();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Configuration Sections
//!
//! - [`CropConfig`]: TDW region extraction settings
//! - [`LandSeaConfig`]: mask/threshold policy and the land-sea pass band
//! - [`CenterlineConfig`]: projection-profile analysis settings
//! - [`SymmetryConfig`]: mirror-symmetry search window and pass bar

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete pipeline configuration for tread inspection.
///
/// Contains all parameters needed to process an image batch from input to
/// report. Can be serialized to/from JSON for reproducible runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Input directory or single image file path
    pub input_path: PathBuf,

    /// Output directory for the JSON report and visualization images
    pub output_path: PathBuf,

    /// TDW region extraction configuration
    pub crop: CropConfig,

    /// Mask policy and land-sea ratio configuration
    pub land_sea: LandSeaConfig,

    /// Centerline detection configuration
    pub centerline: CenterlineConfig,

    /// Mirror-symmetry configuration
    pub symmetry: SymmetryConfig,
}

/// TDW region extraction parameters.
///
/// When `enabled` is false the whole input image is treated as the region,
/// with a full-frame bounding box.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropConfig {
    /// Run region extraction; false means full-frame mode
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Pixels added around the detected region on each side
    pub padding: i32,

    /// Largest contour must cover at least this fraction of the image area
    pub min_area_ratio: f64,
}

/// Mask/threshold policy plus the land-sea ratio pass band.
///
/// The binarization policy (`use_otsu`, `fixed_thr`) is shared between
/// region extraction and ratio estimation so results are reproducible under
/// a single configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandSeaConfig {
    /// Automatic histogram-splitting threshold; falls back to `fixed_thr`
    /// when false
    pub use_otsu: bool,

    /// Fixed intensity cutoff: pixels darker than this are "pattern"
    pub fixed_thr: i32,

    /// Gaussian blur kernel for ratio estimation (must be odd; < 3 skips
    /// the blur)
    pub blur_ksize: i32,

    /// Remove small noise specks with a morphological opening before counting
    pub morph_open: bool,

    /// Inclusive lower bound of the pass band
    pub low: f64,

    /// Inclusive upper bound of the pass band
    pub high: f64,
}

/// Projection-profile centerline parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CenterlineConfig {
    /// Fraction of the width analyzed, centered horizontally (0.70 keeps
    /// the middle 70%, dropping 15% per side)
    pub band_fraction: f64,

    /// Sigma of the 1D Gaussian applied to the projection profile; materially
    /// changes the detected peak count
    pub smooth_sigma: f64,

    /// Columns above `max(profile) × peak_ratio` count as peak columns
    pub peak_ratio: f64,
}

/// Mirror-symmetry search parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymmetryConfig {
    /// Horizontal shift search half-window in pixels; 0 means strict mirror
    pub allow_shift_px: i32,

    /// Minimum score to pass
    pub threshold: f64,
}

fn default_true() -> bool {
    true
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("input"),
            output_path: PathBuf::from("output"),
            crop: CropConfig {
                enabled: true,
                padding: 10,
                min_area_ratio: 0.05,
            },
            land_sea: LandSeaConfig {
                use_otsu: true,
                fixed_thr: 240,
                blur_ksize: 3,
                morph_open: true,
                low: 0.20,
                high: 0.50,
            },
            centerline: CenterlineConfig {
                band_fraction: 0.70,
                smooth_sigma: 2.0,
                peak_ratio: 0.55,
            },
            symmetry: SymmetryConfig {
                allow_shift_px: 20,
                threshold: 0.90,
            },
        }
    }
}

impl PipelineConfig {
    /// Load configuration from JSON file
    pub fn from_json_file(path: &std::path::Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to JSON file
    pub fn to_json_file(&self, path: &std::path::Path) -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
