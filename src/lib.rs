//! # Scan Treads
//!
//! A Rust crate for visual quality control of tire tread ("TDW") pattern
//! photographs.
//!
//! This library inspects each image by:
//! - Detecting and cropping the tread-pattern region
//! - Locating the structural centerline from the groove layout
//! - Measuring the land-sea ratio (patterned versus background pixels)
//! - Scoring left/right mirror symmetry around the centerline
//!
//! Each metric carries its own pass/fail decision so callers can tell the
//! failure cause apart; a batch loop aggregates per-image records into a
//! JSON report and writes a review visualization per image.
//!
//! ## Example
//!
//! ```rust,no_run
//! use scan_treads::{inspect_image, PipelineConfig};
//! use std::path::Path;
//!
//! let config = PipelineConfig::default();
//! let inspection = inspect_image(Path::new("photo.jpg"), &config)?;
//! println!(
//!     "center_x={} ratio={:.3} symmetry={:.3}",
//!     inspection.centerline.center_x,
//!     inspection.land_sea.ratio,
//!     inspection.symmetry.best_score,
//! );
//! # Ok::<(), scan_treads::InspectionError>(())
//! ```

use std::path::Path;

pub mod analysis;
pub mod config;
pub mod constants;
pub mod detection;
pub mod error;
pub mod image_loader;
pub mod mask;
pub mod pipeline;
pub mod visualization;

pub use config::{
    CenterlineConfig, CropConfig, LandSeaConfig, PipelineConfig, SymmetryConfig,
};
pub use error::{InspectionError, Result};
pub use pipeline::{
    run_batch, run_one_image, FailedImage, ImageRecord, Inspection, RunSummary, TreadReport,
};

/// Inspect a single image file without writing any artifacts.
///
/// This is the main library entry point: it decodes the image and runs the
/// full inspection pipeline, returning all intermediate results and
/// decisions. Use [`pipeline::run_one_image`] to also produce the review
/// visualization, or [`pipeline::run_batch`] for directories.
///
/// # Errors
///
/// Returns [`InspectionError`] if the image cannot be decoded, no tread
/// pattern is found, the detected region is too small, or the region is too
/// narrow to evaluate symmetry.
pub fn inspect_image(image_path: &Path, config: &PipelineConfig) -> Result<Inspection> {
    let image = image_loader::load_image_bgr(image_path)?;
    pipeline::inspect_mat(&image, config)
}
