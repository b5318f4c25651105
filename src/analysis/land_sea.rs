//! Land-sea ratio estimation
//!
//! The land-sea ratio is the fraction of a region's pixels classified as
//! "pattern" (dark groove) versus "background" (light land). A healthy tread
//! photo falls inside a configured band; too little pattern means a blank or
//! washed-out capture, too much means an underexposed or dirty one.

use crate::config::LandSeaConfig;
use crate::error::{InspectionError, Result};
use crate::mask::{build_pattern_mask, MaskParams};
use opencv::{core, core::Mat, prelude::*};
use serde::{Deserialize, Serialize};

/// Measured ratio plus the mask it was counted from.
#[derive(Debug)]
pub struct LandSeaResult {
    /// `land_pixels / max(1, total_pixels)`
    pub ratio: f64,
    /// Count of pattern pixels
    pub land_pixels: i32,
    /// Total pixels in the region
    pub total_pixels: i64,
    /// The 0/255 pattern mask used for counting
    pub mask_land: Mat,
}

/// Band decision for a measured ratio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandSeaDecision {
    pub passed: bool,
    pub threshold_low: f64,
    pub threshold_high: f64,
}

/// Compute the land-sea ratio of a region image.
///
/// The mask uses the configured threshold policy with opening enabled per
/// `morph_open`. The divisor is floored at 1 so a degenerate zero-area
/// region reports 0.0 instead of crashing.
pub fn compute_land_sea_ratio(region: &Mat, config: &LandSeaConfig) -> Result<LandSeaResult> {
    let mask = build_pattern_mask(region, MaskParams::for_ratio(config))?;

    let land_pixels = core::count_non_zero(&mask)
        .map_err(|e| InspectionError::opencv("pattern pixel count", e))?;
    let total_pixels = i64::from(mask.rows()) * i64::from(mask.cols());
    let ratio = f64::from(land_pixels) / total_pixels.max(1) as f64;

    Ok(LandSeaResult {
        ratio,
        land_pixels,
        total_pixels,
        mask_land: mask,
    })
}

/// Pass when the ratio lies inside the inclusive `[low, high]` band.
pub fn filter_by_land_sea_ratio(ratio: f64, low: f64, high: f64) -> LandSeaDecision {
    LandSeaDecision {
        passed: low <= ratio && ratio <= high,
        threshold_low: low,
        threshold_high: high,
    }
}
