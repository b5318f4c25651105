//! Tread centerline detection via projection-peak analysis
//!
//! Each main groove shows up as one contiguous ridge in the column-wise
//! pattern-pixel projection of the region mask. The locator restricts the
//! profile to a central band, smooths it, merges threshold-crossing runs
//! into peaks, and derives the centerline from the peak layout: tread
//! designs with three dominant grooves center on the middle one, and
//! four-groove designs center between the two innermost grooves.

use crate::config::{CenterlineConfig, LandSeaConfig};
use crate::constants::centerline::{CLAMP_MARGIN, MAX_PEAKS};
use crate::error::{InspectionError, Result};
use crate::mask::{build_pattern_mask, MaskParams};
use log::debug;
use opencv::{core::Mat, prelude::*};

/// Detected centerline plus the groove peaks it was derived from.
#[derive(Debug, Clone)]
pub struct CenterlineResult {
    /// Centerline x-coordinate, clamped to `[5, W-5]`
    pub center_x: i32,
    /// Detected groove peaks in absolute region coordinates, left to right
    pub peaks: Vec<i32>,
}

/// Locator for the tread's structural centerline.
pub struct CenterlineLocator {
    band_fraction: f64,
    smooth_sigma: f64,
    peak_ratio: f64,
    mask_params: MaskParams,
}

impl CenterlineLocator {
    pub fn new(centerline: &CenterlineConfig, land_sea: &LandSeaConfig) -> Self {
        Self {
            band_fraction: centerline.band_fraction,
            smooth_sigma: centerline.smooth_sigma,
            peak_ratio: centerline.peak_ratio,
            mask_params: MaskParams::for_extraction(land_sea),
        }
    }

    /// Locate the centerline of a tread region image.
    pub fn locate(&self, region: &Mat) -> Result<CenterlineResult> {
        let width = region.cols();
        let mask = build_pattern_mask(region, self.mask_params)?;
        let profile = column_profile(&mask)?;

        let band_start = band_offset(profile.len(), self.band_fraction);
        let band_end = profile.len() - band_start;
        let band: Vec<f32> = profile[band_start..band_end]
            .iter()
            .map(|&c| c as f32)
            .collect();

        let smoothed = smooth_profile(&band, self.smooth_sigma);
        let mut peaks: Vec<i32> = merge_peak_runs(&smoothed, self.peak_ratio)
            .into_iter()
            .map(|p| (p + band_start) as i32)
            .collect();
        peaks = keep_nearest_to_center(peaks, width);
        debug!("centerline: {} peak(s) at {:?}", peaks.len(), peaks);

        let fallback = (band_start + argmax(&smoothed)) as i32;
        let center_x = clamp_center(select_center(&peaks, fallback), width);
        Ok(CenterlineResult { center_x, peaks })
    }
}

/// Count pattern pixels per column of a 0/255 mask.
fn column_profile(mask: &Mat) -> Result<Vec<u32>> {
    let rows = mask.rows();
    let cols = mask.cols();
    let mut profile = vec![0u32; cols.max(0) as usize];
    for y in 0..rows {
        for x in 0..cols {
            let v = *mask
                .at_2d::<u8>(y, x)
                .map_err(|e| InspectionError::opencv("mask pixel access", e))?;
            if v > 0 {
                profile[x as usize] += 1;
            }
        }
    }
    Ok(profile)
}

/// Number of columns dropped on each side for a given band fraction.
/// A 0.70 fraction keeps the middle 70%, dropping 15% per side.
fn band_offset(len: usize, band_fraction: f64) -> usize {
    let fraction = band_fraction.clamp(0.0, 1.0);
    let offset = (len as f64 * (1.0 - fraction) / 2.0) as usize;
    // never drop everything
    if offset * 2 >= len {
        0
    } else {
        offset
    }
}

/// Normalized symmetric Gaussian taps with radius `ceil(3 sigma)`.
fn gaussian_taps(sigma: f64) -> Vec<f32> {
    if sigma <= 0.0 {
        return vec![1.0];
    }
    let radius = (3.0 * sigma).ceil() as i64;
    let denom = 2.0 * sigma * sigma;
    let mut taps: Vec<f64> = (-radius..=radius)
        .map(|i| (-(i * i) as f64 / denom).exp())
        .collect();
    let sum: f64 = taps.iter().sum();
    taps.iter_mut().for_each(|t| *t /= sum);
    taps.into_iter().map(|t| t as f32).collect()
}

/// 1D Gaussian smoothing with replicated borders. Removes single-column
/// noise spikes that would otherwise register as spurious peaks.
fn smooth_profile(profile: &[f32], sigma: f64) -> Vec<f32> {
    if profile.is_empty() {
        return Vec::new();
    }
    let taps = gaussian_taps(sigma);
    let radius = (taps.len() / 2) as i64;
    let len = profile.len() as i64;

    (0..len)
        .map(|i| {
            taps.iter()
                .enumerate()
                .map(|(k, &t)| {
                    let j = (i + k as i64 - radius).clamp(0, len - 1);
                    t * profile[j as usize]
                })
                .sum()
        })
        .collect()
}

/// Threshold the smoothed profile at `max × ratio` and collapse each maximal
/// run of consecutive high columns into one peak at the run midpoint.
fn merge_peak_runs(profile: &[f32], ratio: f64) -> Vec<usize> {
    let max = profile.iter().fold(0.0f32, |m, &v| m.max(v));
    if max <= 0.0 {
        return Vec::new();
    }
    let threshold = max * ratio as f32;

    let mut peaks = Vec::new();
    let mut run_start: Option<usize> = None;
    for (i, &v) in profile.iter().enumerate() {
        if v > threshold {
            run_start.get_or_insert(i);
        } else if let Some(start) = run_start.take() {
            peaks.push((start + i - 1) / 2);
        }
    }
    if let Some(start) = run_start {
        peaks.push((start + profile.len() - 1) / 2);
    }
    peaks
}

/// Bound noise from minor pattern features: when more than [`MAX_PEAKS`]
/// survive, keep the ones closest to the horizontal image center and restore
/// left-to-right order.
fn keep_nearest_to_center(mut peaks: Vec<i32>, width: i32) -> Vec<i32> {
    if peaks.len() > MAX_PEAKS {
        let center = width / 2;
        peaks.sort_by_key(|&p| (p - center).abs());
        peaks.truncate(MAX_PEAKS);
        peaks.sort_unstable();
    }
    peaks
}

/// Index of the first maximum value.
fn argmax(profile: &[f32]) -> usize {
    profile
        .iter()
        .enumerate()
        .fold((0, f32::MIN), |(bi, bv), (i, &v)| {
            if v > bv {
                (i, v)
            } else {
                (bi, bv)
            }
        })
        .0
}

/// Centerline selection over the surviving peak count.
///
/// - 0 peaks: the caller's fallback (global profile maximum);
/// - 1 peak: that peak;
/// - 2 peaks: their midpoint;
/// - 3 peaks: the middle peak;
/// - 4 or more: the 4 peaks around the middle of the list, centerline at the
///   midpoint of the 2nd and 3rd of those — the true tread centerline sits
///   between the two innermost of four main grooves.
fn select_center(peaks: &[i32], fallback: i32) -> i32 {
    match peaks.len() {
        0 => fallback,
        1 => peaks[0],
        2 => (peaks[0] + peaks[1]) / 2,
        3 => peaks[1],
        n => {
            let mid = n / 2;
            let start = mid.saturating_sub(2).min(n - 4);
            let four = &peaks[start..start + 4];
            (four[1] + four[2]) / 2
        }
    }
}

fn clamp_center(x: i32, width: i32) -> i32 {
    x.clamp(CLAMP_MARGIN, (width - CLAMP_MARGIN).max(CLAMP_MARGIN))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use opencv::core::{Rect, Scalar, CV_8UC3};
    use opencv::imgproc;

    fn locator() -> CenterlineLocator {
        let config = PipelineConfig::default();
        CenterlineLocator::new(&config.centerline, &config.land_sea)
    }

    fn striped_image(width: i32, height: i32, stripe_centers: &[i32]) -> Mat {
        let mut img =
            Mat::new_rows_cols_with_default(height, width, CV_8UC3, Scalar::all(255.0)).unwrap();
        for &cx in stripe_centers {
            imgproc::rectangle(
                &mut img,
                Rect::new(cx - 3, 0, 7, height),
                Scalar::all(20.0),
                -1,
                imgproc::LINE_8,
                0,
            )
            .unwrap();
        }
        img
    }

    // -- selection table, exhaustive over n = 0..=6 --

    #[test]
    fn test_select_no_peaks_uses_fallback() {
        assert_eq!(select_center(&[], 77), 77);
    }

    #[test]
    fn test_select_one_peak() {
        assert_eq!(select_center(&[42], 0), 42);
    }

    #[test]
    fn test_select_two_peaks_midpoint() {
        assert_eq!(select_center(&[60, 140], 0), 100);
        assert_eq!(select_center(&[10, 15], 0), 12); // floor of 12.5
    }

    #[test]
    fn test_select_three_peaks_middle() {
        assert_eq!(select_center(&[30, 90, 170], 0), 90);
    }

    #[test]
    fn test_select_four_peaks_inner_midpoint() {
        assert_eq!(select_center(&[40, 80, 120, 160], 0), 100);
    }

    #[test]
    fn test_select_five_peaks() {
        // mid = 2, window starts at 0: peaks 0..4, midpoint of the 2nd and 3rd
        assert_eq!(select_center(&[10, 40, 80, 120, 160], 0), 60);
    }

    #[test]
    fn test_select_six_peaks() {
        // mid = 3, window starts at 1: peaks 1..5, midpoint of indices 2 and 3
        assert_eq!(select_center(&[10, 40, 80, 120, 160, 190], 0), 100);
    }

    // -- run merging --

    #[test]
    fn test_merge_single_run_midpoint() {
        // high columns 4..=8, midpoint 6
        let profile = [0.0, 0.0, 0.0, 0.0, 10.0, 10.0, 10.0, 10.0, 10.0, 0.0];
        assert_eq!(merge_peak_runs(&profile, 0.55), vec![6]);
    }

    #[test]
    fn test_merge_run_reaching_profile_end() {
        let profile = [0.0, 0.0, 9.0, 9.0];
        assert_eq!(merge_peak_runs(&profile, 0.5), vec![2]);
    }

    #[test]
    fn test_merge_two_runs() {
        let profile = [8.0, 8.0, 0.0, 0.0, 0.0, 8.0, 8.0, 8.0];
        assert_eq!(merge_peak_runs(&profile, 0.5), vec![0, 6]);
    }

    #[test]
    fn test_merge_empty_profile_has_no_peaks() {
        assert!(merge_peak_runs(&[0.0, 0.0, 0.0], 0.55).is_empty());
        assert!(merge_peak_runs(&[], 0.55).is_empty());
    }

    #[test]
    fn test_subthreshold_columns_split_runs() {
        let profile = [10.0, 4.0, 10.0];
        assert_eq!(merge_peak_runs(&profile, 0.55), vec![0, 2]);
    }

    // -- smoothing --

    #[test]
    fn test_smoothing_preserves_symmetric_peak_position() {
        let mut profile = vec![0.0f32; 41];
        profile[20] = 100.0;
        let smoothed = smooth_profile(&profile, 2.0);
        assert_eq!(argmax(&smoothed), 20);
        // mass is spread, not lost
        let total: f32 = smoothed.iter().sum();
        assert!((total - 100.0).abs() < 1.0);
    }

    #[test]
    fn test_smoothing_flattens_single_column_spike() {
        let mut profile = vec![50.0f32; 30];
        profile[10] = 55.0;
        let smoothed = smooth_profile(&profile, 2.0);
        let max = smoothed.iter().fold(0.0f32, |m, &v| m.max(v));
        assert!(max < 53.0);
    }

    #[test]
    fn test_zero_sigma_is_identity() {
        let profile = [1.0, 5.0, 2.0];
        assert_eq!(smooth_profile(&profile, 0.0), profile.to_vec());
    }

    // -- truncation --

    #[test]
    fn test_seven_peaks_truncated_to_six_nearest_center() {
        let peaks = vec![2, 40, 70, 100, 130, 160, 190];
        let kept = keep_nearest_to_center(peaks, 200);
        assert_eq!(kept, vec![40, 70, 100, 130, 160, 190]);
    }

    #[test]
    fn test_six_peaks_kept_unchanged() {
        let peaks = vec![5, 30, 60, 90, 120, 150];
        assert_eq!(keep_nearest_to_center(peaks.clone(), 200), peaks);
    }

    // -- band restriction and clamping --

    #[test]
    fn test_band_offset_drops_fifteen_percent_per_side() {
        assert_eq!(band_offset(200, 0.70), 30);
        assert_eq!(band_offset(100, 0.70), 15);
    }

    #[test]
    fn test_band_offset_never_exhausts_profile() {
        assert_eq!(band_offset(3, 0.0), 0);
        assert_eq!(band_offset(0, 0.7), 0);
    }

    #[test]
    fn test_clamp_center_bounds() {
        assert_eq!(clamp_center(2, 200), 5);
        assert_eq!(clamp_center(199, 200), 195);
        assert_eq!(clamp_center(100, 200), 100);
    }

    // -- end-to-end on synthetic regions --

    #[test]
    fn test_four_stripes_center_between_inner_pair() {
        let img = striped_image(200, 100, &[40, 80, 120, 160]);
        let result = locator().locate(&img).unwrap();
        assert_eq!(result.peaks, vec![40, 80, 120, 160]);
        assert_eq!(result.center_x, 100);
    }

    #[test]
    fn test_two_stripes_center_at_midpoint() {
        let img = striped_image(200, 100, &[60, 140]);
        let result = locator().locate(&img).unwrap();
        assert_eq!(result.peaks, vec![60, 140]);
        assert_eq!(result.center_x, 100);
    }

    #[test]
    fn test_single_stripe() {
        let img = striped_image(200, 100, &[90]);
        let result = locator().locate(&img).unwrap();
        assert_eq!(result.center_x, 90);
    }

    #[test]
    fn test_centerline_always_within_margin() {
        // stripe hugging the band edge still produces a clamped, in-range value
        let img = striped_image(60, 40, &[12]);
        let result = locator().locate(&img).unwrap();
        assert!(result.center_x >= 5);
        assert!(result.center_x <= 55);
    }

    #[test]
    fn test_blank_region_falls_back_to_profile_argmax() {
        let img =
            Mat::new_rows_cols_with_default(40, 200, CV_8UC3, Scalar::all(255.0)).unwrap();
        let result = locator().locate(&img).unwrap();
        assert!(result.peaks.is_empty());
        assert!(result.center_x >= 5 && result.center_x <= 195);
    }
}
