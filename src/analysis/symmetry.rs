//! Mirror-symmetry scoring with bounded shift search
//!
//! Compares the left half of a tread region against the horizontally flipped
//! right half using windowed structural similarity, optimized over a bounded
//! integer alignment shift. SSIM is used instead of raw pixel differences
//! because the two photographed halves rarely match in brightness and
//! contrast even when the tread itself is symmetric.

use crate::constants::centerline::CLAMP_MARGIN;
use crate::constants::ssim;
use crate::error::{InspectionError, Result};
use crate::mask::to_gray;
use opencv::{core::Mat, prelude::*};
use serde::{Deserialize, Serialize};

/// Outcome of the shift search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymmetryResult {
    /// Best SSIM score over all evaluated shifts, in `[0, 1]`
    pub best_score: f64,
    /// Shift at which the best score occurred
    pub best_shift: i32,
    /// Half-window of the shift search that produced this result
    pub allow_shift_px: i32,
}

/// Threshold decision for a symmetry score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymmetryDecision {
    pub passed: bool,
    pub threshold: f64,
}

/// Single-channel strip stored row-major for window statistics.
struct GrayStrip {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl GrayStrip {
    fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Copy of the columns `start .. end`.
    fn crop_cols(&self, start: usize, end: usize) -> GrayStrip {
        let width = end.saturating_sub(start);
        let mut data = Vec::with_capacity(width * self.height);
        for y in 0..self.height {
            let row = y * self.width;
            data.extend_from_slice(&self.data[row + start..row + end]);
        }
        GrayStrip {
            width,
            height: self.height,
            data,
        }
    }
}

/// Score mirror symmetry of a region about a centerline.
///
/// For each integer shift in `[-allow_shift_px, allow_shift_px]` the two
/// strips are re-aligned by discarding edge columns (never by padding, which
/// would bias the score with fabricated pixels), and the best SSIM over all
/// candidates is reported together with its shift.
///
/// # Errors
///
/// [`InspectionError::UndefinedSymmetry`] when every shift candidate
/// produced an empty strip, which happens only for degenerate
/// near-zero-width regions.
pub fn symmetry_score_mirror(
    region: &Mat,
    center_x: i32,
    allow_shift_px: i32,
) -> Result<SymmetryResult> {
    let gray = to_gray(region)?;
    let width = gray.cols();
    let height = gray.rows();
    let cx = center_x.clamp(CLAMP_MARGIN, (width - CLAMP_MARGIN).max(CLAMP_MARGIN));

    // common strip size: tolerate the natural width mismatch of the halves
    let strip_w = cx.min(width - cx).max(0) as usize;
    let strip_h = height.max(0) as usize;

    let left = extract_strip(&gray, 0, cx, strip_w, strip_h, false)?;
    let right = extract_strip(&gray, cx, width - cx, strip_w, strip_h, true)?;

    let allow = allow_shift_px.max(0);
    let mut best_score = -1.0f64;
    let mut best_shift = 0i32;

    for shift in -allow..=allow {
        let s = shift.unsigned_abs() as usize;
        if s >= strip_w {
            continue;
        }
        // shift >= 0 drops the leading columns of the left strip and the
        // trailing columns of the flipped right strip; shift < 0 mirrors that
        let (a, b) = if shift >= 0 {
            (
                left.crop_cols(s, strip_w),
                right.crop_cols(0, strip_w - s),
            )
        } else {
            (
                left.crop_cols(0, strip_w - s),
                right.crop_cols(s, strip_w),
            )
        };
        if a.is_empty() || b.is_empty() {
            continue;
        }

        let score = ssim_windowed(&a, &b);
        if score > best_score {
            best_score = score;
            best_shift = shift;
        }
    }

    if best_score < 0.0 {
        return Err(InspectionError::UndefinedSymmetry);
    }

    Ok(SymmetryResult {
        best_score,
        best_shift,
        allow_shift_px,
    })
}

/// Pass when the score reaches the configured threshold.
pub fn symmetry_pass(score: f64, threshold: f64) -> SymmetryDecision {
    SymmetryDecision {
        passed: score >= threshold,
        threshold,
    }
}

/// Pull a half into a float strip, optionally flipped horizontally, cropped
/// to the common `strip_w` × `strip_h` size.
fn extract_strip(
    gray: &Mat,
    x0: i32,
    half_w: i32,
    strip_w: usize,
    strip_h: usize,
    flip: bool,
) -> Result<GrayStrip> {
    let mut data = Vec::with_capacity(strip_w * strip_h);
    for y in 0..strip_h as i32 {
        for x in 0..strip_w as i32 {
            // flipping reads the half right-to-left
            let src_x = if flip { x0 + half_w - 1 - x } else { x0 + x };
            let v = *gray
                .at_2d::<u8>(y, src_x)
                .map_err(|e| InspectionError::opencv("strip pixel access", e))?;
            data.push(f32::from(v));
        }
    }
    Ok(GrayStrip {
        width: strip_w,
        height: strip_h,
        data,
    })
}

/// Mean windowed SSIM between two equally sized strips (Wang et al., 2004).
///
/// Local means, variances, and covariance come from integral images so the
/// cost stays linear in the strip size. The window shrinks to the largest
/// odd size that fits a narrow strip. The result is clamped to `[0, 1]`.
fn ssim_windowed(a: &GrayStrip, b: &GrayStrip) -> f64 {
    debug_assert_eq!(a.width, b.width);
    debug_assert_eq!(a.height, b.height);

    let w = a.width;
    let h = a.height;
    let mut win = (ssim::WINDOW_SIZE as usize).min(w).min(h);
    if win % 2 == 0 {
        win -= 1;
    }
    let win = win.max(1);

    let sa = IntegralSums::build(a);
    let sb = IntegralSums::build(b);
    let sab = IntegralSums::build_cross(a, b);

    let c1 = (ssim::K1 * ssim::DYNAMIC_RANGE).powi(2);
    let c2 = (ssim::K2 * ssim::DYNAMIC_RANGE).powi(2);
    let n = (win * win) as f64;

    let mut total = 0.0f64;
    let mut count = 0usize;
    for y in 0..=(h - win) {
        for x in 0..=(w - win) {
            let (sum_a, sum_aa) = sa.window(x, y, win);
            let (sum_b, sum_bb) = sb.window(x, y, win);
            let (sum_ab, _) = sab.window(x, y, win);

            let mean_a = sum_a / n;
            let mean_b = sum_b / n;
            let var_a = sum_aa / n - mean_a * mean_a;
            let var_b = sum_bb / n - mean_b * mean_b;
            let covar = sum_ab / n - mean_a * mean_b;

            let numerator = (2.0 * mean_a * mean_b + c1) * (2.0 * covar + c2);
            let denominator =
                (mean_a * mean_a + mean_b * mean_b + c1) * (var_a + var_b + c2);
            total += numerator / denominator;
            count += 1;
        }
    }

    (total / count.max(1) as f64).clamp(0.0, 1.0)
}

/// Integral images of a strip's values and squared (or cross) products.
struct IntegralSums {
    width: usize,
    sum: Vec<f64>,
    sum_sq: Vec<f64>,
}

impl IntegralSums {
    fn build(strip: &GrayStrip) -> Self {
        Self::build_from(strip.width, strip.height, |i| {
            let v = f64::from(strip.data[i]);
            (v, v * v)
        })
    }

    fn build_cross(a: &GrayStrip, b: &GrayStrip) -> Self {
        Self::build_from(a.width, a.height, |i| {
            let p = f64::from(a.data[i]) * f64::from(b.data[i]);
            (p, 0.0)
        })
    }

    fn build_from(w: usize, h: usize, value: impl Fn(usize) -> (f64, f64)) -> Self {
        let stride = w + 1;
        let mut sum = vec![0.0; stride * (h + 1)];
        let mut sum_sq = vec![0.0; stride * (h + 1)];
        for y in 0..h {
            for x in 0..w {
                let (v, v2) = value(y * w + x);
                let i = (y + 1) * stride + (x + 1);
                sum[i] = v + sum[i - 1] + sum[i - stride] - sum[i - stride - 1];
                sum_sq[i] = v2 + sum_sq[i - 1] + sum_sq[i - stride] - sum_sq[i - stride - 1];
            }
        }
        Self {
            width: stride,
            sum,
            sum_sq,
        }
    }

    /// Sum and squared-sum over the `win`×`win` window at top-left `(x, y)`.
    fn window(&self, x: usize, y: usize, win: usize) -> (f64, f64) {
        let s = self.width;
        let (x0, y0, x1, y1) = (x, y, x + win, y + win);
        let pick = |grid: &[f64]| {
            grid[y1 * s + x1] - grid[y0 * s + x1] - grid[y1 * s + x0] + grid[y0 * s + x0]
        };
        (pick(&self.sum), pick(&self.sum_sq))
    }
}
