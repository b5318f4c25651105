//! Pattern/background mask construction
//!
//! Binarizes a tread photograph into "pattern" (dark grooves, 255) versus
//! "background" (light land, 0). The same threshold policy is shared by
//! region extraction, centerline detection, and ratio estimation so a single
//! configuration yields reproducible results across all three.

use crate::config::LandSeaConfig;
use crate::constants;
use crate::error::{InspectionError, Result};
use opencv::{
    core::{self, Mat, Point, Scalar, Size, BORDER_CONSTANT},
    imgproc,
    prelude::*,
};

/// Binarization policy resolved from configuration.
#[derive(Debug, Clone, Copy)]
pub struct MaskParams {
    /// Gaussian blur kernel size; < 3 skips the blur
    pub blur_ksize: i32,
    /// Automatic histogram-splitting threshold
    pub use_otsu: bool,
    /// Fixed intensity cutoff when Otsu is disabled
    pub fixed_thr: i32,
    /// Follow binarization with a small opening to drop noise specks
    pub morph_open: bool,
}

impl MaskParams {
    /// Policy used for region extraction and centerline detection: heavier
    /// blur, no opening (the closing / run-merge downstream steps want the
    /// raw strokes intact).
    pub fn for_extraction(config: &LandSeaConfig) -> Self {
        Self {
            blur_ksize: constants::region::BLUR_KSIZE,
            use_otsu: config.use_otsu,
            fixed_thr: config.fixed_thr,
            morph_open: false,
        }
    }

    /// Policy used for ratio estimation: configured blur, opening per the
    /// `morph_open` flag (ratio estimation needs a clean count, not a single
    /// bridged blob).
    pub fn for_ratio(config: &LandSeaConfig) -> Self {
        Self {
            blur_ksize: config.blur_ksize,
            use_otsu: config.use_otsu,
            fixed_thr: config.fixed_thr,
            morph_open: config.morph_open,
        }
    }
}

/// Convert a BGR image to single-channel intensity. Single-channel inputs
/// pass through unchanged.
pub fn to_gray(image: &Mat) -> Result<Mat> {
    match image.channels() {
        1 => image
            .try_clone()
            .map_err(|e| InspectionError::opencv("grayscale clone", e)),
        _ => {
            let mut gray = Mat::default();
            imgproc::cvt_color(
                image,
                &mut gray,
                imgproc::COLOR_BGR2GRAY,
                0,
                core::AlgorithmHint::ALGO_HINT_DEFAULT,
            )
            .map_err(|e| InspectionError::opencv("grayscale conversion", e))?;
            Ok(gray)
        }
    }
}

/// Build the 0/255 pattern mask for an image under the given policy.
///
/// Pixels darker than the (automatic or fixed) cutoff become 255.
pub fn build_pattern_mask(image: &Mat, params: MaskParams) -> Result<Mat> {
    let gray = to_gray(image)?;

    let blurred = if params.blur_ksize >= 3 {
        let k = params.blur_ksize | 1; // kernel must be odd
        let mut out = Mat::default();
        imgproc::gaussian_blur(
            &gray,
            &mut out,
            Size::new(k, k),
            0.0,
            0.0,
            core::BORDER_DEFAULT,
            core::AlgorithmHint::ALGO_HINT_DEFAULT,
        )
        .map_err(|e| InspectionError::opencv("Gaussian blur", e))?;
        out
    } else {
        gray
    };

    let mut mask = Mat::default();
    if params.use_otsu {
        imgproc::threshold(
            &blurred,
            &mut mask,
            0.0,
            255.0,
            imgproc::THRESH_BINARY_INV | imgproc::THRESH_OTSU,
        )
        .map_err(|e| InspectionError::opencv("Otsu threshold", e))?;
    } else {
        imgproc::threshold(
            &blurred,
            &mut mask,
            params.fixed_thr as f64,
            255.0,
            imgproc::THRESH_BINARY_INV,
        )
        .map_err(|e| InspectionError::opencv("fixed threshold", e))?;
    }

    if params.morph_open {
        let kernel = imgproc::get_structuring_element(
            imgproc::MORPH_RECT,
            Size::new(
                constants::mask::OPEN_KERNEL_SIZE,
                constants::mask::OPEN_KERNEL_SIZE,
            ),
            Point::new(-1, -1),
        )
        .map_err(|e| InspectionError::opencv("opening kernel creation", e))?;

        let mut opened = Mat::default();
        imgproc::morphology_ex(
            &mask,
            &mut opened,
            imgproc::MORPH_OPEN,
            &kernel,
            Point::new(-1, -1),
            constants::mask::OPEN_ITERATIONS,
            BORDER_CONSTANT,
            Scalar::default(),
        )
        .map_err(|e| InspectionError::opencv("opening operation", e))?;
        mask = opened;
    }

    Ok(mask)
}
