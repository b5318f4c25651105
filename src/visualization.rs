//! Review overlays
//!
//! Produces the side-by-side composite written for every inspected image:
//! the original photograph with the crop box, the region with its detected
//! centerline and best alignment shift, and a preview of the land mask.

use crate::constants::draw;
use crate::error::{InspectionError, Result};
use opencv::{
    core::{self, Mat, Point, Rect, Scalar, Size, Vector},
    imgcodecs, imgproc,
    prelude::*,
};
use std::path::Path;

fn color(bgr: (f64, f64, f64)) -> Scalar {
    Scalar::new(bgr.0, bgr.1, bgr.2, 0.0)
}

/// Write the three-panel visualization for one inspected image.
pub fn draw_visualization(
    original: &Mat,
    crop_box_xyxy: [i32; 4],
    region: &Mat,
    center_x: i32,
    land_mask: &Mat,
    best_shift: i32,
    save_path: &Path,
) -> Result<()> {
    let [x1, y1, x2, y2] = crop_box_xyxy;

    // panel 1: original with the crop box
    let mut vis = original
        .try_clone()
        .map_err(|e| InspectionError::opencv("visualization clone", e))?;
    imgproc::rectangle(
        &mut vis,
        Rect::new(x1, y1, x2 - x1, y2 - y1),
        color(draw::RED),
        draw::LINE_THICKNESS,
        imgproc::LINE_8,
        0,
    )
    .map_err(|e| InspectionError::opencv("crop box drawing", e))?;
    imgproc::put_text(
        &mut vis,
        "TDW",
        Point::new(x1, (y1 - 5).max(20)),
        imgproc::FONT_HERSHEY_SIMPLEX,
        draw::FONT_SCALE,
        color(draw::RED),
        draw::LINE_THICKNESS,
        imgproc::LINE_8,
        false,
    )
    .map_err(|e| InspectionError::opencv("crop box label", e))?;

    // panel 2: region with centerline and shift annotations
    let mut region_vis = region
        .try_clone()
        .map_err(|e| InspectionError::opencv("region clone", e))?;
    let region_h = region_vis.rows();
    imgproc::line(
        &mut region_vis,
        Point::new(center_x, 0),
        Point::new(center_x, region_h - 1),
        color(draw::RED),
        draw::LINE_THICKNESS,
        imgproc::LINE_8,
        0,
    )
    .map_err(|e| InspectionError::opencv("centerline drawing", e))?;
    imgproc::put_text(
        &mut region_vis,
        &format!("center_x={}", center_x),
        Point::new(10, 25),
        imgproc::FONT_HERSHEY_SIMPLEX,
        draw::FONT_SCALE,
        color(draw::RED),
        draw::LINE_THICKNESS,
        imgproc::LINE_8,
        false,
    )
    .map_err(|e| InspectionError::opencv("centerline label", e))?;
    imgproc::put_text(
        &mut region_vis,
        &format!("best_shift={}", best_shift),
        Point::new(10, 55),
        imgproc::FONT_HERSHEY_SIMPLEX,
        draw::FONT_SCALE,
        color(draw::BLUE),
        draw::LINE_THICKNESS,
        imgproc::LINE_8,
        false,
    )
    .map_err(|e| InspectionError::opencv("shift label", e))?;

    // panel 3: land mask preview
    let mut mask_vis = Mat::default();
    imgproc::cvt_color(
        land_mask,
        &mut mask_vis,
        imgproc::COLOR_GRAY2BGR,
        0,
        core::AlgorithmHint::ALGO_HINT_DEFAULT,
    )
    .map_err(|e| InspectionError::opencv("mask preview conversion", e))?;

    // scale the original panel to the region height, then concatenate
    let scale = f64::from(region_h) / f64::from(vis.rows());
    let scaled_w = ((f64::from(vis.cols()) * scale).round() as i32).max(1);
    let mut vis_small = Mat::default();
    imgproc::resize(
        &vis,
        &mut vis_small,
        Size::new(scaled_w, region_h),
        0.0,
        0.0,
        imgproc::INTER_LINEAR,
    )
    .map_err(|e| InspectionError::opencv("visualization resize", e))?;

    let mut panels = Vector::<Mat>::new();
    panels.push(vis_small);
    panels.push(region_vis);
    panels.push(mask_vis);
    let mut composite = Mat::default();
    core::hconcat(&panels, &mut composite)
        .map_err(|e| InspectionError::opencv("panel concatenation", e))?;

    let path_str = save_path.to_str().ok_or_else(|| {
        InspectionError::invalid_input(format!(
            "visualization path is not valid UTF-8: {}",
            save_path.display()
        ))
    })?;
    imgcodecs::imwrite(path_str, &composite, &Vector::new())
        .map_err(|e| InspectionError::opencv("visualization write", e))?;
    Ok(())
}
