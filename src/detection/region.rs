//! TDW region extraction
//!
//! Isolates the tread-pattern sub-region of a photograph: binarize, close
//! small gaps so broken strokes merge into one component, take the largest
//! external contour, and crop its padded bounding rectangle.

use crate::config::{CropConfig, LandSeaConfig};
use crate::constants;
use crate::error::{InspectionError, Result};
use crate::mask::{build_pattern_mask, MaskParams};
use log::debug;
use opencv::{
    core::{Mat, Point, Rect, Scalar, Size, Vector, BORDER_CONSTANT},
    imgproc,
    prelude::*,
};

/// Extracted region plus crop metadata.
#[derive(Debug)]
pub struct RegionDetection {
    /// Cropped BGR region image
    pub region: Mat,
    /// Crop box in original image coordinates, `(x1, y1, x2, y2)`
    pub crop_box_xyxy: [i32; 4],
    /// Crop box as `(x, y, w, h)`
    pub crop_box_xywh: [i32; 4],
    /// Area of the selected contour in pixels
    pub max_contour_area: f64,
    /// Source image size `(W, H)`
    pub image_size: [i32; 2],
    /// Region size `(W, H)`
    pub tdw_size: [i32; 2],
}

/// Detector for the tread-pattern region of a photograph.
pub struct RegionExtractor {
    padding: i32,
    min_area_ratio: f64,
    mask_params: MaskParams,
}

impl RegionExtractor {
    pub fn new(crop: &CropConfig, land_sea: &LandSeaConfig) -> Self {
        Self {
            padding: crop.padding,
            min_area_ratio: crop.min_area_ratio,
            mask_params: MaskParams::for_extraction(land_sea),
        }
    }

    /// Detect and crop the tread-pattern region.
    ///
    /// # Errors
    ///
    /// - [`InspectionError::NoPatternFound`] when the closed mask has no
    ///   contours at all (for example a blank photograph).
    /// - [`InspectionError::RegionTooSmall`] when the largest contour covers
    ///   less than `min_area_ratio` of the image, which rejects noise specks
    ///   on near-blank inputs.
    pub fn extract(&self, image: &Mat) -> Result<RegionDetection> {
        let width = image.cols();
        let height = image.rows();

        let mask = build_pattern_mask(image, self.mask_params)?;
        let closed = close_gaps(&mask)?;

        let mut contours = Vector::<Vector<Point>>::new();
        imgproc::find_contours(
            &closed,
            &mut contours,
            imgproc::RETR_EXTERNAL,
            imgproc::CHAIN_APPROX_SIMPLE,
            Point::new(0, 0),
        )
        .map_err(|e| InspectionError::opencv("contour detection", e))?;

        if contours.is_empty() {
            return Err(InspectionError::NoPatternFound {
                reason: "no contours in closed pattern mask".into(),
            });
        }

        let mut best_contour = None;
        let mut best_area = -1.0;
        for contour in contours.iter() {
            let area = imgproc::contour_area(&contour, false)
                .map_err(|e| InspectionError::opencv("contour area", e))?;
            if area > best_area {
                best_area = area;
                best_contour = Some(contour);
            }
        }
        let best_contour = best_contour.ok_or_else(|| InspectionError::NoPatternFound {
            reason: "no measurable contour in closed pattern mask".into(),
        })?;

        let image_area = i64::from(width) * i64::from(height);
        if best_area < image_area as f64 * self.min_area_ratio {
            return Err(InspectionError::RegionTooSmall {
                max_area: best_area,
                image_area,
                min_ratio: self.min_area_ratio,
            });
        }

        let rect = imgproc::bounding_rect(&best_contour)
            .map_err(|e| InspectionError::opencv("bounding rect", e))?;

        let x1 = (rect.x - self.padding).max(0);
        let y1 = (rect.y - self.padding).max(0);
        let x2 = (rect.x + rect.width + self.padding).min(width);
        let y2 = (rect.y + rect.height + self.padding).min(height);
        debug!(
            "region: contour area {:.0}, crop box ({}, {}, {}, {})",
            best_area, x1, y1, x2, y2
        );

        let roi = Mat::roi(image, Rect::new(x1, y1, x2 - x1, y2 - y1))
            .map_err(|e| InspectionError::opencv("region crop", e))?;
        let region = roi
            .try_clone()
            .map_err(|e| InspectionError::opencv("region clone", e))?;

        Ok(RegionDetection {
            region,
            crop_box_xyxy: [x1, y1, x2, y2],
            crop_box_xywh: [x1, y1, x2 - x1, y2 - y1],
            max_contour_area: best_area,
            image_size: [width, height],
            tdw_size: [x2 - x1, y2 - y1],
        })
    }

    /// Full-frame mode: the whole input image is the region, with a trivial
    /// bounding box. Used when region extraction is disabled in configuration.
    pub fn full_frame(image: &Mat) -> Result<RegionDetection> {
        let width = image.cols();
        let height = image.rows();
        let region = image
            .try_clone()
            .map_err(|e| InspectionError::opencv("region clone", e))?;

        Ok(RegionDetection {
            region,
            crop_box_xyxy: [0, 0, width, height],
            crop_box_xywh: [0, 0, width, height],
            max_contour_area: f64::from(width) * f64::from(height),
            image_size: [width, height],
            tdw_size: [width, height],
        })
    }
}

/// Closing pass over the pattern mask. Thin tread lines often carry
/// single-pixel breaks that would otherwise split one region into many
/// disconnected components.
fn close_gaps(mask: &Mat) -> Result<Mat> {
    let kernel = imgproc::get_structuring_element(
        imgproc::MORPH_RECT,
        Size::new(
            constants::region::CLOSE_KERNEL_SIZE,
            constants::region::CLOSE_KERNEL_SIZE,
        ),
        Point::new(-1, -1),
    )
    .map_err(|e| InspectionError::opencv("closing kernel creation", e))?;

    let mut closed = Mat::default();
    imgproc::morphology_ex(
        mask,
        &mut closed,
        imgproc::MORPH_CLOSE,
        &kernel,
        Point::new(-1, -1),
        constants::region::CLOSE_ITERATIONS,
        BORDER_CONSTANT,
        Scalar::default(),
    )
    .map_err(|e| InspectionError::opencv("closing operation", e))?;
    Ok(closed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use opencv::core::CV_8UC3;

    fn extractor() -> RegionExtractor {
        let config = PipelineConfig::default();
        RegionExtractor::new(&config.crop, &config.land_sea)
    }

    fn white_image(width: i32, height: i32) -> Mat {
        Mat::new_rows_cols_with_default(height, width, CV_8UC3, Scalar::all(255.0)).unwrap()
    }

    fn dark_rect(image: &mut Mat, rect: Rect) {
        imgproc::rectangle(image, rect, Scalar::all(20.0), -1, imgproc::LINE_8, 0).unwrap();
    }

    #[test]
    fn test_blank_image_has_no_pattern() {
        let img = white_image(200, 150);
        let result = extractor().extract(&img);
        assert!(matches!(
            result,
            Err(InspectionError::NoPatternFound { .. })
        ));
    }

    #[test]
    fn test_single_speck_is_too_small() {
        let mut img = white_image(200, 200);
        dark_rect(&mut img, Rect::new(100, 100, 1, 1));
        let result = extractor().extract(&img);
        assert!(matches!(
            result,
            Err(InspectionError::RegionTooSmall { .. })
        ));
    }

    #[test]
    fn test_dominant_block_is_cropped_with_padding() {
        let mut img = white_image(200, 200);
        dark_rect(&mut img, Rect::new(50, 40, 100, 120));

        let detection = extractor().extract(&img).unwrap();
        let [x1, y1, x2, y2] = detection.crop_box_xyxy;

        // the block plus 10 px padding, give or take the blur transition
        assert!((37..=43).contains(&x1), "x1 = {}", x1);
        assert!((27..=33).contains(&y1), "y1 = {}", y1);
        assert!((157..=163).contains(&x2), "x2 = {}", x2);
        assert!((167..=173).contains(&y2), "y2 = {}", y2);
        assert_eq!(detection.tdw_size, [x2 - x1, y2 - y1]);
        assert_eq!(detection.region.cols(), x2 - x1);
        assert_eq!(detection.region.rows(), y2 - y1);
        assert_eq!(detection.image_size, [200, 200]);
    }

    #[test]
    fn test_padding_clamps_at_image_border() {
        let mut img = white_image(100, 100);
        dark_rect(&mut img, Rect::new(0, 0, 60, 60));

        let detection = extractor().extract(&img).unwrap();
        let [x1, y1, x2, y2] = detection.crop_box_xyxy;
        assert_eq!([x1, y1], [0, 0]);
        assert!(x2 <= 100 && y2 <= 100);
        assert!(x1 < x2 && y1 < y2);
    }

    #[test]
    fn test_largest_of_two_blocks_wins() {
        let mut img = white_image(300, 200);
        dark_rect(&mut img, Rect::new(20, 20, 30, 30));
        dark_rect(&mut img, Rect::new(120, 40, 120, 120));

        let detection = extractor().extract(&img).unwrap();
        let [x1, _, x2, _] = detection.crop_box_xyxy;
        assert!(x1 >= 100, "crop {:?} should cover the larger block", x1);
        assert!(x2 > 200);
    }

    #[test]
    fn test_full_frame_mode() {
        let img = white_image(123, 77);
        let detection = RegionExtractor::full_frame(&img).unwrap();
        assert_eq!(detection.crop_box_xyxy, [0, 0, 123, 77]);
        assert_eq!(detection.tdw_size, [123, 77]);
        assert_eq!(detection.region.cols(), 123);
    }
}
