//! Per-image orchestration, batch loop, and report records
//!
//! One image flows through region extraction, centerline detection, the
//! land-sea ratio, and mirror-symmetry scoring, in that order; the two
//! metric decisions are reported separately so a caller can distinguish the
//! failure cause. The batch loop converts per-image failures into failure
//! records and continues — a single malformed input never halts a run.

use crate::analysis::{
    compute_land_sea_ratio, filter_by_land_sea_ratio, symmetry_pass, symmetry_score_mirror,
    LandSeaDecision, LandSeaResult, SymmetryDecision, SymmetryResult,
};
use crate::config::PipelineConfig;
use crate::detection::{CenterlineLocator, CenterlineResult, RegionDetection, RegionExtractor};
use crate::error::{InspectionError, Result};
use crate::image_loader::{list_images, load_image_bgr};
use crate::visualization::draw_visualization;
use log::{info, warn};
use opencv::core::Mat;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Full in-memory outcome of inspecting one image (Mats included).
///
/// [`TreadReport`] is the serializable projection of this.
#[derive(Debug)]
pub struct Inspection {
    pub region: RegionDetection,
    pub centerline: CenterlineResult,
    pub land_sea: LandSeaResult,
    pub land_decision: LandSeaDecision,
    pub symmetry: SymmetryResult,
    pub symmetry_decision: SymmetryDecision,
}

/// Crop metadata serialized per image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropReport {
    pub crop_box_xyxy: [i32; 4],
    pub tdw_size: [i32; 2],
}

/// Land-sea ratio result serialized per image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandSeaReport {
    pub ratio: f64,
    pub passed: bool,
    pub threshold_low: f64,
    pub threshold_high: f64,
}

/// Symmetry result serialized per image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymmetryReport {
    pub score: f64,
    pub passed: bool,
    pub threshold: f64,
    pub center_x: i32,
    pub best_shift: i32,
    pub allow_shift_px: i32,
}

/// Per-image result record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreadReport {
    pub file_name: String,
    pub file_path: String,
    /// Sub-decisions in fixed order: land-sea ratio, then symmetry
    pub passed: Vec<bool>,
    pub tdw_crop: CropReport,
    pub land_sea: LandSeaReport,
    pub symmetry: SymmetryReport,
    pub visual_path: String,
}

/// Record for an image whose pipeline failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedImage {
    pub file_name: String,
    pub file_path: String,
    pub passed: bool,
    pub error: String,
}

/// One entry of the aggregate JSON report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageRecord {
    Analyzed(TreadReport),
    Failed(FailedImage),
}

impl ImageRecord {
    /// Error message for failed images, `None` for analyzed ones.
    pub fn error(&self) -> Option<&str> {
        match self {
            ImageRecord::Analyzed(_) => None,
            ImageRecord::Failed(failed) => Some(&failed.error),
        }
    }

    pub fn file_name(&self) -> &str {
        match self {
            ImageRecord::Analyzed(report) => &report.file_name,
            ImageRecord::Failed(failed) => &failed.file_name,
        }
    }

    /// Counts of (passed, failed) sub-decisions in this record. A failed
    /// image counts as one failed item.
    pub fn decision_counts(&self) -> (usize, usize) {
        match self {
            ImageRecord::Analyzed(report) => {
                let passed = report.passed.iter().filter(|&&p| p).count();
                (passed, report.passed.len() - passed)
            }
            ImageRecord::Failed(_) => (0, 1),
        }
    }
}

/// Aggregate pass/fail counts over a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_images: usize,
    pub failed_images: usize,
    pub total_passed: usize,
    pub total_failed: usize,
}

impl RunSummary {
    pub fn from_records(records: &[ImageRecord]) -> Self {
        let mut summary = Self {
            total_images: records.len(),
            failed_images: 0,
            total_passed: 0,
            total_failed: 0,
        };
        for record in records {
            if record.error().is_some() {
                summary.failed_images += 1;
            }
            let (passed, failed) = record.decision_counts();
            summary.total_passed += passed;
            summary.total_failed += failed;
        }
        summary
    }
}

/// Run the inspection stages over an already decoded image.
///
/// This is the pure core: no file system access, no visualization.
pub fn inspect_mat(image: &Mat, config: &PipelineConfig) -> Result<Inspection> {
    let region = if config.crop.enabled {
        RegionExtractor::new(&config.crop, &config.land_sea).extract(image)?
    } else {
        RegionExtractor::full_frame(image)?
    };

    let centerline =
        CenterlineLocator::new(&config.centerline, &config.land_sea).locate(&region.region)?;

    let land_sea = compute_land_sea_ratio(&region.region, &config.land_sea)?;
    let land_decision =
        filter_by_land_sea_ratio(land_sea.ratio, config.land_sea.low, config.land_sea.high);

    let symmetry = symmetry_score_mirror(
        &region.region,
        centerline.center_x,
        config.symmetry.allow_shift_px,
    )?;
    let symmetry_decision = symmetry_pass(symmetry.best_score, config.symmetry.threshold);

    Ok(Inspection {
        region,
        centerline,
        land_sea,
        land_decision,
        symmetry,
        symmetry_decision,
    })
}

/// Inspect a single image file and write its visualization.
pub fn run_one_image(
    img_path: &Path,
    visual_dir: &Path,
    config: &PipelineConfig,
) -> Result<TreadReport> {
    let file_name = img_path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("unknown")
        .to_string();

    let image = load_image_bgr(img_path)?;
    let inspection = inspect_mat(&image, config)?;

    std::fs::create_dir_all(visual_dir).map_err(|e| {
        InspectionError::invalid_input(format!(
            "cannot create visualization directory {}: {}",
            visual_dir.display(),
            e
        ))
    })?;
    let stem = img_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("output");
    let visual_path = visual_dir.join(format!("{}_vis.jpg", stem));
    draw_visualization(
        &image,
        inspection.region.crop_box_xyxy,
        &inspection.region.region,
        inspection.centerline.center_x,
        &inspection.land_sea.mask_land,
        inspection.symmetry.best_shift,
        &visual_path,
    )?;

    Ok(build_report(
        file_name,
        img_path,
        &inspection,
        visual_path.display().to_string(),
    ))
}

fn build_report(
    file_name: String,
    img_path: &Path,
    inspection: &Inspection,
    visual_path: String,
) -> TreadReport {
    TreadReport {
        file_name,
        file_path: img_path.display().to_string(),
        passed: vec![
            inspection.land_decision.passed,
            inspection.symmetry_decision.passed,
        ],
        tdw_crop: CropReport {
            crop_box_xyxy: inspection.region.crop_box_xyxy,
            tdw_size: inspection.region.tdw_size,
        },
        land_sea: LandSeaReport {
            ratio: inspection.land_sea.ratio,
            passed: inspection.land_decision.passed,
            threshold_low: inspection.land_decision.threshold_low,
            threshold_high: inspection.land_decision.threshold_high,
        },
        symmetry: SymmetryReport {
            score: inspection.symmetry.best_score,
            passed: inspection.symmetry_decision.passed,
            threshold: inspection.symmetry_decision.threshold,
            center_x: inspection.centerline.center_x,
            best_shift: inspection.symmetry.best_shift,
            allow_shift_px: inspection.symmetry.allow_shift_px,
        },
        visual_path,
    }
}

/// Process every image under `input_path` sequentially.
///
/// Per-image failures become [`FailedImage`] records; the batch always runs
/// to completion. Only an invalid input path fails the call itself.
pub fn run_batch(
    input_path: &Path,
    visual_dir: &Path,
    config: &PipelineConfig,
) -> Result<Vec<ImageRecord>> {
    let files = list_images(input_path)?;
    let total = files.len();

    let mut records = Vec::with_capacity(total);
    for (index, img_path) in files.iter().enumerate() {
        info!(
            "[{}/{}] processing {}",
            index + 1,
            total,
            img_path.display()
        );
        match run_one_image(img_path, visual_dir, config) {
            Ok(report) => records.push(ImageRecord::Analyzed(report)),
            Err(error) => {
                warn!("{} failed: {}", img_path.display(), error);
                records.push(ImageRecord::Failed(FailedImage {
                    file_name: img_path
                        .file_name()
                        .and_then(|name| name.to_str())
                        .unwrap_or("unknown")
                        .to_string(),
                    file_path: img_path.display().to_string(),
                    passed: false,
                    error: error.to_string(),
                }));
            }
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzed(passed: Vec<bool>) -> ImageRecord {
        ImageRecord::Analyzed(TreadReport {
            file_name: "a.png".into(),
            file_path: "in/a.png".into(),
            passed,
            tdw_crop: CropReport {
                crop_box_xyxy: [0, 0, 10, 10],
                tdw_size: [10, 10],
            },
            land_sea: LandSeaReport {
                ratio: 0.3,
                passed: true,
                threshold_low: 0.2,
                threshold_high: 0.5,
            },
            symmetry: SymmetryReport {
                score: 0.95,
                passed: true,
                threshold: 0.9,
                center_x: 5,
                best_shift: 0,
                allow_shift_px: 20,
            },
            visual_path: "out/a_vis.jpg".into(),
        })
    }

    fn failed() -> ImageRecord {
        ImageRecord::Failed(FailedImage {
            file_name: "b.png".into(),
            file_path: "in/b.png".into(),
            passed: false,
            error: "Failed to load image: corrupt".into(),
        })
    }

    #[test]
    fn test_summary_counts_sub_decisions() {
        let records = vec![
            analyzed(vec![true, true]),
            analyzed(vec![true, false]),
            failed(),
        ];
        let summary = RunSummary::from_records(&records);
        assert_eq!(summary.total_images, 3);
        assert_eq!(summary.failed_images, 1);
        assert_eq!(summary.total_passed, 3);
        assert_eq!(summary.total_failed, 2);
    }

    #[test]
    fn test_record_serialization_shapes() {
        let json = serde_json::to_value(analyzed(vec![true, false])).unwrap();
        assert_eq!(json["passed"], serde_json::json!([true, false]));
        assert_eq!(json["tdw_crop"]["crop_box_xyxy"], serde_json::json!([0, 0, 10, 10]));
        assert_eq!(json["symmetry"]["center_x"], serde_json::json!(5));
        assert!(json.get("error").is_none());

        let json = serde_json::to_value(failed()).unwrap();
        assert_eq!(json["passed"], serde_json::json!(false));
        assert!(json["error"].as_str().unwrap().contains("corrupt"));
    }

    #[test]
    fn test_record_accessors() {
        assert_eq!(analyzed(vec![true, true]).error(), None);
        assert!(failed().error().is_some());
        assert_eq!(failed().file_name(), "b.png");
        assert_eq!(analyzed(vec![true, false]).decision_counts(), (1, 1));
        assert_eq!(failed().decision_counts(), (0, 1));
    }
}
