//! Image loading and input enumeration
//!
//! Decodes image files with the `image` crate and converts them to OpenCV
//! Mats in BGR format for consistent downstream processing. Directory inputs
//! expand to every file matching the supported extension set, in sorted
//! order, so batch runs are deterministic.

use crate::error::{InspectionError, Result};
use opencv::core::Mat;
use opencv::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

/// File extensions accepted as batch input
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tif", "tiff", "webp"];

/// Check if a file extension is supported
pub fn is_supported_extension(ext: &str) -> bool {
    let ext_lower = ext.to_lowercase();
    IMAGE_EXTENSIONS.contains(&ext_lower.as_str())
}

/// Expand an input path into the list of images to process.
///
/// A file path yields a single-element list; a directory yields every file
/// with a supported extension, sorted by path. Anything else is rejected.
pub fn list_images(input_path: &Path) -> Result<Vec<PathBuf>> {
    if input_path.is_file() {
        return Ok(vec![input_path.to_path_buf()]);
    }

    if !input_path.is_dir() {
        return Err(InspectionError::invalid_input(format!(
            "input path does not exist: {}",
            input_path.display()
        )));
    }

    let entries = fs::read_dir(input_path).map_err(|e| {
        InspectionError::invalid_input(format!(
            "cannot read directory {}: {}",
            input_path.display(),
            e
        ))
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| {
            InspectionError::invalid_input(format!(
                "cannot read directory entry in {}: {}",
                input_path.display(),
                e
            ))
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let supported = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(is_supported_extension);
        if supported {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Load an image from disk and convert to an OpenCV Mat (BGR format).
///
/// # Errors
///
/// Returns [`InspectionError::ImageLoad`] if the file cannot be opened or
/// decoded.
pub fn load_image_bgr(path: &Path) -> Result<Mat> {
    use image::ImageReader;

    let reader = ImageReader::open(path).map_err(|e| {
        InspectionError::image_load(format!("failed to open image file: {}", path.display()), e)
    })?;

    let img = reader.decode().map_err(|e| {
        InspectionError::image_load(format!("failed to decode image: {}", path.display()), e)
    })?;

    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    if width == 0 || height == 0 {
        return Err(InspectionError::ImageLoad {
            message: format!("image has zero dimension: {}", path.display()),
            source: None,
        });
    }

    rgb_to_bgr_mat(&rgb.into_raw(), width as i32, height as i32)
}

/// Convert an interleaved RGB byte buffer to an OpenCV BGR Mat
fn rgb_to_bgr_mat(rgb_data: &[u8], width: i32, height: i32) -> Result<Mat> {
    let mut bgr = rgb_data.to_vec();
    for px in bgr.chunks_exact_mut(3) {
        px.swap(0, 2);
    }

    let flat = Mat::from_slice(&bgr)
        .map_err(|e| InspectionError::opencv("Mat creation from buffer", e))?;
    let shaped = flat
        .reshape(3, height)
        .map_err(|e| InspectionError::opencv("Mat reshape", e))?;
    debug_assert_eq!(shaped.cols(), width);
    shaped
        .try_clone()
        .map_err(|e| InspectionError::opencv("Mat clone", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::Vec3b;

    #[test]
    fn test_supported_extensions() {
        assert!(is_supported_extension("jpg"));
        assert!(is_supported_extension("JPEG"));
        assert!(is_supported_extension("png"));
        assert!(is_supported_extension("TIF"));
        assert!(is_supported_extension("webp"));
        assert!(!is_supported_extension("heic"));
        assert!(!is_supported_extension("txt"));
    }

    #[test]
    fn test_list_images_rejects_missing_path() {
        let result = list_images(Path::new("definitely/not/a/real/path"));
        assert!(matches!(
            result,
            Err(InspectionError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_rgb_to_bgr_conversion() {
        // 2x2 image: red, green, blue, white
        let rgb_data = vec![
            255, 0, 0, // red
            0, 255, 0, // green
            0, 0, 255, // blue
            255, 255, 255, // white
        ];

        let mat = rgb_to_bgr_mat(&rgb_data, 2, 2).unwrap();
        assert_eq!(mat.rows(), 2);
        assert_eq!(mat.cols(), 2);

        let px: &Vec3b = mat.at_2d(0, 0).unwrap();
        assert_eq!((px[0], px[1], px[2]), (0, 0, 255)); // B, G, R

        let px: &Vec3b = mat.at_2d(0, 1).unwrap();
        assert_eq!((px[0], px[1], px[2]), (0, 255, 0));

        let px: &Vec3b = mat.at_2d(1, 0).unwrap();
        assert_eq!((px[0], px[1], px[2]), (255, 0, 0));

        let px: &Vec3b = mat.at_2d(1, 1).unwrap();
        assert_eq!((px[0], px[1], px[2]), (255, 255, 255));
    }
}
