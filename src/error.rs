//! Error types for the scan_treads library

use thiserror::Error;

/// Result type alias for scan_treads operations
pub type Result<T> = std::result::Result<T, InspectionError>;

/// Failure kinds produced by the tread inspection pipeline
#[derive(Error, Debug)]
pub enum InspectionError {
    /// Image file could not be loaded or decoded
    #[error("Failed to load image: {message}")]
    ImageLoad {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Region extraction found zero contours in the closed pattern mask
    #[error("No tread pattern found: {reason}")]
    NoPatternFound { reason: String },

    /// Largest contour area below the configured fraction of total image area
    #[error(
        "Tread region too small: largest contour {max_area:.0} px of {image_area} px image \
         (minimum ratio {min_ratio})"
    )]
    RegionTooSmall {
        max_area: f64,
        image_area: i64,
        min_ratio: f64,
    },

    /// Every shift candidate in the symmetry search produced an empty strip
    #[error("Symmetry undefined: no shift candidate yielded a comparable strip pair")]
    UndefinedSymmetry,

    /// Input path is missing, unreadable, or not an image source
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// OpenCV operation failed
    #[error("OpenCV error during {operation}")]
    OpenCv {
        operation: String,
        #[source]
        source: opencv::Error,
    },
}

impl InspectionError {
    /// Create an image load error with context
    pub fn image_load<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ImageLoad {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create an OpenCV error with context
    pub fn opencv(operation: impl Into<String>, source: opencv::Error) -> Self {
        Self::OpenCv {
            operation: operation.into(),
            source,
        }
    }

    /// Content-based classification failures: deterministic for a given image,
    /// recorded per image by the batch loop and never retried.
    pub fn is_content_failure(&self) -> bool {
        matches!(
            self,
            InspectionError::NoPatternFound { .. }
                | InspectionError::RegionTooSmall { .. }
                | InspectionError::UndefinedSymmetry
        )
    }

    /// Get user-friendly error description for application display
    pub fn user_message(&self) -> String {
        match self {
            InspectionError::ImageLoad { .. } => {
                "Could not load the image. Please check the file format and try again.".to_string()
            }
            InspectionError::NoPatternFound { .. } => {
                "No tread pattern was detected. Please ensure the photo shows the tread on a light background.".to_string()
            }
            InspectionError::RegionTooSmall { .. } => {
                "The detected tread region is too small to inspect. Please retake the photo closer to the tread.".to_string()
            }
            InspectionError::UndefinedSymmetry => {
                "The tread region is too narrow to evaluate symmetry.".to_string()
            }
            _ => "Tread inspection failed. Please try with a different image.".to_string(),
        }
    }
}
