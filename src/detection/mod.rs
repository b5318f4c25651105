//! Region and centerline detection
//!
//! Computer vision stages that locate the tread-pattern region within a
//! photograph and the structural centerline within that region.

pub mod centerline;
pub mod region;

pub use centerline::{CenterlineLocator, CenterlineResult};
pub use region::{RegionDetection, RegionExtractor};
