//! Quality metrics over an extracted tread region
//!
//! Land-sea ratio estimation and mirror-symmetry scoring. Both consume the
//! region produced by detection and are independent of each other.

pub mod land_sea;
pub mod symmetry;

pub use land_sea::{compute_land_sea_ratio, filter_by_land_sea_ratio, LandSeaDecision, LandSeaResult};
pub use symmetry::{symmetry_pass, symmetry_score_mirror, SymmetryDecision, SymmetryResult};
