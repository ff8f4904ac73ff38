//! # Facetscan Algorithms
//!
//! Point cloud processing algorithms for the facetscan pipeline: outlier
//! filtering, voxel downsampling, footprint cropping, RANSAC plane
//! segmentation and roof/wall classification.

pub mod filtering;
pub mod cropping;
pub mod nearest_neighbor;
pub mod segmentation;
pub mod classification;

// Re-export commonly used items
pub use filtering::*;
pub use cropping::*;
pub use nearest_neighbor::*;
pub use segmentation::*;
pub use classification::*;
