//! # Facetscan Pipeline
//!
//! End-to-end building plane extraction: load a LiDAR cloud, remove
//! statistical outliers, downsample, crop to a footprint, strip the ground,
//! extract planes via iterative RANSAC and classify them as roofs or walls.
//!
//! The stages run strictly in sequence; each consumes the previous stage's
//! output cloud. All parameters are caller-supplied through
//! [`PipelineParams`]; invalid numeric parameters and unreadable input files
//! are fatal to the run.

pub mod params;
pub mod extractor;

pub use params::*;
pub use extractor::*;
