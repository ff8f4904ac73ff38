//! Core data structures and traits for facetscan
//!
//! This crate provides the fundamental types shared by the facetscan pipeline:
//! points, point clouds, the workspace error type, and essential traits.

pub mod point;
pub mod point_cloud;
pub mod traits;
pub mod error;

pub use point::*;
pub use point_cloud::*;
pub use traits::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3, Vector4, Matrix4};

/// Common result type for facetscan operations
pub type Result<T> = std::result::Result<T, Error>;

// Type alias for easier imports
pub type Point = Point3f;
