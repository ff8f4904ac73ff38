//! Visualization for facetscan classification results
//!
//! This crate renders point clouds in an interactive window using wgpu and
//! winit: orbit/pan/zoom camera, per-vertex colors, and fixed per-class
//! colors for classified planes (walls blue, roofs red).

pub mod camera;
pub mod renderer;
pub mod viewer;

pub use camera::*;
pub use renderer::*;
pub use viewer::*;

use facetscan_algorithms::{colorize_planes, ClassifiedPlane};
use facetscan_core::{ColoredPoint3f, Point3f, PointCloud, Result};

/// Show a point cloud in an interactive viewer with a uniform color
pub fn show_point_cloud(cloud: &PointCloud<Point3f>) -> Result<()> {
    let mut viewer = Viewer::new()?;
    viewer.set_point_cloud(cloud);
    viewer.run()
}

/// Show a colored point cloud in an interactive viewer
pub fn show_colored_point_cloud(cloud: &PointCloud<ColoredPoint3f>) -> Result<()> {
    let mut viewer = Viewer::new()?;
    viewer.set_colored_point_cloud(cloud);
    viewer.run()
}

/// Show classified planes with their class colors (walls blue, roofs red)
pub fn show_classified(planes: &[ClassifiedPlane]) -> Result<()> {
    show_colored_point_cloud(&colorize_planes(planes))
}
