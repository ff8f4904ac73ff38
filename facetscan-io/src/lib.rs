//! Point cloud file I/O
//!
//! This crate reads LiDAR point clouds from LAS/LAZ files and reads/writes
//! PLY files, including colored PLY export of classified clouds.

pub mod las;
pub mod ply;

pub use ply::PlyWriteOptions;

use facetscan_core::{ColoredPoint3f, Error, Point3f, PointCloud, Result};
use std::path::Path;

/// Trait for reading point clouds from files
pub trait PointCloudReader {
    fn read_point_cloud<P: AsRef<Path>>(path: P) -> Result<PointCloud<Point3f>>;
}

/// Trait for writing point clouds to files
pub trait PointCloudWriter {
    fn write_point_cloud<P: AsRef<Path>>(cloud: &PointCloud<Point3f>, path: P) -> Result<()>;
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase())
}

/// Auto-detect format and read a point cloud
pub fn read_point_cloud<P: AsRef<Path>>(path: P) -> Result<PointCloud<Point3f>> {
    let path = path.as_ref();
    match extension_of(path).as_deref() {
        Some("las") | Some("laz") => las::LasReader::read_point_cloud(path),
        Some("ply") => ply::PlyReader::read_point_cloud(path),
        _ => Err(Error::UnsupportedFormat(format!(
            "Unsupported point cloud format: {:?}",
            path.extension()
        ))),
    }
}

/// Auto-detect format and write a point cloud
pub fn write_point_cloud<P: AsRef<Path>>(cloud: &PointCloud<Point3f>, path: P) -> Result<()> {
    let path = path.as_ref();
    match extension_of(path).as_deref() {
        Some("ply") => ply::PlyWriter::write_point_cloud(cloud, path),
        _ => Err(Error::UnsupportedFormat(format!(
            "Unsupported point cloud output format: {:?}",
            path.extension()
        ))),
    }
}

/// Write a colored point cloud; only PLY carries colors
pub fn write_colored_point_cloud<P: AsRef<Path>>(
    cloud: &PointCloud<ColoredPoint3f>,
    path: P,
) -> Result<()> {
    let path = path.as_ref();
    match extension_of(path).as_deref() {
        Some("ply") => ply::PlyWriter::write_colored_point_cloud(cloud, path),
        _ => Err(Error::UnsupportedFormat(format!(
            "Unsupported colored point cloud output format: {:?}",
            path.extension()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_ply_point_cloud_roundtrip() {
        let temp_file = "test_io_roundtrip.ply";

        let mut cloud = PointCloud::new();
        cloud.push(Point3f::new(0.0, 0.0, 0.0));
        cloud.push(Point3f::new(1.0, 0.0, 0.0));
        cloud.push(Point3f::new(0.0, 1.0, 0.0));

        write_point_cloud(&cloud, temp_file).unwrap();
        let loaded_cloud = read_point_cloud(temp_file).unwrap();

        assert_eq!(cloud.len(), loaded_cloud.len());
        for (original, loaded) in cloud.iter().zip(loaded_cloud.iter()) {
            assert!((original.x - loaded.x).abs() < 1e-6);
            assert!((original.y - loaded.y).abs() < 1e-6);
            assert!((original.z - loaded.z).abs() < 1e-6);
        }

        let _ = fs::remove_file(temp_file);
    }

    #[test]
    fn test_unsupported_format() {
        let result = read_point_cloud("test.xyz");
        assert!(result.is_err());

        let cloud = PointCloud::from_points(vec![Point3f::origin()]);
        let result = write_point_cloud(&cloud, "test.obj");
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file() {
        let result = read_point_cloud("does_not_exist_anywhere.las");
        assert!(result.is_err());
    }
}
