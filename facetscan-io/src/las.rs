//! LAS/LAZ format support
//!
//! Reads LiDAR point clouds through the `las` crate; LAZ decompression is
//! enabled via its `laz` feature.

use crate::PointCloudReader;
use facetscan_core::{Error, Point3f, PointCloud, Result};
use las::Read as LasRead;
use std::path::Path;

pub struct LasReader;

impl PointCloudReader for LasReader {
    fn read_point_cloud<P: AsRef<Path>>(path: P) -> Result<PointCloud<Point3f>> {
        let path = path.as_ref();
        let mut reader = las::Reader::from_path(path).map_err(|e| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("failed to open LAS file {:?}: {}", path, e),
            ))
        })?;

        let mut cloud = PointCloud::with_capacity(reader.header().number_of_points() as usize);

        for point in reader.points() {
            let point = point.map_err(|e| {
                Error::InvalidData(format!("failed to read LAS point: {}", e))
            })?;
            cloud.push(Point3f::new(point.x as f32, point.y as f32, point.z as f32));
        }

        Ok(cloud)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use las::Write as LasWrite;
    use std::fs;

    fn write_sample_las(path: &str, points: &[[f64; 3]]) {
        let mut builder = las::Builder::from((1, 2));
        builder.point_format = las::point::Format::new(0).unwrap();
        let header = builder.into_header().unwrap();
        let mut writer = las::Writer::from_path(path, header).unwrap();

        for coords in points {
            let point = las::Point {
                x: coords[0],
                y: coords[1],
                z: coords[2],
                ..Default::default()
            };
            writer.write(point).unwrap();
        }
    }

    #[test]
    fn test_read_las_roundtrip() {
        let temp_file = "test_las_roundtrip.las";
        write_sample_las(
            temp_file,
            &[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]],
        );

        let cloud = LasReader::read_point_cloud(temp_file).unwrap();
        assert_eq!(cloud.len(), 3);
        // LAS scales coordinates; default scale keeps centimeter precision
        assert!((cloud[0].x - 1.0).abs() < 0.01);
        assert!((cloud[0].y - 2.0).abs() < 0.01);
        assert!((cloud[0].z - 3.0).abs() < 0.01);
        assert!((cloud[2].x - 7.0).abs() < 0.01);

        let _ = fs::remove_file(temp_file);
    }

    #[test]
    fn test_read_las_nonexistent() {
        let result = LasReader::read_point_cloud("no_such_file_12345.las");
        assert!(result.is_err());
    }
}
