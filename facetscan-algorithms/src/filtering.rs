//! Filtering algorithms

use crate::nearest_neighbor::KdTreeSearch;
use facetscan_core::{Error, NearestNeighborSearch, Point3f, PointCloud, Result};
use rayon::prelude::*;
use std::collections::HashMap;

#[derive(Default, Clone, Copy)]
struct VoxelAccum {
    sx: f32,
    sy: f32,
    sz: f32,
    n: usize,
}

/// Statistical outlier removal filter
///
/// For each point, computes the mean distance to its k nearest neighbors.
/// Points whose mean distance exceeds the global mean by more than
/// `std_ratio` standard deviations are removed.
///
/// # Arguments
/// * `cloud` - Input point cloud
/// * `k_neighbors` - Number of nearest neighbors to consider for each point
/// * `std_ratio` - Standard deviation multiplier for the rejection threshold
///
/// # Returns
/// * `Result<PointCloud<Point3f>>` - Filtered point cloud with outliers removed
pub fn statistical_outlier_removal(
    cloud: &PointCloud<Point3f>,
    k_neighbors: usize,
    std_ratio: f32,
) -> Result<PointCloud<Point3f>> {
    if k_neighbors == 0 {
        return Err(Error::InvalidData(
            "k_neighbors must be greater than 0".to_string(),
        ));
    }

    if !(std_ratio.is_finite() && std_ratio > 0.0) {
        return Err(Error::InvalidData(
            "std_ratio must be positive and finite".to_string(),
        ));
    }

    if cloud.is_empty() {
        return Ok(PointCloud::new());
    }

    let nn_search = KdTreeSearch::new(&cloud.points);

    // Mean distance to the k nearest neighbors, excluding the point itself
    let mean_distances: Vec<f32> = cloud
        .points
        .par_iter()
        .enumerate()
        .map(|(i, point)| {
            let neighbors = nn_search.find_k_nearest(point, k_neighbors + 1);
            let distances: Vec<f32> = neighbors
                .iter()
                .filter(|(idx, _)| *idx != i)
                .map(|(_, distance)| *distance)
                .collect();

            if distances.is_empty() {
                return 0.0;
            }

            distances.iter().sum::<f32>() / distances.len() as f32
        })
        .collect();

    let global_mean = mean_distances.iter().sum::<f32>() / mean_distances.len() as f32;

    let variance = mean_distances
        .iter()
        .map(|&d| (d - global_mean).powi(2))
        .sum::<f32>()
        / mean_distances.len() as f32;

    let threshold = global_mean + std_ratio * variance.sqrt();

    let filtered_points: Vec<Point3f> = cloud
        .points
        .iter()
        .zip(mean_distances.iter())
        .filter(|(_, &mean_dist)| mean_dist <= threshold)
        .map(|(point, _)| *point)
        .collect();

    Ok(PointCloud::from_points(filtered_points))
}

/// Voxel grid downsampling
///
/// Partitions space into a uniform grid of cubic voxels of edge length
/// `voxel_size` and replaces the points in each occupied voxel with their
/// centroid. The output never has more points than the input.
///
/// # Arguments
/// * `cloud` - Input point cloud
/// * `voxel_size` - Edge length of each voxel cube
///
/// # Returns
/// * `Result<PointCloud<Point3f>>` - Downsampled point cloud
pub fn voxel_downsample(
    cloud: &PointCloud<Point3f>,
    voxel_size: f32,
) -> Result<PointCloud<Point3f>> {
    if !(voxel_size.is_finite() && voxel_size > 0.0) {
        return Err(Error::InvalidData(
            "voxel_size must be positive and finite".to_string(),
        ));
    }

    if cloud.is_empty() {
        return Ok(PointCloud::new());
    }

    let mut bins: HashMap<(i32, i32, i32), VoxelAccum> = HashMap::new();

    for point in &cloud.points {
        if !point.x.is_finite() || !point.y.is_finite() || !point.z.is_finite() {
            continue;
        }

        let key = (
            (point.x / voxel_size).floor() as i32,
            (point.y / voxel_size).floor() as i32,
            (point.z / voxel_size).floor() as i32,
        );

        let entry = bins.entry(key).or_default();
        entry.sx += point.x;
        entry.sy += point.y;
        entry.sz += point.z;
        entry.n += 1;
    }

    // Sorted key order keeps the output deterministic
    let mut keys: Vec<(i32, i32, i32)> = bins.keys().copied().collect();
    keys.sort_unstable();

    let mut points = Vec::with_capacity(keys.len());
    for key in keys {
        let accum = bins[&key];
        let denom = accum.n as f32;
        points.push(Point3f::new(
            accum.sx / denom,
            accum.sy / denom,
            accum.sz / denom,
        ));
    }

    Ok(PointCloud::from_points(points))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statistical_outlier_removal_empty_cloud() {
        let cloud = PointCloud::<Point3f>::new();
        let result = statistical_outlier_removal(&cloud, 5, 1.0);
        assert!(result.is_ok());
        assert_eq!(result.unwrap().len(), 0);
    }

    #[test]
    fn test_statistical_outlier_removal_with_outliers() {
        // Dense cluster plus a few distant points
        let mut points = Vec::new();
        for i in 0..10 {
            for j in 0..10 {
                for k in 0..10 {
                    points.push(Point3f::new(i as f32 * 0.1, j as f32 * 0.1, k as f32 * 0.1));
                }
            }
        }
        points.push(Point3f::new(10.0, 10.0, 10.0));
        points.push(Point3f::new(-10.0, -10.0, -10.0));

        let cloud = PointCloud::from_points(points);
        let original_count = cloud.len();

        let filtered = statistical_outlier_removal(&cloud, 5, 1.0).unwrap();
        assert!(filtered.len() < original_count);
        assert!(!filtered.is_empty());

        let has_far_point = filtered
            .iter()
            .any(|p| p.x.abs() > 5.0 || p.y.abs() > 5.0 || p.z.abs() > 5.0);
        assert!(!has_far_point, "outliers should have been removed");
    }

    #[test]
    fn test_statistical_outlier_removal_uniform_cloud() {
        let mut points = Vec::new();
        for i in 0..5 {
            for j in 0..5 {
                for k in 0..5 {
                    points.push(Point3f::new(i as f32 * 0.1, j as f32 * 0.1, k as f32 * 0.1));
                }
            }
        }

        let cloud = PointCloud::from_points(points);
        let original_count = cloud.len();

        let filtered = statistical_outlier_removal(&cloud, 5, 1.0).unwrap();
        // A uniform cloud has no real outliers
        assert!(filtered.len() > original_count * 8 / 10);
    }

    #[test]
    fn test_statistical_outlier_removal_invalid_parameters() {
        let cloud = PointCloud::from_points(vec![Point3f::origin()]);

        assert!(statistical_outlier_removal(&cloud, 0, 1.0).is_err());
        assert!(statistical_outlier_removal(&cloud, 5, 0.0).is_err());
        assert!(statistical_outlier_removal(&cloud, 5, -1.0).is_err());
        assert!(statistical_outlier_removal(&cloud, 5, f32::NAN).is_err());
    }

    #[test]
    fn test_voxel_downsample_empty_cloud() {
        let cloud = PointCloud::<Point3f>::new();
        let result = voxel_downsample(&cloud, 0.1);
        assert!(result.is_ok());
        assert_eq!(result.unwrap().len(), 0);
    }

    #[test]
    fn test_voxel_downsample_averages_voxel_members() {
        // All eight points fall into a single voxel of edge 1.0
        let cloud = PointCloud::from_points(vec![
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(0.5, 0.0, 0.0),
            Point3f::new(0.0, 0.5, 0.0),
            Point3f::new(0.5, 0.5, 0.0),
            Point3f::new(0.0, 0.0, 0.5),
            Point3f::new(0.5, 0.0, 0.5),
            Point3f::new(0.0, 0.5, 0.5),
            Point3f::new(0.5, 0.5, 0.5),
        ]);

        let out = voxel_downsample(&cloud, 1.0).unwrap();
        assert_eq!(out.len(), 1);
        assert!((out[0].x - 0.25).abs() < 1e-6);
        assert!((out[0].y - 0.25).abs() < 1e-6);
        assert!((out[0].z - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_voxel_downsample_never_increases_count() {
        let mut points = Vec::new();
        for i in 0..20 {
            for j in 0..20 {
                points.push(Point3f::new(i as f32 * 0.07, j as f32 * 0.07, 0.0));
            }
        }
        let cloud = PointCloud::from_points(points);

        for voxel_size in [0.05, 0.1, 0.5, 2.0] {
            let out = voxel_downsample(&cloud, voxel_size).unwrap();
            assert!(out.len() <= cloud.len());
        }
    }

    #[test]
    fn test_voxel_downsample_single_point() {
        let cloud = PointCloud::from_points(vec![Point3f::new(1.0, 2.0, 3.0)]);
        let out = voxel_downsample(&cloud, 1.0).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0], Point3f::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_voxel_downsample_invalid_voxel_size() {
        let cloud = PointCloud::from_points(vec![Point3f::origin()]);
        assert!(voxel_downsample(&cloud, 0.0).is_err());
        assert!(voxel_downsample(&cloud, -1.0).is_err());
        assert!(voxel_downsample(&cloud, f32::NAN).is_err());
    }
}
