//! RANSAC plane segmentation

use facetscan_core::{Error, Point3f, PointCloud, Result, Vector3f};
use nalgebra::Vector4;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// A 3D plane model defined by the equation ax + by + cz + d = 0
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneModel {
    /// Plane coefficients [a, b, c, d] where ax + by + cz + d = 0
    pub coefficients: Vector4<f32>,
}

impl PlaneModel {
    /// Create a new plane model from coefficients
    pub fn new(a: f32, b: f32, c: f32, d: f32) -> Self {
        Self {
            coefficients: Vector4::new(a, b, c, d),
        }
    }

    /// Create a plane model from three points
    ///
    /// Returns `None` if the points are collinear.
    pub fn from_points(p1: &Point3f, p2: &Point3f, p3: &Point3f) -> Option<Self> {
        let v1 = p2 - p1;
        let v2 = p3 - p1;

        let normal = v1.cross(&v2);

        if normal.magnitude() < 1e-8 {
            return None;
        }

        let normal = normal.normalize();
        let d = -normal.dot(&p1.coords);

        Some(PlaneModel::new(normal.x, normal.y, normal.z, d))
    }

    /// Get the (unnormalized) normal vector of the plane
    pub fn normal(&self) -> Vector3f {
        Vector3f::new(
            self.coefficients.x,
            self.coefficients.y,
            self.coefficients.z,
        )
    }

    /// Get the unit normal vector of the plane
    ///
    /// Degenerate models (zero normal) yield the zero vector.
    pub fn unit_normal(&self) -> Vector3f {
        let normal = self.normal();
        let magnitude = normal.magnitude();

        if magnitude < 1e-8 {
            return Vector3f::zeros();
        }

        normal / magnitude
    }

    /// Calculate the distance from a point to the plane
    pub fn distance_to_point(&self, point: &Point3f) -> f32 {
        let normal_magnitude = self.normal().magnitude();

        if normal_magnitude < 1e-8 {
            return f32::INFINITY;
        }

        (self.coefficients.x * point.x
            + self.coefficients.y * point.y
            + self.coefficients.z * point.z
            + self.coefficients.w)
            .abs()
            / normal_magnitude
    }

    /// Count inliers within a distance threshold
    pub fn count_inliers(&self, points: &[Point3f], threshold: f32) -> usize {
        points
            .iter()
            .filter(|point| self.distance_to_point(point) <= threshold)
            .count()
    }

    /// Get indices of inlier points within a distance threshold
    pub fn get_inliers(&self, points: &[Point3f], threshold: f32) -> Vec<usize> {
        points
            .iter()
            .enumerate()
            .filter(|(_, point)| self.distance_to_point(point) <= threshold)
            .map(|(i, _)| i)
            .collect()
    }
}

/// RANSAC plane segmentation result
#[derive(Debug, Clone)]
pub struct PlaneSegmentationResult {
    /// The best plane model found
    pub model: PlaneModel,
    /// Indices of inlier points
    pub inliers: Vec<usize>,
    /// Number of RANSAC iterations performed
    pub iterations: usize,
}

/// A plane extracted from a cloud together with its inlier points
#[derive(Debug, Clone)]
pub struct DetectedPlane {
    pub model: PlaneModel,
    pub points: PointCloud<Point3f>,
}

impl DetectedPlane {
    /// Number of inlier points supporting the plane
    pub fn inlier_count(&self) -> usize {
        self.points.len()
    }

    /// Centroid of the inlier points
    pub fn centroid(&self) -> Point3f {
        if self.points.is_empty() {
            return Point3f::origin();
        }

        let mut sum = Vector3f::zeros();
        for point in &self.points {
            sum += point.coords;
        }
        Point3f::from(sum / self.points.len() as f32)
    }

    /// Mean z of the inlier points
    pub fn mean_height(&self) -> f32 {
        self.centroid().z
    }

    /// Lowest inlier z
    pub fn min_height(&self) -> f32 {
        self.points
            .iter()
            .map(|p| p.z)
            .fold(f32::INFINITY, f32::min)
    }

    /// Highest inlier z
    pub fn max_height(&self) -> f32 {
        self.points
            .iter()
            .map(|p| p.z)
            .fold(f32::NEG_INFINITY, f32::max)
    }
}

/// Parameters for iterative RANSAC plane extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RansacParams {
    /// Maximum distance for a point to be counted as an inlier
    pub distance_threshold: f32,
    /// RANSAC iterations per extracted plane
    pub iterations: usize,
    /// Minimum inlier count for a plane to be kept; extraction stops when the
    /// best remaining plane falls below this
    pub min_inliers: usize,
    /// Maximum number of planes to extract
    pub max_planes: usize,
    /// Merge a new plane into an existing one when the absolute dot product
    /// of their unit normals exceeds this value ...
    pub merge_normal_dot: f32,
    /// ... and their centroids are closer than this distance
    pub merge_centroid_dist: f32,
    /// Seed for the random number generator; `None` draws a fresh seed
    pub seed: Option<u64>,
}

impl Default for RansacParams {
    fn default() -> Self {
        Self {
            distance_threshold: 0.1,
            iterations: 1000,
            min_inliers: 500,
            max_planes: 20,
            merge_normal_dot: 0.95,
            merge_centroid_dist: 5.0,
            seed: None,
        }
    }
}

impl RansacParams {
    /// Check the parameter set for invalid values
    pub fn validate(&self) -> Result<()> {
        if !(self.distance_threshold.is_finite() && self.distance_threshold > 0.0) {
            return Err(Error::InvalidData(
                "distance_threshold must be positive and finite".to_string(),
            ));
        }
        if self.iterations == 0 {
            return Err(Error::InvalidData(
                "iterations must be positive".to_string(),
            ));
        }
        if self.min_inliers < 3 {
            return Err(Error::InvalidData(
                "min_inliers must be at least 3".to_string(),
            ));
        }
        if self.max_planes == 0 {
            return Err(Error::InvalidData(
                "max_planes must be positive".to_string(),
            ));
        }
        if !(self.merge_normal_dot > 0.0 && self.merge_normal_dot <= 1.0) {
            return Err(Error::InvalidData(
                "merge_normal_dot must be in (0, 1]".to_string(),
            ));
        }
        if !(self.merge_centroid_dist.is_finite() && self.merge_centroid_dist > 0.0) {
            return Err(Error::InvalidData(
                "merge_centroid_dist must be positive and finite".to_string(),
            ));
        }
        Ok(())
    }
}

fn check_segmentation_inputs(
    cloud: &PointCloud<Point3f>,
    threshold: f32,
    max_iters: usize,
) -> Result<()> {
    if cloud.len() < 3 {
        return Err(Error::InvalidData(
            "Need at least 3 points for plane segmentation".to_string(),
        ));
    }
    if !(threshold.is_finite() && threshold > 0.0) {
        return Err(Error::InvalidData(
            "Threshold must be positive".to_string(),
        ));
    }
    if max_iters == 0 {
        return Err(Error::InvalidData(
            "Max iterations must be positive".to_string(),
        ));
    }
    Ok(())
}

/// Sample 3 distinct indices in [0, n)
fn sample_three_distinct<R: Rng>(n: usize, rng: &mut R) -> (usize, usize, usize) {
    let i0 = rng.gen_range(0..n);
    let mut i1 = rng.gen_range(0..n);
    while i1 == i0 {
        i1 = rng.gen_range(0..n);
    }
    let mut i2 = rng.gen_range(0..n);
    while i2 == i0 || i2 == i1 {
        i2 = rng.gen_range(0..n);
    }
    (i0, i1, i2)
}

/// Plane segmentation using RANSAC with a caller-supplied seed
///
/// Identical to [`segment_plane`] but reproducible: the same cloud, the same
/// parameters and the same seed always yield the same plane.
pub fn segment_plane_seeded(
    cloud: &PointCloud<Point3f>,
    threshold: f32,
    max_iters: usize,
    seed: u64,
) -> Result<PlaneSegmentationResult> {
    check_segmentation_inputs(cloud, threshold, max_iters)?;

    let points = &cloud.points;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut best_model: Option<PlaneModel> = None;
    let mut best_score = 0;

    for _iteration in 0..max_iters {
        let (i0, i1, i2) = sample_three_distinct(points.len(), &mut rng);

        if let Some(model) = PlaneModel::from_points(&points[i0], &points[i1], &points[i2]) {
            let inlier_count = model.count_inliers(points, threshold);

            if inlier_count > best_score {
                best_score = inlier_count;
                best_model = Some(model);
            }
        }
    }

    match best_model {
        Some(model) => {
            let inliers = model.get_inliers(points, threshold);
            Ok(PlaneSegmentationResult {
                model,
                inliers,
                iterations: max_iters,
            })
        }
        None => Err(Error::Algorithm(
            "Failed to find valid plane model".to_string(),
        )),
    }
}

/// Plane segmentation using the RANSAC algorithm
///
/// Finds the plane that fits the most points in the cloud: randomly sample
/// minimal point triples, fit a candidate plane, count inliers within the
/// distance threshold, keep the best candidate over `max_iters` iterations.
///
/// # Arguments
/// * `cloud` - Input point cloud
/// * `threshold` - Maximum distance for a point to be considered an inlier
/// * `max_iters` - Number of RANSAC iterations
///
/// # Returns
/// * `Result<PlaneSegmentationResult>` - The best plane model and inlier indices
pub fn segment_plane(
    cloud: &PointCloud<Point3f>,
    threshold: f32,
    max_iters: usize,
) -> Result<PlaneSegmentationResult> {
    segment_plane_seeded(cloud, threshold, max_iters, rand::thread_rng().next_u64())
}

/// Parallel RANSAC plane segmentation for large point clouds
///
/// Runs the candidate evaluations in parallel; the result is equivalent to
/// [`segment_plane`] up to RANSAC's randomness.
pub fn segment_plane_parallel(
    cloud: &PointCloud<Point3f>,
    threshold: f32,
    max_iters: usize,
) -> Result<PlaneSegmentationResult> {
    check_segmentation_inputs(cloud, threshold, max_iters)?;

    let points = &cloud.points;

    let best = (0..max_iters)
        .into_par_iter()
        .filter_map(|_| {
            let mut rng = rand::thread_rng();
            let (i0, i1, i2) = sample_three_distinct(points.len(), &mut rng);

            PlaneModel::from_points(&points[i0], &points[i1], &points[i2]).map(|model| {
                let score = model.count_inliers(points, threshold);
                (model, score)
            })
        })
        .reduce_with(|a, b| if a.1 >= b.1 { a } else { b });

    match best {
        Some((model, _)) => {
            let inliers = model.get_inliers(points, threshold);
            Ok(PlaneSegmentationResult {
                model,
                inliers,
                iterations: max_iters,
            })
        }
        None => Err(Error::Algorithm(
            "Failed to find valid plane model".to_string(),
        )),
    }
}

/// Merge a plane into a sufficiently similar existing one, or append it
fn merge_or_push(planes: &mut Vec<DetectedPlane>, plane: DetectedPlane, params: &RansacParams) {
    for existing in planes.iter_mut() {
        let normal_dot = existing
            .model
            .unit_normal()
            .dot(&plane.model.unit_normal())
            .abs();
        let centroid_dist = (existing.centroid() - plane.centroid()).norm();

        if normal_dot > params.merge_normal_dot && centroid_dist < params.merge_centroid_dist {
            existing.points.extend(plane.points.iter().copied());
            return;
        }
    }

    planes.push(plane);
}

/// Iterative dominant-plane extraction
///
/// Repeatedly runs RANSAC on the working set, removes the inliers of the best
/// plane and records it, until the best plane has fewer than
/// `params.min_inliers` inliers, too few points remain, or
/// `params.max_planes` planes were extracted. Newly found planes that closely
/// match an existing one (near-parallel normals, nearby centroids) are merged
/// into it.
///
/// # Arguments
/// * `cloud` - Input point cloud
/// * `params` - Extraction parameters, see [`RansacParams`]
///
/// # Returns
/// * `Result<Vec<DetectedPlane>>` - Extracted planes in detection order
pub fn extract_planes(
    cloud: &PointCloud<Point3f>,
    params: &RansacParams,
) -> Result<Vec<DetectedPlane>> {
    params.validate()?;

    let mut working = PointCloud::from_points(cloud.points.clone());
    let mut planes: Vec<DetectedPlane> = Vec::new();
    let mut round: u64 = 0;

    while planes.len() < params.max_planes && working.len() >= params.min_inliers.max(3) {
        let result = match params.seed {
            Some(seed) => segment_plane_seeded(
                &working,
                params.distance_threshold,
                params.iterations,
                seed.wrapping_add(round),
            )?,
            None => segment_plane(&working, params.distance_threshold, params.iterations)?,
        };

        if result.inliers.len() < params.min_inliers {
            break;
        }

        let mut is_inlier = vec![false; working.len()];
        for &idx in &result.inliers {
            is_inlier[idx] = true;
        }

        let mut inlier_points = Vec::with_capacity(result.inliers.len());
        let mut remaining = Vec::with_capacity(working.len() - result.inliers.len());
        for (idx, point) in working.iter().enumerate() {
            if is_inlier[idx] {
                inlier_points.push(*point);
            } else {
                remaining.push(*point);
            }
        }

        working = PointCloud::from_points(remaining);
        merge_or_push(
            &mut planes,
            DetectedPlane {
                model: result.model,
                points: PointCloud::from_points(inlier_points),
            },
            params,
        );
        round += 1;
    }

    Ok(planes)
}
